// src/error.rs
use crate::locator::LocatorFormat;
use droidloc_uiselector::SelectorError;
use droidloc_xpath::XPathError;
use thiserror::Error;

/// Every failure a locator conversion can produce.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LocatorError {
    #[error("Lexing failed: {0}")]
    Lex(SelectorError),

    #[error("Parsing failed: {0}")]
    Parse(SelectorError),

    #[error("XPath parsing failed: {0}")]
    XPath(#[from] XPathError),

    #[error("Invalid {format} locator: {}", .errors.join("; "))]
    InvalidSelector {
        format: LocatorFormat,
        errors: Vec<String>,
    },

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Unsupported locator format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid converter configuration: {0}")]
    Config(String),
}

impl From<SelectorError> for LocatorError {
    fn from(e: SelectorError) -> Self {
        match e {
            SelectorError::Lex { .. } => LocatorError::Lex(e),
            SelectorError::Parse { .. } => LocatorError::Parse(e),
        }
    }
}

impl LocatorError {
    pub(crate) fn conversion(message: impl Into<String>) -> Self {
        LocatorError::Conversion(message.into())
    }
}
