use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("UiSelector lex error at offset {offset}: {message}")]
    Lex { message: String, offset: usize },

    #[error("UiSelector parse error at offset {offset}: {message}")]
    Parse { message: String, offset: usize },
}

impl SelectorError {
    /// Byte offset into the source where the error was detected.
    pub fn offset(&self) -> usize {
        match self {
            SelectorError::Lex { offset, .. } | SelectorError::Parse { offset, .. } => *offset,
        }
    }
}
