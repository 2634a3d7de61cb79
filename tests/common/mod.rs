#![allow(dead_code)]

pub mod fixtures;

use droidloc::{ConverterConfig, LocatorConverter, LocatorError};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A converter with default settings and validation on.
pub fn converter() -> LocatorConverter {
    LocatorConverter::new()
}

/// A converter that hands input straight to the low-level converters.
pub fn lenient_converter() -> LocatorConverter {
    LocatorConverter::with_config(ConverterConfig {
        validate_input: false,
        ..Default::default()
    })
}

/// The error list of an `InvalidSelector`, or a panic for anything else.
pub fn invalid_errors(err: LocatorError) -> Vec<String> {
    match err {
        LocatorError::InvalidSelector { errors, .. } => errors,
        other => panic!("expected InvalidSelector, got {:?}", other),
    }
}
