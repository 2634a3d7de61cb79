//! # droidloc
//!
//! Conversion between the three ways of locating an Android UI element:
//! - **UiSelector**: the `new UiSelector().text("OK").clickable(true);` chain DSL
//! - **XPath**: predicates over the UI hierarchy dump, `//*[@text="OK"][@clickable="true"]`
//! - **Dict**: the canonical JSON mapping, `{"text": "OK", "clickable": true}`
//!
//! The modules:
//! - **attributes**: the attribute table every conversion goes through
//! - **convert**: the low-level converters, without validation
//! - **validator**: format checks and repair hints
//! - **converter**: the `LocatorConverter` facade with validation, batches and statistics
//!
//! ## Usage
//!
//! ```
//! use droidloc::LocatorConverter;
//! use serde_json::json;
//!
//! let converter = LocatorConverter::new();
//! let xpath = converter
//!     .ui_selector_to_xpath(r#"new UiSelector().text("OK").clickable(true);"#)
//!     .unwrap();
//! assert_eq!(xpath, r#"//*[@text="OK"][@clickable="true"]"#);
//!
//! let dict = converter.xpath_to_dict(&xpath).unwrap();
//! assert_eq!(dict, json!({"text": "OK", "clickable": true}));
//! ```

// Re-export the parser crates
pub use droidloc_uiselector as uiselector;
pub use droidloc_xpath as xpath;

pub mod attributes;
pub mod config;
pub mod convert;
pub mod converter;
pub mod error;
pub mod locator;
pub mod stats;
pub mod validator;

pub use attributes::{Attribute, AttributeKind, Family, MatchMode, xpath_literal};
pub use config::{ConverterConfig, DEFAULT_MAX_DEPTH, UnknownMethodPolicy};
pub use converter::{BatchConversion, LocatorConverter, LocatorConverterBuilder};
pub use error::LocatorError;
pub use locator::{DictLocator, Locator, LocatorFormat, LocatorValue};
pub use stats::{ConversionStats, StatsSnapshot};
pub use validator::{LocatorErrors, ValidationReport, ValidationSummary, suggest_fixes};
