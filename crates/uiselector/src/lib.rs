//! The UiAutomator2 `UiSelector` locator language: tokens, syntax tree and
//! a recursive-descent parser.
//!
//! ```
//! use droidloc_uiselector::parse_selector;
//!
//! let selector = parse_selector(r#"new UiSelector().text("OK").clickable(true);"#).unwrap();
//! assert_eq!(selector.methods.len(), 2);
//! assert_eq!(selector.to_string(), r#"new UiSelector().text("OK").clickable(true);"#);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::{Arg, MethodCall, Selector, quote};
pub use error::SelectorError;
pub use lexer::{Token, TokenKind, tokenize};
pub use parser::{MAX_NESTING, Parser, parse_selector, unwrap_source};
