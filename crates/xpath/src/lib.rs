//! Parser for the XPath subset found in Android UI locators.
//!
//! The crate only builds an AST; interpreting it is left to the locator
//! converters in the `droidloc` crate.

pub mod ast;
pub mod error;
mod parser;

pub use ast::{AbbreviatedStep, Axis, BinaryOperator, Expression, NodeTest, NodeTypeTest, Step};
pub use error::XPathError;
pub use parser::{MAX_NESTING, parse_expression};
