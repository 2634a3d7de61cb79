//! Conversions between the three locator formats.
//!
//! These functions trust their input: they do not run the validator first and
//! report malformed locators as `LocatorError::Conversion`. The facade in
//! [`crate::converter`] adds validation on top.

pub mod dict;
pub mod ui_selector;
pub mod xpath;

pub use dict::{dict_to_ui_selector, dict_to_xpath, locator_to_selector, locator_to_xpath};
pub use ui_selector::{
    parse_ui_selector, selector_to_locator, selector_to_xpath, ui_selector_to_dict,
    ui_selector_to_xpath,
};
pub use xpath::{xpath_to_dict, xpath_to_locator, xpath_to_ui_selector};

use crate::attributes::Attribute;
use crate::error::LocatorError;

/// The path segment joining a rendered child (based on `*`) to its parent step.
pub(crate) fn hierarchy_segment(attribute: Attribute, child: &str) -> Result<String, LocatorError> {
    match attribute {
        Attribute::ChildSelector => Ok(format!("/{}", child)),
        Attribute::FromParent if child.starts_with("//") => Ok(format!("/..{}", child)),
        Attribute::FromParent => Ok(format!("/..//{}", child)),
        Attribute::Sibling => Ok(format!("/following-sibling::{}", child)),
        other => Err(LocatorError::conversion(format!(
            "Attribute {} cannot hold a nested locator",
            other.dict_key()
        ))),
    }
}
