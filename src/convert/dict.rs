//! Dictionary locator to XPath and UiSelector.

use crate::attributes::Attribute;
use crate::config::ConverterConfig;
use crate::convert::hierarchy_segment;
use crate::error::LocatorError;
use crate::locator::{DictLocator, LocatorValue};
use droidloc_uiselector::{Arg, MethodCall, Selector};
use serde_json::Value;

pub fn dict_to_xpath(locator: &Value, config: &ConverterConfig) -> Result<String, LocatorError> {
    let dict = DictLocator::from_json_with(locator, config)?;
    locator_to_xpath(&dict, config)
}

pub fn locator_to_xpath(dict: &DictLocator, config: &ConverterConfig) -> Result<String, LocatorError> {
    render_xpath(dict, "//*", 1, config)
}

fn render_xpath(
    dict: &DictLocator,
    base: &str,
    depth: usize,
    config: &ConverterConfig,
) -> Result<String, LocatorError> {
    config.check_depth(depth)?;

    let mut xpath = base.to_string();
    for (attribute, value) in dict.iter() {
        match value {
            LocatorValue::Nested(child) if attribute == Attribute::FromParent => {
                xpath.push_str(&parent_segment(child, depth + 1, config)?);
            }
            LocatorValue::Nested(child) => {
                let child = render_xpath(child, "*", depth + 1, config)?;
                xpath.push_str(&hierarchy_segment(attribute, &child)?);
            }
            scalar => xpath.push_str(&attribute.xpath_predicate(scalar)?),
        }
    }
    Ok(xpath)
}

/// Nested `fromParent` entries with nothing else collapse into `/../..`, so
/// XPath parent runs survive a round trip.
fn parent_segment(
    child: &DictLocator,
    depth: usize,
    config: &ConverterConfig,
) -> Result<String, LocatorError> {
    config.check_depth(depth)?;
    let entries: Vec<_> = child.iter().collect();
    match entries.as_slice() {
        [] => Ok("/..".to_string()),
        [(Attribute::FromParent, LocatorValue::Nested(inner))] => {
            Ok(format!("/..{}", parent_segment(inner, depth + 1, config)?))
        }
        _ => hierarchy_segment(
            Attribute::FromParent,
            &render_xpath(child, "*", depth, config)?,
        ),
    }
}

pub fn dict_to_ui_selector(locator: &Value, config: &ConverterConfig) -> Result<String, LocatorError> {
    let dict = DictLocator::from_json_with(locator, config)?;
    Ok(locator_to_selector(&dict, config)?.to_string())
}

/// Builds the selector tree for `dict`; its `Display` adds the trailing `;`.
pub fn locator_to_selector(
    dict: &DictLocator,
    config: &ConverterConfig,
) -> Result<Selector, LocatorError> {
    build_selector(dict, 1, config)
}

fn build_selector(
    dict: &DictLocator,
    depth: usize,
    config: &ConverterConfig,
) -> Result<Selector, LocatorError> {
    config.check_depth(depth)?;

    let mut selector = Selector::new();
    for (attribute, value) in dict.iter() {
        let arg = match value {
            LocatorValue::Nested(child) if attribute.is_hierarchical() => {
                Arg::Nested(Box::new(build_selector(child, depth + 1, config)?))
            }
            value => attribute.ui_arg(value)?,
        };
        selector
            .methods
            .push(MethodCall::new(attribute.ui_method(), vec![arg]));
    }
    Ok(selector)
}
