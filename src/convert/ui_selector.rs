//! UiSelector to XPath and UiSelector to dictionary.

use crate::attributes::Attribute;
use crate::config::{ConverterConfig, UnknownMethodPolicy};
use crate::convert::hierarchy_segment;
use crate::error::LocatorError;
use crate::locator::{DictLocator, LocatorValue};
use droidloc_uiselector::{MethodCall, Selector, parse_selector};
use log::warn;
use serde_json::Value;

pub fn ui_selector_to_xpath(source: &str, config: &ConverterConfig) -> Result<String, LocatorError> {
    let selector = parse_selector(source)?;
    selector_to_xpath(&selector, "//*", config)
}

/// Renders `selector` on `base`, appending each method's predicate or
/// hierarchical segment in method order.
pub fn selector_to_xpath(
    selector: &Selector,
    base: &str,
    config: &ConverterConfig,
) -> Result<String, LocatorError> {
    render_xpath(selector, base, 1, config)
}

fn render_xpath(
    selector: &Selector,
    base: &str,
    depth: usize,
    config: &ConverterConfig,
) -> Result<String, LocatorError> {
    config.check_depth(depth)?;

    let mut xpath = base.to_string();
    for call in &selector.methods {
        let Some(attribute) = resolve(call, config)? else {
            continue;
        };
        if attribute.is_hierarchical() {
            let nested = nested_arg(attribute, call)?;
            let segment = if attribute == Attribute::FromParent {
                parent_segment(nested, depth + 1, config)?
            } else {
                hierarchy_segment(attribute, &render_xpath(nested, "*", depth + 1, config)?)?
            };
            xpath.push_str(&segment);
        } else {
            let value = attribute.value_from_args(&call.args)?;
            xpath.push_str(&attribute.xpath_predicate(&value)?);
        }
    }
    Ok(xpath)
}

/// Runs of `fromParent` without predicates collapse into `/../..`; an empty
/// `fromParent` is a bare `/..`.
fn parent_segment(
    nested: &Selector,
    depth: usize,
    config: &ConverterConfig,
) -> Result<String, LocatorError> {
    config.check_depth(depth)?;
    match nested.methods.as_slice() {
        [] => Ok("/..".to_string()),
        [call] if call.name == Attribute::FromParent.ui_method() => {
            let inner = nested_arg(Attribute::FromParent, call)?;
            Ok(format!("/..{}", parent_segment(inner, depth + 1, config)?))
        }
        _ => hierarchy_segment(
            Attribute::FromParent,
            &render_xpath(nested, "*", depth, config)?,
        ),
    }
}

/// The canonical dictionary for a UiSelector string, as JSON.
pub fn ui_selector_to_dict(source: &str, config: &ConverterConfig) -> Result<Value, LocatorError> {
    let selector = parse_selector(source)?;
    selector_to_locator(&selector, config).map(|dict| dict.to_json())
}

pub fn selector_to_locator(
    selector: &Selector,
    config: &ConverterConfig,
) -> Result<DictLocator, LocatorError> {
    build_locator(selector, 1, config)
}

fn build_locator(
    selector: &Selector,
    depth: usize,
    config: &ConverterConfig,
) -> Result<DictLocator, LocatorError> {
    config.check_depth(depth)?;

    let mut dict = DictLocator::new();
    for call in &selector.methods {
        let Some(attribute) = resolve(call, config)? else {
            continue;
        };
        let value = if attribute.is_hierarchical() {
            let nested = build_locator(nested_arg(attribute, call)?, depth + 1, config)?;
            LocatorValue::Nested(Box::new(nested))
        } else {
            attribute.value_from_args(&call.args)?
        };
        dict.insert(attribute, value);
    }
    Ok(dict)
}

/// The structural form `{"methods": [{"name", "args"}]}`, without any
/// attribute translation.
pub fn parse_ui_selector(source: &str) -> Result<Value, LocatorError> {
    Ok(parse_selector(source)?.to_json())
}

fn resolve(call: &MethodCall, config: &ConverterConfig) -> Result<Option<Attribute>, LocatorError> {
    if let Some(attribute) = Attribute::from_ui_method(&call.name) {
        return Ok(Some(attribute));
    }
    match config.unknown_methods {
        UnknownMethodPolicy::Skip => {
            warn!("Skipping unknown UiSelector method '{}'", call.name);
            Ok(None)
        }
        UnknownMethodPolicy::Fail => Err(LocatorError::Conversion(format!(
            "Unknown UiSelector method: {}",
            call.name
        ))),
    }
}

fn nested_arg(attribute: Attribute, call: &MethodCall) -> Result<&Selector, LocatorError> {
    match call.args.as_slice() {
        [arg] => arg.as_nested().ok_or_else(|| {
            LocatorError::Conversion(format!(
                "Method {} requires a nested UiSelector, got {}",
                attribute.ui_method(),
                arg
            ))
        }),
        args => Err(LocatorError::Conversion(format!(
            "Method {} requires exactly one nested UiSelector, got {} arguments",
            attribute.ui_method(),
            args.len()
        ))),
    }
}
