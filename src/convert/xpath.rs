//! XPath to dictionary and XPath to UiSelector.
//!
//! The parsed path is flattened into a list of element steps and parent
//! steps, then folded head first: an element step contributes its node test
//! and predicates, and whatever follows it nests under `fromParent` (after a
//! run of `..`), `sibling` (a `following-sibling::` step) or `childSelector`.

use crate::attributes::{Attribute, AttributeKind, MatchMode};
use crate::config::ConverterConfig;
use crate::convert::dict::locator_to_selector;
use crate::error::LocatorError;
use crate::locator::{DictLocator, LocatorValue};
use droidloc_xpath::{
    AbbreviatedStep, Axis, BinaryOperator, Expression, NodeTest, NodeTypeTest, Step,
    parse_expression,
};
use serde_json::Value;

pub fn xpath_to_dict(xpath: &str, config: &ConverterConfig) -> Result<Value, LocatorError> {
    xpath_to_locator(xpath, config).map(|dict| dict.to_json())
}

pub fn xpath_to_locator(xpath: &str, config: &ConverterConfig) -> Result<DictLocator, LocatorError> {
    let expression = parse_expression(xpath)?;
    let steps = flatten(&expression)?;
    fold(&steps, 1, config)
}

pub fn xpath_to_ui_selector(xpath: &str, config: &ConverterConfig) -> Result<String, LocatorError> {
    let dict = xpath_to_locator(xpath, config)?;
    Ok(locator_to_selector(&dict, config)?.to_string())
}

#[derive(Debug, Clone, Copy)]
enum PathStep<'a> {
    Element(&'a Step),
    Parent,
}

/// Lists the location steps of a path left to right. Path operators nest to
/// the left, so the walk keeps its own stack instead of recursing per step.
fn flatten(expression: &Expression) -> Result<Vec<PathStep<'_>>, LocatorError> {
    let mut out = Vec::new();
    let mut pending = vec![expression];
    while let Some(expression) = pending.pop() {
        match expression {
            Expression::AbsolutePath {
                relative: Some(relative),
                ..
            } => pending.push(relative),
            Expression::AbsolutePath { relative: None, .. } => {
                return Err(LocatorError::conversion("XPath has no location steps"));
            }
            Expression::Binary { left, op, right } if op.is_path() => {
                pending.push(right);
                pending.push(left);
            }
            Expression::AbbreviatedStep(AbbreviatedStep::Parent) => out.push(PathStep::Parent),
            Expression::AbbreviatedStep(AbbreviatedStep::Current) => {}
            Expression::Step(step) => {
                if let Some(path_step) = path_step(step)? {
                    out.push(path_step);
                }
            }
            other => {
                return Err(LocatorError::conversion(format!(
                    "Unsupported XPath expression: {}",
                    other
                )));
            }
        }
    }
    Ok(out)
}

/// `parent::node()` is `..`; `self::node()` and a bare
/// `descendant-or-self::node()` carry no information.
fn path_step(step: &Step) -> Result<Option<PathStep<'_>>, LocatorError> {
    let any_node = step.predicates.is_empty()
        && matches!(
            step.node_test,
            NodeTest::Wildcard | NodeTest::NodeType(NodeTypeTest::Node)
        );
    match step.axis {
        Some(Axis::Parent) if any_node => Ok(Some(PathStep::Parent)),
        Some(Axis::SelfAxis | Axis::DescendantOrSelf) if any_node => Ok(None),
        None
        | Some(Axis::Child | Axis::Descendant | Axis::DescendantOrSelf | Axis::FollowingSibling) => {
            Ok(Some(PathStep::Element(step)))
        }
        Some(axis) => Err(LocatorError::conversion(format!(
            "Unsupported XPath axis: {}::",
            axis.name()
        ))),
    }
}

fn fold(
    steps: &[PathStep<'_>],
    depth: usize,
    config: &ConverterConfig,
) -> Result<DictLocator, LocatorError> {
    config.check_depth(depth)?;

    let mut dict = DictLocator::new();
    match steps.split_first() {
        None => {}
        Some((PathStep::Parent, _)) => {
            let run = parent_run(steps);
            let inner = fold(&steps[run..], depth + run, config)?;
            dict.insert(Attribute::FromParent, wrap_parents(inner, run));
        }
        Some((PathStep::Element(step), rest)) => {
            apply_step(step, &mut dict)?;
            match rest.first() {
                None => {}
                Some(PathStep::Parent) => {
                    let run = parent_run(rest);
                    let inner = fold(&rest[run..], depth + run, config)?;
                    dict.insert(Attribute::FromParent, wrap_parents(inner, run));
                }
                Some(PathStep::Element(next)) => {
                    let attribute = if next.axis == Some(Axis::FollowingSibling) {
                        Attribute::Sibling
                    } else {
                        Attribute::ChildSelector
                    };
                    let inner = fold(rest, depth + 1, config)?;
                    dict.insert(attribute, LocatorValue::Nested(Box::new(inner)));
                }
            }
        }
    }
    Ok(dict)
}

fn parent_run(steps: &[PathStep<'_>]) -> usize {
    steps
        .iter()
        .take_while(|s| matches!(s, PathStep::Parent))
        .count()
}

/// Wraps `inner` so that, stored under `fromParent`, it sits `run` levels deep.
fn wrap_parents(inner: DictLocator, run: usize) -> LocatorValue {
    let mut value = LocatorValue::Nested(Box::new(inner));
    for _ in 1..run {
        value = LocatorValue::Nested(Box::new(
            DictLocator::new().with(Attribute::FromParent, value),
        ));
    }
    value
}

fn apply_step(step: &Step, dict: &mut DictLocator) -> Result<(), LocatorError> {
    match &step.node_test {
        NodeTest::Wildcard | NodeTest::NodeType(NodeTypeTest::Node) => {}
        NodeTest::Name(name) => dict.insert(Attribute::ClassName, LocatorValue::Str(name.clone())),
        NodeTest::NodeType(other) => {
            return Err(LocatorError::conversion(format!(
                "Unsupported node test: {}()",
                other.name()
            )));
        }
    }
    for predicate in &step.predicates {
        let (attribute, value) = classify_predicate(predicate)?;
        dict.insert(attribute, value);
    }
    Ok(())
}

fn classify_predicate(predicate: &Expression) -> Result<(Attribute, LocatorValue), LocatorError> {
    let unsupported =
        || LocatorError::conversion(format!("Unsupported predicate: [{}]", predicate));

    match predicate {
        Expression::Number(n) => Ok((Attribute::Instance, LocatorValue::Int(position(*n)? - 1))),
        Expression::Binary {
            left,
            op: BinaryOperator::Equals,
            right,
        } => {
            if let Some(n) = position_comparison(left, right) {
                return Ok((Attribute::Index, LocatorValue::Int(position(n)? - 1)));
            }
            let (name, literal) = operand_pair(left, right)
                .or_else(|| operand_pair(right, left))
                .ok_or_else(unsupported)?;
            let attribute = Attribute::for_xpath(name, MatchMode::Equals).ok_or_else(|| {
                LocatorError::conversion(format!("Unsupported XPath attribute: @{}", name))
            })?;
            Ok((attribute, attribute.value_from_literal(&literal)?))
        }
        Expression::Binary { op, .. } if op.is_logical() => Err(LocatorError::conversion(format!(
            "Logical operator '{}' is not supported in predicates: [{}]",
            op.symbol(),
            predicate
        ))),
        Expression::FunctionCall { name, args } => {
            let mode = MatchMode::from_xpath_function(name).ok_or_else(|| {
                LocatorError::conversion(format!("Unsupported XPath function: {}()", name))
            })?;
            let [target, pattern] = args.as_slice() else {
                return Err(LocatorError::conversion(format!(
                    "{}() expects 2 arguments, got {}",
                    name,
                    args.len()
                )));
            };
            let attribute_name = attribute_operand(target).ok_or_else(unsupported)?;
            let literal = literal_value(pattern).ok_or_else(unsupported)?;
            let attribute = Attribute::for_xpath(attribute_name, mode).ok_or_else(|| {
                LocatorError::conversion(format!(
                    "{}() is not supported for @{}",
                    name, attribute_name
                ))
            })?;
            Ok((attribute, LocatorValue::Str(literal)))
        }
        Expression::Step(_) => {
            let name = predicate.as_attribute_name().ok_or_else(unsupported)?;
            match Attribute::for_xpath(name, MatchMode::Equals) {
                Some(attribute) if attribute.kind() == AttributeKind::Boolean => {
                    Ok((attribute, LocatorValue::Bool(true)))
                }
                _ => Err(LocatorError::conversion(format!(
                    "Presence test [@{}] requires a boolean attribute",
                    name
                ))),
            }
        }
        _ => Err(unsupported()),
    }
}

/// Converts a 1-based XPath position to `u32`, rejecting fractions and zero.
fn position(n: f64) -> Result<u32, LocatorError> {
    if n.fract() == 0.0 && n >= 1.0 && n <= f64::from(u32::MAX) {
        Ok(n as u32)
    } else {
        Err(LocatorError::conversion(format!(
            "Position must be a positive integer, got {}",
            n
        )))
    }
}

fn position_comparison(left: &Expression, right: &Expression) -> Option<f64> {
    match (left, right) {
        (Expression::FunctionCall { name, args }, Expression::Number(n))
        | (Expression::Number(n), Expression::FunctionCall { name, args })
            if name == "position" && args.is_empty() =>
        {
            Some(*n)
        }
        _ => None,
    }
}

fn operand_pair<'a>(attribute: &'a Expression, literal: &Expression) -> Option<(&'a str, String)> {
    Some((attribute_operand(attribute)?, literal_value(literal)?))
}

/// `@name`, or `text()` standing for the text attribute.
fn attribute_operand(expression: &Expression) -> Option<&str> {
    expression
        .as_attribute_name()
        .or_else(|| expression.is_text_node().then_some("text"))
}

/// A string literal, or a `concat()` of string literals.
fn literal_value(expression: &Expression) -> Option<String> {
    match expression {
        Expression::Literal(s) => Some(s.clone()),
        Expression::FunctionCall { name, args } if name == "concat" => {
            args.iter().map(literal_value).collect()
        }
        _ => None,
    }
}
