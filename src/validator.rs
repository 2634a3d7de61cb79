//! Format-specific checks run by the facade before converting.
//!
//! Every check collects all problems it finds instead of stopping at the
//! first one, so a report can be shown to a user as a whole.

use crate::attributes::{Attribute, AttributeKind, Family, kind_name};
use crate::error::LocatorError;
use crate::locator::{Locator, LocatorFormat, json_type_name};
use droidloc_uiselector::{TokenKind, parse_selector, tokenize, unwrap_source};
use droidloc_xpath::parse_expression;
use itertools::Itertools;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// `Ok(())` when valid, `LocatorError::InvalidSelector` otherwise.
    pub fn into_result(self, format: LocatorFormat) -> Result<(), LocatorError> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(LocatorError::InvalidSelector {
                format,
                errors: self.errors,
            })
        }
    }
}

/// Validation results for one failing entry of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatorErrors {
    pub index: usize,
    pub format: LocatorFormat,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub valid: usize,
    pub invalid: usize,
    pub errors: Vec<LocatorErrors>,
}

pub fn validate(locator: &Locator) -> ValidationReport {
    match locator {
        Locator::UiSelector(s) => validate_ui_selector(s),
        Locator::XPath(s) => validate_xpath(s),
        Locator::Dict(v) => validate_dict(v),
    }
}

/// Validates `value` as a locator of the declared `format`.
pub fn validate_as(value: &Value, format: LocatorFormat) -> ValidationReport {
    match Locator::with_format(format, value.clone()) {
        Ok(locator) => validate(&locator),
        Err(LocatorError::InvalidSelector { errors, .. }) => ValidationReport { errors },
        Err(e) => ValidationReport {
            errors: vec![e.to_string()],
        },
    }
}

pub fn validate_batch(locators: &[Locator]) -> ValidationSummary {
    let mut summary = ValidationSummary {
        total: locators.len(),
        ..Default::default()
    };
    for (index, locator) in locators.iter().enumerate() {
        let report = validate(locator);
        if report.is_valid() {
            summary.valid += 1;
        } else {
            summary.invalid += 1;
            summary.errors.push(LocatorErrors {
                index,
                format: locator.format(),
                errors: report.errors,
            });
        }
    }
    summary
}

// --- UiSelector ---

pub fn validate_ui_selector(source: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let source = unwrap_source(source);

    if !has_constructor(source) {
        report.push("Invalid UiSelector format: expected new UiSelector()");
        return report;
    }

    let balance = scan_ui_selector(source);
    if balance.open_quote {
        report.push("Unbalanced quotes");
    }
    if balance.parens != 0 {
        report.push("Unbalanced parentheses");
    }
    if !report.is_valid() {
        return report;
    }

    match parse_selector(source) {
        Ok(selector) => {
            for name in selector
                .method_names()
                .into_iter()
                .filter(|name| Attribute::from_ui_method(name).is_none())
                .unique()
            {
                report.push(format!("Unknown UiSelector method: {}", name));
            }
        }
        Err(e) => report.push(format!("Invalid UiSelector format: {}", e)),
    }
    report
}

fn has_constructor(source: &str) -> bool {
    let Ok(tokens) = tokenize(source) else {
        // A lexing problem later in the chain still allows the prefix check.
        return source.starts_with("new UiSelector()");
    };
    let kinds: Vec<TokenKind> = tokens.iter().take(4).map(|t| t.kind).collect();
    kinds
        == [
            TokenKind::New,
            TokenKind::UiSelector,
            TokenKind::LParen,
            TokenKind::RParen,
        ]
}

struct Balance {
    parens: i64,
    open_quote: bool,
}

fn scan_ui_selector(source: &str) -> Balance {
    let mut balance = Balance {
        parens: 0,
        open_quote: false,
    };
    let mut escaped = false;
    for c in source.chars() {
        if balance.open_quote {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => balance.open_quote = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => balance.open_quote = true,
            '(' => balance.parens += 1,
            ')' => balance.parens -= 1,
            _ => {}
        }
    }
    balance
}

// --- XPath ---

pub fn validate_xpath(source: &str) -> ValidationReport {
    let mut report = ValidationReport::default();
    let scan = scan_xpath(source);

    if !source.trim_start().starts_with("//") {
        report.push("XPath must start with //");
    }
    if scan.brackets != 0 {
        report.push("Unbalanced brackets");
    }
    if let Some(predicate) = &scan.unterminated_predicate {
        report.push(format!("Unbalanced quotes in predicate: {}", predicate));
    }
    for operator in scan.logical_operators.iter().unique() {
        report.push(format!(
            "Logical operator '{}' is not supported; chain predicates instead",
            operator
        ));
    }

    if report.is_valid() {
        if let Err(e) = parse_expression(source) {
            report.push(e.to_string());
        }
    }
    report
}

#[derive(Default)]
struct XPathScan {
    brackets: i64,
    unterminated_predicate: Option<String>,
    logical_operators: Vec<&'static str>,
}

fn scan_xpath(source: &str) -> XPathScan {
    let mut scan = XPathScan::default();
    let mut quote: Option<char> = None;
    let mut predicate_starts: Vec<usize> = Vec::new();
    let mut word = String::new();

    for (offset, c) in source.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | ':') {
            word.push(c);
            continue;
        }
        flush_word(&mut word, &mut scan);
        match c {
            '"' | '\'' => quote = Some(c),
            '[' => {
                scan.brackets += 1;
                predicate_starts.push(offset);
            }
            ']' => {
                scan.brackets -= 1;
                predicate_starts.pop();
            }
            _ => {}
        }
    }
    flush_word(&mut word, &mut scan);

    if quote.is_some() {
        let start = predicate_starts.last().copied().unwrap_or(0);
        scan.unterminated_predicate = Some(source[start..].to_string());
    }
    scan
}

fn flush_word(word: &mut String, scan: &mut XPathScan) {
    match word.as_str() {
        "and" => scan.logical_operators.push("and"),
        "or" => scan.logical_operators.push("or"),
        _ => {}
    }
    word.clear();
}

// --- Dict ---

/// Deepest dictionary nesting the validator descends into, matching the
/// deepest selector the UiSelector parser accepts.
pub const MAX_DICT_DEPTH: usize = droidloc_uiselector::MAX_NESTING;

pub fn validate_dict(value: &Value) -> ValidationReport {
    let mut report = ValidationReport::default();
    match value {
        Value::Object(map) if map.is_empty() => report.push("Locator dictionary cannot be empty"),
        Value::Object(map) => check_map(map, "", 1, &mut report),
        _ => report.push("Locator must be a dictionary"),
    }
    report
}

/// `path` prefixes keys of nested locators, e.g. `childSelector.text`.
fn check_map(map: &Map<String, Value>, path: &str, depth: usize, report: &mut ValidationReport) {
    if depth > MAX_DICT_DEPTH {
        report.push(format!("Locator nesting exceeds {} levels", MAX_DICT_DEPTH));
        return;
    }

    for (key, value) in map {
        let Some(attribute) = Attribute::from_dict_key(key) else {
            report.push(format!("Unknown attribute: {}{}", path, key));
            continue;
        };
        let kind = attribute.kind();
        if !well_typed(kind, value) {
            report.push(format!(
                "Attribute {}{} must be {}, got {}",
                path,
                key,
                kind_name(kind),
                describe(value)
            ));
        } else if let Value::Object(nested) = value {
            check_map(nested, &format!("{}{}.", path, key), depth + 1, report);
        }
    }

    for family in [Family::Text, Family::Description] {
        let keys = family_keys(map, family);
        if keys.len() > 1 {
            report.push(format!(
                "Locator has conflicting {} attributes: {}",
                family.name(),
                keys.iter().map(|k| format!("{}{}", path, k)).join(", ")
            ));
        }
    }
}

fn well_typed(kind: AttributeKind, value: &Value) -> bool {
    match kind {
        AttributeKind::String => value.is_string(),
        AttributeKind::Boolean => value.is_boolean(),
        AttributeKind::Numeric => value.as_u64().is_some_and(|n| n <= u64::from(u32::MAX)),
        AttributeKind::Hierarchical => value.is_object(),
    }
}

fn family_keys(map: &Map<String, Value>, family: Family) -> Vec<&str> {
    map.keys()
        .map(String::as_str)
        .filter(|key| Attribute::from_dict_key(key).and_then(Attribute::family) == Some(family))
        .collect()
}

fn describe(value: &Value) -> String {
    match value {
        Value::Number(n) => n.to_string(),
        other => json_type_name(other).to_string(),
    }
}

// --- Suggestions ---

/// Repair hints for common mistakes. An empty list means nothing obvious to fix.
pub fn suggest_fixes(locator: &Locator) -> Vec<String> {
    let mut hints = Vec::new();
    match locator {
        Locator::UiSelector(source) => {
            let trimmed = unwrap_source(source);
            if !has_constructor(trimmed) {
                hints.push("Add 'new UiSelector()' constructor".to_string());
            }
            if !trimmed.ends_with(';') {
                hints.push("Add semicolon at the end".to_string());
            }
            let balance = scan_ui_selector(trimmed);
            if balance.parens != 0 {
                hints.push("Check for balanced parentheses".to_string());
            }
            if balance.open_quote {
                hints.push("Close the unterminated string".to_string());
            }
            if let Ok(selector) = parse_selector(trimmed) {
                for name in selector
                    .method_names()
                    .into_iter()
                    .filter(|name| Attribute::from_ui_method(name).is_none())
                    .unique()
                {
                    hints.push(format!("Remove or rename unknown method: {}", name));
                }
            }
        }
        Locator::XPath(source) => {
            if !source.trim_start().starts_with("//") {
                hints.push("XPath must start with //".to_string());
            }
            let scan = scan_xpath(source);
            if scan.brackets != 0 {
                hints.push("Check for balanced brackets".to_string());
            }
            if !scan.logical_operators.is_empty() {
                hints.push("Split and/or conditions into chained predicates like [a][b]".to_string());
            }
        }
        Locator::Dict(Value::Object(map)) => {
            for (key, value) in map {
                match Attribute::from_dict_key(key) {
                    None => hints.push(format!("Remove or rename invalid attribute: {}", key)),
                    Some(attribute) if !well_typed(attribute.kind(), value) => {
                        hints.push(format!(
                            "Use a {} value for {}",
                            kind_name(attribute.kind()),
                            key
                        ));
                    }
                    Some(_) => {}
                }
            }
            for family in [Family::Text, Family::Description] {
                let keys = family_keys(map, family);
                if keys.len() > 1 {
                    hints.push(format!("Keep only one of: {}", keys.join(", ")));
                }
            }
        }
        Locator::Dict(_) => hints.push("Pass the locator as a JSON object".to_string()),
    }
    hints
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_ui_selector() {
        let report = validate_ui_selector(r#"new UiSelector().text("Button").clickable(true);"#);
        assert!(report.is_valid(), "{:?}", report);
        assert!(validate_ui_selector(r#"new UiSelector().text("(")"#).is_valid());
    }

    #[test]
    fn test_ui_selector_requires_constructor() {
        let report = validate_ui_selector("invalid selector");
        assert_eq!(
            report.errors,
            vec!["Invalid UiSelector format: expected new UiSelector()"]
        );
        assert!(!validate_ui_selector(r#".text("a")"#).is_valid());
    }

    #[test]
    fn test_ui_selector_balance() {
        let report = validate_ui_selector(r#"new UiSelector().text("a";"#);
        assert_eq!(report.errors, vec!["Unbalanced parentheses"]);
        let report = validate_ui_selector(r#"new UiSelector().text("a);"#);
        assert!(report.errors.contains(&"Unbalanced quotes".to_string()));
    }

    #[test]
    fn test_ui_selector_unknown_methods_are_reported_recursively() {
        let report = validate_ui_selector(
            r#"new UiSelector().foo(1).childSelector(new UiSelector().bar("x").foo(2));"#,
        );
        assert_eq!(
            report.errors,
            vec!["Unknown UiSelector method: foo", "Unknown UiSelector method: bar"]
        );
    }

    #[test]
    fn test_xpath_checks() {
        assert!(validate_xpath(r#"//*[@text="Button"]"#).is_valid());
        assert_eq!(
            validate_xpath("invalid xpath").errors,
            vec!["XPath must start with //"]
        );
        assert!(
            validate_xpath(r#"//*[@text="a""#)
                .errors
                .contains(&"Unbalanced brackets".to_string())
        );
        let report = validate_xpath(r#"//*[@text="a]"#);
        assert!(report.errors.iter().any(|e| e.starts_with("Unbalanced quotes in predicate")));
        let report = validate_xpath(r#"//*[@text="a" and @class="b"]"#);
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("'and'"));
        // Operators inside literals are data.
        assert!(validate_xpath(r#"//*[@text="rock and roll"]"#).is_valid());
        assert!(validate_xpath(r#"//*[@orientation="1"]"#).is_valid());
    }

    #[test]
    fn test_xpath_syntax_errors_surface() {
        assert!(!validate_xpath("//*invalid(expr)").is_valid());
    }

    #[test]
    fn test_dict_checks() {
        assert!(validate_dict(&json!({"text": "Button", "class": "android.widget.Button"})).is_valid());
        assert_eq!(
            validate_dict(&json!({})).errors,
            vec!["Locator dictionary cannot be empty"]
        );
        assert_eq!(
            validate_dict(&json!("text")).errors,
            vec!["Locator must be a dictionary"]
        );
        assert_eq!(
            validate_dict(&json!({"invalid_key": "value"})).errors,
            vec!["Unknown attribute: invalid_key"]
        );
        assert_eq!(
            validate_dict(&json!({"clickable": "yes", "index": -1})).errors,
            vec![
                "Attribute clickable must be boolean, got string",
                "Attribute index must be non-negative integer, got -1"
            ]
        );
    }

    #[test]
    fn test_dict_conflicting_families() {
        let report = validate_dict(&json!({"text": "a", "textContains": "b"}));
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("conflicting text attributes"));

        let report = validate_dict(&json!({"content-desc": "a", "content-descMatches": "b"}));
        assert!(report.errors[0].contains("conflicting description attributes"));
    }

    #[test]
    fn test_dict_nested() {
        assert!(validate_dict(&json!({"text": "a", "fromParent": {}})).is_valid());
        assert_eq!(
            validate_dict(&json!({"childSelector": "x"})).errors,
            vec!["Attribute childSelector must be nested locator, got string"]
        );
        assert_eq!(
            validate_dict(&json!({"childSelector": {"sibling": {"bogus": 1}}})).errors,
            vec!["Unknown attribute: childSelector.sibling.bogus"]
        );
    }

    #[test]
    fn test_dict_nesting_is_bounded() {
        let mut value = json!({"text": "leaf"});
        for _ in 0..10_000 {
            value = Value::Object(Map::from_iter([("fromParent".to_string(), value)]));
        }
        assert_eq!(
            validate_dict(&value).errors,
            vec![format!("Locator nesting exceeds {} levels", MAX_DICT_DEPTH)]
        );
        while let Some(inner) = value.get_mut("fromParent").map(Value::take) {
            value = inner;
        }
    }

    #[test]
    fn test_validate_as_checks_value_shape() {
        assert_eq!(
            validate_as(&json!({"text": "a"}), LocatorFormat::XPath).errors,
            vec!["xpath locator must be a string"]
        );
    }

    #[test]
    fn test_suggest_fixes() {
        let hints = suggest_fixes(&Locator::UiSelector(r#".text("a""#.into()));
        assert_eq!(
            hints,
            vec![
                "Add 'new UiSelector()' constructor",
                "Add semicolon at the end",
                "Check for balanced parentheses"
            ]
        );
        let hints = suggest_fixes(&Locator::XPath(r#"*[@text="a"][@b="c""#.into()));
        assert_eq!(
            hints,
            vec!["XPath must start with //", "Check for balanced brackets"]
        );
        let hints = suggest_fixes(&Locator::Dict(
            json!({"txt": "a", "checked": "no", "text": "a", "textMatches": "b"}),
        ));
        assert_eq!(
            hints,
            vec![
                "Remove or rename invalid attribute: txt",
                "Use a boolean value for checked",
                "Keep only one of: text, textMatches"
            ]
        );
        assert!(suggest_fixes(&Locator::XPath(r#"//*[@text="a"]"#.into())).is_empty());
    }

    #[test]
    fn test_validate_batch() {
        let summary = validate_batch(&[
            Locator::UiSelector(r#"new UiSelector().text("Button");"#.into()),
            Locator::XPath(r#"//*[@text="Button"]"#.into()),
            Locator::Dict(json!({})),
        ]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.invalid, 1);
        assert_eq!(summary.errors[0].index, 2);
        assert_eq!(summary.errors[0].format, LocatorFormat::Dict);
    }
}
