//! The canonical dictionary locator and the format-tagged `Locator` input.

use crate::attributes::{Attribute, AttributeKind};
use crate::config::ConverterConfig;
use crate::error::LocatorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The three locator representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocatorFormat {
    UiSelector,
    #[serde(rename = "xpath")]
    XPath,
    Dict,
}

impl LocatorFormat {
    pub const ALL: [LocatorFormat; 3] = [
        LocatorFormat::UiSelector,
        LocatorFormat::XPath,
        LocatorFormat::Dict,
    ];

    pub fn name(self) -> &'static str {
        match self {
            LocatorFormat::UiSelector => "ui_selector",
            LocatorFormat::XPath => "xpath",
            LocatorFormat::Dict => "dict",
        }
    }
}

impl fmt::Display for LocatorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LocatorFormat {
    type Err = LocatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ui_selector" | "uiselector" | "ui" => Ok(LocatorFormat::UiSelector),
            "xpath" => Ok(LocatorFormat::XPath),
            "dict" => Ok(LocatorFormat::Dict),
            _ => Err(LocatorError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// A locator in any of the three formats.
///
/// Dictionary locators are carried as raw JSON so malformed input can still
/// reach the validator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Locator {
    UiSelector(String),
    XPath(String),
    Dict(Value),
}

impl Locator {
    /// Infers the format: strings starting with `new UiSelector` are selectors,
    /// other strings are XPath, anything else is a dictionary.
    pub fn detect(value: Value) -> Self {
        match value {
            Value::String(s) => Self::detect_str(&s),
            other => Locator::Dict(other),
        }
    }

    pub fn detect_str(source: &str) -> Self {
        if droidloc_uiselector::unwrap_source(source).starts_with("new UiSelector") {
            Locator::UiSelector(source.to_string())
        } else {
            Locator::XPath(source.to_string())
        }
    }

    /// Wraps a value declared to be in `format`.
    pub fn with_format(format: LocatorFormat, value: Value) -> Result<Self, LocatorError> {
        match (format, value) {
            (LocatorFormat::UiSelector, Value::String(s)) => Ok(Locator::UiSelector(s)),
            (LocatorFormat::XPath, Value::String(s)) => Ok(Locator::XPath(s)),
            (LocatorFormat::Dict, value) => Ok(Locator::Dict(value)),
            (format, _) => Err(LocatorError::InvalidSelector {
                format,
                errors: vec![format!("{} locator must be a string", format)],
            }),
        }
    }

    pub fn format(&self) -> LocatorFormat {
        match self {
            Locator::UiSelector(_) => LocatorFormat::UiSelector,
            Locator::XPath(_) => LocatorFormat::XPath,
            Locator::Dict(_) => LocatorFormat::Dict,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Locator::UiSelector(s) | Locator::XPath(s) => Some(s),
            Locator::Dict(_) => None,
        }
    }

    pub fn into_json(self) -> Value {
        match self {
            Locator::UiSelector(s) | Locator::XPath(s) => Value::String(s),
            Locator::Dict(v) => v,
        }
    }
}

impl From<DictLocator> for Locator {
    fn from(dict: DictLocator) -> Self {
        Locator::Dict(dict.to_json())
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::UiSelector(s) | Locator::XPath(s) => f.write_str(s),
            Locator::Dict(v) => write!(f, "{}", v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocatorValue {
    Str(String),
    Bool(bool),
    Int(u32),
    Nested(Box<DictLocator>),
}

impl LocatorValue {
    pub fn to_json(&self) -> Value {
        match self {
            LocatorValue::Str(s) => Value::String(s.clone()),
            LocatorValue::Bool(b) => Value::Bool(*b),
            LocatorValue::Int(n) => Value::from(*n),
            LocatorValue::Nested(dict) => dict.to_json(),
        }
    }

    pub fn as_nested(&self) -> Option<&DictLocator> {
        match self {
            LocatorValue::Nested(dict) => Some(dict),
            _ => None,
        }
    }
}

/// An ordered attribute map. Each attribute occurs at most once; inserting
/// an existing attribute replaces its value in place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DictLocator {
    entries: Vec<(Attribute, LocatorValue)>,
}

impl DictLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, attribute: Attribute, value: LocatorValue) -> Self {
        self.insert(attribute, value);
        self
    }

    pub fn insert(&mut self, attribute: Attribute, value: LocatorValue) {
        match self.entries.iter_mut().find(|(a, _)| *a == attribute) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((attribute, value)),
        }
    }

    pub fn get(&self, attribute: Attribute) -> Option<&LocatorValue> {
        self.entries
            .iter()
            .find(|(a, _)| *a == attribute)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, attribute: Attribute) -> bool {
        self.get(attribute).is_some()
    }

    /// Inserts every entry of `other`, in order.
    pub fn merge(&mut self, other: DictLocator) {
        for (attribute, value) in other.entries {
            self.insert(attribute, value);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &LocatorValue)> {
        self.entries.iter().map(|(a, v)| (*a, v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Nesting depth; a locator without hierarchical keys has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .entries
            .iter()
            .filter_map(|(_, v)| v.as_nested())
            .map(DictLocator::depth)
            .max()
            .unwrap_or(0)
    }

    /// Builds a locator from a JSON object, typing each value by its key.
    /// Nesting is limited to the default depth.
    pub fn from_json(value: &Value) -> Result<Self, LocatorError> {
        Self::from_json_with(value, &ConverterConfig::default())
    }

    /// Like [`DictLocator::from_json`], failing once nesting passes
    /// `config.max_depth`.
    pub fn from_json_with(value: &Value, config: &ConverterConfig) -> Result<Self, LocatorError> {
        read_map(value, 1, config)
    }

    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(a, v)| (a.dict_key().to_string(), v.to_json()))
            .collect();
        Value::Object(map)
    }
}

fn read_map(value: &Value, depth: usize, config: &ConverterConfig) -> Result<DictLocator, LocatorError> {
    config.check_depth(depth)?;
    let Value::Object(map) = value else {
        return Err(LocatorError::conversion("Locator must be a dictionary"));
    };

    let mut dict = DictLocator::new();
    for (key, raw) in map {
        let attribute = Attribute::from_dict_key(key)
            .ok_or_else(|| LocatorError::conversion(format!("Unknown attribute: {}", key)))?;
        dict.insert(attribute, typed_value(attribute, raw, depth, config)?);
    }
    Ok(dict)
}

fn typed_value(
    attribute: Attribute,
    raw: &Value,
    depth: usize,
    config: &ConverterConfig,
) -> Result<LocatorValue, LocatorError> {
    let mismatch = |expected: &str| {
        LocatorError::conversion(format!(
            "Attribute {} must be {}, got {}",
            attribute.dict_key(),
            expected,
            json_type_name(raw)
        ))
    };

    match attribute.kind() {
        AttributeKind::String => raw
            .as_str()
            .map(|s| LocatorValue::Str(s.to_string()))
            .ok_or_else(|| mismatch("string")),
        AttributeKind::Boolean => raw
            .as_bool()
            .map(LocatorValue::Bool)
            .ok_or_else(|| mismatch("boolean")),
        AttributeKind::Numeric => raw
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .map(LocatorValue::Int)
            .ok_or_else(|| mismatch("non-negative integer")),
        AttributeKind::Hierarchical => {
            read_map(raw, depth + 1, config).map(|d| LocatorValue::Nested(Box::new(d)))
        }
    }
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

impl fmt::Display for DictLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dict = DictLocator::new()
            .with(Attribute::Text, LocatorValue::Str("a".into()))
            .with(Attribute::Clickable, LocatorValue::Bool(true));
        dict.insert(Attribute::Text, LocatorValue::Str("b".into()));
        assert_eq!(dict.to_json(), json!({"text": "b", "clickable": true}));
        assert_eq!(dict.len(), 2);
    }

    #[test]
    fn test_json_round_trip_preserves_order() {
        let value = json!({
            "clickable": true,
            "text": "OK",
            "childSelector": {"instance": 2, "class": "android.widget.ImageView"}
        });
        let dict = DictLocator::from_json(&value).unwrap();
        assert_eq!(dict.depth(), 2);
        assert_eq!(dict.to_json().to_string(), value.to_string());
    }

    #[test]
    fn test_from_json_rejects_mistyped_values() {
        let err = DictLocator::from_json(&json!({"clickable": "yes"})).unwrap_err();
        assert_eq!(
            err,
            LocatorError::Conversion("Attribute clickable must be boolean, got string".into())
        );
        assert!(DictLocator::from_json(&json!({"index": -1})).is_err());
        assert!(DictLocator::from_json(&json!({"fromParent": "x"})).is_err());
        assert!(DictLocator::from_json(&json!({"bounds": "[0,0]"})).is_err());
        assert!(DictLocator::from_json(&json!(["text"])).is_err());
    }

    #[test]
    fn test_from_json_stops_at_max_depth() {
        let mut value = json!({"text": "leaf"});
        for _ in 0..10_000 {
            value = Value::Object(Map::from_iter([("childSelector".to_string(), value)]));
        }
        assert_eq!(
            DictLocator::from_json(&value).unwrap_err(),
            LocatorError::Conversion("Nesting depth 65 exceeds the limit of 64".into())
        );
        // Unwind level by level; dropping the whole value at once recurses.
        while let Some(inner) = value.get_mut("childSelector").map(Value::take) {
            value = inner;
        }

        let shallow = ConverterConfig {
            max_depth: 2,
            ..Default::default()
        };
        let two = json!({"childSelector": {"text": "a"}});
        assert_eq!(DictLocator::from_json_with(&two, &shallow).unwrap().depth(), 2);
        assert!(DictLocator::from_json_with(&json!({ "sibling": two }), &shallow).is_err());
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            Locator::detect(json!("new UiSelector().text(\"a\");")).format(),
            LocatorFormat::UiSelector
        );
        assert_eq!(Locator::detect(json!("//*[@text=\"a\"]")).format(), LocatorFormat::XPath);
        assert_eq!(Locator::detect(json!({"text": "a"})).format(), LocatorFormat::Dict);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("ui_selector".parse::<LocatorFormat>().unwrap(), LocatorFormat::UiSelector);
        assert_eq!("XPATH".parse::<LocatorFormat>().unwrap(), LocatorFormat::XPath);
        assert!(matches!(
            "css".parse::<LocatorFormat>(),
            Err(LocatorError::UnsupportedFormat(_))
        ));
    }
}
