//! The attribute table shared by every converter.
//!
//! Each recognized locator attribute is one `Attribute` variant. The variant
//! knows its dictionary key, UiSelector method, XPath attribute name, value
//! type and how values are rendered in each format.

use crate::error::LocatorError;
use crate::locator::LocatorValue;
use droidloc_uiselector::Arg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Text,
    TextContains,
    TextStartsWith,
    TextMatches,
    Description,
    DescriptionContains,
    DescriptionStartsWith,
    DescriptionMatches,
    ResourceId,
    ResourceIdMatches,
    PackageName,
    PackageNameMatches,
    ClassName,
    ClassNameMatches,
    Checkable,
    Checked,
    Clickable,
    Enabled,
    Focusable,
    Focused,
    LongClickable,
    Scrollable,
    Selected,
    Password,
    Index,
    Instance,
    ChildSelector,
    FromParent,
    Sibling,
}

/// The type of value an attribute carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    String,
    Boolean,
    Numeric,
    /// Holds a nested locator.
    Hierarchical,
}

/// Attributes of one family are mutually exclusive within a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Text,
    Description,
}

impl Family {
    pub fn name(self) -> &'static str {
        match self {
            Family::Text => "text",
            Family::Description => "description",
        }
    }
}

/// How a string attribute is compared against the element's value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    Equals,
    Contains,
    StartsWith,
    Matches,
}

impl MatchMode {
    /// The XPath function implementing the mode, if any.
    pub fn xpath_function(self) -> Option<&'static str> {
        match self {
            MatchMode::Equals => None,
            MatchMode::Contains => Some("contains"),
            MatchMode::StartsWith => Some("starts-with"),
            MatchMode::Matches => Some("matches"),
        }
    }

    pub fn from_xpath_function(name: &str) -> Option<Self> {
        match name {
            "contains" => Some(MatchMode::Contains),
            "starts-with" => Some(MatchMode::StartsWith),
            "matches" => Some(MatchMode::Matches),
            _ => None,
        }
    }
}

impl Attribute {
    pub const ALL: [Attribute; 29] = [
        Attribute::Text,
        Attribute::TextContains,
        Attribute::TextStartsWith,
        Attribute::TextMatches,
        Attribute::Description,
        Attribute::DescriptionContains,
        Attribute::DescriptionStartsWith,
        Attribute::DescriptionMatches,
        Attribute::ResourceId,
        Attribute::ResourceIdMatches,
        Attribute::PackageName,
        Attribute::PackageNameMatches,
        Attribute::ClassName,
        Attribute::ClassNameMatches,
        Attribute::Checkable,
        Attribute::Checked,
        Attribute::Clickable,
        Attribute::Enabled,
        Attribute::Focusable,
        Attribute::Focused,
        Attribute::LongClickable,
        Attribute::Scrollable,
        Attribute::Selected,
        Attribute::Password,
        Attribute::Index,
        Attribute::Instance,
        Attribute::ChildSelector,
        Attribute::FromParent,
        Attribute::Sibling,
    ];

    pub fn dict_key(self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::TextContains => "textContains",
            Attribute::TextStartsWith => "textStartsWith",
            Attribute::TextMatches => "textMatches",
            Attribute::Description => "content-desc",
            Attribute::DescriptionContains => "content-descContains",
            Attribute::DescriptionStartsWith => "content-descStartsWith",
            Attribute::DescriptionMatches => "content-descMatches",
            Attribute::ResourceId => "resource-id",
            Attribute::ResourceIdMatches => "resource-idMatches",
            Attribute::PackageName => "package",
            Attribute::PackageNameMatches => "packageMatches",
            Attribute::ClassName => "class",
            Attribute::ClassNameMatches => "classMatches",
            Attribute::Checkable => "checkable",
            Attribute::Checked => "checked",
            Attribute::Clickable => "clickable",
            Attribute::Enabled => "enabled",
            Attribute::Focusable => "focusable",
            Attribute::Focused => "focused",
            Attribute::LongClickable => "long-clickable",
            Attribute::Scrollable => "scrollable",
            Attribute::Selected => "selected",
            Attribute::Password => "password",
            Attribute::Index => "index",
            Attribute::Instance => "instance",
            Attribute::ChildSelector => "childSelector",
            Attribute::FromParent => "fromParent",
            Attribute::Sibling => "sibling",
        }
    }

    pub fn ui_method(self) -> &'static str {
        match self {
            Attribute::Text => "text",
            Attribute::TextContains => "textContains",
            Attribute::TextStartsWith => "textStartsWith",
            Attribute::TextMatches => "textMatches",
            Attribute::Description => "description",
            Attribute::DescriptionContains => "descriptionContains",
            Attribute::DescriptionStartsWith => "descriptionStartsWith",
            Attribute::DescriptionMatches => "descriptionMatches",
            Attribute::ResourceId => "resourceId",
            Attribute::ResourceIdMatches => "resourceIdMatches",
            Attribute::PackageName => "packageName",
            Attribute::PackageNameMatches => "packageNameMatches",
            Attribute::ClassName => "className",
            Attribute::ClassNameMatches => "classNameMatches",
            Attribute::Checkable => "checkable",
            Attribute::Checked => "checked",
            Attribute::Clickable => "clickable",
            Attribute::Enabled => "enabled",
            Attribute::Focusable => "focusable",
            Attribute::Focused => "focused",
            Attribute::LongClickable => "longClickable",
            Attribute::Scrollable => "scrollable",
            Attribute::Selected => "selected",
            Attribute::Password => "password",
            Attribute::Index => "index",
            Attribute::Instance => "instance",
            Attribute::ChildSelector => "childSelector",
            Attribute::FromParent => "fromParent",
            Attribute::Sibling => "sibling",
        }
    }

    /// The element attribute this entry tests in XPath. `index`, `instance`
    /// and the hierarchical entries are positional or structural instead.
    pub fn xpath_name(self) -> Option<&'static str> {
        match self {
            Attribute::Text
            | Attribute::TextContains
            | Attribute::TextStartsWith
            | Attribute::TextMatches => Some("text"),
            Attribute::Description
            | Attribute::DescriptionContains
            | Attribute::DescriptionStartsWith
            | Attribute::DescriptionMatches => Some("content-desc"),
            Attribute::ResourceId | Attribute::ResourceIdMatches => Some("resource-id"),
            Attribute::PackageName | Attribute::PackageNameMatches => Some("package"),
            Attribute::ClassName | Attribute::ClassNameMatches => Some("class"),
            Attribute::Checkable => Some("checkable"),
            Attribute::Checked => Some("checked"),
            Attribute::Clickable => Some("clickable"),
            Attribute::Enabled => Some("enabled"),
            Attribute::Focusable => Some("focusable"),
            Attribute::Focused => Some("focused"),
            Attribute::LongClickable => Some("long-clickable"),
            Attribute::Scrollable => Some("scrollable"),
            Attribute::Selected => Some("selected"),
            Attribute::Password => Some("password"),
            Attribute::Index
            | Attribute::Instance
            | Attribute::ChildSelector
            | Attribute::FromParent
            | Attribute::Sibling => None,
        }
    }

    pub fn kind(self) -> AttributeKind {
        match self {
            Attribute::Checkable
            | Attribute::Checked
            | Attribute::Clickable
            | Attribute::Enabled
            | Attribute::Focusable
            | Attribute::Focused
            | Attribute::LongClickable
            | Attribute::Scrollable
            | Attribute::Selected
            | Attribute::Password => AttributeKind::Boolean,
            Attribute::Index | Attribute::Instance => AttributeKind::Numeric,
            Attribute::ChildSelector | Attribute::FromParent | Attribute::Sibling => {
                AttributeKind::Hierarchical
            }
            _ => AttributeKind::String,
        }
    }

    pub fn family(self) -> Option<Family> {
        match self {
            Attribute::Text
            | Attribute::TextContains
            | Attribute::TextStartsWith
            | Attribute::TextMatches => Some(Family::Text),
            Attribute::Description
            | Attribute::DescriptionContains
            | Attribute::DescriptionStartsWith
            | Attribute::DescriptionMatches => Some(Family::Description),
            _ => None,
        }
    }

    pub fn match_mode(self) -> MatchMode {
        match self {
            Attribute::TextContains | Attribute::DescriptionContains => MatchMode::Contains,
            Attribute::TextStartsWith | Attribute::DescriptionStartsWith => MatchMode::StartsWith,
            Attribute::TextMatches
            | Attribute::DescriptionMatches
            | Attribute::ResourceIdMatches
            | Attribute::PackageNameMatches
            | Attribute::ClassNameMatches => MatchMode::Matches,
            _ => MatchMode::Equals,
        }
    }

    pub fn from_dict_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.dict_key() == key)
    }

    pub fn from_ui_method(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.ui_method() == name)
    }

    /// Resolves an XPath attribute test, e.g. `("text", Contains)` to `TextContains`.
    pub fn for_xpath(name: &str, mode: MatchMode) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.xpath_name() == Some(name) && a.match_mode() == mode)
    }

    pub fn is_hierarchical(self) -> bool {
        self.kind() == AttributeKind::Hierarchical
    }

    /// Renders one scalar value as a bracketed XPath predicate.
    pub fn xpath_predicate(self, value: &LocatorValue) -> Result<String, LocatorError> {
        match (self, value) {
            (Attribute::Index, LocatorValue::Int(n)) => {
                Ok(format!("[position()={}]", u64::from(*n) + 1))
            }
            (Attribute::Instance, LocatorValue::Int(n)) => Ok(format!("[{}]", u64::from(*n) + 1)),
            _ => {
                let name = self.xpath_name().ok_or_else(|| self.type_error(value))?;
                let literal = match (self.kind(), value) {
                    (AttributeKind::String, LocatorValue::Str(s)) => xpath_literal(s),
                    (AttributeKind::Boolean, LocatorValue::Bool(b)) => format!("\"{}\"", b),
                    _ => return Err(self.type_error(value)),
                };
                Ok(match self.match_mode().xpath_function() {
                    Some(function) => format!("[{}(@{}, {})]", function, name, literal),
                    None => format!("[@{}={}]", name, literal),
                })
            }
        }
    }

    /// Renders one scalar value as a UiSelector argument.
    pub fn ui_arg(self, value: &LocatorValue) -> Result<Arg, LocatorError> {
        match (self.kind(), value) {
            (AttributeKind::String, LocatorValue::Str(s)) => Ok(Arg::Str(s.clone())),
            (AttributeKind::Boolean, LocatorValue::Bool(b)) => Ok(Arg::Bool(*b)),
            (AttributeKind::Numeric, LocatorValue::Int(n)) => Ok(Arg::Int(i64::from(*n))),
            _ => Err(self.type_error(value)),
        }
    }

    /// Types the arguments of a UiSelector call. A boolean method without
    /// arguments means `true`.
    pub fn value_from_args(self, args: &[Arg]) -> Result<LocatorValue, LocatorError> {
        let method = self.ui_method();
        let arg = match args {
            [] if self.kind() == AttributeKind::Boolean => return Ok(LocatorValue::Bool(true)),
            [] => {
                return Err(LocatorError::conversion(format!(
                    "Method {} requires an argument",
                    method
                )));
            }
            [arg] => arg,
            _ => {
                return Err(LocatorError::conversion(format!(
                    "Method {} accepts at most one argument, got {}",
                    method,
                    args.len()
                )));
            }
        };

        match (self.kind(), arg) {
            (AttributeKind::String, Arg::Str(s) | Arg::Ident(s)) => Ok(LocatorValue::Str(s.clone())),
            (AttributeKind::Boolean, Arg::Bool(b)) => Ok(LocatorValue::Bool(*b)),
            (AttributeKind::Numeric, Arg::Int(n)) => u32::try_from(*n)
                .map(LocatorValue::Int)
                .map_err(|_| {
                    LocatorError::conversion(format!(
                        "Method {} requires a non-negative integer, got {}",
                        method, n
                    ))
                }),
            (AttributeKind::Hierarchical, _) => Err(LocatorError::conversion(format!(
                "Method {} requires a nested UiSelector",
                method
            ))),
            (kind, arg) => Err(LocatorError::conversion(format!(
                "Method {} expects a {} argument, got {}",
                method,
                kind_name(kind),
                arg
            ))),
        }
    }

    /// Types a literal taken from an XPath comparison.
    pub fn value_from_literal(self, literal: &str) -> Result<LocatorValue, LocatorError> {
        match self.kind() {
            AttributeKind::String => Ok(LocatorValue::Str(literal.to_string())),
            AttributeKind::Boolean if literal.eq_ignore_ascii_case("true") => {
                Ok(LocatorValue::Bool(true))
            }
            AttributeKind::Boolean if literal.eq_ignore_ascii_case("false") => {
                Ok(LocatorValue::Bool(false))
            }
            AttributeKind::Numeric => literal.parse::<u32>().map(LocatorValue::Int).map_err(|_| {
                LocatorError::conversion(format!(
                    "Attribute {} requires a non-negative integer, got '{}'",
                    self.dict_key(),
                    literal
                ))
            }),
            kind => Err(LocatorError::conversion(format!(
                "Attribute {} requires a {} value, got '{}'",
                self.dict_key(),
                kind_name(kind),
                literal
            ))),
        }
    }

    fn type_error(self, value: &LocatorValue) -> LocatorError {
        let found = match value {
            LocatorValue::Str(_) => "string",
            LocatorValue::Bool(_) => "boolean",
            LocatorValue::Int(_) => "integer",
            LocatorValue::Nested(_) => "nested locator",
        };
        LocatorError::conversion(format!(
            "Attribute {} requires a {} value, got {}",
            self.dict_key(),
            kind_name(self.kind()),
            found
        ))
    }
}

pub(crate) fn kind_name(kind: AttributeKind) -> &'static str {
    match kind {
        AttributeKind::String => "string",
        AttributeKind::Boolean => "boolean",
        AttributeKind::Numeric => "non-negative integer",
        AttributeKind::Hierarchical => "nested locator",
    }
}

/// Quotes a string as an XPath literal. XPath 1.0 has no escapes, so a value
/// holding both quote characters is assembled with `concat()`.
pub fn xpath_literal(value: &str) -> String {
    if !value.contains('"') {
        format!("\"{}\"", value)
    } else if !value.contains('\'') {
        format!("'{}'", value)
    } else {
        let parts: Vec<String> = value
            .split('"')
            .map(|part| format!("\"{}\"", part))
            .collect();
        format!("concat({})", parts.join(", '\"', "))
    }
}
