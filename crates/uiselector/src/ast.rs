//! The UiSelector syntax tree and its renderings.

use serde_json::{Value, json};
use std::fmt;

/// A chain of method calls: `new UiSelector().a(..).b(..)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selector {
    pub methods: Vec<MethodCall>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub name: String,
    pub args: Vec<Arg>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Str(String),
    Int(i64),
    Bool(bool),
    /// A bare identifier, kept verbatim (e.g. a constant name).
    Ident(String),
    Nested(Box<Selector>),
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a call, builder style.
    pub fn with_method(mut self, name: impl Into<String>, args: Vec<Arg>) -> Self {
        self.methods.push(MethodCall::new(name, args));
        self
    }

    /// Nesting depth of the selector tree; a flat chain has depth 1.
    pub fn depth(&self) -> usize {
        1 + self
            .methods
            .iter()
            .flat_map(|m| m.args.iter())
            .map(|arg| match arg {
                Arg::Nested(nested) => nested.depth(),
                _ => 0,
            })
            .max()
            .unwrap_or(0)
    }

    /// All method names in the tree, depth first.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        for method in &self.methods {
            out.push(&method.name);
            for arg in &method.args {
                if let Arg::Nested(nested) = arg {
                    nested.collect_names(out);
                }
            }
        }
    }

    /// The structural mirror `{"methods": [{"name": .., "args": [..]}]}`.
    pub fn to_json(&self) -> Value {
        let methods: Vec<Value> = self.methods.iter().map(MethodCall::to_json).collect();
        json!({ "methods": methods })
    }

    /// Renders the chain without the trailing `;`, as used for nested arguments.
    pub fn to_chain(&self) -> String {
        let mut out = String::from("new UiSelector()");
        for method in &self.methods {
            out.push_str(&method.to_string());
        }
        out
    }
}

impl MethodCall {
    pub fn new(name: impl Into<String>, args: Vec<Arg>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn to_json(&self) -> Value {
        let args: Vec<Value> = self.args.iter().map(Arg::to_json).collect();
        json!({ "name": self.name, "args": args })
    }
}

impl Arg {
    pub fn to_json(&self) -> Value {
        match self {
            Arg::Str(s) | Arg::Ident(s) => Value::String(s.clone()),
            Arg::Int(n) => json!(n),
            Arg::Bool(b) => Value::Bool(*b),
            Arg::Nested(nested) => nested.to_json(),
        }
    }

    pub fn as_nested(&self) -> Option<&Selector> {
        match self {
            Arg::Nested(nested) => Some(nested),
            _ => None,
        }
    }
}

/// Quotes a string for UiSelector source, escaping what the lexer unescapes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Top-level rendering, terminated by `;`.
impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};", self.to_chain())
    }
}

impl fmt::Display for MethodCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ".{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", arg)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Str(s) => f.write_str(&quote(s)),
            Arg::Int(n) => write!(f, "{}", n),
            Arg::Bool(b) => write!(f, "{}", b),
            Arg::Ident(s) => f.write_str(s),
            Arg::Nested(nested) => f.write_str(&nested.to_chain()),
        }
    }
}
