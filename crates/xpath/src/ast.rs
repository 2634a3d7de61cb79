//! Defines the Abstract Syntax Tree (AST) for the locator XPath subset.
//!
//! Paths are kept as nested binary nodes (`a/b//c` is `Binary(Binary(a, /, b), //, c)`)
//! so consumers can walk them left to right without re-deriving separators.

use std::fmt;

/// The top-level expression produced by the parser.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(String),
    Number(f64),
    /// A path anchored at the document root: `/rel` or `//rel`.
    /// `relative` is `None` for a bare `/`.
    AbsolutePath {
        descendant: bool,
        relative: Option<Box<Expression>>,
    },
    /// Path separators, comparisons and logical operators.
    Binary {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    Step(Step),
    AbbreviatedStep(AbbreviatedStep),
    FunctionCall {
        name: String,
        args: Vec<Expression>,
    },
    /// A parenthesized expression with trailing predicates, like `(//*)[2]`.
    Predicated {
        base: Box<Expression>,
        predicates: Vec<Expression>,
    },
}

impl Expression {
    /// Checks if the expression is a `Step` or an `AbbreviatedStep`.
    pub fn is_step(&self) -> bool {
        matches!(self, Expression::Step(_) | Expression::AbbreviatedStep(_))
    }

    /// Returns the attribute name when the expression is a bare `@name` step.
    pub fn as_attribute_name(&self) -> Option<&str> {
        match self {
            Expression::Step(Step {
                axis: Some(Axis::Attribute),
                node_test: NodeTest::Name(name),
                predicates,
            }) if predicates.is_empty() => Some(name),
            _ => None,
        }
    }

    /// Checks if the expression is the `text()` node test.
    pub fn is_text_node(&self) -> bool {
        matches!(
            self,
            Expression::Step(Step {
                axis: None | Some(Axis::Child),
                node_test: NodeTest::NodeType(NodeTypeTest::Text),
                predicates,
            }) if predicates.is_empty()
        )
    }
}

/// A binary operator used in an expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    // Logical
    Or,
    And,
    // Equality
    Equals,
    NotEquals,
    // Path
    Path,
    DescendantPath,
}

impl BinaryOperator {
    pub fn is_path(self) -> bool {
        matches!(self, BinaryOperator::Path | BinaryOperator::DescendantPath)
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinaryOperator::Or | BinaryOperator::And)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::Or => "or",
            BinaryOperator::And => "and",
            BinaryOperator::Equals => "=",
            BinaryOperator::NotEquals => "!=",
            BinaryOperator::Path => "/",
            BinaryOperator::DescendantPath => "//",
        }
    }
}

/// `..` and `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbbreviatedStep {
    Parent,
    Current,
}

/// A single location step, like `following-sibling::*[@text="OK"]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// `None` when the step was written without an explicit axis.
    pub axis: Option<Axis>,
    pub node_test: NodeTest,
    pub predicates: Vec<Expression>,
}

/// The axis of movement from the context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Attribute,
    Parent,
    Ancestor,
    AncestorOrSelf,
    SelfAxis,
    FollowingSibling,
    PrecedingSibling,
    Following,
    Preceding,
}

impl Axis {
    pub fn name(self) -> &'static str {
        match self {
            Axis::Child => "child",
            Axis::Descendant => "descendant",
            Axis::DescendantOrSelf => "descendant-or-self",
            Axis::Attribute => "attribute",
            Axis::Parent => "parent",
            Axis::Ancestor => "ancestor",
            Axis::AncestorOrSelf => "ancestor-or-self",
            Axis::SelfAxis => "self",
            Axis::FollowingSibling => "following-sibling",
            Axis::PrecedingSibling => "preceding-sibling",
            Axis::Following => "following",
            Axis::Preceding => "preceding",
        }
    }
}

/// A test to apply to nodes on a given axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// A name test (e.g. `android.widget.Button`, `text`).
    Name(String),
    /// `*`
    Wildcard,
    /// A node type test (e.g. `text()`, `node()`).
    NodeType(NodeTypeTest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeTypeTest {
    Text,
    Node,
    Comment,
    ProcessingInstruction,
}

impl NodeTypeTest {
    pub fn name(self) -> &'static str {
        match self {
            NodeTypeTest::Text => "text",
            NodeTypeTest::Node => "node",
            NodeTypeTest::Comment => "comment",
            NodeTypeTest::ProcessingInstruction => "processing-instruction",
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(s) if s.contains('"') => write!(f, "'{}'", s),
            Expression::Literal(s) => write!(f, "\"{}\"", s),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::AbsolutePath {
                descendant,
                relative,
            } => {
                f.write_str(if *descendant { "//" } else { "/" })?;
                match relative {
                    Some(rel) => write!(f, "{}", rel),
                    None => Ok(()),
                }
            }
            Expression::Binary { left, op, right } if op.is_path() => {
                write!(f, "{}{}{}", left, op.symbol(), right)
            }
            Expression::Binary { left, op, right } => {
                write!(f, "{} {} {}", left, op.symbol(), right)
            }
            Expression::Step(step) => write!(f, "{}", step),
            Expression::AbbreviatedStep(AbbreviatedStep::Parent) => f.write_str(".."),
            Expression::AbbreviatedStep(AbbreviatedStep::Current) => f.write_str("."),
            Expression::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Expression::Predicated { base, predicates } => {
                write!(f, "({})", base)?;
                for p in predicates {
                    write!(f, "[{}]", p)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.axis {
            Some(Axis::Attribute) => f.write_str("@")?,
            Some(axis) => write!(f, "{}::", axis.name())?,
            None => {}
        }
        match &self.node_test {
            NodeTest::Name(name) => f.write_str(name)?,
            NodeTest::Wildcard => f.write_str("*")?,
            NodeTest::NodeType(t) => write!(f, "{}()", t.name())?,
        }
        for p in &self.predicates {
            write!(f, "[{}]", p)?;
        }
        Ok(())
    }
}
