//! A `nom`-based parser for the XPath subset accepted by locators.
//!
//! Supported: `/`, `//`, `.`, `..`, explicit axes, `*`/name/node-type tests,
//! bracket predicates, string and number literals, function calls, `=`/`!=`.
//! `and`/`or` are parsed so callers can reject them with a precise message.

use super::ast::*;
use crate::error::XPathError;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, map_res, not, opt, peek, recognize, value},
    multi::{many0, separated_list0},
    sequence::{delimited, pair, terminated},
};

/// Bracket and parenthesis nesting accepted before the recursive parser runs.
pub const MAX_NESTING: usize = 128;

// --- Main Public Parser ---

pub fn parse_expression(input: &str) -> Result<Expression, XPathError> {
    check_nesting(input)?;
    match expression(input.trim()) {
        Ok(("", expr)) => Ok(expr),
        Ok((rem, _)) => Err(XPathError::XPathParse(
            input.to_string(),
            format!("Parser did not consume all input. Remainder: '{}'", rem),
        )),
        Err(e) => Err(XPathError::XPathParse(input.to_string(), e.to_string())),
    }
}

fn check_nesting(input: &str) -> Result<(), XPathError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    for c in input.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => {
                depth += 1;
                if depth > MAX_NESTING {
                    return Err(XPathError::NestingTooDeep {
                        depth,
                        limit: MAX_NESTING,
                    });
                }
            }
            (None, ']' | ')') => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

// --- Combinators & Helpers ---

fn ws<'a, F, O, E>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
    E: nom::error::ParseError<&'a str>,
{
    delimited(multispace0, inner, multispace0)
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '$')
}

fn build_binary_expr_parser<'a, F, G>(
    sub_expr_parser: F,
    op_parser: G,
) -> impl FnMut(&'a str) -> IResult<&'a str, Expression>
where
    F: Parser<&'a str, Output = Expression, Error = nom::error::Error<&'a str>> + Clone,
    G: Parser<&'a str, Output = BinaryOperator, Error = nom::error::Error<&'a str>> + Clone,
{
    move |input: &str| {
        let (input, mut left) = sub_expr_parser.clone().parse(input)?;
        let (input, remainder) =
            many0(pair(ws(op_parser.clone()), sub_expr_parser.clone())).parse(input)?;

        for (op, right) in remainder {
            left = Expression::Binary {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok((input, left))
    }
}

// --- Expression Parsers (in order of precedence) ---

fn expression(input: &str) -> IResult<&str, Expression> {
    or_expr(input)
}

fn or_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(terminated(tag("or"), not(satisfy(is_name_char))), |_| {
        BinaryOperator::Or
    })
    .parse(input)
}

fn and_op(input: &str) -> IResult<&str, BinaryOperator> {
    map(terminated(tag("and"), not(satisfy(is_name_char))), |_| {
        BinaryOperator::And
    })
    .parse(input)
}

fn equality_op(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("!="), |_| BinaryOperator::NotEquals),
        map(tag("="), |_| BinaryOperator::Equals),
    ))
    .parse(input)
}

fn or_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(and_expr, or_op)(input)
}

fn and_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(equality_expr, and_op)(input)
}

fn equality_expr(input: &str) -> IResult<&str, Expression> {
    build_binary_expr_parser(path_expr, equality_op)(input)
}

/// Absolute paths, primaries optionally followed by steps, and relative paths.
/// Primaries go before relative paths so `position()` is not read as a step name.
fn path_expr(input: &str) -> IResult<&str, Expression> {
    ws(alt((absolute_path, filtered_path, relative_path))).parse(input)
}

fn path_separator(input: &str) -> IResult<&str, BinaryOperator> {
    alt((
        map(tag("//"), |_| BinaryOperator::DescendantPath),
        map(tag("/"), |_| BinaryOperator::Path),
    ))
    .parse(input)
}

fn absolute_path(input: &str) -> IResult<&str, Expression> {
    let (i, sep) = path_separator(input)?;
    let (i, relative) = opt(relative_path).parse(i)?;
    Ok((
        i,
        Expression::AbsolutePath {
            descendant: sep == BinaryOperator::DescendantPath,
            relative: relative.map(Box::new),
        },
    ))
}

fn relative_path(input: &str) -> IResult<&str, Expression> {
    let (i, first) = step_expr(input)?;
    chain_steps(i, first)
}

fn filtered_path(input: &str) -> IResult<&str, Expression> {
    let (i, start) = primary_expr(input)?;
    chain_steps(i, start)
}

fn chain_steps(input: &str, first: Expression) -> IResult<&str, Expression> {
    let (i, rest) = many0(pair(path_separator, step_expr)).parse(input)?;
    let expr = rest
        .into_iter()
        .fold(first, |left, (op, right)| Expression::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        });
    Ok((i, expr))
}

fn primary_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(number, Expression::Number),
        map(string_literal, Expression::Literal),
        function_call,
        parenthesized,
    ))
    .parse(input)
}

fn parenthesized(input: &str) -> IResult<&str, Expression> {
    let (i, inner) = delimited(ws(char('(')), expression, ws(char(')'))).parse(input)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    if predicates.is_empty() {
        Ok((i, inner))
    } else {
        Ok((
            i,
            Expression::Predicated {
                base: Box::new(inner),
                predicates,
            },
        ))
    }
}

// --- Literal Parsers ---

fn number(input: &str) -> IResult<&str, f64> {
    map_res(recognize(pair(digit1, opt(pair(char('.'), digit1)))), |s: &str| {
        s.parse::<f64>()
    })
    .parse(input)
}

fn string_literal(input: &str) -> IResult<&str, String> {
    map(
        alt((
            delimited(char('\''), take_while(|c| c != '\''), char('\'')),
            delimited(char('"'), take_while(|c| c != '"'), char('"')),
        )),
        |s: &str| s.to_string(),
    )
    .parse(input)
}

// --- Name and NodeTest Parsers ---

fn name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        take_while1(|c: char| c.is_alphabetic() || c == '_'),
        take_while(is_name_char),
    ))
    .parse(input)
}

fn node_type_test(input: &str) -> IResult<&str, NodeTest> {
    map(
        terminated(
            alt((
                tag("text"),
                tag("node"),
                tag("comment"),
                tag("processing-instruction"),
            )),
            pair(ws(char('(')), char(')')),
        ),
        |node_type: &str| match node_type {
            "text" => NodeTest::NodeType(NodeTypeTest::Text),
            "comment" => NodeTest::NodeType(NodeTypeTest::Comment),
            "processing-instruction" => NodeTest::NodeType(NodeTypeTest::ProcessingInstruction),
            _ => NodeTest::NodeType(NodeTypeTest::Node), // "node"
        },
    )
    .parse(input)
}

fn node_test(input: &str) -> IResult<&str, NodeTest> {
    alt((
        map(char('*'), |_| NodeTest::Wildcard),
        node_type_test,
        map(name, |s: &str| NodeTest::Name(s.to_string())),
    ))
    .parse(input)
}

// --- Path Parsers ---

fn axis_name(input: &str) -> IResult<&str, Axis> {
    alt((
        value(Axis::DescendantOrSelf, tag("descendant-or-self")),
        value(Axis::Descendant, tag("descendant")),
        value(Axis::AncestorOrSelf, tag("ancestor-or-self")),
        value(Axis::Ancestor, tag("ancestor")),
        value(Axis::FollowingSibling, tag("following-sibling")),
        value(Axis::Following, tag("following")),
        value(Axis::PrecedingSibling, tag("preceding-sibling")),
        value(Axis::Preceding, tag("preceding")),
        value(Axis::Child, tag("child")),
        value(Axis::Attribute, tag("attribute")),
        value(Axis::Parent, tag("parent")),
        value(Axis::SelfAxis, tag("self")),
    ))
    .parse(input)
}

fn axis_specifier(input: &str) -> IResult<&str, Axis> {
    alt((
        map(char('@'), |_| Axis::Attribute),
        terminated(axis_name, tag("::")),
    ))
    .parse(input)
}

fn predicate(input: &str) -> IResult<&str, Expression> {
    delimited(ws(char('[')), expression, ws(char(']'))).parse(input)
}

fn abbreviated_step(input: &str) -> IResult<&str, AbbreviatedStep> {
    alt((
        value(AbbreviatedStep::Parent, tag("..")),
        value(AbbreviatedStep::Current, tag(".")),
    ))
    .parse(input)
}

fn step(input: &str) -> IResult<&str, Step> {
    let (i, axis) = opt(axis_specifier).parse(input)?;
    let (i, node_test) = node_test(i)?;
    let (i, predicates) = many0(predicate).parse(i)?;
    Ok((
        i,
        Step {
            axis,
            node_test,
            predicates,
        },
    ))
}

fn step_expr(input: &str) -> IResult<&str, Expression> {
    alt((
        map(abbreviated_step, Expression::AbbreviatedStep),
        map(step, Expression::Step),
    ))
    .parse(input)
}

// --- Function Call Parser ---

fn function_call(input: &str) -> IResult<&str, Expression> {
    // A function call must be a name followed by '('. This lookahead avoids
    // parsing a simple step name (like 'foo' in 'foo/bar') as a function.
    let (i, name) = name(input)?;
    let (i, _) = peek(ws(char('('))).parse(i)?;

    // Node-type tests like text() are not functions. They are handled by the step parser.
    if matches!(name, "text" | "node" | "comment" | "processing-instruction") {
        return Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        )));
    }

    let (i, _) = multispace0(i)?;
    let (i, args) = delimited(
        char('('),
        separated_list0(ws(char(',')), expression),
        ws(char(')')),
    )
    .parse(i)?;

    Ok((
        i,
        Expression::FunctionCall {
            name: name.to_string(),
            args,
        },
    ))
}
