//! Recursive-descent parser over the token stream.
//!
//! ```text
//! selector := ["new" "UiSelector" "(" ")"] {method} [";"]
//! method   := "." IDENT "(" [arg] ")"
//! arg      := STRING | NUMBER | TRUE | FALSE | IDENT | nested
//! nested   := "new" "UiSelector" "(" ")" {method}
//! ```
//!
//! The constructor prefix is optional at the top level and mandatory for
//! nested selectors.

use crate::ast::{Arg, MethodCall, Selector};
use crate::error::SelectorError;
use crate::lexer::{Token, TokenKind, tokenize};

/// Nesting accepted before the parser gives up, regardless of caller limits.
pub const MAX_NESTING: usize = 256;

/// Lexes and parses a complete selector. Only `;` and the end of input may
/// follow the method chain.
pub fn parse_selector(input: &str) -> Result<Selector, SelectorError> {
    let source = unwrap_source(input);
    let mut parser = Parser::new(tokenize(source)?);
    let selector = parser.parse()?;
    parser.expect(TokenKind::Eof)?;
    Ok(selector)
}

/// Trims `input` and drops one pair of wrapping single quotes, as found in
/// selectors copied out of test scripts.
pub fn unwrap_source(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .unwrap_or(trimmed)
}

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let offset = tokens
                .last()
                .map_or(0, |t| t.offset + t.literal.len());
            tokens.push(Token::new(TokenKind::Eof, "", offset));
        }
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    /// Parses a selector, stopping at `;` (consumed), end of input, or an
    /// unmatched `)` (left in place).
    pub fn parse(&mut self) -> Result<Selector, SelectorError> {
        if self.peek().kind == TokenKind::New {
            self.constructor()?;
        }
        let selector = self.method_chain()?;
        if self.peek().kind == TokenKind::Semi {
            self.advance();
        }
        Ok(selector)
    }

    pub fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, so the list is never empty.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn expect(&mut self, kind: TokenKind) -> Result<Token, SelectorError> {
        let token = self.peek();
        if token.kind != kind {
            return Err(SelectorError::Parse {
                message: format!("expected {}, found {}", kind, token),
                offset: token.offset,
            });
        }
        Ok(self.advance())
    }

    fn constructor(&mut self) -> Result<(), SelectorError> {
        self.expect(TokenKind::New)?;
        self.expect(TokenKind::UiSelector)?;
        self.expect(TokenKind::LParen)?;
        self.expect(TokenKind::RParen)?;
        Ok(())
    }

    fn method_chain(&mut self) -> Result<Selector, SelectorError> {
        let mut selector = Selector::new();
        while self.peek().kind == TokenKind::Dot {
            selector.methods.push(self.method_call()?);
        }
        Ok(selector)
    }

    fn method_call(&mut self) -> Result<MethodCall, SelectorError> {
        self.expect(TokenKind::Dot)?;
        let name = self.expect(TokenKind::Ident)?.literal;
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        if self.peek().kind != TokenKind::RParen {
            args.push(self.arg()?);
        }
        self.expect(TokenKind::RParen)?;
        Ok(MethodCall::new(name, args))
    }

    fn arg(&mut self) -> Result<Arg, SelectorError> {
        let token = self.peek().clone();
        match token.kind {
            TokenKind::String => {
                self.advance();
                Ok(Arg::Str(token.literal))
            }
            TokenKind::True => {
                self.advance();
                Ok(Arg::Bool(true))
            }
            TokenKind::False => {
                self.advance();
                Ok(Arg::Bool(false))
            }
            TokenKind::Number => {
                self.advance();
                token
                    .literal
                    .parse::<i64>()
                    .map(Arg::Int)
                    .map_err(|_| SelectorError::Parse {
                        message: format!("integer literal '{}' is out of range", token.literal),
                        offset: token.offset,
                    })
            }
            TokenKind::Ident => {
                self.advance();
                Ok(Arg::Ident(token.literal))
            }
            TokenKind::New => self.nested_selector().map(|s| Arg::Nested(Box::new(s))),
            _ => Err(SelectorError::Parse {
                message: format!("unexpected {} in argument", token),
                offset: token.offset,
            }),
        }
    }

    fn nested_selector(&mut self) -> Result<Selector, SelectorError> {
        let offset = self.peek().offset;
        self.depth += 1;
        if self.depth > MAX_NESTING {
            return Err(SelectorError::Parse {
                message: format!("selector nesting exceeds {} levels", MAX_NESTING),
                offset,
            });
        }
        self.constructor()?;
        let nested = self.method_chain()?;
        self.depth -= 1;
        Ok(nested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_chain() {
        let selector =
            parse_selector(r#"new UiSelector().text("OK").clickable(true).index(2);"#).unwrap();
        assert_eq!(
            selector,
            Selector::new()
                .with_method("text", vec![Arg::Str("OK".into())])
                .with_method("clickable", vec![Arg::Bool(true)])
                .with_method("index", vec![Arg::Int(2)])
        );
    }

    #[test]
    fn test_prefix_is_optional_at_top_level() {
        let selector = parse_selector(r#".text("OK")"#).unwrap();
        assert_eq!(selector.methods.len(), 1);
        assert_eq!(selector.methods[0].name, "text");
    }

    #[test]
    fn test_nullary_method() {
        let selector = parse_selector("new UiSelector().clickable();").unwrap();
        assert!(selector.methods[0].args.is_empty());
    }

    #[test]
    fn test_identifier_argument() {
        let selector = parse_selector("new UiSelector().className(Button);").unwrap();
        assert_eq!(selector.methods[0].args, vec![Arg::Ident("Button".into())]);
    }

    #[test]
    fn test_nested_selector_stops_at_parent_paren() {
        let selector = parse_selector(
            r#"new UiSelector().scrollable(true).childSelector(new UiSelector().text("История"));"#,
        )
        .unwrap();
        let nested = selector.methods[1].args[0].as_nested().unwrap();
        assert_eq!(nested.methods[0].name, "text");
        assert_eq!(nested.methods[0].args, vec![Arg::Str("История".into())]);
    }

    #[test]
    fn test_nested_selector_requires_constructor() {
        let err = parse_selector(r#"new UiSelector().childSelector(.text("x"));"#).unwrap_err();
        assert!(matches!(err, SelectorError::Parse { offset: 31, .. }));
    }

    #[test]
    fn test_parser_stops_at_unmatched_paren() {
        let mut parser = Parser::new(tokenize(r#".text("a"))"#).unwrap());
        let selector = parser.parse().unwrap();
        assert_eq!(selector.methods.len(), 1);
        assert!(!parser.is_at_end());
    }

    #[test]
    fn test_trailing_tokens_are_rejected() {
        let err = parse_selector(r#"new UiSelector().text("a"); .x()"#).unwrap_err();
        assert!(matches!(err, SelectorError::Parse { .. }));
        assert!(err.to_string().contains("expected end of input"));
    }

    #[test]
    fn test_error_names_token_and_offset() {
        let err = parse_selector("new UiSelector().text(;").unwrap_err();
        assert_eq!(
            err,
            SelectorError::Parse {
                message: "unexpected ';' in argument".into(),
                offset: 22,
            }
        );
    }

    #[test]
    fn test_two_arguments_are_rejected() {
        assert!(parse_selector(r#"new UiSelector().text("a" "b");"#).is_err());
    }

    #[test]
    fn test_single_quoted_wrapper_is_stripped() {
        let selector = parse_selector(r#"'new UiSelector().text("OK");'"#).unwrap();
        assert_eq!(selector.methods[0].name, "text");
    }

    #[test]
    fn test_nesting_guard() {
        let mut source = String::from("new UiSelector()");
        for _ in 0..(MAX_NESTING + 1) {
            source.push_str(".childSelector(new UiSelector()");
        }
        source.push_str(&")".repeat(MAX_NESTING + 1));
        let err = parse_selector(&source).unwrap_err();
        assert!(err.to_string().contains("nesting exceeds"));
    }

    #[test]
    fn test_display_round_trip() {
        let source = r#"new UiSelector().className("android.widget.RadioButton").fromParent(new UiSelector().resourceId("ru.sigma:id/paymentMethods"));"#;
        let selector = parse_selector(source).unwrap();
        assert_eq!(selector.to_string(), source);
        assert_eq!(parse_selector(&selector.to_string()).unwrap(), selector);
    }
}
