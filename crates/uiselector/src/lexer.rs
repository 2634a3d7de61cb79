//! Tokenizer for UiSelector chains such as `new UiSelector().text("OK");`.

use crate::error::SelectorError;
use std::fmt;
use std::iter::Peekable;
use std::str::CharIndices;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Dot,
    Ident,
    LParen,
    RParen,
    String,
    Number,
    True,
    False,
    New,
    UiSelector,
    Semi,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TokenKind::Dot => "'.'",
            TokenKind::Ident => "identifier",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::New => "'new'",
            TokenKind::UiSelector => "'UiSelector'",
            TokenKind::Semi => "';'",
            TokenKind::Eof => "end of input",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Unescaped contents for strings, source text otherwise.
    pub literal: String,
    /// Byte offset of the token start.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, literal: impl Into<String>, offset: usize) -> Self {
        Self {
            kind,
            literal: literal.into(),
            offset,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Ident | TokenKind::Number => write!(f, "{} '{}'", self.kind, self.literal),
            TokenKind::String => write!(f, "string \"{}\"", self.literal),
            _ => write!(f, "{}", self.kind),
        }
    }
}

/// Tokenizes `input`, always ending the list with an `Eof` token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, SelectorError> {
    Lexer::new(input).tokenize()
}

pub struct Lexer<'a> {
    input: &'a str,
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            chars: input.char_indices().peekable(),
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, SelectorError> {
        let mut tokens = Vec::new();

        while let Some(&(offset, ch)) = self.chars.peek() {
            let kind = match ch {
                c if c.is_whitespace() => {
                    self.chars.next();
                    continue;
                }
                '.' => TokenKind::Dot,
                '(' => TokenKind::LParen,
                ')' => TokenKind::RParen,
                ';' => TokenKind::Semi,
                '"' => {
                    tokens.push(self.read_string(offset)?);
                    continue;
                }
                c if c.is_ascii_digit() => {
                    tokens.push(self.read_number(offset));
                    continue;
                }
                c if c.is_alphabetic() || c == '_' || c == '$' => {
                    tokens.push(self.read_word(offset));
                    continue;
                }
                other => {
                    return Err(SelectorError::Lex {
                        message: format!("unexpected character '{}'", other),
                        offset,
                    });
                }
            };
            self.chars.next();
            tokens.push(Token::new(kind, ch.to_string(), offset));
        }

        tokens.push(Token::new(TokenKind::Eof, "", self.input.len()));
        Ok(tokens)
    }

    fn read_string(&mut self, start: usize) -> Result<Token, SelectorError> {
        self.chars.next(); // opening quote
        let mut buf = String::new();
        loop {
            match self.chars.next() {
                None => {
                    return Err(SelectorError::Lex {
                        message: "unterminated string".to_string(),
                        offset: start,
                    });
                }
                Some((_, '"')) => break,
                Some((escape_at, '\\')) => match self.chars.next() {
                    Some((_, '"')) => buf.push('"'),
                    Some((_, '\\')) => buf.push('\\'),
                    Some((_, 'n')) => buf.push('\n'),
                    Some((_, 't')) => buf.push('\t'),
                    Some((_, other)) => {
                        return Err(SelectorError::Lex {
                            message: format!("unknown escape sequence '\\{}'", other),
                            offset: escape_at,
                        });
                    }
                    None => {
                        return Err(SelectorError::Lex {
                            message: "unterminated string".to_string(),
                            offset: start,
                        });
                    }
                },
                Some((_, c)) => buf.push(c),
            }
        }
        Ok(Token::new(TokenKind::String, buf, start))
    }

    fn read_number(&mut self, start: usize) -> Token {
        let end = self.consume_while(|c| c.is_ascii_digit());
        Token::new(TokenKind::Number, &self.input[start..end], start)
    }

    fn read_word(&mut self, start: usize) -> Token {
        let end = self.consume_while(|c| c.is_alphanumeric() || c == '_' || c == '$');
        let word = &self.input[start..end];
        let kind = if word == "new" {
            TokenKind::New
        } else if word == "UiSelector" {
            TokenKind::UiSelector
        } else if word.eq_ignore_ascii_case("true") {
            TokenKind::True
        } else if word.eq_ignore_ascii_case("false") {
            TokenKind::False
        } else {
            TokenKind::Ident
        };
        Token::new(kind, word, start)
    }

    /// Consumes characters matching `pred` and returns the end offset.
    fn consume_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        while let Some(&(_, c)) = self.chars.peek() {
            if !pred(c) {
                break;
            }
            self.chars.next();
        }
        self.chars
            .peek()
            .map_or(self.input.len(), |&(offset, _)| offset)
    }
}
