//! Tokenizer for the S-expression input.

use crate::error::{CoreError, Result};
use std::iter::Peekable;
use std::str::Chars;

/// Kind of a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// A bare symbol.
    Symbol(String),
    /// End of input.
    Eof,
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Kind.
    pub kind: TokenKind,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub col: u32,
}

/// Streaming tokenizer. Comments run from `;` to end of line.
pub struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: u32,
    col: u32,
}

impl<'a> Lexer<'a> {
    /// Tokenize `input`.
    #[must_use]
    pub fn new(input: &'a str) -> Self {
        Self {
            chars: input.chars().peekable(),
            line: 1,
            col: 1,
        }
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn skip_trivia(&mut self) {
        while let Some(&c) = self.chars.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn is_symbol_char(c: char) -> bool {
        !c.is_whitespace() && c != '(' && c != ')' && c != ';'
    }

    /// The next token.
    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_trivia();
        let (line, col) = (self.line, self.col);
        let Some(&c) = self.chars.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                line,
                col,
            });
        };
        let kind = match c {
            '(' => {
                self.bump();
                TokenKind::LParen
            }
            ')' => {
                self.bump();
                TokenKind::RParen
            }
            _ => {
                let mut text = String::new();
                while let Some(&c) = self.chars.peek() {
                    if !Self::is_symbol_char(c) {
                        break;
                    }
                    text.push(c);
                    self.bump();
                }
                if text.is_empty() {
                    return Err(CoreError::parse(line, col, format!("unexpected character `{c}`")));
                }
                TokenKind::Symbol(text)
            }
        };
        Ok(Token { kind, line, col })
    }
}
