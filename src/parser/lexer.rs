//! Lexer (tokenizer) for stax source code
//!
//! Converts raw source text into a flat [`Token`] stream consumed by the
//! parser. Words are whitespace-separated; `{`, `}`, and `"` additionally
//! end the word before them, so `fn main{` lexes the same as `fn main {`.
//! `//` comments run to end of line.

use super::ast::SourceLocation;
use std::fmt;

/// All token variants produced by the lexer.
///
/// Every variant carries a [`SourceLocation`] so that parse errors can
/// report an accurate line and column.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Unsigned integer literal.
    Int(usize, SourceLocation),
    /// Double-quoted string literal, quotes stripped. Single-byte
    /// characters only; no escape sequences.
    Str(String, SourceLocation),
    /// Any other whitespace-delimited word: keywords, operators,
    /// function names, let bindings.
    Word(String, SourceLocation),
    LBrace(SourceLocation),
    RBrace(SourceLocation),
    Eof(SourceLocation),
}

impl Token {
    /// Returns the source location where this token appears.
    pub fn location(&self) -> SourceLocation {
        match self {
            Token::Int(_, loc)
            | Token::Str(_, loc)
            | Token::Word(_, loc)
            | Token::LBrace(loc)
            | Token::RBrace(loc)
            | Token::Eof(loc) => *loc,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Int(value, _) => write!(f, "{}", value),
            Token::Str(text, _) => write!(f, "\"{}\"", text),
            Token::Word(word, _) => write!(f, "{}", word),
            Token::LBrace(_) => write!(f, "{{"),
            Token::RBrace(_) => write!(f, "}}"),
            Token::Eof(_) => write!(f, "end of input"),
        }
    }
}

/// Lexical error with location.
#[derive(Debug, Clone)]
pub struct LexError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lex error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for LexError {}

/// The lexer: a character walker with line/column tracking.
pub struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Lexer {
            chars: source.chars().peekable(),
            line: 1,
            column: 1,
        }
    }

    /// Tokenize the entire source, appending a final [`Token::Eof`].
    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            let location = self.location();
            let ch = match self.chars.peek() {
                Some(&ch) => ch,
                None => {
                    tokens.push(Token::Eof(location));
                    return Ok(tokens);
                }
            };

            match ch {
                '{' => {
                    self.bump();
                    tokens.push(Token::LBrace(location));
                }
                '}' => {
                    self.bump();
                    tokens.push(Token::RBrace(location));
                }
                '"' => tokens.push(self.lex_string(location)?),
                _ => tokens.push(self.lex_word(location)),
            }
        }
    }

    fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column)
    }

    /// Consume one character, tracking line and column.
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.chars.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    // Only a `//` pair starts a comment; a lone slash is a word.
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'/') {
                        while let Some(&ch) = self.chars.peek() {
                            if ch == '\n' {
                                break;
                            }
                            self.bump();
                        }
                    } else {
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    /// Lex a double-quoted string literal. The closing quote is required.
    fn lex_string(&mut self, location: SourceLocation) -> Result<Token, LexError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(Token::Str(text, location)),
                Some(ch) => text.push(ch),
                None => {
                    return Err(LexError {
                        message: "unterminated string literal".to_string(),
                        location,
                    });
                }
            }
        }
    }

    /// Lex a bare word up to whitespace, a brace, or a quote. Words that
    /// parse as unsigned integers become [`Token::Int`].
    fn lex_word(&mut self, location: SourceLocation) -> Token {
        let mut word = String::new();
        while let Some(&ch) = self.chars.peek() {
            if ch.is_whitespace() || ch == '{' || ch == '}' || ch == '"' {
                break;
            }
            word.push(ch);
            self.bump();
        }
        match word.parse::<usize>() {
            Ok(value) => Token::Int(value, location),
            Err(_) => Token::Word(word, location),
        }
    }
}
