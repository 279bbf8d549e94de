use crate::parser::ast::*;
use crate::parser::lexer::{LexError, Lexer, Token};
use std::fmt;

/// Parser error type
#[derive(Debug)]
pub struct ParseError {
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Parse error at line {}, column {}: {}",
            self.location.line, self.location.column, self.message
        )
    }
}

impl std::error::Error for ParseError {}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError {
            message: err.message,
            location: err.location,
        }
    }
}

/// Recursive descent parser for stax source.
///
/// The grammar is flat: a program is a sequence of `fn name { ... }`
/// definitions, and a block is a sequence of words, literals, and nested
/// `{ ... }` control blocks. Word resolution happens at parse time:
/// a word must be a known operation, a function defined *earlier* in the
/// file, or a let binding in scope, otherwise it is a parse error.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    position: usize,
}

impl Parser {
    pub fn new(source: &str) -> Result<Self, ParseError> {
        let mut lexer = Lexer::new(source);
        let tokens = lexer.tokenize()?;
        Ok(Self {
            tokens,
            position: 0,
        })
    }

    /// Parse the entire program (top-level function definitions).
    pub fn parse_program(&mut self) -> Result<Program, ParseError> {
        let mut program = Program::new();

        loop {
            match self.advance() {
                Token::Eof(_) => return Ok(program),
                Token::Word(word, location) if word == "fn" => {
                    let (name, body) = self.parse_function(&program, location)?;
                    program.functions.insert(name, body);
                }
                token => {
                    return Err(ParseError {
                        message: format!(
                            "unexpected {} at top level; expected a function definition",
                            token
                        ),
                        location: token.location(),
                    });
                }
            }
        }
    }

    /// Parse `name { ... }` after a `fn` keyword.
    fn parse_function(
        &mut self,
        program: &Program,
        fn_location: SourceLocation,
    ) -> Result<(String, Vec<Op>), ParseError> {
        let name = match self.advance() {
            Token::Word(name, _) => name,
            token => {
                return Err(ParseError {
                    message: format!("expected a function name after 'fn', found {}", token),
                    location: token.location(),
                });
            }
        };
        if program.functions.contains_key(&name) {
            return Err(ParseError {
                message: format!("function '{}' is defined twice", name),
                location: fn_location,
            });
        }
        self.expect_lbrace("after the function name")?;
        let body = self.parse_block(program, &[])?;
        Ok((name, body))
    }

    /// Parse ops until the closing `}` of the current block.
    ///
    /// `lets` holds the let bindings visible in this block, innermost last.
    fn parse_block(&mut self, program: &Program, lets: &[String]) -> Result<Vec<Op>, ParseError> {
        let mut ops = Vec::new();
        loop {
            match self.advance() {
                Token::RBrace(_) => return Ok(ops),
                Token::Int(value, _) => ops.push(Op::Push(value)),
                Token::Str(text, location) => {
                    if !text.is_ascii() {
                        return Err(ParseError {
                            message: "string literals are limited to single-byte characters"
                                .to_string(),
                            location,
                        });
                    }
                    let mut data = text.into_bytes();
                    data.push(0); // sentinel
                    ops.push(Op::PushStr(data));
                }
                Token::Word(word, location) => {
                    ops.push(self.parse_word(program, lets, &word, location)?);
                }
                Token::LBrace(location) => {
                    return Err(ParseError {
                        message: "unexpected '{'; blocks follow if/else/loop/while/let".to_string(),
                        location,
                    });
                }
                Token::Eof(location) => {
                    return Err(ParseError {
                        message: "unexpected end of input; expected '}'".to_string(),
                        location,
                    });
                }
            }
        }
    }

    /// Resolve a single word inside a block.
    fn parse_word(
        &mut self,
        program: &Program,
        lets: &[String],
        word: &str,
        location: SourceLocation,
    ) -> Result<Op, ParseError> {
        let op = match word {
            // math operations
            "+" => Op::Math(MathOp::Add),
            "-" => Op::Math(MathOp::Sub),
            "*" => Op::Math(MathOp::Mul),

            // comparisons
            "<" => Op::Cmp(CmpOp::Less),
            ">" => Op::Cmp(CmpOp::Greater),
            "=" => Op::Cmp(CmpOp::Equal),

            // stack shuffles
            "dup" => Op::Stack(StackOp::Dup),
            "swap" => Op::Stack(StackOp::Swap),
            "over" => Op::Stack(StackOp::Over),
            "rot" => Op::Stack(StackOp::Rot),
            "drop" => Op::Stack(StackOp::Drop),

            // flat memory
            "<-" => Op::Load,
            "->" => Op::Store,
            "alloc" => Op::Alloc,
            "free" => Op::Free,

            // output words
            "putc" => Op::Putc,
            "putu" => Op::Putu,
            "puts" => Op::Puts,
            "???" => Op::Dump,

            // control flow
            "break" => Op::Break,
            "continue" => Op::Continue,
            "loop" => {
                self.expect_lbrace("after 'loop'")?;
                Op::Loop(self.parse_block(program, lets)?)
            }
            "while" => {
                self.expect_lbrace("after 'while'")?;
                let condition = self.parse_block(program, lets)?;
                self.expect_lbrace("after the while condition")?;
                let body = self.parse_block(program, lets)?;
                Op::While(condition, body)
            }
            "if" => {
                self.expect_lbrace("after 'if'")?;
                let true_block = self.parse_block(program, lets)?;
                let false_block = if self.peek_is_word("else") {
                    self.advance();
                    self.expect_lbrace("after 'else'")?;
                    self.parse_block(program, lets)?
                } else {
                    Vec::new()
                };
                Op::If(true_block, false_block)
            }
            "let" => return self.parse_let(program, lets),
            "fn" => {
                return Err(ParseError {
                    message: "function definitions cannot be nested".to_string(),
                    location,
                });
            }
            "else" => {
                return Err(ParseError {
                    message: "'else' without a preceding if block".to_string(),
                    location,
                });
            }

            // anything else must name a function defined earlier or a
            // let binding in scope
            _ => {
                if program.functions.contains_key(word) {
                    Op::Call(word.to_string())
                } else if lets.iter().any(|name| name == word) {
                    Op::Local(word.to_string())
                } else {
                    return Err(ParseError {
                        message: format!("unknown word '{}'", word),
                        location,
                    });
                }
            }
        };
        Ok(op)
    }

    /// Parse `let a b ... { block }`. Binding names are read up to the
    /// opening brace; the first name takes the top of the stack.
    fn parse_let(&mut self, program: &Program, lets: &[String]) -> Result<Op, ParseError> {
        let mut names = Vec::new();
        loop {
            match self.advance() {
                Token::LBrace(_) => break,
                Token::Word(name, _) => names.push(name),
                token => {
                    return Err(ParseError {
                        message: format!("expected a binding name or '{{', found {}", token),
                        location: token.location(),
                    });
                }
            }
        }
        let mut scope = lets.to_vec();
        scope.extend(names.iter().cloned());
        let body = self.parse_block(program, &scope)?;
        Ok(Op::Let(names, body))
    }

    fn expect_lbrace(&mut self, context: &str) -> Result<(), ParseError> {
        match self.advance() {
            Token::LBrace(_) => Ok(()),
            token => Err(ParseError {
                message: format!("expected '{{' {}, found {}", context, token),
                location: token.location(),
            }),
        }
    }

    fn peek_is_word(&self, expected: &str) -> bool {
        matches!(
            self.tokens.get(self.position),
            Some(Token::Word(word, _)) if word == expected
        )
    }

    /// Consume and return the current token. The token vector always ends
    /// with `Eof`, which is returned again once the end is reached.
    fn advance(&mut self) -> Token {
        let token = self.tokens[self.position.min(self.tokens.len() - 1)].clone();
        if self.position < self.tokens.len() {
            self.position += 1;
        }
        token
    }
}
