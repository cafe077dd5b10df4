//! Split an OData expression into tokens.

use crate::odata::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    OpenParen,
    CloseParen,
    Comma,
    Minus,
    Slash,
    Identifier(String),
    String(String),
    /// A numeric literal, with its type suffix if it has one.
    Number(String),
    /// A literal with a type prefix, such as `guid'...'`.
    Typed { prefix: String, text: String },
    End,
}

/// A token and the character offset it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spanned {
    pub token: Token,
    pub position: usize,
}

const NUMBER_SUFFIXES: &[char] = &['L', 'l', 'F', 'f', 'M', 'm', 'D', 'd'];

pub fn tokenize(input: &str) -> Result<Vec<Spanned>, Error> {
    Lexer {
        chars: input.chars().collect(),
        index: 0,
    }
    .run()
}

struct Lexer {
    chars: Vec<char>,
    index: usize,
}

impl Lexer {
    fn run(mut self) -> Result<Vec<Spanned>, Error> {
        let mut tokens = vec![];
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.index += 1;
            }
            let position = self.index;
            let Some(c) = self.peek() else {
                tokens.push(Spanned {
                    token: Token::End,
                    position,
                });
                return Ok(tokens);
            };
            let token = match c {
                '(' => self.single(Token::OpenParen),
                ')' => self.single(Token::CloseParen),
                ',' => self.single(Token::Comma),
                '-' => self.single(Token::Minus),
                '/' => self.single(Token::Slash),
                '\'' => Token::String(self.quoted()?),
                c if c.is_ascii_digit() => self.number(),
                c if is_identifier_start(c) => {
                    let name = self.identifier();
                    if self.peek() == Some('\'') {
                        Token::Typed {
                            prefix: name,
                            text: self.quoted()?,
                        }
                    } else {
                        Token::Identifier(name)
                    }
                }
                other => {
                    return Err(Error::Parse {
                        message: format!("unexpected character '{other}'"),
                        position,
                    })
                }
            };
            tokens.push(Spanned { token, position });
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn single(&mut self, token: Token) -> Token {
        self.index += 1;
        token
    }

    fn take_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let start = self.index;
        while self.peek().is_some_and(&predicate) {
            self.index += 1;
        }
        self.chars[start..self.index].iter().collect()
    }

    fn identifier(&mut self) -> String {
        self.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | '@' | '$'))
    }

    /// A single quoted string. Two quotes in a row stand for one.
    fn quoted(&mut self) -> Result<String, Error> {
        let start = self.index;
        self.index += 1;
        let mut text = String::new();
        loop {
            match self.peek() {
                None => {
                    return Err(Error::Parse {
                        message: "unterminated string literal".to_string(),
                        position: start,
                    })
                }
                Some('\'') if self.peek_at(1) == Some('\'') => {
                    text.push('\'');
                    self.index += 2;
                }
                Some('\'') => {
                    self.index += 1;
                    return Ok(text);
                }
                Some(c) => {
                    text.push(c);
                    self.index += 1;
                }
            }
        }
    }

    fn number(&mut self) -> Token {
        let mut text = self.take_while(|c| c.is_ascii_digit());
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.index += 1;
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit()));
        }
        if matches!(self.peek(), Some('e' | 'E')) {
            let signed = matches!(self.peek_at(1), Some('+' | '-'));
            let digit_at = if signed { 2 } else { 1 };
            if self.peek_at(digit_at).is_some_and(|c| c.is_ascii_digit()) {
                text.extend(&self.chars[self.index..self.index + digit_at]);
                self.index += digit_at;
                text.push_str(&self.take_while(|c| c.is_ascii_digit()));
            }
        }
        if let Some(suffix) = self.peek().filter(|c| NUMBER_SUFFIXES.contains(c)) {
            if !self.peek_at(1).is_some_and(char::is_alphanumeric) {
                self.index += 1;
                text.push(suffix);
            }
        }
        Token::Number(text)
    }
}

fn is_identifier_start(c: char) -> bool {
    c.is_alphabetic() || matches!(c, '_' | '$' | '@')
}
