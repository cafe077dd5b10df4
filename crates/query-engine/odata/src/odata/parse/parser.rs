//! A recursive descent parser for `$filter` expressions.
//!
//! Precedence, loosest first: `or`, `and`, comparisons, `add`/`sub`,
//! `mul`/`div`/`mod`, unary `not` and `-`, then primaries.

use chrono::{DateTime, Utc};
use query_engine_ast::ast::{BinaryOperatorKind, FilterNode, MemberAccess, UnaryOperatorKind};
use query_engine_metadata::metadata::Value;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::lexer::{tokenize, Spanned, Token};
use crate::odata::error::Error;
use crate::odata::values::clr_type_for_edm;

/// The functions the filter language knows, with the argument counts they accept.
const FUNCTIONS: &[(&str, &[usize])] = &[
    ("day", &[1]),
    ("month", &[1]),
    ("year", &[1]),
    ("hour", &[1]),
    ("minute", &[1]),
    ("second", &[1]),
    ("floor", &[1]),
    ("ceiling", &[1]),
    ("round", &[1]),
    ("tolower", &[1]),
    ("toupper", &[1]),
    ("length", &[1]),
    ("trim", &[1]),
    ("contains", &[2]),
    ("startswith", &[2]),
    ("endswith", &[2]),
    ("concat", &[2]),
    ("indexof", &[2]),
    ("replace", &[3]),
    ("substring", &[2, 3]),
];

const COMPARISONS: &[(&str, BinaryOperatorKind)] = &[
    ("eq", BinaryOperatorKind::Eq),
    ("ne", BinaryOperatorKind::Ne),
    ("gt", BinaryOperatorKind::Gt),
    ("ge", BinaryOperatorKind::Ge),
    ("lt", BinaryOperatorKind::Lt),
    ("le", BinaryOperatorKind::Le),
];

const ADDITIVE: &[(&str, BinaryOperatorKind)] = &[
    ("add", BinaryOperatorKind::Add),
    ("sub", BinaryOperatorKind::Sub),
];

const MULTIPLICATIVE: &[(&str, BinaryOperatorKind)] = &[
    ("mul", BinaryOperatorKind::Mul),
    ("div", BinaryOperatorKind::Div),
    ("mod", BinaryOperatorKind::Mod),
];

static END: Token = Token::End;

/// Parse the value of a `$filter` option.
pub fn parse_filter(text: &str) -> Result<FilterNode, Error> {
    let mut parser = Parser {
        tokens: tokenize(text)?,
        index: 0,
    };
    let node = parser.or_expression()?;
    match parser.peek() {
        Token::End => Ok(node),
        other => Err(parser.error(format!("unexpected {}", describe(other)))),
    }
}

struct Parser {
    tokens: Vec<Spanned>,
    index: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        self.tokens
            .get(self.index)
            .map_or(&END, |spanned| &spanned.token)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .or_else(|| self.tokens.last())
            .map_or(0, |spanned| spanned.position)
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.index < self.tokens.len() {
            self.index += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::Parse {
            message: message.into(),
            position: self.position(),
        }
    }

    fn expect(&mut self, expected: &Token) -> Result<(), Error> {
        if self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(self.error(format!(
                "expected {} but found {}",
                describe(expected),
                describe(self.peek())
            )))
        }
    }

    /// The operator at the current token, if it is one of `operators`.
    fn operator(&self, operators: &[(&str, BinaryOperatorKind)]) -> Option<BinaryOperatorKind> {
        match self.peek() {
            Token::Identifier(name) => operators
                .iter()
                .find(|(keyword, _)| *keyword == name.as_str())
                .map(|(_, kind)| *kind),
            _ => None,
        }
    }

    fn binary_chain(
        &mut self,
        operators: &[(&str, BinaryOperatorKind)],
        operand: fn(&mut Self) -> Result<FilterNode, Error>,
    ) -> Result<FilterNode, Error> {
        let mut left = operand(self)?;
        while let Some(kind) = self.operator(operators) {
            self.advance();
            let right = operand(self)?;
            left = FilterNode::binary_from_children(kind, vec![left, right])?;
        }
        Ok(left)
    }

    fn or_expression(&mut self) -> Result<FilterNode, Error> {
        self.binary_chain(&[("or", BinaryOperatorKind::Or)], Self::and_expression)
    }

    fn and_expression(&mut self) -> Result<FilterNode, Error> {
        self.binary_chain(&[("and", BinaryOperatorKind::And)], Self::comparison)
    }

    fn comparison(&mut self) -> Result<FilterNode, Error> {
        let left = self.additive()?;
        match self.operator(COMPARISONS) {
            Some(kind) => {
                self.advance();
                let right = self.additive()?;
                Ok(FilterNode::binary_from_children(kind, vec![left, right])?)
            }
            None => Ok(left),
        }
    }

    fn additive(&mut self) -> Result<FilterNode, Error> {
        self.binary_chain(ADDITIVE, Self::multiplicative)
    }

    fn multiplicative(&mut self) -> Result<FilterNode, Error> {
        self.binary_chain(MULTIPLICATIVE, Self::unary)
    }

    fn unary(&mut self) -> Result<FilterNode, Error> {
        match self.peek() {
            Token::Identifier(name) if name == "not" => {
                self.advance();
                let operand = self.unary()?;
                Ok(FilterNode::unary_from_children(
                    UnaryOperatorKind::Not,
                    vec![operand],
                )?)
            }
            Token::Minus => {
                self.advance();
                if let Token::Number(text) = self.peek().clone() {
                    self.advance();
                    return Ok(FilterNode::Constant(self.number(&format!("-{text}"))?));
                }
                let operand = self.unary()?;
                Ok(FilterNode::unary_from_children(
                    UnaryOperatorKind::Negate,
                    vec![operand],
                )?)
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<FilterNode, Error> {
        let position = self.position();
        match self.advance() {
            Token::OpenParen => {
                let node = self.or_expression()?;
                self.expect(&Token::CloseParen)?;
                Ok(node)
            }
            Token::String(text) => Ok(FilterNode::Constant(Value::String(text))),
            Token::Number(text) => Ok(FilterNode::Constant(self.number(&text)?)),
            Token::Typed { prefix, text } => Ok(FilterNode::Constant(typed_literal(
                &prefix, &text, position,
            )?)),
            Token::Identifier(name) => {
                let keyword = match name.as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    "null" => Some(Value::Null),
                    _ => None,
                };
                if let Some(value) = keyword {
                    Ok(FilterNode::Constant(value))
                } else if *self.peek() == Token::OpenParen {
                    self.function(name, position)
                } else {
                    self.member(name)
                }
            }
            other => Err(Error::Parse {
                message: format!("unexpected {}", describe(&other)),
                position,
            }),
        }
    }

    fn member(&mut self, name: String) -> Result<FilterNode, Error> {
        let mut member = MemberAccess::new(name);
        while *self.peek() == Token::Slash {
            self.advance();
            match self.advance() {
                Token::Identifier(name) => member = member.then(name),
                other => {
                    return Err(self.error(format!(
                        "expected a member name after '/' but found {}",
                        describe(&other)
                    )))
                }
            }
        }
        Ok(FilterNode::MemberAccess(member))
    }

    fn function(&mut self, name: String, position: usize) -> Result<FilterNode, Error> {
        self.expect(&Token::OpenParen)?;
        let mut arguments = vec![];
        if *self.peek() != Token::CloseParen {
            loop {
                arguments.push(self.or_expression()?);
                if *self.peek() != Token::Comma {
                    break;
                }
                self.advance();
            }
        }
        self.expect(&Token::CloseParen)?;

        if name == "cast" {
            return cast(arguments, position);
        }
        let Some((_, arities)) = FUNCTIONS.iter().find(|(function, _)| *function == name) else {
            return Err(Error::Parse {
                message: format!("unknown function '{name}'"),
                position,
            });
        };
        if !arities.contains(&arguments.len()) {
            return Err(Error::Parse {
                message: format!(
                    "function '{name}' does not take {} argument(s)",
                    arguments.len()
                ),
                position,
            });
        }
        Ok(FilterNode::FunctionCall { name, arguments })
    }

    /// A numeric literal: the suffix picks the type, otherwise the smallest
    /// integer type that holds it, or a double.
    fn number(&self, text: &str) -> Result<Value, Error> {
        let invalid = || self.error(format!("invalid number '{text}'"));
        let (digits, suffix) = match text.char_indices().last() {
            Some((index, c)) if c.is_ascii_alphabetic() => (&text[..index], Some(c)),
            _ => (text, None),
        };
        match suffix.map(|c| c.to_ascii_uppercase()) {
            Some('L') => digits.parse().map(Value::Int64).map_err(|_| invalid()),
            Some('F') => digits.parse().map(Value::Single).map_err(|_| invalid()),
            Some('D') => digits.parse().map(Value::Double).map_err(|_| invalid()),
            Some('M') => parse_decimal(digits).map(Value::Decimal).ok_or_else(invalid),
            Some(_) => Err(invalid()),
            None if digits.contains(|c| matches!(c, '.' | 'e' | 'E')) => {
                digits.parse().map(Value::Double).map_err(|_| invalid())
            }
            None => match digits.parse::<i32>() {
                Ok(value) => Ok(Value::Int32(value)),
                Err(_) => digits.parse().map(Value::Int64).map_err(|_| invalid()),
            },
        }
    }
}

fn parse_decimal(text: &str) -> Option<Decimal> {
    if text.contains(|c| matches!(c, 'e' | 'E')) {
        Decimal::from_scientific(text).ok()
    } else {
        text.parse().ok()
    }
}

fn typed_literal(prefix: &str, text: &str, position: usize) -> Result<Value, Error> {
    let invalid = || Error::Parse {
        message: format!("invalid {prefix} literal '{text}'"),
        position,
    };
    match prefix {
        "guid" => Uuid::parse_str(text).map(Value::Guid).map_err(|_| invalid()),
        "datetimeoffset" | "datetime" => {
            let date = DateTime::parse_from_rfc3339(text).map_err(|_| invalid())?;
            if date.offset().local_minus_utc() == 0 {
                Ok(Value::DateTime(date.with_timezone(&Utc)))
            } else {
                Ok(Value::DateTimeOffset(date))
            }
        }
        _ => Err(Error::Parse {
            message: format!("unknown literal type '{prefix}'"),
            position,
        }),
    }
}

/// `cast(value, Edm.Type)`.
fn cast(arguments: Vec<FilterNode>, position: usize) -> Result<FilterNode, Error> {
    let target = match arguments.as_slice() {
        [_, FilterNode::MemberAccess(member)] if !member.is_nested() => {
            clr_type_for_edm(&member.name)
        }
        _ => None,
    };
    let (Some(target), Some(source)) = (target, arguments.into_iter().next()) else {
        return Err(Error::Parse {
            message: "cast takes a value and an Edm type name".to_string(),
            position,
        });
    };
    Ok(FilterNode::Convert {
        source: Box::new(source),
        target,
    })
}

fn describe(token: &Token) -> String {
    match token {
        Token::OpenParen => "'('".to_string(),
        Token::CloseParen => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Identifier(name) => format!("'{name}'"),
        Token::String(text) => format!("string '{text}'"),
        Token::Number(text) => format!("number {text}"),
        Token::Typed { prefix, text } => format!("{prefix}'{text}'"),
        Token::End => "end of input".to_string(),
    }
}
