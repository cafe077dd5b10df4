//! Translate filter trees into SQL expressions.

use query_engine_ast::ast::{BinaryOperatorKind, FilterNode, UnaryOperatorKind};
use query_engine_metadata::metadata::{StoreType, TableDefinition, Value};
use thiserror::Error;

use super::values::to_sql_value;
use crate::sql::ast::{BinaryOperator, Expression, Function};
use crate::sql::helpers::{binary, call, cast, column, date_part, integer, text};

/// Why a filter cannot be expressed in SQL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unsupported {
    #[error("the '{0:?}' operator has no SQL form")]
    Operator(BinaryOperatorKind),
    #[error("the function '{0}' has no SQL form")]
    Function(String),
    #[error("the function '{name}' does not take {arity} argument(s)")]
    Arity { name: String, arity: usize },
    #[error("the nested member '{0}' is not a column")]
    NestedMember(String),
}

const FUNCTIONS: &[&str] = &[
    "day",
    "month",
    "year",
    "hour",
    "minute",
    "second",
    "floor",
    "ceiling",
    "round",
    "tolower",
    "toupper",
    "length",
    "trim",
    "contains",
    "startswith",
    "endswith",
    "concat",
    "indexof",
    "replace",
    "substring",
];

/// Translate a filter tree. Any node without a SQL form fails the whole tree.
pub fn translate_filter(
    node: &FilterNode,
    table: &TableDefinition,
) -> Result<Expression, Unsupported> {
    match node {
        FilterNode::Constant(value) => Ok(Expression::Value(to_sql_value(value))),
        FilterNode::MemberAccess(member) => {
            if member.is_nested() {
                Err(Unsupported::NestedMember(member.to_string()))
            } else {
                Ok(column(&member.name))
            }
        }
        FilterNode::UnaryOperator { kind, operand } => {
            let operand = Box::new(translate_filter(operand, table)?);
            Ok(match kind {
                UnaryOperatorKind::Not => Expression::Not(operand),
                UnaryOperatorKind::Negate => Expression::Negate(operand),
            })
        }
        FilterNode::BinaryOperator { kind, left, right } => {
            translate_binary(*kind, left, right, table)
        }
        FilterNode::FunctionCall { name, arguments } => {
            let args = arguments
                .iter()
                .map(|argument| translate_filter(argument, table))
                .collect::<Result<Vec<_>, _>>()?;
            translate_function(name, args)
        }
        FilterNode::Convert { source, target } => Ok(cast(
            translate_filter(source, table)?,
            StoreType::cast_type_for(target),
        )),
    }
}

fn translate_binary(
    kind: BinaryOperatorKind,
    left: &FilterNode,
    right: &FilterNode,
    table: &TableDefinition,
) -> Result<Expression, Unsupported> {
    // Comparisons with null test for it rather than compare against it.
    if matches!(kind, BinaryOperatorKind::Eq | BinaryOperatorKind::Ne) {
        let operand = match (left, right) {
            (operand, FilterNode::Constant(Value::Null))
            | (FilterNode::Constant(Value::Null), operand) => Some(operand),
            _ => None,
        };
        if let Some(operand) = operand {
            return Ok(Expression::IsNull {
                expression: Box::new(translate_filter(operand, table)?),
                negated: kind == BinaryOperatorKind::Ne,
            });
        }
    }

    let mut left_sql = translate_filter(left, table)?;
    let mut right_sql = translate_filter(right, table)?;
    let operator = match kind {
        BinaryOperatorKind::And => {
            return Ok(Expression::And {
                left: Box::new(left_sql),
                right: Box::new(right_sql),
            })
        }
        BinaryOperatorKind::Or => {
            return Ok(Expression::Or {
                left: Box::new(left_sql),
                right: Box::new(right_sql),
            })
        }
        BinaryOperatorKind::Mod => return Err(Unsupported::Operator(kind)),
        BinaryOperatorKind::Eq => BinaryOperator::Equals,
        BinaryOperatorKind::Ne => BinaryOperator::NotEquals,
        BinaryOperatorKind::Gt => BinaryOperator::GreaterThan,
        BinaryOperatorKind::Ge => BinaryOperator::GreaterThanOrEqualTo,
        BinaryOperatorKind::Lt => BinaryOperator::LessThan,
        BinaryOperatorKind::Le => BinaryOperator::LessThanOrEqualTo,
        BinaryOperatorKind::Add => BinaryOperator::Plus,
        BinaryOperatorKind::Sub => BinaryOperator::Minus,
        BinaryOperatorKind::Mul => BinaryOperator::Multiply,
        BinaryOperatorKind::Div => BinaryOperator::Divide,
    };
    if kind.is_comparison() {
        left_sql = match_affinity(left_sql, left, right, table);
        right_sql = match_affinity(right_sql, right, left, table);
    }
    Ok(binary(left_sql, operator, right_sql))
}

/// Cast one side of a comparison between a column and a parameter so that
/// both compare as reals: an integral parameter against a floating point
/// column, or an integer column against a floating point parameter.
fn match_affinity(
    expression: Expression,
    node: &FilterNode,
    other: &FilterNode,
    table: &TableDefinition,
) -> Expression {
    match (node, other) {
        (FilterNode::Constant(value), FilterNode::MemberAccess(member))
            if !member.is_nested()
                && value.clr_type().kind().is_integral()
                && table
                    .column_type(&member.name)
                    .is_some_and(StoreType::is_float_type) =>
        {
            cast(expression, StoreType::Real)
        }
        (FilterNode::MemberAccess(member), FilterNode::Constant(value))
            if !member.is_nested()
                && value.clr_type().kind().is_floating()
                && table.column_type(&member.name) == Some(StoreType::Integer) =>
        {
            cast(expression, StoreType::Real)
        }
        _ => expression,
    }
}

fn translate_function(name: &str, args: Vec<Expression>) -> Result<Expression, Unsupported> {
    if !FUNCTIONS.contains(&name) {
        return Err(Unsupported::Function(name.to_string()));
    }
    let arity = args.len();
    let arity_error = || Unsupported::Arity {
        name: name.to_string(),
        arity,
    };
    if arity > 3 {
        return Err(arity_error());
    }
    let mut args = args.into_iter();
    let (first, second, third) = (args.next(), args.next(), args.next());
    let expression = match (name, first, second, third) {
        ("day", Some(x), None, None) => date_part("%d", x),
        ("month", Some(x), None, None) => date_part("%m", x),
        ("year", Some(x), None, None) => date_part("%Y", x),
        ("hour", Some(x), None, None) => date_part("%H", x),
        ("minute", Some(x), None, None) => date_part("%M", x),
        ("second", Some(x), None, None) => date_part("%S", x),
        ("floor", Some(x), None, None) => call(Function::Floor, vec![x]),
        ("ceiling", Some(x), None, None) => call(Function::Ceiling, vec![x]),
        ("round", Some(x), None, None) => call(Function::Round, vec![x, integer(0)]),
        ("tolower", Some(x), None, None) => call(Function::Lower, vec![x]),
        ("toupper", Some(x), None, None) => call(Function::Upper, vec![x]),
        ("length", Some(x), None, None) => call(Function::Length, vec![x]),
        ("trim", Some(x), None, None) => call(Function::Trim, vec![x]),
        ("contains", Some(value), Some(pattern), None) => {
            like(Expression::Concat(vec![text("%"), pattern, text("%")]), value)
        }
        ("startswith", Some(value), Some(pattern), None) => {
            like(Expression::Concat(vec![pattern, text("%")]), value)
        }
        ("endswith", Some(value), Some(pattern), None) => {
            like(Expression::Concat(vec![text("%"), pattern]), value)
        }
        ("concat", Some(left), Some(right), None) => Expression::Concat(vec![left, right]),
        // INSTR counts from 1 and returns 0 when there is no match.
        ("indexof", Some(value), Some(search), None) => binary(
            call(Function::Instr, vec![value, search]),
            BinaryOperator::Minus,
            integer(1),
        ),
        ("replace", Some(value), Some(from), Some(to)) => {
            call(Function::Replace, vec![value, from, to])
        }
        ("substring", Some(value), Some(start), length) => {
            let mut args = vec![value, binary(start, BinaryOperator::Plus, integer(1))];
            args.extend(length);
            call(Function::Substr, args)
        }
        _ => return Err(arity_error()),
    };
    Ok(expression)
}

fn like(pattern: Expression, value: Expression) -> Expression {
    Expression::Like {
        pattern: Box::new(pattern),
        value: Box::new(value),
    }
}
