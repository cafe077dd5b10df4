//! Reduce the parts of a query expression that do not depend on the lambda
//! parameter to constants.

use query_engine_metadata::metadata::{is_implicit_conversion, ClrType, Value};
use rust_decimal::Decimal;

use crate::translation::expression::{
    Expression, LambdaExpression, SourceBinaryKind, SourceUnaryKind,
};

/// Replace captured variables with their values and fold constant subtrees.
pub fn partially_evaluate(expression: &Expression) -> Expression {
    match expression {
        Expression::Captured { value, .. } => Expression::Constant(value.clone()),
        Expression::Source { .. } | Expression::Parameter(_) | Expression::Constant(_) => {
            expression.clone()
        }
        Expression::Member { expression, member } => Expression::Member {
            expression: Box::new(partially_evaluate(expression)),
            member: member.clone(),
        },
        Expression::Binary { kind, left, right } => {
            let left = partially_evaluate(left);
            let right = partially_evaluate(right);
            if let (Expression::Constant(l), Expression::Constant(r)) = (&left, &right) {
                if let Some(folded) = fold_binary(*kind, l, r) {
                    return Expression::Constant(folded);
                }
            }
            Expression::Binary {
                kind: *kind,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        Expression::Unary { kind, operand } => {
            let operand = partially_evaluate(operand);
            if let Expression::Constant(value) = &operand {
                if let Some(folded) = fold_unary(kind, value) {
                    return Expression::Constant(folded);
                }
            }
            Expression::Unary {
                kind: kind.clone(),
                operand: Box::new(operand),
            }
        }
        Expression::Call {
            method,
            object,
            arguments,
        } => Expression::Call {
            method: method.clone(),
            object: object
                .as_ref()
                .map(|object| Box::new(partially_evaluate(object))),
            arguments: arguments.iter().map(partially_evaluate).collect(),
        },
        Expression::Lambda(lambda) => Expression::Lambda(LambdaExpression {
            parameters: lambda.parameters.clone(),
            body: Box::new(partially_evaluate(&lambda.body)),
        }),
        Expression::New { members } => Expression::New {
            members: members
                .iter()
                .map(|(name, value)| (name.clone(), partially_evaluate(value)))
                .collect(),
        },
    }
}

fn fold_unary(kind: &SourceUnaryKind, value: &Value) -> Option<Value> {
    match (kind, value) {
        (SourceUnaryKind::Not, Value::Bool(b)) => Some(Value::Bool(!b)),
        (SourceUnaryKind::Negate, value) => negate(value),
        (SourceUnaryKind::Convert(target), value) => widen(value, target),
        _ => None,
    }
}

fn negate(value: &Value) -> Option<Value> {
    match value {
        Value::Int16(v) => v.checked_neg().map(Value::Int16),
        Value::Int32(v) => v.checked_neg().map(Value::Int32),
        Value::Int64(v) => v.checked_neg().map(Value::Int64),
        Value::SByte(v) => v.checked_neg().map(Value::SByte),
        Value::Single(v) => Some(Value::Single(-v)),
        Value::Double(v) => Some(Value::Double(-v)),
        Value::Decimal(v) => Some(Value::Decimal(-v)),
        _ => None,
    }
}

fn fold_binary(kind: SourceBinaryKind, left: &Value, right: &Value) -> Option<Value> {
    use SourceBinaryKind::{Add, Divide, Multiply, Subtract};
    match (kind, left, right) {
        (Add, Value::String(l), Value::String(r)) => Some(Value::String(format!("{l}{r}"))),
        (Add, Value::Int32(l), Value::Int32(r)) => l.checked_add(*r).map(Value::Int32),
        (Subtract, Value::Int32(l), Value::Int32(r)) => l.checked_sub(*r).map(Value::Int32),
        (Multiply, Value::Int32(l), Value::Int32(r)) => l.checked_mul(*r).map(Value::Int32),
        (Divide, Value::Int32(l), Value::Int32(r)) => l.checked_div(*r).map(Value::Int32),
        (Add, Value::Int64(l), Value::Int64(r)) => l.checked_add(*r).map(Value::Int64),
        (Subtract, Value::Int64(l), Value::Int64(r)) => l.checked_sub(*r).map(Value::Int64),
        (Multiply, Value::Int64(l), Value::Int64(r)) => l.checked_mul(*r).map(Value::Int64),
        (Divide, Value::Int64(l), Value::Int64(r)) => l.checked_div(*r).map(Value::Int64),
        (Add, Value::Double(l), Value::Double(r)) => Some(Value::Double(l + r)),
        (Subtract, Value::Double(l), Value::Double(r)) => Some(Value::Double(l - r)),
        (Multiply, Value::Double(l), Value::Double(r)) => Some(Value::Double(l * r)),
        (Divide, Value::Double(l), Value::Double(r)) => Some(Value::Double(l / r)),
        _ => None,
    }
}

/// Convert a constant to a wider type. Only implicit conversions are performed.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
pub fn widen(value: &Value, target: &ClrType) -> Option<Value> {
    if !is_implicit_conversion(&value.clr_type(), target) {
        return None;
    }
    if value.is_null() || value.clr_type() == *target {
        return Some(value.clone());
    }
    Some(match target {
        ClrType::Int16 => Value::Int16(i16::try_from(value.as_i64()?).ok()?),
        ClrType::UInt16 => Value::UInt16(u16::try_from(value.as_i64()?).ok()?),
        ClrType::Int32 => Value::Int32(i32::try_from(value.as_i64()?).ok()?),
        ClrType::UInt32 => Value::UInt32(u32::try_from(value.as_i64()?).ok()?),
        ClrType::Int64 => Value::Int64(value.as_i64()?),
        ClrType::UInt64 => Value::UInt64(u64::try_from(value.as_i64()?).ok()?),
        ClrType::Single => Value::Single(value.as_f64()? as f32),
        ClrType::Double => Value::Double(value.as_f64()?),
        ClrType::Decimal => match value {
            Value::UInt64(v) => Value::Decimal(Decimal::from(*v)),
            other => Value::Decimal(Decimal::from(other.as_i64()?)),
        },
        ClrType::DateTimeOffset => match value {
            Value::DateTime(v) => Value::DateTimeOffset(v.fixed_offset()),
            _ => return None,
        },
        _ => return None,
    })
}
