//! Helpers for building filter trees whose shape is known statically.

use query_engine_metadata::metadata::{ClrType, Value};

use super::node::{BinaryOperatorKind, FilterNode, MemberAccess, UnaryOperatorKind};

/// A member of the queried entity.
pub fn member(name: &str) -> FilterNode {
    FilterNode::MemberAccess(MemberAccess::new(name))
}

/// A nested member, given outermost first.
pub fn member_path(path: &[&str]) -> FilterNode {
    let mut names = path.iter();
    let mut access = MemberAccess::new(names.next().copied().unwrap_or_default());
    for name in names {
        access = access.then(*name);
    }
    FilterNode::MemberAccess(access)
}

pub fn constant(value: impl Into<Value>) -> FilterNode {
    FilterNode::Constant(value.into())
}

pub fn int(value: i32) -> FilterNode {
    constant(value)
}

pub fn null() -> FilterNode {
    FilterNode::Constant(Value::Null)
}

pub fn binary(kind: BinaryOperatorKind, left: FilterNode, right: FilterNode) -> FilterNode {
    FilterNode::BinaryOperator {
        kind,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn and(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::And, left, right)
}

pub fn or(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::Or, left, right)
}

pub fn eq(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::Eq, left, right)
}

pub fn ne(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::Ne, left, right)
}

pub fn gt(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::Gt, left, right)
}

pub fn lt(left: FilterNode, right: FilterNode) -> FilterNode {
    binary(BinaryOperatorKind::Lt, left, right)
}

pub fn unary(kind: UnaryOperatorKind, operand: FilterNode) -> FilterNode {
    FilterNode::UnaryOperator {
        kind,
        operand: Box::new(operand),
    }
}

pub fn not(operand: FilterNode) -> FilterNode {
    unary(UnaryOperatorKind::Not, operand)
}

pub fn function(name: &str, arguments: Vec<FilterNode>) -> FilterNode {
    FilterNode::FunctionCall {
        name: name.to_string(),
        arguments,
    }
}

pub fn convert(source: FilterNode, target: ClrType) -> FilterNode {
    FilterNode::Convert {
        source: Box::new(source),
        target,
    }
}
