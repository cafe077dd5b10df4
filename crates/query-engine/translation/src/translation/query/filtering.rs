//! Handle filtering/where clauses translation.

use query_engine_ast::ast::{
    BinaryOperatorKind, FilterNode, PendingNode, QueryDescription, UnaryOperatorKind,
};
use query_engine_metadata::metadata::{is_implicit_conversion, ClrType, EnumType, Value};

use super::error::Error;
use super::helpers::{member_access, single_parameter_lambda, CompileOptions};
use super::values::widen;
use crate::translation::expression::{
    DeclaringType, Expression, LambdaExpression, MethodRef, ParameterExpression,
    SourceBinaryKind, SourceUnaryKind,
};

/// Instance methods of strings, their function names and accepted argument counts.
const STRING_METHODS: &[(&str, &str, &[usize])] = &[
    ("ToLower", "tolower", &[0]),
    ("ToLowerInvariant", "tolower", &[0]),
    ("ToUpper", "toupper", &[0]),
    ("ToUpperInvariant", "toupper", &[0]),
    ("Trim", "trim", &[0]),
    ("StartsWith", "startswith", &[1]),
    ("EndsWith", "endswith", &[1]),
    ("Contains", "contains", &[1]),
    ("IndexOf", "indexof", &[1]),
    ("Replace", "replace", &[2]),
    ("Substring", "substring", &[1, 2]),
];

const STRING_STATIC_METHODS: &[(&str, &str, &[usize])] = &[("Concat", "concat", &[2])];

const MATH_STATIC_METHODS: &[(&str, &str, &[usize])] = &[
    ("Floor", "floor", &[1]),
    ("Ceiling", "ceiling", &[1]),
    ("Round", "round", &[1]),
];

/// Date properties read as functions.
const DATE_PROPERTIES: &[(&str, &str)] = &[
    ("Day", "day"),
    ("Month", "month"),
    ("Year", "year"),
    ("Hour", "hour"),
    ("Minute", "minute"),
    ("Second", "second"),
];

/// Translate the body of a `Where` lambda and combine it with the current filter.
pub(crate) fn translate_where(
    query: &mut QueryDescription,
    argument: Option<&Expression>,
    options: &CompileOptions,
) -> Result<(), Error> {
    let (lambda, _) = single_parameter_lambda("Where", argument)?;
    match compile(lambda, options)? {
        Some(predicate) => query.and_filter(predicate)?,
        None => tracing::warn!("Where clause has no filter representation and was dropped"),
    }
    Ok(())
}

/// Compile a boolean lambda into a filter tree.
///
/// `Ok(None)` is the placeholder for a predicate that uses a method with no filter
/// representation: the clause produces no filter at all.
pub fn compile(
    lambda: &LambdaExpression,
    options: &CompileOptions,
) -> Result<Option<FilterNode>, Error> {
    let [parameter] = lambda.parameters.as_slice() else {
        return Err(Error::InvalidPredicate(format!(
            "a predicate must have exactly one parameter, not {}",
            lambda.parameters.len()
        )));
    };
    let ty = lambda.body.ty();
    if ty != ClrType::Bool {
        return Err(Error::InvalidPredicate(format!(
            "a predicate must produce a Bool, not {ty}"
        )));
    }
    Compiler { parameter, options }.compile(&lambda.body)
}

struct Compiler<'a> {
    parameter: &'a ParameterExpression,
    options: &'a CompileOptions,
}

impl Compiler<'_> {
    fn compile(&self, expression: &Expression) -> Result<Option<FilterNode>, Error> {
        match expression {
            Expression::Constant(value) | Expression::Captured { value, .. } => {
                Ok(Some(FilterNode::Constant(value.clone())))
            }
            Expression::Member {
                expression: instance,
                member,
            } => match member_function(&instance.ty(), &member.name) {
                Some(function) => self.function(function, vec![instance.as_ref()], &[]),
                None => Ok(Some(FilterNode::MemberAccess(member_access(
                    expression,
                    self.parameter,
                    self.options,
                )?))),
            },
            Expression::Binary { kind, left, right } => self.binary(*kind, left, right),
            Expression::Unary { kind, operand } => self.unary(kind, operand),
            Expression::Call {
                method,
                object,
                arguments,
            } => self.call(method, object.as_deref(), arguments),
            Expression::Parameter(parameter) => Err(Error::InvalidPredicate(format!(
                "the parameter '{}' cannot be used as a value",
                parameter.name
            ))),
            Expression::Source { .. } | Expression::Lambda(_) | Expression::New { .. } => Err(
                Error::InvalidPredicate("unsupported expression in predicate".to_string()),
            ),
        }
    }

    fn binary(
        &self,
        kind: SourceBinaryKind,
        left: &Expression,
        right: &Expression,
    ) -> Result<Option<FilterNode>, Error> {
        let (left_type, right_type) = (left.ty(), right.ty());
        if kind == SourceBinaryKind::Add
            && left_type == ClrType::String
            && right_type == ClrType::String
        {
            return self.function("concat", vec![left, right], &[]);
        }
        let operator = binary_operator(kind).ok_or_else(|| {
            Error::InvalidPredicate(format!("the '{kind:?}' operator is not supported"))
        })?;
        if operator.is_comparison() {
            if let Some((operand, value, operand_first)) = enum_comparison(left, right) {
                let Some(operand) = self.compile(operand)? else {
                    return Ok(None);
                };
                let value = FilterNode::Constant(value);
                let children = if operand_first {
                    vec![operand, value]
                } else {
                    vec![value, operand]
                };
                return Ok(Some(FilterNode::binary_from_children(operator, children)?));
            }
        }
        let (Some(mut left), Some(mut right)) = (self.compile(left)?, self.compile(right)?) else {
            return Ok(None);
        };
        if left_type != right_type && left_type != ClrType::Null && right_type != ClrType::Null {
            if is_implicit_conversion(&right_type, &left_type) {
                right = coerce(right, &left_type)?;
            } else if is_implicit_conversion(&left_type, &right_type) {
                left = coerce(left, &right_type)?;
            } else {
                return Err(Error::InvalidPredicate(format!(
                    "no implicit conversion between {left_type} and {right_type}"
                )));
            }
        }
        Ok(Some(FilterNode::binary_from_children(
            operator,
            vec![left, right],
        )?))
    }

    fn unary(
        &self,
        kind: &SourceUnaryKind,
        operand: &Expression,
    ) -> Result<Option<FilterNode>, Error> {
        let operator = match kind {
            SourceUnaryKind::Quote => return self.compile(operand),
            SourceUnaryKind::Convert(target) => {
                let source_type = operand.ty();
                if source_type == *target {
                    return self.compile(operand);
                }
                if !is_implicit_conversion(&source_type, target) {
                    return Err(Error::InvalidPredicate(format!(
                        "the conversion from {source_type} to {target} is not implicit"
                    )));
                }
                return match self.compile(operand)? {
                    Some(node) => Ok(Some(coerce(node, target)?)),
                    None => Ok(None),
                };
            }
            SourceUnaryKind::Not => UnaryOperatorKind::Not,
            SourceUnaryKind::Negate => UnaryOperatorKind::Negate,
        };
        let Some(operand) = self.compile(operand)? else {
            return Ok(None);
        };
        Ok(Some(FilterNode::unary_from_children(
            operator,
            vec![operand],
        )?))
    }

    fn call(
        &self,
        method: &MethodRef,
        object: Option<&Expression>,
        arguments: &[Expression],
    ) -> Result<Option<FilterNode>, Error> {
        // ToString() on a member reads the member itself.
        if let (Some(object), "ToString", []) = (object, method.name.as_str(), arguments) {
            return self.compile(object);
        }
        let table = match (&method.declaring, object.is_some()) {
            (DeclaringType::String, true) => STRING_METHODS,
            (DeclaringType::String, false) => STRING_STATIC_METHODS,
            (DeclaringType::Math, false) => MATH_STATIC_METHODS,
            _ => &[],
        };
        let Some((_, function, arities)) = table.iter().find(|(name, ..)| *name == method.name)
        else {
            tracing::warn!(
                "method '{}' has no filter representation; the clause is dropped",
                method.name
            );
            return Ok(None);
        };
        if !arities.contains(&arguments.len()) {
            tracing::warn!(
                "method '{}' called with {} argument(s) has no filter representation; the clause is dropped",
                method.name,
                arguments.len()
            );
            return Ok(None);
        }
        self.function(function, object.into_iter().collect(), arguments)
    }

    fn function(
        &self,
        name: &str,
        leading: Vec<&Expression>,
        arguments: &[Expression],
    ) -> Result<Option<FilterNode>, Error> {
        let mut compiled = Vec::with_capacity(leading.len() + arguments.len());
        for argument in leading.into_iter().chain(arguments) {
            match self.compile(argument)? {
                Some(node) => compiled.push(node),
                None => return Ok(None),
            }
        }
        Ok(Some(FilterNode::FunctionCall {
            name: name.to_string(),
            arguments: compiled,
        }))
    }
}

/// Properties of built-in types that are read through a function.
fn member_function(instance_type: &ClrType, member: &str) -> Option<&'static str> {
    match instance_type {
        ClrType::String if member == "Length" => Some("length"),
        ty if ty.is_date() => DATE_PROPERTIES
            .iter()
            .find(|(property, _)| *property == member)
            .map(|(_, function)| *function),
        _ => None,
    }
}

fn binary_operator(kind: SourceBinaryKind) -> Option<BinaryOperatorKind> {
    Some(match kind {
        SourceBinaryKind::Equal => BinaryOperatorKind::Eq,
        SourceBinaryKind::NotEqual => BinaryOperatorKind::Ne,
        SourceBinaryKind::GreaterThan => BinaryOperatorKind::Gt,
        SourceBinaryKind::GreaterThanOrEqual => BinaryOperatorKind::Ge,
        SourceBinaryKind::LessThan => BinaryOperatorKind::Lt,
        SourceBinaryKind::LessThanOrEqual => BinaryOperatorKind::Le,
        SourceBinaryKind::AndAlso | SourceBinaryKind::And => BinaryOperatorKind::And,
        SourceBinaryKind::OrElse | SourceBinaryKind::Or => BinaryOperatorKind::Or,
        SourceBinaryKind::Add => BinaryOperatorKind::Add,
        SourceBinaryKind::Subtract => BinaryOperatorKind::Sub,
        SourceBinaryKind::Multiply => BinaryOperatorKind::Mul,
        SourceBinaryKind::Divide => BinaryOperatorKind::Div,
        SourceBinaryKind::Modulo => BinaryOperatorKind::Mod,
        SourceBinaryKind::Coalesce
        | SourceBinaryKind::ExclusiveOr
        | SourceBinaryKind::Power
        | SourceBinaryKind::LeftShift
        | SourceBinaryKind::RightShift => return None,
    })
}

/// Enums are stored and sent by member name, so comparing an enum converted to
/// its underlying integer with a constant compares the enum with the named
/// member instead. Returns the enum operand, the member, and whether the
/// operand is on the left.
fn enum_comparison<'e>(
    left: &'e Expression,
    right: &'e Expression,
) -> Option<(&'e Expression, Value, bool)> {
    if let Some((operand, enum_type)) = converted_enum(left) {
        return enum_member(right, &enum_type).map(|value| (operand, value, true));
    }
    let (operand, enum_type) = converted_enum(right)?;
    enum_member(left, &enum_type).map(|value| (operand, value, false))
}

fn converted_enum(expression: &Expression) -> Option<(&Expression, EnumType)> {
    match expression {
        Expression::Unary {
            kind: SourceUnaryKind::Convert(_),
            operand,
        } if !matches!(
            operand.as_ref(),
            Expression::Constant(_) | Expression::Captured { .. }
        ) =>
        {
            match operand.ty() {
                ClrType::Enum(enum_type) => Some((operand.as_ref(), enum_type)),
                _ => None,
            }
        }
        _ => None,
    }
}

/// The member of `enum_type` a constant operand stands for.
fn enum_member(expression: &Expression, enum_type: &EnumType) -> Option<Value> {
    match expression {
        Expression::Constant(value) | Expression::Captured { value, .. } => match value {
            Value::Enum { ty, .. } if ty == enum_type => Some(value.clone()),
            Value::Enum { .. } => None,
            other => enum_type.member(other.as_i64()?),
        },
        Expression::Unary {
            kind: SourceUnaryKind::Convert(_),
            operand,
        } => enum_member(operand, enum_type),
        _ => None,
    }
}

/// Bring a compiled operand to `target`. Constants are widened in place.
fn coerce(node: FilterNode, target: &ClrType) -> Result<FilterNode, Error> {
    if let FilterNode::Constant(value) = &node {
        if let Some(widened) = widen(value, target) {
            return Ok(FilterNode::Constant(widened));
        }
    }
    let mut convert = PendingNode::convert(target.clone());
    convert.set_children(vec![node])?;
    Ok(convert.build()?)
}
