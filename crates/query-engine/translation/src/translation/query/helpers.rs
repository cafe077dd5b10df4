//! Helpers shared by the clause translators.

use query_engine_ast::ast::MemberAccess;
use query_engine_metadata::metadata::{resolve_member_name, NamingPolicy};

use super::error::Error;
use crate::translation::expression::{
    Expression, LambdaExpression, ParameterExpression, SourceUnaryKind,
};

/// Options controlling how member names reach the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompileOptions {
    pub naming_policy: NamingPolicy,
}

/// Strip the quoting around a lambda passed to a query operator.
pub(crate) fn unquote(expression: &Expression) -> &Expression {
    match expression {
        Expression::Unary {
            kind: SourceUnaryKind::Quote,
            operand,
        } => unquote(operand),
        other => other,
    }
}

/// The lambda argument of a query operator, which must take exactly one parameter.
pub(crate) fn single_parameter_lambda<'a>(
    operator: &str,
    argument: Option<&'a Expression>,
) -> Result<(&'a LambdaExpression, &'a ParameterExpression), Error> {
    let Some(Expression::Lambda(lambda)) = argument.map(unquote) else {
        return Err(Error::InvalidPredicate(format!(
            "the argument of '{operator}' must be a lambda"
        )));
    };
    match lambda.parameters.as_slice() {
        [parameter] => Ok((lambda, parameter)),
        parameters => Err(Error::InvalidPredicate(format!(
            "the lambda passed to '{operator}' must have exactly one parameter, not {}",
            parameters.len()
        ))),
    }
}

/// The path of a member read from the lambda parameter, with each name resolved
/// to its wire name.
pub(crate) fn member_access(
    expression: &Expression,
    parameter: &ParameterExpression,
    options: &CompileOptions,
) -> Result<MemberAccess, Error> {
    let Expression::Member { expression, member } = expression else {
        return Err(Error::InvalidPredicate(format!(
            "expected a member of '{}'",
            parameter.name
        )));
    };
    let name = resolve_member_name(member, options.naming_policy);
    match expression.as_ref() {
        Expression::Parameter(root) if root == parameter => Ok(MemberAccess::new(name)),
        inner @ Expression::Member { .. } => {
            Ok(member_access(inner, parameter, options)?.then(name))
        }
        _ => Err(Error::InvalidPredicate(format!(
            "'{}' is not a member of the lambda parameter '{}'",
            member.name, parameter.name
        ))),
    }
}
