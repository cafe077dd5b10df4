//! Translate the sort keys of a query.

use query_engine_ast::ast::{MemberAccess, OrderByNode, OrderDirection, QueryDescription};
use query_engine_metadata::metadata::is_implicit_conversion;

use super::error::Error;
use super::helpers::{member_access, single_parameter_lambda, CompileOptions};
use crate::translation::expression::{Expression, SourceUnaryKind};

/// Where a sort key goes relative to the ones already collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    /// `OrderBy`: the new primary key.
    Prepend,
    /// `ThenBy`: a tie breaker.
    Append,
}

pub(crate) fn translate_order_by(
    query: &mut QueryDescription,
    operator: &str,
    argument: Option<&Expression>,
    direction: OrderDirection,
    placement: Placement,
    options: &CompileOptions,
) -> Result<(), Error> {
    let (lambda, parameter) = single_parameter_lambda(operator, argument)?;
    let member = sort_key(&lambda.body, operator, |key| {
        member_access(key, parameter, options)
    })?;
    let node = OrderByNode { member, direction };
    match placement {
        Placement::Prepend => query.prepend_ordering(node),
        Placement::Append => query.append_ordering(node),
    }
    Ok(())
}

/// The member a key selector sorts on. Widening conversions around the member
/// do not change the order and are looked through.
fn sort_key(
    body: &Expression,
    operator: &str,
    resolve: impl Fn(&Expression) -> Result<MemberAccess, Error>,
) -> Result<MemberAccess, Error> {
    match body {
        Expression::Unary {
            kind: SourceUnaryKind::Convert(target),
            operand,
        } if is_implicit_conversion(&operand.ty(), target) => sort_key(operand, operator, resolve),
        Expression::Member { .. } => resolve(body),
        _ => Err(Error::InvalidPredicate(format!(
            "the key of '{operator}' must be a member of the lambda parameter"
        ))),
    }
}
