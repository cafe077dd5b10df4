//! Translate projections into the selected fields.

use query_engine_ast::ast::{Projection, QueryDescription};

use super::error::Error;
use super::helpers::{member_access, single_parameter_lambda, CompileOptions};
use crate::translation::expression::{Expression, ParameterExpression};

/// Record a `Select` projection. The first projection of a query decides which
/// fields are fetched; later ones only reshape what it returned.
pub(crate) fn translate_select(
    query: &mut QueryDescription,
    argument: Option<&Expression>,
    options: &CompileOptions,
) -> Result<(), Error> {
    let (lambda, parameter) = single_parameter_lambda("Select", argument)?;
    let mut fields = vec![];
    collect_members(&lambda.body, parameter, options, &mut fields);
    if query.projections.is_empty() {
        for field in &fields {
            query.select(field.clone());
        }
    }
    query.projections.push(Projection { fields });
    Ok(())
}

/// Collect the top-level members of the parameter read anywhere in `expression`.
fn collect_members(
    expression: &Expression,
    parameter: &ParameterExpression,
    options: &CompileOptions,
    fields: &mut Vec<String>,
) {
    if let Expression::Member { .. } = expression {
        if let Ok(member) = member_access(expression, parameter, options) {
            let root = member.path().first().map(ToString::to_string);
            if let Some(root) = root {
                if !fields.contains(&root) {
                    fields.push(root);
                }
            }
            return;
        }
    }
    for child in expression.children() {
        collect_members(child, parameter, options, fields);
    }
}
