//! Translate a query expression into a `QueryDescription`.

pub mod error;
mod fields;
pub mod filtering;
pub mod helpers;
mod sorting;
pub mod values;

use query_engine_ast::ast::{OrderDirection, QueryDescription, SYSTEM_TABLE_PREFIX};
use query_engine_metadata::metadata::Entity;

use crate::translation::builder::TableQuery;
use crate::translation::expression::{DeclaringType, Expression};
use error::Error;
pub use filtering::compile;
pub use helpers::CompileOptions;
use sorting::Placement;
pub use values::partially_evaluate;

/// The paging counters of a query builder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Paging {
    pub skip: Option<u32>,
    pub take: Option<u32>,
}

/// Translate a table query into a query description.
pub fn translate<T: Entity>(query: &TableQuery<T>) -> Result<QueryDescription, Error> {
    if let Some(error) = query.errors().first() {
        return Err(error.clone());
    }
    let mut description = translate_expression(
        query.expression(),
        query.table_name(),
        query.paging(),
        &query.options(),
    )?;
    description.include_total_count = query.includes_total_count();
    description.include_deleted_items = query.includes_deleted_items();
    for (key, value) in query.parameters() {
        description.add_parameter(key.clone(), value.clone())?;
    }
    tracing::info!("Query description: {:?}", description);
    Ok(description)
}

/// Translate a chain of query operators rooted at a table source.
pub fn translate_expression(
    expression: &Expression,
    table_name: &str,
    paging: Paging,
    options: &CompileOptions,
) -> Result<QueryDescription, Error> {
    let mut query = if table_name.starts_with(SYSTEM_TABLE_PREFIX) {
        QueryDescription::for_system_table(table_name)?
    } else {
        QueryDescription::new(table_name)?
    };
    let expression = partially_evaluate(expression);
    translate_operator(&expression, &mut query, options)?;
    query.skip = paging.skip;
    query.top = paging.take;
    Ok(query)
}

/// Apply the operators of a chain in source order: the target of a call, its
/// first argument, is translated before the call itself.
fn translate_operator(
    expression: &Expression,
    query: &mut QueryDescription,
    options: &CompileOptions,
) -> Result<(), Error> {
    let (method, arguments) = match expression {
        Expression::Source { .. } => return Ok(()),
        Expression::Call {
            method,
            object: None,
            arguments,
        } if method.declaring == DeclaringType::Queryable => (method, arguments),
        Expression::Call { method, .. } => {
            return Err(Error::UnsupportedOperation(method.name.clone()))
        }
        _ => {
            return Err(Error::InvalidArgument(
                "a query must be a chain of operators on a table".to_string(),
            ))
        }
    };
    if let Some(target) = arguments.first() {
        translate_operator(target, query, options)?;
    }
    tracing::debug!("Translating '{}'", method.name);

    let lambda = arguments.get(1);
    match method.name.as_str() {
        "Where" => filtering::translate_where(query, lambda, options),
        "OrderBy" => sorting::translate_order_by(
            query,
            "OrderBy",
            lambda,
            OrderDirection::Ascending,
            Placement::Prepend,
            options,
        ),
        "OrderByDescending" => sorting::translate_order_by(
            query,
            "OrderByDescending",
            lambda,
            OrderDirection::Descending,
            Placement::Prepend,
            options,
        ),
        "ThenBy" => sorting::translate_order_by(
            query,
            "ThenBy",
            lambda,
            OrderDirection::Ascending,
            Placement::Append,
            options,
        ),
        "ThenByDescending" => sorting::translate_order_by(
            query,
            "ThenByDescending",
            lambda,
            OrderDirection::Descending,
            Placement::Append,
            options,
        ),
        "Select" => fields::translate_select(query, lambda, options),
        other => Err(Error::UnsupportedOperation(other.to_string())),
    }
}
