//! Format query descriptions as SQLite statements.
//!
//! A filter that cannot be expressed in SQL is left out entirely rather than
//! failing the query; the result says so, and the caller filters the rows
//! itself.

pub mod filtering;
pub mod values;

use indexmap::IndexMap;
use query_engine_ast::ast::{OrderDirection, QueryDescription};
use query_engine_metadata::metadata::TableDefinition;
use serde::Serialize;

use super::ast::{
    ColumnName, Delete, Limit, OrderBy, OrderByDirection, OrderByElement, Select, SelectList,
    SqlValue, TableName, Where,
};
use super::helpers::{column, empty_order_by, simple_select};
use super::string::{param_name, SQL};
use filtering::translate_filter;

/// The column holding the row identifier.
pub const ID_COLUMN: &str = "id";

/// The column alias of a count.
pub const COUNT_COLUMN: &str = "count";

/// A statement ready to execute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SqlQuery {
    pub sql: String,
    pub parameters: IndexMap<String, SqlValue>,
    /// The filter could not be expressed in SQL and was left out.
    pub filter_degraded: bool,
    /// Rows the statement does not skip; the caller has to.
    pub unapplied_skip: Option<u32>,
}

/// `SELECT ... FROM [table] WHERE ... ORDER BY ... LIMIT n`.
pub fn format_select(query: &QueryDescription, table: &TableDefinition) -> SqlQuery {
    let (select, filter_degraded) = translate_select(query, table);
    let mut sql = SQL::new();
    select.to_sql(&mut sql);
    finish(sql, filter_degraded, query.skip)
}

/// `SELECT COUNT(1) AS [count] FROM [table] WHERE ...`, ignoring ordering and paging.
pub fn format_count(query: &QueryDescription, table: &TableDefinition) -> SqlQuery {
    let (where_, filter_degraded) = translate_where(query, table);
    let select = Select {
        where_,
        ..simple_select(
            SelectList::Count(ColumnName(COUNT_COLUMN.to_string())),
            &query.table_name,
        )
    };
    let mut sql = SQL::new();
    select.to_sql(&mut sql);
    finish(sql, filter_degraded, None)
}

/// `DELETE FROM [table] WHERE [id] IN (SELECT [id] FROM [table] WHERE ... ORDER BY ... LIMIT n)`.
///
/// Returns `None` when the filter cannot be expressed in SQL, as the statement
/// would delete rows the query does not match.
pub fn format_delete(query: &QueryDescription, table: &TableDefinition) -> Option<SqlQuery> {
    let (mut select, filter_degraded) = translate_select(query, table);
    if filter_degraded {
        return None;
    }
    select.select_list = SelectList::Columns(vec![ColumnName(ID_COLUMN.to_string())]);
    let delete = Delete {
        from: select.from.clone(),
        key: ColumnName(ID_COLUMN.to_string()),
        select: Box::new(select),
    };
    let mut sql = SQL::new();
    delete.to_sql(&mut sql);
    Some(finish(sql, false, query.skip))
}

fn translate_select(query: &QueryDescription, table: &TableDefinition) -> (Select, bool) {
    let (where_, filter_degraded) = translate_where(query, table);
    let select_list = if query.selection.is_empty() {
        SelectList::SelectStar
    } else {
        SelectList::Columns(
            query
                .selection
                .iter()
                .map(|field| ColumnName(field.clone()))
                .collect(),
        )
    };
    let select = Select {
        select_list,
        from: TableName(query.table_name.clone()),
        where_,
        order_by: translate_order_by(query),
        limit: Limit { limit: query.top },
    };
    (select, filter_degraded)
}

/// The `WHERE` clause, and whether the filter had to be left out.
fn translate_where(query: &QueryDescription, table: &TableDefinition) -> (Option<Where>, bool) {
    let Some(filter) = &query.filter else {
        return (None, false);
    };
    match translate_filter(filter, table) {
        Ok(expression) => (Some(Where(expression)), false),
        Err(reason) => {
            tracing::warn!(
                "The filter on '{}' cannot be applied in SQL and is left to the caller: {}",
                query.table_name,
                reason
            );
            (None, true)
        }
    }
}

fn translate_order_by(query: &QueryDescription) -> OrderBy {
    let mut order_by = empty_order_by();
    for ordering in &query.ordering {
        if ordering.member.is_nested() {
            tracing::warn!(
                "Ordering by the nested member '{}' cannot be applied in SQL",
                ordering.member
            );
            continue;
        }
        order_by.elements.push(OrderByElement {
            target: column(&ordering.member.name),
            direction: match ordering.direction {
                OrderDirection::Ascending => OrderByDirection::Asc,
                OrderDirection::Descending => OrderByDirection::Desc,
            },
        });
    }
    order_by
}

fn finish(sql: SQL, filter_degraded: bool, unapplied_skip: Option<u32>) -> SqlQuery {
    tracing::info!("Generated SQL: {}", sql.sql);
    let parameters = (1..)
        .map(param_name)
        .zip(sql.params)
        .collect::<IndexMap<_, _>>();
    SqlQuery {
        sql: sql.sql,
        parameters,
        filter_degraded,
        unapplied_skip,
    }
}
