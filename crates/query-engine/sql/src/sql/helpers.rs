//! Helpers for building sql::ast types in certain shapes and patterns.

use query_engine_metadata::metadata::StoreType;

use super::ast::{
    BinaryOperator, ColumnName, Expression, Function, Limit, Literal, OrderBy, Select, SelectList,
    TableName,
};

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// An empty `LIMIT` clause.
pub fn empty_limit() -> Limit {
    Limit { limit: None }
}

/// `SELECT <select_list> FROM <table>`, with no other clauses.
pub fn simple_select(select_list: SelectList, table: &str) -> Select {
    Select {
        select_list,
        from: TableName(table.to_string()),
        where_: None,
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

pub fn column(name: &str) -> Expression {
    Expression::ColumnReference(ColumnName(name.to_string()))
}

pub fn integer(value: i64) -> Expression {
    Expression::Literal(Literal::Integer(value))
}

pub fn text(value: &'static str) -> Expression {
    Expression::Literal(Literal::String(value))
}

pub fn call(function: Function, args: Vec<Expression>) -> Expression {
    Expression::FunctionCall { function, args }
}

pub fn binary(left: Expression, operator: BinaryOperator, right: Expression) -> Expression {
    Expression::BinaryOperation {
        left: Box::new(left),
        operator,
        right: Box::new(right),
    }
}

pub fn cast(expression: Expression, r#type: StoreType) -> Expression {
    Expression::Cast {
        expression: Box::new(expression),
        r#type,
    }
}

/// Read a part of a date stored as unix seconds, as an integer.
pub fn date_part(format: &'static str, expression: Expression) -> Expression {
    cast(
        call(
            Function::Strftime,
            vec![
                text(format),
                call(Function::Datetime, vec![expression, text("unixepoch")]),
            ],
        ),
        StoreType::Integer,
    )
}
