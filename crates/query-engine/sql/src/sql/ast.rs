//! Type definitions of a SQL AST representation.

use query_engine_metadata::metadata::StoreType;
use serde::Serialize;

/// A `SELECT` against a single table.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    pub select_list: SelectList,
    pub from: TableName,
    pub where_: Option<Where>,
    pub order_by: OrderBy,
    pub limit: Limit,
}

/// `DELETE FROM <table> WHERE <key> IN (<select>)`, so that ordering and
/// limits can pick the rows to delete.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    pub from: TableName,
    pub key: ColumnName,
    pub select: Box<Select>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectList {
    SelectStar,
    Columns(Vec<ColumnName>),
    /// `COUNT(1) AS <alias>`
    Count(ColumnName),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnName(pub String);

#[derive(Debug, Clone, PartialEq)]
pub struct Where(pub Expression);

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub elements: Vec<OrderByElement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByElement {
    pub target: Expression,
    pub direction: OrderByDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderByDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limit {
    pub limit: Option<u32>,
}

/// A scalar expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    And {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Or {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    Negate(Box<Expression>),
    BinaryOperation {
        left: Box<Expression>,
        operator: BinaryOperator,
        right: Box<Expression>,
    },
    IsNull {
        expression: Box<Expression>,
        negated: bool,
    },
    FunctionCall {
        function: Function,
        args: Vec<Expression>,
    },
    /// `LIKE(pattern, value)`
    Like {
        pattern: Box<Expression>,
        value: Box<Expression>,
    },
    /// Operands joined with `||`.
    Concat(Vec<Expression>),
    Cast {
        expression: Box<Expression>,
        r#type: StoreType,
    },
    ColumnReference(ColumnName),
    /// A value sent as a parameter.
    Value(SqlValue),
    /// A constant written into the statement itself.
    Literal(Literal),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEqualTo,
    LessThan,
    LessThanOrEqualTo,
    Plus,
    Minus,
    Multiply,
    Divide,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Floor,
    Ceiling,
    Round,
    Lower,
    Upper,
    Length,
    Trim,
    Replace,
    Substr,
    Instr,
    Strftime,
    Datetime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Literal {
    Integer(i64),
    String(&'static str),
}

/// A parameter value, in the storage classes SQLite knows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}
