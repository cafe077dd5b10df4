//! Convert a SQL AST to a low-level SQL string.

use super::ast::{
    BinaryOperator, ColumnName, Delete, Expression, Function, Limit, Literal, OrderBy,
    OrderByDirection, Select, SelectList, TableName, Where,
};
use super::string::SQL;

impl Select {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("SELECT ");
        self.select_list.to_sql(sql);
        sql.append_syntax(" FROM ");
        self.from.to_sql(sql);
        if let Some(where_) = &self.where_ {
            where_.to_sql(sql);
        }
        self.order_by.to_sql(sql);
        self.limit.to_sql(sql);
    }
}

impl Delete {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax("DELETE FROM ");
        self.from.to_sql(sql);
        sql.append_syntax(" WHERE ");
        self.key.to_sql(sql);
        sql.append_syntax(" IN (");
        self.select.to_sql(sql);
        sql.append_syntax(")");
    }
}

impl SelectList {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            SelectList::SelectStar => sql.append_syntax("*"),
            SelectList::Columns(columns) => {
                for (index, column) in columns.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(", ");
                    }
                    column.to_sql(sql);
                }
            }
            SelectList::Count(alias) => {
                sql.append_syntax("COUNT(1) AS ");
                alias.to_sql(sql);
            }
        }
    }
}

impl TableName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl ColumnName {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_identifier(&self.0);
    }
}

impl Where {
    pub fn to_sql(&self, sql: &mut SQL) {
        sql.append_syntax(" WHERE ");
        self.0.to_sql(sql);
    }
}

impl OrderBy {
    pub fn to_sql(&self, sql: &mut SQL) {
        if self.elements.is_empty() {
            return;
        }
        sql.append_syntax(" ORDER BY ");
        for (index, element) in self.elements.iter().enumerate() {
            if index > 0 {
                sql.append_syntax(", ");
            }
            element.target.to_sql(sql);
            element.direction.to_sql(sql);
        }
    }
}

impl OrderByDirection {
    /// Ascending is the default and is left implicit.
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            OrderByDirection::Asc => {}
            OrderByDirection::Desc => sql.append_syntax(" DESC"),
        }
    }
}

impl Limit {
    pub fn to_sql(self, sql: &mut SQL) {
        if let Some(limit) = self.limit {
            sql.append_syntax(&format!(" LIMIT {limit}"));
        }
    }
}

impl Expression {
    pub fn to_sql(&self, sql: &mut SQL) {
        match self {
            Expression::And { left, right } => infix(sql, left, " AND ", right),
            Expression::Or { left, right } => infix(sql, left, " OR ", right),
            Expression::Not(expression) => {
                sql.append_syntax("NOT(");
                expression.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Negate(expression) => {
                sql.append_syntax("-(");
                expression.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::BinaryOperation {
                left,
                operator,
                right,
            } => infix(sql, left, operator.to_sql(), right),
            Expression::IsNull {
                expression,
                negated,
            } => {
                sql.append_syntax("(");
                expression.to_sql(sql);
                sql.append_syntax(if *negated { " IS NOT NULL)" } else { " IS NULL)" });
            }
            Expression::FunctionCall { function, args } => {
                sql.append_syntax(function.name());
                arguments(sql, args);
            }
            Expression::Like { pattern, value } => {
                sql.append_syntax("LIKE(");
                pattern.to_sql(sql);
                sql.append_syntax(", ");
                value.to_sql(sql);
                sql.append_syntax(")");
            }
            Expression::Concat(operands) => {
                sql.append_syntax("(");
                for (index, operand) in operands.iter().enumerate() {
                    if index > 0 {
                        sql.append_syntax(" || ");
                    }
                    operand.to_sql(sql);
                }
                sql.append_syntax(")");
            }
            Expression::Cast { expression, r#type } => {
                sql.append_syntax("CAST(");
                expression.to_sql(sql);
                sql.append_syntax(" AS ");
                sql.append_syntax(r#type.name());
                sql.append_syntax(")");
            }
            Expression::ColumnReference(column) => column.to_sql(sql),
            Expression::Value(value) => sql.append_param(value.clone()),
            Expression::Literal(literal) => literal.to_sql(sql),
        }
    }
}

fn infix(sql: &mut SQL, left: &Expression, operator: &str, right: &Expression) {
    sql.append_syntax("(");
    left.to_sql(sql);
    sql.append_syntax(operator);
    right.to_sql(sql);
    sql.append_syntax(")");
}

fn arguments(sql: &mut SQL, args: &[Expression]) {
    sql.append_syntax("(");
    for (index, arg) in args.iter().enumerate() {
        if index > 0 {
            sql.append_syntax(", ");
        }
        arg.to_sql(sql);
    }
    sql.append_syntax(")");
}

impl BinaryOperator {
    pub fn to_sql(self) -> &'static str {
        match self {
            BinaryOperator::Equals => " = ",
            BinaryOperator::NotEquals => " != ",
            BinaryOperator::GreaterThan => " > ",
            BinaryOperator::GreaterThanOrEqualTo => " >= ",
            BinaryOperator::LessThan => " < ",
            BinaryOperator::LessThanOrEqualTo => " <= ",
            BinaryOperator::Plus => " + ",
            BinaryOperator::Minus => " - ",
            BinaryOperator::Multiply => " * ",
            BinaryOperator::Divide => " / ",
        }
    }
}

impl Function {
    pub fn name(self) -> &'static str {
        match self {
            Function::Floor => "FLOOR",
            Function::Ceiling => "CEILING",
            Function::Round => "ROUND",
            Function::Lower => "LOWER",
            Function::Upper => "UPPER",
            Function::Length => "LENGTH",
            Function::Trim => "TRIM",
            Function::Replace => "REPLACE",
            Function::Substr => "SUBSTR",
            Function::Instr => "INSTR",
            Function::Strftime => "strftime",
            Function::Datetime => "datetime",
        }
    }
}

impl Literal {
    pub fn to_sql(self, sql: &mut SQL) {
        match self {
            Literal::Integer(value) => sql.append_syntax(&value.to_string()),
            Literal::String(text) => sql.append_string_literal(text),
        }
    }
}
