//! Type definitions of a low-level SQL string representation.

use super::ast::SqlValue;

/// A SQL statement being written, with the parameters it refers to.
#[derive(Debug, PartialEq, Default)]
pub struct SQL {
    pub sql: String,
    pub params: Vec<SqlValue>,
    /// The number of parameters written so far, and so of the last `@pN`.
    pub param_index: u64,
}

impl SQL {
    pub fn new() -> SQL {
        SQL::default()
    }

    pub fn append_syntax(&mut self, sql: &str) {
        self.sql.push_str(sql);
    }

    /// Write a bracket quoted identifier.
    pub fn append_identifier(&mut self, name: &str) {
        self.sql.push('[');
        self.sql.push_str(&name.replace(']', "]]"));
        self.sql.push(']');
    }

    /// Write a single quoted string literal.
    pub fn append_string_literal(&mut self, text: &str) {
        self.sql.push('\'');
        self.sql.push_str(&text.replace('\'', "''"));
        self.sql.push('\'');
    }

    /// Write a reference to a new parameter holding `param`.
    pub fn append_param(&mut self, param: SqlValue) {
        self.param_index += 1;
        self.sql.push_str(&param_name(self.param_index));
        self.params.push(param);
    }
}

pub fn param_name(index: u64) -> String {
    format!("@p{index}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_bracketed() {
        let mut sql = SQL::new();
        sql.append_identifier("odd]name");
        assert_eq!(sql.sql, "[odd]]name]");
    }

    #[test]
    fn parameters_are_numbered_from_one() {
        let mut sql = SQL::new();
        sql.append_param(SqlValue::Integer(1));
        sql.append_syntax(", ");
        sql.append_param(SqlValue::Text("a".to_string()));
        assert_eq!(sql.sql, "@p1, @p2");
        assert_eq!(sql.param_index, 2);
    }
}
