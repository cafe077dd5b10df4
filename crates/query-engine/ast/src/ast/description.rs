//! The target-independent description of a compiled table query.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use super::error::Error;
use super::node::{BinaryOperatorKind, FilterNode, OrderByNode};

static TABLE_NAME: Lazy<Option<Regex>> = Lazy::new(|| Regex::new("^[a-z][a-z0-9_]{0,63}$").ok());

/// The prefix of tables the sync machinery keeps for itself.
pub const SYSTEM_TABLE_PREFIX: &str = "__";

/// Check that a table name is a lowercase identifier of at most 64 characters.
/// When `allow_system` is set, the name may also carry the system table prefix.
pub fn validate_table_name(table_name: &str, allow_system: bool) -> Result<(), Error> {
    let name = match table_name.strip_prefix(SYSTEM_TABLE_PREFIX) {
        Some(rest) if allow_system => rest,
        _ => table_name,
    };
    if TABLE_NAME.as_ref().is_some_and(|pattern| pattern.is_match(name)) {
        Ok(())
    } else {
        Err(Error::InvalidTableName(table_name.to_string()))
    }
}

/// Custom query parameters may not collide with the system query options
/// (`$filter`, ...) or the service's own `__` parameters.
pub fn validate_parameter_name(key: &str) -> Result<(), Error> {
    if key.trim().is_empty() || key.starts_with('$') || key.starts_with(SYSTEM_TABLE_PREFIX) {
        Err(Error::InvalidParameterName(key.to_string()))
    } else {
        Ok(())
    }
}

/// A projection applied after the query returns. Only the first one is pushed
/// down to the target, as the selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    /// The member names the projection reads.
    pub fields: Vec<String>,
}

/// A compiled query against one table.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescription {
    pub table_name: String,
    pub filter: Option<FilterNode>,
    pub ordering: Vec<OrderByNode>,
    /// The member names to return; empty means all of them.
    pub selection: Vec<String>,
    pub projections: Vec<Projection>,
    pub skip: Option<u32>,
    pub top: Option<u32>,
    pub include_total_count: bool,
    pub include_deleted_items: bool,
    pub parameters: IndexMap<String, String>,
}

impl QueryDescription {
    pub fn new(table_name: impl Into<String>) -> Result<Self, Error> {
        let table_name = table_name.into();
        validate_table_name(&table_name, false)?;
        Ok(Self::unchecked(table_name))
    }

    /// A query against one of the system tables.
    pub fn for_system_table(table_name: impl Into<String>) -> Result<Self, Error> {
        let table_name = table_name.into();
        validate_table_name(&table_name, true)?;
        Ok(Self::unchecked(table_name))
    }

    fn unchecked(table_name: String) -> Self {
        QueryDescription {
            table_name,
            filter: None,
            ordering: vec![],
            selection: vec![],
            projections: vec![],
            skip: None,
            top: None,
            include_total_count: false,
            include_deleted_items: false,
            parameters: IndexMap::new(),
        }
    }

    /// Combine a predicate with the current filter, if any, using a logical and.
    pub fn and_filter(&mut self, predicate: FilterNode) -> Result<(), Error> {
        self.filter = Some(match self.filter.take() {
            None => predicate,
            Some(existing) => FilterNode::binary_from_children(
                BinaryOperatorKind::And,
                vec![existing, predicate],
            )?,
        });
        Ok(())
    }

    /// Add a primary sort key, ahead of the existing ones.
    pub fn prepend_ordering(&mut self, ordering: OrderByNode) {
        self.ordering.insert(0, ordering);
    }

    pub fn append_ordering(&mut self, ordering: OrderByNode) {
        self.ordering.push(ordering);
    }

    /// Add a member to the selection, unless it is already selected.
    pub fn select(&mut self, member: impl Into<String>) {
        let member = member.into();
        if !self.selection.contains(&member) {
            self.selection.push(member);
        }
    }

    pub fn add_parameter(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), Error> {
        let key = key.into();
        validate_parameter_name(&key)?;
        self.parameters.insert(key, value.into());
        Ok(())
    }
}
