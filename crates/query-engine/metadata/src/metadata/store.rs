//! Metadata information regarding the local store and its tables.

use std::collections::BTreeMap;

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity::EntitySchema;
use super::naming::{resolve_member_name, NamingPolicy};
use super::types::{ClrType, ClrTypeKind};

/// The column types understood by the local SQLite store.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum StoreType {
    Integer,
    Text,
    None,
    Real,
    Numeric,
    Boolean,
    Datetime,
    Float,
    Blob,
    Guid,
    Json,
    Uri,
    Timespan,
}

impl StoreType {
    pub fn name(self) -> &'static str {
        match self {
            StoreType::Integer => "INTEGER",
            StoreType::Text => "TEXT",
            StoreType::None => "NONE",
            StoreType::Real => "REAL",
            StoreType::Numeric => "NUMERIC",
            StoreType::Boolean => "BOOLEAN",
            StoreType::Datetime => "DATETIME",
            StoreType::Float => "FLOAT",
            StoreType::Blob => "BLOB",
            StoreType::Guid => "GUID",
            StoreType::Json => "JSON",
            StoreType::Uri => "URI",
            StoreType::Timespan => "TIMESPAN",
        }
    }

    pub fn is_float_type(self) -> bool {
        matches!(self, StoreType::Real | StoreType::Float)
    }


    /// The column type used to store a member of the given type.
    pub fn for_clr_type(ty: &ClrType) -> StoreType {
        match ty {
            ClrType::Bool => StoreType::Boolean,
            ClrType::Byte
            | ClrType::SByte
            | ClrType::Int16
            | ClrType::UInt16
            | ClrType::Int32
            | ClrType::UInt32
            | ClrType::Int64
            | ClrType::UInt64 => StoreType::Integer,
            ClrType::Single | ClrType::Double => StoreType::Float,
            ClrType::Decimal => StoreType::Numeric,
            // Enums are stored by member name.
            ClrType::Char | ClrType::String | ClrType::Enum(_) => StoreType::Text,
            ClrType::Guid => StoreType::Guid,
            ClrType::DateTime | ClrType::DateTimeOffset => StoreType::Datetime,
            ClrType::Entity(_) => StoreType::Json,
            ClrType::Null => StoreType::None,
        }
    }

    /// The type named in a `CAST(x AS ...)` converting to the given type.
    pub fn cast_type_for(ty: &ClrType) -> StoreType {
        match ty.kind() {
            ClrTypeKind::Bool
            | ClrTypeKind::DateTime
            | ClrTypeKind::DateTimeOffset
            | ClrTypeKind::Decimal => StoreType::Numeric,
            ClrTypeKind::Single | ClrTypeKind::Double => StoreType::Real,
            kind if kind.is_integral() => StoreType::Integer,
            ClrTypeKind::Enum => StoreType::Integer,
            _ => StoreType::Text,
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Mapping from a table name to its information.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct TablesInfo(pub BTreeMap<String, TableDefinition>);

impl TablesInfo {
    pub fn empty() -> Self {
        TablesInfo(BTreeMap::new())
    }

    pub fn get(&self, table_name: &str) -> Option<&TableDefinition> {
        self.0.get(table_name)
    }
}

/// The columns of a store table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableDefinition {
    pub columns: BTreeMap<String, StoreType>,
}

impl TableDefinition {
    /// Derive the table layout of an entity, using the same column names the
    /// member names resolve to in queries.
    pub fn from_schema(schema: &EntitySchema, policy: NamingPolicy) -> Self {
        TableDefinition {
            columns: schema
                .members
                .iter()
                .map(|member| {
                    (
                        resolve_member_name(member, policy),
                        StoreType::for_clr_type(&member.ty),
                    )
                })
                .collect(),
        }
    }

    pub fn column_type(&self, column: &str) -> Option<StoreType> {
        self.columns.get(column).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::super::types::EnumType;
    use super::*;

    #[test]
    fn test_cast_types_are_number_or_text() {
        for kind in enum_iterator::all::<ClrTypeKind>() {
            let Some(ty) = ClrType::from_kind(kind) else {
                continue;
            };
            let cast = StoreType::cast_type_for(&ty);
            assert!(
                matches!(
                    cast,
                    StoreType::Numeric | StoreType::Integer | StoreType::Real | StoreType::Text
                ),
                "{kind:?} casts to {cast}"
            );
        }
    }

    #[test]
    fn store_type_names_round_trip_through_serde() {
        for store_type in enum_iterator::all::<StoreType>() {
            let json = serde_json::to_string(&store_type).unwrap();
            assert_eq!(json, format!("\"{}\"", store_type.name()));
        }
    }

    #[test]
    fn float_columns_are_floats() {
        assert!(StoreType::Float.is_float_type());
        assert!(StoreType::Real.is_float_type());
        assert!(!StoreType::Integer.is_float_type());
        assert!(!StoreType::Numeric.is_float_type());
    }

    #[test]
    fn enums_are_stored_as_text() {
        let genre = ClrType::Enum(EnumType {
            name: "Genre".to_string(),
            underlying: ClrTypeKind::Int32,
            members: vec![("Drama".to_string(), 3)],
        });
        assert_eq!(StoreType::for_clr_type(&genre), StoreType::Text);
        assert_eq!(StoreType::for_clr_type(&ClrType::Int32), StoreType::Integer);
    }
}
