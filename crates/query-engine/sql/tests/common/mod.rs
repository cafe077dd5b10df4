#![allow(dead_code)]

use query_engine_ast::ast::QueryDescription;
use query_engine_metadata::metadata::{
    schema_of, ClrType, ClrTypeKind, Entity, EntitySchema, EnumType, MemberInfo, NamingPolicy,
    TableDefinition, Value,
};
use query_engine_translation::translation::builder::TableQuery;
use query_engine_translation::translation::query;

pub struct Movie;

pub struct Person;

pub fn genre() -> EnumType {
    EnumType {
        name: "Genre".to_string(),
        underlying: ClrTypeKind::Int32,
        members: vec![
            ("Action".to_string(), 1),
            ("Comedy".to_string(), 2),
            ("Drama".to_string(), 3),
        ],
    }
}

pub fn drama() -> Value {
    Value::Enum {
        ty: genre(),
        name: "Drama".to_string(),
        value: 3,
    }
}

impl Entity for Movie {
    const TABLE_NAME: &'static str = "movies";

    fn schema() -> EntitySchema {
        EntitySchema {
            name: "Movie".to_string(),
            members: vec![
                MemberInfo::new("Id", ClrType::String),
                MemberInfo::new("Title", ClrType::String),
                MemberInfo::new("Duration", ClrType::Int32),
                MemberInfo::new("Rating", ClrType::String),
                MemberInfo::new("ReleaseDate", ClrType::DateTimeOffset),
                MemberInfo::new("BestPictureWinner", ClrType::Bool),
                MemberInfo::new("Year", ClrType::Int32),
                MemberInfo::new("Score", ClrType::Double),
                MemberInfo::new("Genre", ClrType::Enum(genre())),
                MemberInfo::new("Director", ClrType::Entity("Person".to_string())),
            ],
        }
    }
}

impl Entity for Person {
    const TABLE_NAME: &'static str = "people";

    fn schema() -> EntitySchema {
        EntitySchema {
            name: "Person".to_string(),
            members: vec![MemberInfo::new("Name", ClrType::String)],
        }
    }
}

pub fn movies() -> TableQuery<Movie> {
    TableQuery::new()
}

/// The store table of the `Movie` entity.
pub fn movies_table() -> TableDefinition {
    TableDefinition::from_schema(&schema_of::<Movie>(), NamingPolicy::CamelCase)
}

pub fn describe(table_query: &TableQuery<Movie>) -> QueryDescription {
    let _ = env_logger::builder().is_test(true).try_init();
    query::translate(table_query).expect("the query translates")
}

/// A description of the movies table with the given filter.
pub fn filtered(filter: query_engine_ast::ast::FilterNode) -> QueryDescription {
    let mut description = QueryDescription::new("movies").expect("valid table name");
    description.and_filter(filter).expect("filter is complete");
    description
}
