#![allow(dead_code)]

use query_engine_ast::ast::QueryDescription;
use query_engine_metadata::metadata::{
    ClrType, ClrTypeKind, Entity, EntitySchema, EnumType, MemberInfo, Value,
};
use query_engine_translation::translation::builder::TableQuery;
use query_engine_translation::translation::query::{self, error::Error};

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
                MemberInfo::new("Rating", ClrType::String).with_json_name("mpaa_rating"),
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
            members: vec![
                MemberInfo::new("Name", ClrType::String),
                MemberInfo::new("Born", ClrType::Int32),
            ],
        }
    }
}

pub fn movies() -> TableQuery<Movie> {
    TableQuery::new()
}

/// Translate a query, with logging enabled.
pub fn translate(table_query: &TableQuery<Movie>) -> Result<QueryDescription, Error> {
    let _ = env_logger::builder().is_test(true).try_init();
    query::translate(table_query)
}
