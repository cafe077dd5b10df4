#![allow(dead_code)]

use query_engine_metadata::metadata::{
    ClrType, ClrTypeKind, Entity, EntitySchema, EnumType, MemberInfo, Value,
};
use query_engine_odata::odata::{to_odata, Error};
use query_engine_translation::translation::builder::TableQuery;
use query_engine_translation::translation::query;

pub struct Movie;

pub struct Person;

pub fn drama() -> Value {
    Value::Enum {
        ty: EnumType {
            name: "Genre".to_string(),
            underlying: ClrTypeKind::Int32,
            members: vec![("Comedy".to_string(), 2), ("Drama".to_string(), 3)],
        },
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
                MemberInfo::new("Title", ClrType::String),
                MemberInfo::new("Duration", ClrType::Int32),
                MemberInfo::new("ReleaseDate", ClrType::DateTimeOffset),
                MemberInfo::new("BestPictureWinner", ClrType::Bool),
                MemberInfo::new("Year", ClrType::Int32),
                MemberInfo::new("Score", ClrType::Double),
                MemberInfo::new("Genre", ClrType::Enum(match drama() {
                    Value::Enum { ty, .. } => ty,
                    _ => unreachable!(),
                })),
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

/// Translate a query and render it as an unescaped OData query string.
pub fn render(table_query: &TableQuery<Movie>) -> Result<String, Error> {
    let description = query::translate(table_query).expect("the query translates");
    to_odata(&description).map(|odata| odata.to_query_string())
}
