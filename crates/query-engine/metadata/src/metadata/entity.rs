//! Entity schemas: the members of a model type, and a process-wide cache of them.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use once_cell::sync::Lazy;

use super::types::ClrType;

/// A property of a model type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberInfo {
    /// The declared name.
    pub name: String,
    pub ty: ClrType,
    /// An explicit wire name, overriding the naming policy.
    pub json_name: Option<String>,
}

impl MemberInfo {
    pub fn new(name: impl Into<String>, ty: ClrType) -> Self {
        MemberInfo {
            name: name.into(),
            ty,
            json_name: None,
        }
    }

    #[must_use]
    pub fn with_json_name(mut self, json_name: impl Into<String>) -> Self {
        self.json_name = Some(json_name.into());
        self
    }
}

/// The members of a model type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    pub name: String,
    pub members: Vec<MemberInfo>,
}

impl EntitySchema {
    pub fn member(&self, name: &str) -> Option<&MemberInfo> {
        self.members.iter().find(|member| member.name == name)
    }

    pub fn clr_type(&self) -> ClrType {
        ClrType::Entity(self.name.clone())
    }
}

/// A model type that can be queried.
pub trait Entity: 'static {
    /// The remote table holding entities of this type.
    const TABLE_NAME: &'static str;

    fn schema() -> EntitySchema;
}

static SCHEMAS: Lazy<RwLock<HashMap<TypeId, Arc<EntitySchema>>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// The schema of `T`, computed on first use and shared afterwards.
pub fn schema_of<T: Entity>() -> Arc<EntitySchema> {
    let key = TypeId::of::<T>();
    if let Some(schema) = SCHEMAS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&key)
    {
        return Arc::clone(schema);
    }
    let mut schemas = SCHEMAS.write().unwrap_or_else(PoisonError::into_inner);
    Arc::clone(
        schemas
            .entry(key)
            .or_insert_with(|| Arc::new(T::schema())),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Book;

    impl Entity for Book {
        const TABLE_NAME: &'static str = "books";

        fn schema() -> EntitySchema {
            EntitySchema {
                name: "Book".to_string(),
                members: vec![
                    MemberInfo::new("Id", ClrType::String),
                    MemberInfo::new("Pages", ClrType::Int32).with_json_name("page_count"),
                ],
            }
        }
    }

    #[test]
    fn schemas_are_computed_once() {
        let first = schema_of::<Book>();
        let second = schema_of::<Book>();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(
            first.member("Pages").and_then(|m| m.json_name.as_deref()),
            Some("page_count")
        );
    }

    #[test]
    fn schemas_can_be_read_from_many_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| std::thread::spawn(schema_of::<Book>))
            .collect();
        for handle in handles {
            let schema = handle.join().unwrap();
            assert_eq!(schema.members.len(), 2);
        }
    }
}
