use std::collections::BTreeMap;

use datasync_configuration::{
    configuration_schema, make_runtime_configuration, parse_configuration,
    write_parsed_configuration, ParseConfigurationError, ParsedConfiguration,
    CONFIGURATION_FILENAME,
};
use query_engine_metadata::metadata::{
    ClrType, Entity, EntitySchema, MemberInfo, NamingPolicy, StoreType, TableDefinition,
};

struct Movie;

impl Entity for Movie {
    const TABLE_NAME: &'static str = "movies";

    fn schema() -> EntitySchema {
        EntitySchema {
            name: "Movie".to_string(),
            members: vec![
                MemberInfo::new("Id", ClrType::String),
                MemberInfo::new("Title", ClrType::String),
                MemberInfo::new("Year", ClrType::Int32),
                MemberInfo::new("Score", ClrType::Double).with_json_name("rating"),
            ],
        }
    }
}

#[tokio::test]
async fn written_configuration_reads_back() {
    let dir = tempfile::tempdir().unwrap();
    let parsed = ParsedConfiguration {
        include_deleted_items: true,
        ..ParsedConfiguration::empty().with_entity::<Movie>()
    };

    write_parsed_configuration(&parsed, dir.path()).await.unwrap();
    let read_back = parse_configuration(dir.path()).await.unwrap();

    similar_asserts::assert_eq!(read_back, parsed);
    let movies = &read_back.tables["movies"];
    assert_eq!(movies.column_type("year"), Some(StoreType::Integer));
    assert_eq!(movies.column_type("rating"), Some(StoreType::Float));
}

#[tokio::test]
async fn written_configuration_ends_with_a_newline() {
    let dir = tempfile::tempdir().unwrap();
    write_parsed_configuration(&ParsedConfiguration::empty(), dir.path())
        .await
        .unwrap();

    let contents = std::fs::read_to_string(dir.path().join(CONFIGURATION_FILENAME)).unwrap();
    assert!(contents.ends_with("}\n"));
    assert!(dir.path().join("schema.json").exists());
}

#[tokio::test]
async fn omitted_fields_take_their_defaults() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIGURATION_FILENAME), r#"{ "version": 1 }"#).unwrap();

    let parsed = parse_configuration(dir.path()).await.unwrap();

    assert_eq!(parsed.naming_policy, NamingPolicy::CamelCase);
    assert!(!parsed.include_deleted_items);
    assert!(parsed.tables.is_empty());
}

#[tokio::test]
async fn syntax_errors_report_their_location() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(CONFIGURATION_FILENAME),
        "{\n  \"version\": 1,\n  \"tables\": nope\n}\n",
    )
    .unwrap();

    let error = parse_configuration(dir.path()).await.unwrap_err();

    match error {
        ParseConfigurationError::ParseError {
            file_path,
            line,
            column,
            ..
        } => {
            assert_eq!(file_path, dir.path().join(CONFIGURATION_FILENAME));
            assert_eq!(line, 3);
            assert!(column > 0);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[tokio::test]
async fn missing_files_are_io_errors() {
    let dir = tempfile::tempdir().unwrap();

    let error = parse_configuration(dir.path()).await.unwrap_err();

    assert!(matches!(error, ParseConfigurationError::IoError { .. }));
}

#[tokio::test]
async fn other_versions_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(CONFIGURATION_FILENAME), r#"{ "version": 2 }"#).unwrap();

    let error = parse_configuration(dir.path()).await.unwrap_err();

    assert!(matches!(
        error,
        ParseConfigurationError::UnsupportedVersion(2)
    ));
}

#[test]
fn runtime_configuration_keeps_the_tables() {
    let parsed = ParsedConfiguration::empty().with_entity::<Movie>();

    let configuration = make_runtime_configuration(parsed).unwrap();

    assert!(!configuration.include_deleted_items);
    assert_eq!(
        configuration.table("movies").column_type("title"),
        Some(StoreType::Text)
    );
    assert_eq!(configuration.table("unknown"), TableDefinition::default());
}

#[test]
fn entity_columns_follow_the_naming_policy() {
    let parsed = ParsedConfiguration {
        naming_policy: NamingPolicy::PascalCase,
        ..ParsedConfiguration::empty()
    }
    .with_entity::<Movie>();

    let movies = &parsed.tables["movies"];
    assert_eq!(movies.column_type("Title"), Some(StoreType::Text));
    assert_eq!(movies.column_type("title"), None);
    assert_eq!(movies.column_type("rating"), Some(StoreType::Float));
}

#[test]
fn system_tables_are_allowed() {
    let mut parsed = ParsedConfiguration::empty();
    parsed
        .tables
        .insert("__operations".to_string(), TableDefinition::default());

    assert!(make_runtime_configuration(parsed).is_ok());
}

#[test]
fn invalid_table_names_are_rejected() {
    let mut parsed = ParsedConfiguration::empty();
    parsed.tables.insert(
        "Movies".to_string(),
        TableDefinition {
            columns: BTreeMap::new(),
        },
    );

    let error = make_runtime_configuration(parsed).unwrap_err();

    assert!(matches!(
        error,
        ParseConfigurationError::InvalidTableName(name) if name == "Movies"
    ));
}

#[test]
fn configurations_validate_against_the_schema() {
    let schema = serde_json::to_value(configuration_schema()).unwrap();
    let compiled = jsonschema::JSONSchema::compile(&schema).unwrap();

    let configuration =
        serde_json::to_value(ParsedConfiguration::empty().with_entity::<Movie>()).unwrap();
    assert!(compiled.is_valid(&configuration));

    let bad_column_type = serde_json::json!({
        "version": 1,
        "tables": { "movies": { "columns": { "title": "VARCHAR" } } }
    });
    assert!(!compiled.is_valid(&bad_column_type));
}
