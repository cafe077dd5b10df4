//! The version 1 configuration format, and reading and writing it.

use std::collections::BTreeMap;
use std::path::Path;

use query_engine_metadata::metadata::{schema_of, Entity, NamingPolicy, TableDefinition};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::error::{ParseConfigurationError, WriteParsedConfigurationError};

pub const CURRENT_VERSION: u32 = 1;
pub const CONFIGURATION_FILENAME: &str = "configuration.json";
pub const CONFIGURATION_JSONSCHEMA_FILENAME: &str = "schema.json";

/// The configuration as it is written on disk.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedConfiguration {
    /// Which version of the configuration format are we using
    pub version: u32,
    /// How `with_entity` names the columns of members that do not name themselves.
    #[serde(default)]
    pub naming_policy: NamingPolicy,
    /// Whether queries ask for soft-deleted items by default.
    #[serde(default)]
    pub include_deleted_items: bool,
    /// The tables of the offline store, by name.
    #[serde(default)]
    pub tables: BTreeMap<String, TableDefinition>,
}

impl Default for ParsedConfiguration {
    fn default() -> Self {
        Self::empty()
    }
}

impl ParsedConfiguration {
    pub fn empty() -> Self {
        ParsedConfiguration {
            version: CURRENT_VERSION,
            naming_policy: NamingPolicy::default(),
            include_deleted_items: false,
            tables: BTreeMap::new(),
        }
    }

    /// Add the store table of an entity, with columns named by the naming policy.
    #[must_use]
    pub fn with_entity<T: Entity>(mut self) -> Self {
        let table = TableDefinition::from_schema(&schema_of::<T>(), self.naming_policy);
        self.tables.insert(T::TABLE_NAME.to_string(), table);
        self
    }
}

/// Read the configuration file in a directory.
pub async fn parse_configuration(
    configuration_dir: impl AsRef<Path>,
) -> Result<ParsedConfiguration, ParseConfigurationError> {
    let configuration_file = configuration_dir.as_ref().join(CONFIGURATION_FILENAME);

    let configuration_file_contents = fs::read_to_string(&configuration_file)
        .await
        .map_err(|error| ParseConfigurationError::IoError {
            file_path: configuration_file.clone(),
            error,
        })?;

    let parsed_config: ParsedConfiguration =
        serde_json::from_str(&configuration_file_contents).map_err(|error| {
            ParseConfigurationError::ParseError {
                file_path: configuration_file.clone(),
                line: error.line(),
                column: error.column(),
                message: error.to_string(),
            }
        })?;

    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion(
            parsed_config.version,
        ));
    }
    tracing::debug!(
        "Read {} table definition(s) from {}",
        parsed_config.tables.len(),
        configuration_file.display()
    );
    Ok(parsed_config)
}

/// Write the configuration, and the JSON schema describing it, into a directory.
pub async fn write_parsed_configuration(
    parsed_config: &ParsedConfiguration,
    out_dir: impl AsRef<Path>,
) -> Result<(), WriteParsedConfigurationError> {
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir).await?;

    fs::write(
        out_dir.join(CONFIGURATION_FILENAME),
        serde_json::to_string_pretty(parsed_config)? + "\n",
    )
    .await?;

    let schema = schemars::schema_for!(ParsedConfiguration);
    fs::write(
        out_dir.join(CONFIGURATION_JSONSCHEMA_FILENAME),
        serde_json::to_string_pretty(&schema)? + "\n",
    )
    .await?;

    Ok(())
}
