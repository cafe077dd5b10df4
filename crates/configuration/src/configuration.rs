//! Configuration for the query engine.

use query_engine_ast::ast::validate_table_name;
use query_engine_metadata::metadata::{TableDefinition, TablesInfo};
use schemars::schema::RootSchema;

use crate::error::ParseConfigurationError;
use crate::version1::{ParsedConfiguration, CURRENT_VERSION};

/// The 'Configuration' type collects all the information necessary to render queries.
///
/// Values of this type are produced from a 'ParsedConfiguration' using
/// 'make_runtime_configuration'.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    pub include_deleted_items: bool,
    pub tables: TablesInfo,
}

impl Configuration {
    /// The columns of a table. A table the configuration does not describe
    /// has no known columns.
    pub fn table(&self, table_name: &str) -> TableDefinition {
        self.tables.get(table_name).cloned().unwrap_or_default()
    }
}

/// Validate a parsed configuration and turn it into a runtime configuration.
pub fn make_runtime_configuration(
    parsed_config: ParsedConfiguration,
) -> Result<Configuration, ParseConfigurationError> {
    if parsed_config.version != CURRENT_VERSION {
        return Err(ParseConfigurationError::UnsupportedVersion(
            parsed_config.version,
        ));
    }
    for table_name in parsed_config.tables.keys() {
        validate_table_name(table_name, true)
            .map_err(|_| ParseConfigurationError::InvalidTableName(table_name.clone()))?;
    }
    Ok(Configuration {
        include_deleted_items: parsed_config.include_deleted_items,
        tables: TablesInfo(parsed_config.tables),
    })
}

/// The JSON schema of the configuration file.
pub fn configuration_schema() -> RootSchema {
    schemars::schema_for!(ParsedConfiguration)
}
