pub mod configuration;
pub mod error;
pub mod version1;

pub use configuration::{configuration_schema, make_runtime_configuration, Configuration};
pub use error::{ParseConfigurationError, WriteParsedConfigurationError};
pub use version1::{
    parse_configuration, write_parsed_configuration, ParsedConfiguration, CONFIGURATION_FILENAME,
};
