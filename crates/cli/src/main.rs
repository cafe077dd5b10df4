//! Parse an OData query string and render it again, as OData or as SQLite.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use datasync_configuration::{
    make_runtime_configuration, parse_configuration, Configuration, ParsedConfiguration,
};
use indexmap::IndexMap;
use query_engine_odata::odata::{parse_query, to_odata};
use query_engine_sql::sql::ast::SqlValue;
use query_engine_sql::sql::{format_count, format_delete, format_select, SqlQuery};
use serde::Serialize;

/// Render an OData query string again, as OData or as a SQLite statement.
#[derive(Parser, Debug)]
#[command(name = "datasync-query", version)]
struct Options {
    /// The table the query runs against.
    #[arg(long)]
    table: String,

    /// A directory holding a configuration.json.
    #[arg(long, value_name = "DIR", env = "DATASYNC_CONFIGURATION_DIR")]
    configuration: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Target::Odata)]
    target: Target,

    /// Pretty-print SQL output.
    #[arg(long)]
    pretty: bool,

    /// The OData query string, with or without the leading '?'.
    query: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Target {
    /// An OData query string.
    Odata,
    /// A SELECT statement.
    Sql,
    /// A SELECT COUNT statement.
    Count,
    /// A DELETE statement.
    Delete,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();
    let options = Options::parse();

    let configuration = match &options.configuration {
        Some(dir) => load_configuration(dir).await?,
        None => make_runtime_configuration(ParsedConfiguration::empty())?,
    };

    println!("{}", run(&options, &configuration)?);
    Ok(())
}

async fn load_configuration(dir: &Path) -> anyhow::Result<Configuration> {
    let parsed = parse_configuration(dir)
        .await
        .with_context(|| format!("reading the configuration in {}", dir.display()))?;
    Ok(make_runtime_configuration(parsed)?)
}

fn run(options: &Options, configuration: &Configuration) -> anyhow::Result<String> {
    let mut query = parse_query(&options.table, &options.query)?;
    query.include_deleted_items |= configuration.include_deleted_items;
    tracing::debug!("Parsed query: {:?}", query);

    let table = configuration.table(&query.table_name);
    let output = match options.target {
        Target::Odata => to_odata(&query)?.to_query_string(),
        Target::Sql => print_sql(&format_select(&query, &table), options.pretty)?,
        Target::Count => print_sql(&format_count(&query, &table), options.pretty)?,
        Target::Delete => {
            let delete = format_delete(&query, &table).with_context(|| {
                format!(
                    "the filter of the query on '{}' cannot be expressed in SQL",
                    query.table_name
                )
            })?;
            print_sql(&delete, options.pretty)?
        }
    };
    Ok(output)
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Details<'a> {
    parameters: &'a IndexMap<String, SqlValue>,
    filter_degraded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    unapplied_skip: Option<u32>,
}

/// The statement, followed by a JSON document of its parameters and caveats.
fn print_sql(query: &SqlQuery, pretty: bool) -> anyhow::Result<String> {
    let sql = if pretty {
        sqlformat::format(
            &query.sql,
            &sqlformat::QueryParams::None,
            sqlformat::FormatOptions::default(),
        )
    } else {
        query.sql.clone()
    };
    let details = Details {
        parameters: &query.parameters,
        filter_degraded: query.filter_degraded,
        unapplied_skip: query.unapplied_skip,
    };
    Ok(format!(
        "{sql}\n\n{}",
        serde_json::to_string_pretty(&details)?
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Options {
        Options::try_parse_from(std::iter::once("datasync-query").chain(args.iter().copied()))
            .unwrap()
    }

    fn empty_configuration() -> Configuration {
        make_runtime_configuration(ParsedConfiguration::empty()).unwrap()
    }

    #[test]
    fn odata_is_rendered_in_canonical_form() {
        let output = run(
            &options(&["--table", "movies", "?$top=5&$filter=year eq 1994"]),
            &empty_configuration(),
        )
        .unwrap();
        insta::assert_snapshot!(output, @"$filter=(year eq 1994)&$top=5");
    }

    #[test]
    fn configuration_can_include_deleted_items() {
        let configuration = Configuration {
            include_deleted_items: true,
            ..empty_configuration()
        };
        let output = run(&options(&["--table", "movies", "$top=5"]), &configuration).unwrap();
        insta::assert_snapshot!(output, @"$top=5&__includedeleted=true");
    }

    #[test]
    fn sql_is_followed_by_its_parameters() {
        let output = run(
            &options(&[
                "--table",
                "movies",
                "--target",
                "sql",
                "$filter=year eq 1994&$top=5",
            ]),
            &empty_configuration(),
        )
        .unwrap();
        insta::assert_snapshot!(output, @r###"
        SELECT * FROM [movies] WHERE ([year] = @p1) LIMIT 5

        {
          "parameters": {
            "@p1": 1994
          },
          "filterDegraded": false
        }
        "###);
    }

    #[test]
    fn count_ignores_paging() {
        let output = run(
            &options(&["--table", "movies", "--target", "count", "$top=5"]),
            &empty_configuration(),
        )
        .unwrap();
        assert!(output.starts_with("SELECT COUNT(1) AS [count] FROM [movies]\n"));
    }

    #[test]
    fn degraded_deletes_are_refused() {
        let error = run(
            &options(&[
                "--table",
                "movies",
                "--target",
                "delete",
                "$filter=(year mod 2) eq 0",
            ]),
            &empty_configuration(),
        )
        .unwrap_err();
        assert!(error.to_string().contains("cannot be expressed in SQL"));
    }

    #[test]
    fn invalid_queries_are_errors() {
        let result = run(
            &options(&["--table", "movies", "$filter=year eq"]),
            &empty_configuration(),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn configuration_is_read_from_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let parsed = ParsedConfiguration {
            include_deleted_items: true,
            ..ParsedConfiguration::empty()
        };
        datasync_configuration::write_parsed_configuration(&parsed, dir.path())
            .await
            .unwrap();

        let configuration = load_configuration(dir.path()).await.unwrap();

        assert!(configuration.include_deleted_items);
    }
}
