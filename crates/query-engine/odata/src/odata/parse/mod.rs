//! Read an OData query string back into a `QueryDescription`.

mod lexer;
mod parser;

use percent_encoding::percent_decode_str;
use query_engine_ast::ast::{MemberAccess, OrderByNode, QueryDescription, SYSTEM_TABLE_PREFIX};

use super::error::Error;
pub use parser::parse_filter;

/// Parse the value of an `$orderby` option: a comma separated list of
/// member paths, each optionally followed by `asc` or `desc`.
pub fn parse_order_by(text: &str) -> Result<Vec<OrderByNode>, Error> {
    let invalid = || Error::InvalidQueryOption {
        option: "$orderby".to_string(),
        value: text.to_string(),
    };
    text.split(',')
        .map(|clause| {
            let mut words = clause.split_whitespace();
            let path = words.next().ok_or_else(invalid)?;
            let mut names = path.split('/');
            let mut member = MemberAccess::new(names.next().ok_or_else(invalid)?);
            for name in names {
                if name.is_empty() {
                    return Err(invalid());
                }
                member = member.then(name);
            }
            if member.name.is_empty() {
                return Err(invalid());
            }
            let ordering = match words.next() {
                None | Some("asc") => OrderByNode::ascending(member),
                Some("desc") => OrderByNode::descending(member),
                Some(_) => return Err(invalid()),
            };
            match words.next() {
                Some(_) => Err(invalid()),
                None => Ok(ordering),
            }
        })
        .collect()
}

/// Parse a full query string, with or without its leading `?`.
///
/// Options the service defines are read into the description; any other key is
/// kept as a custom parameter.
pub fn parse_query(table_name: &str, query_string: &str) -> Result<QueryDescription, Error> {
    let mut query = if table_name.starts_with(SYSTEM_TABLE_PREFIX) {
        QueryDescription::for_system_table(table_name)?
    } else {
        QueryDescription::new(table_name)?
    };
    let query_string = query_string.strip_prefix('?').unwrap_or(query_string);
    for pair in query_string.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let key = decode(key)?;
        let value = decode(value)?;
        let invalid = || Error::InvalidQueryOption {
            option: key.clone(),
            value: value.clone(),
        };
        match key.as_str() {
            "$filter" => query.and_filter(parse_filter(&value)?)?,
            "$orderby" => {
                for ordering in parse_order_by(&value)? {
                    query.append_ordering(ordering);
                }
            }
            "$select" => {
                for field in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
                    query.select(field);
                }
            }
            "$skip" => query.skip = Some(value.parse().map_err(|_| invalid())?),
            "$top" => query.top = Some(value.parse().map_err(|_| invalid())?),
            "$count" => query.include_total_count = value.parse().map_err(|_| invalid())?,
            "$inlinecount" => {
                query.include_total_count = match value.as_str() {
                    "allpages" => true,
                    "none" => false,
                    _ => return Err(invalid()),
                }
            }
            "__includedeleted" => {
                query.include_deleted_items = value.parse().map_err(|_| invalid())?;
            }
            _ if key.starts_with('$') => return Err(invalid()),
            _ => query.add_parameter(key.as_str(), value.as_str())?,
        }
    }
    Ok(query)
}

fn decode(text: &str) -> Result<String, Error> {
    percent_decode_str(text)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| Error::InvalidQueryOption {
            option: text.to_string(),
            value: "not valid UTF-8".to_string(),
        })
}
