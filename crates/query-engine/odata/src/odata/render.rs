//! Render a `QueryDescription` as an OData v4 query string.

use std::fmt::Write;

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use query_engine_ast::ast::{
    BinaryOperatorKind, FilterNode, MemberAccess, OrderDirection, QueryDescription,
    UnaryOperatorKind,
};
use query_engine_metadata::metadata::{is_implicit_conversion, ClrType, ClrTypeKind};

use super::error::Error;
use super::values::format_literal;

/// Characters escaped in query option values.
const QUERY_VALUE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'`');

/// The query options of an OData request, in the order they are sent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ODataQuery {
    pub options: Vec<(String, String)>,
}

impl ODataQuery {
    /// The value of an option, if present.
    pub fn get(&self, option: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == option)
            .map(|(_, value)| value.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// The options joined with `&`, unescaped.
    pub fn to_query_string(&self) -> String {
        self.join(|text| text.to_string())
    }

    /// The options joined with `&`, ready to be appended to a URL.
    pub fn to_url_encoded(&self) -> String {
        self.join(|text| utf8_percent_encode(text, QUERY_VALUE).to_string())
    }

    fn join(&self, encode: impl Fn(&str) -> String) -> String {
        self.options
            .iter()
            .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    fn push(&mut self, key: &str, value: String) {
        self.options.push((key.to_string(), value));
    }
}

/// Render a query description as OData query options.
pub fn to_odata(query: &QueryDescription) -> Result<ODataQuery, Error> {
    let mut odata = ODataQuery::default();
    if let Some(filter) = &query.filter {
        let mut text = String::new();
        render_filter(filter, &mut text)?;
        odata.push("$filter", text);
    }
    if !query.ordering.is_empty() {
        let ordering = query
            .ordering
            .iter()
            .map(|order_by| match order_by.direction {
                OrderDirection::Ascending => member_path(&order_by.member),
                OrderDirection::Descending => format!("{} desc", member_path(&order_by.member)),
            })
            .collect::<Vec<_>>();
        odata.push("$orderby", ordering.join(","));
    }
    if !query.selection.is_empty() {
        odata.push("$select", query.selection.join(","));
    }
    if let Some(skip) = query.skip {
        odata.push("$skip", skip.to_string());
    }
    if let Some(top) = query.top {
        odata.push("$top", top.to_string());
    }
    if query.include_total_count {
        odata.push("$count", "true".to_string());
    }
    if query.include_deleted_items {
        odata.push("__includedeleted", "true".to_string());
    }
    for (key, value) in &query.parameters {
        odata.push(key, value.clone());
    }
    tracing::info!("OData query: {}", odata.to_query_string());
    Ok(odata)
}

/// Render a filter tree. Every binary operator is parenthesized.
pub fn render_filter(node: &FilterNode, out: &mut String) -> Result<(), Error> {
    match node {
        FilterNode::Constant(value) => out.push_str(&format_literal(value)),
        FilterNode::MemberAccess(member) => out.push_str(&member_path(member)),
        FilterNode::UnaryOperator { kind, operand } => match kind {
            UnaryOperatorKind::Not => {
                out.push_str("not(");
                render_filter(operand, out)?;
                out.push(')');
            }
            UnaryOperatorKind::Negate => {
                return Err(Error::UnsupportedRenderTarget("Negation".to_string()))
            }
        },
        FilterNode::BinaryOperator { kind, left, right } => {
            out.push('(');
            render_filter(left, out)?;
            let _ = write!(out, " {} ", operator_keyword(*kind));
            render_filter(right, out)?;
            out.push(')');
        }
        FilterNode::FunctionCall { name, arguments } => {
            out.push_str(name);
            out.push('(');
            for (index, argument) in arguments.iter().enumerate() {
                if index > 0 {
                    out.push(',');
                }
                render_filter(argument, out)?;
            }
            out.push(')');
        }
        FilterNode::Convert { source, target } => {
            if !is_widening(source, target) {
                return Err(Error::UnsupportedRenderTarget(format!(
                    "A conversion to {target}"
                )));
            }
            render_filter(source, out)?;
        }
    }
    Ok(())
}

/// Widening conversions are left to the service, which promotes operands itself.
fn is_widening(source: &FilterNode, target: &ClrType) -> bool {
    match source {
        FilterNode::Constant(value) => is_implicit_conversion(&value.clr_type(), target),
        _ => target.kind().is_numeric() || target.kind() == ClrTypeKind::DateTimeOffset,
    }
}

pub fn operator_keyword(kind: BinaryOperatorKind) -> &'static str {
    match kind {
        BinaryOperatorKind::And => "and",
        BinaryOperatorKind::Or => "or",
        BinaryOperatorKind::Eq => "eq",
        BinaryOperatorKind::Ne => "ne",
        BinaryOperatorKind::Gt => "gt",
        BinaryOperatorKind::Ge => "ge",
        BinaryOperatorKind::Lt => "lt",
        BinaryOperatorKind::Le => "le",
        BinaryOperatorKind::Add => "add",
        BinaryOperatorKind::Sub => "sub",
        BinaryOperatorKind::Mul => "mul",
        BinaryOperatorKind::Div => "div",
        BinaryOperatorKind::Mod => "mod",
    }
}

fn member_path(member: &MemberAccess) -> String {
    member.path().join("/")
}
