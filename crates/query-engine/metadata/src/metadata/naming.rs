//! Mapping model member names onto wire and column names.

use convert_case::{Case, Casing};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entity::MemberInfo;

/// How member names are transformed when no explicit wire name is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum NamingPolicy {
    /// Names are used as declared.
    None,
    #[default]
    CamelCase,
    SnakeCase,
    PascalCase,
    KebabCase,
}

impl NamingPolicy {
    pub fn apply(self, name: &str) -> String {
        match self {
            NamingPolicy::None => name.to_string(),
            NamingPolicy::CamelCase => name.to_case(Case::Camel),
            NamingPolicy::SnakeCase => name.to_case(Case::Snake),
            NamingPolicy::PascalCase => name.to_case(Case::Pascal),
            NamingPolicy::KebabCase => name.to_case(Case::Kebab),
        }
    }
}

/// The name a member is known by on the wire: an explicit wire name wins,
/// then the naming policy, then the declared name.
pub fn resolve_member_name(member: &MemberInfo, policy: NamingPolicy) -> String {
    match &member.json_name {
        Some(json_name) => json_name.clone(),
        None => policy.apply(&member.name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::types::ClrType;

    fn member(name: &str, json_name: Option<&str>) -> MemberInfo {
        MemberInfo {
            name: name.to_string(),
            ty: ClrType::String,
            json_name: json_name.map(str::to_string),
        }
    }

    #[test]
    fn explicit_wire_name_wins_over_policy() {
        let title = member("Title", Some("movie_title"));
        assert_eq!(
            resolve_member_name(&title, NamingPolicy::CamelCase),
            "movie_title"
        );
        assert_eq!(resolve_member_name(&title, NamingPolicy::None), "movie_title");
    }

    #[test]
    fn policy_applies_without_wire_name() {
        let release = member("ReleaseDate", None);
        assert_eq!(
            resolve_member_name(&release, NamingPolicy::CamelCase),
            "releaseDate"
        );
        assert_eq!(
            resolve_member_name(&release, NamingPolicy::SnakeCase),
            "release_date"
        );
        assert_eq!(
            resolve_member_name(&release, NamingPolicy::KebabCase),
            "release-date"
        );
        assert_eq!(
            resolve_member_name(&release, NamingPolicy::PascalCase),
            "ReleaseDate"
        );
    }

    #[test]
    fn no_policy_keeps_the_declared_name() {
        let release = member("ReleaseDate", None);
        assert_eq!(
            resolve_member_name(&release, NamingPolicy::None),
            "ReleaseDate"
        );
    }
}
