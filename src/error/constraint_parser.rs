use regex::Regex;
use std::sync::OnceLock;

/// Tables of the schema, longest first so that `check_list_items_…` is not
/// mistaken for `check_lists_…`.
const KNOWN_TABLES: &[&str] = &[
    "check_list_items",
    "item_assigns",
    "club_members",
    "preset_items",
    "check_lists",
    "club_links",
    "schedules",
    "members",
    "friends",
    "presets",
    "clubs",
];

const CONSTRAINT_SUFFIXES: &[&str] = &["_fkey", "_pkey", "_key", "_check"];

struct RegexPatterns {
    key_value: Regex,
    column: Regex,
    table: Regex,
}

impl RegexPatterns {
    fn new() -> Self {
        Self {
            key_value: Regex::new(r"Key \(([^)]+)\)=\(([^)]*)\)").expect("valid key/value regex"),
            column: Regex::new(r#"column "([^"]+)""#).expect("valid column regex"),
            table: Regex::new(r#"(?:relation|table) "([^"]+)""#).expect("valid table regex"),
        }
    }
}

/// Extracts entity, field and value information from PostgreSQL constraint
/// violation messages.
pub struct ConstraintParser;

impl ConstraintParser {
    fn patterns() -> &'static RegexPatterns {
        static PATTERNS: OnceLock<RegexPatterns> = OnceLock::new();
        PATTERNS.get_or_init(RegexPatterns::new)
    }

    /// Returns `(entity, field, value)` for a unique violation.
    pub fn parse_unique_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let key_value = Self::extract_key_value_from_message(message);
        let (entity, field) = constraint_name
            .and_then(Self::parse_constraint_name)
            .or_else(|| {
                let (field, _) = key_value.clone()?;
                let table = Self::extract_table_from_message(message)?;
                Some((singular(&table), field))
            })?;
        let value = key_value
            .map(|(_, value)| value)
            .unwrap_or_else(|| "unknown".to_string());
        Some((entity, field, value))
    }

    /// Returns `(entity, field)` for a not-null violation.
    pub fn parse_not_null_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        let field = Self::extract_column_from_message(message)?;
        let entity = Self::extract_table_from_message(message)
            .map(|table| singular(&table))
            .or_else(|| constraint_name.and_then(Self::parse_constraint_name).map(|(e, _)| e))
            .unwrap_or_else(|| "record".to_string());
        Some((entity, field))
    }

    /// Returns `(entity, field, referenced_value)` for a foreign key violation.
    pub fn parse_foreign_key_violation(
        message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String, String)> {
        let (entity, field) = constraint_name.and_then(Self::parse_constraint_name)?;
        let value = Self::extract_key_value_from_message(message)
            .map(|(_, value)| value)
            .unwrap_or_else(|| "unknown".to_string());
        Some((entity, field, value))
    }

    /// Returns `(entity, field)` for a check violation.
    pub fn parse_check_violation(
        _message: &str,
        constraint_name: Option<&str>,
    ) -> Option<(String, String)> {
        constraint_name.and_then(Self::parse_constraint_name)
    }

    /// Splits a PostgreSQL default constraint name (`{table}_{columns}_{suffix}`)
    /// into an entity name and the constrained column(s).
    pub fn parse_constraint_name(constraint_name: &str) -> Option<(String, String)> {
        let stem = CONSTRAINT_SUFFIXES
            .iter()
            .find_map(|suffix| constraint_name.strip_suffix(suffix))?;
        KNOWN_TABLES.iter().find_map(|table| {
            let columns = stem.strip_prefix(table)?.strip_prefix('_')?;
            (!columns.is_empty()).then(|| (singular(table), columns.to_string()))
        })
    }

    pub fn extract_column_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .column
            .captures(message)
            .map(|caps| caps[1].to_string())
    }

    pub fn extract_table_from_message(message: &str) -> Option<String> {
        Self::patterns()
            .table
            .captures(message)
            .map(|caps| caps[1].to_string())
    }

    pub fn extract_key_value_from_message(message: &str) -> Option<(String, String)> {
        Self::patterns()
            .key_value
            .captures(message)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
    }
}

fn singular(table: &str) -> String {
    table.strip_suffix('s').unwrap_or(table).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_constraint_name_for_multiword_tables() {
        assert_eq!(
            ConstraintParser::parse_constraint_name("check_list_items_check_list_id_fkey"),
            Some(("check_list_item".to_string(), "check_list_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("check_lists_schedule_id_key"),
            Some(("check_list".to_string(), "schedule_id".to_string()))
        );
        assert_eq!(
            ConstraintParser::parse_constraint_name("club_members_club_id_member_id_key"),
            Some(("club_member".to_string(), "club_id_member_id".to_string()))
        );
    }

    #[test]
    fn test_parse_constraint_name_rejects_unknown() {
        assert_eq!(ConstraintParser::parse_constraint_name("widgets_name_key"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("members_email"), None);
        assert_eq!(ConstraintParser::parse_constraint_name("members_key"), None);
    }

    #[test]
    fn test_parse_unique_violation_with_constraint_name() {
        let message = "duplicate key value violates unique constraint \"members_email_key\"";
        let parsed = ConstraintParser::parse_unique_violation(
            &format!("{message}\nDETAIL: Key (email)=(a@b.io) already exists."),
            Some("members_email_key"),
        );
        assert_eq!(
            parsed,
            Some(("member".to_string(), "email".to_string(), "a@b.io".to_string()))
        );
    }

    #[test]
    fn test_parse_unique_violation_without_constraint_name() {
        let message =
            "duplicate key in relation \"club_links\" Key (invite_code)=(abc) already exists";
        let parsed = ConstraintParser::parse_unique_violation(message, None);
        assert_eq!(
            parsed,
            Some(("club_link".to_string(), "invite_code".to_string(), "abc".to_string()))
        );
    }

    #[test]
    fn test_parse_not_null_violation() {
        let message = "null value in column \"name\" of relation \"clubs\" violates not-null constraint";
        assert_eq!(
            ConstraintParser::parse_not_null_violation(message, None),
            Some(("club".to_string(), "name".to_string()))
        );
    }

    #[test]
    fn test_parse_foreign_key_violation() {
        let message = "insert or update violates foreign key constraint\nKey (club_id)=(42) is not present";
        assert_eq!(
            ConstraintParser::parse_foreign_key_violation(message, Some("schedules_club_id_fkey")),
            Some(("schedule".to_string(), "club_id".to_string(), "42".to_string()))
        );
    }

    #[test]
    fn test_parse_check_violation() {
        assert_eq!(
            ConstraintParser::parse_check_violation("", Some("clubs_maximum_capacity_check")),
            Some(("club".to_string(), "maximum_capacity".to_string()))
        );
    }

    #[test]
    fn test_graceful_parsing_failures() {
        assert_eq!(ConstraintParser::parse_unique_violation("garbage", None), None);
        assert_eq!(ConstraintParser::parse_not_null_violation("garbage", None), None);
        assert_eq!(ConstraintParser::parse_foreign_key_violation("garbage", None), None);
        assert_eq!(ConstraintParser::extract_key_value_from_message("no key"), None);
    }
}
