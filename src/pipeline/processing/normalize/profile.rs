use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::dates::{filter_dates, parse_dates};
use super::filters::{drop_columns, filter_allowed, filter_integers, replace_text};
use super::weights::clean_weights;
use crate::error::Result;
use crate::types::RecordSet;

/// One column-level cleaning rule. Rules are applied in profile order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ColumnRule {
    /// Literal replacement of every `pattern` occurrence in text values
    ReplaceText {
        column: String,
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
    /// Normalize to `YYYY-MM-DD`; with `drop_invalid` rows without a date are
    /// removed, otherwise they carry the no-date sentinel
    ParseDates {
        column: String,
        #[serde(default = "default_true")]
        drop_invalid: bool,
    },
    /// Convert weight expressions to kilograms, dropping invalid rows
    NormalizeWeight { column: String },
    /// Keep rows whose value is one of `allowed`
    AllowValues { column: String, allowed: Vec<String> },
    /// Keep rows whose value converts to a whole number
    RequireInteger { column: String },
    /// Remove columns if present
    DropColumns { columns: Vec<String> },
}

fn default_true() -> bool {
    true
}

impl ColumnRule {
    pub fn replace_text(column: &str, pattern: &str, replacement: &str) -> Self {
        ColumnRule::ReplaceText {
            column: column.to_string(),
            pattern: pattern.to_string(),
            replacement: replacement.to_string(),
        }
    }

    pub fn parse_dates(column: &str, drop_invalid: bool) -> Self {
        ColumnRule::ParseDates { column: column.to_string(), drop_invalid }
    }

    pub fn normalize_weight(column: &str) -> Self {
        ColumnRule::NormalizeWeight { column: column.to_string() }
    }

    pub fn allow_values(column: &str, allowed: &[&str]) -> Self {
        ColumnRule::AllowValues {
            column: column.to_string(),
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn require_integer(column: &str) -> Self {
        ColumnRule::RequireInteger { column: column.to_string() }
    }

    pub fn drop_columns(columns: &[&str]) -> Self {
        ColumnRule::DropColumns { columns: columns.iter().map(|s| s.to_string()).collect() }
    }

    /// Short label for logs
    pub fn label(&self) -> &'static str {
        match self {
            ColumnRule::ReplaceText { .. } => "replace_text",
            ColumnRule::ParseDates { .. } => "parse_dates",
            ColumnRule::NormalizeWeight { .. } => "normalize_weight",
            ColumnRule::AllowValues { .. } => "allow_values",
            ColumnRule::RequireInteger { .. } => "require_integer",
            ColumnRule::DropColumns { .. } => "drop_columns",
        }
    }

    /// Apply the rule in place, returning the number of rows dropped.
    pub fn apply(&self, set: &mut RecordSet) -> usize {
        match self {
            ColumnRule::ReplaceText { column, pattern, replacement } => {
                replace_text(set, column, pattern, replacement);
                0
            }
            ColumnRule::ParseDates { column, drop_invalid: true } => filter_dates(set, column),
            ColumnRule::ParseDates { column, drop_invalid: false } => {
                parse_dates(set, column);
                0
            }
            ColumnRule::NormalizeWeight { column } => clean_weights(set, column),
            ColumnRule::AllowValues { column, allowed } => filter_allowed(set, column, allowed),
            ColumnRule::RequireInteger { column } => filter_integers(set, column),
            ColumnRule::DropColumns { columns } => {
                let removed = drop_columns(set, columns);
                debug!("Dropped columns {:?}", removed);
                0
            }
        }
    }
}

/// A named, immutable list of column rules describing how to clean one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningProfile {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub rules: Vec<ColumnRule>,
}

impl CleaningProfile {
    pub fn new(name: &str, description: &str, rules: Vec<ColumnRule>) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            rules,
        }
    }

    /// Parse a profile from its TOML form, e.g.
    ///
    /// ```toml
    /// name = "orders_table"
    ///
    /// [[rules]]
    /// rule = "drop_columns"
    /// columns = ["first_name", "last_name", "1"]
    /// ```
    pub fn from_toml_str(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    /// Run every rule in order over `set`.
    pub fn apply(&self, mut set: RecordSet) -> RecordSet {
        let input_rows = set.len();
        for rule in &self.rules {
            let dropped = rule.apply(&mut set);
            if dropped > 0 {
                debug!(profile = %self.name, rule = rule.label(), dropped, "Rule dropped rows");
            }
        }
        info!(
            profile = %self.name,
            input_rows,
            output_rows = set.len(),
            "Cleaned record set"
        );
        set
    }
}

/// Clean a record set with the given profile.
pub fn clean(set: RecordSet, profile: &CleaningProfile) -> RecordSet {
    profile.apply(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    #[test]
    fn test_rules_apply_in_order() {
        let profile = CleaningProfile::new(
            "stores",
            "",
            vec![
                ColumnRule::replace_text("continent", "ee", ""),
                ColumnRule::allow_values("continent", &["America", "Europe"]),
                ColumnRule::drop_columns(&["lat"]),
            ],
        );
        let set = RecordSet::from_rows(
            vec!["continent".into(), "lat".into()],
            vec![
                vec![Cell::text("eeEurope"), Cell::Null],
                vec![Cell::text("Asia"), Cell::Null],
            ],
        );

        let cleaned = clean(set, &profile);

        assert_eq!(cleaned.len(), 1);
        assert_eq!(cleaned.columns(), &["continent"]);
        assert_eq!(cleaned.get(0, "continent"), Some(&Cell::text("Europe")));
    }

    #[test]
    fn test_profile_from_toml() {
        let profile = CleaningProfile::from_toml_str(
            r#"
            name = "custom"
            description = "from a file"

            [[rules]]
            rule = "replace_text"
            column = "continent"
            pattern = "ee"

            [[rules]]
            rule = "parse_dates"
            column = "opening_date"
            drop_invalid = false

            [[rules]]
            rule = "parse_dates"
            column = "join_date"

            [[rules]]
            rule = "drop_columns"
            columns = ["lat"]
            "#,
        )
        .unwrap();

        assert_eq!(profile.name, "custom");
        assert_eq!(
            profile.rules,
            vec![
                ColumnRule::replace_text("continent", "ee", ""),
                ColumnRule::parse_dates("opening_date", false),
                ColumnRule::parse_dates("join_date", true),
                ColumnRule::drop_columns(&["lat"]),
            ]
        );
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        let result = CleaningProfile::from_toml_str(
            r#"
            name = "bad"
            [[rules]]
            rule = "uppercase"
            column = "x"
            "#,
        );
        assert!(result.is_err());
    }
}
