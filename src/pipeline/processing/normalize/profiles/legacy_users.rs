use crate::constants::USERS_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Users from the legacy relational table: multi-line addresses are flattened
/// and users without a usable join date are dropped.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        USERS_PROFILE,
        "Flatten addresses and require a valid join date",
        vec![
            ColumnRule::replace_text("address", "\n", " "),
            ColumnRule::parse_dates("join_date", true),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::clean;
    use crate::types::{Cell, RecordSet};
    use serde_json::json;

    #[test]
    fn test_users_profile() {
        let raw = RecordSet::from_json_records(&[
            json!({"index": 0, "first_name": "Sigfried", "address": "340 Noack Road\nWest Tiago", "join_date": "2009-08-15"}),
            json!({"index": 1, "first_name": "NULL", "address": "NULL", "join_date": "NULL"}),
            json!({"index": 2, "first_name": "Guy", "address": "Studio 22\nGraham Bridge", "join_date": "February 2013 06"}),
        ]);

        let cleaned = clean(raw, &profile());

        assert_eq!(cleaned.len(), 2);
        assert_eq!(cleaned.get(0, "address"), Some(&Cell::text("340 Noack Road West Tiago")));
        assert_eq!(cleaned.get(1, "join_date"), Some(&Cell::text("2013-02-06")));
        assert_eq!(cleaned.get(1, "index"), Some(&Cell::Int(2)));
    }
}
