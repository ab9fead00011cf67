use crate::constants::STORES_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Countries stores operate in are grouped into these continents
pub const STORE_CONTINENTS: &[&str] = &["America", "Europe"];

/// Stores from the REST API. Continent labels come with a stray `ee` prefix
/// that is removed before the allow-list check. Opening dates are normalized
/// but rows without one are kept.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        STORES_PROFILE,
        "Repair continent labels, keep known continents, normalize opening dates",
        vec![
            ColumnRule::replace_text("continent", "ee", ""),
            ColumnRule::allow_values("continent", STORE_CONTINENTS),
            ColumnRule::parse_dates("opening_date", false),
            ColumnRule::drop_columns(&["lat"]),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::clean;
    use crate::types::Cell;
    use crate::types::RecordSet;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_stores_profile() {
        let raw = RecordSet::from_json_records(&[
            json!({"index": 0, "store_code": "WEB-1388012W", "lat": null, "opening_date": "2010-06-12", "continent": "Europe"}),
            json!({"index": 1, "store_code": "HI-9B97EE4E", "lat": null, "opening_date": "October 2012 08", "continent": "eeAmerica"}),
            json!({"index": 2, "store_code": "NULL", "lat": null, "opening_date": "NULL", "continent": "NULL"}),
            json!({"index": 3, "store_code": "CH-5A553B3A", "lat": "13KJZ890JH", "opening_date": "OYVW925ZL8", "continent": "eeEurope"}),
        ]);

        let cleaned = clean(raw, &profile());

        assert_eq!(cleaned.len(), 3);
        assert!(!cleaned.has_column("lat"));
        assert_eq!(
            cleaned.column_values("continent"),
            vec![Cell::text("Europe"), Cell::text("America"), Cell::text("Europe")]
        );
        assert_eq!(
            cleaned.get(1, "opening_date"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2012, 10, 8).unwrap()))
        );
        // Unparseable opening dates survive as the sentinel
        assert_eq!(cleaned.get(2, "opening_date"), Some(&Cell::NoDate));
    }
}
