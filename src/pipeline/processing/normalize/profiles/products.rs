use crate::constants::PRODUCTS_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Products from object storage. Weights are converted to kilograms and
/// invalid weights drop the row; `date_added` is normalized without filtering.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        PRODUCTS_PROFILE,
        "Convert weights to kilograms and normalize the date added",
        vec![
            ColumnRule::normalize_weight("weight"),
            ColumnRule::parse_dates("date_added", false),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::clean;
    use crate::types::{Cell, RecordSet};
    use chrono::NaiveDate;

    #[test]
    fn test_products_profile() {
        let raw = RecordSet::from_rows(
            vec!["product_name".into(), "weight".into(), "date_added".into()],
            vec![
                vec![Cell::text("FurReal Dazzlin' Dimples"), Cell::text("1.6kg"), Cell::text("2005-12-02")],
                vec![Cell::text("Tiffany Yellow"), Cell::text("2 x 500g"), Cell::text("2006-01-31")],
                vec![Cell::text("Corrupted"), Cell::text("9SX4G65YUX"), Cell::text("2018-10-22")],
                vec![Cell::text("Coffee"), Cell::text("16oz"), Cell::text("not a date")],
            ],
        );

        let cleaned = clean(raw, &profile());

        assert_eq!(cleaned.len(), 3);
        assert_eq!(
            cleaned.column_values("weight"),
            vec![Cell::Float(1.6), Cell::Float(1.0), Cell::Float(0.454)]
        );
        assert_eq!(
            cleaned.get(0, "date_added"),
            Some(&Cell::Date(NaiveDate::from_ymd_opt(2005, 12, 2).unwrap()))
        );
        assert_eq!(cleaned.get(2, "date_added"), Some(&Cell::NoDate));
    }
}
