use crate::constants::CARDS_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Card details extracted from the PDF document. The merged
/// `card_number expiry_date` column and the spreadsheet index are artifacts of
/// the extraction and carry no data.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        CARDS_PROFILE,
        "Require a valid payment confirmation date and drop extraction artifacts",
        vec![
            ColumnRule::parse_dates("date_payment_confirmed", true),
            ColumnRule::drop_columns(&["card_number expiry_date", "Unnamed: 0"]),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::processing::normalize::clean;
    use crate::types::{Cell, RecordSet};

    #[test]
    fn test_cards_profile() {
        let raw = RecordSet::from_rows(
            vec![
                "card_number".into(),
                "expiry_date".into(),
                "card_provider".into(),
                "date_payment_confirmed".into(),
                "card_number expiry_date".into(),
            ],
            vec![
                vec![
                    Cell::text("30060773296197"),
                    Cell::text("09/26"),
                    Cell::text("Diners Club / Carte Blanche"),
                    Cell::text("2015-11-25"),
                    Cell::Null,
                ],
                vec![
                    Cell::text("NULL"),
                    Cell::text("NULL"),
                    Cell::text("NULL"),
                    Cell::text("NULL"),
                    Cell::Null,
                ],
                vec![
                    Cell::text("4252720361802860591"),
                    Cell::text("10/23"),
                    Cell::text("VISA 19 digit"),
                    Cell::text("December 2021 17"),
                    Cell::Null,
                ],
            ],
        );

        let cleaned = clean(raw, &profile());

        assert_eq!(cleaned.len(), 2);
        assert!(!cleaned.has_column("card_number expiry_date"));
        assert_eq!(
            cleaned.column_values("date_payment_confirmed"),
            vec![Cell::text("2015-11-25"), Cell::text("2021-12-17")]
        );
    }
}
