use crate::constants::DATE_TIMES_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Sale timestamps. Corrupted rows hold placeholder text in every field, and
/// `month` reliably shows it, so it is the only column checked.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        DATE_TIMES_PROFILE,
        "Keep rows whose month is a whole number",
        vec![ColumnRule::require_integer("month")],
    )
}
