use crate::constants::ORDERS_PROFILE;
use crate::pipeline::processing::normalize::{CleaningProfile, ColumnRule};

/// Orders keep every row; personal and empty columns are removed.
pub fn profile() -> CleaningProfile {
    CleaningProfile::new(
        ORDERS_PROFILE,
        "Drop personal and empty columns",
        vec![ColumnRule::drop_columns(&["first_name", "last_name", "1"])],
    )
}
