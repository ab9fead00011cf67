// Built-in cleaning profiles, one per source table
pub mod card_details;
pub mod date_times;
pub mod legacy_users;
pub mod orders;
pub mod products;
pub mod store_details;

use super::CleaningProfile;

/// Every built-in profile, in load order.
pub fn builtin_profiles() -> Vec<CleaningProfile> {
    vec![
        legacy_users::profile(),
        card_details::profile(),
        store_details::profile(),
        products::profile(),
        orders::profile(),
        date_times::profile(),
    ]
}
