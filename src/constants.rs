/// Profile and table name constants to ensure consistency across the codebase.
///
/// Profile names follow the source table they clean; destination names are the
/// tables written into the local store.

// Cleaning profile names (also the source table / object they describe)
pub const USERS_PROFILE: &str = "legacy_users";
pub const CARDS_PROFILE: &str = "card_details";
pub const STORES_PROFILE: &str = "store_details";
pub const PRODUCTS_PROFILE: &str = "products";
pub const ORDERS_PROFILE: &str = "orders_table";
pub const DATE_TIMES_PROFILE: &str = "date_times";

// Source tables in the remote relational database
pub const USERS_SOURCE_TABLE: &str = "legacy_users";
pub const ORDERS_SOURCE_TABLE: &str = "orders_table";

// Destination tables in the local store
pub const USERS_TABLE: &str = "dim_users";
pub const CARDS_TABLE: &str = "dim_card_details";
pub const STORES_TABLE: &str = "dim_store_details";
pub const PRODUCTS_TABLE: &str = "dim_products";
pub const ORDERS_TABLE: &str = "orders_table";
pub const DATE_TIMES_TABLE: &str = "dim_date_times";

/// Field in the store-count endpoint response holding the number of stores
pub const STORE_COUNT_FIELD: &str = "number_stores";
