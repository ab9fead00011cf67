//! Per-source cleaning of raw record sets.
//!
//! A [`CleaningProfile`] binds [`ColumnRule`]s to columns; the generic passes in
//! [`dates`], [`weights`] and [`filters`] implement each rule. Every pass is a
//! single, order-preserving scan and never fails: bad values either drop their
//! row or become the no-date sentinel.

pub mod dates;
pub mod filters;
pub mod profile;
pub mod profiles;
pub mod registry;
pub mod weights;

pub use dates::{filter_dates, normalize_date, parse_date, parse_dates};
pub use filters::{drop_columns, filter_allowed, filter_integers, is_integer, replace_text};
pub use profile::{clean, CleaningProfile, ColumnRule};
pub use registry::ProfileRegistry;
pub use weights::{clean_weights, normalize_weight};
