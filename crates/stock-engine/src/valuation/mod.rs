//! Intrinsic value estimation

pub mod dcf;

pub use dcf::{DcfParameters, DcfValuation, MAX_YEARS, ProjectedYear, TERMINAL_SPREAD_PCT, dcf_value};
