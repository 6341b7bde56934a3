//! Shared utilities

pub mod datetime;

pub use datetime::DateTime;
