//! Site Safety Library
//!
//! Record keeping for a work site: hazard logging with map placement, patrol
//! rosters and incident logs, and an equipment custody ledger with low-stock
//! alerts. Every listing can be exported as CSV or as a paginated PDF report.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod attachments;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod migrator;
pub mod notifications;
pub mod reports;
pub mod services;

pub use errors::{AppError, ServiceError};
pub use services::AppServices;
