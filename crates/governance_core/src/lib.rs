//! Vote aggregation and display-state derivation for a single governance
//! proposal page.
//!
//! The core (`tally`, `metrics`, `timefmt`, `description`, `eligibility`)
//! is pure and total. `db`, `dump` and `config` are the fallible adapters
//! around it.

pub mod config;
pub mod db;
pub mod description;
pub mod dump;
pub mod eligibility;
pub mod error;
pub mod identity;
pub mod metrics;
pub mod page;
pub mod render;
pub mod schema;
pub mod source;
pub mod tally;
pub mod timefmt;
pub mod view;

pub use error::{Error, Result};
