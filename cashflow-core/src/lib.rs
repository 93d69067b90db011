//! Core of the cash flow analysis engine: input models, the calculators that
//! turn them into lender figures, the autosave state machine and the
//! storage-facing repository traits.

pub mod autosave;
pub mod calculations;
pub mod db;
pub mod models;

pub use calculations::{CashFlowAnalysis, DscrRating};
pub use db::{ApplicationRepository, RepositoryError};
pub use models::*;
