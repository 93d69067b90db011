//! Lending calculations for the cash flow analysis.
//!
//! Every consumer (report rendering, storage snapshots, the CLI) calls into
//! these modules; the formulas live nowhere else.

pub mod analysis;
pub mod common;
pub mod currency;
pub mod debt;
pub mod dscr;
pub mod loan;
pub mod year_summary;

pub use analysis::{AnalysisError, CashFlowAnalysis, PeriodAnalysis};
pub use debt::{aggregate_debts, prorate_annual};
pub use dscr::{DscrCalculator, DscrRating, MINIMUM_DSCR_THRESHOLD, STRONG_DSCR_THRESHOLD};
pub use loan::{LoanPaymentError, amortized_monthly_payment, annualized_loan_payment};
pub use year_summary::summarize_year;
