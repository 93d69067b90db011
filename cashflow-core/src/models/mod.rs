mod application;
mod debt;
mod dscr;
mod financials;
mod loan_request;
mod period;
mod snapshot;

pub use application::{
    ApplicationListing, ApplicationStatus, CashFlowInput, LoanApplication, NewLoanApplication,
};
pub use debt::{
    CategoryTotals, DebtCategory, DebtEntry, DebtSummary, MAX_ENTRIES_PER_CATEGORY,
    category_is_full,
};
pub use dscr::DscrYearResult;
pub use financials::{FinancialsInput, YearFinancialInput, YearFinancialSummary};
pub use loan_request::LoanRequest;
pub use period::{ReportingPeriod, YtdMonth};
pub use snapshot::{
    ApplicationSnapshot, DebtsSnapshot, DscrSnapshot, FinancialsSnapshot, PeriodValues,
    StoredDebts, StoredFinancials, YearSnapshot,
};
