use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ReportingPeriod;

/// Debt service coverage for one reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DscrYearResult {
    pub period: ReportingPeriod,
    pub adjusted_ebitda: Decimal,
    /// Existing obligations, prorated for the year-to-date period.
    pub annual_debt_service: Decimal,
    /// Requested loan's payment attributable to this period.
    pub annualized_loan_payment: Decimal,
    pub total_debt_service: Decimal,
    /// Full-precision ratio; `None` when it would be infinite, negative or
    /// otherwise misleading.
    pub dscr: Option<Decimal>,
}
