use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reporting period's financials as typed by the applicant.
///
/// Every amount is free text; empty or missing fields count as zero. The
/// text is kept verbatim so the form can be re-rendered exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct YearFinancialInput {
    pub revenue: String,
    pub cogs: String,
    #[serde(alias = "operating_expenses")]
    pub operating_expenses: String,
    #[serde(alias = "non_recurring_income")]
    pub non_recurring_income: String,
    #[serde(alias = "non_recurring_expenses")]
    pub non_recurring_expenses: String,
    pub depreciation: String,
    pub amortization: String,
    pub interest: String,
    pub taxes: String,

    /// Months covered by a year-to-date period (`"01"`–`"12"` or a month
    /// name). Ignored for completed years.
    #[serde(alias = "ytd_month", skip_serializing_if = "Option::is_none")]
    pub ytd_month: Option<String>,

    /// Set when the applicant has no data for this year. A skipped year is
    /// summarized as all zeros.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub skipped: bool,
}

/// Derived figures for one reporting period. Never edited directly; always
/// recomputed from a [`YearFinancialInput`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YearFinancialSummary {
    pub revenue: Decimal,
    pub cogs: Decimal,
    pub gross_profit: Decimal,
    pub operating_expenses: Decimal,
    pub net_income: Decimal,
    pub depreciation: Decimal,
    pub amortization: Decimal,
    pub interest: Decimal,
    pub taxes: Decimal,
    pub ebitda: Decimal,
    pub non_recurring_income: Decimal,
    pub non_recurring_expenses: Decimal,
    pub adjusted_ebitda: Decimal,
}

/// Financial inputs for all three reporting periods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FinancialsInput {
    #[serde(alias = "prior_year")]
    pub prior_year: YearFinancialInput,
    #[serde(alias = "current_year")]
    pub current_year: YearFinancialInput,
    #[serde(alias = "year_to_date")]
    pub year_to_date: YearFinancialInput,
}

impl FinancialsInput {
    pub fn period(
        &self,
        period: super::ReportingPeriod,
    ) -> &YearFinancialInput {
        match period {
            super::ReportingPeriod::PriorYear => &self.prior_year,
            super::ReportingPeriod::CurrentYear => &self.current_year,
            super::ReportingPeriod::YearToDate => &self.year_to_date,
        }
    }
}
