//! Full cash flow analysis across the three reporting periods.
//!
//! This is the one place the per-period figures are tied together; the
//! report, the storage snapshot and the CLI all go through
//! [`CashFlowAnalysis::from_input`] rather than re-deriving any formula.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::calculations::debt::{aggregate_debts, prorate_annual};
use crate::calculations::dscr::{DscrCalculator, DscrRating};
use crate::calculations::loan::{LoanPaymentError, annualized_loan_payment};
use crate::calculations::year_summary::summarize_year;
use crate::{
    CashFlowInput, DebtSummary, DscrYearResult, ReportingPeriod, YearFinancialInput,
    YearFinancialSummary, YtdMonth,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("cannot compute new loan payment: {0}")]
    LoanPayment(#[from] LoanPaymentError),
}

/// Figures for a single reporting period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAnalysis {
    pub period: ReportingPeriod,
    pub summary: YearFinancialSummary,
    pub dscr: DscrYearResult,
    pub rating: DscrRating,
}

/// Derived view of an application. Always rebuilt from [`CashFlowInput`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashFlowAnalysis {
    pub ytd_month: YtdMonth,
    /// Full-year payment on the requested loan.
    pub annualized_loan_payment: Decimal,
    pub debts: DebtSummary,
    /// Prior year, current year, year to date, in that order.
    pub periods: [PeriodAnalysis; 3],
}

impl CashFlowAnalysis {
    /// Runs every calculator over the applicant's inputs.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::LoanPayment`] when the requested loan's terms
    /// cannot be amortized (negative rate, unsupported term). Malformed
    /// amounts never produce errors.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use cashflow_core::{CashFlowInput, ReportingPeriod};
    /// use cashflow_core::calculations::CashFlowAnalysis;
    ///
    /// let analysis = CashFlowAnalysis::from_input(&CashFlowInput::default()).unwrap();
    ///
    /// let ytd = analysis.period(ReportingPeriod::YearToDate);
    /// assert_eq!(ytd.summary.adjusted_ebitda, dec!(0));
    /// assert_eq!(ytd.dscr.dscr, None);
    /// ```
    pub fn from_input(input: &CashFlowInput) -> Result<Self, AnalysisError> {
        let ytd_month = resolve_ytd_month(&input.financials.year_to_date);
        let annualized_loan_payment = annualized_loan_payment(&input.loan)?;
        let debts = aggregate_debts(&input.debts);

        let periods = ReportingPeriod::ALL.map(|period| {
            let summary = summarize_year(input.financials.period(period));
            let (existing, new_loan) = debt_service_for(
                period,
                debts.annual_debt_service,
                annualized_loan_payment,
                ytd_month,
            );
            let dscr = DscrCalculator::calculate(period, summary.adjusted_ebitda, existing, new_loan);
            PeriodAnalysis {
                period,
                summary,
                rating: DscrRating::classify(dscr.dscr),
                dscr,
            }
        });

        info!(
            business = %input.loan.business_name,
            debts = input.debts.len(),
            annualized_loan_payment = %annualized_loan_payment,
            ytd_month = %ytd_month,
            "cash flow analysis complete"
        );

        Ok(Self {
            ytd_month,
            annualized_loan_payment,
            debts,
            periods,
        })
    }

    pub fn period(
        &self,
        period: ReportingPeriod,
    ) -> &PeriodAnalysis {
        match period {
            ReportingPeriod::PriorYear => &self.periods[0],
            ReportingPeriod::CurrentYear => &self.periods[1],
            ReportingPeriod::YearToDate => &self.periods[2],
        }
    }
}

/// Splits a period's debt service into (existing obligations, new loan).
///
/// The requested loan did not exist in the prior year; the year-to-date
/// period only carries `month / 12` of either figure.
fn debt_service_for(
    period: ReportingPeriod,
    existing_annual: Decimal,
    loan_annual: Decimal,
    ytd_month: YtdMonth,
) -> (Decimal, Decimal) {
    match period {
        ReportingPeriod::PriorYear => (existing_annual, Decimal::ZERO),
        ReportingPeriod::CurrentYear => (existing_annual, loan_annual),
        ReportingPeriod::YearToDate => (
            prorate_annual(existing_annual, ytd_month),
            prorate_annual(loan_annual, ytd_month),
        ),
    }
}

/// Months covered by the year-to-date period. Missing or unreadable values
/// fall back to a full year, which applies no proration.
fn resolve_ytd_month(input: &YearFinancialInput) -> YtdMonth {
    match input.ytd_month.as_deref() {
        Some(raw) => YtdMonth::parse(raw).unwrap_or_else(|| {
            warn!(ytd_month = %raw, "unrecognized year-to-date month; assuming a full year");
            YtdMonth::FULL_YEAR
        }),
        None => YtdMonth::FULL_YEAR,
    }
}
