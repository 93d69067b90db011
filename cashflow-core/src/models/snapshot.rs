//! Shapes of the JSON blobs stored with a loan application.
//!
//! Writes always go through [`ApplicationSnapshot::build`], which recomputes
//! every derived figure from the raw input. Reads go through
//! [`StoredFinancials`] and [`StoredDebts`], which keep only the raw input
//! and discard whatever summaries a previous write cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    CashFlowInput, CategoryTotals, DebtEntry, FinancialsInput, ReportingPeriod,
    YearFinancialInput, YearFinancialSummary,
};
use crate::calculations::{AnalysisError, CashFlowAnalysis};

/// One value per reporting period, keyed the way the stored JSON keys them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValues<T> {
    #[serde(rename = "year2023")]
    pub prior_year: T,
    #[serde(rename = "year2024")]
    pub current_year: T,
    #[serde(rename = "year2025YTD")]
    pub year_to_date: T,
}

impl<T> PeriodValues<T> {
    pub fn from_fn(mut f: impl FnMut(ReportingPeriod) -> T) -> Self {
        Self {
            prior_year: f(ReportingPeriod::PriorYear),
            current_year: f(ReportingPeriod::CurrentYear),
            year_to_date: f(ReportingPeriod::YearToDate),
        }
    }

    pub fn get(
        &self,
        period: ReportingPeriod,
    ) -> &T {
        match period {
            ReportingPeriod::PriorYear => &self.prior_year,
            ReportingPeriod::CurrentYear => &self.current_year,
            ReportingPeriod::YearToDate => &self.year_to_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearSnapshot {
    pub input: YearFinancialInput,
    pub summary: YearFinancialSummary,
}

pub type FinancialsSnapshot = PeriodValues<YearSnapshot>;

pub type DscrSnapshot = PeriodValues<Option<Decimal>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtsSnapshot {
    pub entries: Vec<DebtEntry>,
    pub monthly_debt_service: Decimal,
    pub annual_debt_service: Decimal,
    pub total_credit_balance: Decimal,
    pub total_credit_limit: Decimal,
    pub credit_utilization_rate: Option<Decimal>,
    pub category_totals: Vec<CategoryTotals>,
    pub total_debt_service: PeriodValues<Decimal>,
    pub annualized_loan_payments: PeriodValues<Decimal>,
}

/// The three blobs written alongside an application's loan scalars.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationSnapshot {
    pub financials: FinancialsSnapshot,
    pub debts: DebtsSnapshot,
    pub dscr: DscrSnapshot,
}

impl ApplicationSnapshot {
    /// Recomputes every derived figure from `input` and packages the result
    /// for storage.
    pub fn build(input: &CashFlowInput) -> Result<(Self, CashFlowAnalysis), AnalysisError> {
        let analysis = CashFlowAnalysis::from_input(input)?;
        Ok((Self::from_analysis(input, &analysis), analysis))
    }

    fn from_analysis(
        input: &CashFlowInput,
        analysis: &CashFlowAnalysis,
    ) -> Self {
        let financials = PeriodValues::from_fn(|period| YearSnapshot {
            input: input.financials.period(period).clone(),
            summary: analysis.period(period).summary,
        });
        let debts = DebtsSnapshot {
            entries: input.debts.clone(),
            monthly_debt_service: analysis.debts.monthly_debt_service,
            annual_debt_service: analysis.debts.annual_debt_service,
            total_credit_balance: analysis.debts.total_credit_balance,
            total_credit_limit: analysis.debts.total_credit_limit,
            credit_utilization_rate: analysis.debts.credit_utilization_rate,
            category_totals: analysis.debts.category_totals.clone(),
            total_debt_service: PeriodValues::from_fn(|period| {
                analysis.period(period).dscr.total_debt_service
            }),
            annualized_loan_payments: PeriodValues::from_fn(|period| {
                analysis.period(period).dscr.annualized_loan_payment
            }),
        };
        let dscr = PeriodValues::from_fn(|period| analysis.period(period).dscr.dscr);

        Self {
            financials,
            debts,
            dscr,
        }
    }
}

/// Read-side view of the `financials` blob: inputs only.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StoredFinancials {
    #[serde(rename = "year2023", default)]
    prior_year: StoredYear,
    #[serde(rename = "year2024", default)]
    current_year: StoredYear,
    #[serde(rename = "year2025YTD", default)]
    year_to_date: StoredYear,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StoredYear {
    #[serde(default)]
    input: YearFinancialInput,
}

impl StoredFinancials {
    pub fn into_input(self) -> FinancialsInput {
        FinancialsInput {
            prior_year: self.prior_year.input,
            current_year: self.current_year.input,
            year_to_date: self.year_to_date.input,
        }
    }
}

/// Read-side view of the `debts` blob.
///
/// Older records stored a bare array; newer ones wrap it as
/// `{ "entries": [...], ... }`. Both normalize to a plain list here and
/// nothing past this point sees the difference.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StoredDebts {
    Entries(Vec<DebtEntry>),
    Wrapped {
        #[serde(default)]
        entries: Vec<DebtEntry>,
    },
}

impl StoredDebts {
    pub fn into_entries(self) -> Vec<DebtEntry> {
        match self {
            Self::Entries(entries) | Self::Wrapped { entries } => entries,
        }
    }
}
