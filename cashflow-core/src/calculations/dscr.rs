//! Debt Service Coverage Ratio.
//!
//! DSCR = Adjusted EBITDA / total debt service, where total debt service is
//! existing obligations plus the requested loan's payment for the period.
//!
//! | Period | Existing debt service | New loan payment |
//! |--------|-----------------------|------------------|
//! | Prior year | annual | none (loan did not exist) |
//! | Current year | annual | full annualized payment |
//! | Year to date | annual × month / 12 | annualized × month / 12 |
//!
//! The ratio is left undefined (`None`) when total debt service or Adjusted
//! EBITDA is zero or negative: a lender should see "N/A", not an infinite or
//! negative coverage figure.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::positive_ratio;
use crate::{DscrYearResult, ReportingPeriod};

/// Coverage at or above this is considered strong.
pub const STRONG_DSCR_THRESHOLD: Decimal = dec!(1.25);

/// Coverage below this means earnings do not cover debt service.
pub const MINIMUM_DSCR_THRESHOLD: Decimal = dec!(1.00);

/// Lender's reading of a DSCR value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DscrRating {
    /// `dscr ≥ 1.25`
    Strong,
    /// `1.00 ≤ dscr < 1.25`
    Borderline,
    /// `dscr < 1.00`
    Insufficient,
    /// The ratio could not be computed.
    NotApplicable,
}

impl DscrRating {
    /// Classifies a full-precision ratio.
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use cashflow_core::calculations::DscrRating;
    ///
    /// assert_eq!(DscrRating::classify(Some(dec!(1.25))), DscrRating::Strong);
    /// assert_eq!(DscrRating::classify(Some(dec!(1.2499))), DscrRating::Borderline);
    /// assert_eq!(DscrRating::classify(Some(dec!(0.99))), DscrRating::Insufficient);
    /// assert_eq!(DscrRating::classify(None), DscrRating::NotApplicable);
    /// ```
    pub fn classify(dscr: Option<Decimal>) -> Self {
        match dscr {
            Some(ratio) if ratio >= STRONG_DSCR_THRESHOLD => Self::Strong,
            Some(ratio) if ratio >= MINIMUM_DSCR_THRESHOLD => Self::Borderline,
            Some(_) => Self::Insufficient,
            None => Self::NotApplicable,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Strong => "Strong",
            Self::Borderline => "Borderline",
            Self::Insufficient => "Insufficient",
            Self::NotApplicable => "N/A",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Strong => "cash flow comfortably covers debt service",
            Self::Borderline => "cash flow covers debt service with little margin",
            Self::Insufficient => "cash flow does not cover debt service",
            Self::NotApplicable => "no positive earnings or no debt service to cover",
        }
    }
}

impl fmt::Display for DscrRating {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Computes the DSCR for one reporting period.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::ReportingPeriod;
/// use cashflow_core::calculations::DscrCalculator;
///
/// let result = DscrCalculator::calculate(
///     ReportingPeriod::CurrentYear,
///     dec!(185000),
///     dec!(18000),
///     dec!(12000),
/// );
///
/// assert_eq!(result.total_debt_service, dec!(30000));
/// assert_eq!(result.dscr, Some(dec!(185000) / dec!(30000)));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct DscrCalculator;

impl DscrCalculator {
    pub fn calculate(
        period: ReportingPeriod,
        adjusted_ebitda: Decimal,
        existing_annual_debt_service: Decimal,
        annualized_loan_payment: Decimal,
    ) -> DscrYearResult {
        let total_debt_service = existing_annual_debt_service + annualized_loan_payment;
        let dscr = Self::ratio(period, adjusted_ebitda, total_debt_service);

        DscrYearResult {
            period,
            adjusted_ebitda,
            annual_debt_service: existing_annual_debt_service,
            annualized_loan_payment,
            total_debt_service,
            dscr,
        }
    }

    fn ratio(
        period: ReportingPeriod,
        adjusted_ebitda: Decimal,
        total_debt_service: Decimal,
    ) -> Option<Decimal> {
        if total_debt_service <= Decimal::ZERO {
            debug!(?period, "no debt service for period; DSCR not computed");
            return None;
        }
        if adjusted_ebitda <= Decimal::ZERO {
            warn!(
                ?period,
                adjusted_ebitda = %adjusted_ebitda,
                "adjusted EBITDA is zero or negative; DSCR not computed"
            );
            return None;
        }

        positive_ratio(adjusted_ebitda, total_debt_service)
    }
}
