//! Payment on the requested loan.
//!
//! The monthly payment uses the standard level-payment amortization formula
//!
//! ```text
//! payment = P · r · (1 + r)^n / ((1 + r)^n − 1)
//! ```
//!
//! with `r` the monthly rate (annual percent / 100 / 12) and `n` the term in
//! months. The annualized payment is twelve monthly payments unless the
//! lender quoted one explicitly.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use thiserror::Error;
use tracing::{debug, warn};

use crate::LoanRequest;
use crate::calculations::currency::{MAX_AMOUNT, parse_amount, parse_whole_amount};

/// Errors that can occur while computing a loan payment.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LoanPaymentError {
    /// The interest rate is negative.
    #[error("interest rate must not be negative, got {0}")]
    NegativeRate(Decimal),

    /// The term is too long to compute a payment for.
    #[error("loan term of {0} months exceeds the supported maximum of {MAX_TERM_MONTHS}")]
    TermTooLong(u32),

    /// Compounding overflowed decimal precision, or the payment is larger
    /// than any amount field may hold.
    #[error("payment calculation overflowed for rate {rate}% over {term_months} months")]
    Overflow { rate: Decimal, term_months: u32 },
}

/// Longest supported term (50 years).
pub const MAX_TERM_MONTHS: u32 = 600;

/// Computes the level monthly payment for an amortizing loan.
///
/// A zero principal or zero term needs no payment; a zero rate spreads the
/// principal evenly over the term.
///
/// # Errors
///
/// Returns [`LoanPaymentError`] when the rate is negative, the term exceeds
/// [`MAX_TERM_MONTHS`], or compounding overflows.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::amortized_monthly_payment;
/// use cashflow_core::calculations::common::round_half_up;
///
/// // $100,000 at 6% over 10 years
/// let payment = amortized_monthly_payment(dec!(100000), dec!(6), 120).unwrap();
///
/// assert_eq!(round_half_up(payment), dec!(1110.21));
/// ```
pub fn amortized_monthly_payment(
    principal: Decimal,
    annual_rate_percent: Decimal,
    term_months: u32,
) -> Result<Decimal, LoanPaymentError> {
    if annual_rate_percent < Decimal::ZERO {
        return Err(LoanPaymentError::NegativeRate(annual_rate_percent));
    }
    if term_months > MAX_TERM_MONTHS {
        return Err(LoanPaymentError::TermTooLong(term_months));
    }
    if principal <= Decimal::ZERO || term_months == 0 {
        return Ok(Decimal::ZERO);
    }

    let n = Decimal::from(term_months);
    if annual_rate_percent.is_zero() {
        return Ok(principal / n);
    }

    let overflow = || LoanPaymentError::Overflow {
        rate: annual_rate_percent,
        term_months,
    };

    let monthly_rate = annual_rate_percent / Decimal::ONE_HUNDRED / Decimal::from(12);
    let growth = compound(Decimal::ONE + monthly_rate, term_months).ok_or_else(overflow)?;
    let numerator = principal
        .checked_mul(monthly_rate)
        .and_then(|v| v.checked_mul(growth))
        .ok_or_else(overflow)?;
    numerator
        .checked_div(growth - Decimal::ONE)
        .ok_or_else(overflow)
}

/// Annual payment attributable to the requested loan.
///
/// A non-empty `annualized_payment_override` wins; otherwise the amortized
/// monthly payment is multiplied by twelve.
pub fn annualized_loan_payment(loan: &LoanRequest) -> Result<Decimal, LoanPaymentError> {
    if let Some(quoted) = loan
        .annualized_payment_override
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    {
        let annual = parse_amount(quoted);
        debug!(annual = %annual, "using quoted annual loan payment");
        return Ok(annual);
    }

    let principal = parse_amount(&loan.desired_amount);
    let rate = parse_amount(&loan.interest_rate);
    let term_months = term_months(&loan.term_months)?;

    let monthly = amortized_monthly_payment(principal, rate, term_months)?;
    if principal > Decimal::ZERO && monthly.is_zero() {
        warn!(
            principal = %principal,
            term = %loan.term_months,
            "loan amount given without a term; new loan payment treated as zero"
        );
    }

    monthly
        .checked_mul(Decimal::from(12))
        .filter(|annual| *annual <= MAX_AMOUNT)
        .ok_or(LoanPaymentError::Overflow {
            rate,
            term_months,
        })
}

fn term_months(text: &str) -> Result<u32, LoanPaymentError> {
    parse_whole_amount(text)
        .to_u32()
        .ok_or(LoanPaymentError::TermTooLong(u32::MAX))
}

/// `base^exponent` by repeated squaring with overflow checks.
fn compound(
    base: Decimal,
    exponent: u32,
) -> Option<Decimal> {
    let mut result = Decimal::ONE;
    let mut factor = base;
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(factor)?;
        }
        remaining >>= 1;
        if remaining > 0 {
            factor = factor.checked_mul(factor)?;
        }
    }
    Some(result)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::calculations::common::round_half_up;

    fn request(
        amount: &str,
        term: &str,
        rate: &str,
    ) -> LoanRequest {
        LoanRequest {
            desired_amount: amount.into(),
            term_months: term.into(),
            interest_rate: rate.into(),
            ..Default::default()
        }
    }

    #[test]
    fn standard_ten_year_loan() {
        let payment = amortized_monthly_payment(dec!(100000), dec!(6), 120).unwrap();

        assert_eq!(round_half_up(payment), dec!(1110.21));
    }

    #[test]
    fn zero_rate_spreads_principal_evenly() {
        let payment = amortized_monthly_payment(dec!(12000), dec!(0), 24).unwrap();

        assert_eq!(payment, dec!(500));
    }

    #[test]
    fn zero_term_or_principal_needs_no_payment() {
        assert_eq!(amortized_monthly_payment(dec!(50000), dec!(7), 0), Ok(Decimal::ZERO));
        assert_eq!(amortized_monthly_payment(dec!(0), dec!(7), 60), Ok(Decimal::ZERO));
    }

    #[test]
    fn rejects_negative_rate() {
        let result = amortized_monthly_payment(dec!(50000), dec!(-1), 60);

        assert_eq!(result, Err(LoanPaymentError::NegativeRate(dec!(-1))));
    }

    #[test]
    fn rejects_excessive_term() {
        let result = amortized_monthly_payment(dec!(50000), dec!(5), 601);

        assert_eq!(result, Err(LoanPaymentError::TermTooLong(601)));
    }

    #[test]
    fn compound_matches_repeated_multiplication() {
        let base = dec!(1.005);
        let mut expected = Decimal::ONE;
        for _ in 0..7 {
            expected *= base;
        }

        assert_eq!(compound(base, 7), Some(expected));
        assert_eq!(compound(base, 0), Some(Decimal::ONE));
    }

    #[test]
    fn annualized_payment_is_twelve_monthly_payments() {
        let loan = request("$100,000", "120", "6%");

        let annual = annualized_loan_payment(&loan).unwrap();

        let monthly = amortized_monthly_payment(dec!(100000), dec!(6), 120).unwrap();
        assert_eq!(annual, monthly * dec!(12));
    }

    #[test]
    fn quoted_payment_overrides_amortization() {
        let loan = LoanRequest {
            annualized_payment_override: Some("12,000".into()),
            ..request("100000", "120", "6")
        };

        assert_eq!(annualized_loan_payment(&loan), Ok(dec!(12000)));
    }

    #[test]
    fn blank_override_is_ignored() {
        let loan = LoanRequest {
            annualized_payment_override: Some("  ".into()),
            ..request("12000", "12", "0")
        };

        assert_eq!(annualized_loan_payment(&loan), Ok(dec!(12000)));
    }

    #[test]
    fn payment_beyond_amount_limit_is_an_error() {
        let loan = request("1000000000000000000", "1", "12");

        assert_eq!(
            annualized_loan_payment(&loan),
            Err(LoanPaymentError::Overflow {
                rate: dec!(12),
                term_months: 1,
            })
        );
    }

    #[test]
    fn empty_request_has_no_payment() {
        assert_eq!(annualized_loan_payment(&LoanRequest::default()), Ok(Decimal::ZERO));
    }
}
