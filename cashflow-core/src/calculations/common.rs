//! Shared arithmetic helpers for the cash flow calculators.

use rust_decimal::{Decimal, RoundingStrategy};

/// Rounds a decimal value to exactly two decimal places, half away from zero.
///
/// Values at exactly 0.005 round away from zero. Only the display and report
/// boundary rounds; calculators keep full precision.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(6.16666)), dec!(6.17));
/// assert_eq!(round_half_up(dec!(1.245)), dec!(1.25));
/// assert_eq!(round_half_up(dec!(-1.245)), dec!(-1.25)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Divides `numerator` by `denominator`, returning `None` instead of dividing
/// by zero (or by a negative amount, which has no meaning for the ratios
/// computed here).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::calculations::common::positive_ratio;
///
/// assert_eq!(positive_ratio(dec!(5000), dec!(10000)), Some(dec!(0.5)));
/// assert_eq!(positive_ratio(dec!(5000), dec!(0)), None);
/// ```
pub fn positive_ratio(
    numerator: Decimal,
    denominator: Decimal,
) -> Option<Decimal> {
    if denominator <= Decimal::ZERO {
        return None;
    }
    numerator.checked_div(denominator)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(123.454));

        assert_eq!(result, dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(123.455));

        assert_eq!(result, dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-123.455));

        assert_eq!(result, dec!(-123.46));
    }

    #[test]
    fn round_half_up_handles_repeating_ratio() {
        let result = round_half_up(dec!(185000) / dec!(30000));

        assert_eq!(result, dec!(6.17));
    }

    #[test]
    fn round_half_up_handles_large_values() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }

    // =========================================================================
    // positive_ratio tests
    // =========================================================================

    #[test]
    fn positive_ratio_divides_when_denominator_positive() {
        assert_eq!(positive_ratio(dec!(3), dec!(4)), Some(dec!(0.75)));
    }

    #[test]
    fn positive_ratio_rejects_zero_denominator() {
        assert_eq!(positive_ratio(dec!(100), Decimal::ZERO), None);
    }

    #[test]
    fn positive_ratio_rejects_negative_denominator() {
        assert_eq!(positive_ratio(dec!(100), dec!(-5)), None);
    }

    #[test]
    fn positive_ratio_allows_negative_numerator() {
        assert_eq!(positive_ratio(dec!(-50), dec!(100)), Some(dec!(-0.5)));
    }
}
