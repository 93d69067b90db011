//! Debt aggregation: existing obligations → monthly/annual debt service and
//! revolving-credit utilization.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::positive_ratio;
use crate::calculations::currency::parse_amount;
use crate::{CategoryTotals, DebtCategory, DebtEntry, DebtSummary, YtdMonth};

const MONTHS_PER_YEAR: i64 = 12;

/// Aggregates the applicant's existing debts.
///
/// Monthly debt service covers every category. Credit balance and limit only
/// include revolving categories ([`DebtCategory::is_revolving`]); the
/// `original_loan_amount` of a revolving entry is its credit limit.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::{DebtCategory, DebtEntry};
/// use cashflow_core::calculations::aggregate_debts;
///
/// let card = DebtEntry {
///     monthly_payment: "500".into(),
///     outstanding_balance: "5000".into(),
///     original_loan_amount: "10000".into(),
///     ..DebtEntry::new(DebtCategory::CreditCard)
/// };
///
/// let summary = aggregate_debts(&[card]);
///
/// assert_eq!(summary.annual_debt_service, dec!(6000));
/// assert_eq!(summary.credit_utilization_rate, Some(dec!(0.5)));
/// ```
pub fn aggregate_debts(entries: &[DebtEntry]) -> DebtSummary {
    let mut by_category: BTreeMap<DebtCategory, CategoryTotals> = BTreeMap::new();
    let mut monthly_debt_service = Decimal::ZERO;
    let mut total_credit_balance = Decimal::ZERO;
    let mut total_credit_limit = Decimal::ZERO;

    for entry in entries {
        let monthly_payment = parse_amount(&entry.monthly_payment);
        let original_loan_amount = parse_amount(&entry.original_loan_amount);
        let outstanding_balance = parse_amount(&entry.outstanding_balance);

        monthly_debt_service += monthly_payment;

        if entry.category.is_revolving() {
            total_credit_balance += outstanding_balance;
            total_credit_limit += original_loan_amount;
        }

        let totals = by_category
            .entry(entry.category)
            .or_insert_with(|| empty_totals(entry.category));
        totals.entry_count += 1;
        totals.monthly_payment += monthly_payment;
        totals.original_loan_amount += original_loan_amount;
        totals.outstanding_balance += outstanding_balance;
    }

    let category_totals: Vec<CategoryTotals> = by_category
        .into_values()
        .map(|mut totals| {
            totals.annual_payment = annualize(totals.monthly_payment);
            totals
        })
        .collect();

    let credit_utilization_rate = positive_ratio(total_credit_balance, total_credit_limit);
    if credit_utilization_rate.is_none() && total_credit_balance > Decimal::ZERO {
        debug!(
            balance = %total_credit_balance,
            "revolving balance reported without a credit limit; utilization undefined"
        );
    }

    DebtSummary {
        monthly_debt_service,
        annual_debt_service: annualize(monthly_debt_service),
        category_totals,
        total_credit_balance,
        total_credit_limit,
        credit_utilization_rate,
    }
}

/// Scales a full-year amount down to the months covered by a year-to-date
/// period: `annual × month / 12`.
///
/// ```
/// use rust_decimal_macros::dec;
/// use cashflow_core::YtdMonth;
/// use cashflow_core::calculations::prorate_annual;
///
/// let june = YtdMonth::new(6).unwrap();
/// assert_eq!(prorate_annual(dec!(18000), june), dec!(9000));
/// ```
pub fn prorate_annual(
    annual: Decimal,
    month: YtdMonth,
) -> Decimal {
    annual * Decimal::from(month.get()) / Decimal::from(MONTHS_PER_YEAR)
}

fn annualize(monthly: Decimal) -> Decimal {
    monthly * Decimal::from(MONTHS_PER_YEAR)
}

fn empty_totals(category: DebtCategory) -> CategoryTotals {
    CategoryTotals {
        category,
        entry_count: 0,
        monthly_payment: Decimal::ZERO,
        annual_payment: Decimal::ZERO,
        original_loan_amount: Decimal::ZERO,
        outstanding_balance: Decimal::ZERO,
    }
}
