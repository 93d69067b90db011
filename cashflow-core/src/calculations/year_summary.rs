//! Year financial summary: from raw income-statement fields to Adjusted EBITDA.
//!
//! # Computation order
//!
//! | Step | Figure | Formula |
//! |------|--------|---------|
//! | 1    | all fields | free text → [`parse_amount`] |
//! | 2    | Gross profit | revenue − COGS |
//! | 3    | Net income | gross profit − operating expenses |
//! | 4    | EBITDA | net income + depreciation + amortization + interest + taxes |
//! | 5    | Adjusted EBITDA | EBITDA − non-recurring income + non-recurring expenses |
//!
//! Nothing is clamped at zero. A loss-making year produces negative figures
//! and they flow through to the DSCR calculation as-is.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use cashflow_core::YearFinancialInput;
//! use cashflow_core::calculations::summarize_year;
//!
//! let input = YearFinancialInput {
//!     revenue: "500,000".into(),
//!     cogs: "200000".into(),
//!     operating_expenses: "150000".into(),
//!     depreciation: "20000".into(),
//!     interest: "10000".into(),
//!     taxes: "5000".into(),
//!     ..Default::default()
//! };
//!
//! let summary = summarize_year(&input);
//!
//! assert_eq!(summary.gross_profit, dec!(300000));
//! assert_eq!(summary.net_income, dec!(150000));
//! assert_eq!(summary.ebitda, dec!(185000));
//! assert_eq!(summary.adjusted_ebitda, dec!(185000));
//! ```

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::currency::parse_amount;
use crate::{YearFinancialInput, YearFinancialSummary};

/// Computes the derived summary for one reporting period.
///
/// A year marked `skipped` is summarized exactly like an all-empty year.
pub fn summarize_year(input: &YearFinancialInput) -> YearFinancialSummary {
    if input.skipped {
        debug!("year skipped by applicant; summarizing as zeros");
        return summarize_year(&YearFinancialInput::default());
    }

    let revenue = parse_amount(&input.revenue);
    let cogs = parse_amount(&input.cogs);
    let operating_expenses = parse_amount(&input.operating_expenses);
    let depreciation = parse_amount(&input.depreciation);
    let amortization = parse_amount(&input.amortization);
    let interest = parse_amount(&input.interest);
    let taxes = parse_amount(&input.taxes);
    let non_recurring_income = parse_amount(&input.non_recurring_income);
    let non_recurring_expenses = parse_amount(&input.non_recurring_expenses);

    let gross_profit = revenue - cogs;
    let net_income = gross_profit - operating_expenses;
    let ebitda = ebitda(net_income, depreciation, amortization, interest, taxes);
    let adjusted_ebitda = adjusted_ebitda(ebitda, non_recurring_income, non_recurring_expenses);

    debug!(
        revenue = %revenue,
        gross_profit = %gross_profit,
        net_income = %net_income,
        ebitda = %ebitda,
        adjusted_ebitda = %adjusted_ebitda,
        "summarized year"
    );

    YearFinancialSummary {
        revenue,
        cogs,
        gross_profit,
        operating_expenses,
        net_income,
        depreciation,
        amortization,
        interest,
        taxes,
        ebitda,
        non_recurring_income,
        non_recurring_expenses,
        adjusted_ebitda,
    }
}

/// Adds non-cash and financing charges back to net income.
fn ebitda(
    net_income: Decimal,
    depreciation: Decimal,
    amortization: Decimal,
    interest: Decimal,
    taxes: Decimal,
) -> Decimal {
    net_income + depreciation + amortization + interest + taxes
}

/// Removes one-time items so the figure reflects sustainable earnings.
fn adjusted_ebitda(
    ebitda: Decimal,
    non_recurring_income: Decimal,
    non_recurring_expenses: Decimal,
) -> Decimal {
    ebitda - non_recurring_income + non_recurring_expenses
}
