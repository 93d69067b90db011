//! Lender-facing report for one application.
//!
//! The text form is a fixed-width summary meant for a terminal or a plain
//! text attachment. The JSON form carries the loan request plus the whole
//! [`CashFlowAnalysis`] so other tools can consume exact figures.

use std::fmt;

use cashflow_core::calculations::currency::{format_amount, format_percent, format_ratio, parse_amount};
use cashflow_core::calculations::{
    CashFlowAnalysis, DscrRating, MINIMUM_DSCR_THRESHOLD, STRONG_DSCR_THRESHOLD,
};
use cashflow_core::{CashFlowInput, LoanRequest, ReportingPeriod, YearFinancialSummary};
use rust_decimal::Decimal;
use serde::Serialize;

const LABEL_WIDTH: usize = 26;
const COLUMN_WIDTH: usize = 14;
const RULE_WIDTH: usize = 2 + LABEL_WIDTH + 3 * COLUMN_WIDTH;

type SummaryField = fn(&YearFinancialSummary) -> Decimal;

const INCOME_ROWS: [(&str, SummaryField); 13] = [
    ("Revenue", |s| s.revenue),
    ("Cost of goods sold", |s| s.cogs),
    ("Gross profit", |s| s.gross_profit),
    ("Operating expenses", |s| s.operating_expenses),
    ("Net income", |s| s.net_income),
    ("Depreciation", |s| s.depreciation),
    ("Amortization", |s| s.amortization),
    ("Interest", |s| s.interest),
    ("Taxes", |s| s.taxes),
    ("EBITDA", |s| s.ebitda),
    ("Non-recurring income", |s| s.non_recurring_income),
    ("Non-recurring expenses", |s| s.non_recurring_expenses),
    ("Adjusted EBITDA", |s| s.adjusted_ebitda),
];

/// Plain-text lender report. Render with `to_string()` or `{}`.
pub struct LenderReport<'a> {
    input: &'a CashFlowInput,
    analysis: &'a CashFlowAnalysis,
    base_year: i32,
}

impl<'a> LenderReport<'a> {
    pub fn new(
        input: &'a CashFlowInput,
        analysis: &'a CashFlowAnalysis,
        base_year: i32,
    ) -> Self {
        Self {
            input,
            analysis,
            base_year,
        }
    }

    fn period_headers(&self) -> [String; 3] {
        ReportingPeriod::ALL.map(|p| p.label(self.base_year))
    }

    fn period_values(
        &self,
        value: impl Fn(ReportingPeriod) -> String,
    ) -> [String; 3] {
        ReportingPeriod::ALL.map(value)
    }

    fn write_loan(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let loan = &self.input.loan;
        writeln!(f, "LOAN REQUEST")?;
        detail(f, "Business", or_not_given(&loan.business_name))?;
        detail(f, "Purpose", or_not_given(&loan.loan_purpose))?;
        detail(f, "Amount requested", &amount_or_not_given(&loan.desired_amount))?;

        let term = match loan.term_months.trim() {
            "" => "not given".to_string(),
            months => format!("{months} months"),
        };
        detail(f, "Term", &term)?;

        let rate = match loan.interest_rate.trim() {
            "" => "not given".to_string(),
            rate => format!("{}%", parse_amount(rate)),
        };
        detail(f, "Interest rate", &rate)?;

        let basis = if has_quoted_payment(loan) {
            "quoted"
        } else {
            "estimated"
        };
        detail(
            f,
            "Annual loan payment",
            &format!(
                "{} ({basis})",
                format_amount(self.analysis.annualized_loan_payment)
            ),
        )
    }

    fn write_income(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        header_row(f, "INCOME SUMMARY", &self.period_headers())?;
        for (label, field) in INCOME_ROWS {
            let values = self.period_values(|p| format_amount(field(&self.analysis.period(p).summary)));
            row(f, label, &values)?;
        }

        for period in ReportingPeriod::ALL {
            if self.input.financials.period(period).skipped {
                writeln!(
                    f,
                    "  {}: no financials provided; treated as zero.",
                    period.label(self.base_year)
                )?;
            }
        }
        let month = self.analysis.ytd_month;
        writeln!(
            f,
            "  Year-to-date figures cover {} month(s), January through {}.",
            month.get(),
            month.name()
        )
    }

    fn write_debts(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let debts = &self.analysis.debts;
        writeln!(f, "EXISTING DEBT")?;

        if debts.category_totals.is_empty() {
            writeln!(f, "  No existing debt reported.")?;
        } else {
            writeln!(
                f,
                "  {:<22}{:>7}{:>13}{:>13}{:>15}{:>13}",
                "Category", "Count", "Monthly", "Annual", "Original/Limit", "Balance"
            )?;
            for totals in &debts.category_totals {
                writeln!(
                    f,
                    "  {:<22}{:>7}{:>13}{:>13}{:>15}{:>13}",
                    totals.category.label(),
                    totals.entry_count,
                    format_amount(totals.monthly_payment),
                    format_amount(totals.annual_payment),
                    format_amount(totals.original_loan_amount),
                    format_amount(totals.outstanding_balance),
                )?;
            }
            writeln!(
                f,
                "  {:<22}{:>7}{:>13}{:>13}",
                "Total",
                "",
                format_amount(debts.monthly_debt_service),
                format_amount(debts.annual_debt_service),
            )?;
        }

        writeln!(f)?;
        detail(f, "Revolving balance", &format_amount(debts.total_credit_balance))?;
        detail(f, "Revolving credit limit", &format_amount(debts.total_credit_limit))?;
        detail(
            f,
            "Credit utilization",
            &format_percent(debts.credit_utilization_rate),
        )
    }

    fn write_dscr(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        header_row(f, "DEBT SERVICE COVERAGE", &self.period_headers())?;

        let dscr = |p: ReportingPeriod| self.analysis.period(p).dscr;
        row(
            f,
            "Adjusted EBITDA",
            &self.period_values(|p| format_amount(dscr(p).adjusted_ebitda)),
        )?;
        row(
            f,
            "Existing debt service",
            &self.period_values(|p| format_amount(dscr(p).annual_debt_service)),
        )?;
        row(
            f,
            "New loan payment",
            &self.period_values(|p| format_amount(dscr(p).annualized_loan_payment)),
        )?;
        row(
            f,
            "Total debt service",
            &self.period_values(|p| format_amount(dscr(p).total_debt_service)),
        )?;
        row(
            f,
            "DSCR",
            &self.period_values(|p| format_ratio(dscr(p).dscr)),
        )?;
        row(
            f,
            "Rating",
            &self.period_values(|p| self.analysis.period(p).rating.label().to_string()),
        )?;

        writeln!(f)?;
        for rating in self.ratings_shown() {
            writeln!(
                f,
                "  {}: {} ({}).",
                rating.label(),
                rating.description(),
                threshold_text(rating)
            )?;
        }
        Ok(())
    }

    /// Ratings that appear in the DSCR table, strongest first.
    fn ratings_shown(&self) -> Vec<DscrRating> {
        [
            DscrRating::Strong,
            DscrRating::Borderline,
            DscrRating::Insufficient,
            DscrRating::NotApplicable,
        ]
        .into_iter()
        .filter(|rating| self.analysis.periods.iter().any(|p| p.rating == *rating))
        .collect()
    }
}

impl fmt::Display for LenderReport<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "COMPREHENSIVE CASH FLOW ANALYSIS")?;
        writeln!(f, "{}", "=".repeat(RULE_WIDTH))?;
        writeln!(f)?;
        self.write_loan(f)?;
        writeln!(f)?;
        self.write_income(f)?;
        writeln!(f)?;
        self.write_debts(f)?;
        writeln!(f)?;
        self.write_dscr(f)
    }
}

fn has_quoted_payment(loan: &LoanRequest) -> bool {
    loan.annualized_payment_override
        .as_deref()
        .is_some_and(|s| !s.trim().is_empty())
}

fn or_not_given(text: &str) -> &str {
    match text.trim() {
        "" => "not given",
        trimmed => trimmed,
    }
}

fn amount_or_not_given(text: &str) -> String {
    if text.trim().is_empty() {
        "not given".to_string()
    } else {
        format_amount(parse_amount(text))
    }
}

fn threshold_text(rating: DscrRating) -> String {
    match rating {
        DscrRating::Strong => format!("DSCR of {STRONG_DSCR_THRESHOLD:.2} or higher"),
        DscrRating::Borderline => format!(
            "DSCR from {MINIMUM_DSCR_THRESHOLD:.2} up to {STRONG_DSCR_THRESHOLD:.2}"
        ),
        DscrRating::Insufficient => format!("DSCR below {MINIMUM_DSCR_THRESHOLD:.2}"),
        DscrRating::NotApplicable => "DSCR not computed".to_string(),
    }
}

fn detail(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    value: &str,
) -> fmt::Result {
    writeln!(f, "  {label:<LABEL_WIDTH$}{value}")
}

fn header_row(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    headers: &[String; 3],
) -> fmt::Result {
    writeln!(
        f,
        "{:<width$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}",
        title,
        headers[0],
        headers[1],
        headers[2],
        width = LABEL_WIDTH + 2
    )
}

fn row(
    f: &mut fmt::Formatter<'_>,
    label: &str,
    values: &[String; 3],
) -> fmt::Result {
    writeln!(
        f,
        "  {:<LABEL_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}{:>COLUMN_WIDTH$}",
        label, values[0], values[1], values[2]
    )
}

/// Machine-readable report.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonReport<'a> {
    pub loan: &'a LoanRequest,
    pub period_labels: [String; 3],
    pub analysis: &'a CashFlowAnalysis,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        input: &'a CashFlowInput,
        analysis: &'a CashFlowAnalysis,
        base_year: i32,
    ) -> Self {
        Self {
            loan: &input.loan,
            period_labels: ReportingPeriod::ALL.map(|p| p.label(base_year)),
            analysis,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use cashflow_core::{DebtCategory, DebtEntry, YearFinancialInput};
    use pretty_assertions::assert_eq;

    use super::*;

    fn sample_input() -> CashFlowInput {
        let mut input = CashFlowInput {
            loan: LoanRequest {
                business_name: "Riverside Bakery LLC".to_string(),
                desired_amount: "150000".to_string(),
                term_months: "120".to_string(),
                interest_rate: "7.5%".to_string(),
                annualized_payment_override: Some("12000".to_string()),
                ..LoanRequest::default()
            },
            ..CashFlowInput::default()
        };
        input.financials.prior_year.skipped = true;
        input.financials.current_year = YearFinancialInput {
            revenue: "500000".to_string(),
            cogs: "200000".to_string(),
            operating_expenses: "150000".to_string(),
            depreciation: "20000".to_string(),
            interest: "10000".to_string(),
            taxes: "5000".to_string(),
            ..YearFinancialInput::default()
        };
        input.financials.year_to_date.ytd_month = Some("06".to_string());
        input.debts = vec![
            DebtEntry {
                monthly_payment: "1000".to_string(),
                original_loan_amount: "200000".to_string(),
                outstanding_balance: "150000".to_string(),
                ..DebtEntry::new(DebtCategory::RealEstate)
            },
            DebtEntry {
                monthly_payment: "500".to_string(),
                original_loan_amount: "10000".to_string(),
                outstanding_balance: "5000".to_string(),
                ..DebtEntry::new(DebtCategory::CreditCard)
            },
        ];
        input
    }

    fn render(input: &CashFlowInput) -> String {
        let analysis = CashFlowAnalysis::from_input(input).unwrap();
        LenderReport::new(input, &analysis, 2023).to_string()
    }

    fn line_starting<'a>(
        report: &'a str,
        prefix: &str,
    ) -> &'a str {
        report
            .lines()
            .find(|l| l.starts_with(prefix))
            .unwrap_or_else(|| panic!("no line starting with {prefix:?} in:\n{report}"))
    }

    fn expected_row(
        label: &str,
        values: [&str; 3],
    ) -> String {
        format!(
            "  {:<26}{:>14}{:>14}{:>14}",
            label, values[0], values[1], values[2]
        )
    }

    #[test]
    fn dscr_rows_show_rounded_ratio_and_rating() {
        let report = render(&sample_input());

        assert_eq!(
            line_starting(&report, "  DSCR "),
            expected_row("DSCR", ["N/A", "6.17", "N/A"])
        );
        assert_eq!(
            line_starting(&report, "  Rating"),
            expected_row("Rating", ["N/A", "Strong", "N/A"])
        );
        assert_eq!(
            line_starting(&report, "  Total debt service"),
            expected_row("Total debt service", ["$18,000", "$30,000", "$15,000"])
        );
    }

    #[test]
    fn income_table_uses_period_labels() {
        let report = render(&sample_input());

        assert_eq!(
            line_starting(&report, "INCOME SUMMARY"),
            format!("{:<28}{:>14}{:>14}{:>14}", "INCOME SUMMARY", "2023", "2024", "2025 YTD")
        );
        assert_eq!(
            line_starting(&report, "  Adjusted EBITDA"),
            expected_row("Adjusted EBITDA", ["$0", "$185,000", "$0"])
        );
        assert!(report.contains("  2023: no financials provided; treated as zero."));
        assert!(report.contains("cover 6 month(s), January through June."));
    }

    #[test]
    fn loan_and_credit_details() {
        let report = render(&sample_input());

        assert!(line_starting(&report, "  Annual loan payment").ends_with("$12,000 (quoted)"));
        assert!(line_starting(&report, "  Interest rate").ends_with("7.5%"));
        assert!(line_starting(&report, "  Amount requested").ends_with("$150,000"));
        assert!(line_starting(&report, "  Credit utilization").ends_with("50.0%"));
        assert!(line_starting(&report, "  Real Estate").contains("$12,000"));
    }

    #[test]
    fn legend_lists_only_ratings_present() {
        let report = render(&sample_input());

        assert!(report.contains("  Strong: cash flow comfortably covers debt service (DSCR of 1.25 or higher)."));
        assert!(report.contains("  N/A: "));
        assert!(!report.contains("  Borderline: "));
        assert!(!report.contains("  Insufficient: "));
    }

    #[test]
    fn empty_application_renders_without_debts() {
        let report = render(&CashFlowInput::default());

        assert!(report.contains("  No existing debt reported."));
        assert!(line_starting(&report, "  Credit utilization").ends_with("N/A"));
        assert!(line_starting(&report, "  Business").ends_with("not given"));
        assert!(line_starting(&report, "  Annual loan payment").ends_with("$0 (estimated)"));
    }

    #[test]
    fn json_report_carries_exact_figures() {
        let input = sample_input();
        let analysis = CashFlowAnalysis::from_input(&input).unwrap();

        let json = JsonReport::new(&input, &analysis, 2023).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["loan"]["businessName"], "Riverside Bakery LLC");
        assert_eq!(value["periodLabels"][2], "2025 YTD");
        assert_eq!(value["analysis"]["debts"]["annualDebtService"], "18000");
        assert_eq!(value["analysis"]["periods"][1]["rating"], "strong");
    }
}
