//! End-to-end: fixture files -> analysis -> rendered report.

use std::path::{Path, PathBuf};

use cashflow_cli::app::{self, OutputFormat};
use cashflow_cli::input;
use cashflow_core::calculations::DscrRating;
use cashflow_core::calculations::currency::format_ratio;
use cashflow_core::{CashFlowInput, ReportingPeriod};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn fixture_path(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn fixture_input() -> CashFlowInput {
    input::load_application(
        &fixture_path("sample_application.toml"),
        Some(&fixture_path("sample_debts.csv")),
    )
    .expect("fixtures should load")
}

#[test]
fn fixture_analysis_matches_hand_computed_figures() {
    let analysis = app::analyze(&fixture_input()).unwrap();

    let prior = analysis.period(ReportingPeriod::PriorYear);
    assert_eq!(prior.summary.adjusted_ebitda, dec!(0));
    assert_eq!(prior.dscr.total_debt_service, dec!(18000));
    assert_eq!(prior.rating, DscrRating::NotApplicable);

    let current = analysis.period(ReportingPeriod::CurrentYear);
    assert_eq!(current.summary.gross_profit, dec!(300000));
    assert_eq!(current.summary.net_income, dec!(150000));
    assert_eq!(current.summary.adjusted_ebitda, dec!(185000));
    assert_eq!(current.dscr.total_debt_service, dec!(30000));
    assert_eq!(format_ratio(current.dscr.dscr), "6.17");
    assert_eq!(current.rating, DscrRating::Strong);

    // 260000 - 104000 - 78000 + 17500 - 4000 + 1500
    let ytd = analysis.period(ReportingPeriod::YearToDate);
    assert_eq!(ytd.summary.adjusted_ebitda, dec!(93000));
    assert_eq!(ytd.dscr.annual_debt_service, dec!(9000));
    assert_eq!(ytd.dscr.annualized_loan_payment, dec!(6000));
    assert_eq!(format_ratio(ytd.dscr.dscr), "6.20");

    assert_eq!(analysis.debts.credit_utilization_rate, Some(dec!(0.5)));
}

#[test]
fn text_report_for_fixture() {
    let report = app::render(&fixture_input(), OutputFormat::Text, 2023).unwrap();

    assert!(report.starts_with("COMPREHENSIVE CASH FLOW ANALYSIS\n"));
    assert!(report.contains("Riverside Bakery LLC"));
    assert!(report.contains("$12,000 (quoted)"));
    assert!(report.contains("2025 YTD"));
    assert!(report.contains("50.0%"));
    assert!(report.contains("6.17"));
    assert!(report.contains("6.20"));
}

#[test]
fn json_report_for_fixture() {
    let json = app::render(&fixture_input(), OutputFormat::Json, 2023).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["periodLabels"][0], "2023");
    assert_eq!(value["analysis"]["ytdMonth"], 6);
    let ytd_total: Decimal = value["analysis"]["periods"][2]["dscr"]["totalDebtService"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .expect("decimal string");
    assert_eq!(ytd_total, dec!(15000));
}
