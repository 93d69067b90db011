//! Command implementations shared by the `cashflow` binary and its tests.

use anyhow::{Context, Result, bail};
use cashflow_core::autosave::{AutosaveTracker, DEFAULT_DEBOUNCE};
use cashflow_core::calculations::CashFlowAnalysis;
use cashflow_core::calculations::currency::{format_optional_amount, format_ratio};
use cashflow_core::db::{ApplicationRepository, RepositoryRegistry};
use cashflow_core::{
    ApplicationListing, ApplicationStatus, CashFlowInput, NewLoanApplication, ReportingPeriod,
};
use cashflow_db_sqlite::SqliteRepositoryFactory;
use chrono::Utc;
use clap::ValueEnum;
use tracing::{debug, info};

use crate::report::{JsonReport, LenderReport};

/// Build the registry with every backend compiled into this binary.
pub fn build_registry() -> RepositoryRegistry {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    registry
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

pub fn analyze(input: &CashFlowInput) -> Result<CashFlowAnalysis> {
    let analysis =
        CashFlowAnalysis::from_input(input).context("Failed to analyze application")?;
    let current = analysis.period(ReportingPeriod::CurrentYear);
    debug!(
        business = %input.loan.business_name,
        current_year_dscr = %format_ratio(current.dscr.dscr),
        rating = %current.rating,
        "analysis complete"
    );
    Ok(analysis)
}

/// Analyze `input` and render it in `format`.
pub fn render(
    input: &CashFlowInput,
    format: OutputFormat,
    base_year: i32,
) -> Result<String> {
    let analysis = analyze(input)?;
    match format {
        OutputFormat::Text => Ok(LenderReport::new(input, &analysis, base_year).to_string()),
        OutputFormat::Json => JsonReport::new(input, &analysis, base_year)
            .to_json()
            .context("Failed to serialize report"),
    }
}

/// What a save did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(i64),
    Updated(i64),
    /// The stored application already held exactly this input and status.
    Unchanged(i64),
}

impl SaveOutcome {
    pub fn id(&self) -> i64 {
        match *self {
            Self::Created(id) | Self::Updated(id) | Self::Unchanged(id) => id,
        }
    }
}

fn fingerprint(
    input: &CashFlowInput,
    status: ApplicationStatus,
) -> Result<String> {
    let payload = serde_json::to_string(input).context("Failed to serialize application")?;
    Ok(format!("{}:{}", status.as_str(), payload))
}

/// Create a new application, or update `id` in place.
///
/// An update goes through the autosave tracker, resumed from the stored
/// record, so writing back an identical draft is skipped.
pub async fn save(
    repo: &dyn ApplicationRepository,
    input: CashFlowInput,
    id: Option<i64>,
    status: ApplicationStatus,
) -> Result<SaveOutcome> {
    let Some(id) = id else {
        let created = repo
            .create_application(NewLoanApplication { status, input })
            .await
            .context("Failed to create application")?;
        info!(id = created.id, status = status.as_str(), "application created");
        return Ok(SaveOutcome::Created(created.id));
    };

    let mut application = repo
        .get_application(id)
        .await
        .with_context(|| format!("Failed to load application {id}"))?;

    let mut tracker = AutosaveTracker::resume(
        DEFAULT_DEBOUNCE,
        fingerprint(&application.input, application.status)?,
        application.updated_at,
    );
    tracker.record_change(fingerprint(&input, status)?, Utc::now());

    let Some(ticket) = tracker.flush() else {
        debug!(id, "application unchanged; skipping write");
        return Ok(SaveOutcome::Unchanged(id));
    };

    application.input = input;
    application.status = status;
    let result = repo.update_application(&application).await;
    tracker.complete(
        &ticket,
        result.as_ref().map(|_| ()).map_err(|e| e.to_string()),
        Utc::now(),
    );
    result.with_context(|| format!("Failed to update application {id}"))?;

    info!(id, status = status.as_str(), "application updated");
    Ok(SaveOutcome::Updated(id))
}

/// Load a stored application and render it.
pub async fn show(
    repo: &dyn ApplicationRepository,
    id: i64,
    format: OutputFormat,
    base_year: i32,
) -> Result<String> {
    let application = repo
        .get_application(id)
        .await
        .with_context(|| format!("Failed to load application {id}"))?;
    render(&application.input, format, base_year)
}

pub async fn list(
    repo: &dyn ApplicationRepository,
    status: Option<ApplicationStatus>,
) -> Result<Vec<ApplicationListing>> {
    repo.list_applications(status)
        .await
        .context("Failed to list applications")
}

pub async fn delete(
    repo: &dyn ApplicationRepository,
    id: i64,
) -> Result<()> {
    repo.delete_application(id)
        .await
        .with_context(|| format!("Failed to delete application {id}"))?;
    info!(id, "application deleted");
    Ok(())
}

/// Parse a `--status` value.
pub fn parse_status(s: &str) -> Result<ApplicationStatus> {
    match ApplicationStatus::parse(s) {
        Some(status) => Ok(status),
        None => bail!("unknown status '{s}' (expected 'draft' or 'submitted')"),
    }
}

/// One line per listing, newest first.
pub fn format_listings(listings: &[ApplicationListing]) -> String {
    if listings.is_empty() {
        return "No saved applications.\n".to_string();
    }

    let mut out = format!(
        "{:>5}  {:<10}  {:<30}  {:>14}  {:>14}  {:>6}  {}\n",
        "ID", "STATUS", "BUSINESS", "REQUESTED", "LOAN PAYMENT", "DSCR", "UPDATED"
    );
    for listing in listings {
        out.push_str(&format!(
            "{:>5}  {:<10}  {:<30}  {:>14}  {:>14}  {:>6}  {}\n",
            listing.id,
            listing.status.as_str(),
            truncate(&listing.business_name, 30),
            listing.desired_amount.trim(),
            format_optional_amount(listing.annualized_loan_payment),
            format_ratio(listing.current_year_dscr),
            listing.updated_at.format("%Y-%m-%d %H:%M"),
        ));
    }
    out
}

fn truncate(
    text: &str,
    max_chars: usize,
) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let kept: String = text.chars().take(max_chars - 3).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use cashflow_core::db::DbConfig;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn memory_repo() -> Box<dyn ApplicationRepository> {
        build_registry()
            .open(&DbConfig::default())
            .await
            .expect("in-memory repository")
    }

    fn sample_input() -> CashFlowInput {
        let mut input = CashFlowInput::default();
        input.loan.business_name = "Riverside Bakery LLC".to_string();
        input.loan.annualized_payment_override = Some("12000".to_string());
        input.financials.current_year.revenue = "100000".to_string();
        input
    }

    #[test]
    fn registry_offers_sqlite() {
        assert_eq!(build_registry().backend_names(), vec!["sqlite"]);
    }

    #[tokio::test]
    async fn save_without_id_creates() {
        let repo = memory_repo().await;

        let outcome = save(&*repo, sample_input(), None, ApplicationStatus::Draft)
            .await
            .unwrap();

        assert!(matches!(outcome, SaveOutcome::Created(id) if id > 0));
    }

    #[tokio::test]
    async fn saving_identical_draft_is_skipped() {
        let repo = memory_repo().await;
        let id = save(&*repo, sample_input(), None, ApplicationStatus::Draft)
            .await
            .unwrap()
            .id();
        let before = repo.get_application(id).await.unwrap();

        let outcome = save(&*repo, sample_input(), Some(id), ApplicationStatus::Draft)
            .await
            .unwrap();

        assert_eq!(outcome, SaveOutcome::Unchanged(id));
        assert_eq!(repo.get_application(id).await.unwrap().updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn changed_input_or_status_is_written() {
        let repo = memory_repo().await;
        let id = save(&*repo, sample_input(), None, ApplicationStatus::Draft)
            .await
            .unwrap()
            .id();

        let mut changed = sample_input();
        changed.financials.current_year.revenue = "150000".to_string();
        let edited = save(&*repo, changed.clone(), Some(id), ApplicationStatus::Draft)
            .await
            .unwrap();
        let submitted = save(&*repo, changed, Some(id), ApplicationStatus::Submitted)
            .await
            .unwrap();

        assert_eq!(edited, SaveOutcome::Updated(id));
        assert_eq!(submitted, SaveOutcome::Updated(id));
        let stored = repo.get_application(id).await.unwrap();
        assert_eq!(stored.status, ApplicationStatus::Submitted);
        assert_eq!(stored.input.financials.current_year.revenue, "150000");
    }

    #[tokio::test]
    async fn save_to_unknown_id_fails() {
        let repo = memory_repo().await;

        let result = save(&*repo, sample_input(), Some(404), ApplicationStatus::Draft).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn list_and_delete() {
        let repo = memory_repo().await;
        let id = save(&*repo, sample_input(), None, ApplicationStatus::Draft)
            .await
            .unwrap()
            .id();

        let listings = list(&*repo, None).await.unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].annualized_loan_payment, Some(dec!(12000)));

        delete(&*repo, id).await.unwrap();
        assert!(list(&*repo, None).await.unwrap().is_empty());
        assert!(delete(&*repo, id).await.is_err());
    }

    #[tokio::test]
    async fn show_renders_stored_application() {
        let repo = memory_repo().await;
        let id = save(&*repo, sample_input(), None, ApplicationStatus::Draft)
            .await
            .unwrap()
            .id();

        let text = show(&*repo, id, OutputFormat::Text, 2023).await.unwrap();

        assert!(text.contains("Riverside Bakery LLC"));
        assert!(text.contains("$12,000 (quoted)"));
    }

    #[test]
    fn parse_status_accepts_known_values() {
        assert_eq!(parse_status("Submitted").unwrap(), ApplicationStatus::Submitted);
        assert!(parse_status("approved").is_err());
    }

    #[test]
    fn empty_listing_message() {
        assert_eq!(format_listings(&[]), "No saved applications.\n");
    }

    #[test]
    fn long_business_names_are_truncated() {
        assert_eq!(truncate("Short", 30), "Short");
        assert_eq!(truncate("A Very Long Business Name Incorporated", 10), "A Very ...");
    }
}
