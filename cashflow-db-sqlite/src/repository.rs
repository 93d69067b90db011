use async_trait::async_trait;
use cashflow_core::{
    ApplicationListing, ApplicationRepository, ApplicationSnapshot, ApplicationStatus,
    CashFlowInput, FinancialsInput, LoanApplication, LoanRequest, NewLoanApplication,
    RepositoryError, ReportingPeriod, StoredDebts, StoredFinancials,
};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::{debug, warn};

use crate::decimal::{decimal_to_text, get_optional_decimal};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Connect using a sqlx-style URL (`sqlite:path?mode=rwc`,
    /// `sqlite::memory:`).
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let mut options = SqlitePoolOptions::new();
        if database_url.contains(":memory:") {
            // Each pooled connection would otherwise open its own empty database.
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options
            .connect(database_url)
            .await
            .map_err(|e| RepositoryError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(e.to_string()))?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Column values derived from an application's input at write time.
struct EncodedSnapshot {
    financials: String,
    debts: String,
    dscr: String,
    annualized_loan_payment: String,
    current_year_dscr: Option<String>,
}

impl EncodedSnapshot {
    fn from_input(input: &CashFlowInput) -> Result<Self, RepositoryError> {
        let (snapshot, analysis) = ApplicationSnapshot::build(input)
            .map_err(|e| RepositoryError::InvalidApplication(e.to_string()))?;

        Ok(Self {
            financials: to_json(&snapshot.financials)?,
            debts: to_json(&snapshot.debts)?,
            dscr: to_json(&snapshot.dscr)?,
            annualized_loan_payment: decimal_to_text(analysis.annualized_loan_payment),
            current_year_dscr: analysis
                .period(ReportingPeriod::CurrentYear)
                .dscr
                .dscr
                .map(decimal_to_text),
        })
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|e| RepositoryError::Serialization(e.to_string()))
}

fn db_err(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn get_column<'r, T>(
    row: &'r SqliteRow,
    column: &str,
) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("Failed to get {}: {}", column, e)))
}

fn get_status(row: &SqliteRow) -> Result<ApplicationStatus, RepositoryError> {
    let raw: String = get_column(row, "status")?;
    ApplicationStatus::parse(&raw)
        .ok_or_else(|| RepositoryError::Database(format!("Invalid status: {}", raw)))
}

/// Rebuild an application from its raw inputs. Summaries, totals and ratios
/// cached in the row are ignored; callers recompute them.
fn row_to_application(row: &SqliteRow) -> Result<LoanApplication, RepositoryError> {
    let id: i64 = get_column(row, "id")?;

    let financials_json: String = get_column(row, "financials")?;
    let financials: FinancialsInput = serde_json::from_str::<StoredFinancials>(&financials_json)
        .map_err(|e| {
            RepositoryError::Serialization(format!("financials for application {}: {}", id, e))
        })?
        .into_input();

    let debts_json: String = get_column(row, "debts")?;
    let debts = serde_json::from_str::<StoredDebts>(&debts_json)
        .map_err(|e| {
            RepositoryError::Serialization(format!("debts for application {}: {}", id, e))
        })?
        .into_entries();

    let loan = LoanRequest {
        business_name: get_column(row, "business_name")?,
        loan_purpose: get_column(row, "loan_purpose")?,
        desired_amount: get_column(row, "desired_amount")?,
        term_months: get_column(row, "term_months")?,
        interest_rate: get_column(row, "interest_rate")?,
        annualized_payment_override: get_column(row, "annualized_payment_override")?,
    };

    Ok(LoanApplication {
        id,
        status: get_status(row)?,
        input: CashFlowInput {
            loan,
            financials,
            debts,
        },
        created_at: get_column::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get_column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_listing(row: &SqliteRow) -> Result<ApplicationListing, RepositoryError> {
    Ok(ApplicationListing {
        id: get_column(row, "id")?,
        business_name: get_column(row, "business_name")?,
        desired_amount: get_column(row, "desired_amount")?,
        status: get_status(row)?,
        annualized_loan_payment: get_optional_decimal(row, "annualized_loan_payment")?,
        current_year_dscr: get_optional_decimal(row, "current_year_dscr")?,
        updated_at: get_column::<DateTime<Utc>>(row, "updated_at")?,
    })
}

#[async_trait]
impl ApplicationRepository for SqliteRepository {
    async fn create_application(
        &self,
        application: NewLoanApplication,
    ) -> Result<LoanApplication, RepositoryError> {
        let encoded = EncodedSnapshot::from_input(&application.input)?;
        let loan = &application.input.loan;
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO loan_applications (
                business_name, loan_purpose, desired_amount, term_months,
                interest_rate, annualized_payment_override, status,
                financials, debts, dscr,
                annualized_loan_payment, current_year_dscr,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&loan.business_name)
        .bind(&loan.loan_purpose)
        .bind(&loan.desired_amount)
        .bind(&loan.term_months)
        .bind(&loan.interest_rate)
        .bind(&loan.annualized_payment_override)
        .bind(application.status.as_str())
        .bind(&encoded.financials)
        .bind(&encoded.debts)
        .bind(&encoded.dscr)
        .bind(&encoded.annualized_loan_payment)
        .bind(&encoded.current_year_dscr)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        let id = result.last_insert_rowid();
        debug!(id, status = application.status.as_str(), "created loan application");
        self.get_application(id).await
    }

    async fn get_application(
        &self,
        id: i64,
    ) -> Result<LoanApplication, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, business_name, loan_purpose, desired_amount, term_months,
                    interest_rate, annualized_payment_override, status,
                    financials, debts, created_at, updated_at
             FROM loan_applications WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or(RepositoryError::NotFound)?;

        row_to_application(&row)
    }

    async fn update_application(
        &self,
        application: &LoanApplication,
    ) -> Result<(), RepositoryError> {
        let encoded = EncodedSnapshot::from_input(&application.input)?;
        let loan = &application.input.loan;
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE loan_applications SET
                business_name = ?, loan_purpose = ?, desired_amount = ?,
                term_months = ?, interest_rate = ?, annualized_payment_override = ?,
                status = ?, financials = ?, debts = ?, dscr = ?,
                annualized_loan_payment = ?, current_year_dscr = ?,
                updated_at = ?
             WHERE id = ?",
        )
        .bind(&loan.business_name)
        .bind(&loan.loan_purpose)
        .bind(&loan.desired_amount)
        .bind(&loan.term_months)
        .bind(&loan.interest_rate)
        .bind(&loan.annualized_payment_override)
        .bind(application.status.as_str())
        .bind(&encoded.financials)
        .bind(&encoded.debts)
        .bind(&encoded.dscr)
        .bind(&encoded.annualized_loan_payment)
        .bind(&encoded.current_year_dscr)
        .bind(now)
        .bind(application.id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            warn!(id = application.id, "update of unknown loan application");
            return Err(RepositoryError::NotFound);
        }

        debug!(id = application.id, "updated loan application");
        Ok(())
    }

    async fn delete_application(
        &self,
        id: i64,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM loan_applications WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<ApplicationListing>, RepositoryError> {
        const BASE_QUERY: &str =
            "SELECT id, business_name, desired_amount, status,
                    annualized_loan_payment, current_year_dscr, updated_at
             FROM loan_applications";

        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "{} WHERE status = ? ORDER BY updated_at DESC, id DESC",
                    BASE_QUERY
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!("{} ORDER BY updated_at DESC, id DESC", BASE_QUERY))
                    .fetch_all(&self.pool)
                    .await
            }
        }
        .map_err(db_err)?;

        rows.iter().map(row_to_listing).collect()
    }
}

#[cfg(test)]
mod tests {
    use cashflow_core::calculations::currency::format_ratio;
    use cashflow_core::{DebtCategory, DebtEntry, YearFinancialInput};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    async fn setup_test_db() -> SqliteRepository {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");

        let repo = SqliteRepository::new_with_pool(pool).await;
        repo.run_migrations()
            .await
            .expect("Failed to run migrations");
        repo
    }

    fn debt(
        category: DebtCategory,
        monthly: &str,
        original: &str,
        balance: &str,
    ) -> DebtEntry {
        DebtEntry {
            monthly_payment: monthly.to_string(),
            original_loan_amount: original.to_string(),
            outstanding_balance: balance.to_string(),
            ..DebtEntry::new(category)
        }
    }

    /// Current year adjusted EBITDA 185,000 against 18,000 existing service
    /// and a 12,000 quoted loan payment.
    fn create_test_input() -> CashFlowInput {
        let mut input = CashFlowInput {
            loan: LoanRequest {
                business_name: "Riverside Bakery LLC".to_string(),
                loan_purpose: "Second oven".to_string(),
                desired_amount: "$150,000".to_string(),
                term_months: "120".to_string(),
                interest_rate: "7.5".to_string(),
                annualized_payment_override: Some("12000".to_string()),
            },
            ..CashFlowInput::default()
        };
        input.financials.current_year = YearFinancialInput {
            revenue: "500000".to_string(),
            cogs: "200000".to_string(),
            operating_expenses: "150000".to_string(),
            depreciation: "20000".to_string(),
            interest: "10000".to_string(),
            taxes: "5000".to_string(),
            ..YearFinancialInput::default()
        };
        input.debts = vec![
            debt(DebtCategory::RealEstate, "1000", "200000", "150000"),
            debt(DebtCategory::CreditCard, "500", "10000", "5000"),
        ];
        input
    }

    fn new_application(input: CashFlowInput) -> NewLoanApplication {
        NewLoanApplication {
            status: ApplicationStatus::Draft,
            input,
        }
    }

    // =========================================================================
    // create / get
    // =========================================================================

    #[tokio::test]
    async fn test_create_and_get_application() {
        let repo = setup_test_db().await;

        let created = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create application");

        assert!(created.id > 0);
        assert_eq!(created.status, ApplicationStatus::Draft);
        assert_eq!(created.input, create_test_input());
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo
            .get_application(created.id)
            .await
            .expect("Should fetch application");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_application_not_found() {
        let repo = setup_test_db().await;

        let result = repo.get_application(99999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_create_rejects_unamortizable_loan() {
        let repo = setup_test_db().await;
        let mut input = create_test_input();
        input.loan.annualized_payment_override = None;
        input.loan.term_months = "9999".to_string();

        let result = repo.create_application(new_application(input)).await;

        assert!(matches!(result, Err(RepositoryError::InvalidApplication(_))));
        assert_eq!(repo.list_applications(None).await, Ok(Vec::new()));
    }

    // =========================================================================
    // stored snapshot
    // =========================================================================

    #[tokio::test]
    async fn test_snapshot_blobs_hold_derived_figures() {
        let repo = setup_test_db().await;
        let created = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create application");

        let row = sqlx::query("SELECT financials, debts, dscr FROM loan_applications WHERE id = ?")
            .bind(created.id)
            .fetch_one(repo.pool())
            .await
            .expect("Should fetch raw row");
        let financials: serde_json::Value =
            serde_json::from_str(&row.get::<String, _>("financials")).unwrap();
        let debts: serde_json::Value =
            serde_json::from_str(&row.get::<String, _>("debts")).unwrap();
        let dscr: serde_json::Value = serde_json::from_str(&row.get::<String, _>("dscr")).unwrap();

        assert_eq!(
            financials["year2024"]["summary"]["adjustedEbitda"],
            serde_json::json!("185000")
        );
        assert_eq!(financials["year2024"]["input"]["revenue"], serde_json::json!("500000"));
        assert_eq!(debts["annualDebtService"], serde_json::json!("18000"));
        assert_eq!(debts["totalCreditLimit"], serde_json::json!("10000"));
        assert_eq!(debts["entries"].as_array().map(Vec::len), Some(2));
        assert_eq!(debts["totalDebtService"]["year2024"], serde_json::json!("30000"));
        assert_eq!(dscr["year2023"], serde_json::Value::Null);
        assert!(dscr["year2024"].as_str().is_some_and(|s| s.starts_with("6.1666")));
    }

    #[tokio::test]
    async fn test_read_ignores_stale_summaries_and_accepts_bare_debt_array() {
        let repo = setup_test_db().await;
        let now = Utc::now();
        let financials = r#"{
            "year2024": {
                "input": {"revenue": "300000", "cogs": "100000"},
                "summary": {"revenue": "1", "adjustedEbitda": "999999999"}
            }
        }"#;
        let debts = r#"[
            {"category": "LINE_OF_CREDIT", "monthlyPayment": "250",
             "originalLoanAmount": "20000", "outstandingBalance": "5000"}
        ]"#;

        let id = sqlx::query(
            "INSERT INTO loan_applications (
                business_name, status, financials, debts, dscr,
                current_year_dscr, created_at, updated_at
            ) VALUES ('Legacy Co', 'submitted', ?, ?, '{}', '42', ?, ?)",
        )
        .bind(financials)
        .bind(debts)
        .bind(now)
        .bind(now)
        .execute(repo.pool())
        .await
        .expect("Should insert legacy row")
        .last_insert_rowid();

        let fetched = repo.get_application(id).await.expect("Should fetch legacy row");

        assert_eq!(fetched.status, ApplicationStatus::Submitted);
        assert_eq!(fetched.input.loan.business_name, "Legacy Co");
        assert_eq!(fetched.input.financials.current_year.revenue, "300000");
        assert_eq!(fetched.input.financials.prior_year, YearFinancialInput::default());
        assert_eq!(fetched.input.debts.len(), 1);
        assert_eq!(fetched.input.debts[0].category, DebtCategory::LineOfCredit);

        let analysis = cashflow_core::CashFlowAnalysis::from_input(&fetched.input).unwrap();
        let current = analysis.period(ReportingPeriod::CurrentYear);
        assert_eq!(current.summary.adjusted_ebitda, dec!(200000));
        assert_eq!(current.dscr.annual_debt_service, dec!(3000));
    }

    #[tokio::test]
    async fn test_unreadable_blob_is_serialization_error() {
        let repo = setup_test_db().await;
        let now = Utc::now();
        let id = sqlx::query(
            "INSERT INTO loan_applications (financials, debts, created_at, updated_at)
             VALUES ('not json', '[]', ?, ?)",
        )
        .bind(now)
        .bind(now)
        .execute(repo.pool())
        .await
        .expect("Should insert row")
        .last_insert_rowid();

        let result = repo.get_application(id).await;

        assert!(matches!(result, Err(RepositoryError::Serialization(_))));
    }

    // =========================================================================
    // update / delete
    // =========================================================================

    #[tokio::test]
    async fn test_update_application_recomputes_cached_figures() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create application");

        created.status = ApplicationStatus::Submitted;
        created.input.financials.current_year.revenue = "380000".to_string();
        repo.update_application(&created)
            .await
            .expect("Should update application");

        let fetched = repo
            .get_application(created.id)
            .await
            .expect("Should fetch application");
        assert_eq!(fetched.status, ApplicationStatus::Submitted);
        assert_eq!(fetched.input.financials.current_year.revenue, "380000");
        assert!(fetched.updated_at >= created.updated_at);

        let listing = repo.list_applications(None).await.expect("Should list");
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].annualized_loan_payment, Some(dec!(12000)));
        // (380000 - 200000 - 150000 + 35000) / 30000
        assert_eq!(format_ratio(listing[0].current_year_dscr), "2.17");
    }

    #[tokio::test]
    async fn test_update_application_not_found() {
        let repo = setup_test_db().await;
        let mut created = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create application");

        created.id = 99999;

        let result = repo.update_application(&created).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_application() {
        let repo = setup_test_db().await;
        let created = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create application");

        repo.delete_application(created.id)
            .await
            .expect("Should delete application");

        let result = repo.get_application(created.id).await;
        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_application_not_found() {
        let repo = setup_test_db().await;

        let result = repo.delete_application(99999).await;

        assert_eq!(result, Err(RepositoryError::NotFound));
    }

    // =========================================================================
    // list
    // =========================================================================

    #[tokio::test]
    async fn test_list_applications() {
        let repo = setup_test_db().await;
        let first = repo
            .create_application(new_application(create_test_input()))
            .await
            .expect("Should create first application");
        let second = repo
            .create_application(NewLoanApplication {
                status: ApplicationStatus::Submitted,
                input: CashFlowInput::default(),
            })
            .await
            .expect("Should create second application");

        let all = repo.list_applications(None).await.expect("Should list all");
        let drafts = repo
            .list_applications(Some(ApplicationStatus::Draft))
            .await
            .expect("Should list drafts");
        let submitted = repo
            .list_applications(Some(ApplicationStatus::Submitted))
            .await
            .expect("Should list submitted");

        assert_eq!(
            all.iter().map(|l| l.id).collect::<Vec<_>>(),
            vec![second.id, first.id]
        );
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].business_name, "Riverside Bakery LLC");
        assert_eq!(drafts[0].desired_amount, "$150,000");
        assert_eq!(format_ratio(drafts[0].current_year_dscr), "6.17");
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].id, second.id);
        assert_eq!(submitted[0].annualized_loan_payment, Some(dec!(0)));
        assert_eq!(submitted[0].current_year_dscr, None);
    }
}
