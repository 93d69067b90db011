use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{DebtEntry, FinancialsInput, LoanRequest};

/// Everything the calculators need: the applicant's raw inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CashFlowInput {
    pub loan: LoanRequest,
    pub financials: FinancialsInput,
    pub debts: Vec<DebtEntry>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    #[default]
    Draft,
    Submitted,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            _ => None,
        }
    }
}

/// A persisted loan application. Only inputs are stored authoritatively;
/// every derived figure is recomputed from `input` when needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub id: i64,
    pub status: ApplicationStatus,
    pub input: CashFlowInput,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// For creating new applications (no id or timestamps)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLoanApplication {
    pub status: ApplicationStatus,
    pub input: CashFlowInput,
}

/// Row shown when listing saved applications. The cached figures come from
/// the last write and are for display only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationListing {
    pub id: i64,
    pub business_name: String,
    pub desired_amount: String,
    pub status: ApplicationStatus,
    pub annualized_loan_payment: Option<Decimal>,
    pub current_year_dscr: Option<Decimal>,
    pub updated_at: DateTime<Utc>,
}
