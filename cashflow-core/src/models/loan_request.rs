use serde::{Deserialize, Serialize};

/// The new loan the applicant is asking for, as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanRequest {
    #[serde(alias = "business_name")]
    pub business_name: String,
    #[serde(alias = "loan_purpose")]
    pub loan_purpose: String,
    #[serde(alias = "desired_amount")]
    pub desired_amount: String,
    /// Repayment term in months.
    #[serde(alias = "term_months")]
    pub term_months: String,
    /// Annual interest rate in percent, e.g. `"7.5"` or `"7.5%"`.
    #[serde(alias = "interest_rate")]
    pub interest_rate: String,
    /// Annual payment quoted by the lender. When present it replaces the
    /// amortized estimate.
    #[serde(alias = "annualized_payment_override", skip_serializing_if = "Option::is_none")]
    pub annualized_payment_override: Option<String>,
}
