use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The wizard caps each debt category at this many entries. The limit is a
/// form constraint only; stored data may exceed it.
pub const MAX_ENTRIES_PER_CATEGORY: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DebtCategory {
    RealEstate,
    VehicleEquipment,
    CreditCard,
    LineOfCredit,
    Other,
}

impl DebtCategory {
    pub const ALL: [DebtCategory; 5] = [
        DebtCategory::RealEstate,
        DebtCategory::VehicleEquipment,
        DebtCategory::CreditCard,
        DebtCategory::LineOfCredit,
        DebtCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RealEstate => "REAL_ESTATE",
            Self::VehicleEquipment => "VEHICLE_EQUIPMENT",
            Self::CreditCard => "CREDIT_CARD",
            Self::LineOfCredit => "LINE_OF_CREDIT",
            Self::Other => "OTHER",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::RealEstate => "Real Estate",
            Self::VehicleEquipment => "Vehicle & Equipment",
            Self::CreditCard => "Credit Cards",
            Self::LineOfCredit => "Lines of Credit",
            Self::Other => "Other",
        }
    }

    /// Revolving categories report a credit limit in `original_loan_amount`
    /// and count toward credit utilization.
    pub fn is_revolving(&self) -> bool {
        matches!(self, Self::CreditCard | Self::LineOfCredit)
    }

    /// Lenient parse accepting the storage code, the display label and a few
    /// common spellings (`real estate`, `Vehicle / Equipment`, `LOC`).
    pub fn parse(s: &str) -> Option<Self> {
        let mut normalized = String::with_capacity(s.len());
        for c in s.trim().chars() {
            if c.is_ascii_alphanumeric() {
                normalized.push(c.to_ascii_uppercase());
            } else if !normalized.is_empty() && !normalized.ends_with('_') {
                normalized.push('_');
            }
        }
        let normalized = normalized.trim_end_matches('_');

        match normalized {
            "VEHICLE" | "EQUIPMENT" | "VEHICLE_AND_EQUIPMENT" => Some(Self::VehicleEquipment),
            "CREDIT_CARDS" => Some(Self::CreditCard),
            "LOC" | "LINES_OF_CREDIT" => Some(Self::LineOfCredit),
            other => Self::ALL.into_iter().find(|c| c.as_str() == other),
        }
    }
}

impl fmt::Display for DebtCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebtCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown debt category '{s}'"))
    }
}

/// One existing obligation as entered by the applicant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtEntry {
    pub category: DebtCategory,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "monthly_payment")]
    pub monthly_payment: String,
    /// Original principal, or the credit limit for revolving categories.
    #[serde(default, alias = "original_loan_amount")]
    pub original_loan_amount: String,
    #[serde(default, alias = "outstanding_balance")]
    pub outstanding_balance: String,
    #[serde(default)]
    pub notes: String,
}

impl DebtEntry {
    pub fn new(category: DebtCategory) -> Self {
        Self {
            category,
            description: String::new(),
            monthly_payment: String::new(),
            original_loan_amount: String::new(),
            outstanding_balance: String::new(),
            notes: String::new(),
        }
    }
}

/// Returns true when the form should stop offering "add another" for `category`.
pub fn category_is_full(
    entries: &[DebtEntry],
    category: DebtCategory,
) -> bool {
    entries.iter().filter(|e| e.category == category).count() >= MAX_ENTRIES_PER_CATEGORY
}

/// Sums for a single debt category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotals {
    pub category: DebtCategory,
    pub entry_count: usize,
    pub monthly_payment: Decimal,
    pub annual_payment: Decimal,
    pub original_loan_amount: Decimal,
    pub outstanding_balance: Decimal,
}

/// Aggregated view of all existing debts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtSummary {
    pub monthly_debt_service: Decimal,
    pub annual_debt_service: Decimal,
    /// Per-category totals in [`DebtCategory::ALL`] order, present categories only.
    pub category_totals: Vec<CategoryTotals>,
    pub total_credit_balance: Decimal,
    pub total_credit_limit: Decimal,
    /// `None` when there is no revolving credit limit to divide by.
    pub credit_utilization_rate: Option<Decimal>,
}

impl DebtSummary {
    pub fn category(
        &self,
        category: DebtCategory,
    ) -> Option<&CategoryTotals> {
        self.category_totals.iter().find(|t| t.category == category)
    }
}
