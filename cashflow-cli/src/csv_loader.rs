//! CSV loader for existing-debt schedules.
//!
//! ## CSV Format
//!
//! Column order does **not** matter (headers are matched by name). Header
//! names are case-sensitive and must match exactly. Amount cells are kept as
//! entered; `$` signs and thousands separators are fine.
//!
//! | Column | Required | Notes |
//! |------------------------|----------|--------------------------------------------|
//! | `category` | yes | See below |
//! | `description` | no | e.g. `Building mortgage` |
//! | `monthly_payment` | no | e.g. `$1,250` |
//! | `original_loan_amount` | no | Credit limit for cards and lines of credit |
//! | `outstanding_balance` | no | |
//! | `notes` | no | |
//!
//! ### Category Codes
//!
//! | Code | Also accepted |
//! |---------------------|--------------------------------------|
//! | `REAL_ESTATE` | `real estate`, `Real Estate` |
//! | `VEHICLE_EQUIPMENT` | `vehicle`, `equipment`, `Vehicle / Equipment` |
//! | `CREDIT_CARD` | `credit card` |
//! | `LINE_OF_CREDIT` | `line of credit`, `LOC` |
//! | `OTHER` | `other` |
//!
//! ### Example
//!
//! ```csv
//! category,description,monthly_payment,original_loan_amount,outstanding_balance
//! REAL_ESTATE,Building mortgage,"$1,000","$200,000","$150,000"
//! CREDIT_CARD,Business card,$500,"$10,000","$5,000"
//! ```
use std::path::{Path, PathBuf};

use cashflow_core::{DebtCategory, DebtEntry, MAX_ENTRIES_PER_CATEGORY};
use serde::Deserialize;
use tracing::warn;

// ---------------------------------------------------------------------------
// Serde-compatible row that mirrors the CSV layout exactly
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    monthly_payment: String,
    #[serde(default)]
    original_loan_amount: String,
    #[serde(default)]
    outstanding_balance: String,
    #[serde(default)]
    notes: String,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while loading a debt schedule.
#[derive(Debug, thiserror::Error)]
pub enum CsvLoadError {
    /// The file could not be read.
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The underlying CSV deserialisation failed (bad structure, missing
    /// `category` column, ragged row, etc.).
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A `category` cell did not name a known debt category. `row` is
    /// 1-based, not counting the header.
    #[error("unrecognised debt category '{category}' on row {row}")]
    InvalidCategory { category: String, row: usize },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

fn convert_row(
    row: CsvRow,
    row_number: usize,
) -> Result<DebtEntry, CsvLoadError> {
    let category = DebtCategory::parse(&row.category).ok_or_else(|| {
        CsvLoadError::InvalidCategory {
            category: row.category.clone(),
            row: row_number,
        }
    })?;

    Ok(DebtEntry {
        category,
        description: row.description,
        monthly_payment: row.monthly_payment,
        original_loan_amount: row.original_loan_amount,
        outstanding_balance: row.outstanding_balance,
        notes: row.notes,
    })
}

/// Entry form limits are advisory here: an imported schedule is kept whole.
fn warn_on_full_categories(entries: &[DebtEntry]) {
    for category in DebtCategory::ALL {
        let count = entries.iter().filter(|e| e.category == category).count();
        if count > MAX_ENTRIES_PER_CATEGORY {
            warn!(
                category = category.as_str(),
                count,
                limit = MAX_ENTRIES_PER_CATEGORY,
                "debt schedule has more entries than the form allows"
            );
        }
    }
}

/// Parse CSV text and return the debt entries in file order.
///
/// # Errors
///
/// * [`CsvLoadError::Parse`]: the CSV is structurally invalid or has no
///   `category` column.
/// * [`CsvLoadError::InvalidCategory`]: a row names an unknown category.
pub fn load_from_str(input: &str) -> Result<Vec<DebtEntry>, CsvLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All) // tolerate whitespace around values
        .flexible(false) // strict column count
        .from_reader(input.as_bytes());

    let entries = reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(idx, result)| {
            let row = result?;
            convert_row(row, idx + 1)
        })
        .collect::<Result<Vec<_>, _>>()?;

    warn_on_full_categories(&entries);
    Ok(entries)
}

/// Read a file from disk and delegate to [`load_from_str`].
pub fn load_from_file(path: &Path) -> Result<Vec<DebtEntry>, CsvLoadError> {
    let contents = std::fs::read_to_string(path).map_err(|source| CsvLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&contents)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
