//! Application files: a loan request, three periods of financials and an
//! optional debt schedule, written as TOML.
//!
//! ```toml
//! [loan]
//! business_name = "Riverside Bakery LLC"
//! desired_amount = "$150,000"
//! term_months = 120
//! interest_rate = "7.5%"
//!
//! [financials.current_year]
//! revenue = "$500,000"
//! cogs = 200000
//!
//! [financials.year_to_date]
//! ytd_month = "June"
//!
//! [[debts]]
//! category = "REAL_ESTATE"
//! monthly_payment = "$1,000"
//! ```
//!
//! Every amount is kept as text exactly as the applicant would type it, so
//! bare TOML numbers are accepted and turned into their textual form before
//! the file is read into [`CashFlowInput`].

use std::path::{Path, PathBuf};

use cashflow_core::CashFlowInput;
use thiserror::Error;
use tracing::info;

use crate::csv_loader::{self, CsvLoadError};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("cannot read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid application file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error(transparent)]
    Debts(#[from] CsvLoadError),
}

/// Numbers become strings; tables and arrays are walked; everything else is
/// left to serde.
fn stringify_numbers(value: &mut toml::Value) {
    match value {
        toml::Value::Integer(n) => *value = toml::Value::String(n.to_string()),
        toml::Value::Float(f) => *value = toml::Value::String(f.to_string()),
        toml::Value::Table(table) => table.iter_mut().for_each(|(_, v)| stringify_numbers(v)),
        toml::Value::Array(items) => items.iter_mut().for_each(stringify_numbers),
        _ => {}
    }
}

/// Parse the text of an application file.
pub fn parse_application(text: &str) -> Result<CashFlowInput, toml::de::Error> {
    let mut value: toml::Value = toml::from_str(text)?;
    stringify_numbers(&mut value);
    value.try_into()
}

/// Load an application file, optionally taking the debt schedule from a CSV
/// file instead of the file's own `[[debts]]` tables.
pub fn load_application(
    path: &Path,
    debts_csv: Option<&Path>,
) -> Result<CashFlowInput, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut input = parse_application(&text).map_err(|source| InputError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if let Some(csv_path) = debts_csv {
        let entries = csv_loader::load_from_file(csv_path)?;
        if !input.debts.is_empty() {
            info!(
                replaced = input.debts.len(),
                csv = %csv_path.display(),
                "debt schedule CSV replaces the application file's debts"
            );
        }
        input.debts = entries;
    }

    Ok(input)
}
