use std::fmt;

use serde::{Deserialize, Serialize};

/// The three reporting periods a cash flow analysis covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReportingPeriod {
    /// The earlier completed fiscal year, before the requested loan existed.
    PriorYear,
    /// The most recently completed fiscal year.
    CurrentYear,
    /// The partial current year, covering `ytd_month` months.
    YearToDate,
}

impl ReportingPeriod {
    pub const ALL: [ReportingPeriod; 3] = [
        ReportingPeriod::PriorYear,
        ReportingPeriod::CurrentYear,
        ReportingPeriod::YearToDate,
    ];

    /// Key used for this period in persisted JSON blobs.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Self::PriorYear => "year2023",
            Self::CurrentYear => "year2024",
            Self::YearToDate => "year2025YTD",
        }
    }

    /// Human-readable label relative to `base_year`, the first (prior) year.
    ///
    /// ```
    /// use cashflow_core::ReportingPeriod;
    ///
    /// assert_eq!(ReportingPeriod::PriorYear.label(2023), "2023");
    /// assert_eq!(ReportingPeriod::YearToDate.label(2023), "2025 YTD");
    /// ```
    pub fn label(
        &self,
        base_year: i32,
    ) -> String {
        match self {
            Self::PriorYear => base_year.to_string(),
            Self::CurrentYear => (base_year + 1).to_string(),
            Self::YearToDate => format!("{} YTD", base_year + 2),
        }
    }
}

/// Number of months (1–12) represented by the year-to-date period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct YtdMonth(u8);

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

impl YtdMonth {
    /// A full year; no proration applies.
    pub const FULL_YEAR: YtdMonth = YtdMonth(12);

    pub fn new(month: u8) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self(month))
    }

    /// Parses the month as entered in the wizard: `"06"`, `"6"`, `"June"`,
    /// or a three-letter abbreviation such as `"Jun"`.
    ///
    /// ```
    /// use cashflow_core::YtdMonth;
    ///
    /// assert_eq!(YtdMonth::parse("06").map(|m| m.get()), Some(6));
    /// assert_eq!(YtdMonth::parse("September").map(|m| m.get()), Some(9));
    /// assert_eq!(YtdMonth::parse("13"), None);
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Ok(month) = trimmed.parse::<u8>() {
            return Self::new(month);
        }

        let lower = trimmed.to_ascii_lowercase();
        MONTH_NAMES
            .iter()
            .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
            .and_then(|idx| Self::new(idx as u8 + 1))
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Capitalized English month name.
    pub fn name(&self) -> &'static str {
        const DISPLAY: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        DISPLAY[usize::from(self.0 - 1)]
    }
}

impl TryFrom<u8> for YtdMonth {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("month must be between 1 and 12, got {value}"))
    }
}

impl From<YtdMonth> for u8 {
    fn from(month: YtdMonth) -> Self {
        month.0
    }
}

impl fmt::Display for YtdMonth {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_zero_padded_numbers() {
        assert_eq!(YtdMonth::parse("01"), YtdMonth::new(1));
        assert_eq!(YtdMonth::parse("12"), YtdMonth::new(12));
    }

    #[test]
    fn parse_accepts_month_names_case_insensitively() {
        assert_eq!(YtdMonth::parse("june"), YtdMonth::new(6));
        assert_eq!(YtdMonth::parse("DECEMBER"), YtdMonth::new(12));
        assert_eq!(YtdMonth::parse(" Mar "), YtdMonth::new(3));
    }

    #[test]
    fn parse_rejects_out_of_range_and_garbage() {
        assert_eq!(YtdMonth::parse("0"), None);
        assert_eq!(YtdMonth::parse("13"), None);
        assert_eq!(YtdMonth::parse(""), None);
        assert_eq!(YtdMonth::parse("ju"), None);
        assert_eq!(YtdMonth::parse("smarch"), None);
    }

    #[test]
    fn display_is_zero_padded() {
        assert_eq!(YtdMonth::new(6).unwrap().to_string(), "06");
        assert_eq!(YtdMonth::new(6).unwrap().name(), "June");
    }

    #[test]
    fn labels_follow_base_year() {
        assert_eq!(ReportingPeriod::CurrentYear.label(2023), "2024");
        assert_eq!(ReportingPeriod::YearToDate.label(2030), "2032 YTD");
    }

    #[test]
    fn deserializing_invalid_month_fails() {
        let result: Result<YtdMonth, _> = serde_json::from_str("13");

        assert!(result.is_err());
    }
}
