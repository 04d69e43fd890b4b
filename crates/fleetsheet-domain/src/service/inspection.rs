//! Inspection (HU) age classification used for row tinting

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// How long ago the inspection date lies, relative to a reference day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InspectionAge {
    /// Not older than 3 months (future dates included)
    Recent,
    /// Older than 3 months, not older than 12
    WithinYear,
    /// Older than 12 months
    Overdue,
}

impl InspectionAge {
    /// Background fill as 0xRRGGBB
    pub fn fill_rgb(&self) -> u32 {
        match self {
            InspectionAge::Recent => 0x007500,
            InspectionAge::WithinYear => 0xFFA500,
            InspectionAge::Overdue => 0xB30000,
        }
    }
}

/// Parse an `hu` value: `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
///
/// Partial dates resolve to the first day of the period.
pub fn parse_inspection_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d") {
        return Some(date);
    }
    if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) {
        let year: i32 = raw.parse().ok()?;
        return NaiveDate::from_ymd_opt(year, 1, 1);
    }
    None
}

/// Classify an `hu` value against `today`; `None` when it cannot be parsed
pub fn classify_inspection(raw: &str, today: NaiveDate) -> Option<InspectionAge> {
    let date = parse_inspection_date(raw)?;
    let three_months_ago = today.checked_sub_months(Months::new(3))?;
    let a_year_ago = today.checked_sub_months(Months::new(12))?;

    Some(if date >= three_months_ago {
        InspectionAge::Recent
    } else if date >= a_year_ago {
        InspectionAge::WithinYear
    } else {
        InspectionAge::Overdue
    })
}
