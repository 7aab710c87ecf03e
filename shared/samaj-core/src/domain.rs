//! Core domain types used across all microservices

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Occupancy type of a society member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserType {
    Owner,
    Tenant,
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Owner => write!(f, "owner"),
            Self::Tenant => write!(f, "tenant"),
        }
    }
}

/// Platform role of an authenticated member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Chairman,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chairman => write!(f, "chairman"),
            Self::User => write!(f, "user"),
        }
    }
}

#[derive(Debug, Error)]
#[error("invalid month key '{0}', expected YYYY-MM")]
pub struct InvalidMonth(pub String);

/// Calendar-month key in canonical `YYYY-MM` form.
///
/// Maintenance dues, payment orders and receipts are all keyed by
/// `(member, Month)`. Ordering follows the calendar so receipt listings
/// can sort month-descending.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Month {
    year: i32,
    month: u32,
}

impl Month {
    pub fn new(year: i32, month: u32) -> std::result::Result<Self, InvalidMonth> {
        if !(1..=12).contains(&month) || !(1970..=9999).contains(&year) {
            return Err(InvalidMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(Self { year, month })
    }

    /// Month containing the given instant.
    pub fn of(at: DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month(),
        }
    }

    /// Current calendar month.
    pub fn current() -> Self {
        Self::of(Utc::now())
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for Month {
    type Err = InvalidMonth;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (year, month) = s.split_once('-').ok_or_else(|| InvalidMonth(s.to_string()))?;
        if year.len() != 4 || month.len() != 2 {
            return Err(InvalidMonth(s.to_string()));
        }
        let year: i32 = year.parse().map_err(|_| InvalidMonth(s.to_string()))?;
        let month: u32 = month.parse().map_err(|_| InvalidMonth(s.to_string()))?;
        Self::new(year, month).map_err(|_| InvalidMonth(s.to_string()))
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl TryFrom<String> for Month {
    type Error = InvalidMonth;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Month> for String {
    fn from(value: Month) -> Self {
        value.to_string()
    }
}

/// Phone number with formatting utilities
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new(number: impl Into<String>) -> Self {
        Self(Self::normalize(number.into()))
    }

    fn normalize(number: String) -> String {
        let cleaned: String = number.chars().filter(|c| c.is_ascii_digit()).collect();
        if cleaned.len() == 12 && cleaned.starts_with("91") {
            cleaned
        } else if cleaned.len() == 11 && cleaned.starts_with('0') {
            format!("91{}", &cleaned[1..])
        } else {
            format!("91{}", cleaned)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn international(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_parses_canonical_form() {
        let m: Month = "2025-06".parse().unwrap();
        assert_eq!(m.year(), 2025);
        assert_eq!(m.month(), 6);
        assert_eq!(m.to_string(), "2025-06");
    }

    #[test]
    fn month_rejects_malformed_keys() {
        assert!("2025-13".parse::<Month>().is_err());
        assert!("2025-00".parse::<Month>().is_err());
        assert!("2025-6".parse::<Month>().is_err());
        assert!("25-06".parse::<Month>().is_err());
        assert!("junk".parse::<Month>().is_err());
    }

    #[test]
    fn month_orders_by_calendar() {
        let older: Month = "2024-12".parse().unwrap();
        let newer: Month = "2025-01".parse().unwrap();
        assert!(older < newer);
    }

    #[test]
    fn month_round_trips_through_serde() {
        let m: Month = "2025-06".parse().unwrap();
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "\"2025-06\"");
        let back: Month = serde_json::from_str(&json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn phone_number_normalizes_indian_formats() {
        assert_eq!(PhoneNumber::new("9876543210").as_str(), "919876543210");
        assert_eq!(PhoneNumber::new("09876543210").as_str(), "919876543210");
        assert_eq!(PhoneNumber::new("+91 98765 43210").as_str(), "919876543210");
        assert_eq!(
            PhoneNumber::new("9876543210").international(),
            "+919876543210"
        );
    }
}
