use crate::error::{ProjectionError, Result};
use chrono::{Datelike, NaiveDate};
use rust_decimal::{Decimal, RoundingStrategy};
use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject, StringValidation};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, written `YYYY-MM`.
///
/// Field order matters: the derived `Ord` compares the year first, so keys
/// sort chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

/// Years a key can be built with; matches the four-digit `YYYY` form.
pub const MIN_YEAR: i32 = 0;
pub const MAX_YEAR: i32 = 9999;

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ProjectionError::InvalidMonthKey(format!(
                "{}-{:02}",
                year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Month of year, 1 to 12. Recurrence matching works on this value.
    pub fn month_of_year(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn days(&self) -> u32 {
        days_in_month(self.year, self.month)
    }

    pub fn next(&self) -> Self {
        add_months(*self, 1)
    }

    pub fn prev(&self) -> Self {
        add_months(*self, -1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format_month_key(self.year, self.month))
    }
}

impl FromStr for MonthKey {
    type Err = ProjectionError;

    fn from_str(s: &str) -> Result<Self> {
        parse_month_key(s)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_month_key(&raw).map_err(serde::de::Error::custom)
    }
}

impl JsonSchema for MonthKey {
    fn schema_name() -> String {
        "MonthKey".to_string()
    }

    fn json_schema(_gen: &mut SchemaGenerator) -> Schema {
        SchemaObject {
            instance_type: Some(InstanceType::String.into()),
            string: Some(Box::new(StringValidation {
                pattern: Some(r"^[0-9]{4}-(0[1-9]|1[0-2])$".to_string()),
                ..Default::default()
            })),
            ..Default::default()
        }
        .into()
    }
}

/// Formats a year and month as a `YYYY-MM` key, zero-padding the month.
pub fn format_month_key(year: i32, month: u32) -> String {
    format!("{:04}-{:02}", year, month)
}

/// Parses a `YYYY-MM` string.
pub fn parse_month_key(key: &str) -> Result<MonthKey> {
    let trimmed = key.trim();
    let (year_part, month_part) = trimmed
        .split_once('-')
        .ok_or_else(|| ProjectionError::InvalidMonthKey(key.to_string()))?;

    if year_part.len() != 4 || month_part.len() != 2 {
        return Err(ProjectionError::InvalidMonthKey(key.to_string()));
    }
    if !year_part.chars().chain(month_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(ProjectionError::InvalidMonthKey(key.to_string()));
    }

    let year: i32 = year_part
        .parse()
        .map_err(|_| ProjectionError::InvalidMonthKey(key.to_string()))?;
    let month: u32 = month_part
        .parse()
        .map_err(|_| ProjectionError::InvalidMonthKey(key.to_string()))?;

    MonthKey::new(year, month).map_err(|_| ProjectionError::InvalidMonthKey(key.to_string()))
}

/// Number of months from `from` to `to`; negative when `to` is earlier.
/// Saturates at the `i32` bounds.
pub fn elapsed_months(from: MonthKey, to: MonthKey) -> i32 {
    let year_diff = to.year as i64 - from.year as i64;
    let month_diff = to.month as i64 - from.month as i64;
    (year_diff * 12 + month_diff).clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Shifts a key by `n` months, rolling the year over in both directions.
///
/// Computed in `i64`, so no shift can overflow; the year saturates at the
/// `i32` bounds.
pub fn add_months(key: MonthKey, n: i32) -> MonthKey {
    let index = key.year as i64 * 12 + (key.month as i64 - 1) + n as i64;
    MonthKey {
        year: index
            .div_euclid(12)
            .clamp(i32::MIN as i64, i32::MAX as i64) as i32,
        month: index.rem_euclid(12) as u32 + 1,
    }
}

/// `count` consecutive months starting at `start`.
pub fn months_in_window(start: MonthKey, count: u32) -> Vec<MonthKey> {
    (0..count)
        .map(|i| add_months(start, i.min(i32::MAX as u32) as i32))
        .collect()
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 => {
            let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
            if leap {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

/// Rounds to the currency's minor unit, halves away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Drops fractions of a cent. Used where a remainder is carried elsewhere.
pub fn truncate_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::ToZero)
}
