//! Date normalization and rendering for memorial dates.
//!
//! Memorial dates arrive either as ISO calendar strings or as backend
//! timestamps. Every consumer (display, search matching, sorting) goes through
//! [`DateFormatter::normalize`] so the two representations behave the same.
//!
//! Plain calendar strings are taken as calendar days and never shifted by a
//! timezone, so `2024-01-05` always renders as the 5th. Timestamps are
//! converted to the configured display offset before their day is taken.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::models::RecordDate;

/// Placeholder rendered when a record has no date
pub const MISSING_DATE: &str = "Data não informada";
/// Placeholder rendered when a stored date cannot be parsed
pub const INVALID_DATE: &str = "Data inválida";

/// UTC offset of Brasília time, the service's home timezone
pub const DEFAULT_DISPLAY_OFFSET_MINUTES: i32 = -180;

/// Rendering styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateStyle {
    Long,  // "5 de janeiro de 2024"
    Short, // "05/01/2024"
    Iso,   // "2024-01-05"
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisplayLocale {
    PtBr,
    EnUs,
}

/// Result of normalizing a stored date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizedDate {
    Missing,
    Invalid,
    Day(NaiveDate),
}

const PT_BR_MONTHS: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho",
    "julho", "agosto", "setembro", "outubro", "novembro", "dezembro",
];

const EN_US_MONTHS: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Parse a strict `YYYY-MM-DD` calendar date
pub fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormatter {
    offset: FixedOffset,
    locale: DisplayLocale,
}

impl Default for DateFormatter {
    fn default() -> Self {
        Self::from_offset_minutes(DEFAULT_DISPLAY_OFFSET_MINUTES)
    }
}

impl DateFormatter {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            offset,
            locale: DisplayLocale::PtBr,
        }
    }

    /// Build from an offset in minutes east of UTC; out-of-range values fall back to UTC
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| Utc.fix());
        Self::new(offset)
    }

    pub fn with_locale(mut self, locale: DisplayLocale) -> Self {
        self.locale = locale;
        self
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Resolve a stored date to the calendar day it represents for display
    pub fn normalize(&self, date: Option<&RecordDate>) -> NormalizedDate {
        let Some(date) = date else {
            return NormalizedDate::Missing;
        };

        match date {
            RecordDate::Calendar(value) => {
                if value.trim().is_empty() {
                    return NormalizedDate::Missing;
                }
                if let Some(day) = parse_calendar_date(value) {
                    return NormalizedDate::Day(day);
                }
                match DateTime::parse_from_rfc3339(value.trim()) {
                    Ok(instant) => {
                        NormalizedDate::Day(instant.with_timezone(&self.offset).date_naive())
                    }
                    Err(_) => NormalizedDate::Invalid,
                }
            }
            RecordDate::Instant(timestamp) => match timestamp.to_datetime() {
                Some(instant) => {
                    NormalizedDate::Day(instant.with_timezone(&self.offset).date_naive())
                }
                None => NormalizedDate::Invalid,
            },
        }
    }

    /// Epoch milliseconds used for ordering; `None` when absent or unparsable.
    ///
    /// Calendar days count from midnight UTC of that day.
    pub fn epoch_millis(&self, date: Option<&RecordDate>) -> Option<i64> {
        match date? {
            RecordDate::Calendar(value) => {
                if let Some(day) = parse_calendar_date(value) {
                    return day
                        .and_hms_opt(0, 0, 0)
                        .map(|midnight| midnight.and_utc().timestamp_millis());
                }
                DateTime::parse_from_rfc3339(value.trim())
                    .ok()
                    .map(|instant| instant.timestamp_millis())
            }
            RecordDate::Instant(timestamp) => {
                timestamp.to_datetime().map(|instant| instant.timestamp_millis())
            }
        }
    }

    /// Render a date in the given style, falling back to a placeholder
    pub fn format(&self, date: Option<&RecordDate>, style: DateStyle) -> String {
        match self.normalize(date) {
            NormalizedDate::Missing => MISSING_DATE.to_string(),
            NormalizedDate::Invalid => INVALID_DATE.to_string(),
            NormalizedDate::Day(day) => self.format_day(day, style),
        }
    }

    pub fn format_long(&self, date: Option<&RecordDate>) -> String {
        self.format(date, DateStyle::Long)
    }

    /// ISO calendar form for editing; unparsable strings pass through unchanged
    pub fn to_iso(&self, date: Option<&RecordDate>) -> Option<String> {
        match self.normalize(date) {
            NormalizedDate::Missing => None,
            NormalizedDate::Day(day) => Some(self.format_day(day, DateStyle::Iso)),
            NormalizedDate::Invalid => match date {
                Some(RecordDate::Calendar(raw)) => Some(raw.clone()),
                _ => None,
            },
        }
    }

    pub fn format_day(&self, day: NaiveDate, style: DateStyle) -> String {
        let month_index = day.month0() as usize;
        match (style, self.locale) {
            (DateStyle::Iso, _) => day.format("%Y-%m-%d").to_string(),
            (DateStyle::Long, DisplayLocale::PtBr) => {
                format!("{} de {} de {}", day.day(), PT_BR_MONTHS[month_index], day.year())
            }
            (DateStyle::Long, DisplayLocale::EnUs) => {
                format!("{} {}, {}", EN_US_MONTHS[month_index], day.day(), day.year())
            }
            (DateStyle::Short, DisplayLocale::PtBr) => day.format("%d/%m/%Y").to_string(),
            (DateStyle::Short, DisplayLocale::EnUs) => day.format("%m/%d/%Y").to_string(),
        }
    }
}
