//! Order numbering value objects.
//!
//! An order number has the shape `PREFIX-YYMMDD-NNNN`: the prefix configured
//! by the operator, the calendar day the counter belongs to, and the counter
//! zero-padded to a minimum width. Counters past the width simply grow longer.

use crate::{StorefrontError, StorefrontResult};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_KEY_FORMAT: &str = "%y%m%d";

/// Default zero-pad width of the counter field.
pub const DEFAULT_PAD_WIDTH: usize = 4;

/// Default order number prefix.
pub const DEFAULT_ORDER_PREFIX: &str = "ORD";

/// Compact calendar-day identifier (`YYMMDD`) partitioning the order sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateKey(String);

impl DateKey {
    /// Parses a `YYMMDD` key, rejecting anything that is not a real calendar day.
    pub fn parse(s: &str) -> StorefrontResult<Self> {
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(StorefrontError::validation(format!(
                "Date key must be six digits (YYMMDD), got '{}'",
                s
            )));
        }
        NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)
            .map_err(|_| StorefrontError::validation(format!("Date key '{}' is not a calendar day", s)))?;
        Ok(Self(s.to_string()))
    }

    /// Builds the key for a calendar day.
    #[must_use]
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date.format(DATE_KEY_FORMAT).to_string())
    }

    /// Key for the current UTC day.
    #[must_use]
    pub fn today_utc() -> Self {
        Self::from_date(Utc::now().date_naive())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DateKey {
    type Error = StorefrontError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<DateKey> for String {
    fn from(key: DateKey) -> Self {
        key.0
    }
}

/// A minted, human-facing order identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderNumber {
    value: String,
    date_key: DateKey,
    counter: u64,
}

impl OrderNumber {
    /// The rendered order number.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn date_key(&self) -> &DateKey {
        &self.date_key
    }

    #[must_use]
    pub const fn counter(&self) -> u64 {
        self.counter
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.value
    }

    /// The prefix part, everything before the date key.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.value
            .rsplitn(3, '-')
            .nth(2)
            .unwrap_or_default()
    }

    /// Parses an order number of any prefix and pad width.
    ///
    /// Splits on the last two `-`, so prefixes may contain `-` themselves.
    pub fn parse(s: &str) -> StorefrontResult<Self> {
        let invalid = || StorefrontError::validation(format!("Invalid order number '{}'", s));

        let mut parts = s.rsplitn(3, '-');
        let (Some(counter_part), Some(date_part), Some(prefix)) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid());
        };
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let date_key = DateKey::parse(date_part).map_err(|_| invalid())?;
        if counter_part.is_empty() || !counter_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let counter: u64 = counter_part.parse().map_err(|_| invalid())?;
        if counter == 0 {
            return Err(invalid());
        }

        Ok(Self {
            value: s.to_string(),
            date_key,
            counter,
        })
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

/// Renders and parses order numbers for one prefix and pad width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderNumberFormat {
    prefix: String,
    pad_width: usize,
}

impl Default for OrderNumberFormat {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_ORDER_PREFIX.to_string(),
            pad_width: DEFAULT_PAD_WIDTH,
        }
    }
}

impl OrderNumberFormat {
    /// Creates a format, validating the prefix and width.
    pub fn new(prefix: impl Into<String>, pad_width: usize) -> StorefrontResult<Self> {
        let prefix = prefix.into();
        if prefix.is_empty() || prefix.chars().any(char::is_whitespace) {
            return Err(StorefrontError::validation(
                "Order number prefix must be non-empty and contain no whitespace",
            ));
        }
        if pad_width == 0 {
            return Err(StorefrontError::validation("Order number pad width must be positive"));
        }
        Ok(Self { prefix, pad_width })
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub const fn pad_width(&self) -> usize {
        self.pad_width
    }

    /// Renders the order number for a day and counter.
    #[must_use]
    pub fn format(&self, date_key: &DateKey, counter: u64) -> OrderNumber {
        let value = format!(
            "{}-{}-{:0width$}",
            self.prefix,
            date_key,
            counter,
            width = self.pad_width
        );
        OrderNumber {
            value,
            date_key: date_key.clone(),
            counter,
        }
    }

    /// Parses an order number rendered by this format.
    ///
    /// Only the canonical rendering is accepted, so `parse(format(k, c))`
    /// yields `(k, c)` and no two strings map to the same order.
    pub fn parse(&self, s: &str) -> StorefrontResult<OrderNumber> {
        let parsed = OrderNumber::parse(s)?;
        if parsed.prefix() != self.prefix
            || self.format(&parsed.date_key, parsed.counter).value != parsed.value
        {
            return Err(StorefrontError::validation(format!("Invalid order number '{}'", s)));
        }
        Ok(parsed)
    }
}
