use std::fmt::{Display, Formatter};

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::FormatItem;
use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

use crate::ValidationError;

const ISO_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Calendar date of a daily observation, serialized as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TradeDate(Date);

impl TradeDate {
    pub const fn new(date: Date) -> Self {
        Self(date)
    }

    pub fn today() -> Self {
        Self(OffsetDateTime::now_utc().date())
    }

    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        Date::parse(input.trim(), ISO_DATE)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDate {
                value: input.to_owned(),
            })
    }

    pub fn from_ymd(year: i32, month: u8, day: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidDate {
            value: format!("{year:04}-{month:02}-{day:02}"),
        };
        let month = time::Month::try_from(month).map_err(|_| invalid())?;
        Date::from_calendar_date(year, month, day)
            .map(Self)
            .map_err(|_| invalid())
    }

    pub const fn into_inner(self) -> Date {
        self.0
    }

    /// Midnight UTC of this date as Unix seconds.
    pub fn unix_timestamp(self) -> i64 {
        self.0.midnight().assume_utc().unix_timestamp()
    }

    /// Days elapsed since `earlier` (negative when `earlier` is later).
    pub fn days_since(self, earlier: TradeDate) -> i64 {
        (self.0 - earlier.0).whole_days()
    }

    pub fn plus_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }

    pub fn format_iso(self) -> String {
        self.0
            .format(ISO_DATE)
            .unwrap_or_else(|_| String::from("<unformattable>"))
    }
}

impl From<Date> for TradeDate {
    fn from(value: Date) -> Self {
        Self(value)
    }
}

impl Display for TradeDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format_iso())
    }
}

impl Serialize for TradeDate {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.format_iso())
    }
}

impl<'de> Deserialize<'de> for TradeDate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Self::parse(&value).map_err(D::Error::custom)
    }
}
