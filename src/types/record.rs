//! Account record types as they appear in an `items` export

use crate::types::{DoctrackError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month (year + month, no day)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Returns `None` unless `month` is in `1..=12`
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// Month containing the given date
    pub fn of<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Next calendar month (December rolls over into January); `None` past `i32::MAX`
    pub fn succ(self) -> Option<Self> {
        if self.month == 12 {
            Some(Self {
                year: self.year.checked_add(1)?,
                month: 1,
            })
        } else {
            Some(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    /// Midnight on the first day of this month
    pub fn start(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).map(|d| d.and_time(NaiveTime::MIN))
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Parses `YYYY-MM`: exactly four year digits, a single-digit month is accepted.
impl FromStr for YearMonth {
    type Err = DoctrackError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || DoctrackError::Parse(format!("invalid period '{}'", s));

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4
            || !year.bytes().all(|b| b.is_ascii_digit())
            || month.is_empty()
            || month.len() > 2
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        YearMonth::new(year, month).ok_or_else(invalid)
    }
}

/// Serialized as its `YYYY-MM` string, so it can key a JSON object.
impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A period label kept verbatim, together with the month it names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Period {
    label: String,
    month: YearMonth,
}

impl Period {
    pub fn parse(label: &str) -> Result<Self> {
        Ok(Self {
            month: label.parse()?,
            label: label.to_owned(),
        })
    }

    /// The period exactly as it appeared in the payload
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct PeriodVisitor;

        impl Visitor<'_> for PeriodVisitor {
            type Value = Period;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a year-month string such as \"2020-03\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<Period, E> {
                Period::parse(v).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(PeriodVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct DocumentCounts {
    pub incomes: u64,
    pub expenses: u64,
}

/// One month of document activity for a record
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PeriodSummary {
    pub period: Period,
    pub documents: DocumentCounts,
}

/// One account entry from the `items` array
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Record {
    pub package: String,
    #[serde(deserialize_with = "deserialize_created")]
    pub created: NaiveDateTime,
    pub summary: Vec<PeriodSummary>,
}

impl Record {
    /// Number of period summaries attached to this record
    pub fn document_count(&self) -> u64 {
        self.summary.len() as u64
    }
}

/// Parse an ISO-8601 `created` value.
///
/// Accepted forms, tried in order:
/// - `2020-03-10T00:00:00` (optional fraction, `T` or space separator)
/// - RFC 3339 with an offset; the wall-clock time is kept, the offset dropped
/// - a bare date `2020-03-10`, taken as midnight
pub fn parse_created(s: &str) -> Result<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_local());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.and_time(NaiveTime::MIN))
        .map_err(|_| DoctrackError::Parse(format!("invalid created timestamp '{}'", s)))
}

fn deserialize_created<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDateTime, D::Error> {
    struct CreatedVisitor;

    impl Visitor<'_> for CreatedVisitor {
        type Value = NaiveDateTime;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an ISO-8601 date-time string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> std::result::Result<NaiveDateTime, E> {
            parse_created(v).map_err(E::custom)
        }
    }

    deserializer.deserialize_str(CreatedVisitor)
}
