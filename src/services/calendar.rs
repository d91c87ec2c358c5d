//! Calendar arithmetic shared by the reports
//!
//! Month stepping for gap filling, and the trailing-quarter window used by
//! the daily average. The window is built from day-of-month offsets rather
//! than exact month lengths:
//!
//! - `m1` = anchor minus anchor's day-of-month days (last day of previous month)
//! - `m2` = `m1` minus `m1`'s day-of-month days
//! - the window opens (exclusive) at midnight on the first day of `m2`'s month
//! - the day count is `anchor.day + m1.day + m2.day`

use crate::types::YearMonth;
use chrono::{Datelike, NaiveDateTime, TimeDelta};

/// Every month from `first` to `last` inclusive; empty when `first > last`
pub fn months_between(first: YearMonth, last: YearMonth) -> impl Iterator<Item = YearMonth> {
    std::iter::successors(Some(first), |month| month.succ())
        .take_while(move |month| *month <= last)
}

/// Trailing-quarter window ending at an anchor timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuarterWindow {
    pub anchor: NaiveDateTime,
    pub m1: NaiveDateTime,
    pub m2: NaiveDateTime,
    /// Exclusive lower bound of the window
    pub opens_after: NaiveDateTime,
}

impl QuarterWindow {
    /// `None` only when the arithmetic leaves chrono's supported range
    pub fn ending_at(anchor: NaiveDateTime) -> Option<Self> {
        let m1 = step_back_day_of_month(anchor)?;
        let m2 = step_back_day_of_month(m1)?;
        let opens_after = YearMonth::of(&m2).start()?;

        Some(Self {
            anchor,
            m1,
            m2,
            opens_after,
        })
    }

    /// Denominator for the daily average
    pub fn total_days(&self) -> u32 {
        self.anchor.day() + self.m1.day() + self.m2.day()
    }

    /// Month holding the window's lower bound
    pub fn first_month(&self) -> YearMonth {
        YearMonth::of(&self.opens_after)
    }
}

fn step_back_day_of_month(dt: NaiveDateTime) -> Option<NaiveDateTime> {
    dt.checked_sub_signed(TimeDelta::days(i64::from(dt.day())))
}
