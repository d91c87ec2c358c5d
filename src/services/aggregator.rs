//! Aggregator service for computing document activity reports
//!
//! Every report is an accumulator that observes records one at a time and
//! keeps state proportional to the number of distinct months, never to the
//! number of records. The same accumulators back both the slice API on
//! [`Aggregator`] and single-pass streaming through [`ItemsParser`].
//!
//! [`ItemsParser`]: crate::parsers::ItemsParser

use crate::parsers::RecordSink;
use crate::services::calendar::{months_between, QuarterWindow};
use crate::types::{DocumentTotals, MonthlyCounts, PeriodTotals, Record, ReportSet, YearMonth};
use chrono::NaiveDateTime;
use std::collections::{BTreeMap, HashMap};

/// An accumulator that turns observed records into one report
pub trait Report: RecordSink + Default {
    type Output;

    fn finish(self) -> Self::Output;
}

/// Summary occurrences per period month, gap-filled with zeros
#[derive(Debug, Default)]
pub struct MonthHistogram {
    counts: BTreeMap<YearMonth, u64>,
}

impl RecordSink for MonthHistogram {
    fn observe(&mut self, record: &Record) {
        for summary in &record.summary {
            let count = self.counts.entry(summary.period.month()).or_insert(0);
            *count = count.saturating_add(1);
        }
    }
}

impl Report for MonthHistogram {
    type Output = MonthlyCounts;

    fn finish(mut self) -> MonthlyCounts {
        let (Some(&first), Some(&last)) =
            (self.counts.keys().next(), self.counts.keys().next_back())
        else {
            return MonthlyCounts::default();
        };

        for month in months_between(first, last) {
            self.counts.entry(month).or_insert(0);
        }
        MonthlyCounts::from(self.counts)
    }
}

/// Income/expense document sums per period label
#[derive(Debug, Default)]
pub struct PeriodTally {
    totals: HashMap<String, DocumentTotals>,
}

impl RecordSink for PeriodTally {
    fn observe(&mut self, record: &Record) {
        for summary in &record.summary {
            // Look up by &str first so repeated periods never allocate
            match self.totals.get_mut(summary.period.label()) {
                Some(totals) => totals.add(&summary.documents),
                None => {
                    self.totals.insert(
                        summary.period.label().to_owned(),
                        DocumentTotals::from(&summary.documents),
                    );
                }
            }
        }
    }
}

impl Report for PeriodTally {
    type Output = PeriodTotals;

    fn finish(self) -> PeriodTotals {
        self.totals.into_iter().collect()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MonthDocuments {
    documents: u64,
    /// Documents of records created exactly at midnight on the 1st
    at_month_start: u64,
}

/// Average documents per day over the trailing quarter ending at the latest `created`
///
/// Records are bucketed by creation month. The window's lower bound is always
/// midnight on the 1st of some month, so a bucket plus its "created exactly at
/// the month start" share is enough to apply the strict `created > bound` test.
#[derive(Debug, Default)]
pub struct TrailingQuarter {
    latest: Option<NaiveDateTime>,
    months: BTreeMap<YearMonth, MonthDocuments>,
}

impl RecordSink for TrailingQuarter {
    fn observe(&mut self, record: &Record) {
        let month = YearMonth::of(&record.created);
        let documents = record.document_count();

        let bucket = self.months.entry(month).or_default();
        bucket.documents = bucket.documents.saturating_add(documents);
        if month.start() == Some(record.created) {
            bucket.at_month_start = bucket.at_month_start.saturating_add(documents);
        }

        if self.latest < Some(record.created) {
            self.latest = Some(record.created);
        }
    }
}

impl Report for TrailingQuarter {
    type Output = u64;

    fn finish(self) -> u64 {
        let Some(window) = self.latest.and_then(QuarterWindow::ending_at) else {
            return 0;
        };
        let total_days = u64::from(window.total_days());
        if total_days == 0 {
            return 0;
        }

        let first = window.first_month();
        let documents: u64 = self
            .months
            .range(first..)
            .map(|(month, bucket)| {
                if *month == first {
                    bucket.documents - bucket.at_month_start
                } else {
                    bucket.documents
                }
            })
            .fold(0u64, u64::saturating_add);

        documents / total_days
    }
}

/// All three reports in one pass
#[derive(Debug, Default)]
pub struct CombinedReports {
    monthly: MonthHistogram,
    periods: PeriodTally,
    quarter: TrailingQuarter,
}

impl RecordSink for CombinedReports {
    fn observe(&mut self, record: &Record) {
        self.monthly.observe(record);
        self.periods.observe(record);
        self.quarter.observe(record);
    }
}

impl Report for CombinedReports {
    type Output = ReportSet;

    fn finish(self) -> ReportSet {
        ReportSet {
            monthly: self.monthly.finish(),
            periods: self.periods.finish(),
            daily_average: self.quarter.finish(),
        }
    }
}

/// Aggregator for computing reports over an in-memory record collection
pub struct Aggregator;

impl Aggregator {
    /// Run any report over a record slice
    pub fn run<R: Report>(records: &[Record]) -> R::Output {
        let mut report = R::default();
        for record in records {
            report.observe(record);
        }
        report.finish()
    }

    /// Summary occurrences per month, every month between the first and last period present
    pub fn monthly(records: &[Record]) -> MonthlyCounts {
        Self::run::<MonthHistogram>(records)
    }

    /// Document totals per period label (only periods present)
    pub fn periods(records: &[Record]) -> PeriodTotals {
        Self::run::<PeriodTally>(records)
    }

    /// Average documents per day over the trailing quarter (0 for no records)
    pub fn daily_average(records: &[Record]) -> u64 {
        Self::run::<TrailingQuarter>(records)
    }

    /// All three reports in one pass
    pub fn all(records: &[Record]) -> ReportSet {
        Self::run::<CombinedReports>(records)
    }
}
