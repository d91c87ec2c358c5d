//! Report result types

use crate::types::{DocumentCounts, YearMonth};
use serde::Serialize;
use std::collections::BTreeMap;

/// Summary occurrences per month over a contiguous month range (ascending)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct MonthlyCounts(BTreeMap<YearMonth, u64>);

impl MonthlyCounts {
    pub fn get(&self, month: YearMonth) -> Option<u64> {
        self.0.get(&month).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (YearMonth, u64)> + '_ {
        self.0.iter().map(|(month, count)| (*month, *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum over all months
    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }
}

impl From<BTreeMap<YearMonth, u64>> for MonthlyCounts {
    fn from(counts: BTreeMap<YearMonth, u64>) -> Self {
        Self(counts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DocumentTotals {
    pub incomes: u64,
    pub expenses: u64,
    pub total: u64,
}

impl DocumentTotals {
    pub fn add(&mut self, documents: &DocumentCounts) {
        self.incomes = self.incomes.saturating_add(documents.incomes);
        self.expenses = self.expenses.saturating_add(documents.expenses);
        self.total = self
            .total
            .saturating_add(documents.incomes.saturating_add(documents.expenses));
    }
}

impl From<&DocumentCounts> for DocumentTotals {
    fn from(documents: &DocumentCounts) -> Self {
        let mut totals = Self::default();
        totals.add(documents);
        totals
    }
}

/// Document totals keyed by the period label exactly as it appeared in the input
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct PeriodTotals(BTreeMap<String, DocumentTotals>);

impl PeriodTotals {
    pub fn get(&self, period: &str) -> Option<&DocumentTotals> {
        self.0.get(period)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DocumentTotals)> {
        self.0.iter().map(|(period, totals)| (period.as_str(), totals))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, DocumentTotals)> for PeriodTotals {
    fn from_iter<I: IntoIterator<Item = (String, DocumentTotals)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// All three reports, as produced by a single pass
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportSet {
    pub monthly: MonthlyCounts,
    pub periods: PeriodTotals,
    pub daily_average: u64,
}
