//! Services for report aggregation

pub mod aggregator;
pub mod calendar;

pub use aggregator::{
    Aggregator, CombinedReports, MonthHistogram, PeriodTally, Report, TrailingQuarter,
};
pub use calendar::QuarterWindow;
