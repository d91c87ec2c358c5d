//! Payload parsing: turn an `items` export into records

mod items;

pub use items::ItemsParser;

use crate::types::Record;

/// Observes records one at a time, in payload order.
///
/// The streaming parser hands each decoded record to a sink and drops it,
/// so a sink's memory use is all that survives a pass.
pub trait RecordSink {
    fn observe(&mut self, record: &Record);
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn observe(&mut self, record: &Record) {
        (**self).observe(record);
    }
}

/// Collects every record (used when the whole collection is wanted in memory)
impl RecordSink for Vec<Record> {
    fn observe(&mut self, record: &Record) {
        self.push(record.clone());
    }
}
