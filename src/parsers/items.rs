//! `{"items": [...]}` payload parser
//!
//! Two ingestion paths share the same record type:
//! - streaming: `serde_json` reads from any `io::Read`, visiting the `items`
//!   array element by element; nothing but the current record is held
//! - in-memory: `simd-json` decodes a mutable byte buffer (tape parsing needs
//!   the whole document resident)

use crate::parsers::RecordSink;
use crate::types::{Record, Result};
use serde::de::{DeserializeSeed, Deserializer, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::debug;

/// Top-level keys of the payload; everything but `items` is skipped
#[derive(Deserialize)]
#[serde(field_identifier, rename_all = "lowercase")]
enum PayloadField {
    Items,
    #[serde(other)]
    Other,
}

/// Feeds each element of the `items` array to a sink, returning the record count
struct PayloadSeed<'s, S: ?Sized> {
    sink: &'s mut S,
}

impl<'de, S: RecordSink + ?Sized> DeserializeSeed<'de> for PayloadSeed<'_, S> {
    type Value = u64;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<u64, D::Error> {
        deserializer.deserialize_map(self)
    }
}

impl<'de, S: RecordSink + ?Sized> Visitor<'de> for PayloadSeed<'_, S> {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an object with an `items` array")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> std::result::Result<u64, A::Error> {
        let mut count = 0u64;
        while let Some(field) = map.next_key::<PayloadField>()? {
            match field {
                PayloadField::Items => {
                    count += map.next_value_seed(ItemsSeed {
                        sink: &mut *self.sink,
                    })?;
                }
                PayloadField::Other => {
                    map.next_value::<IgnoredAny>()?;
                }
            }
        }
        Ok(count)
    }
}

struct ItemsSeed<'s, S: ?Sized> {
    sink: &'s mut S,
}

impl<'de, S: RecordSink + ?Sized> DeserializeSeed<'de> for ItemsSeed<'_, S> {
    type Value = u64;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> std::result::Result<u64, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de, S: RecordSink + ?Sized> Visitor<'de> for ItemsSeed<'_, S> {
    type Value = u64;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of account records")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<u64, A::Error> {
        let mut count = 0u64;
        while let Some(record) = seq.next_element::<Record>()? {
            self.sink.observe(&record);
            count += 1;
        }
        Ok(count)
    }
}

#[derive(Deserialize)]
struct Payload {
    #[serde(default)]
    items: Vec<Record>,
}

/// Parser for `items` payloads
pub struct ItemsParser;

impl ItemsParser {
    /// Stream records from a reader into `sink`. Returns the number of records seen.
    pub fn scan_reader<R: Read, S: RecordSink + ?Sized>(reader: R, sink: &mut S) -> Result<u64> {
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        let count = PayloadSeed { sink }.deserialize(&mut deserializer)?;
        deserializer.end()?;
        debug!(records = count, "streamed payload");
        Ok(count)
    }

    /// Stream records from a file on disk (bounded memory)
    pub fn scan_file<S: RecordSink + ?Sized>(path: &Path, sink: &mut S) -> Result<u64> {
        let file = File::open(path)?;
        debug!(path = %path.display(), "streaming payload");
        Self::scan_reader(BufReader::new(file), sink)
    }

    /// Visit records of an in-memory buffer with simd-json.
    /// The buffer is used as scratch space and is clobbered.
    pub fn scan_slice<S: RecordSink + ?Sized>(bytes: &mut [u8], sink: &mut S) -> Result<u64> {
        let mut deserializer = simd_json::Deserializer::from_slice(bytes)?;
        let count = PayloadSeed { sink }.deserialize(&mut deserializer)?;
        debug!(records = count, "scanned in-memory payload");
        Ok(count)
    }

    /// Read the whole file, then visit its records with simd-json
    pub fn scan_file_in_memory<S: RecordSink + ?Sized>(path: &Path, sink: &mut S) -> Result<u64> {
        let mut bytes = std::fs::read(path)?;
        debug!(path = %path.display(), bytes = bytes.len(), "loaded payload");
        Self::scan_slice(&mut bytes, sink)
    }

    /// Decode an in-memory buffer into the full record collection
    pub fn parse_slice(bytes: &mut [u8]) -> Result<Vec<Record>> {
        let payload: Payload = simd_json::from_slice(bytes)?;
        Ok(payload.items)
    }

    /// Decode a file into the full record collection
    pub fn parse_file(path: &Path) -> Result<Vec<Record>> {
        let mut bytes = std::fs::read(path)?;
        Self::parse_slice(&mut bytes)
    }
}
