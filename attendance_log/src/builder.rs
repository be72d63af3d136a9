use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{debug, info, warn};

pub use crate::config::*;
use crate::corrections::{Clock, CorrectionLog, SystemClock};
use crate::names::normalize_name;
use crate::Session;

const DATE_TIME_FORMATS: [&str; 12] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%d/%m/%Y"];

/// Parses the timestamp of a check-in.
///
/// Slashed dates are read day first (`15/01/2024`). A date without a time is read as
/// midnight. Time zones, when present, are dropped after conversion to the local time
/// of the offset.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATE_TIME_FORMATS.iter() {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .find_map(|d| d.and_hms_opt(0, 0, 0))
}

/// A builder for assembling a working set of check-ins.
///
/// Names are normalized once, when they are first seen. Records with a timestamp that
/// cannot be understood are dropped and counted.
///
/// ```
/// use attendance_log::builder::Builder;
/// use attendance_log::AttendanceFilter;
///
/// let mut builder = Builder::new();
/// builder.add_simple("2024-01-15 19:00", "joão  silva");
/// builder.add_simple("2024-01-15 19:05", "MARIA santos");
/// builder.add_simple("2024-01-22 18:55", "João Silva");
/// builder.add_simple("not a date", "Carla");
///
/// let session = builder.build();
/// assert_eq!(session.ingest_stats().dropped_timestamps.len(), 1);
///
/// let result = session.aggregate_with(&AttendanceFilter::ALL);
/// assert_eq!(result.distinct_days, 2);
/// assert_eq!(result.per_person[0].name, "João Silva");
/// assert_eq!(result.per_person[0].frequency_percent, 100.0);
/// ```
pub struct Builder {
    pub(crate) _records: Vec<AttendanceRecord>,
    pub(crate) _base_names: HashMap<String, String>,
    pub(crate) _stats: IngestStats,
    pub(crate) _clock: Box<dyn Clock>,
}

impl Default for Builder {
    fn default() -> Self {
        Builder::new()
    }
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _records: Vec::new(),
            _base_names: HashMap::new(),
            _stats: IngestStats::default(),
            _clock: Box::new(SystemClock),
        }
    }

    /// The clock used to stamp the corrections of the session.
    pub fn clock(self, clock: Box<dyn Clock>) -> Builder {
        Builder {
            _clock: clock,
            ..self
        }
    }

    /// Adds a check-in with only a timestamp and a name.
    pub fn add_simple(&mut self, timestamp: &str, name: &str) -> bool {
        self.add_record(RawRecord {
            timestamp: RawTimestamp::Text(timestamp.to_string()),
            name: Some(name.to_string()),
            auxiliary: AuxiliaryFields::default(),
        })
    }

    /// Adds a check-in. Returns false if it was dropped because of its timestamp.
    ///
    /// Blank names are recorded as missing.
    pub fn add_record(&mut self, record: RawRecord) -> bool {
        self._stats.received += 1;
        let timestamp = match &record.timestamp {
            RawTimestamp::Native(dt) => Some(*dt),
            RawTimestamp::Text(s) => parse_timestamp(s),
        };
        let timestamp = match timestamp {
            Some(ts) => ts,
            None => {
                let shown = match record.timestamp {
                    RawTimestamp::Text(s) => s,
                    RawTimestamp::Native(dt) => dt.to_string(),
                };
                warn!(
                    "add_record: record #{}: dropping unparseable timestamp {:?}",
                    self._stats.received, shown
                );
                self._stats.dropped_timestamps.push(shown);
                return false;
            }
        };

        let raw_name = record.name.filter(|n| !n.trim().is_empty());
        match &raw_name {
            Some(name) => {
                if !self._base_names.contains_key(name) {
                    let normalized = normalize_name(name);
                    debug!("add_record: {:?} -> {:?}", name, normalized);
                    self._base_names.insert(name.clone(), normalized);
                }
            }
            None => {
                self._stats.missing_names += 1;
            }
        }

        self._stats.accepted += 1;
        self._records.push(AttendanceRecord {
            timestamp,
            raw_name,
            auxiliary: record.auxiliary,
        });
        true
    }

    pub fn stats(&self) -> &IngestStats {
        &self._stats
    }

    /// The working set, ready for corrections and aggregations.
    pub fn build(self) -> Session {
        info!(
            "build: {} records received, {} accepted, {} dropped, {} distinct raw names",
            self._stats.received,
            self._stats.accepted,
            self._stats.dropped_timestamps.len(),
            self._base_names.len()
        );
        Session {
            records: self._records,
            base_names: self._base_names,
            corrections: CorrectionLog::with_clock(self._clock),
            filter: AttendanceFilter::ALL,
            ingest_stats: self._stats,
        }
    }

    /// Like `build`, but fails when no record was accepted.
    pub fn try_build(self) -> Result<Session, AttendanceErrors> {
        if self._records.is_empty() {
            warn!(
                "try_build: none of the {} records has a valid timestamp",
                self._stats.received
            );
            return Err(AttendanceErrors::EmptyDataset);
        }
        Ok(self.build())
    }
}
