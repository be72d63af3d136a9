// ********* Input data structures ***********

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::Display;

use chrono::{NaiveDate, NaiveDateTime};

/// The columns of a check-in that are not interpreted by the core.
///
/// They are carried through unchanged from ingestion to export.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AuxiliaryFields {
    /// How the participant heard about the group.
    pub how_found: Option<String>,
    /// Whether this is the first visit of the participant (free text, usually yes/no).
    pub first_time: Option<String>,
    pub phone: Option<String>,
    /// All the other columns of the source, in the order of the source header.
    pub other: Vec<(String, String)>,
}

/// The time of a check-in, as provided by a reader.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum RawTimestamp {
    /// Some text that still needs to be parsed. It may not be valid.
    Text(String),
    /// A date-time already decoded by the reader (spreadsheet cells for example).
    Native(NaiveDateTime),
}

/// A check-in, as parsed by the readers.
/// This is before validating the timestamp and normalizing the name.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRecord {
    pub timestamp: RawTimestamp,
    /// The name as typed by the participant. `None` if the cell was missing.
    pub name: Option<String>,
    pub auxiliary: AuxiliaryFields,
}

/// A validated check-in of the working set.
///
/// Records are never modified after ingestion: the name displayed for a record
/// is always derived from `raw_name` by the resolver.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct AttendanceRecord {
    pub timestamp: NaiveDateTime,
    /// The original free-text name, kept for audit. `None` is the missing marker.
    pub raw_name: Option<String>,
    pub auxiliary: AuxiliaryFields,
}

impl AttendanceRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Restricts the records taken into account by the aggregations.
///
/// A dimension set to `None` does not restrict anything. An empty selection of
/// people is treated the same way as no selection.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct AttendanceFilter {
    /// Inclusive range of dates.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Allowed effective names.
    pub people: Option<BTreeSet<String>>,
}

impl AttendanceFilter {
    pub const ALL: AttendanceFilter = AttendanceFilter {
        date_range: None,
        people: None,
    };

    pub fn with_dates(
        self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<AttendanceFilter, AttendanceErrors> {
        if start > end {
            return Err(AttendanceErrors::InvalidDateRange { start, end });
        }
        Ok(AttendanceFilter {
            date_range: Some((start, end)),
            people: self.people,
        })
    }

    pub fn with_people(self, people: &[String]) -> AttendanceFilter {
        AttendanceFilter {
            date_range: self.date_range,
            people: Some(people.iter().cloned().collect()),
        }
    }

    pub fn accepts_date(&self, date: NaiveDate) -> bool {
        match self.date_range {
            Some((start, end)) => start <= date && date <= end,
            None => true,
        }
    }

    /// Records with a missing name only pass when no selection of people is active.
    pub fn accepts_name(&self, effective_name: Option<&str>) -> bool {
        match &self.people {
            Some(selection) if !selection.is_empty() => {
                effective_name.map_or(false, |name| selection.contains(name))
            }
            _ => true,
        }
    }
}

// ******** Output data structures *********

/// Counters collected while building a working set.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct IngestStats {
    pub received: usize,
    pub accepted: usize,
    /// The timestamps that could not be understood. Their records were dropped.
    pub dropped_timestamps: Vec<String>,
    /// Accepted records without a name.
    pub missing_names: usize,
}

/// Two distinct names that probably refer to the same person.
#[derive(PartialEq, Debug, Clone)]
pub struct SimilarityPair {
    pub name_a: String,
    pub name_b: String,
    /// In [0.8, 1.0)
    pub score: f64,
}

/// One manual merge of a name into another.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct CorrectionEntry {
    pub timestamp: NaiveDateTime,
    pub from_name: String,
    pub to_name: String,
    /// The number of records of the working set that were renamed.
    /// Zero means that the name was not found.
    pub affected_count: usize,
}

/// A record of the working set with its current effective name, for export.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ExportRow {
    pub timestamp: NaiveDateTime,
    pub raw_name: Option<String>,
    pub effective_name: Option<String>,
    pub auxiliary: AuxiliaryFields,
}

/// Statistics for one person
#[derive(PartialEq, Debug, Clone)]
pub struct AggregateRow {
    pub name: String,
    pub attendance_count: usize,
    /// Rounded to one decimal.
    pub frequency_percent: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct AggregateResult {
    pub total_attendance: usize,
    pub distinct_people: usize,
    pub distinct_days: usize,
    /// Records without a name in the filtered set.
    pub empty_records: usize,
    pub mean_per_day: f64,
    /// By decreasing attendance, then by name.
    pub per_person: Vec<AggregateRow>,
    /// By increasing date.
    pub per_day: Vec<(NaiveDate, usize)>,
}

impl AggregateResult {
    /// The `n` first rows of the ranking.
    pub fn top(&self, n: usize) -> &[AggregateRow] {
        &self.per_person[..n.min(self.per_person.len())]
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.per_day.first().map(|(d, _)| *d)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.per_day.last().map(|(d, _)| *d)
    }
}

/// Errors that prevent an operation of the core from completing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum AttendanceErrors {
    /// A correction with an empty name, or with identical names.
    InvalidCorrection { from: String, to: String },
    EmptyDataset,
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
    InvalidTopN(usize),
}

impl Error for AttendanceErrors {}

impl Display for AttendanceErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AttendanceErrors::InvalidCorrection { from, to } => write!(
                f,
                "invalid correction {:?} -> {:?}: names must be non-empty and distinct",
                from, to
            ),
            AttendanceErrors::EmptyDataset => write!(f, "the working set contains no record"),
            AttendanceErrors::InvalidDateRange { start, end } => {
                write!(f, "the start date {} is after the end date {}", start, end)
            }
            AttendanceErrors::InvalidTopN(n) => {
                write!(f, "the size of the ranking must be positive, got {}", n)
            }
        }
    }
}

// ********* Configuration **********

/// Bounds used by the data-quality checks.
#[derive(PartialEq, Debug, Clone)]
pub struct QualityRules {
    /// Pairs of names scoring at least this value (and strictly below 1) are reported.
    pub similarity_threshold: f64,
    /// The number of `raw -> effective` examples to keep.
    pub example_limit: usize,
    /// The number of similar pairs to keep in the preview.
    pub similar_preview_limit: usize,
    /// The number of names in the list of most frequent names.
    pub top_names_limit: usize,
}

impl QualityRules {
    pub const DEFAULT_RULES: QualityRules = QualityRules {
        similarity_threshold: 0.8,
        example_limit: 5,
        similar_preview_limit: 5,
        top_names_limit: 20,
    };
}
