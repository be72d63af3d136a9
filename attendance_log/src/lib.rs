mod config;
pub mod builder;
pub mod corrections;
pub mod insights;
pub mod manual;
pub mod names;
pub mod report;

use log::{debug, info, warn};

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{NaiveDate, NaiveDateTime};

pub use crate::config::*;
pub use crate::corrections::{CanonicalNameResolver, Clock, CorrectionLog, FixedClock, SystemClock};
pub use crate::names::{find_similar, normalize, normalize_name, SimilarityDetector};

/// The state owned by one operator: the working set and the corrections made to it.
///
/// The records are never modified. Every query resolves the names against the
/// current corrections and recomputes its result from scratch.
#[derive(Debug)]
pub struct Session {
    pub(crate) records: Vec<AttendanceRecord>,
    // raw name -> normalized name, computed once at ingestion.
    pub(crate) base_names: HashMap<String, String>,
    pub(crate) corrections: CorrectionLog,
    pub(crate) filter: AttendanceFilter,
    pub(crate) ingest_stats: IngestStats,
}

/// The actions of an operator on a session.
#[derive(PartialEq, Debug, Clone)]
pub enum SessionCommand {
    ApplyCorrection { from: String, to: String },
    ResetCorrections,
    SetFilter(AttendanceFilter),
}

#[derive(PartialEq, Debug, Clone)]
pub enum CommandOutcome {
    Applied(CorrectionEntry),
    /// The correction was recorded, but no record carries this name.
    NameNotFound(CorrectionEntry),
    Reset {
        cleared: usize,
    },
    FilterChanged,
}

/// The state of a session after a command.
#[derive(PartialEq, Debug, Clone)]
pub struct SessionSnapshot {
    pub outcome: CommandOutcome,
    pub aggregate: AggregateResult,
    pub corrections: Vec<CorrectionEntry>,
}

impl Session {
    pub fn records(&self) -> &[AttendanceRecord] {
        &self.records
    }

    pub fn ingest_stats(&self) -> &IngestStats {
        &self.ingest_stats
    }

    pub fn corrections(&self) -> &CorrectionLog {
        &self.corrections
    }

    /// The current time, as seen by the session. Stamps corrections and reports.
    pub fn now(&self) -> NaiveDateTime {
        self.corrections.now()
    }

    /// The filter used by `aggregate`.
    pub fn filter(&self) -> &AttendanceFilter {
        &self.filter
    }

    pub fn set_filter(&mut self, filter: AttendanceFilter) {
        debug!("set_filter: {:?}", filter);
        self.filter = filter;
    }

    /// A resolver reflecting the current corrections.
    pub fn resolver(&self) -> CanonicalNameResolver<'_> {
        CanonicalNameResolver::new(&self.base_names, &self.corrections)
    }

    pub fn resolve(&self, raw_name: Option<&str>) -> Option<String> {
        self.resolver().resolve(raw_name)
    }

    /// The distinct effective names of the whole working set.
    pub fn effective_names(&self) -> BTreeSet<String> {
        let resolver = self.resolver();
        self.records
            .iter()
            .filter_map(|r| resolver.resolve(r.raw_name.as_deref()))
            .collect()
    }

    /// The number of records whose normalized name is the normalized form of `name`.
    pub fn count_normalized(&self, name: &str) -> usize {
        let resolver = self.resolver();
        let target = normalize_name(name);
        self.records
            .iter()
            .filter_map(|r| r.raw_name.as_deref())
            .filter(|raw| resolver.normalized(raw) == target)
            .count()
    }

    /// Merges `from` into `to` for all the records normalized to `from`.
    ///
    /// A correction of a name that matches no record is still recorded, with an
    /// affected count of zero.
    pub fn apply_correction(
        &mut self,
        from: &str,
        to: &str,
    ) -> Result<CorrectionEntry, AttendanceErrors> {
        let affected = self.count_normalized(from);
        if affected == 0 {
            warn!("apply_correction: name {:?} not found in the data", from);
        }
        self.corrections.apply(from, to, affected)
    }

    pub fn reset_corrections(&mut self) -> usize {
        self.corrections.reset()
    }

    /// Aggregates the working set under the active filter.
    pub fn aggregate(&self) -> AggregateResult {
        self.aggregate_with(&self.filter)
    }

    pub fn aggregate_with(&self, filter: &AttendanceFilter) -> AggregateResult {
        aggregate(&self.records, &self.resolver(), filter)
    }

    /// The candidate duplicates among the current effective names.
    pub fn similar_names(&self) -> Vec<SimilarityPair> {
        let names = self.effective_names();
        find_similar(names.iter().map(|s| s.as_str()))
    }

    /// The working set with the effective names, in ingestion order.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        let resolver = self.resolver();
        self.records
            .iter()
            .map(|r| ExportRow {
                timestamp: r.timestamp,
                raw_name: r.raw_name.clone(),
                effective_name: resolver.resolve(r.raw_name.as_deref()),
                auxiliary: r.auxiliary.clone(),
            })
            .collect()
    }

    /// Runs a command and returns the recomputed state.
    ///
    /// An invalid correction leaves the session untouched.
    pub fn execute(
        &mut self,
        command: SessionCommand,
    ) -> Result<SessionSnapshot, AttendanceErrors> {
        info!("execute: {:?}", command);
        let outcome = match command {
            SessionCommand::ApplyCorrection { from, to } => {
                let entry = self.apply_correction(&from, &to)?;
                if entry.affected_count == 0 {
                    CommandOutcome::NameNotFound(entry)
                } else {
                    CommandOutcome::Applied(entry)
                }
            }
            SessionCommand::ResetCorrections => CommandOutcome::Reset {
                cleared: self.reset_corrections(),
            },
            SessionCommand::SetFilter(filter) => {
                self.set_filter(filter);
                CommandOutcome::FilterChanged
            }
        };
        Ok(self.snapshot(outcome))
    }

    fn snapshot(&self, outcome: CommandOutcome) -> SessionSnapshot {
        SessionSnapshot {
            outcome,
            aggregate: self.aggregate(),
            corrections: self.corrections.entries().to_vec(),
        }
    }
}

/// The records passing the filter, with their effective names.
pub(crate) fn filtered_records<'r>(
    records: &'r [AttendanceRecord],
    resolver: &CanonicalNameResolver,
    filter: &AttendanceFilter,
) -> Vec<(&'r AttendanceRecord, Option<String>)> {
    records
        .iter()
        .filter(|r| filter.accepts_date(r.date()))
        .map(|r| (r, resolver.resolve(r.raw_name.as_deref())))
        .filter(|(_, name)| filter.accepts_name(name.as_deref()))
        .collect()
}

/// Percentage of the days attended, rounded to one decimal. 0 when there are no days.
pub fn frequency_percent(attendance_count: usize, distinct_days: usize) -> f64 {
    if distinct_days == 0 {
        0.0
    } else {
        round_one_decimal(attendance_count as f64 / distinct_days as f64 * 100.0)
    }
}

// Halves go to the even neighbour: 6.25 -> 6.2, 18.75 -> 18.8.
fn round_one_decimal(x: f64) -> f64 {
    let scaled = x * 10.0;
    let rounded = if (scaled - scaled.trunc()).abs() == 0.5 {
        2.0 * (scaled / 2.0).round()
    } else {
        scaled.round()
    };
    rounded / 10.0
}

/// Computes the attendance statistics of the records that pass the filter.
///
/// Records without a name count in the totals and in the days, but in no person's row.
///
/// Arguments:
/// * `records` the working set
/// * `resolver` gives the effective name of each record
/// * `filter` the dates and the people to consider
pub fn aggregate(
    records: &[AttendanceRecord],
    resolver: &CanonicalNameResolver,
    filter: &AttendanceFilter,
) -> AggregateResult {
    info!("aggregate: processing {} records", records.len());
    let selected = filtered_records(records, resolver, filter);

    let mut per_person: HashMap<String, usize> = HashMap::new();
    let mut per_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    let mut empty_records: usize = 0;
    for (record, name) in selected.iter() {
        *per_day.entry(record.date()).or_insert(0) += 1;
        match name {
            Some(n) => *per_person.entry(n.clone()).or_insert(0) += 1,
            None => empty_records += 1,
        }
    }

    let total_attendance = selected.len();
    let distinct_days = per_day.len();
    let mean_per_day = if distinct_days == 0 {
        0.0
    } else {
        total_attendance as f64 / distinct_days as f64
    };

    let mut rows: Vec<AggregateRow> = per_person
        .into_iter()
        .map(|(name, attendance_count)| AggregateRow {
            name,
            attendance_count,
            frequency_percent: frequency_percent(attendance_count, distinct_days),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.attendance_count
            .cmp(&a.attendance_count)
            .then_with(|| a.name.cmp(&b.name))
    });

    debug!(
        "aggregate: {} selected, {} people, {} days, {} without name",
        total_attendance,
        rows.len(),
        distinct_days,
        empty_records
    );
    AggregateResult {
        total_attendance,
        distinct_people: rows.len(),
        distinct_days,
        empty_records,
        mean_per_day,
        per_person: rows,
        per_day: per_day.into_iter().collect(),
    }
}
