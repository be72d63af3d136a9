// Secondary views of a session: refined rankings, search and data quality.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, info};

use crate::config::*;
use crate::corrections::CanonicalNameResolver;
use crate::names::SimilarityDetector;
use crate::{filtered_records, frequency_percent, Session};

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum SortKey {
    /// Decreasing attendance, then name.
    Attendance,
    /// Decreasing frequency, then name.
    Frequency,
    Name,
}

impl SortKey {
    pub fn from_name(name: &str) -> Option<SortKey> {
        match name.to_lowercase().as_str() {
            "attendance" | "count" => Some(SortKey::Attendance),
            "frequency" => Some(SortKey::Frequency),
            "name" => Some(SortKey::Name),
            _ => None,
        }
    }
}

/// Keeps the rows reaching both minimums, ordered by `sort_by`.
pub fn refine(
    rows: &[AggregateRow],
    min_count: usize,
    min_frequency: f64,
    sort_by: SortKey,
) -> Vec<AggregateRow> {
    let mut res: Vec<AggregateRow> = rows
        .iter()
        .filter(|r| r.attendance_count >= min_count && r.frequency_percent >= min_frequency)
        .cloned()
        .collect();
    match sort_by {
        SortKey::Attendance => res.sort_by(|a, b| {
            b.attendance_count
                .cmp(&a.attendance_count)
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortKey::Frequency => res.sort_by(|a, b| {
            b.frequency_percent
                .partial_cmp(&a.frequency_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.name.cmp(&b.name))
        }),
        SortKey::Name => res.sort_by(|a, b| a.name.cmp(&b.name)),
    }
    debug!("refine: {} of {} rows kept", res.len(), rows.len());
    res
}

/// The number of people in a range of frequencies.
#[derive(PartialEq, Debug, Clone)]
pub struct FrequencyBand {
    pub label: &'static str,
    /// Exclusive, except for the first band which starts at 0 included.
    pub lower: f64,
    /// Inclusive
    pub upper: f64,
    pub count: usize,
}

const BANDS: [(&str, f64, f64); 4] = [
    ("0-25%", 0.0, 25.0),
    ("26-50%", 25.0, 50.0),
    ("51-75%", 50.0, 75.0),
    ("76-100%", 75.0, 100.0),
];

/// Distribution of the people by frequency of attendance.
pub fn frequency_bands(rows: &[AggregateRow]) -> Vec<FrequencyBand> {
    BANDS
        .iter()
        .enumerate()
        .map(|(idx, (label, lower, upper))| {
            let count = rows
                .iter()
                .filter(|r| {
                    let f = r.frequency_percent;
                    let above = if idx == 0 { f >= *lower } else { f > *lower };
                    above && f <= *upper
                })
                .count();
            FrequencyBand {
                label: *label,
                lower: *lower,
                upper: *upper,
                count,
            }
        })
        .collect()
}

/// Looks for people by a part of their name and/or by an explicit list of names.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct SearchQuery {
    /// Case-insensitive fragment of the effective name.
    pub text: Option<String>,
    pub names: Vec<String>,
}

impl SearchQuery {
    pub fn is_empty(&self) -> bool {
        self.fragment().is_none() && self.names.is_empty()
    }

    fn fragment(&self) -> Option<String> {
        self.text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct SearchRow {
    pub name: String,
    pub attendance_count: usize,
    /// The first phone number seen for this person.
    pub phone: Option<String>,
    pub frequency_percent: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct SearchResult {
    pub matched_records: usize,
    /// By name.
    pub rows: Vec<SearchRow>,
}

/// Searches the records passing the filter.
///
/// The frequencies are computed against the distinct days of the filtered records,
/// not only of the matched ones. An empty query matches nothing.
pub fn search(
    records: &[AttendanceRecord],
    resolver: &CanonicalNameResolver,
    filter: &AttendanceFilter,
    query: &SearchQuery,
) -> SearchResult {
    let selected = filtered_records(records, resolver, filter);
    let distinct_days = selected
        .iter()
        .map(|(r, _)| r.date())
        .collect::<BTreeSet<_>>()
        .len();

    if query.is_empty() {
        return SearchResult {
            matched_records: 0,
            rows: Vec::new(),
        };
    }
    let fragment = query.fragment();
    let wanted: BTreeSet<&str> = query.names.iter().map(|s| s.as_str()).collect();

    let mut matched_records: usize = 0;
    let mut by_name: BTreeMap<String, (usize, Option<String>)> = BTreeMap::new();
    for (record, name) in selected.into_iter() {
        let name = match name {
            Some(n) => n,
            None => continue,
        };
        if let Some(f) = &fragment {
            if !name.to_lowercase().contains(f.as_str()) {
                continue;
            }
        }
        if !wanted.is_empty() && !wanted.contains(name.as_str()) {
            continue;
        }
        matched_records += 1;
        let entry = by_name.entry(name).or_insert((0, None));
        entry.0 += 1;
        if entry.1.is_none() {
            entry.1 = record
                .auxiliary
                .phone
                .clone()
                .filter(|p| !p.trim().is_empty());
        }
    }

    info!(
        "search: {:?} matched {} records for {} people",
        query,
        matched_records,
        by_name.len()
    );
    SearchResult {
        matched_records,
        rows: by_name
            .into_iter()
            .map(|(name, (attendance_count, phone))| SearchRow {
                name,
                attendance_count,
                phone,
                frequency_percent: frequency_percent(attendance_count, distinct_days),
            })
            .collect(),
    }
}

/// Health indicators of the working set, after corrections.
#[derive(PartialEq, Debug, Clone)]
pub struct DataQualityReport {
    /// Records whose effective name differs from the raw name.
    pub standardized_records: usize,
    /// Distinct `raw -> effective` changes, in order of appearance.
    pub examples: Vec<(String, String)>,
    pub unique_names: usize,
    /// Names that appear in exactly one record.
    pub single_attendance_names: usize,
    pub empty_records: usize,
    pub dropped_timestamps: usize,
    pub similar_pairs_total: usize,
    /// The most similar pairs.
    pub similar_pairs: Vec<SimilarityPair>,
    /// The most frequent names over the whole working set.
    pub top_names: Vec<(String, usize)>,
}

pub fn data_quality(session: &Session, rules: &QualityRules) -> DataQualityReport {
    let resolver = session.resolver();
    let mut standardized_records: usize = 0;
    let mut examples: Vec<(String, String)> = Vec::new();
    for record in session.records().iter() {
        let raw = match record.raw_name.as_deref() {
            Some(raw) => raw,
            None => continue,
        };
        let effective = match resolver.resolve(Some(raw)) {
            Some(e) => e,
            None => continue,
        };
        if raw != effective {
            standardized_records += 1;
            let example = (raw.to_string(), effective);
            if examples.len() < rules.example_limit && !examples.contains(&example) {
                examples.push(example);
            }
        }
    }

    let overall = session.aggregate_with(&AttendanceFilter::ALL);
    let names: Vec<&str> = overall.per_person.iter().map(|r| r.name.as_str()).collect();
    let pairs = SimilarityDetector::new()
        .threshold(rules.similarity_threshold)
        .find_similar(names.iter().copied());

    let report = DataQualityReport {
        standardized_records,
        examples,
        unique_names: overall.distinct_people,
        single_attendance_names: overall
            .per_person
            .iter()
            .filter(|r| r.attendance_count == 1)
            .count(),
        empty_records: overall.empty_records,
        dropped_timestamps: session.ingest_stats().dropped_timestamps.len(),
        similar_pairs_total: pairs.len(),
        similar_pairs: pairs
            .into_iter()
            .take(rules.similar_preview_limit)
            .collect(),
        top_names: overall
            .top(rules.top_names_limit)
            .iter()
            .map(|r| (r.name.clone(), r.attendance_count))
            .collect(),
    };
    info!(
        "data_quality: {} standardized records, {} similar pairs",
        report.standardized_records, report.similar_pairs_total
    );
    report
}
