use chrono::{NaiveDate, NaiveDateTime};
use log::info;

use crate::config::{AggregateResult, AttendanceErrors};

#[derive(PartialEq, Debug, Clone)]
pub struct ReportTotals {
    pub total_attendance: usize,
    pub distinct_people: usize,
    pub distinct_days: usize,
    pub mean_per_day: f64,
}

#[derive(PartialEq, Debug, Clone)]
pub struct RankedRow {
    /// Starts at 1.
    pub position: usize,
    pub name: String,
    pub attendance_count: usize,
    pub frequency_percent: f64,
}

/// A snapshot of the results, ready to be rendered in any format.
#[derive(PartialEq, Debug, Clone)]
pub struct ReportModel {
    pub title: String,
    pub author: Option<String>,
    pub period: String,
    pub generated_at: NaiveDateTime,
    pub totals: ReportTotals,
    pub top_n: usize,
    /// At most `top_n` rows, in ranking order.
    pub ranking: Vec<RankedRow>,
}

/// `15/01/2024 - 22/01/2024`
pub fn period_label(start: NaiveDate, end: NaiveDate) -> String {
    format!("{} - {}", start.format("%d/%m/%Y"), end.format("%d/%m/%Y"))
}

/// Assembles the summary report. A blank author is treated as no author.
///
/// `generated_at` is usually `Session::now`.
pub fn build_report(
    aggregate: &AggregateResult,
    top_n: usize,
    period: &str,
    title: &str,
    author: Option<&str>,
    generated_at: NaiveDateTime,
) -> Result<ReportModel, AttendanceErrors> {
    if top_n == 0 {
        return Err(AttendanceErrors::InvalidTopN(top_n));
    }
    let ranking: Vec<RankedRow> = aggregate
        .top(top_n)
        .iter()
        .enumerate()
        .map(|(idx, row)| RankedRow {
            position: idx + 1,
            name: row.name.clone(),
            attendance_count: row.attendance_count,
            frequency_percent: row.frequency_percent,
        })
        .collect();
    info!(
        "build_report: {:?} for {}, {} ranked people",
        title,
        period,
        ranking.len()
    );
    Ok(ReportModel {
        title: title.to_string(),
        author: author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        period: period.to_string(),
        generated_at,
        totals: ReportTotals {
            total_attendance: aggregate.total_attendance,
            distinct_people: aggregate.distinct_people,
            distinct_days: aggregate.distinct_days,
            mean_per_day: aggregate.mean_per_day,
        },
        top_n,
        ranking,
    })
}
