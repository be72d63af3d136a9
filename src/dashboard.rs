use log::{debug, info, warn};

use attendance_log::builder::Builder;
use attendance_log::insights::{
    data_quality, frequency_bands, refine, search, DataQualityReport, FrequencyBand, SearchQuery,
    SearchResult, SortKey,
};
use attendance_log::report::{build_report, period_label, ReportModel};
use attendance_log::*;
use snafu::{prelude::*, Snafu};

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::dashboard::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_xlsx;

pub const DEFAULT_TITLE: &str = "Relatório de Frequência";

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DashboardError {
    #[snafu(display("Error opening file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The workbook {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name:?} not found in {path}"))]
    MissingWorksheet { name: String, path: String },

    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing line {lineno} of the CSV file"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Error writing the CSV file {path}"))]
    CsvWrite { source: csv::Error, path: String },

    #[snafu(display("Missing columns {columns:?} in the header of {path}"))]
    MissingColumns { columns: Vec<String>, path: String },
    #[snafu(display("No check-in found in {path}"))]
    EmptyInput { path: String },
    #[snafu(display("No input file: use --input or inputSource.filePath in the configuration"))]
    MissingInput {},
    #[snafu(display("Unknown input type {provider:?} (expected csv or xlsx)"))]
    UnknownProvider { provider: String },

    #[snafu(display("Error reading {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },

    #[snafu(display("Invalid date {text:?}, expected YYYY-MM-DD"))]
    InvalidDate {
        source: chrono::ParseError,
        text: String,
    },
    #[snafu(display("Invalid correction {text:?}, expected FROM=>TO"))]
    CorrectionSyntax { text: String },
    #[snafu(display("Unknown sort order {text:?} (expected attendance, frequency or name)"))]
    InvalidSortKey { text: String },
    #[snafu(display("The size of the ranking must be between 5 and 50, got {top_n}"))]
    TopNOutOfRange { top_n: usize },
    #[snafu(display("{source}"))]
    Attendance { source: AttendanceErrors },

    #[snafu(display("Error writing {path}"))]
    Writing {
        source: std::io::Error,
        path: String,
    },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type DashResult<T> = Result<T, DashboardError>;
pub type BDashResult<T> = Result<T, Box<DashboardError>>;

/// The options of a run, after merging the command line into the configuration.
#[derive(PartialEq, Debug, Clone)]
pub struct RunSettings {
    pub input_path: String,
    pub provider: String,
    pub worksheet_name: Option<String>,
    pub labels: ColumnLabels,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub people: Vec<String>,
    /// Replayed in order: the configuration first, then the command line.
    pub corrections: Vec<CorrectionSetting>,
    pub search: Option<String>,
    pub min_count: usize,
    pub min_frequency: f64,
    pub sort_by: SortKey,
    pub top_n: usize,
    pub title: String,
    pub author: Option<String>,
    pub display: JSValue,
}

fn default_display() -> JSValue {
    json!({
        "pageTitle": "Dashboard Interativo - Frequência",
        "chartColors": ["#FF6B6B", "#FFE66D", "#4ECDC4", "#45B7D1"],
        "rankingChartHeight": 500
    })
}

fn infer_provider(path: &str) -> String {
    match Path::new(path).extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}

pub fn merge_settings(config: &DashboardConfig, args: &Args) -> BDashResult<RunSettings> {
    let input_path = args
        .input
        .clone()
        .or_else(|| config.input_source.file_path.clone())
        .context(MissingInputSnafu {})?;
    let provider = args
        .input_type
        .clone()
        .or_else(|| config.input_source.provider.clone())
        .unwrap_or_else(|| infer_provider(&input_path));

    let read_date = |cli: &Option<String>, cfg: &Option<String>| -> BDashResult<Option<NaiveDate>> {
        match cli.as_ref().or(cfg.as_ref()) {
            Some(s) => parse_date(s).map(Some),
            None => Ok(None),
        }
    };
    let start = read_date(&args.start, &config.filters.start_date)?;
    let end = read_date(&args.end, &config.filters.end_date)?;

    let mut corrections = config.corrections.clone();
    for text in args.corrections.iter() {
        corrections.push(parse_correction(text)?);
    }

    let sort_by = match &args.sort_by {
        Some(text) => SortKey::from_name(text).context(InvalidSortKeySnafu { text })?,
        None => SortKey::Attendance,
    };

    let top_n = args
        .top_n
        .or(config.output_settings.top_n)
        .unwrap_or(DEFAULT_TOP_N);
    if top_n < TOP_N_RANGE.0 || top_n > TOP_N_RANGE.1 {
        return Err(Box::new(DashboardError::TopNOutOfRange { top_n }));
    }

    Ok(RunSettings {
        input_path,
        provider,
        worksheet_name: args
            .worksheet
            .clone()
            .or_else(|| config.input_source.worksheet_name.clone()),
        labels: config.input_source.column_labels(),
        start,
        end,
        people: if args.people.is_empty() {
            config.filters.people.clone()
        } else {
            args.people.clone()
        },
        corrections,
        search: args.search.clone(),
        min_count: args.min_count.unwrap_or(0),
        min_frequency: args.min_frequency.unwrap_or(0.0),
        sort_by,
        top_n,
        title: args
            .title
            .clone()
            .or_else(|| config.output_settings.title.clone())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        author: args
            .author
            .clone()
            .or_else(|| config.output_settings.author.clone()),
        display: config.display.clone().unwrap_or_else(default_display),
    })
}

pub fn read_checkins(settings: &RunSettings) -> BDashResult<Vec<RawRecord>> {
    let path = settings.input_path.as_str();
    info!("Attempting to read check-ins from {:?}", path);
    let records = match settings.provider.as_str() {
        "csv" => io_csv::read_csv_checkins(path, &settings.labels)?,
        "xlsx" => io_xlsx::read_xlsx_checkins(
            path,
            settings.worksheet_name.as_deref(),
            &settings.labels,
        )?,
        x => {
            return Err(Box::new(DashboardError::UnknownProvider {
                provider: x.to_string(),
            }))
        }
    };
    if records.is_empty() {
        return Err(Box::new(DashboardError::EmptyInput {
            path: path.to_string(),
        }));
    }
    Ok(records)
}

/// Replays the corrections on the session. Unknown names are reported and kept in the log.
fn replay_corrections(session: &mut Session, corrections: &[CorrectionSetting]) -> BDashResult<()> {
    for c in corrections.iter() {
        let snapshot = session
            .execute(SessionCommand::ApplyCorrection {
                from: c.from.clone(),
                to: c.to.clone(),
            })
            .context(AttendanceSnafu {})?;
        match snapshot.outcome {
            CommandOutcome::NameNotFound(entry) => {
                warn!(
                    "Correction {:?} => {:?}: no check-in with this name",
                    entry.from_name, entry.to_name
                );
            }
            CommandOutcome::Applied(entry) => {
                info!(
                    "Correction {:?} => {:?}: {} check-ins renamed",
                    entry.from_name, entry.to_name, entry.affected_count
                );
            }
            other => debug!("replay_corrections: {:?}", other),
        }
    }
    Ok(())
}

/// The filter of the run. A missing bound is taken from the data.
fn make_filter(session: &Session, settings: &RunSettings) -> BDashResult<AttendanceFilter> {
    let dates: Vec<NaiveDate> = session.records().iter().map(|r| r.date()).collect();
    let filter = AttendanceFilter::ALL.with_people(&settings.people);
    let first = dates.iter().min().cloned();
    let last = dates.iter().max().cloned();
    // A bound given alone is completed with the data, without crossing it.
    let filter = match (settings.start, settings.end, first, last) {
        (Some(s), Some(e), _, _) => filter.with_dates(s, e).context(AttendanceSnafu {})?,
        (Some(s), None, _, Some(last)) => filter
            .with_dates(s, last.max(s))
            .context(AttendanceSnafu {})?,
        (None, Some(e), Some(first), _) => filter
            .with_dates(first.min(e), e)
            .context(AttendanceSnafu {})?,
        _ => filter,
    };
    Ok(filter)
}

fn rows_to_json(rows: &[AggregateRow]) -> Vec<JSValue> {
    rows.iter()
        .map(|r| {
            json!({
                "name": r.name,
                "attendanceCount": r.attendance_count,
                "frequencyPercent": r.frequency_percent
            })
        })
        .collect()
}

fn bands_to_json(bands: &[FrequencyBand]) -> Vec<JSValue> {
    bands
        .iter()
        .map(|b| json!({"band": b.label, "count": b.count}))
        .collect()
}

fn search_to_json(query: &str, res: &SearchResult) -> JSValue {
    let rows: Vec<JSValue> = res
        .rows
        .iter()
        .map(|r| {
            json!({
                "name": r.name,
                "attendanceCount": r.attendance_count,
                "phone": r.phone,
                "frequencyPercent": r.frequency_percent
            })
        })
        .collect();
    json!({"query": query, "matchedRecords": res.matched_records, "people": rows})
}

fn quality_to_json(q: &DataQualityReport) -> JSValue {
    let examples: Vec<JSValue> = q
        .examples
        .iter()
        .map(|(raw, effective)| json!({"original": raw, "standardized": effective}))
        .collect();
    let pairs: Vec<JSValue> = q
        .similar_pairs
        .iter()
        .map(|p| json!({"nameA": p.name_a, "nameB": p.name_b, "score": p.score}))
        .collect();
    let top: Vec<JSValue> = q
        .top_names
        .iter()
        .map(|(name, count)| json!({"name": name, "attendanceCount": count}))
        .collect();
    json!({
        "standardizedRecords": q.standardized_records,
        "examples": examples,
        "uniqueNames": q.unique_names,
        "singleAttendanceNames": q.single_attendance_names,
        "emptyRecords": q.empty_records,
        "droppedTimestamps": q.dropped_timestamps,
        "similarPairsTotal": q.similar_pairs_total,
        "similarPairs": pairs,
        "topNames": top
    })
}

fn report_to_json(report: &ReportModel) -> JSValue {
    let ranking: Vec<JSValue> = report
        .ranking
        .iter()
        .map(|r| {
            json!({
                "position": r.position,
                "name": r.name,
                "attendanceCount": r.attendance_count,
                "frequencyPercent": r.frequency_percent
            })
        })
        .collect();
    json!({
        "title": report.title,
        "author": report.author,
        "period": report.period,
        "generatedAt": report.generated_at.format("%d/%m/%Y %H:%M:%S").to_string(),
        "topN": report.top_n,
        "totals": {
            "totalAttendance": report.totals.total_attendance,
            "distinctPeople": report.totals.distinct_people,
            "distinctDays": report.totals.distinct_days,
            "meanPerDay": report.totals.mean_per_day
        },
        "ranking": ranking
    })
}

/// Computes the summary of a session.
///
/// Corrections are listed without their timestamps so that summaries can be compared
/// between runs.
pub fn build_summary_js(session: &Session, settings: &RunSettings) -> BDashResult<JSValue> {
    let aggregate = session.aggregate();
    let refined = refine(
        &aggregate.per_person,
        settings.min_count,
        settings.min_frequency,
        settings.sort_by,
    );
    let bands = frequency_bands(&aggregate.per_person);

    let period = match (aggregate.first_day(), aggregate.last_day()) {
        (Some(first), Some(last)) => period_label(first, last),
        _ => {
            let today = session.now().date();
            period_label(today, today)
        }
    };
    let report = build_report(
        &aggregate,
        settings.top_n,
        &period,
        &settings.title,
        settings.author.as_deref(),
        session.now(),
    )
    .context(AttendanceSnafu {})?;

    let search_js = match &settings.search {
        Some(text) => {
            let query = SearchQuery {
                text: Some(text.clone()),
                names: Vec::new(),
            };
            let res = search(
                session.records(),
                &session.resolver(),
                session.filter(),
                &query,
            );
            search_to_json(text, &res)
        }
        None => JSValue::Null,
    };

    let quality = data_quality(session, &QualityRules::DEFAULT_RULES);
    let per_day: Vec<JSValue> = aggregate
        .per_day
        .iter()
        .map(|(d, c)| json!({"date": d.format("%Y-%m-%d").to_string(), "count": c}))
        .collect();
    let corrections: Vec<JSValue> = session
        .corrections()
        .entries()
        .iter()
        .map(|e| {
            json!({
                "from": e.from_name,
                "to": e.to_name,
                "affectedCount": e.affected_count
            })
        })
        .collect();
    let stats = session.ingest_stats();

    Ok(json!({
        "report": report_to_json(&report),
        "emptyRecords": aggregate.empty_records,
        "perDay": per_day,
        "people": rows_to_json(&refined),
        "frequencyBands": bands_to_json(&bands),
        "corrections": corrections,
        "search": search_js,
        "dataQuality": quality_to_json(&quality),
        "ingest": {
            "received": stats.received,
            "accepted": stats.accepted,
            "droppedTimestamps": stats.dropped_timestamps
        },
        "display": settings.display
    }))
}

/// Loads the check-ins, replays the corrections and applies the filters.
pub fn prepare_session(settings: &RunSettings) -> BDashResult<Session> {
    let raw_records = read_checkins(settings)?;
    let mut builder = Builder::new();
    for r in raw_records {
        builder.add_record(r);
    }
    let mut session = builder.try_build().context(AttendanceSnafu {})?;
    replay_corrections(&mut session, &settings.corrections)?;
    let filter = make_filter(&session, settings)?;
    session
        .execute(SessionCommand::SetFilter(filter))
        .context(AttendanceSnafu {})?;
    Ok(session)
}

// The generation time changes with every run.
fn comparable_summary(summary: &JSValue) -> JSValue {
    let mut js = summary.clone();
    if let Some(report) = js.get_mut("report").and_then(JSValue::as_object_mut) {
        report.remove("generatedAt");
    }
    js
}

fn check_reference(reference_path: &str, summary: &JSValue) -> DashResult<()> {
    let summary_ref = match read_summary(reference_path) {
        Ok(js) => js,
        Err(e) => return Err(*e),
    };
    let pretty_js_summary_ref = serde_json::to_string_pretty(&comparable_summary(&summary_ref))
        .context(ParsingJsonSnafu {})?;
    let pretty_js_stats =
        serde_json::to_string_pretty(&comparable_summary(summary)).context(ParsingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference summary");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats.as_str(), "\n");
        whatever!("Difference detected between the computed summary and the reference summary")
    }
    Ok(())
}

fn write_output(out: &str, content: &str) -> BDashResult<()> {
    if out == "stdout" {
        println!("{}", content);
    } else {
        fs::write(out, content).context(WritingSnafu { path: out })?;
        info!("Summary written to {:?}", out);
    }
    Ok(())
}

pub fn run_dashboard(args: &Args) -> BDashResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => DashboardConfig::default(),
    };
    info!("config: {:?}", config);
    let settings = merge_settings(&config, args)?;
    debug!("settings: {:?}", settings);

    let session = prepare_session(&settings)?;
    let summary = build_summary_js(&session, &settings)?;
    let pretty_js_stats = serde_json::to_string_pretty(&summary).context(ParsingJsonSnafu {})?;

    let out = match (&args.out, &config.output_settings.output_directory) {
        (Some(out), _) => out.clone(),
        (None, Some(dir)) => {
            let p: PathBuf = [dir.as_str(), "summary.json"].iter().collect();
            p.display().to_string()
        }
        (None, None) => "stdout".to_string(),
    };
    write_output(&out, &pretty_js_stats)?;

    if let Some(export_path) = &args.export {
        io_csv::write_csv_export(export_path, &session.export_rows(), &settings.labels)?;
    }

    // The reference summary, if provided for comparison
    if let Some(reference_path) = &args.reference {
        check_reference(reference_path, &summary)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_path(name: &str) -> String {
        format!("{}/tests/data/{}", env!("CARGO_MANIFEST_DIR"), name)
    }

    fn args_for(input: &str) -> Args {
        Args {
            input: Some(data_path(input)),
            ..Args::default()
        }
    }

    #[test]
    fn merges_the_command_line_into_the_config() {
        let config = read_config(&data_path("config.json")).unwrap();
        let settings = merge_settings(&config, &Args::default()).unwrap();
        assert_eq!(settings.input_path, data_path("checkins.csv"));
        assert_eq!(settings.provider, "csv");
        assert_eq!(settings.top_n, 5);
        assert_eq!(settings.title, "Presença no grupo");
        assert_eq!(settings.corrections.len(), 1);

        let args = Args {
            top_n: Some(12),
            corrections: vec!["Carlos de Souza=>Carlos Souza".to_string()],
            title: Some("Janeiro".to_string()),
            ..Args::default()
        };
        let settings = merge_settings(&config, &args).unwrap();
        assert_eq!(settings.top_n, 12);
        assert_eq!(settings.title, "Janeiro");
        assert_eq!(settings.corrections.len(), 2);
        assert_eq!(settings.corrections[1].from, "Carlos de Souza");
    }

    #[test]
    fn rejects_bad_settings() {
        let config = DashboardConfig::default();
        let err = merge_settings(&config, &Args::default()).unwrap_err();
        assert!(matches!(*err, DashboardError::MissingInput {}));

        let args = Args {
            top_n: Some(3),
            ..args_for("checkins.csv")
        };
        let err = merge_settings(&config, &args).unwrap_err();
        assert!(matches!(*err, DashboardError::TopNOutOfRange { top_n: 3 }));

        let args = Args {
            sort_by: Some("age".to_string()),
            ..args_for("checkins.csv")
        };
        assert!(merge_settings(&config, &args).is_err());
    }

    #[test]
    fn runs_on_the_form_export() {
        let args = Args {
            corrections: vec!["Joao Silva=>João Silva".to_string()],
            search: Some("silva".to_string()),
            ..args_for("checkins.csv")
        };
        let settings = merge_settings(&DashboardConfig::default(), &args).unwrap();
        let session = prepare_session(&settings).unwrap();
        assert_eq!(session.ingest_stats().dropped_timestamps, vec!["ontem"]);

        let summary = build_summary_js(&session, &settings).unwrap();
        let report = &summary["report"];
        assert_eq!(report["period"], "15/01/2024 - 29/01/2024");
        assert_eq!(report["title"], DEFAULT_TITLE);
        assert!(report["generatedAt"].is_string());
        assert_eq!(report["totals"]["totalAttendance"], 8);
        assert_eq!(report["totals"]["distinctPeople"], 3);
        assert_eq!(report["ranking"][0]["name"], "João Silva");
        assert_eq!(report["ranking"][0]["attendanceCount"], 3);
        assert_eq!(report["ranking"][1]["name"], "Maria Santos");
        assert_eq!(report["ranking"][2]["frequencyPercent"], 33.3);
        assert_eq!(summary["emptyRecords"], 1);
        assert_eq!(summary["corrections"][0]["affectedCount"], 1);

        let search = &summary["search"];
        assert_eq!(search["matchedRecords"], 3);
        assert_eq!(search["people"][0]["phone"], "11987654321");
        assert_eq!(summary["dataQuality"]["similarPairsTotal"], 0);
    }

    #[test]
    fn filters_by_period_and_people() {
        let args = Args {
            start: Some("2024-01-20".to_string()),
            people: vec!["Maria Santos".to_string()],
            ..args_for("checkins.csv")
        };
        let settings = merge_settings(&DashboardConfig::default(), &args).unwrap();
        let session = prepare_session(&settings).unwrap();
        let aggregate = session.aggregate();
        assert_eq!(aggregate.total_attendance, 2);
        assert_eq!(aggregate.distinct_days, 2);
        assert_eq!(aggregate.per_person[0].frequency_percent, 100.0);
    }

    #[test]
    fn a_lone_bound_outside_the_data_selects_nothing() {
        for (start, end) in [(Some("2025-01-01"), None), (None, Some("2023-12-31"))] {
            let args = Args {
                start: start.map(str::to_string),
                end: end.map(str::to_string),
                ..args_for("checkins.csv")
            };
            let settings = merge_settings(&DashboardConfig::default(), &args).unwrap();
            let session = prepare_session(&settings).unwrap();
            let aggregate = session.aggregate();
            assert_eq!(aggregate.total_attendance, 0);
            assert!(aggregate.per_person.is_empty());
            assert!(build_summary_js(&session, &settings).is_ok());
        }
    }

    #[test]
    fn refuses_an_input_without_valid_check_ins() {
        let path = std::env::temp_dir().join("attlog_no_valid_checkins.csv");
        fs::write(&path, "Data/hora,Nome\nontem,Ana\n").unwrap();
        let args = Args {
            input: Some(path.display().to_string()),
            ..Args::default()
        };
        let settings = merge_settings(&DashboardConfig::default(), &args).unwrap();
        let err = prepare_session(&settings).unwrap_err();
        assert!(matches!(
            *err,
            DashboardError::Attendance {
                source: AttendanceErrors::EmptyDataset
            }
        ));
    }

    #[test]
    fn reports_similar_names_before_correction() {
        let settings = merge_settings(&DashboardConfig::default(), &args_for("checkins.csv")).unwrap();
        let session = prepare_session(&settings).unwrap();
        let summary = build_summary_js(&session, &settings).unwrap();
        let quality = &summary["dataQuality"];
        assert_eq!(quality["similarPairsTotal"], 1);
        assert_eq!(quality["similarPairs"][0]["nameA"], "Joao Silva");
        assert_eq!(quality["similarPairs"][0]["nameB"], "João Silva");
        assert_eq!(quality["uniqueNames"], 4);
        assert_eq!(summary["frequencyBands"][3]["count"], 1);
    }

    #[test]
    fn exports_and_checks_the_reference() {
        let dir = std::env::temp_dir();
        let export = dir.join("attlog_export_test.csv").display().to_string();
        let out = dir.join("attlog_summary_test.json").display().to_string();
        let args = Args {
            corrections: vec!["Joao Silva=>João Silva".to_string()],
            export: Some(export.clone()),
            out: Some(out.clone()),
            ..args_for("checkins.csv")
        };
        run_dashboard(&args).unwrap();

        let exported = fs::read_to_string(&export).unwrap();
        let lines: Vec<&str> = exported.lines().collect();
        assert_eq!(lines.len(), 9);
        assert!(lines[0].starts_with("Data/hora,Nome,Nome_Original,"));
        assert!(lines[0].ends_with(",Email"));
        assert!(lines[6].contains(",João Silva,Joao Silva,"));

        // The summary is its own reference.
        let args2 = Args {
            reference: Some(out.clone()),
            out: Some(out.clone()),
            ..args
        };
        assert!(run_dashboard(&args2).is_ok());

        // Only the generation time may differ from the reference.
        let reference = dir.join("attlog_reference_test.json").display().to_string();
        let mut summary: JSValue = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
        summary["report"]["generatedAt"] = json!("01/01/2000 00:00:00");
        fs::write(&reference, summary.to_string()).unwrap();
        let args3 = Args {
            reference: Some(reference.clone()),
            ..args2
        };
        assert!(run_dashboard(&args3).is_ok());

        summary["report"]["totals"]["totalAttendance"] = json!(0);
        fs::write(&reference, summary.to_string()).unwrap();
        assert!(run_dashboard(&args3).is_err());
    }
}
