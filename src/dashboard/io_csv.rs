// Primitives for reading and writing CSV files.

use std::collections::BTreeSet;

use attendance_log::{ExportRow, RawRecord, RawTimestamp};

use crate::dashboard::config_reader::ColumnLabels;
use crate::dashboard::io_common::{ColumnIndex, EXPORT_TIMESTAMP_FORMAT, ORIGINAL_NAME_COLUMN};
use crate::dashboard::*;

/// Reads a form export with a header row.
pub fn read_csv_checkins(path: &str, labels: &ColumnLabels) -> BDashResult<Vec<RawRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<Option<String>> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
    debug!("read_csv_checkins: header: {:?}", header);
    let columns = ColumnIndex::from_header(&header, labels, path)?;

    let mut res: Vec<RawRecord> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if cells.iter().all(|c| c.trim().is_empty()) {
            debug!("read_csv_checkins: skipping blank line {}", lineno);
            continue;
        }
        let timestamp = RawTimestamp::Text(
            cells
                .get(columns.timestamp)
                .cloned()
                .unwrap_or_default(),
        );
        res.push(columns.record(timestamp, &cells));
    }
    info!("read_csv_checkins: {} rows read from {:?}", res.len(), path);
    Ok(res)
}

/// The labels of the auxiliary columns that are not known in advance, in order of
/// first appearance.
fn other_labels(rows: &[ExportRow]) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut res: Vec<String> = Vec::new();
    for row in rows.iter() {
        for (label, _) in row.auxiliary.other.iter() {
            if seen.insert(label.clone()) {
                res.push(label.clone());
            }
        }
    }
    res
}

/// Writes the working set with the corrected names.
///
/// The name column holds the effective name, the raw name goes to `Nome_Original`.
pub fn write_csv_export(path: &str, rows: &[ExportRow], labels: &ColumnLabels) -> BDashResult<()> {
    let others = other_labels(rows);
    let mut wtr = csv::Writer::from_path(path).context(CsvWriteSnafu { path })?;

    let mut header: Vec<String> = vec![
        labels.timestamp.clone(),
        labels.name.clone(),
        ORIGINAL_NAME_COLUMN.to_string(),
        labels.how_found.clone(),
        labels.first_time.clone(),
        labels.phone.clone(),
    ];
    header.extend(others.iter().cloned());
    wtr.write_record(&header).context(CsvWriteSnafu { path })?;

    for row in rows.iter() {
        let aux = &row.auxiliary;
        let mut line: Vec<String> = vec![
            row.timestamp.format(EXPORT_TIMESTAMP_FORMAT).to_string(),
            row.effective_name.clone().unwrap_or_default(),
            row.raw_name.clone().unwrap_or_default(),
            aux.how_found.clone().unwrap_or_default(),
            aux.first_time.clone().unwrap_or_default(),
            aux.phone.clone().unwrap_or_default(),
        ];
        for label in others.iter() {
            let value = aux
                .other
                .iter()
                .find(|(l, _)| l == label)
                .map(|(_, v)| v.clone())
                .unwrap_or_default();
            line.push(value);
        }
        wtr.write_record(&line).context(CsvWriteSnafu { path })?;
    }
    wtr.flush().context(WritingSnafu { path })?;
    info!("write_csv_export: {} rows written to {:?}", rows.len(), path);
    Ok(())
}
