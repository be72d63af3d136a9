// Primitives for reading Excel files.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use attendance_log::{RawRecord, RawTimestamp};

use crate::dashboard::config_reader::ColumnLabels;
use crate::dashboard::io_common::{ColumnIndex, EXPORT_TIMESTAMP_FORMAT};
use crate::dashboard::*;

/// Converts an Excel serial date (days since 1899-12-30) to a date-time.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn cell_to_string(cell: &DataType) -> String {
    match cell {
        DataType::String(s) => s.clone(),
        DataType::Int(i) => i.to_string(),
        DataType::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        DataType::Float(f) => f.to_string(),
        DataType::Bool(b) => b.to_string(),
        DataType::DateTime(f) => excel_serial_to_datetime(*f)
            .map(|dt| dt.format(EXPORT_TIMESTAMP_FORMAT).to_string())
            .unwrap_or_else(|| f.to_string()),
        DataType::Empty => "".to_string(),
        other => format!("{:?}", other),
    }
}

/// Date cells are passed as they are. Numbers in the timestamp column are also
/// taken as serial dates, which is how they appear when the cell lost its format.
fn cell_to_timestamp(cell: Option<&DataType>) -> RawTimestamp {
    let serial = match cell {
        Some(DataType::DateTime(f)) | Some(DataType::Float(f)) => Some(*f),
        Some(DataType::Int(i)) => Some(*i as f64),
        _ => None,
    };
    match serial.and_then(excel_serial_to_datetime) {
        Some(dt) => RawTimestamp::Native(dt),
        None => RawTimestamp::Text(cell.map(cell_to_string).unwrap_or_default()),
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> BDashResult<calamine::Range<DataType>> {
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { name, path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let wrange = workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu { path })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    }
}

/// Reads the check-ins of a worksheet. The first row is the header.
pub fn read_xlsx_checkins(
    path: &str,
    worksheet_name: Option<&str>,
    labels: &ColumnLabels,
) -> BDashResult<Vec<RawRecord>> {
    let wrange = get_range(path, worksheet_name)?;
    let mut rows = wrange.rows();
    let header: Vec<Option<String>> = match rows.next() {
        Some(cells) => cells
            .iter()
            .map(|c| match c {
                DataType::Empty => None,
                c => Some(cell_to_string(c)),
            })
            .collect(),
        None => Vec::new(),
    };
    debug!("read_xlsx_checkins: header: {:?}", header);
    let columns = ColumnIndex::from_header(&header, labels, path)?;

    let mut res: Vec<RawRecord> = Vec::new();
    for (idx, row) in rows.enumerate() {
        if row.iter().all(|c| matches!(c, DataType::Empty)) {
            debug!("read_xlsx_checkins: skipping blank row {}", idx + 2);
            continue;
        }
        let timestamp = cell_to_timestamp(row.get(columns.timestamp));
        let cells: Vec<String> = row.iter().map(cell_to_string).collect();
        res.push(columns.record(timestamp, &cells));
    }
    info!("read_xlsx_checkins: {} rows read from {:?}", res.len(), path);
    Ok(res)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|d| d.and_hms_opt(h, mi, 0))
            .unwrap()
    }

    #[test]
    fn converts_serial_dates() {
        // 2024-01-15 is day 45306.
        assert_eq!(
            excel_serial_to_datetime(45306.0),
            Some(at(2024, 1, 15, 0, 0))
        );
        assert_eq!(
            excel_serial_to_datetime(45306.75),
            Some(at(2024, 1, 15, 18, 0))
        );
        assert_eq!(excel_serial_to_datetime(-1.0), None);
    }

    #[test]
    fn reads_timestamp_cells() {
        assert_eq!(
            cell_to_timestamp(Some(&DataType::DateTime(45306.75))),
            RawTimestamp::Native(at(2024, 1, 15, 18, 0))
        );
        assert_eq!(
            cell_to_timestamp(Some(&DataType::String("15/01/2024 18:00".to_string()))),
            RawTimestamp::Text("15/01/2024 18:00".to_string())
        );
        assert_eq!(cell_to_timestamp(None), RawTimestamp::Text("".to_string()));
        assert_eq!(cell_to_string(&DataType::Float(11987654321.0)), "11987654321");
    }

    #[test]
    fn reads_form_workbook() {
        let path = format!("{}/tests/data/checkins.xlsx", env!("CARGO_MANIFEST_DIR"));
        let records = read_xlsx_checkins(&path, None, &ColumnLabels::default()).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0].timestamp,
            RawTimestamp::Native(at(2024, 1, 15, 19, 0))
        );
        assert_eq!(records[0].name.as_deref(), Some("joão  silva"));
        assert_eq!(
            records[1].timestamp,
            RawTimestamp::Text("22/01/2024 19:00".to_string())
        );
        assert_eq!(records[2].name, None);
        assert_eq!(records[1].auxiliary.phone.as_deref(), Some("11912345678"));

        let missing = read_xlsx_checkins(&path, Some("Nope"), &ColumnLabels::default());
        assert!(matches!(
            missing.map_err(|e| *e),
            Err(DashboardError::MissingWorksheet { .. })
        ));
    }
}
