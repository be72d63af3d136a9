// Primitives shared by the readers and the writers.

use std::collections::HashMap;

use attendance_log::{AuxiliaryFields, RawRecord, RawTimestamp};

use crate::dashboard::config_reader::ColumnLabels;
use crate::dashboard::*;

/// The extra column of the export holding the name before corrections.
pub const ORIGINAL_NAME_COLUMN: &str = "Nome_Original";

pub const EXPORT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The position of each known column in a header.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnIndex {
    pub timestamp: usize,
    pub name: usize,
    pub how_found: Option<usize>,
    pub first_time: Option<usize>,
    pub phone: Option<usize>,
    /// The remaining columns, in header order.
    pub others: Vec<(usize, String)>,
}

fn clean_label(s: &str) -> String {
    s.trim_start_matches('\u{feff}').trim().to_string()
}

impl ColumnIndex {
    /// The timestamp and name columns are required. The other ones are optional.
    pub fn from_header(
        header: &[Option<String>],
        labels: &ColumnLabels,
        path: &str,
    ) -> BDashResult<ColumnIndex> {
        let positions: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(idx, x)| x.as_ref().map(|s| (clean_label(s), idx)))
            .collect();
        debug!("from_header: {:?}", positions);

        let missing: Vec<String> = [&labels.timestamp, &labels.name]
            .iter()
            .filter(|l| !positions.contains_key(l.as_str()))
            .map(|l| l.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Box::new(DashboardError::MissingColumns {
                columns: missing,
                path: path.to_string(),
            }));
        }
        let find = |label: &String| positions.get(label).cloned();
        // Checked above.
        let timestamp = find(&labels.timestamp).unwrap_or_default();
        let name = find(&labels.name).unwrap_or_default();
        let how_found = find(&labels.how_found);
        let first_time = find(&labels.first_time);
        let phone = find(&labels.phone);

        let known: Vec<usize> = [Some(timestamp), Some(name), how_found, first_time, phone]
            .iter()
            .flatten()
            .cloned()
            .collect();
        let others: Vec<(usize, String)> = header
            .iter()
            .enumerate()
            .filter(|(idx, _)| !known.contains(idx))
            .filter_map(|(idx, x)| x.as_ref().map(|s| (idx, clean_label(s))))
            .filter(|(_, s)| !s.is_empty())
            .collect();

        Ok(ColumnIndex {
            timestamp,
            name,
            how_found,
            first_time,
            phone,
            others,
        })
    }

    /// Assembles a check-in from the cells of a row, already converted to text.
    /// Short rows are padded with empty cells.
    pub fn record(&self, timestamp: RawTimestamp, cells: &[String]) -> RawRecord {
        let cell = |idx: usize| cells.get(idx).map(|s| s.trim()).unwrap_or("");
        let optional = |idx: Option<usize>| {
            idx.map(cell)
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };
        let name = Some(cell(self.name).to_string()).filter(|s| !s.is_empty());
        RawRecord {
            timestamp,
            name,
            auxiliary: AuxiliaryFields {
                how_found: optional(self.how_found),
                first_time: optional(self.first_time),
                phone: optional(self.phone),
                other: self
                    .others
                    .iter()
                    .map(|(idx, label)| (label.clone(), cell(*idx).to_string()))
                    .collect(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<Option<String>> {
        cols.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn finds_the_columns() {
        let h = header(&["\u{feff}Data/hora", "Email", "Nome", "DDD+TELEFONE (SEM ESPAÇO)"]);
        let idx = ColumnIndex::from_header(&h, &ColumnLabels::default(), "f.csv").unwrap();
        assert_eq!(idx.timestamp, 0);
        assert_eq!(idx.name, 2);
        assert_eq!(idx.phone, Some(3));
        assert_eq!(idx.how_found, None);
        assert_eq!(idx.others, vec![(1, "Email".to_string())]);

        let cells: Vec<String> = vec!["2024-01-15 19:00".into(), "a@b.c".into(), " Ana ".into()];
        let rec = idx.record(RawTimestamp::Text(cells[0].clone()), &cells);
        assert_eq!(rec.name.as_deref(), Some("Ana"));
        assert_eq!(rec.auxiliary.phone, None);
        assert_eq!(
            rec.auxiliary.other,
            vec![("Email".to_string(), "a@b.c".to_string())]
        );
    }

    #[test]
    fn reports_missing_columns() {
        let h = header(&["Timestamp", "Nome"]);
        let err = ColumnIndex::from_header(&h, &ColumnLabels::default(), "f.csv").unwrap_err();
        match *err {
            DashboardError::MissingColumns { columns, .. } => {
                assert_eq!(columns, vec!["Data/hora".to_string()])
            }
            e => panic!("unexpected error {:?}", e),
        }
    }
}
