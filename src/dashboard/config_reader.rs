use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;

use crate::dashboard::*;

pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Data/hora";
pub const DEFAULT_NAME_COLUMN: &str = "Nome";
pub const DEFAULT_HOW_FOUND_COLUMN: &str = "COMO CONHECEU O GRUPO?";
pub const DEFAULT_FIRST_TIME_COLUMN: &str = "PRIMEIRA VEZ NO GRUPO?";
pub const DEFAULT_PHONE_COLUMN: &str = "DDD+TELEFONE (SEM ESPAÇO)";

pub const DEFAULT_TOP_N: usize = 10;
pub const TOP_N_RANGE: (usize, usize) = (5, 50);

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputSettings {
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(rename = "topN")]
    pub top_n: Option<usize>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputSource {
    pub provider: Option<String>,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "worksheetName")]
    pub worksheet_name: Option<String>,
    #[serde(rename = "timestampColumn")]
    pub timestamp_column: Option<String>,
    #[serde(rename = "nameColumn")]
    pub name_column: Option<String>,
    #[serde(rename = "howFoundColumn")]
    pub how_found_column: Option<String>,
    #[serde(rename = "firstTimeColumn")]
    pub first_time_column: Option<String>,
    #[serde(rename = "phoneColumn")]
    pub phone_column: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct FilterSettings {
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(default)]
    pub people: Vec<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionSetting {
    pub from: String,
    pub to: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize, Default)]
pub struct DashboardConfig {
    #[serde(rename = "outputSettings", default)]
    pub output_settings: OutputSettings,
    #[serde(rename = "inputSource", default)]
    pub input_source: InputSource,
    #[serde(default)]
    pub filters: FilterSettings,
    #[serde(default)]
    pub corrections: Vec<CorrectionSetting>,
    /// Passed to the renderers as is.
    pub display: Option<JSValue>,
}

/// The labels of the columns in the input (and in the export).
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ColumnLabels {
    pub timestamp: String,
    pub name: String,
    pub how_found: String,
    pub first_time: String,
    pub phone: String,
}

impl Default for ColumnLabels {
    fn default() -> Self {
        ColumnLabels {
            timestamp: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            name: DEFAULT_NAME_COLUMN.to_string(),
            how_found: DEFAULT_HOW_FOUND_COLUMN.to_string(),
            first_time: DEFAULT_FIRST_TIME_COLUMN.to_string(),
            phone: DEFAULT_PHONE_COLUMN.to_string(),
        }
    }
}

impl InputSource {
    pub fn column_labels(&self) -> ColumnLabels {
        let or_default = |x: &Option<String>, d: &str| x.clone().unwrap_or_else(|| d.to_string());
        ColumnLabels {
            timestamp: or_default(&self.timestamp_column, DEFAULT_TIMESTAMP_COLUMN),
            name: or_default(&self.name_column, DEFAULT_NAME_COLUMN),
            how_found: or_default(&self.how_found_column, DEFAULT_HOW_FOUND_COLUMN),
            first_time: or_default(&self.first_time_column, DEFAULT_FIRST_TIME_COLUMN),
            phone: or_default(&self.phone_column, DEFAULT_PHONE_COLUMN),
        }
    }
}

impl DashboardConfig {
    /// Resolves a relative input path against the directory of the configuration.
    pub fn resolve_paths(self, config_path: &str) -> DashboardConfig {
        let root = Path::new(config_path).parent();
        let file_path = match (root, self.input_source.file_path.clone()) {
            (Some(root), Some(p)) if Path::new(&p).is_relative() => {
                Some(root.join(p).display().to_string())
            }
            (_, p) => p,
        };
        DashboardConfig {
            input_source: InputSource {
                file_path,
                ..self.input_source
            },
            ..self
        }
    }
}

pub fn read_config(path: &str) -> BDashResult<DashboardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: DashboardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    Ok(config.resolve_paths(path))
}

pub fn read_summary(path: &str) -> BDashResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

/// Dates of the filters are written `YYYY-MM-DD`.
pub fn parse_date(text: &str) -> BDashResult<NaiveDate> {
    let d = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").context(InvalidDateSnafu { text })?;
    Ok(d)
}

/// Parses `FROM=>TO`.
pub fn parse_correction(text: &str) -> BDashResult<CorrectionSetting> {
    let (from, to) = text
        .split_once("=>")
        .context(CorrectionSyntaxSnafu { text })?;
    Ok(CorrectionSetting {
        from: from.trim().to_string(),
        to: to.trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(
            config.input_source.column_labels(),
            ColumnLabels::default()
        );
    }

    #[test]
    fn reads_camel_case_keys() {
        let js = r#"{
            "outputSettings": {"title": "Presença", "topN": 20},
            "inputSource": {"provider": "csv", "filePath": "data.csv", "nameColumn": "Name"},
            "filters": {"startDate": "2024-01-01"},
            "corrections": [{"from": "Joao", "to": "João"}],
            "display": {"pageTitle": "Dashboard"}
        }"#;
        let config: DashboardConfig = serde_json::from_str(js).unwrap();
        assert_eq!(config.output_settings.top_n, Some(20));
        assert_eq!(config.input_source.column_labels().name, "Name");
        assert_eq!(config.input_source.column_labels().timestamp, "Data/hora");
        assert!(config.filters.people.is_empty());
        assert_eq!(config.corrections[0].to, "João");

        let resolved = config.resolve_paths("/srv/forms/config.json");
        assert_eq!(
            resolved.input_source.file_path.as_deref(),
            Some("/srv/forms/data.csv")
        );
    }

    #[test]
    fn parses_corrections_and_dates() {
        let c = parse_correction(" Joao Silva => João Silva").unwrap();
        assert_eq!(c.from, "Joao Silva");
        assert_eq!(c.to, "João Silva");
        assert!(parse_correction("Joao").is_err());
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("15/01/2024").is_err());
    }
}
