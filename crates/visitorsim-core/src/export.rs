//! JSON snapshots of a fetched result set.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::ExportError;
use crate::model::{ResultRow, ScenarioId};

/// A result row plus its derived elapsed-days column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(flatten)]
    pub row: ResultRow,
    pub elapsed_days: Option<f64>,
}

impl From<&ResultRow> for ExportRow {
    fn from(row: &ResultRow) -> Self {
        Self {
            row: *row,
            elapsed_days: row.elapsed_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSnapshot {
    pub exported_at_unix: u64,
    /// Backend base URL the rows came from.
    pub api: String,
    pub scenario: Option<ScenarioId>,
    pub rows: Vec<ExportRow>,
}

impl ResultsSnapshot {
    pub fn new(api: &str, scenario: Option<ScenarioId>, rows: &[ResultRow]) -> Self {
        Self {
            exported_at_unix: unix_now(),
            api: api.to_string(),
            scenario,
            rows: rows.iter().map(ExportRow::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ExportError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

/// `visitorsim-results-<unix>.json` in `dir`.
pub fn default_export_path(dir: &Path, exported_at_unix: u64) -> PathBuf {
    dir.join(format!("visitorsim-results-{exported_at_unix}.json"))
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
