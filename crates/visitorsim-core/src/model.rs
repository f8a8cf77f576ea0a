//! Wire types exchanged with the simulation backend.
//!
//! All of these are transient: they are rehydrated from the backend on every
//! fetch and never persisted (except through [`crate::export`]).

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Simulated minutes per day. `sim_year` is a minute counter despite its name.
pub const MINUTES_PER_DAY: f64 = 60.0 * 24.0;

// ---------------------------------------------------------------------------
// ScenarioId
// ---------------------------------------------------------------------------

/// Backend scenario identifier.
///
/// Decodes from a JSON integer or from an integer-valued string so that a
/// backend returning descriptors like `"3"` still yields usable ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ScenarioId(pub i64);

impl ScenarioId {
    /// Scenario number used before the backend settings arrive.
    pub const UNSET: ScenarioId = ScenarioId(-1);

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for ScenarioId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ScenarioId {
    fn from(v: i64) -> Self {
        ScenarioId(v)
    }
}

impl<'de> Deserialize<'de> for ScenarioId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Int(i64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Int(v) => Ok(ScenarioId(v)),
            Raw::Text(s) => s.trim().parse::<i64>().map(ScenarioId).map_err(|_| {
                serde::de::Error::custom(format!("scenario id is not an integer: {s:?}"))
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// ResultRow
// ---------------------------------------------------------------------------

/// One point of a scenario's time series as returned by `/getResults/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResultRow {
    #[serde(default)]
    pub scenario_number: Option<i64>,
    /// Minutes since simulation start.
    #[serde(default)]
    pub sim_year: Option<f64>,
    #[serde(default)]
    pub cust_served: Option<i64>,
    #[serde(default)]
    pub cust_refused: Option<i64>,
    #[serde(default)]
    pub terminals: Option<i64>,
}

impl ResultRow {
    /// The all-null row shown before any results have been fetched.
    pub const PLACEHOLDER: ResultRow = ResultRow {
        scenario_number: None,
        sim_year: None,
        cust_served: None,
        cust_refused: None,
        terminals: None,
    };

    /// Elapsed simulated time in days, or `None` when `sim_year` is null.
    pub fn elapsed_days(&self) -> Option<f64> {
        self.sim_year.map(minutes_to_days)
    }
}

/// Convert a simulated-minute counter to days.
pub fn minutes_to_days(minutes: f64) -> f64 {
    minutes / MINUTES_PER_DAY
}

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Backend default run settings, as served by `/settings`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub scenario_number: ScenarioId,
    pub pace_of_visitors: f64,
    pub terminal_quantity: i64,
}

impl Default for Settings {
    /// Values the run form starts with until the backend answers.
    fn default() -> Self {
        Self {
            scenario_number: ScenarioId::UNSET,
            pace_of_visitors: 0.25,
            terminal_quantity: 10,
        }
    }
}

// ---------------------------------------------------------------------------
// Run parameters / acknowledgment
// ---------------------------------------------------------------------------

/// Validated parameters for `POST /start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunParams {
    pub terminals: i64,
    pub visitors: f64,
    pub scenario: ScenarioId,
}

impl RunParams {
    /// Form-urlencoded body fields, in the order the backend documents them.
    pub fn form_fields(&self) -> [(&'static str, String); 3] {
        [
            ("terminals", self.terminals.to_string()),
            ("visitors", self.visitors.to_string()),
            ("scenario", self.scenario.to_string()),
        ]
    }
}

/// Plain-text body returned by `POST /start`. Not interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RunAck {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_days_divides_minutes_by_1440() {
        for minutes in [0.0, 1.0, 720.0, 1440.0, 10_080.0, 12_345.678] {
            let row = ResultRow {
                sim_year: Some(minutes),
                ..ResultRow::default()
            };
            assert_eq!(row.elapsed_days(), Some(minutes / 1440.0));
        }
    }

    #[test]
    fn elapsed_days_null_when_sim_year_null() {
        assert_eq!(ResultRow::PLACEHOLDER.elapsed_days(), None);
    }

    #[test]
    fn result_row_decodes_nulls_and_missing_fields() {
        let row: ResultRow =
            serde_json::from_str(r#"{"scenario_number":2,"sim_year":null,"extra":true}"#).unwrap();
        assert_eq!(row.scenario_number, Some(2));
        assert_eq!(row.sim_year, None);
        assert_eq!(row.cust_served, None);
        assert_eq!(row.terminals, None);
    }

    #[test]
    fn result_row_decodes_full_payload() {
        let row: ResultRow = serde_json::from_str(
            r#"{"scenario_number":1,"sim_year":2880,"cust_served":40,"cust_refused":3,"terminals":10}"#,
        )
        .unwrap();
        assert_eq!(row.elapsed_days(), Some(2.0));
        assert_eq!(row.cust_served, Some(40));
        assert_eq!(row.cust_refused, Some(3));
    }

    #[test]
    fn settings_use_camel_case() {
        let s: Settings = serde_json::from_str(
            r#"{"scenarioNumber":4,"paceOfVisitors":0.5,"terminalQuantity":12}"#,
        )
        .unwrap();
        assert_eq!(s.scenario_number, ScenarioId(4));
        assert_eq!(s.pace_of_visitors, 0.5);
        assert_eq!(s.terminal_quantity, 12);
    }

    #[test]
    fn settings_default_matches_form_defaults() {
        let s = Settings::default();
        assert_eq!(s.scenario_number, ScenarioId(-1));
        assert_eq!(s.terminal_quantity, 10);
        assert_eq!(s.pace_of_visitors, 0.25);
    }

    #[test]
    fn scenario_id_accepts_integer_strings() {
        let ids: Vec<ScenarioId> = serde_json::from_str(r#"[1, "2", " 7 "]"#).unwrap();
        assert_eq!(ids, vec![ScenarioId(1), ScenarioId(2), ScenarioId(7)]);
    }

    #[test]
    fn scenario_id_rejects_non_numeric() {
        assert!(serde_json::from_str::<Vec<ScenarioId>>(r#"["abc"]"#).is_err());
        assert!(serde_json::from_str::<Vec<ScenarioId>>(r#"[{"id":1}]"#).is_err());
    }

    #[test]
    fn run_params_form_fields() {
        let p = RunParams {
            terminals: 10,
            visitors: 0.25,
            scenario: ScenarioId(-1),
        };
        let fields = p.form_fields();
        assert_eq!(fields[0], ("terminals", "10".to_string()));
        assert_eq!(fields[1], ("visitors", "0.25".to_string()));
        assert_eq!(fields[2], ("scenario", "-1".to_string()));
    }
}
