//! Run form: free-text inputs plus the parse-and-validate step that turns
//! them into [`RunParams`].

use std::fmt;

use crate::error::FormError;
use crate::model::{RunParams, ScenarioId, Settings};

/// Editable fields of the run form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Scenario,
    Terminals,
    Visitors,
}

impl Field {
    /// Fields in on-screen (and validation) order.
    pub const ALL: [Field; 3] = [Field::Scenario, Field::Terminals, Field::Visitors];

    pub fn label(self) -> &'static str {
        match self {
            Field::Scenario => "Scenario",
            Field::Terminals => "Terminals",
            Field::Visitors => "Visitor pace",
        }
    }

    /// Whether `c` may ever appear in this field's text.
    pub fn accepts(self, c: char) -> bool {
        match self {
            Field::Scenario | Field::Terminals => c.is_ascii_digit() || c == '-',
            Field::Visitors => c.is_ascii_digit() || matches!(c, '-' | '.' | 'e' | 'E'),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Text buffers backing the run form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunForm {
    pub scenario: String,
    pub terminals: String,
    pub visitors: String,
}

impl Default for RunForm {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl RunForm {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            scenario: settings.scenario_number.to_string(),
            terminals: settings.terminal_quantity.to_string(),
            visitors: settings.pace_of_visitors.to_string(),
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Scenario => &self.scenario,
            Field::Terminals => &self.terminals,
            Field::Visitors => &self.visitors,
        }
    }

    pub fn get_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Scenario => &mut self.scenario,
            Field::Terminals => &mut self.terminals,
            Field::Visitors => &mut self.visitors,
        }
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        *self.get_mut(field) = value.into();
    }

    /// Parse the scenario field on its own (used by the scenario selector).
    pub fn scenario(&self) -> Result<ScenarioId, FormError> {
        parse_int(Field::Scenario, &self.scenario).map(ScenarioId)
    }

    /// Parse every field. The first invalid field, in [`Field::ALL`] order,
    /// is reported.
    pub fn validate(&self) -> Result<RunParams, FormError> {
        let scenario = self.scenario()?;
        let terminals = parse_int(Field::Terminals, &self.terminals)?;
        let visitors = parse_float(Field::Visitors, &self.visitors)?;
        Ok(RunParams {
            terminals,
            visitors,
            scenario,
        })
    }
}

fn parse_int(field: Field, text: &str) -> Result<i64, FormError> {
    let t = text.trim();
    if t.is_empty() {
        return Err(FormError::Empty { field });
    }
    t.parse::<i64>().map_err(|_| FormError::InvalidInteger {
        field,
        value: text.to_string(),
    })
}

fn parse_float(field: Field, text: &str) -> Result<f64, FormError> {
    let t = text.trim();
    if t.is_empty() {
        return Err(FormError::Empty { field });
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(FormError::InvalidNumber {
            field,
            value: text.to_string(),
        }),
    }
}
