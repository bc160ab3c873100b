use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};

/// A spreadsheet cell as handed over by the sheet reader.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawCell {
    #[default]
    Empty,
    Int(i64),
    Float(f64),
    Text(String),
}

impl RawCell {
    pub fn is_blank(&self) -> bool {
        match self {
            RawCell::Empty => true,
            RawCell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Cell rendered the way a user would read it in the sheet.
    pub fn display_text(&self) -> String {
        match self {
            RawCell::Empty => String::new(),
            RawCell::Int(v) => v.to_string(),
            RawCell::Float(v) => v.to_string(),
            RawCell::Text(s) => s.clone(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RawCell::Int(v) => Some(*v as f64),
            RawCell::Float(v) if v.is_finite() => Some(*v),
            RawCell::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }
}

impl From<i64> for RawCell {
    fn from(v: i64) -> Self {
        RawCell::Int(v)
    }
}

impl From<f64> for RawCell {
    fn from(v: f64) -> Self {
        RawCell::Float(v)
    }
}

impl From<&str> for RawCell {
    fn from(v: &str) -> Self {
        RawCell::Text(v.to_string())
    }
}

impl From<Mark> for RawCell {
    fn from(m: Mark) -> Self {
        match m.score() {
            Some(v) => RawCell::Int(v),
            None => RawCell::Empty,
        }
    }
}

/// A subject mark. An absent cell is kept apart from an entered zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mark {
    value: i64,
    entered: bool,
}

impl Mark {
    pub const NO_MARK: Mark = Mark {
        value: 0,
        entered: false,
    };

    pub fn entered(value: i64) -> Self {
        Mark {
            value,
            entered: true,
        }
    }

    /// Integer value; 0 when nothing was entered.
    pub fn value(self) -> i64 {
        self.value
    }

    pub fn is_entered(self) -> bool {
        self.entered
    }

    pub fn score(self) -> Option<i64> {
        self.entered.then_some(self.value)
    }
}

/// Coerce one raw cell into a mark.
///
/// Blank cells become [`Mark::NO_MARK`], floats are truncated toward zero and
/// numeric text must hold an integer token. No range check happens here.
pub fn normalize(raw: &RawCell) -> Result<Mark> {
    match raw {
        RawCell::Empty => Ok(Mark::NO_MARK),
        RawCell::Int(v) => Ok(Mark::entered(*v)),
        RawCell::Float(v) => {
            let t = v.trunc();
            if !t.is_finite() || t < i64::MIN as f64 || t > i64::MAX as f64 {
                return Err(ReportError::format(v.to_string()));
            }
            Ok(Mark::entered(t as i64))
        }
        RawCell::Text(s) => {
            let t = s.trim();
            if t.is_empty() {
                return Ok(Mark::NO_MARK);
            }
            t.parse::<i64>()
                .map(Mark::entered)
                .map_err(|_| ReportError::format(s.clone()))
        }
    }
}

pub fn normalize_all(raw: &[RawCell]) -> Result<Vec<Mark>> {
    raw.iter().map(normalize).collect()
}
