use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

/// Failures raised by the classification and report-building pipeline.
///
/// The formatting helpers never produce these; they fall back to display
/// defaults instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ReportError {
    /// A raw cell could not be coerced into a mark.
    #[error("cannot read {value:?} as a mark")]
    Format { value: String },

    /// A mark or total fell outside its valid domain after any rescale.
    #[error("{what} {value} is outside 0..={max}")]
    Range {
        what: &'static str,
        value: f64,
        max: f64,
    },

    /// Ranking needs at least two subjects.
    #[error("at least 2 subjects are required, got {count}")]
    InsufficientData { count: usize },

    /// The sheet does not have the expected shape.
    #[error("malformed sheet: {0}")]
    BadSheet(String),

    /// A student row failed; the whole batch is rejected.
    #[error("row {row} ({student}): {source}")]
    Row {
        row: usize,
        student: String,
        #[source]
        source: Box<ReportError>,
    },
}

impl ReportError {
    pub fn format(value: impl Into<String>) -> Self {
        ReportError::Format {
            value: value.into(),
        }
    }

    pub fn in_row(self, row: usize, student: impl Into<String>) -> Self {
        ReportError::Row {
            row,
            student: student.into(),
            source: Box::new(self),
        }
    }

    /// Stable code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            ReportError::Format { .. } => "format_error",
            ReportError::Range { .. } => "range_error",
            ReportError::InsufficientData { .. } => "insufficient_data",
            ReportError::BadSheet(_) => "bad_sheet",
            ReportError::Row { .. } => "row_rejected",
        }
    }

    /// Structured details for the IPC envelope, when there are any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            ReportError::Row {
                row,
                student,
                source,
            } => Some(serde_json::json!({
                "row": row,
                "student": student,
                "cause": source.code(),
            })),
            ReportError::Range { what, value, max } => Some(serde_json::json!({
                "field": what,
                "value": value,
                "max": max,
            })),
            _ => None,
        }
    }
}
