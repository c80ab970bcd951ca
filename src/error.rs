//! Planner error types.
//!
//! Only fatal conditions are errors. Data gaps (missing coordinates,
//! unassignable locations, spacing issues) are reported as warnings or
//! diagnostics on a successful result.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("no locations provided")]
    NoLocations,

    #[error("no auditors provided")]
    NoAuditors,

    #[error("invalid target month {0} (expected 0-11)")]
    InvalidMonth(u32),

    #[error("invalid target year {0} (expected 2000-2100)")]
    InvalidYear(i32),

    #[error("no working days available in month {month} of {year}")]
    NoWorkingDays { month: u32, year: i32 },

    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("report export failed: {0}")]
    Export(#[from] csv::Error),

    #[error("report write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("error generating planning: {source}")]
    Generation {
        #[source]
        source: Box<PlanningError>,
    },
}

impl PlanningError {
    /// Wraps a pipeline failure for callers of the top-level entry point.
    pub fn generation(source: PlanningError) -> Self {
        match source {
            already @ PlanningError::Generation { .. } => already,
            other => PlanningError::Generation {
                source: Box::new(other),
            },
        }
    }
}

pub type Result<T> = std::result::Result<T, PlanningError>;
