use thiserror::Error;

/// A single device-supplied field that could not be parsed.
/// Callers that keep the lenient behaviour substitute zero and count the failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("timestamp {raw:?} has no hour before ':'")]
    MissingHour { raw: String },

    #[error("timestamp {raw:?}: hour is not a number")]
    InvalidHour { raw: String },

    #[error("timestamp {raw:?}: hour {hour} out of range 0-23")]
    HourOutOfRange { raw: String, hour: u32 },

    #[error("value {raw:?} is not a decimal integer")]
    InvalidNumber { raw: String },
}

/// Input-shape errors that make a report impossible to compute.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("resource monitor report has no data planes")]
    NoDataPlanes,

    #[error("no eligible cores: {cores} cores per plane, first eligible core {first_core}")]
    NoEligibleCores { cores: usize, first_core: usize },

    #[error("resource monitor report exceeds {axis} capacity: {count} > {limit}")]
    CapacityExceeded {
        axis: &'static str,
        count: usize,
        limit: usize,
    },

    #[error("hour {0} out of range 0-23")]
    HourOutOfRange(u8),
}
