use thiserror::Error;

/// Domain errors raised while turning stored log data into badges and statements.
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("malformed date '{value}' (expected YYYY-MM-DD)")]
    MalformedDate { value: String },

    #[error("severity {value} is outside 1-10")]
    SeverityOutOfRange { value: i32 },

    #[error("{dates} log dates but {flags} note flags")]
    LengthMismatch { dates: usize, flags: usize },

    #[error("window start {start} is after window end {end}")]
    InvalidWindow { start: String, end: String },

    #[error("invalid reminder time '{value}' (expected HH:MM)")]
    InvalidReminderTime { value: String },

    #[error("unknown reminder days '{value}' (expected daily, weekdays or weekends)")]
    UnknownReminderDays { value: String },

    #[error("unknown time zone '{value}' (expected an IANA name such as America/Chicago)")]
    UnknownTimezone { value: String },

    #[error("{feature} requires a Pro subscription")]
    ProRequired { feature: String },

    #[error("configuration error: {0}")]
    Config(String),
}

pub type ClaimResult<T> = Result<T, ClaimError>;
