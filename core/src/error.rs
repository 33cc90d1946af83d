use thiserror::Error;

/// Errors raised while interpreting timezone settings or caller-supplied dates.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Offset override outside the range real zones use.
    #[error("Timezone offset {0} is out of range (expected whole hours between -12 and +14)")]
    OffsetOutOfRange(i32),
    /// Zone name not present in the IANA database.
    #[error("Unknown timezone '{0}' (expected an IANA name like 'Europe/Moscow')")]
    UnknownZone(String),
    /// Date filter that is neither RFC 3339, a naive datetime, nor a calendar date.
    #[error("Unrecognized date '{0}' (expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS, or RFC 3339)")]
    UnrecognizedDate(String),
    /// Local wall-clock time that does not exist in the zone (DST gap).
    #[error("Local time '{0}' does not exist in the configured timezone")]
    NonexistentLocalTime(String),
}

/// Machine-readable error codes attached to failed tool calls and their log records.
pub mod codes {
    pub const CONFIGURATION_ERROR: &str = "configuration_error";
    pub const UNKNOWN_TOOL: &str = "unknown_tool";
    pub const MISSING_ARGUMENT: &str = "missing_argument";
    pub const VALIDATION_FAILED: &str = "validation_failed";
    pub const REMOTE_REQUEST_FAILED: &str = "remote_request_failed";
    pub const CONNECTION_ERROR: &str = "connection_error";
    pub const TIMEOUT: &str = "timeout";
    pub const RESPONSE_ERROR: &str = "response_error";
}
