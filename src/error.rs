use thiserror::Error;

/// Failures while retrieving or unpacking the remote forecast bundle.
///
/// The fetcher never retries; retry policy lives in the scheduler.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("feed returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("feed archive is not readable: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("feed archive contains no entries")]
    EmptyArchive,

    #[error("feed document is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("reading feed payload failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Schema violations in the downloaded timeseries document.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not well-formed KML: {0}")]
    Xml(#[from] serde_xml_rs::Error),

    #[error("document has no forecast timestamp axis")]
    MissingTimeAxis,

    #[error("timestamp axis entry {0:?} is not a valid time")]
    BadTimestamp(String),

    #[error("timestamp axis is not strictly increasing at {0}")]
    NonMonotonicAxis(chrono::DateTime<chrono::Utc>),

    #[error("document contains no forecast for station {0}")]
    StationMismatch(String),

    #[error("required parameter {code} is missing from the document")]
    MissingParameter { code: &'static str },

    #[error("parameter {code} has {values} values for a {axis}-step axis")]
    AxisMismatch {
        code: &'static str,
        values: usize,
        axis: usize,
    },
}

/// Invalid or missing configuration. Always fatal at startup: a silently
/// defaulted station or geometry would produce physically meaningless output.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration could not be loaded: {0}")]
    Load(String),

    #[error("invalid configuration value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },

    #[error("unknown module identifier {0:?}")]
    UnknownModule(String),

    #[error("unknown inverter identifier {0:?}")]
    UnknownInverter(String),
}

/// Output-side write failures. Reported but never halt polling.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("csv write failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("sink io failed: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "db")]
    #[error("database write failed: {0}")]
    Db(#[from] sqlx::Error),
}

/// One refresh attempt failed somewhere between the wire and the snapshot.
#[derive(Debug, Error)]
pub enum PollError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}
