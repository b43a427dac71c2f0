use thiserror::Error;

use gnss::constellation::ParsingError as ConstellationParsingError;

use std::io::Error as IoError;

/// Errors that may rise while reading ANTEX or IONEX content.
#[derive(Debug, Error)]
pub enum ParsingError {
    #[error("failed to open \"{path}\": {source}")]
    CannotOpen {
        path: String,
        #[source]
        source: IoError,
    },

    #[error("I/O input error: {0}")]
    IoError(#[from] IoError),

    #[error("unsupported revision: {0}")]
    UnsupportedVersion(String),

    #[error("revision number parsing")]
    VersionParsing,

    #[error("malformed header: {0}")]
    MalformedHeader(String),

    #[error("malformed record (line {line}): {reason}")]
    MalformedRecord { line: usize, reason: String },

    #[error("constellation parsing error: {0}")]
    ConstellationParsing(#[from] ConstellationParsingError),

    #[error("invalid reference system")]
    ReferenceSystem,

    #[error("mapping function parsing error")]
    MappingFunction,

    #[error("invalid PCV type")]
    PcvType,

    #[error("invalid frequency identifier")]
    FrequencyId,
}

/// Errors that may rise when querying parsed content.
#[derive(Debug, Error)]
pub enum Error {
    #[error("parsing error: {0}")]
    Parsing(#[from] ParsingError),

    #[error("antenna \"{0}\" not found")]
    AntennaNotFound(String),

    #[error("coordinates out of grid range")]
    OutOfRange,

    #[error("epoch {0} is not covered by the available maps")]
    EpochOutOfRange(String),

    #[error("invalid calendar field: {0}")]
    InvalidCalendarField(String),

    #[error("invalid axis definition: start={start} stop={stop} step={step}")]
    InvalidAxis { start: f64, stop: f64, step: f64 },

    #[error("expecting {expected} samples, got {found}")]
    SampleCount { expected: usize, found: usize },

    #[error("frequency #{0} does not exist")]
    UnknownFrequency(usize),

    #[error("time series do not share the same epochs and points")]
    TimeSeriesMismatch,

    #[error("interpolation step must be null or span at least one epoch unit")]
    InvalidStep,
}

impl ParsingError {
    /// Builds a [ParsingError::MalformedRecord] for given line number.
    pub(crate) fn malformed<S: ToString>(line: usize, reason: S) -> Self {
        let reason = reason.to_string();

        #[cfg(feature = "log")]
        log::error!("line {}: {}", line, reason);

        Self::MalformedRecord { line, reason }
    }
}
