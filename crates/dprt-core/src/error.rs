//! Error types for the DpRt reduction engine.
//!
//! Errors are organized by concern (property lookup, FITS loading, reduction)
//! and every failure site carries a stable numeric code so hosts that only
//! see the `(number, string)` error slot can still tell failures apart.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Maximum length in bytes of the message held by [`ErrorState`].
pub const ERROR_STRING_LENGTH: usize = 256;

/// Reported in place of a pipeline failure that carries code 0.
pub const UNCODED_PIPELINE_FAILURE: i32 = 24;

/// Top-level error type for reduction calls.
#[derive(Error, Debug)]
pub enum DprtError {
    /// A property lookup failed. The property's own code is reported.
    #[error("{0}")]
    Property(#[from] PropertyError),

    /// The input image could not be loaded.
    #[error("{operation}({path}): {source}")]
    ImageLoad {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// The abort flag was observed at a checkpoint.
    #[error("{operation}({path}): Operation aborted {checkpoint}.")]
    Aborted {
        operation: Operation,
        path: PathBuf,
        checkpoint: Checkpoint,
    },

    /// Storage for the output filename could not be reserved.
    #[error("{operation}({path}): Memory allocation error for output filename.")]
    OutputAlloc { operation: Operation, path: PathBuf },

    /// An exposure image has no usable telescope focus header.
    #[error("{operation}({path}): {source}")]
    MissingFocus {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: ImageError,
    },

    /// Real (non-fake) mode was requested but the host installed no pipeline.
    #[error("{operation}: no external reduction pipeline is installed")]
    PipelineUnavailable { operation: Operation },

    /// The external pipeline reported a failure; forwarded verbatim.
    #[error(transparent)]
    Pipeline(#[from] PipelineFailure),
}

impl DprtError {
    /// Stable numeric code for this failure site.
    pub fn code(&self) -> i32 {
        use Checkpoint::*;
        use Operation::*;
        match self {
            DprtError::Property(e) => e.code(),
            DprtError::ImageLoad {
                operation, source, ..
            } => match operation {
                ExposeReduce => 2000 + source.code(),
                _ => 1000 + source.code(),
            },
            DprtError::Aborted {
                operation,
                checkpoint,
                ..
            } => match (operation, checkpoint) {
                (ExposeReduce, BeforeLoad) => 3,
                (ExposeReduce, AfterLoad) => 8,
                (ExposeReduce, MidScan { .. }) => 9,
                (_, BeforeLoad) => 1,
                (_, AfterLoad) => 5,
                (_, MidScan { .. }) => 6,
            },
            DprtError::OutputAlloc { operation, .. } => match operation {
                ExposeReduce => 4,
                _ => 2,
            },
            DprtError::MissingFocus { .. } => 10,
            DprtError::PipelineUnavailable { operation } => match operation {
                CalibrateReduce => 20,
                ExposeReduce => 21,
                MakeMasterBias => 22,
                MakeMasterFlat => 23,
            },
            DprtError::Pipeline(failure) if failure.code == 0 => UNCODED_PIPELINE_FAILURE,
            DprtError::Pipeline(failure) => failure.code,
        }
    }

    /// Whether this error was caused by the abort flag.
    pub fn is_abort(&self) -> bool {
        matches!(self, DprtError::Aborted { .. })
    }
}

/// Public reduction operations, used to label errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CalibrateReduce,
    ExposeReduce,
    MakeMasterBias,
    MakeMasterFlat,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::CalibrateReduce => "calibrate_reduce",
            Operation::ExposeReduce => "expose_reduce",
            Operation::MakeMasterBias => "make_master_bias",
            Operation::MakeMasterFlat => "make_master_flat",
        };
        f.write_str(name)
    }
}

/// Points in a fake reduction where the abort flag is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    /// Before the image is opened.
    BeforeLoad,
    /// After the image is loaded, before the scan starts.
    AfterLoad,
    /// After a completed row of the pixel scan.
    MidScan { row: usize },
}

impl fmt::Display for Checkpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checkpoint::BeforeLoad => f.write_str("before loading image"),
            Checkpoint::AfterLoad => f.write_str("after loading image"),
            Checkpoint::MidScan { row } => write!(f, "while scanning row {row}"),
        }
    }
}

/// Property lookup errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PropertyError {
    /// Lookup called with an empty keyword
    #[error("Property lookup called with an empty keyword")]
    NullArgument,

    /// No backend is bound for this property type
    #[error("No {kind} property backend is bound (keyword '{keyword}')")]
    NoBackend { kind: &'static str, keyword: String },

    /// Keyword not present in the property source
    #[error("Failed to find keyword '{keyword}' in properties")]
    NotFound { keyword: String },

    /// Value could not be parsed as an integer
    #[error("Keyword '{keyword}' has value '{value}' which is not an integer")]
    MalformedInt { keyword: String, value: String },

    /// Value could not be parsed as a double
    #[error("Keyword '{keyword}' has value '{value}' which is not a double")]
    MalformedDouble { keyword: String, value: String },

    /// Value is neither "true" nor "false"
    #[error("Keyword '{keyword}' has value '{value}' which is not a boolean (true/false)")]
    MalformedBool { keyword: String, value: String },

    /// The matching line has no '=' separator
    #[error("Keyword '{keyword}' matched line '{line}' which has no '=' separator")]
    MalformedLine { keyword: String, line: String },

    /// The property file could not be read
    #[error("Failed to read property file {path}: {message}")]
    Unreadable { path: PathBuf, message: String },
}

impl PropertyError {
    /// Stable numeric code for this failure class.
    pub fn code(&self) -> i32 {
        match self {
            PropertyError::NullArgument => 100,
            PropertyError::NoBackend { .. } => 101,
            PropertyError::NotFound { .. } => 102,
            PropertyError::MalformedInt { .. } => 103,
            PropertyError::MalformedDouble { .. } => 104,
            PropertyError::MalformedBool { .. } => 105,
            PropertyError::MalformedLine { .. } => 106,
            PropertyError::Unreadable { .. } => 107,
        }
    }
}

/// FITS image loading errors.
#[derive(Error, Debug)]
pub enum ImageError {
    /// File could not be opened
    #[error("Failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A required header keyword is absent
    #[error("Header keyword {keyword} missing")]
    KeyMissing { keyword: String },

    /// BITPIX is not the single supported depth
    #[error("Wrong BITPIX {found} (expected {expected})")]
    WrongBitpix { found: i64, expected: i64 },

    /// NAXIS is not 2
    #[error("Wrong NAXIS {found} (expected {expected})")]
    WrongNaxis { found: i64, expected: i64 },

    /// Pixel buffer could not be allocated
    #[error("Failed to allocate pixel buffer for {width}x{height} image")]
    Alloc { width: usize, height: usize },

    /// Header or raster could not be read
    #[error("Read failed: {message}")]
    Read { message: String },

    /// A header card value could not be parsed for its keyword
    #[error("Header keyword {keyword} has malformed value '{value}'")]
    MalformedHeader { keyword: String, value: String },
}

impl ImageError {
    /// Stable numeric code for this failure class.
    pub fn code(&self) -> i32 {
        match self {
            ImageError::Open { .. } => 200,
            ImageError::KeyMissing { .. } => 201,
            ImageError::WrongBitpix { .. } => 202,
            ImageError::WrongNaxis { .. } => 203,
            ImageError::Alloc { .. } => 204,
            ImageError::Read { .. } => 205,
            ImageError::MalformedHeader { .. } => 207,
        }
    }
}

/// A failure reported by the external reduction pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PipelineFailure {
    pub code: i32,
    pub message: String,
}

impl PipelineFailure {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Application configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Last-error-wins status slot: a numeric code plus a bounded message.
///
/// Code 0 with an empty message means no error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorState {
    number: i32,
    message: String,
}

impl ErrorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset to the no-error state.
    pub fn clear(&mut self) {
        self.number = 0;
        self.message.clear();
    }

    /// Overwrite the slot with an error's code and message.
    pub fn record(&mut self, error: &DprtError) {
        self.set(error.code(), &error.to_string());
    }

    /// Overwrite the slot with an explicit code and message.
    pub fn set(&mut self, number: i32, message: &str) {
        self.number = number;
        self.message.clear();
        self.message
            .push_str(truncate_to_boundary(message, ERROR_STRING_LENGTH - 1));
    }

    pub fn number(&self) -> i32 {
        self.number
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_error(&self) -> bool {
        self.number != 0
    }
}

fn truncate_to_boundary(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Convenience type alias for reduction results.
pub type Result<T> = std::result::Result<T, DprtError>;
