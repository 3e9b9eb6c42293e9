//! Error types for ssddecode.

use thiserror::Error;

/// Result alias for ssddecode operations.
pub type SsdDecodeResult<T> = std::result::Result<T, SsdDecodeError>;

/// Broad category of an [`SsdDecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A label or prior resource is missing, unreadable or malformed.
    Resource,
    /// The caller broke the decode contract (input lengths, missing tables).
    Contract,
    /// The decoder configuration itself is invalid.
    Config,
}

/// Errors that can occur while loading tables or decoding detections.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SsdDecodeError {
    /// A resource file could not be opened or read.
    #[error("failed to read {path}: {reason}")]
    ResourceIo { path: String, reason: String },
    /// The label resource has fewer lines than the model has classes.
    #[error("label table has {got} lines, expected at least {expected}")]
    MissingLabels { expected: usize, got: usize },
    /// The prior resource does not have exactly one row per box coordinate.
    #[error("prior table has {got} rows, expected {expected}")]
    PriorRowCount { expected: usize, got: usize },
    /// A prior row holds fewer values than the model has anchors.
    #[error("prior row {row} has {got} values, expected at least {expected}")]
    ShortPriorRow {
        row: usize,
        expected: usize,
        got: usize,
    },
    /// A prior token is not a decimal float.
    #[error("prior row {row}, column {column}: invalid value {token:?}")]
    InvalidPriorValue {
        row: usize,
        column: usize,
        token: String,
    },
    /// An input tensor does not have the length implied by the model.
    #[error("{tensor} has {got} values, expected {expected}")]
    InputLength {
        tensor: &'static str,
        expected: usize,
        got: usize,
    },
    /// Decoding was attempted before both tables were loaded.
    #[error("decoder is not configured: missing {missing}")]
    NotConfigured { missing: &'static str },
    /// A table does not match the model it is used with.
    #[error("{table} table has {got} entries, model expects {expected}")]
    TableMismatch {
        table: &'static str,
        expected: usize,
        got: usize,
    },
    /// Batch frame sizes do not match the batch size.
    #[error("got {got} frame sizes for a batch of {expected}")]
    FrameSizeCount { expected: usize, got: usize },
    /// A post-processed class index falls outside the label table.
    #[error("class id {class_id} is out of range for {label_count} labels")]
    ClassOutOfRange { class_id: usize, label_count: usize },
    /// A post-processed class value is negative or not a number.
    #[error("invalid class value {value}")]
    InvalidClassValue { value: f32 },
    /// A post-processed detection count is negative, non-finite, or too large.
    #[error("invalid detection count {count}")]
    InvalidCount { count: f32 },
    /// The decoder configuration is invalid.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

impl SsdDecodeError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ResourceIo { .. }
            | Self::MissingLabels { .. }
            | Self::PriorRowCount { .. }
            | Self::ShortPriorRow { .. }
            | Self::InvalidPriorValue { .. } => ErrorKind::Resource,
            Self::InputLength { .. }
            | Self::NotConfigured { .. }
            | Self::TableMismatch { .. }
            | Self::FrameSizeCount { .. }
            | Self::ClassOutOfRange { .. }
            | Self::InvalidClassValue { .. }
            | Self::InvalidCount { .. } => ErrorKind::Contract,
            Self::InvalidConfig(_) => ErrorKind::Config,
        }
    }

    pub(crate) fn io(path: &std::path::Path, err: &std::io::Error) -> Self {
        Self::ResourceIo {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}
