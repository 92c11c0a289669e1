use std::path::PathBuf;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("invalid dimension: {name} must be positive")]
  InvalidDimension { name: &'static str },

  /// Widths (or row counts) that disagree. Never silently broadcast.
  #[error("shape mismatch in {context}: expected {expected}, got {actual}")]
  ShapeMismatch {
    context: &'static str,
    expected: usize,
    actual: usize,
  },

  #[error("column {column:?} not found in {path}")]
  MissingColumn { column: String, path: String },

  #[error("cannot parse {value:?} in row {row}, column {column:?} as a number")]
  Parse {
    row: usize,
    column: String,
    value: String,
  },

  #[error("dataset {0} has no rows")]
  EmptyDataset(String),

  #[error("loss became non-finite at epoch {epoch}")]
  NonFiniteLoss { epoch: usize },

  #[error("invalid configuration: {0}")]
  InvalidConfig(String),

  #[error("export failed: {0}")]
  Export(String),

  /// Tensor data that could not be read back from the backend.
  #[error("tensor data: {0}")]
  Tensor(String),

  #[error("io error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),

  #[error(transparent)]
  Protobuf(#[from] prost::DecodeError),
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
    Error::Io {
      path: path.into(),
      source,
    }
  }

  pub(crate) fn shape(context: &'static str, expected: usize, actual: usize) -> Self {
    Error::ShapeMismatch {
      context,
      expected,
      actual,
    }
  }
}
