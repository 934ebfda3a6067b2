use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while merging hyperparameters.
#[derive(Debug, Error)]
pub enum HParamsError {
    #[error("unknown hyperparameter: {0}")]
    UnknownKey(String),

    #[error("malformed hyperparameter assignment: {0:?}")]
    Malformed(String),

    #[error("invalid value for {0}: {1:?}")]
    InvalidValue(String, String),

    #[error("hyperparameters must be a json object")]
    NotAnObject,

    #[error("hyperparameter json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while reading graph, tree and embedding files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("{}:{}: {}", .path.display(), .line, .message)]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl DataError {
    pub(crate) fn malformed(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Malformed {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}
