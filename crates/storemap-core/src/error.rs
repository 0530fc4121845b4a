use thiserror::Error;

/// Errors raised while loading application or brand configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read brands file {path}: {source}")]
    BrandsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse brands file: {0}")]
    BrandsFileParse(#[from] serde_yaml::Error),

    #[error("brands validation failed: {0}")]
    Validation(String),
}

/// Errors raised while reading tabular store or allow-list data.
///
/// Unparseable coordinates are not reported here; the builder keeps those
/// rows with a null geometry.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Errors returned by key/value persistence backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("state file I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("state file {path} is not a JSON object of strings: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Raised when the allow-list passed to the filter does not belong to the
/// selected code filter.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("code filter \"{expected}\" selected but no allow-list is loaded")]
    AllowListMissing { expected: String },

    #[error("code filter \"{expected}\" selected but allow-list \"{actual}\" was supplied")]
    AllowListMismatch { expected: String, actual: String },
}
