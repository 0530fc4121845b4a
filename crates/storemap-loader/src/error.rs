use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {file}: {source}")]
    Parse {
        file: String,
        #[source]
        source: storemap_core::ParseError,
    },

    #[error("invalid data file name \"{0}\"")]
    InvalidFileName(String),
}

impl LoaderError {
    /// Whether the file simply does not exist, as opposed to a transport or
    /// parse failure.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            LoaderError::HttpStatus { status, .. } => *status == 404,
            LoaderError::Io { source, .. } => source.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}
