use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Where store and allow-list CSV files are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// A local directory holding the CSV files.
    Directory(PathBuf),
    /// An HTTP(S) base URL, always stored with a trailing `/`.
    Remote(String),
}

impl DataSource {
    /// Interpret a raw setting: anything starting with `http://` or
    /// `https://` is remote, everything else is a directory path.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
            let mut base = trimmed.to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            DataSource::Remote(base)
        } else {
            DataSource::Directory(PathBuf::from(trimmed))
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataSource::Directory(path) => write!(f, "{}", path.display()),
            DataSource::Remote(url) => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub data_source: DataSource,
    pub stores_file: String,
    pub brands_path: PathBuf,
    pub state_path: PathBuf,
    /// When set, persisted keys expire after this many days (cookie-style).
    pub state_ttl_days: Option<u32>,
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
    pub offset_step: f64,
    pub max_stack_depth: usize,
}
