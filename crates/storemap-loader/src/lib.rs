//! Reads store and allow-list CSV files from a local directory or an HTTP
//! base URL.

pub mod error;
mod fetch;

use std::time::Duration;

use storemap_core::{
    build_features, parse_store_records, AllowList, AppConfig, BuildOptions, BuildReport,
    DataSource, FeatureCollection,
};

pub use error::LoaderError;

/// Data-file reader bound to one [`DataSource`].
#[derive(Debug, Clone)]
pub struct DataLoader {
    source: DataSource,
    client: reqwest::Client,
    user_agent: String,
}

impl DataLoader {
    /// # Errors
    ///
    /// Returns [`LoaderError::Http`] if the HTTP client cannot be constructed.
    pub fn new(
        source: DataSource,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LoaderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            source,
            client,
            user_agent: user_agent.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`LoaderError::Http`] if the HTTP client cannot be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, LoaderError> {
        Self::new(
            config.data_source.clone(),
            config.fetch_timeout_secs,
            &config.user_agent,
        )
    }

    #[must_use]
    pub fn source(&self) -> &DataSource {
        &self.source
    }

    /// Read one data file as text.
    ///
    /// # Errors
    ///
    /// - [`LoaderError::InvalidFileName`] if `name` is not a plain file name.
    /// - [`LoaderError::Io`] if a local file cannot be read.
    /// - [`LoaderError::HttpStatus`] / [`LoaderError::Http`] for remote failures.
    pub async fn fetch_text(&self, name: &str) -> Result<String, LoaderError> {
        fetch::validate_file_name(name)?;
        let text = match &self.source {
            DataSource::Directory(dir) => fetch::read_local(dir, name).await?,
            DataSource::Remote(base) => {
                let url = fetch::file_url(base, name);
                fetch::fetch_remote(&self.client, &url, &self.user_agent).await?
            }
        };
        tracing::debug!(
            source = %self.source,
            file = name,
            bytes = text.len(),
            "fetched data file"
        );
        Ok(text)
    }

    /// Load the store table and build the canonical collection.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the file cannot be fetched or is not CSV.
    pub async fn load_stores(
        &self,
        name: &str,
        options: BuildOptions,
    ) -> Result<(FeatureCollection, BuildReport), LoaderError> {
        let text = self.fetch_text(name).await?;
        let records = parse_store_records(&text).map_err(|source| LoaderError::Parse {
            file: name.to_string(),
            source,
        })?;
        let (collection, report) = build_features(&records, options);
        tracing::info!(
            file = name,
            stores = report.rows,
            invalid_coordinates = report.invalid_coordinates,
            offset = report.offset_rows,
            "loaded store table"
        );
        Ok((collection, report))
    }

    /// Load the allow-list stored under `list_id`.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError`] if the file cannot be fetched or is not CSV.
    pub async fn load_allow_list(&self, list_id: &str) -> Result<AllowList, LoaderError> {
        let text = self.fetch_text(list_id).await?;
        AllowList::parse(list_id, &text).map_err(|source| LoaderError::Parse {
            file: list_id.to_string(),
            source,
        })
    }

    /// Allow-list files available for selection, excluding the store table.
    ///
    /// Remote sources cannot be listed and yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`LoaderError::Io`] if a local directory cannot be read.
    pub async fn list_allow_lists(&self, stores_file: &str) -> Result<Vec<String>, LoaderError> {
        match &self.source {
            DataSource::Directory(dir) => fetch::list_local_csv(dir, stores_file).await,
            DataSource::Remote(base) => {
                tracing::debug!(base = %base, "remote data source cannot be listed");
                Ok(Vec::new())
            }
        }
    }
}
