//! Low-level readers for data files.

use std::path::Path;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::LoaderError;

/// Path-segment escape set: everything but unreserved characters.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Reject anything that is not a plain file name, so a selector value can
/// never reach outside the data directory.
pub(crate) fn validate_file_name(name: &str) -> Result<(), LoaderError> {
    let bad = name.trim().is_empty()
        || name.starts_with('.')
        || name.contains(['/', '\\', '\0'])
        || name != name.trim();
    if bad {
        return Err(LoaderError::InvalidFileName(name.to_string()));
    }
    Ok(())
}

pub(crate) fn file_url(base: &str, name: &str) -> String {
    format!("{base}{}", utf8_percent_encode(name, PATH_SEGMENT))
}

pub(crate) async fn read_local(dir: &Path, name: &str) -> Result<String, LoaderError> {
    let path = dir.join(name);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| LoaderError::Io {
            path: path.display().to_string(),
            source,
        })
}

pub(crate) async fn fetch_remote(
    client: &reqwest::Client,
    url: &str,
    user_agent: &str,
) -> Result<String, LoaderError> {
    let response = client
        .get(url)
        .header(reqwest::header::USER_AGENT, user_agent)
        .header(reqwest::header::ACCEPT, "text/csv, text/plain;q=0.9, */*;q=0.5")
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoaderError::HttpStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(response.text().await?)
}

/// CSV file names in `dir`, sorted, excluding `exclude`.
pub(crate) async fn list_local_csv(dir: &Path, exclude: &str) -> Result<Vec<String>, LoaderError> {
    let io_err = |source| LoaderError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut entries = tokio::fs::read_dir(dir).await.map_err(io_err)?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        let is_csv = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && name != exclude && validate_file_name(&name).is_ok() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}
