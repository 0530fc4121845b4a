//! `convert` and `brands`: offline views of the store table.

use std::path::{Path, PathBuf};

use anyhow::Context;
use storemap_core::brands::load_brands;
use storemap_core::{
    apply_filters, AppConfig, BrandFilter, BrandsFile, BuildOptions, CodeFilter, DataSource,
    FeatureCollection, FilterState,
};
use storemap_loader::DataLoader;

#[derive(Debug)]
pub(crate) struct ConvertArgs {
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub brand: String,
    pub codes: String,
    pub pretty: bool,
}

/// Loader and store-table name for `input`.
///
/// An explicit input file becomes a directory source rooted at its parent,
/// so allow-lists are looked up next to it.
fn resolve_source(
    config: &AppConfig,
    input: Option<&Path>,
) -> anyhow::Result<(DataLoader, String)> {
    let Some(input) = input else {
        let loader = DataLoader::from_app_config(config)?;
        return Ok((loader, config.stores_file.clone()));
    };

    let name = input
        .file_name()
        .and_then(|n| n.to_str())
        .with_context(|| format!("input path {} has no usable file name", input.display()))?
        .to_string();
    let dir = input
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let loader = DataLoader::new(
        DataSource::Directory(dir),
        config.fetch_timeout_secs,
        &config.user_agent,
    )?;
    Ok((loader, name))
}

/// Build the store table and apply `filters` to it.
pub(crate) async fn filtered_collection(
    loader: &DataLoader,
    stores_file: &str,
    filters: &FilterState,
    options: BuildOptions,
) -> anyhow::Result<FeatureCollection> {
    let (canonical, _report) = loader.load_stores(stores_file, options).await?;

    let allow_list = match &filters.codes {
        CodeFilter::All => None,
        CodeFilter::List(list_id) => Some(loader.load_allow_list(list_id).await?),
    };

    Ok(apply_filters(&canonical, filters, allow_list.as_ref())?)
}

pub(crate) fn render_geojson(
    collection: &FeatureCollection,
    pretty: bool,
) -> anyhow::Result<String> {
    let json = if pretty {
        serde_json::to_string_pretty(collection)?
    } else {
        serde_json::to_string(collection)?
    };
    Ok(json)
}

pub(crate) async fn run_convert(config: &AppConfig, args: &ConvertArgs) -> anyhow::Result<()> {
    let (loader, stores_file) = resolve_source(config, args.input.as_deref())?;
    let filters = FilterState {
        brand: BrandFilter::from_selector(&args.brand),
        codes: CodeFilter::from_selector(&args.codes),
    };

    let collection = filtered_collection(
        &loader,
        &stores_file,
        &filters,
        BuildOptions::from_app_config(config),
    )
    .await?;
    let json = render_geojson(&collection, args.pretty)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(
                output = %path.display(),
                features = collection.len(),
                "wrote GeoJSON"
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// One tab-separated line per brand: name, count, colour.
pub(crate) fn brand_table(collection: &FeatureCollection, palette: &BrandsFile) -> String {
    collection
        .brand_counts()
        .into_iter()
        .map(|(name, count)| format!("{name}\t{count}\t{}", palette.color_for(&name)))
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) async fn run_brands(config: &AppConfig, input: Option<&Path>) -> anyhow::Result<()> {
    let (loader, stores_file) = resolve_source(config, input)?;
    let (collection, _report) = loader
        .load_stores(&stores_file, BuildOptions::from_app_config(config))
        .await?;

    let palette = if config.brands_path.exists() {
        load_brands(&config.brands_path)?
    } else {
        tracing::debug!(
            path = %config.brands_path.display(),
            "no brand palette; using default colour"
        );
        BrandsFile::default()
    };

    println!("{}", brand_table(&collection, &palette));
    Ok(())
}

#[cfg(test)]
#[path = "convert_test.rs"]
mod tests;
