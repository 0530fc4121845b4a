//! Click-popup contents for a store marker.

use std::sync::LazyLock;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;
use serde::Serialize;

use crate::features::{Point, PointFeature};

/// Characters left unescaped by JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

static FULLWIDTH_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"（.*?）").expect("valid regex"));
static ASCII_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*?\)").expect("valid regex"));

/// Strip parenthetical annotations such as `（閉店）` or `(2F)` so the name
/// works as a map search query.
#[must_use]
pub fn clean_store_name(name: &str) -> String {
    let without_fullwidth = FULLWIDTH_PARENS.replace_all(name, "");
    ASCII_PARENS
        .replace_all(&without_fullwidth, "")
        .trim()
        .to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupDetails {
    pub code: Option<String>,
    pub store_name: String,
    pub brand: Option<String>,
    pub search_name: String,
    pub coordinates: Option<Point>,
    pub google_maps_url: String,
    pub apple_maps_url: String,
}

impl PopupDetails {
    #[must_use]
    pub fn for_feature(feature: &PointFeature) -> Self {
        let store_name = feature.store_name().unwrap_or_default().to_string();
        let search_name = clean_store_name(&store_name);
        let encoded = utf8_percent_encode(&search_name, URI_COMPONENT).to_string();

        Self {
            code: feature.properties.code.clone(),
            brand: feature.properties.brand.clone(),
            coordinates: feature.geometry,
            google_maps_url: format!("https://www.google.com/maps/search/{encoded}"),
            apple_maps_url: format!("http://maps.apple.com/?q={encoded}"),
            store_name,
            search_name,
        }
    }
}
