use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::filter::BrandFilter;
use crate::ConfigError;

/// Marker colour for brands missing from the palette.
pub const DEFAULT_COLOR: &str = "#aaaaaa";

/// Draw order for brands without an explicit `sort_key`.
pub const DEFAULT_SORT_KEY: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandStyle {
    pub name: String,
    /// `#rrggbb`
    pub color: String,
    /// Higher keys draw on top of lower ones.
    pub sort_key: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrandsFile {
    pub brands: Vec<BrandStyle>,
}

impl BrandsFile {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&BrandStyle> {
        self.brands.iter().find(|b| b.name == name)
    }

    #[must_use]
    pub fn color_for(&self, name: &str) -> &str {
        self.get(name).map_or(DEFAULT_COLOR, |b| b.color.as_str())
    }

    #[must_use]
    pub fn sort_key_for(&self, name: &str) -> i32 {
        self.get(name)
            .and_then(|b| b.sort_key)
            .unwrap_or(DEFAULT_SORT_KEY)
    }

    /// MapLibre `circle` layer drawing every store, coloured and ordered by
    /// brand. The brand selector becomes the layer filter.
    #[must_use]
    pub fn circle_layer(&self, layer_id: &str, source_id: &str, brand: &BrandFilter) -> Value {
        let mut color = vec![json!("match"), json!(["get", "brand"])];
        for style in &self.brands {
            color.push(json!(style.name));
            color.push(json!(style.color));
        }
        color.push(json!(DEFAULT_COLOR));

        let mut sort_key = vec![json!("match"), json!(["get", "brand"])];
        for style in self.brands.iter().filter(|b| b.sort_key.is_some()) {
            sort_key.push(json!(style.name));
            sort_key.push(json!(style.sort_key));
        }
        sort_key.push(json!(DEFAULT_SORT_KEY));

        // A match expression needs at least one label/output pair.
        let sort_key = if sort_key.len() > 3 {
            Value::Array(sort_key)
        } else {
            json!(DEFAULT_SORT_KEY)
        };
        let color = if color.len() > 3 {
            Value::Array(color)
        } else {
            json!(DEFAULT_COLOR)
        };

        let mut layer = json!({
            "id": layer_id,
            "type": "circle",
            "source": source_id,
            "layout": { "circle-sort-key": sort_key },
            "paint": {
                "circle-radius": ["interpolate", ["linear"], ["zoom"], 5, 2, 10, 6, 15, 10],
                "circle-color": color,
            },
        });
        if let Some(filter) = brand.display_expression() {
            layer["filter"] = filter;
        }
        layer
    }
}

/// Load and validate the brand palette from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_brands(path: &Path) -> Result<BrandsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::BrandsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_brands(&content)
}

/// Parse and validate a brand palette from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_brands(content: &str) -> Result<BrandsFile, ConfigError> {
    let brands_file: BrandsFile = serde_yaml::from_str(content)?;
    validate_brands(&brands_file)?;
    Ok(brands_file)
}

fn is_hex_color(s: &str) -> bool {
    s.len() == 7 && s.starts_with('#') && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

fn validate_brands(brands_file: &BrandsFile) -> Result<(), ConfigError> {
    let mut seen_names = HashSet::new();

    for brand in &brands_file.brands {
        if brand.name.trim().is_empty() {
            return Err(ConfigError::Validation(
                "brand name must be non-empty".to_string(),
            ));
        }

        if !is_hex_color(&brand.color) {
            return Err(ConfigError::Validation(format!(
                "brand '{}' has invalid color '{}'; expected #rrggbb",
                brand.name, brand.color
            )));
        }

        // Matching is exact, so only exact duplicates are ambiguous.
        if !seen_names.insert(brand.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate brand name: '{}'",
                brand.name
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "brands_test.rs"]
mod tests;
