//! GeoJSON point features produced by the builder.

use serde::{Deserialize, Serialize};

/// A GeoJSON `Point` geometry. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Point")]
pub struct Point {
    pub coordinates: [f64; 2],
}

impl Point {
    #[must_use]
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            coordinates: [longitude, latitude],
        }
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreProperties {
    pub code: Option<String>,
    pub store_name: Option<String>,
    pub brand: Option<String>,
}

/// A single store marker.
///
/// `geometry` is `None` (serialized as `null`) when the source row had no
/// usable coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "Feature")]
pub struct PointFeature {
    pub properties: StoreProperties,
    pub geometry: Option<Point>,
}

impl PointFeature {
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.properties.code.as_deref()
    }

    #[must_use]
    pub fn brand(&self) -> Option<&str> {
        self.properties.brand.as_deref()
    }

    #[must_use]
    pub fn store_name(&self) -> Option<&str> {
        self.properties.store_name.as_deref()
    }
}

/// Ordered features, in source row order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "FeatureCollection")]
pub struct FeatureCollection {
    pub features: Vec<PointFeature>,
}

impl FeatureCollection {
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PointFeature> {
        self.features.iter()
    }

    /// Distinct brands with their feature counts, in order of first appearance.
    #[must_use]
    pub fn brand_counts(&self) -> Vec<(String, usize)> {
        let mut counts: Vec<(String, usize)> = Vec::new();
        for brand in self.features.iter().filter_map(PointFeature::brand) {
            match counts.iter_mut().find(|(name, _)| name == brand) {
                Some((_, count)) => *count += 1,
                None => counts.push((brand.to_string(), 1)),
            }
        }
        counts
    }
}

impl FromIterator<PointFeature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = PointFeature>>(iter: I) -> Self {
        Self {
            features: iter.into_iter().collect(),
        }
    }
}
