//! Store rows → point features, spreading out coincident markers.
//!
//! Several outlets often share one postal address. Stacked markers would
//! leave all but the top one unclickable, so the Nth row (0-indexed) that
//! rounds to an already-seen coordinate is nudged by `N × offset_step`
//! degrees on both axes. The first row at a location keeps its true position.
//!
//! Occurrences are counted per raw rounded coordinate. A row whose raw
//! position equals an earlier row's offset position is left where it is and
//! will overlap that marker.

use std::collections::HashMap;

use crate::features::{FeatureCollection, Point, PointFeature, StoreProperties};
use crate::records::StoreRecord;

/// About 5–6 metres at Japanese latitudes.
pub const DEFAULT_OFFSET_STEP: f64 = 0.000_05;

/// Occurrence indices wrap at this depth, bounding the offset at roughly
/// one degree.
pub const DEFAULT_MAX_STACK_DEPTH: usize = 20_000;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    pub offset_step: f64,
    pub max_stack_depth: usize,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            offset_step: DEFAULT_OFFSET_STEP,
            max_stack_depth: DEFAULT_MAX_STACK_DEPTH,
        }
    }
}

impl BuildOptions {
    #[must_use]
    pub fn from_app_config(config: &crate::AppConfig) -> Self {
        Self {
            offset_step: config.offset_step,
            max_stack_depth: config.max_stack_depth,
        }
    }
}

/// Summary of one conversion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub rows: usize,
    /// Rows kept with a null geometry because a coordinate did not parse.
    pub invalid_coordinates: usize,
    /// Rows moved off their true coordinate.
    pub offset_rows: usize,
}

/// Rounded coordinate used to detect coincident rows.
fn dedup_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6},{longitude:.6}")
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.and_then(|s| s.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Convert store rows into an ordered feature collection.
///
/// Every row yields exactly one feature, in input order. Rows whose latitude
/// or longitude is missing or not a finite number keep their properties but
/// get a null geometry, and do not take part in deduplication.
#[must_use]
pub fn build_features(
    records: &[StoreRecord],
    options: BuildOptions,
) -> (FeatureCollection, BuildReport) {
    let mut occurrences: HashMap<String, usize> = HashMap::new();
    let mut report = BuildReport {
        rows: records.len(),
        ..BuildReport::default()
    };
    let depth = options.max_stack_depth.max(1);

    let features = records
        .iter()
        .enumerate()
        .map(|(row, record)| {
            let properties = StoreProperties {
                code: record.code.clone(),
                store_name: record.name.clone(),
                brand: record.brand.clone(),
            };

            let latitude = parse_coordinate(record.latitude.as_deref());
            let longitude = parse_coordinate(record.longitude.as_deref());

            let geometry = if let (Some(lat), Some(lon)) = (latitude, longitude) {
                let seen = occurrences.entry(dedup_key(lat, lon)).or_insert(0);
                let stack_index = *seen % depth;
                *seen += 1;

                if stack_index > 0 {
                    report.offset_rows += 1;
                }
                // stack_index < depth, which is far below f64's exact integer range.
                #[allow(clippy::cast_precision_loss)]
                let offset = stack_index as f64 * options.offset_step;
                Some(Point::new(lon + offset, lat + offset))
            } else {
                report.invalid_coordinates += 1;
                tracing::warn!(
                    row,
                    code = record.code.as_deref().unwrap_or(""),
                    latitude = record.latitude.as_deref().unwrap_or(""),
                    longitude = record.longitude.as_deref().unwrap_or(""),
                    "store row has unusable coordinates; keeping it without geometry"
                );
                None
            };

            PointFeature {
                properties,
                geometry,
            }
        })
        .collect();

    tracing::debug!(
        rows = report.rows,
        invalid = report.invalid_coordinates,
        offset = report.offset_rows,
        "built store features"
    );

    (features, report)
}

#[cfg(test)]
#[path = "builder_test.rs"]
mod tests;
