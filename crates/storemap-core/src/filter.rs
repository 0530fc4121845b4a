//! Brand and store-code filters over the canonical collection.

use serde_json::{json, Value};

use crate::allow_list::AllowList;
use crate::features::{FeatureCollection, PointFeature};
use crate::FilterError;

/// Selector value meaning "no restriction".
pub const ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BrandFilter {
    #[default]
    All,
    /// Exact, case-sensitive brand name.
    Brand(String),
}

impl BrandFilter {
    #[must_use]
    pub fn from_selector(value: &str) -> Self {
        if value == ALL {
            BrandFilter::All
        } else {
            BrandFilter::Brand(value.to_string())
        }
    }

    #[must_use]
    pub fn as_selector(&self) -> &str {
        match self {
            BrandFilter::All => ALL,
            BrandFilter::Brand(brand) => brand,
        }
    }

    #[must_use]
    pub fn matches(&self, feature: &PointFeature) -> bool {
        match self {
            BrandFilter::All => true,
            BrandFilter::Brand(brand) => feature.brand() == Some(brand.as_str()),
        }
    }

    /// MapLibre layer filter expression equivalent to this selector, or
    /// `None` to clear the layer filter.
    #[must_use]
    pub fn display_expression(&self) -> Option<Value> {
        match self {
            BrandFilter::All => None,
            BrandFilter::Brand(brand) => Some(json!(["==", ["get", "brand"], brand])),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CodeFilter {
    #[default]
    All,
    /// Allow-list file name.
    List(String),
}

impl CodeFilter {
    #[must_use]
    pub fn from_selector(value: &str) -> Self {
        if value == ALL {
            CodeFilter::All
        } else {
            CodeFilter::List(value.to_string())
        }
    }

    #[must_use]
    pub fn as_selector(&self) -> &str {
        match self {
            CodeFilter::All => ALL,
            CodeFilter::List(id) => id,
        }
    }
}

/// The two independent selectors driving what the map shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub brand: BrandFilter,
    pub codes: CodeFilter,
}

/// Derive the visible subset from the canonical collection.
///
/// Brand and code filters compose with AND. The result is always computed
/// from `canonical`, never from an earlier filtered subset, and keeps the
/// canonical order.
///
/// `allow_list` must be the list named by `state.codes` when that is a
/// [`CodeFilter::List`]; it is ignored for [`CodeFilter::All`].
///
/// # Errors
///
/// Returns [`FilterError`] if a list filter is selected without its matching
/// allow-list.
pub fn apply_filters(
    canonical: &FeatureCollection,
    state: &FilterState,
    allow_list: Option<&AllowList>,
) -> Result<FeatureCollection, FilterError> {
    let codes = match &state.codes {
        CodeFilter::All => None,
        CodeFilter::List(id) => match allow_list {
            Some(list) if list.id() == id => Some(list),
            Some(list) => {
                return Err(FilterError::AllowListMismatch {
                    expected: id.clone(),
                    actual: list.id().to_string(),
                })
            }
            None => {
                return Err(FilterError::AllowListMissing {
                    expected: id.clone(),
                })
            }
        },
    };

    Ok(canonical
        .iter()
        .filter(|feature| state.brand.matches(feature))
        .filter(|feature| {
            codes.is_none_or(|list| feature.code().is_some_and(|code| list.contains(code)))
        })
        .cloned()
        .collect())
}

#[cfg(test)]
#[path = "filter_test.rs"]
mod tests;
