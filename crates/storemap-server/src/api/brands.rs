use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use storemap_core::BrandFilter;

use crate::middleware::RequestId;

use super::{ApiResponse, AppState, ResponseMeta};

pub(super) const STORES_SOURCE_ID: &str = "stores";
pub(super) const STORES_LAYER_ID: &str = "stores-circle";

#[derive(Debug, Serialize)]
pub(super) struct BrandItem {
    pub name: String,
    pub count: usize,
    pub color: String,
    pub sort_key: i32,
}

/// Brands present in the data, in order of first appearance.
pub(super) async fn list_brands(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<Vec<BrandItem>>> {
    let data = state
        .stores
        .brand_counts()
        .into_iter()
        .map(|(name, count)| BrandItem {
            color: state.brands.color_for(&name).to_string(),
            sort_key: state.brands.sort_key_for(&name),
            name,
            count,
        })
        .collect();

    Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct LayerQuery {
    pub brand: Option<String>,
}

pub(super) async fn layer_definition(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LayerQuery>,
) -> Json<ApiResponse<Value>> {
    let brand = query
        .brand
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map_or(BrandFilter::All, BrandFilter::from_selector);

    Json(ApiResponse {
        data: state
            .brands
            .circle_layer(STORES_LAYER_ID, STORES_SOURCE_ID, &brand),
        meta: ResponseMeta::new(req_id.0),
    })
}
