use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Deserialize;
use storemap_core::filter::ALL;
use storemap_core::{
    apply_filters, BrandFilter, CodeFilter, FeatureCollection, FilterState, PopupDetails,
};

use crate::middleware::RequestId;

use super::{map_loader_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct StoresQuery {
    pub brand: Option<String>,
    pub codes: Option<String>,
}

fn selector(value: Option<&str>) -> &str {
    value.map(str::trim).filter(|s| !s.is_empty()).unwrap_or(ALL)
}

impl StoresQuery {
    fn filters(&self) -> FilterState {
        FilterState {
            brand: BrandFilter::from_selector(selector(self.brand.as_deref())),
            codes: CodeFilter::from_selector(selector(self.codes.as_deref())),
        }
    }
}

/// Filtered GeoJSON, independent of the viewer session.
pub(super) async fn list_stores(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<StoresQuery>,
) -> Result<Json<ApiResponse<FeatureCollection>>, ApiError> {
    let filters = query.filters();

    let allow_list = match &filters.codes {
        CodeFilter::All => None,
        CodeFilter::List(list_id) => Some(
            state
                .loader
                .load_allow_list(list_id)
                .await
                .map_err(|e| map_loader_error(req_id.0.clone(), &e))?,
        ),
    };

    let data = apply_filters(&state.stores, &filters, allow_list.as_ref()).map_err(|e| {
        tracing::error!(error = %e, "filter application failed");
        ApiError::new(req_id.0.clone(), "internal_error", e.to_string())
    })?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

/// Popup details for every store carrying `code`.
pub(super) async fn store_popup(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(code): Path<String>,
) -> Result<Json<ApiResponse<Vec<PopupDetails>>>, ApiError> {
    let data: Vec<PopupDetails> = state
        .stores
        .iter()
        .filter(|f| f.code() == Some(code.as_str()))
        .map(PopupDetails::for_feature)
        .collect();

    if data.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "not_found",
            format!("no store with code {code}"),
        ));
    }

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_code_lists(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<ApiResponse<Vec<String>>>, ApiError> {
    let data = state
        .loader
        .list_allow_lists(&state.stores_file)
        .await
        .map_err(|e| map_loader_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
