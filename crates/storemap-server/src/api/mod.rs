mod brands;
mod session;
mod stores;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use storemap_core::{BrandsFile, FeatureCollection};
use storemap_loader::{DataLoader, LoaderError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, RequestId};
use crate::session::{SessionClosed, SessionHandle};

#[derive(Clone)]
pub struct AppState {
    /// Canonical collection, built once at startup.
    pub stores: Arc<FeatureCollection>,
    pub brands: Arc<BrandsFile>,
    pub loader: DataLoader,
    pub stores_file: Arc<str>,
    pub session: SessionHandle,
    /// Upper bound on how long a filter update waits for its list.
    pub list_wait: Duration,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    stores: usize,
    session: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "bad_gateway" => StatusCode::BAD_GATEWAY,
            "unavailable" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self)).into_response()
    }
}

pub(super) fn map_loader_error(request_id: String, error: &LoaderError) -> ApiError {
    if error.is_not_found() {
        tracing::debug!(error = %error, "data file not found");
        return ApiError::new(request_id, "not_found", error.to_string());
    }
    match error {
        LoaderError::InvalidFileName(_) => {
            ApiError::new(request_id, "bad_request", error.to_string())
        }
        LoaderError::Http(_) | LoaderError::HttpStatus { .. } | LoaderError::Parse { .. } => {
            tracing::warn!(error = %error, "upstream data file unavailable");
            ApiError::new(request_id, "bad_gateway", error.to_string())
        }
        LoaderError::Io { .. } => {
            tracing::error!(error = %error, "data file read failed");
            ApiError::new(request_id, "internal_error", "data file read failed")
        }
    }
}

pub(super) fn map_session_closed(request_id: String, error: &SessionClosed) -> ApiError {
    tracing::error!(error = %error, "viewer session unavailable");
    ApiError::new(request_id, "unavailable", error.to_string())
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::PUT])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("x-request-id"),
        ])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/stores", get(stores::list_stores))
        .route("/api/v1/stores/{code}/popup", get(stores::store_popup))
        .route("/api/v1/code-lists", get(stores::list_code_lists))
        .route("/api/v1/brands", get(brands::list_brands))
        .route("/api/v1/layer", get(brands::layer_definition))
        .route("/api/v1/session", get(session::get_session))
        .route("/api/v1/session/filters", put(session::update_filters))
        .route("/api/v1/session/view", put(session::update_view))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> impl IntoResponse {
    let meta = ResponseMeta::new(req_id.0);
    let stores = state.stores.len();

    if state.session.is_running() {
        (
            StatusCode::OK,
            Json(ApiResponse {
                data: HealthData {
                    status: "ok",
                    stores,
                    session: "ok",
                },
                meta,
            }),
        )
    } else {
        tracing::warn!("health check: viewer session stopped");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiResponse {
                data: HealthData {
                    status: "degraded",
                    stores,
                    session: "stopped",
                },
                meta,
            }),
        )
    }
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
