use axum::{extract::State, Extension, Json};
use serde::Deserialize;
use storemap_core::{BrandFilter, CodeFilter, Event, ViewState};

use crate::middleware::RequestId;
use crate::session::SessionSnapshot;

use super::{map_session_closed, ApiError, ApiResponse, AppState, ResponseMeta};

pub(super) async fn get_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SessionSnapshot>> {
    Json(ApiResponse {
        data: state.session.snapshot(),
        meta: ResponseMeta::new(req_id.0),
    })
}

#[derive(Debug, Deserialize)]
pub(super) struct FiltersUpdate {
    pub brand: Option<String>,
    pub codes: Option<String>,
}

/// Apply selector changes. Brand is applied first, then codes.
///
/// A code-list selection is answered once the list has been applied or
/// rejected, or when `list_wait` elapses with the request still pending.
pub(super) async fn update_filters(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(update): Json<FiltersUpdate>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError> {
    if update.brand.is_none() && update.codes.is_none() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "expected at least one of brand, codes",
        ));
    }
    let blank = [&update.brand, &update.codes]
        .into_iter()
        .flatten()
        .any(|s| s.trim().is_empty());
    if blank {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "selectors must not be blank",
        ));
    }

    let mut snapshot = state.session.snapshot();

    if let Some(brand) = update.brand {
        snapshot = state
            .session
            .dispatch(Event::BrandChanged(BrandFilter::from_selector(&brand)))
            .await
            .map_err(|e| map_session_closed(req_id.0.clone(), &e))?;
    }

    if let Some(codes) = update.codes {
        snapshot = state
            .session
            .dispatch(Event::CodeFilterChanged(CodeFilter::from_selector(&codes)))
            .await
            .map_err(|e| map_session_closed(req_id.0.clone(), &e))?;

        if let Some(ticket) = snapshot.pending.as_ref().map(|p| p.ticket) {
            match tokio::time::timeout(state.list_wait, state.session.settled(ticket)).await {
                Ok(settled) => {
                    snapshot = settled.map_err(|e| map_session_closed(req_id.0.clone(), &e))?;
                }
                Err(_) => {
                    tracing::warn!(ticket, "code list still pending; answering with current state");
                }
            }
        }
    }

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn update_view(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(view): Json<ViewState>,
) -> Result<Json<ApiResponse<SessionSnapshot>>, ApiError> {
    if !view.is_valid() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "center and zoom must be finite",
        ));
    }

    let snapshot = state
        .session
        .dispatch(Event::ViewMoved(view))
        .await
        .map_err(|e| map_session_closed(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: snapshot,
        meta: ResponseMeta::new(req_id.0),
    }))
}
