// GET /debug-features: how many features the model knows, and a sample.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::web::{api_error, AppState, MODEL_NOT_LOADED};

pub async fn debug_features(State(state): State<AppState>) -> Response {
    let guard = state.model.read().await;
    match guard.as_ref() {
        Some(model) => Json(serde_json::json!({
            "totalFeatures": model.feature_count(),
            "featureKeys": model.feature_keys(state.config.debug_feature_limit),
        }))
        .into_response(),
        None => api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_NOT_LOADED),
    }
}
