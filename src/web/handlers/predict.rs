// POST /predict: classify one text.
//
// Body: {"text": "..."}. Returns the final label, the raw per-label scores,
// the normalized confidences and the words the model has never seen.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::debug;

use crate::web::{api_error, AppState, MODEL_NOT_LOADED};

#[derive(Deserialize)]
pub struct PredictRequest {
    pub text: Option<String>,
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Response {
    let guard = state.model.read().await;
    let Some(model) = guard.as_ref() else {
        return api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_NOT_LOADED);
    };

    let text = match body {
        Ok(Json(PredictRequest { text: Some(text) })) if !text.is_empty() => text,
        _ => return api_error(StatusCode::BAD_REQUEST, "Text is required"),
    };

    let prediction = model.predict(&text);
    debug!(
        label = %prediction.final_label,
        unseen = prediction.probabilities.unseen_words.len(),
        "Prediction"
    );
    Json(prediction).into_response()
}
