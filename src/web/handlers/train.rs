// POST /train: add a labeled example, save the model, grow the corpus.
//
// Body: {"text": "...", "label": "..."}. Training calls are serialized by
// the state's training lock. Persistence failures come back as
// 500 {"success": false, "message": ...}.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::corpus::TrainingExample;
use crate::training::train_example;
use crate::web::{api_error, AppState, MODEL_NOT_LOADED};

#[derive(Deserialize)]
pub struct TrainRequest {
    pub text: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TrainResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub async fn train(
    State(state): State<AppState>,
    body: Result<Json<TrainRequest>, JsonRejection>,
) -> Response {
    if state.model.read().await.is_none() {
        return api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_NOT_LOADED);
    }

    let example = match body {
        Ok(Json(TrainRequest {
            text: Some(text),
            label: Some(label),
        })) if !text.is_empty() && !label.is_empty() => TrainingExample { text, label },
        _ => return api_error(StatusCode::BAD_REQUEST, "Text and label are required"),
    };

    let _training = state.train_lock.lock().await;

    match train_example(&state.model, &state.config, &state.corpus, example).await {
        Ok(Some(outcome)) => {
            let message = if outcome.model_updated {
                "New sentence added and model updated!"
            } else {
                "Sentence stored, but it has no words the model can learn from"
            };
            Json(TrainResponse {
                success: true,
                message: Some(message.to_string()),
            })
            .into_response()
        }
        Ok(None) => api_error(StatusCode::SERVICE_UNAVAILABLE, MODEL_NOT_LOADED),
        Err(e) => {
            error!(error = ?e, "Failed to persist training example");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(TrainResponse {
                    success: false,
                    message: Some(format!("Failed to save training data: {e}")),
                }),
            )
                .into_response()
        }
    }
}
