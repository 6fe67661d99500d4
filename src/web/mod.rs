// Web server: Axum-based JSON API around the classifier.
//
// The server starts listening immediately and loads the model in a
// background task. Until the load finishes, /predict, /train and
// /debug-features answer 503.

use std::sync::Arc;

use anyhow::Result;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::sync::{Mutex, RwLock};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::classifier::SepitoriModel;
use crate::config::Config;
use crate::corpus::Corpus;
use crate::training::load_or_bootstrap;

pub mod handlers;

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// None until the startup load completes
    pub model: Arc<RwLock<Option<SepitoriModel>>>,
    pub corpus: Corpus,
    /// Serializes training so corpus read-modify-write cycles never overlap
    pub train_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// State with no model loaded yet.
    pub fn new(config: Config) -> Self {
        let corpus = Corpus::new(&config.corpus_path);
        Self {
            config: Arc::new(config),
            model: Arc::new(RwLock::new(None)),
            corpus,
            train_lock: Arc::new(Mutex::new(())),
        }
    }

    /// State with an already-loaded model.
    pub fn with_model(config: Config, model: SepitoriModel) -> Self {
        let state = Self::new(config);
        Self {
            model: Arc::new(RwLock::new(Some(model))),
            ..state
        }
    }
}

/// Load (or bootstrap) the model in a background tokio task.
/// Returns immediately. On failure the model stays unloaded.
pub fn launch_model_load(state: AppState) {
    tokio::spawn(async move {
        match load_or_bootstrap(&state.config).await {
            Ok(model) => {
                info!(
                    features = model.feature_count(),
                    documents = model.total_documents(),
                    "Model loaded and ready"
                );
                *state.model.write().await = Some(model);
            }
            Err(e) => {
                error!(error = ?e, "Failed to load model");
            }
        }
    });
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(config: Config, port: u16, bind: &str) -> Result<()> {
    let state = AppState::new(config);
    launch_model_load(state.clone());

    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    info!("API running on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route("/train", post(handlers::train::train))
        .route("/debug-features", get(handlers::debug::debug_features))
        .route("/health", get(health))
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness check: always 200, reports whether the model is ready.
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let model_loaded = state.model.read().await.is_some();
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "ok", "model_loaded": model_loaded })),
    )
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

pub const MODEL_NOT_LOADED: &str = "Model not loaded yet";
