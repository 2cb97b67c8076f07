//! HTTP API.
//!
//! Routes, shared application state and the server loop.

pub mod error;
pub mod handlers;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::analysis::DataProcessor;
use crate::config::ModelConfig;
use crate::ml::Predictor;

/// Services shared by every request, created once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub processor: Arc<DataProcessor>,
    pub predictor: Arc<Predictor>,
}

impl AppState {
    pub fn new(processor: DataProcessor, predictor: Predictor) -> Self {
        Self {
            processor: Arc::new(processor),
            predictor: Arc::new(predictor),
        }
    }

    /// Build fresh services from the model settings.
    pub fn from_config(model: &ModelConfig) -> Result<Self> {
        let predictor = Predictor::new(model.linear_model(), model.training_noise_std)
            .context("Failed to initialize predictor")?;
        Ok(Self::new(DataProcessor::new(), predictor))
    }
}

/// Build the application router.
pub fn router(state: AppState, cors: bool) -> Router {
    let router = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/process", post(handlers::process))
        .route("/api/predict", post(handlers::predict))
        .route("/api/predict/batch", post(handlers::predict_batch))
        .route("/api/model/importance", get(handlers::feature_importance))
        .route("/api/model/train", post(handlers::train))
        .route("/api/stats", get(handlers::stats))
        .route(
            "/api/users",
            get(handlers::list_users).post(handlers::create_user),
        )
        .layer(
            TraceLayer::new_for_http().on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state);

    if cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serve `app` on `listener` until `signal` resolves.
pub async fn serve<F>(listener: TcpListener, app: Router, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(signal)
        .await
        .context("HTTP server failed")?;
    Ok(())
}
