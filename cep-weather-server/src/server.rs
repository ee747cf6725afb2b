use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use cep_weather_core::{TemperatureError, TemperatureResponse, TemperatureService};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const NOT_FOUND_BODY: &str = "can not find zipcode";
const INVALID_BODY: &str = "invalid zipcode";
const LOOKUP_FAILED_BODY: &str = "failed to query zipcode service";
const WEATHER_FAILED_BODY: &str = "failed to query weather service";
const METHOD_NOT_ALLOWED_BODY: &str = "method not allowed";

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    service: Arc<TemperatureService>,
    started_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    started_at: DateTime<Utc>,
    uptime_secs: u64,
}

/// Maps pipeline failures onto status codes and fixed plain-text bodies.
#[derive(Debug)]
pub struct ApiError(TemperatureError);

impl From<TemperatureError> for ApiError {
    fn from(err: TemperatureError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self.0 {
            TemperatureError::ZipcodeNotFound => (StatusCode::NOT_FOUND, NOT_FOUND_BODY),
            TemperatureError::InvalidZipcode => (StatusCode::UNPROCESSABLE_ENTITY, INVALID_BODY),
            TemperatureError::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, LOOKUP_FAILED_BODY),
            TemperatureError::Weather(_) => (StatusCode::INTERNAL_SERVER_ERROR, WEATHER_FAILED_BODY),
        };

        if status.is_server_error() {
            let err = anyhow::Error::new(self.0);
            error!("request failed: {err:#}");
        } else {
            info!(%status, reason = body, "postal code rejected");
        }

        (status, body).into_response()
    }
}

pub fn router(service: Arc<TemperatureService>) -> Router {
    let state = AppState { service, started_at: Utc::now() };

    Router::new()
        .route("/", get(temperature).fallback(method_not_allowed))
        .route("/healthz", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl-C.
pub async fn serve(addr: SocketAddr, service: Arc<TemperatureService>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C; graceful shutdown disabled");
        std::future::pending::<()>().await;
    }
    info!("HTTP server shutting down gracefully");
}

async fn temperature(
    method: Method,
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Response {
    // axum hands HEAD to GET routes; only a real GET runs the pipeline.
    if method != Method::GET {
        return method_not_allowed().await.into_response();
    }

    let cep = first_cep(&params);
    match state.service.temperature_for(cep).await {
        Ok(resp) => Json(resp).into_response(),
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// First `cep` value; a missing parameter behaves like an empty code.
fn first_cep(params: &[(String, String)]) -> &str {
    params.iter().find(|(k, _)| k == "cep").map(|(_, v)| v.as_str()).unwrap_or_default()
}

async fn method_not_allowed() -> impl IntoResponse {
    (StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED_BODY)
}

async fn health(State(state): State<AppState>) -> Json<Health> {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);

    Json(Health { status: "ok", started_at: state.started_at, uptime_secs: uptime as u64 })
}
