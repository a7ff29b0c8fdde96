//! HTTP surface for the search pipeline.

use crate::error::PipelineError;
use crate::pipeline::Pipeline;
use crate::results::SearchRequest;
use crate::session::SessionFactory;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    q: Option<String>,
}

/// Build the router with `/search` and `/health`
pub fn router<F: SessionFactory>(pipeline: Arc<Pipeline<F>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/search", get(search::<F>))
        .route("/health", get(health))
        .layer(cors)
        .with_state(pipeline)
}

/// Bind `listen_addr` and serve until the process stops
pub async fn serve<F: SessionFactory>(
    pipeline: Arc<Pipeline<F>>,
    listen_addr: &str,
) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    ::log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(pipeline)).await
}

async fn search<F: SessionFactory>(
    State(pipeline): State<Arc<Pipeline<F>>>,
    Query(params): Query<SearchParams>,
) -> Response {
    let request = match SearchRequest::new(params.q.as_deref().unwrap_or_default()) {
        Ok(request) => request,
        Err(e) => return client_error(&e),
    };

    match pipeline.run(&request).await {
        Ok(batch) => Json(batch.records).into_response(),
        Err(e) if e.is_client_error() => client_error(&e),
        Err(e) => internal_error(&e, pipeline.config().is_production()),
    }
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

fn client_error(error: &PipelineError) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": error.to_string() })),
    )
        .into_response()
}

fn internal_error(error: &PipelineError, production: bool) -> Response {
    let body = if production {
        json!({ "error": "Internal server error" })
    } else {
        json!({ "error": "Internal server error", "details": error.to_string() })
    };
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
}
