use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{routing::get, routing::post, Json, Router};
use compliance_context::{categories, ComplianceRecord};
use serde_json::json;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::ask::{ask, AnswerMode, AskContext, AskError, AskRequest, AskResponse};
use crate::llm_client::{LlmClient, MockLlm};

const SERVICE_NAME: &str = "compliance_runner";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("invalid request body: {0}")]
    BadBody(String),
}

impl From<JsonRejection> for AppError {
    fn from(e: JsonRejection) -> Self {
        AppError::BadBody(e.body_text())
    }
}

impl From<AskError> for AppError {
    fn from(e: AskError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::Validation(_) | AppError::BadBody(_) => StatusCode::BAD_REQUEST,
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// A failed model call still carries a user-facing answer, but the status
/// tells the caller it is degraded.
fn status_for(resp: &AskResponse) -> StatusCode {
    match resp.mode {
        AnswerMode::ModelFailed => StatusCode::BAD_GATEWAY,
        AnswerMode::Fallback | AnswerMode::Model | AnswerMode::Offline => StatusCode::OK,
    }
}

pub fn app(ctx: AskContext) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/ask", post(ask_handler))
        .route("/api/answer", post(answer_handler))
        .with_state(Arc::new(ctx))
}

async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "available_endpoints": ["/health", "/status", "/ask", "/api/answer"],
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({"status": "healthy", "name": SERVICE_NAME}))
}

async fn status(State(ctx): State<Arc<AskContext>>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "compliance_data": {
            "loaded": !ctx.records.is_empty(),
            "total_frameworks": ctx.records.len(),
            "categories": categories(&ctx.records),
        },
        "profile": ctx.profile,
        "model": ctx.mode_name(),
    }))
}

async fn ask_handler(
    State(ctx): State<Arc<AskContext>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AskResponse>), AppError> {
    let Json(req) = body?;
    let resp = ask(&req, &ctx).await?;
    Ok((status_for(&resp), Json(resp)))
}

async fn answer_handler(
    State(ctx): State<Arc<AskContext>>,
    body: Result<Json<AskRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<serde_json::Value>), AppError> {
    let Json(req) = body?;
    let resp = ask(&req, &ctx).await?;
    let body = json!({
        "question": resp.question,
        "answer": resp.answer,
        "question_type": resp.question_type,
    });
    Ok((status_for(&resp), Json(body)))
}

pub async fn serve(addr: SocketAddr, ctx: AskContext) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, records = ctx.records.len(), model = ctx.mode_name(), "listening");
    axum::serve(listener, app(ctx)).await
}

pub async fn spawn_test_server(ctx: AskContext) -> (SocketAddr, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app(ctx)).await;
    });
    (addr, handle)
}

pub async fn spawn_test_server_with_mock(
    records: Vec<ComplianceRecord>,
    responses: Vec<String>,
) -> (SocketAddr, JoinHandle<()>) {
    let llm = LlmClient::Mock(MockLlm::new(responses));
    spawn_test_server(AskContext::new(records, Some(llm))).await
}
