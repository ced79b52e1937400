use crate::gui::handlers::{ClearedChat, GithubForm, GithubReset, UiHandlers, UploadedFile};
use crate::gui::page::INDEX_HTML;
use crate::models::ChatMessage;
use anyhow::{Context, Result};
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Largest accepted upload request
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

type AppState = Arc<dyn UiHandlers>;

#[derive(Debug, Deserialize)]
struct MessageRequest {
    message: String,
    #[serde(default)]
    history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct HistoryResponse {
    history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StatusResponse {
    status: String,
}

pub fn router(handlers: Arc<dyn UiHandlers>) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/api/message", post(process_message))
        .route("/api/memory/clear", post(clear_all_memory))
        .route(
            "/api/files",
            post(upload_files).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route("/api/knowledge-base/clear", post(clear_knowledge_base))
        .route("/api/github", post(load_github_repository))
        .route("/api/github/reset", post(reset_github_info))
        .layer(TraceLayer::new_for_http())
        .with_state(handlers)
}

/// Serve the GUI on `bind` until the process exits. With `open_browser` the
/// default browser is pointed at the page once the socket is bound.
pub async fn run_server(bind: &str, handlers: Arc<dyn UiHandlers>, open_browser: bool) -> Result<()> {
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("Invalid bind address: {}", bind))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    let url = browser_url(listener.local_addr()?);
    tracing::info!("open {} in your browser", url);

    if open_browser {
        let target = url.clone();
        tokio::task::spawn_blocking(move || {
            if let Err(e) = webbrowser::open(&target) {
                tracing::warn!(error = %e, url = %target, "could not launch a browser");
            }
        });
    }

    axum::serve(listener, router(handlers)).await?;
    Ok(())
}

/// Address a local browser can reach; wildcard binds map to loopback
pub(crate) fn browser_url(addr: SocketAddr) -> String {
    let host = match addr.ip() {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    format!("http://{}/", SocketAddr::new(host, addr.port()))
}

async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn process_message(State(handlers): State<AppState>, Json(request): Json<MessageRequest>) -> Json<HistoryResponse> {
    let history = handlers.process_message(&request.message, request.history).await;
    Json(HistoryResponse { history })
}

async fn clear_all_memory(State(handlers): State<AppState>) -> Json<ClearedChat> {
    Json(handlers.clear_all_memory().await)
}

async fn upload_files(State(handlers): State<AppState>, mut multipart: Multipart) -> Result<Json<StatusResponse>, ApiError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let name = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        let bytes = field.bytes().await?;
        files.push(UploadedFile {
            name,
            bytes: bytes.to_vec(),
        });
    }

    tracing::debug!(files = files.len(), "upload received");
    let status = handlers.upload_files(files).await;
    Ok(Json(StatusResponse { status }))
}

async fn clear_knowledge_base(State(handlers): State<AppState>) -> Json<StatusResponse> {
    let status = handlers.clear_knowledge_base().await;
    Json(StatusResponse { status })
}

async fn load_github_repository(State(handlers): State<AppState>, Json(form): Json<GithubForm>) -> Json<StatusResponse> {
    let status = handlers.load_github_repository(form).await;
    Json(StatusResponse { status })
}

async fn reset_github_info(State(handlers): State<AppState>) -> Json<GithubReset> {
    Json(handlers.reset_github_info().await)
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl From<MultipartError> for ApiError {
    fn from(value: MultipartError) -> Self {
        Self {
            status: value.status(),
            message: value.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let body = serde_json::json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}
