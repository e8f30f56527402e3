use std::sync::Arc;

use agent_core::Message;
use axum::extract::{Json as ExtractJson, State};
use axum::http::StatusCode;
use axum::response::{Html, Json};
use axum::routing::{get, post};
use axum::Router;
use base64::Engine;
use tracing::{debug, info};

pub mod errors;
pub mod markdown;
pub mod models;
pub mod rag;
pub mod state;

use errors::AppError;
use models::{ChatRequest, ChatResponse, PredictRequest, PredictResponse, StatusResponse};
use state::AppState;

const INDEX_PAGE: &str = include_str!("../assets/index.html");
const DRAW_PAGE: &str = include_str!("../assets/draw.html");

async fn index(State(state): State<Arc<AppState>>) -> Html<String> {
    let session_id = match state.sessions.lock() {
        Ok(mut sessions) => {
            let swept = sessions.remove_expired();
            if swept > 0 {
                debug!(swept, "dropped idle sessions");
            }
            sessions.create().to_string()
        }
        Err(_) => String::new(),
    };
    Html(INDEX_PAGE.replace("{{session_id}}", &session_id))
}

async fn draw() -> Html<&'static str> {
    Html(DRAW_PAGE)
}

async fn status(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        initialized: state.is_rag_initialized().await,
    })
}

async fn chat(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let message = request.message.trim().to_string();
    if message.is_empty() {
        return Err(AppError::ValidationError("Empty message".to_string()));
    }

    let rag = state.rag_service().await?;
    let (response, sources) = rag.answer(&message, request.show_sources).await?;

    if let Some(session_id) = request.session_id {
        if let Ok(mut sessions) = state.sessions.lock() {
            sessions.remove_expired();
            sessions.append(&session_id, Message::user(message.as_str()));
            sessions.append(&session_id, Message::assistant(response.clone()));
            if let Some(history) = sessions.history(&session_id) {
                debug!(session = %session_id, turns = history.len(), "session updated");
            }
        }
    }

    Ok(Json(ChatResponse { response, sources }))
}

async fn predict(
    State(state): State<Arc<AppState>>,
    ExtractJson(request): ExtractJson<PredictRequest>,
) -> Result<Json<PredictResponse>, AppError> {
    let classifier = state
        .classifier
        .as_ref()
        .ok_or_else(|| AppError::ClassifierError("Digit model not available".to_string()))?
        .clone();

    let encoded = strip_data_url_prefix(&request.image);
    let image_bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| AppError::ValidationError("Invalid image data".to_string()))?;

    let prediction = classifier
        .predict(&image_bytes)
        .map_err(|e| AppError::ValidationError(format!("An error occurred: {}", e)))?;

    Ok(Json(PredictResponse {
        digit: prediction.digit,
        probabilities: prediction.probabilities,
    }))
}

/// Canvas uploads arrive as `data:image/png;base64,<payload>`.
fn strip_data_url_prefix(image: &str) -> &str {
    match image.find("base64,") {
        Some(pos) => &image[pos + "base64,".len()..],
        None => image,
    }
}

async fn not_found() -> StatusCode {
    StatusCode::NOT_FOUND
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/draw", get(draw))
        .route("/chat", post(chat))
        .route("/status", get(status))
        .route("/predict", post(predict))
        .fallback(not_found)
        .with_state(state)
}

pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let bind = state.config.server.bind.clone();
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server running on http://{}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_strip_data_url_prefix() {
        assert_eq!(
            strip_data_url_prefix("data:image/png;base64,AAAA"),
            "AAAA"
        );
        assert_eq!(strip_data_url_prefix("AAAA"), "AAAA");
    }

    #[test]
    fn should_embed_session_placeholder_in_index_page() {
        assert!(INDEX_PAGE.contains("{{session_id}}"));
    }
}
