mod handlers;
mod models;

use axum::{routing::post, Router};

use crate::AppState;

pub use handlers::{chat, not_found, AI_SERVICE_ERROR, INTERNAL_ERROR};
pub use models::{ChatRequest, ChatResponse, ErrorResponse, ModelAnswer, OneOrMany, TaskCategory};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/openai/chat", post(chat))
        .fallback(not_found)
        .with_state(state)
}
