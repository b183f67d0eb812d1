use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;

use crate::AppState;

use super::models::{ChatRequest, ChatResponse, ErrorResponse, ModelAnswer};

pub const AI_SERVICE_ERROR: &str = "Error al procesar la solicitud con el servicio de IA.";
pub const INTERNAL_ERROR: &str = "Internal server error";

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            status_code: status.as_u16(),
            message: message.into(),
        }),
    )
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(payload) = payload.map_err(|rejection| {
        api_error(StatusCode::BAD_REQUEST, rejection.body_text())
    })?;

    let prompt = match payload.prompt {
        Some(prompt) if !prompt.trim().is_empty() => prompt,
        _ => {
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                "prompt must be a non-empty string",
            ))
        }
    };

    tracing::debug!(prompt_len = prompt.len(), "dispatching chat completion");

    let text = state
        .completions
        .get_chat_completion(&prompt)
        .await
        .map_err(|_| api_error(StatusCode::INTERNAL_SERVER_ERROR, AI_SERVICE_ERROR))?;

    let response = parse_answer(&text)?;
    Ok(Json(ChatResponse { response }))
}

/// Decodes the model text and checks it against the documented answer shape.
/// The decoded value is returned untouched.
fn parse_answer(text: &str) -> Result<Value, ApiError> {
    let value: Value = serde_json::from_str(text).map_err(|err| {
        tracing::error!(error = %err, "model answer is not valid JSON");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    })?;

    ModelAnswer::from_value(&value).map_err(|err| {
        tracing::error!(error = %err, "model answer does not match the task schema");
        api_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR)
    })?;

    Ok(value)
}

pub async fn not_found() -> Response {
    api_error(StatusCode::NOT_FOUND, "route not found").into_response()
}

#[cfg(test)]
mod tests {
    use super::parse_answer;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn parse_answer_returns_value_verbatim() {
        let text = r#"{"taskName":"Call mom","peopleInvolved":["mom"],"taskCategory":"Family","dateToPerform":"tomorrow","modelResponse":"Sure.","extra":1}"#;

        let value = parse_answer(text).unwrap();
        assert_eq!(value["extra"], json!(1));
        assert_eq!(value["peopleInvolved"], json!(["mom"]));
    }

    #[test]
    fn parse_answer_rejects_prose() {
        let (status, body) = parse_answer("Sure! I will remind you.").unwrap_err();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0.message, super::INTERNAL_ERROR);
    }

    #[test]
    fn parse_answer_rejects_wrong_shape() {
        assert!(parse_answer(r#"{"answer":"hi"}"#).is_err());
    }
}
