use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tokio::time::{timeout, Duration};

use crate::config::ServiceConfig;

pub const SYSTEM_INSTRUCTION: &str = r#"Hello, you are an AI agent dedicated to task management. Your duty is to identify in the conversation with the user, the name of the assigned task(s), identify the people mentioned in it, identify and categorize the task according to the type (family, work, or other), identify the date to perform it.

Crucial Instruction: YOU MUST RESPOND ONLY with a valid JSON object matching the following TypeScript structure. DO NOT include any introductory or conversational text, markdown formatting (like triple backticks ```), or extra characters outside of the JSON object.

JSON STRUCTURE:
{
  "taskName": [string],
  "peopleInvolved": [string],
  "taskCategory": ["Family" | "Work" | "Other"],
  "dateToPerform": string,
  "modelResponse": string
}"#;

const MAX_TOKENS: u32 = 13107;
const TEMPERATURE: f64 = 0.7;
const TOP_P: f64 = 0.95;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("chat completion request timed out")]
    Timeout,
    #[error("failed to send chat completion request: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("chat completion request failed ({status}): {body}")]
    Upstream { status: StatusCode, body: String },
    #[error("failed to decode chat completion response: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("chat completion contained no message content")]
    EmptyCompletion,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    frequency_penalty: f64,
    presence_penalty: f64,
    stop: Option<&'a str>,
}

impl<'a> ChatCompletionRequest<'a> {
    pub(crate) fn new(deployment: &'a str, prompt: &'a str) -> Self {
        Self {
            model: deployment,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_INSTRUCTION,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            top_p: TOP_P,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            stop: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl ChatCompletionResponse {
    fn into_content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|content| !content.trim().is_empty())
    }
}

/// Thin adapter over the Azure OpenAI chat-completions endpoint of a single
/// deployment. One instance is shared by every request.
pub struct CompletionClient {
    http: reqwest::Client,
    config: ServiceConfig,
    request_timeout: Option<Duration>,
}

impl CompletionClient {
    pub fn new(config: ServiceConfig, request_timeout: Option<Duration>) -> Self {
        tracing::info!(
            deployment = %config.deployment_name,
            "Azure OpenAI client initialised"
        );
        Self {
            http: reqwest::Client::new(),
            config,
            request_timeout,
        }
    }

    pub(crate) fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions",
            self.config.endpoint, self.config.deployment_name
        )
    }

    /// Sends the system instruction and `prompt` to the deployment and returns
    /// the raw text of the first choice. Failures are logged here; callers only
    /// decide how to surface them.
    pub async fn get_chat_completion(&self, prompt: &str) -> Result<String, CompletionError> {
        self.request_completion(prompt).await.inspect_err(|err| {
            tracing::error!(error = %err, "Azure OpenAI call failed");
        })
    }

    async fn request_completion(&self, prompt: &str) -> Result<String, CompletionError> {
        let payload = ChatCompletionRequest::new(&self.config.deployment_name, prompt);

        let fut = self
            .http
            .post(self.completions_url())
            .query(&[("api-version", self.config.api_version.as_str())])
            .header("api-key", &self.config.api_key)
            .json(&payload)
            .send();

        let response = match self.request_timeout {
            Some(limit) => timeout(limit, fut)
                .await
                .map_err(|_| CompletionError::Timeout)?,
            None => fut.await,
        }
        .map_err(CompletionError::Transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response body>".to_string());
            return Err(CompletionError::Upstream { status, body });
        }

        let completion: ChatCompletionResponse =
            response.json().await.map_err(CompletionError::Decode)?;

        completion
            .into_content()
            .ok_or(CompletionError::EmptyCompletion)
    }
}
