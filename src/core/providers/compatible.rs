//! Client for OpenAI-compatible `/v1/chat/completions` endpoints.

use super::http_client::build_http_client_with_timeout;
use super::openai_types::{ChatRequest, ModelsResponse, RequestMessage};
use super::scrub::sanitize_api_error;
use super::streaming::{ChatEventStream, EventDecoder};
use crate::error::ChatError;
use crate::session::Message;
use crate::storage::Settings;
use futures_util::StreamExt;
use reqwest::{Client, Response};

pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Streaming chat-completions client. Holds no credentials: connection
/// settings are supplied per call.
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    temperature: f64,
}

pub fn chat_completions_url(api_base_url: &str) -> String {
    format!("{}/v1/chat/completions", api_base_url.trim().trim_end_matches('/'))
}

pub fn models_url(api_base_url: &str) -> String {
    format!("{}/v1/models", api_base_url.trim().trim_end_matches('/'))
}

impl ChatClient {
    pub fn new(temperature: f64, timeout_secs: u64) -> Self {
        Self::with_client(build_http_client_with_timeout(timeout_secs), temperature)
    }

    pub fn with_client(client: Client, temperature: f64) -> Self {
        Self {
            client,
            temperature,
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    fn build_request<'a>(&self, model: &'a str, messages: &'a [Message]) -> ChatRequest<'a> {
        ChatRequest {
            model,
            messages: messages
                .iter()
                .map(|message| RequestMessage {
                    role: message.role.as_str(),
                    content: &message.content,
                })
                .collect(),
            stream: true,
            temperature: self.temperature,
        }
    }

    /// Start one streamed completion.
    ///
    /// Fails before any network traffic when a setting is missing. A non-2xx
    /// status is read in full and returned as [`ChatError::RequestFailed`].
    /// Errors after the stream has started arrive as `Err` items.
    pub async fn stream_chat(
        &self,
        settings: &Settings,
        messages: &[Message],
    ) -> Result<ChatEventStream, ChatError> {
        settings.require_chat()?;

        let request = self.build_request(settings.model.trim(), messages);
        let response = self
            .client
            .post(chat_completions_url(&settings.api_base_url))
            .bearer_auth(settings.api_key.trim())
            .json(&request)
            .send()
            .await
            .map_err(|error| ChatError::TransportFailed {
                message: error.to_string(),
                partial: String::new(),
            })?;

        let response = ensure_success(response).await?;
        tracing::debug!(
            model = settings.model.as_str(),
            messages = messages.len(),
            "chat completion stream opened"
        );

        let mut byte_stream = response.bytes_stream();
        let stream = async_stream::try_stream! {
            let mut decoder = EventDecoder::new();

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = chunk_result?;
                for event in decoder.push(&chunk) {
                    yield event;
                }
                if decoder.is_finished() {
                    break;
                }
            }

            for event in decoder.finish() {
                yield event;
            }

            if decoder.skipped_lines() > 0 {
                tracing::warn!(
                    skipped = decoder.skipped_lines(),
                    "Skipped undecodable lines in chat stream"
                );
            }
        };

        Ok(Box::pin(stream))
    }

    /// Model IDs offered by the endpoint, sorted.
    pub async fn list_models(&self, settings: &Settings) -> Result<Vec<String>, ChatError> {
        settings.require_endpoint()?;

        let response = self
            .client
            .get(models_url(&settings.api_base_url))
            .bearer_auth(settings.api_key.trim())
            .send()
            .await
            .map_err(|error| ChatError::TransportFailed {
                message: error.to_string(),
                partial: String::new(),
            })?;

        let response = ensure_success(response).await?;
        let status = response.status().as_u16();
        let models: ModelsResponse =
            response
                .json()
                .await
                .map_err(|error| ChatError::RequestFailed {
                    status,
                    body: format!("undecodable models list: {error}"),
                })?;

        let mut ids: Vec<String> = models.data.into_iter().map(|model| model.id).collect();
        ids.sort();
        ids.dedup();
        Ok(ids)
    }
}

async fn ensure_success(response: Response) -> Result<Response, ChatError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());
    let body = sanitize_api_error(&body);
    tracing::warn!(status = status.as_u16(), "upstream request failed: {body}");

    Err(ChatError::RequestFailed {
        status: status.as_u16(),
        body,
    })
}
