//! HttpChatTransport - OpenAI-compatible chat-completions client.
//!
//! Posts the conversation to `{base_url}/v1/chat/completions` as a
//! non-streaming request and reads back the first choice plus the optional
//! `visualizations` extension the study-assistant backend adds.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use scholar_core::session::{ImagePayload, Visualization};
use scholar_core::transport::{AssistantReply, ChatTransport, ChatTurn, TransportFailure};
use scholar_infrastructure::config::{DEFAULT_MODEL, EndpointConfig};
use serde::{Deserialize, Serialize};

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Transport that talks to the assistant over HTTP.
#[derive(Clone)]
pub struct HttpChatTransport {
    client: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpChatTransport {
    /// Creates a transport for the backend at `base_url` using the default model.
    pub fn new(base_url: impl AsRef<str>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    fn with_client(client: Client, base_url: impl AsRef<str>) -> Self {
        Self {
            client,
            endpoint: format!("{}{}", base_url.as_ref().trim_end_matches('/'), COMPLETIONS_PATH),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }

    /// Builds a transport from the endpoint section of the app config.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be constructed (TLS backend
    /// initialisation).
    pub fn from_config(config: &EndpointConfig) -> Result<Self, TransportFailure> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| TransportFailure::Network(format!("failed to build HTTP client: {e}")))?;

        let transport = Self::with_client(client, &config.base_url).with_model(&config.model);
        Ok(match &config.api_key {
            Some(key) => transport.with_api_key(key),
            None => transport,
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sends a bearer token with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn send_request(
        &self,
        body: &ChatCompletionRequest<'_>,
    ) -> Result<AssistantReply, TransportFailure> {
        let mut request = self.client.post(&self.endpoint).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|err| {
            TransportFailure::Network(format!("assistant request failed: {err}"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            return Err(map_http_error(status, &body_text));
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
            TransportFailure::MalformedResponse(format!(
                "failed to parse assistant response: {err}"
            ))
        })?;

        extract_reply(parsed)
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send(&self, history: Vec<ChatTurn>) -> Result<AssistantReply, TransportFailure> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: &history,
            stream: false,
        };

        tracing::debug!("Sending {} turns to {}", history.len(), self.endpoint);
        let result = self.send_request(&request).await;
        if let Err(err) = &result {
            tracing::warn!("Assistant request to {} failed: {}", self.endpoint, err);
        }
        result
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatTurn],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    visualizations: Option<Vec<VisualizationPayload>>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct VisualizationPayload {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    image_base64: String,
}

/// Error bodies come either as `{"error": "text"}` (the study backend) or
/// `{"error": {"message": "text"}}` (OpenAI style).
#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Text(String),
    Detailed { message: String },
}

fn extract_reply(response: ChatCompletionResponse) -> Result<AssistantReply, TransportFailure> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .ok_or_else(|| {
            TransportFailure::MalformedResponse(
                "assistant returned no content in the response".into(),
            )
        })?;

    let visualizations = response
        .visualizations
        .unwrap_or_default()
        .into_iter()
        .map(|viz| Visualization {
            title: viz.title,
            description: viz.description,
            image: ImagePayload::from_base64(viz.image_base64),
        })
        .collect();

    Ok(AssistantReply {
        content,
        visualizations,
    })
}

fn map_http_error(status: StatusCode, body: &str) -> TransportFailure {
    let message = serde_json::from_str::<ErrorResponse>(body)
        .map(|wrapper| match wrapper.error {
            ErrorBody::Text(text) => text,
            ErrorBody::Detailed { message } => message,
        })
        .unwrap_or_else(|_| body.to_string());

    TransportFailure::Status {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scholar_core::transport::ChatRole;

    #[test]
    fn test_request_body_shape() {
        let history = vec![
            ChatTurn::new(ChatRole::User, "hello"),
            ChatTurn::new(ChatRole::Assistant, "hi"),
        ];
        let body = ChatCompletionRequest {
            model: "LMS-MODEL",
            messages: &history,
            stream: false,
        };

        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "LMS-MODEL",
                "messages": [
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi"}
                ],
                "stream": false
            })
        );
    }

    #[test]
    fn test_endpoint_joins_without_double_slash() {
        let transport = HttpChatTransport::new("http://localhost:8000/");
        assert_eq!(transport.endpoint(), "http://localhost:8000/v1/chat/completions");
    }

    #[test]
    fn test_empty_choices_is_malformed() {
        let response: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            extract_reply(response),
            Err(TransportFailure::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_null_content_is_malformed() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;
        let response: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert!(extract_reply(response).is_err());
    }

    #[test]
    fn test_error_body_variants() {
        let plain = map_http_error(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error": "db down"}"#);
        assert_eq!(
            plain,
            TransportFailure::Status {
                status: 500,
                message: "db down".to_string()
            }
        );

        let detailed = map_http_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error": {"message": "bad key", "type": "auth"}}"#,
        );
        assert!(matches!(
            detailed,
            TransportFailure::Status { status: 401, ref message } if message == "bad key"
        ));

        let raw = map_http_error(StatusCode::BAD_GATEWAY, "upstream exploded");
        assert!(matches!(
            raw,
            TransportFailure::Status { status: 502, ref message } if message == "upstream exploded"
        ));
    }
}
