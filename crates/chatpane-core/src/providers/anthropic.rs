use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::provider::{ChatEndpoint, ChatRequest};
use crate::config::{Credential, WidgetConfig};
use crate::error::EndpointError;

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(rename = "type")]
    kind: String,
}

/// Non-streaming client for the Messages API.
pub struct AnthropicEndpoint {
    client: Client,
    base_url: String,
    api_version: String,
}

impl AnthropicEndpoint {
    pub fn new(
        base_url: impl Into<String>,
        api_version: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, EndpointError> {
        let mut builder = Client::builder().user_agent("chatpane/0.1");
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let client = builder
            .build()
            .map_err(|e| EndpointError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_version: api_version.into(),
        })
    }

    pub fn from_config(config: &WidgetConfig) -> Result<Self, EndpointError> {
        Self::new(
            &config.base_url,
            &config.api_version,
            config.request_timeout(),
        )
    }

    fn url(&self) -> String {
        format!("{}/v1/messages", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl ChatEndpoint for AnthropicEndpoint {
    async fn complete(
        &self,
        credential: &Credential,
        request: &ChatRequest,
    ) -> Result<String, EndpointError> {
        let url = self.url();
        debug!(%url, model = %request.model, "sending message");

        // Transport errors drop the URL so host and port never reach the
        // auth markers.
        let resp = self
            .client
            .post(&url)
            .header("x-api-key", credential.expose())
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| EndpointError::Transport(e.without_url().to_string()))?;

        let status = resp.status();
        let body = resp
            .bytes()
            .await
            .map_err(|e| EndpointError::Transport(e.without_url().to_string()))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&body) {
                Ok(env) => EndpointError::Api {
                    status: status.as_u16(),
                    kind: env.error.kind,
                    message: env.error.message,
                },
                Err(_) => EndpointError::Status {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
            });
        }

        let parsed: MessagesResponse = serde_json::from_slice(&body)
            .map_err(|e| EndpointError::Decode(e.to_string()))?;
        match parsed.content.into_iter().next() {
            Some(ContentBlock {
                text: Some(text), ..
            }) => Ok(text),
            Some(block) => Err(EndpointError::Decode(format!(
                "first content block is {:?}, not text",
                block.kind
            ))),
            None => Err(EndpointError::Decode("reply has no content".into())),
        }
    }
}
