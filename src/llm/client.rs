use super::{
    stream::{FragmentStream, decode_event_stream},
    types::*,
};
use crate::{Error, Result, config::InferenceConfig};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use tracing::debug;

/// A text-generation service that streams its output.
///
/// The returned stream is lazy: errors raised before it is returned mean no
/// generation was started, errors yielded by it are mid-stream failures.
#[async_trait]
pub trait TextGenerationBackend: Send + Sync {
    async fn text_generation_stream(
        &self,
        request: TextGenerationRequest,
    ) -> Result<FragmentStream>;
}

pub struct HuggingFaceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HuggingFaceClient {
    pub fn new(config: InferenceConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        }
    }

    fn model_url(&self, model: &str) -> String {
        format!("{}/models/{}", self.base_url, model)
    }
}

#[async_trait]
impl TextGenerationBackend for HuggingFaceClient {
    async fn text_generation_stream(
        &self,
        request: TextGenerationRequest,
    ) -> Result<FragmentStream> {
        let url = self.model_url(&request.model);
        debug!(
            "Requesting streamed generation from {} ({} prompt bytes)",
            url,
            request.inputs.len()
        );

        let payload = TextGenerationPayload {
            inputs: &request.inputs,
            parameters: &request.parameters,
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header(ACCEPT, "text/event-stream")
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(upstream_error(response).await);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !content_type.starts_with("text/event-stream") {
            return Err(Error::upstream(
                Some(status.as_u16()),
                format!(
                    "Server does not support event stream content type, it returned {}",
                    content_type
                ),
            ));
        }

        debug!("Generation stream opened with status {}", status);
        Ok(decode_event_stream(response.bytes_stream()))
    }
}

async fn upstream_error(response: reqwest::Response) -> Error {
    let status = response.status().as_u16();
    let is_json = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"));

    if is_json {
        if let Ok(body) = response.json::<UpstreamErrorBody>().await {
            match body.error {
                Some(serde_json::Value::String(message)) => {
                    return Error::upstream(Some(status), message);
                }
                Some(other) => return Error::upstream(Some(status), other.to_string()),
                None => {}
            }
        }
    }

    Error::upstream(
        Some(status),
        format!("Server response contains error: {}", status),
    )
}
