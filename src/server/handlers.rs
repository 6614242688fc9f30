use super::types::ErrorResponse;
use crate::llm::{ChatRequest, FragmentStream, TextGenerationBackend, generation_request};
use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{
        HeaderValue, Method, StatusCode,
        header::{ALLOW, CONTENT_TYPE},
    },
    response::{IntoResponse, Json, Response},
};
use futures::TryStreamExt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

/// Largest request body buffered before it is rejected.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn TextGenerationBackend>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn TextGenerationBackend>) -> Self {
        Self {
            backend,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Why a chat request ended before any generated text was streamed.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(Method),

    #[error("Failed to read request body: {0}")]
    UnreadableBody(axum::Error),

    #[error("Malformed chat request: {0}")]
    MalformedRequest(#[from] serde_json::Error),

    #[error("Text generation failed: {0}")]
    Upstream(#[from] crate::Error),
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match self {
            Self::MethodNotAllowed(_) => (
                StatusCode::METHOD_NOT_ALLOWED,
                [
                    (CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8")),
                    (ALLOW, HeaderValue::from_static("POST")),
                ],
                "Method Not Allowed",
            )
                .into_response(),
            // Client errors are deliberately indistinguishable from upstream outages
            Self::UnreadableBody(_) | Self::MalformedRequest(_) | Self::Upstream(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::generic()),
            )
                .into_response(),
        }
    }
}

/// Validates the request, builds the prompt and opens the generation stream.
///
/// The body is only buffered once the method has been accepted.
pub async fn process_chat_request(
    backend: &dyn TextGenerationBackend,
    method: &Method,
    body: Body,
    max_body_bytes: usize,
) -> Result<FragmentStream, ChatError> {
    if method != Method::POST {
        return Err(ChatError::MethodNotAllowed(method.clone()));
    }

    let body = axum::body::to_bytes(body, max_body_bytes)
        .await
        .map_err(ChatError::UnreadableBody)?;
    let request: ChatRequest = serde_json::from_slice(&body)?;
    debug!("Building prompt from {} messages", request.messages.len());

    let generation = generation_request(&request.messages);
    let fragments = backend.text_generation_stream(generation).await?;

    Ok(fragments)
}

pub async fn chat(State(state): State<AppState>, request: Request) -> Response {
    let request_id = Uuid::new_v4();
    let (parts, body) = request.into_parts();

    async move {
        match process_chat_request(
            state.backend.as_ref(),
            &parts.method,
            body,
            state.max_body_bytes,
        )
        .await
        {
            Ok(fragments) => {
                info!("Streaming generation to client");
                streaming_response(fragments, request_id)
            }
            Err(e @ ChatError::MethodNotAllowed(_)) => {
                debug!("Rejected request: {}", e);
                e.into_response()
            }
            Err(e) => {
                error!(error = %e, "Error in chat API");
                e.into_response()
            }
        }
    }
    .instrument(info_span!("chat_request", %request_id))
    .await
}

/// Frames the fragment stream as a chunked `text/plain` body.
///
/// The body pulls from the backend lazily; dropping it (client went away)
/// drops the upstream stream with it.
pub fn streaming_response(fragments: FragmentStream, request_id: Uuid) -> Response {
    let body = fragments
        .inspect_err(move |e| warn!(%request_id, error = %e, "Generation stream aborted"))
        .map_ok(Bytes::from);

    (
        StatusCode::OK,
        [(CONTENT_TYPE, HeaderValue::from_static("text/plain; charset=utf-8"))],
        Body::from_stream(body),
    )
        .into_response()
}
