use serde::{Deserialize, Serialize};

/// One turn of the incoming conversation. The role is a free-form label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    pub repetition_penalty: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextGenerationRequest {
    pub model: String,
    pub inputs: String,
    pub parameters: GenerationParameters,
}

/// Body posted to the hosted inference endpoint.
#[derive(Debug, Serialize)]
pub(crate) struct TextGenerationPayload<'a> {
    pub inputs: &'a str,
    pub parameters: &'a GenerationParameters,
    pub stream: bool,
}

/// One server-sent event of a streamed generation.
#[derive(Debug, Clone, Deserialize)]
pub struct TextGenerationStreamOutput {
    #[serde(default)]
    pub token: Option<StreamToken>,
    #[serde(default)]
    pub generated_text: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamToken {
    #[serde(default)]
    pub id: u32,
    pub text: String,
    #[serde(default)]
    pub logprob: Option<f32>,
    #[serde(default)]
    pub special: bool,
}

/// Error body returned by the inference service on non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct UpstreamErrorBody {
    pub error: Option<serde_json::Value>,
}
