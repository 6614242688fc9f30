use super::types::{ChatMessage, GenerationParameters, TextGenerationRequest};

pub const MODEL_ID: &str = "microsoft/DialoGPT-medium";

/// Appended after the history so the model continues as the assistant.
pub const ASSISTANT_TURN_MARKER: &str = "AI:";

pub const GENERATION_PARAMETERS: GenerationParameters = GenerationParameters {
    max_new_tokens: 200,
    temperature: 0.7,
    top_p: 0.95,
    repetition_penalty: 1.2,
};

/// Flattens the conversation into `"{role}: {content}\n"` lines followed by
/// the assistant turn marker.
pub fn build_prompt(messages: &[ChatMessage]) -> String {
    let mut prompt = String::new();
    for message in messages {
        prompt.push_str(&message.role);
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push('\n');
    }
    prompt.push_str(ASSISTANT_TURN_MARKER);
    prompt
}

pub fn generation_request(messages: &[ChatMessage]) -> TextGenerationRequest {
    TextGenerationRequest {
        model: MODEL_ID.to_string(),
        inputs: build_prompt(messages),
        parameters: GENERATION_PARAMETERS,
    }
}
