//! Decoding of the inference service's server-sent-event stream into plain
//! text fragments.

use super::types::TextGenerationStreamOutput;
use crate::{Error, Result};
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{
    future,
    stream::{BoxStream, Stream, StreamExt},
};
use std::fmt::Display;
use tracing::trace;

/// Ordered text fragments produced by a backend.
pub type FragmentStream = BoxStream<'static, Result<String>>;

/// Tokens some models emit to close a sequence.
const END_OF_SEQUENCE_MARKERS: [&str; 3] = ["</s>", "<|endoftext|>", "<|end|>"];

pub fn decode_event_stream<S, E>(bytes: S) -> FragmentStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let outputs = bytes
        .eventsource()
        .filter_map(|event| {
            future::ready(match event {
                Ok(event) => parse_event(&event.data),
                Err(e) => Some(Err(Error::stream(e.to_string()))),
            })
        });

    text_fragments(outputs)
}

fn parse_event(data: &str) -> Option<Result<TextGenerationStreamOutput>> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }
    trace!("Received stream event: {}", data);
    Some(serde_json::from_str(data).map_err(Error::from))
}

/// Turns generation events into the text that reaches the client.
pub fn text_fragments<S>(outputs: S) -> FragmentStream
where
    S: Stream<Item = Result<TextGenerationStreamOutput>> + Send + 'static,
{
    outputs
        .scan(true, |at_start, output| {
            let fragment = match output {
                Ok(output) => extract_fragment(output, at_start),
                Err(e) => Some(Err(e)),
            };
            future::ready(Some(fragment))
        })
        .filter_map(future::ready)
        .boxed()
}

fn extract_fragment(
    output: TextGenerationStreamOutput,
    at_start: &mut bool,
) -> Option<Result<String>> {
    if let Some(error) = output.error {
        return Some(Err(Error::stream(error)));
    }

    let mut text = output.token.map(|token| token.text).unwrap_or_default();
    if *at_start {
        text = text.trim_start().to_string();
        if !text.is_empty() {
            *at_start = false;
        }
    }

    if text.is_empty() {
        return None;
    }
    // The closing event repeats the whole generation in `generated_text`
    if output.generated_text.is_some_and(|generated| !generated.is_empty()) {
        return None;
    }
    if END_OF_SEQUENCE_MARKERS.contains(&text.as_str()) {
        return None;
    }

    Some(Ok(text))
}
