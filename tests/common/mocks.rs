use async_trait::async_trait;
use chat_stream_proxy::{
    Error, Result,
    llm::{FragmentStream, TextGenerationBackend, TextGenerationRequest},
};
use futures::{StreamExt, stream};
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

/// Mock text-generation backend for testing
#[derive(Debug, Default)]
pub struct MockBackend {
    pub fragments: Vec<String>,
    pub requests: Arc<Mutex<Vec<TextGenerationRequest>>>,
    pub calls: Arc<AtomicUsize>,
    pub error: Option<String>,
    pub mid_stream_error: Option<String>,
    pub hang_after_fragments: bool,
    pub released: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fragments(mut self, fragments: &[&str]) -> Self {
        self.fragments = fragments.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn with_error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn with_mid_stream_error(mut self, error: &str) -> Self {
        self.mid_stream_error = Some(error.to_string());
        self
    }

    /// Never finishes after the configured fragments, like a slow generation.
    pub fn hanging(mut self) -> Self {
        self.hang_after_fragments = true;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn get_requests(&self) -> Vec<TextGenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Whether the stream handed out by the last call has been dropped.
    pub fn stream_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Flags the shared marker once the stream owning it is dropped.
struct ReleaseGuard(Arc<AtomicBool>);

impl Drop for ReleaseGuard {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextGenerationBackend for MockBackend {
    async fn text_generation_stream(
        &self,
        request: TextGenerationRequest,
    ) -> Result<FragmentStream> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);

        if let Some(ref error) = self.error {
            return Err(Error::upstream(Some(503), error.clone()));
        }

        let mut items: Vec<Result<String>> = self.fragments.iter().cloned().map(Ok).collect();
        if let Some(ref error) = self.mid_stream_error {
            items.push(Err(Error::stream(error.clone())));
        }

        let guard = ReleaseGuard(self.released.clone());
        let fragments = stream::iter(items).map(move |item| {
            let _guard = &guard;
            item
        });

        if self.hang_after_fragments {
            Ok(fragments.chain(stream::pending()).boxed())
        } else {
            Ok(fragments.boxed())
        }
    }
}
