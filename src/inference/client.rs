use futures_util::future::ready;
use futures_util::stream::{self, StreamExt};
use genai::adapter::AdapterKind;
use genai::chat::{ChatMessage, ChatRequest, ChatStreamEvent};
use genai::resolver::{Endpoint, ServiceTargetResolver};
use genai::{Client, ModelIden, ServiceTarget};
use tracing::{debug, error};

use super::FragmentStream;
use super::error::InferenceError;

#[derive(Clone)]
/// Streaming chat client pinned to one model on one Ollama-compatible endpoint.
pub struct GenaiInference {
    client: Client,
    endpoint: String,
    model: String,
}

impl std::fmt::Debug for GenaiInference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiInference")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish()
    }
}

impl GenaiInference {
    /// Creates a client that routes `model` to `endpoint`.
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        let target_endpoint = endpoint.clone();

        let resolver = ServiceTargetResolver::from_resolver_fn(
            move |service_target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
                let ServiceTarget { model, auth, .. } = service_target;
                Ok(ServiceTarget {
                    endpoint: Endpoint::from_owned(target_endpoint.clone()),
                    auth,
                    model: ModelIden::new(AdapterKind::Ollama, model.model_name),
                })
            },
        );

        let client = Client::builder()
            .with_service_target_resolver(resolver)
            .build();

        Self {
            client,
            endpoint,
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Submits `prompt` and returns its text fragments as they arrive.
    ///
    /// The first upstream event is awaited before returning, so connection and
    /// status failures surface here rather than inside the stream.
    pub async fn stream(&self, prompt: String) -> Result<FragmentStream, InferenceError> {
        let request = ChatRequest::new(vec![ChatMessage::user(prompt)]);

        let response = self
            .client
            .exec_chat_stream(&self.model, request, None)
            .await
            .map_err(|e| {
                error!("Inference stream init error: {}", e);
                InferenceError::StreamInit {
                    model: self.model.clone(),
                    message: e.to_string(),
                }
            })?;

        let mut events = response.stream;

        let head = match events.next().await {
            Some(Ok(event)) => Some(event),
            Some(Err(e)) => {
                error!("Inference stream failed before first event: {}", e);
                return Err(InferenceError::StreamInit {
                    model: self.model.clone(),
                    message: e.to_string(),
                });
            }
            None => None,
        };

        debug!(model = %self.model, "Inference stream opened");

        let fragments = stream::iter(head.map(Ok))
            .chain(events)
            .filter_map(|event| {
                ready(match event {
                    Ok(ChatStreamEvent::Chunk(chunk)) => Some(Ok(chunk.content)),
                    Ok(_) => None,
                    Err(e) => Some(Err(InferenceError::StreamInterrupted(e.to_string()))),
                })
            });

        Ok(fragments.boxed())
    }
}
