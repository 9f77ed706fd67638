use futures_util::stream::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use crate::inference::{FragmentStream, InferenceBackend, InferenceError};

/// Observes how far a scripted stream was consumed and whether it was dropped.
#[derive(Debug, Clone, Default)]
pub struct MockStreamProbe {
    pulled: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl MockStreamProbe {
    /// Number of items handed out by the stream.
    pub fn pulled(&self) -> usize {
        self.pulled.load(Ordering::SeqCst)
    }

    /// `true` once the stream has been dropped.
    pub fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[derive(Clone)]
enum Step {
    Fragment(String),
    Fail(String),
}

/// Inference backend replaying a fixed script of fragments.
#[derive(Clone, Default)]
pub struct MockInference {
    script: Vec<Step>,
    init_failure: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
    probe: MockStreamProbe,
}

impl MockInference {
    /// Replays `fragments` in order, then ends the stream.
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            script: fragments
                .into_iter()
                .map(|f| Step::Fragment(f.into()))
                .collect(),
            ..Self::default()
        }
    }

    /// Fails when the stream is opened, before any fragment.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            init_failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Appends a mid-stream failure after the scripted fragments.
    pub fn then_fail(mut self, message: impl Into<String>) -> Self {
        self.script.push(Step::Fail(message.into()));
        self
    }

    /// Appends more fragments to the script.
    pub fn then<S: Into<String>>(mut self, fragment: S) -> Self {
        self.script.push(Step::Fragment(fragment.into()));
        self
    }

    /// Prompts received so far.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    /// Probe shared with every stream this backend opens.
    pub fn probe(&self) -> MockStreamProbe {
        self.probe.clone()
    }
}

struct ScriptedStream {
    steps: VecDeque<Step>,
    probe: MockStreamProbe,
}

impl Stream for ScriptedStream {
    type Item = Result<String, InferenceError>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let item = this.steps.pop_front().map(|step| match step {
            Step::Fragment(text) => Ok(text),
            Step::Fail(message) => Err(InferenceError::StreamInterrupted(message)),
        });
        if item.is_some() {
            this.probe.pulled.fetch_add(1, Ordering::SeqCst);
        }
        Poll::Ready(item)
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.probe.released.store(true, Ordering::SeqCst);
    }
}

impl InferenceBackend for MockInference {
    async fn stream(&self, prompt: String) -> Result<FragmentStream, InferenceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt);
        }

        if let Some(message) = &self.init_failure {
            return Err(InferenceError::StreamInit {
                model: "mock".to_string(),
                message: message.clone(),
            });
        }

        Ok(ScriptedStream {
            steps: self.script.iter().cloned().collect(),
            probe: self.probe.clone(),
        }
        .boxed())
    }
}
