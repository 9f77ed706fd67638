//! Prompt construction and sentinel-terminated fragment streaming.
//!
//! [`SynthesisStream`] forwards upstream fragments one at a time. When a fragment
//! completes the sentinel it is forwarded and the upstream stream is dropped at
//! once, which closes the inference connection. Dropping the [`SynthesisStream`]
//! itself (e.g. when the HTTP caller disconnects) has the same effect.

use futures_util::stream::{FusedStream, Stream, StreamExt};
use std::fmt::Write as _;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, info, warn};

use crate::constants::{MAIN_URL_IDENTIFIER, SENTINEL};
use crate::inference::{FragmentStream, InferenceBackend};

use super::enrichment::EnrichedSeed;
use super::error::PipelineError;

/// Input to the synthesis step, built once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub primary_content: String,
    pub enriched_seeds: Vec<EnrichedSeed>,
}

impl SynthesisRequest {
    pub fn new(primary_content: impl Into<String>, enriched_seeds: Vec<EnrichedSeed>) -> Self {
        Self {
            primary_content: primary_content.into(),
            enriched_seeds,
        }
    }

    /// Renders the secondary-sources block, one `identifier: context` entry per seed.
    pub fn secondary_sources(&self) -> String {
        self.enriched_seeds
            .iter()
            .map(|seed| format!("{}: {}", seed.identifier, seed.context))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Builds the fact-checking prompt.
    pub fn prompt(&self) -> String {
        let mut prompt = String::with_capacity(
            self.primary_content.len()
                + self
                    .enriched_seeds
                    .iter()
                    .map(|s| s.identifier.len() + s.context.len() + 3)
                    .sum::<usize>()
                + 512,
        );

        prompt.push_str("You are an evidence-based fact checker.\n\n");
        prompt.push_str("PRIMARY SOURCE:\n");
        prompt.push_str(&self.primary_content);
        prompt.push_str("\n\nSECONDARY SOURCES:\n");
        prompt.push_str(&self.secondary_sources());
        prompt.push_str("\n\nTASK:\n");
        prompt.push_str("1. Summarize the primary source\n");
        prompt.push_str("2. Cross-check it against the secondary sources, citing each by URL\n");
        let _ = writeln!(prompt, "3. Output '{SENTINEL}'");
        prompt.push_str("4. Then output one credibility score per source, exactly in this form:\n\n");
        prompt.push_str("SCORES:\n");
        let _ = writeln!(prompt, "{MAIN_URL_IDENTIFIER} | score=FLOAT");
        prompt.push_str("<url> | score=FLOAT\n");

        prompt
    }
}

/// Fragments of one synthesis run, ending at the sentinel or at upstream end-of-stream.
///
/// Empty fragments are skipped. An upstream error is yielded once as
/// [`PipelineError::MidStreamFailure`] and ends the stream.
pub struct SynthesisStream {
    inner: Option<FragmentStream>,
    sentinel: &'static str,
    tail: String,
    forwarded: usize,
}

impl std::fmt::Debug for SynthesisStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisStream")
            .field("open", &self.inner.is_some())
            .field("sentinel", &self.sentinel)
            .field("forwarded", &self.forwarded)
            .finish()
    }
}

impl SynthesisStream {
    /// Wraps an upstream fragment stream, terminating at [`SENTINEL`].
    pub fn new(inner: FragmentStream) -> Self {
        Self::with_sentinel(inner, SENTINEL)
    }

    pub fn with_sentinel(inner: FragmentStream, sentinel: &'static str) -> Self {
        Self {
            inner: Some(inner),
            sentinel,
            tail: String::new(),
            forwarded: 0,
        }
    }

    /// Number of fragments forwarded so far.
    pub fn forwarded(&self) -> usize {
        self.forwarded
    }

    /// Drops the upstream stream; later polls return `None`.
    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            debug!(forwarded = self.forwarded, "Synthesis stream closed");
        }
    }

    /// Checks `fragment` against the sentinel, including a match that straddles
    /// the previous fragment boundary.
    fn completes_sentinel(&mut self, fragment: &str) -> bool {
        if fragment.contains(self.sentinel) {
            return true;
        }

        let mut window = std::mem::take(&mut self.tail);
        window.push_str(fragment);
        let found = window.contains(self.sentinel);

        let keep = self.sentinel.len().saturating_sub(1);
        let mut start = window.len().saturating_sub(keep);
        while !window.is_char_boundary(start) {
            start += 1;
        }
        self.tail = window.split_off(start);

        found
    }
}

impl Stream for SynthesisStream {
    type Item = Result<String, PipelineError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();

        loop {
            let Some(inner) = this.inner.as_mut() else {
                return Poll::Ready(None);
            };

            match inner.poll_next_unpin(cx) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(None) => {
                    debug!(
                        forwarded = this.forwarded,
                        "Inference stream ended without sentinel"
                    );
                    this.inner = None;
                    return Poll::Ready(None);
                }
                Poll::Ready(Some(Ok(fragment))) => {
                    if fragment.is_empty() {
                        continue;
                    }

                    this.forwarded += 1;
                    if this.completes_sentinel(&fragment) {
                        info!(forwarded = this.forwarded, "Sentinel reached, closing stream");
                        this.inner = None;
                    }
                    return Poll::Ready(Some(Ok(fragment)));
                }
                Poll::Ready(Some(Err(e))) => {
                    warn!(
                        error = %e,
                        forwarded = this.forwarded,
                        "Inference stream interrupted"
                    );
                    this.inner = None;
                    return Poll::Ready(Some(Err(PipelineError::MidStreamFailure(e.to_string()))));
                }
            }
        }
    }
}

impl FusedStream for SynthesisStream {
    fn is_terminated(&self) -> bool {
        self.inner.is_none()
    }
}

/// Submits the request's prompt and returns the sentinel-terminated fragment stream.
///
/// Failures to open the stream surface here, before any fragment is produced.
pub async fn stream_synthesis<I: InferenceBackend>(
    inference: &I,
    request: &SynthesisRequest,
) -> Result<SynthesisStream, PipelineError> {
    let prompt = request.prompt();
    debug!(
        prompt_len = prompt.len(),
        sources = request.enriched_seeds.len(),
        "Opening synthesis stream"
    );

    let upstream = inference.stream(prompt).await?;
    Ok(SynthesisStream::new(upstream))
}
