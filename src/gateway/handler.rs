use axum::{
    extract::{Query, State},
    http::{HeaderMap, HeaderValue},
    response::{
        IntoResponse, Response,
        sse::{Event, Sse},
    },
};
use futures_util::stream::{Stream, StreamExt};
use serde::Deserialize;
use std::convert::Infallible;
use tracing::{error, info, instrument};

use crate::constants::{CROSSCHECK_STATUS_HEADER, CROSSCHECK_STATUS_STREAMING};
use crate::discovery::SearchProvider;
use crate::extraction::ContentExtractor;
use crate::gateway::error::GatewayError;
use crate::gateway::state::HandlerState;
use crate::inference::InferenceBackend;
use crate::pipeline::SynthesisStream;

/// Query string of `GET /crawl`.
#[derive(Debug, Deserialize)]
pub struct CrawlParams {
    pub url: Option<String>,
}

/// Streams a cross-check of `?url=` as server-sent events.
///
/// Each synthesis fragment is one `data` event. Failures before the first
/// fragment produce a JSON error response instead of a stream.
#[instrument(skip(state, params), fields(url = tracing::field::Empty))]
pub async fn crawl_handler<E, S, I>(
    State(state): State<HandlerState<E, S, I>>,
    Query(params): Query<CrawlParams>,
) -> Result<Response, GatewayError>
where
    E: ContentExtractor + 'static,
    S: SearchProvider + 'static,
    I: InferenceBackend + 'static,
{
    let url = validate_target(params.url.as_deref())?;
    tracing::Span::current().record("url", tracing::field::display(&url));

    let stream = state.pipeline.run(&url).await.inspect_err(|e| {
        error!(error = %e, kind = e.kind(), "Pipeline failed before streaming");
    })?;

    info!("Streaming synthesis");

    let mut headers = HeaderMap::new();
    headers.insert(
        CROSSCHECK_STATUS_HEADER,
        HeaderValue::from_static(CROSSCHECK_STATUS_STREAMING),
    );

    Ok((headers, sse_response(stream)).into_response())
}

/// Accepts absolute `http`/`https` URLs with a host.
pub fn validate_target(raw: Option<&str>) -> Result<String, GatewayError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "missing 'url' query parameter".to_string(),
        ));
    }

    let parsed = reqwest::Url::parse(raw)
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid url '{raw}': {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(GatewayError::InvalidRequest(format!(
            "unsupported url scheme '{}'",
            parsed.scheme()
        )));
    }

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(GatewayError::InvalidRequest(format!(
            "url '{raw}' has no host"
        )));
    }

    Ok(raw.to_string())
}

/// Maps synthesis fragments to SSE events.
///
/// A mid-stream failure becomes a final `error` event.
pub fn sse_response(
    stream: SynthesisStream,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let events = stream.map(|item| match item {
        Ok(fragment) => Ok(Event::default().data(sanitize_fragment(&fragment))),
        Err(e) => {
            error!(error = %e, "Synthesis stream failed");
            Ok(Event::default()
                .event("error")
                .data(sanitize_fragment(&e.to_string())))
        }
    });

    Sse::new(events)
}

/// Normalizes carriage returns, which SSE data fields cannot carry.
pub fn sanitize_fragment(fragment: &str) -> String {
    if !fragment.contains('\r') {
        return fragment.to_string();
    }
    fragment.replace("\r\n", "\n").replace('\r', "\n")
}
