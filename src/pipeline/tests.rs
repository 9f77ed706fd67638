use super::*;
use crate::discovery::{DiscoveryError, MockSearchProvider};
use crate::extraction::MockExtractor;
use crate::inference::MockInference;
use futures_util::StreamExt;
use serde_json::json;
use std::time::Duration;

const PAGE: &str = "https://news.example/article";
const PRIMARY: &str = "Rust async runtime tokio";

fn config() -> PipelineConfig {
    PipelineConfig {
        top_k: 5,
        truncation_length: 200,
        enrichment_concurrency: 1,
    }
}

fn three_candidates() -> MockSearchProvider {
    MockSearchProvider::new().with_results(
        PAGE,
        &[
            ("https://c.example/garden", "gardening tips spring"),
            ("https://b.example/ownership", "rust ownership borrow"),
            (
                "https://a.example/tokio",
                "rust async runtime tokio scheduler",
            ),
        ],
    )
}

async fn collect(stream: SynthesisStream) -> Vec<Result<String, PipelineError>> {
    stream.collect().await
}

#[tokio::test]
async fn test_seeds_ranked_by_overlap() {
    let search = three_candidates();
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        search.clone(),
        MockInference::new(["ok"]),
        config(),
    );

    let request = pipeline.prepare(PAGE).await.expect("prepare should succeed");

    let seeds: Vec<&str> = request
        .enriched_seeds
        .iter()
        .map(|s| s.identifier.as_str())
        .collect();
    assert_eq!(
        seeds,
        vec![
            "https://a.example/tokio",
            "https://b.example/ownership",
            "https://c.example/garden",
        ]
    );
    assert_eq!(request.primary_content, PRIMARY);
    // one discovery call plus one enrichment call per seed
    assert_eq!(search.call_count(), 4);
}

#[tokio::test]
async fn test_top_k_limits_seeds() {
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        three_candidates(),
        MockInference::new(["ok"]),
        PipelineConfig {
            top_k: 1,
            ..config()
        },
    );

    let request = pipeline.prepare(PAGE).await.expect("prepare should succeed");

    assert_eq!(request.enriched_seeds.len(), 1);
    assert_eq!(request.enriched_seeds[0].identifier, "https://a.example/tokio");
}

#[tokio::test]
async fn test_truncation_limits_ranking_query() {
    let pipeline = Pipeline::new(
        MockExtractor::new("Gardening and Rust async runtime tokio"),
        MockSearchProvider::new().with_results(
            PAGE,
            &[
                (
                    "https://a.example/tokio",
                    "rust async runtime tokio scheduler",
                ),
                ("https://c.example/garden", "gardening tips spring"),
                ("https://d.example/misc", "unrelated filler words"),
            ],
        ),
        MockInference::new(["ok"]),
        PipelineConfig {
            truncation_length: 1,
            ..config()
        },
    );

    let request = pipeline.prepare(PAGE).await.expect("prepare should succeed");

    assert_eq!(request.enriched_seeds[0].identifier, "https://c.example/garden");
    // the prompt still carries the untruncated content
    assert!(request.primary_content.contains("tokio"));
}

#[tokio::test]
async fn test_no_candidates_falls_back_to_page_url() {
    let search = MockSearchProvider::new().with_results(PAGE, &[("https://x.example", "")]);
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        search.clone(),
        MockInference::new(["ok"]),
        config(),
    );

    let request = pipeline.prepare(PAGE).await.expect("prepare should succeed");

    assert_eq!(request.enriched_seeds.len(), 1);
    assert_eq!(request.enriched_seeds[0].identifier, PAGE);
    assert_eq!(search.calls(), vec![PAGE.to_string(), PAGE.to_string()]);
}

#[tokio::test]
async fn test_select_seeds_reports_fallback() {
    let search = MockSearchProvider::new();
    let query = tokenize(PRIMARY);

    let seeds = select_seeds(&search, &Bm25Ranker::default(), PAGE, &query, 5)
        .await
        .expect("search should succeed");

    assert!(seeds.is_fallback());
    assert_eq!(seeds.as_slice(), &[PAGE.to_string()]);
    assert_eq!(search.call_count(), 1);
}

#[tokio::test]
async fn test_select_seeds_ranks_hits_carrying_snippet_and_content() {
    let search = MockSearchProvider::new().with_response(
        PAGE,
        json!({ "results": [
            { "url": "https://a.example", "snippet": "tokio runtime", "content": "full page text" },
            { "url": "https://b.example", "content": "gardening tips" }
        ] }),
    );
    let query = tokenize(PRIMARY);

    let seeds = select_seeds(&search, &Bm25Ranker::default(), PAGE, &query, 5)
        .await
        .expect("search should succeed");

    assert!(!seeds.is_fallback());
    assert_eq!(
        seeds.as_slice(),
        &["https://a.example".to_string(), "https://b.example".to_string()]
    );
}

#[tokio::test]
async fn test_enrichment_keeps_seed_order_when_concurrent() {
    let seeds = ["https://one.example", "https://two.example", "https://three.example"];
    // later seeds answer first
    let search = MockSearchProvider::new()
        .with_response(seeds[0], json!({ "results": [{ "url": "1" }] }))
        .with_response(seeds[1], json!({ "results": [{ "url": "2" }] }))
        .with_response(seeds[2], json!({ "results": [{ "url": "3" }] }))
        .with_delay(seeds[0], Duration::from_millis(120))
        .with_delay(seeds[1], Duration::from_millis(60));
    let seed_set = SeedSet::ranked(seeds.iter().map(|s| s.to_string()).collect());

    let enriched = enrich(&search, &seed_set, 3)
        .await
        .expect("enrich should succeed");

    assert_eq!(search.completions(), vec![seeds[2], seeds[1], seeds[0]]);
    assert_eq!(enriched.len(), seeds.len());
    for (i, seed) in seeds.iter().enumerate() {
        assert_eq!(enriched[i].identifier, *seed);
    }
    assert!(enriched[1].context.contains("\"2\""));
    assert_eq!(search.call_count(), 3);
}

#[tokio::test]
async fn test_sequential_enrichment_waits_for_each_seed() {
    let seeds = ["https://one.example", "https://two.example"];
    let search = MockSearchProvider::new().with_delay(seeds[0], Duration::from_millis(40));
    let seed_set = SeedSet::ranked(seeds.iter().map(|s| s.to_string()).collect());

    let enriched = enrich(&search, &seed_set, 1)
        .await
        .expect("enrich should succeed");

    assert_eq!(search.completions(), vec![seeds[0], seeds[1]]);
    assert_eq!(enriched[0].identifier, seeds[0]);
    assert_eq!(enriched[1].identifier, seeds[1]);
}

#[tokio::test]
async fn test_concurrent_enrichment_failure_aborts_stage() {
    let seeds = ["https://one.example", "https://two.example"];
    let search = MockSearchProvider::new()
        .with_delay(seeds[0], Duration::from_millis(30))
        .with_failure(seeds[1], "timeout");
    let seed_set = SeedSet::ranked(seeds.iter().map(|s| s.to_string()).collect());

    let err = enrich(&search, &seed_set, 2).await.unwrap_err();

    assert!(matches!(err, DiscoveryError::ConnectionFailed { .. }));
}

#[tokio::test]
async fn test_enrichment_context_is_pretty_printed_payload() {
    let payload = json!({ "results": [{ "url": "https://s.example", "snippet": "hi" }] });
    let search = MockSearchProvider::new().with_response("https://s.example", payload.clone());
    let seeds = SeedSet::ranked(vec!["https://s.example".to_string()]);

    let enriched = enrich(&search, &seeds, 1).await.expect("enrich should succeed");

    assert_eq!(
        enriched[0].context,
        serde_json::to_string_pretty(&payload).expect("serializable")
    );
}

#[tokio::test]
async fn test_extraction_failure_stops_before_search() {
    let search = three_candidates();
    let inference = MockInference::new(["ok"]);
    let pipeline = Pipeline::new(
        MockExtractor::failing(),
        search.clone(),
        inference.clone(),
        config(),
    );

    let err = pipeline.run(PAGE).await.unwrap_err();

    assert!(matches!(err, PipelineError::ExtractionFailure(_)));
    assert_eq!(err.kind(), "extraction_failure");
    assert_eq!(search.call_count(), 0);
    assert!(inference.prompts().is_empty());
}

#[tokio::test]
async fn test_enrichment_failure_aborts_run() {
    let search = three_candidates().with_failure("https://b.example/ownership", "timeout");
    let inference = MockInference::new(["ok"]);
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        search,
        inference.clone(),
        config(),
    );

    let err = pipeline.run(PAGE).await.unwrap_err();

    assert!(matches!(err, PipelineError::DiscoveryFailure(_)));
    assert!(inference.prompts().is_empty());
}

#[tokio::test]
async fn test_discovery_failure_aborts_run() {
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        MockSearchProvider::new().with_failure(PAGE, "unreachable"),
        MockInference::new(["ok"]),
        config(),
    );

    let err = pipeline.run(PAGE).await.unwrap_err();

    assert_eq!(err.kind(), "discovery_failure");
}

#[tokio::test]
async fn test_inference_init_failure_is_reported_before_streaming() {
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        three_candidates(),
        MockInference::failing("connection refused"),
        config(),
    );

    let err = pipeline.run(PAGE).await.unwrap_err();

    assert!(matches!(err, PipelineError::InferenceFailure(_)));
    assert!(err.to_string().contains("connection refused"));
}

#[tokio::test]
async fn test_prompt_sent_to_inference() {
    let inference = MockInference::new(["ok"]);
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        three_candidates(),
        inference.clone(),
        config(),
    );

    let _stream = pipeline.run(PAGE).await.expect("run should succeed");

    let prompts = inference.prompts();
    assert_eq!(prompts.len(), 1);
    let prompt = &prompts[0];
    assert!(prompt.contains("PRIMARY SOURCE:\nRust async runtime tokio"));
    assert!(prompt.contains("https://a.example/tokio: {"));
    assert!(prompt.contains("'==END=='"));
    assert!(prompt.contains("MAIN_URL | score=FLOAT"));
    assert!(prompt.contains("<url> | score=FLOAT"));
    assert!(
        prompt.find("https://a.example/tokio:") < prompt.find("https://b.example/ownership:")
    );
}

#[test]
fn test_secondary_sources_joined_by_newline() {
    let request = SynthesisRequest::new(
        "body",
        vec![
            EnrichedSeed {
                identifier: "https://a.example".to_string(),
                context: "ctx a".to_string(),
            },
            EnrichedSeed {
                identifier: "https://b.example".to_string(),
                context: "ctx b".to_string(),
            },
        ],
    );

    assert_eq!(
        request.secondary_sources(),
        "https://a.example: ctx a\nhttps://b.example: ctx b"
    );
}

#[tokio::test]
async fn test_stream_stops_at_sentinel_and_releases_upstream() {
    let inference = MockInference::new([
        "Sum",
        "mary...",
        "==END==\nSCORES:\n",
        "MAIN_URL | score=0.9",
    ]);
    let probe = inference.probe();
    let pipeline = Pipeline::new(
        MockExtractor::new(PRIMARY),
        three_candidates(),
        inference,
        config(),
    );

    let mut stream = pipeline.run(PAGE).await.expect("run should succeed");
    let mut fragments = Vec::new();
    while let Some(item) = stream.next().await {
        fragments.push(item.expect("no mid-stream failure"));
    }

    assert_eq!(fragments, vec!["Sum", "mary...", "==END==\nSCORES:\n"]);
    assert_eq!(probe.pulled(), 3);
    // released while the outer stream is still alive
    assert!(probe.released());
    assert_eq!(stream.forwarded(), 3);
}

#[tokio::test]
async fn test_sentinel_split_across_fragments() {
    let inference = MockInference::new(["Done ==", "END==", "SCORES:"]);
    let probe = inference.probe();
    let stream = stream_synthesis(&inference, &SynthesisRequest::new("body", Vec::new()))
        .await
        .expect("stream should open");

    let fragments: Vec<String> = collect(stream)
        .await
        .into_iter()
        .map(|r| r.expect("ok"))
        .collect();

    assert_eq!(fragments, vec!["Done ==", "END=="]);
    assert_eq!(probe.pulled(), 2);
}

#[tokio::test]
async fn test_empty_fragments_are_skipped() {
    let inference = MockInference::new(["", "a", "", "b"]);
    let stream = stream_synthesis(&inference, &SynthesisRequest::new("body", Vec::new()))
        .await
        .expect("stream should open");

    let fragments: Vec<String> = collect(stream)
        .await
        .into_iter()
        .map(|r| r.expect("ok"))
        .collect();

    assert_eq!(fragments, vec!["a", "b"]);
}

#[tokio::test]
async fn test_stream_without_sentinel_ends_with_upstream() {
    let inference = MockInference::new(["a", "b"]);
    let probe = inference.probe();
    let stream = stream_synthesis(&inference, &SynthesisRequest::new("body", Vec::new()))
        .await
        .expect("stream should open");

    let items = collect(stream).await;

    assert_eq!(items.len(), 2);
    assert!(probe.released());
}

#[tokio::test]
async fn test_mid_stream_failure_terminates_stream() {
    let inference = MockInference::new(["partial"])
        .then_fail("socket closed")
        .then("never delivered");
    let probe = inference.probe();
    let stream = stream_synthesis(&inference, &SynthesisRequest::new("body", Vec::new()))
        .await
        .expect("stream should open");

    let items = collect(stream).await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_deref().ok(), Some("partial"));
    match &items[1] {
        Err(PipelineError::MidStreamFailure(message)) => {
            assert!(message.contains("socket closed"))
        }
        other => panic!("unexpected item: {other:?}"),
    }
    assert_eq!(probe.pulled(), 2);
}

#[test]
fn test_close_releases_upstream() {
    use futures_util::stream::FusedStream;

    let inference = MockInference::new(["a", "b"]);
    let probe = inference.probe();
    let mut stream = tokio_test::block_on(stream_synthesis(
        &inference,
        &SynthesisRequest::new("body", Vec::new()),
    ))
    .expect("stream should open");

    assert!(!stream.is_terminated());
    stream.close();

    assert!(stream.is_terminated());
    assert!(probe.released());
    assert_eq!(probe.pulled(), 0);
    assert!(tokio_test::block_on(stream.next()).is_none());
}

#[tokio::test]
async fn test_dropping_stream_releases_upstream() {
    let inference = MockInference::new(["a", "b", "c"]);
    let probe = inference.probe();
    let mut stream = stream_synthesis(&inference, &SynthesisRequest::new("body", Vec::new()))
        .await
        .expect("stream should open");

    let first = stream.next().await;
    assert!(matches!(first, Some(Ok(_))));
    drop(stream);

    assert!(probe.released());
    assert_eq!(probe.pulled(), 1);
}
