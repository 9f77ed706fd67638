use super::*;
use futures_util::StreamExt;

#[test]
fn test_client_keeps_endpoint_and_model() {
    let client = GenaiInference::new("http://localhost:11434/v1/", "llama3.2:latest");

    assert_eq!(client.endpoint(), "http://localhost:11434/v1/");
    assert_eq!(client.model(), "llama3.2:latest");

    let rendered = format!("{client:?}");
    assert!(rendered.contains("llama3.2:latest"));
}

#[tokio::test]
async fn test_mock_replays_script_in_order() {
    let backend = MockInference::new(["a", "b"]).then("c");
    let probe = backend.probe();

    let stream = backend.stream("prompt".to_string()).await.expect("stream opens");
    let fragments: Vec<String> = stream.map(|r| r.expect("ok")).collect().await;

    assert_eq!(fragments, vec!["a", "b", "c"]);
    assert_eq!(probe.pulled(), 3);
    assert!(probe.released());
    assert_eq!(backend.prompts(), vec!["prompt".to_string()]);
}

#[tokio::test]
async fn test_mock_init_failure() {
    let backend = MockInference::failing("unreachable");

    let err = match backend.stream("prompt".to_string()).await {
        Err(e) => e,
        Ok(_) => panic!("stream should not open"),
    };

    assert!(matches!(err, InferenceError::StreamInit { .. }));
    assert!(err.to_string().contains("unreachable"));
    assert_eq!(backend.prompts().len(), 1);
}

#[tokio::test]
async fn test_mock_mid_stream_failure() {
    let backend = MockInference::new(["a"]).then_fail("reset");

    let items: Vec<_> = backend
        .stream("prompt".to_string())
        .await
        .expect("stream opens")
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert!(matches!(&items[1], Err(InferenceError::StreamInterrupted(m)) if m == "reset"));
}
