//! Cross-cutting, shared constants.
//!
//! Pipeline defaults live here so the config layer, the ranker and the
//! synthesis prompt agree on the same values.

/// Maximum number of seeds selected from the discovery results.
pub const DEFAULT_TOP_K: usize = 5;

/// Number of leading primary-content tokens used as the ranking query.
pub const DEFAULT_TRUNCATION_LENGTH: usize = 200;

/// Number of enrichment lookups allowed in flight at once (`1` = sequential).
pub const DEFAULT_ENRICHMENT_CONCURRENCY: usize = 1;

/// Timeout applied to extraction and search HTTP calls.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// BM25 term-frequency saturation.
pub const BM25_K1: f64 = 1.5;

/// BM25 document-length normalization.
pub const BM25_B: f64 = 0.75;

/// Floor applied to negative IDF values, as a fraction of the mean IDF.
pub const BM25_EPSILON: f64 = 0.25;

/// Marker the model emits between the narrative and the score lines.
pub const SENTINEL: &str = "==END==";

/// Reserved identifier for the primary source in the score lines.
pub const MAIN_URL_IDENTIFIER: &str = "MAIN_URL";

/// Header carrying a short machine-readable status on every gateway response.
pub const CROSSCHECK_STATUS_HEADER: &str = "x-crosscheck-status";

/// Status value reported by the health endpoint.
pub const CROSSCHECK_STATUS_HEALTHY: &str = "healthy";

/// Status value sent with a successfully opened event stream.
pub const CROSSCHECK_STATUS_STREAMING: &str = "streaming";
