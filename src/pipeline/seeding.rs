use tracing::{debug, info, warn};

use crate::discovery::{DiscoveryError, SearchProvider, SearchResults};
use crate::scoring::{Bm25Ranker, Candidate};
use crate::text::{Document, tokenize};

/// Ordered seed URLs chosen for cross-checking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSet {
    seeds: Vec<String>,
    fallback: bool,
}

impl SeedSet {
    /// Seeds taken from ranked discovery results.
    pub fn ranked(seeds: Vec<String>) -> Self {
        Self {
            seeds,
            fallback: false,
        }
    }

    /// The single-seed fallback used when discovery yields no candidates.
    pub fn fallback(url: impl Into<String>) -> Self {
        Self {
            seeds: vec![url.into()],
            fallback: true,
        }
    }

    /// `true` when this is the `[url]` fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback
    }

    pub fn as_slice(&self) -> &[String] {
        &self.seeds
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.seeds.iter()
    }

    pub fn len(&self) -> usize {
        self.seeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }
}

/// Keeps results with a URL and a non-empty snippet, tokenizing the snippet.
pub fn build_candidates(results: &SearchResults) -> Vec<Candidate> {
    results
        .results
        .iter()
        .filter_map(|hit| hit.usable())
        .map(|(url, snippet)| Candidate::new(url, tokenize(snippet)))
        .filter(|candidate| !candidate.document.is_empty())
        .collect()
}

/// Picks up to `top_k` seeds for `url` by ranking discovery snippets against `query`.
///
/// Issues exactly one search call. `query` is expected to be truncated already.
pub async fn select_seeds<S: SearchProvider>(
    search: &S,
    ranker: &Bm25Ranker,
    url: &str,
    query: &Document,
    top_k: usize,
) -> Result<SeedSet, DiscoveryError> {
    let payload = search.search(url).await?;
    let results = SearchResults::from_value(url, &payload)?;
    let candidates = build_candidates(&results);

    debug!(
        results = results.results.len(),
        candidates = candidates.len(),
        "Discovery results filtered"
    );

    if candidates.is_empty() {
        warn!(url = url, "No ranking candidates found, falling back to the requested URL");
        return Ok(SeedSet::fallback(url));
    }

    let ranked = ranker.rank(query, candidates, top_k);
    let seeds: Vec<String> = ranked
        .into_iter()
        .map(|scored| scored.candidate.identifier)
        .collect();

    info!(seeds = seeds.len(), "Seed selection complete");

    Ok(SeedSet::ranked(seeds))
}
