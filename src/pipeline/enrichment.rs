use futures_util::FutureExt;
use futures_util::stream::{self, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::discovery::{DiscoveryError, SearchProvider};

use super::seeding::SeedSet;

/// A seed paired with the verbatim payload of its own search lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedSeed {
    pub identifier: String,
    pub context: String,
}

/// Looks up every seed once and returns the results in seed order.
///
/// At most `concurrency` lookups are in flight; `1` runs them one after another.
/// The first failing lookup aborts the stage.
pub async fn enrich<S: SearchProvider>(
    search: &S,
    seeds: &SeedSet,
    concurrency: usize,
) -> Result<Vec<EnrichedSeed>, DiscoveryError> {
    let enriched = if concurrency <= 1 {
        let mut enriched = Vec::with_capacity(seeds.len());
        for seed in seeds.iter() {
            enriched.push(enrich_one(search, seed.clone()).await?);
        }
        enriched
    } else {
        stream::iter(seeds.iter().cloned())
            .map(|seed| enrich_one(search, seed).boxed())
            .buffered(concurrency)
            .try_collect::<Vec<_>>()
            .await?
    };

    info!(seeds = enriched.len(), concurrency, "Enrichment complete");

    Ok(enriched)
}

async fn enrich_one<S: SearchProvider>(
    search: &S,
    seed: String,
) -> Result<EnrichedSeed, DiscoveryError> {
    let payload = search.search(&seed).await?;
    let context =
        serde_json::to_string_pretty(&payload).map_err(|e| DiscoveryError::MalformedResponse {
            query: seed.clone(),
            message: e.to_string(),
        })?;

    debug!(seed = %seed, context_len = context.len(), "Seed enriched");

    Ok(EnrichedSeed {
        identifier: seed,
        context,
    })
}
