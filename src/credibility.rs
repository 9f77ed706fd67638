//! Parsing of the trailing credibility-score block in a synthesis transcript.
//!
//! After the sentinel the model is asked to emit lines like:
//!
//! ```text
//! SCORES:
//! MAIN_URL | score=0.82
//! https://example.org/report | score=0.64
//! ```
//!
//! The pipeline never interprets this output itself; callers that buffer the
//! full transcript can use [`parse_scores`] to recover the scores.

use crate::constants::{MAIN_URL_IDENTIFIER, SENTINEL};

/// One `identifier | score=FLOAT` line.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceScore {
    pub identifier: String,
    pub score: f64,
}

impl SourceScore {
    /// `true` for the score of the page that was checked.
    pub fn is_primary(&self) -> bool {
        self.identifier == MAIN_URL_IDENTIFIER
    }
}

/// Extracts every well-formed score line from `transcript`.
///
/// Only text after the sentinel is considered when one is present. Lines that
/// do not match the format, or whose score is not a finite number, are skipped.
pub fn parse_scores(transcript: &str) -> Vec<SourceScore> {
    let block = transcript
        .find(SENTINEL)
        .map_or(transcript, |idx| &transcript[idx + SENTINEL.len()..]);

    block.lines().filter_map(parse_line).collect()
}

fn parse_line(line: &str) -> Option<SourceScore> {
    let (identifier, rest) = line.split_once('|')?;
    let identifier = identifier.trim().trim_start_matches(['-', '*']).trim();
    if identifier.is_empty() {
        return None;
    }

    let value = rest.trim().strip_prefix("score")?.trim_start();
    let value = value.strip_prefix('=').or_else(|| value.strip_prefix(':'))?;
    let score: f64 = value.trim().parse().ok()?;
    if !score.is_finite() {
        return None;
    }

    Some(SourceScore {
        identifier: identifier.to_string(),
        score,
    })
}
