//! Lexical relevance ranking (BM25) of candidate snippets against a reference document.
//!
//! Corpus statistics are rebuilt from the candidates of a single call; nothing is
//! shared between calls. The caller is expected to handle the empty-candidate case
//! before ranking (see [`crate::pipeline::seeding`]).

pub mod bm25;
pub mod types;


pub use bm25::{Bm25Corpus, Bm25Ranker, rank};
pub use types::{Candidate, ScoredCandidate};
