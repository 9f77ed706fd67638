use crate::text::Document;

#[derive(Debug, Clone, PartialEq)]
/// A discovery result that survived snippet filtering.
pub struct Candidate {
    /// Source URL.
    pub identifier: String,
    /// Tokenized snippet (never empty when fed to the ranker).
    pub document: Document,
}

impl Candidate {
    /// Creates a candidate record.
    pub fn new(identifier: impl Into<String>, document: Document) -> Self {
        Self {
            identifier: identifier.into(),
            document,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Candidate annotated with its BM25 score.
///
/// Scores are only comparable within the ranking call that produced them.
pub struct ScoredCandidate {
    /// The ranked candidate.
    pub candidate: Candidate,
    /// BM25 relevance score.
    pub score: f64,
}

impl ScoredCandidate {
    /// Creates a scored-candidate record.
    pub fn new(candidate: Candidate, score: f64) -> Self {
        Self { candidate, score }
    }

    /// Returns the candidate's URL.
    pub fn identifier(&self) -> &str {
        &self.candidate.identifier
    }
}
