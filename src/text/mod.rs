//! Word tokenization shared by the primary content and search snippets.


use regex::Regex;
use std::sync::LazyLock;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Static pattern; compilation cannot fail at runtime.
    Regex::new(r"\b\w+\b").expect("word pattern is valid")
});

/// An ordered sequence of lowercase word tokens.
///
/// Produced by [`tokenize`]; immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    tokens: Vec<String>,
}

impl Document {
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Returns a document holding at most the first `n` tokens.
    pub fn truncated(&self, n: usize) -> Document {
        Document {
            tokens: self.tokens.iter().take(n).cloned().collect(),
        }
    }
}

impl From<Vec<String>> for Document {
    fn from(tokens: Vec<String>) -> Self {
        Self { tokens }
    }
}

impl<'a> FromIterator<&'a str> for Document {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            tokens: iter.into_iter().map(str::to_string).collect(),
        }
    }
}

/// Splits `text` into maximal runs of word characters, lowercased, in order.
///
/// Never fails; empty or punctuation-only input yields an empty [`Document`].
pub fn tokenize(text: &str) -> Document {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .collect()
}
