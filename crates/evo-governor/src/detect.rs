//! Block detection heuristics

/// Markers that show up in gateway errors when an account gets flagged
pub const BLOCK_KEYWORDS: &[&str] = &[
    "blocked",
    "banned",
    "spam",
    "forbidden",
    "403",
    "not authorized",
    "violation",
];

/// Classifies transport error text as a suspected account block
pub trait BlockDetector: Send + Sync {
    fn is_block(&self, error_text: &str) -> bool;
}

/// Case-insensitive substring match against a keyword list
#[derive(Debug, Clone)]
pub struct KeywordBlockDetector {
    keywords: Vec<String>,
}

impl KeywordBlockDetector {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl Default for KeywordBlockDetector {
    fn default() -> Self {
        Self::new(BLOCK_KEYWORDS.iter().copied())
    }
}

impl BlockDetector for KeywordBlockDetector {
    fn is_block(&self, error_text: &str) -> bool {
        let text = error_text.to_lowercase();
        self.keywords.iter().any(|k| text.contains(k.as_str()))
    }
}
