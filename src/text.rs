// Text normalization and feature extraction.
//
// Normalization is deliberately crude: lowercase, then drop anything that is
// not an ASCII word character or whitespace. Words are what the user typed;
// features are what the model counts (stopwords removed, optionally stemmed).
//
// The default stopword list is short and English-only and keeps Sotho and
// Tswana function words (ke, re, se, go, na) as features. The full
// stopwords-iso list drops them.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex_lite::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use stop_words::{get, LANGUAGE};

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s]").unwrap_or_else(|e| panic!("invalid normalization pattern: {e}"))
});

/// Lowercase the text and strip every non-word, non-space character.
pub fn normalize(text: &str) -> String {
    NON_WORD.replace_all(&text.to_lowercase(), "").into_owned()
}

/// Split already-normalized text into words, dropping empty pieces.
pub fn words(normalized: &str) -> Vec<String> {
    normalized.split_whitespace().map(str::to_string).collect()
}

/// English stopword list used by the analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopWordList {
    /// Keep every word
    Off,
    /// Short list of English function words, single letters and digits
    Basic,
    /// The full stopwords-iso English list
    Iso,
}

/// Which optional steps the analyzer applies when turning words into features.
///
/// Stored alongside a saved model so queries are analyzed the same way the
/// training documents were.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerOptions {
    /// Reduce words to their Snowball English (Porter2) stem
    pub stem: bool,
    /// Stopwords dropped before counting
    pub stop_words: StopWordList,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            stem: true,
            stop_words: StopWordList::Basic,
        }
    }
}

const BASIC_STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "all", "also", "am", "an", "and", "another", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "came", "can", "cannot", "come", "could", "did", "do", "does", "doing",
    "during", "each", "few", "for", "from", "further", "get", "got", "has", "had", "he",
    "have", "her", "here", "him", "himself", "his", "how", "if", "in", "into", "is", "it",
    "its", "itself", "like", "make", "many", "me", "might", "more", "most", "much", "must",
    "my", "myself", "never", "now", "of", "on", "only", "or", "other", "our", "ours",
    "ourselves", "out", "over", "own", "said", "same", "see", "should", "since", "so", "some",
    "still", "such", "take", "than", "that", "the", "their", "theirs", "them", "themselves",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
    "until", "up", "very", "was", "way", "we", "well", "were", "what", "where", "when",
    "which", "while", "who", "whom", "with", "would", "why", "you", "your", "yours",
    "yourself", "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o",
    "p", "q", "r", "s", "t", "u", "v", "w", "x", "y", "z", "1", "2", "3", "4", "5", "6", "7",
    "8", "9", "0", "_",
];

impl StopWordList {
    fn words(self) -> HashSet<String> {
        match self {
            StopWordList::Off => HashSet::new(),
            StopWordList::Basic => BASIC_STOP_WORDS.iter().map(|w| w.to_string()).collect(),
            StopWordList::Iso => {
                let list: Vec<String> = get(LANGUAGE::English);
                list.into_iter().map(|w| normalize(&w)).collect()
            }
        }
    }
}

/// Turns raw text into model features.
pub struct Analyzer {
    options: AnalyzerOptions,
    stemmer: Option<Stemmer>,
    stop_words: HashSet<String>,
}

impl Analyzer {
    pub fn new(options: AnalyzerOptions) -> Self {
        let stemmer = options
            .stem
            .then(|| Stemmer::create(Algorithm::English));

        Self {
            options,
            stemmer,
            stop_words: options.stop_words.words(),
        }
    }

    pub fn options(&self) -> AnalyzerOptions {
        self.options
    }

    /// Feature form of a single normalized word, or None for a stopword.
    pub fn feature(&self, word: &str) -> Option<String> {
        if word.is_empty() || self.stop_words.contains(word) {
            return None;
        }
        Some(match &self.stemmer {
            Some(stemmer) => stemmer.stem(word).into_owned(),
            None => word.to_string(),
        })
    }

    /// Features of a raw text, in order of appearance (duplicates kept).
    pub fn features(&self, text: &str) -> Vec<String> {
        words(&normalize(text))
            .iter()
            .filter_map(|w| self.feature(w))
            .collect()
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalyzerOptions::default())
    }
}
