//! Word tokenization and frequency ranking.
//!
//! Produces the ground-truth counts that a model's answer is compared
//! against. Tokens are lowercased maximal runs of word characters; the
//! tally keeps keys in first-occurrence order so that a stable sort by
//! count breaks ties by where a word first appeared in the text.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Number of words in a ranking unless a policy says otherwise.
pub const DEFAULT_TOP_K: usize = 10;

/// Longest ranking any policy may ask for.
pub const MAX_TOP_K: usize = 10;

static WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w+\b").expect("word pattern is valid"));

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// A word and the number of times it occurs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordCount {
    pub word: String,
    pub count: u64,
}

impl WordCount {
    pub fn new(word: impl Into<String>, count: u64) -> Self {
        Self {
            word: word.into(),
            count,
        }
    }
}

/// Controls how many words are ranked and which tokens qualify.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankPolicy {
    /// Maximum ranking length.
    pub top_k: usize,
    /// Tokens shorter than this many characters are ignored. 0 keeps all.
    pub min_len: usize,
}

impl Default for RankPolicy {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            min_len: 0,
        }
    }
}

/// Token counts in first-insertion order.
#[derive(Debug, Clone, Default)]
pub struct FrequencyTable {
    entries: Vec<WordCount>,
    index: HashMap<String, usize>,
}

impl FrequencyTable {
    /// Record one occurrence of `token`.
    pub fn add(&mut self, token: &str) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push(WordCount::new(token, 1));
            }
        }
    }

    /// Count for `token`, 0 when absent.
    pub fn get(&self, token: &str) -> u64 {
        self.index
            .get(token)
            .map_or(0, |&i| self.entries[i].count)
    }

    /// Number of distinct tokens.
    pub fn distinct(&self) -> usize {
        self.entries.len()
    }

    /// Total number of token occurrences.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|e| e.count).sum()
    }

    /// Entries in first-occurrence order.
    pub fn entries(&self) -> &[WordCount] {
        &self.entries
    }

    /// The `k` most frequent tokens, count descending.
    ///
    /// `sort_by` is stable, so equal counts keep first-occurrence order.
    pub fn top(&self, k: usize) -> Vec<WordCount> {
        let mut ranked = self.entries.clone();
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(k);
        ranked
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Split `text` into lowercased word tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tally tokens that pass the policy's length filter.
pub fn tally<I, S>(tokens: I, min_len: usize) -> FrequencyTable
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut table = FrequencyTable::default();
    for token in tokens {
        let token = token.as_ref();
        if token.chars().count() >= min_len {
            table.add(token);
        }
    }
    table
}

/// Build the frequency table for `text`.
pub fn frequency_table(text: &str, min_len: usize) -> FrequencyTable {
    tally(tokenize(text), min_len)
}

/// Rank the most frequent words in `text` under `policy`.
pub fn rank(text: &str, policy: RankPolicy) -> Vec<WordCount> {
    frequency_table(text, policy.min_len).top(policy.top_k)
}

/// Top 10 words with no length filter.
pub fn top_words(text: &str) -> Vec<WordCount> {
    rank(text, RankPolicy::default())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
