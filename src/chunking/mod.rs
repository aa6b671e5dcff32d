//! Token-budget grouping of sentences into overlapping chunks.
//!
//! Grouping walks the sentences once, closing a group whenever the next
//! sentence would push it past `max_tokens` and seeding the next group with
//! the tail of the closed one. A second pass folds undersized groups back
//! into the chunk before them, so only the first chunk may be small.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::sentence::split_sentences;
use crate::tokenizer::TokenCounter;

pub const DEFAULT_MAX_TOKENS: usize = 500;
pub const DEFAULT_MIN_TOKENS: usize = 100;
pub const DEFAULT_OVERLAP: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkParams {
    pub max_tokens: usize,
    pub min_tokens: usize,
    /// Trailing sentences of a closed group repeated at the head of the next.
    pub overlap: usize,
    /// Split number of the first emitted chunk (usually 0 or 1).
    pub first_split_number: usize,
}

impl ChunkParams {
    pub fn new(max_tokens: usize, min_tokens: usize, overlap: usize) -> Result<Self> {
        if max_tokens == 0 {
            bail!("max_tokens must be positive");
        }
        if min_tokens >= max_tokens {
            bail!("min_tokens ({min_tokens}) must be below max_tokens ({max_tokens})");
        }
        Ok(Self { max_tokens, min_tokens, overlap, first_split_number: 1 })
    }

    pub fn numbered_from(mut self, first: usize) -> Self {
        self.first_split_number = first;
        self
    }
}

impl Default for ChunkParams {
    fn default() -> Self {
        Self {
            max_tokens: DEFAULT_MAX_TOKENS,
            min_tokens: DEFAULT_MIN_TOKENS,
            overlap: DEFAULT_OVERLAP,
            first_split_number: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub split_number: usize,
    pub total_splits: usize,
}

/// A closed run of sentences before merging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    pub sentences: Vec<String>,
    pub tokens: usize,
    /// How many leading sentences were carried over from the previous group.
    pub carried: usize,
}

impl Group {
    pub fn text(&self) -> String {
        self.sentences.join(" ")
    }
}

/// First pass: pack sentences into groups of at most `max_tokens`.
///
/// A sentence larger than the budget on its own still forms a group. The next
/// group is seeded with the last `overlap` sentences of the closed one (all of
/// them when it has fewer), even if the seed pushes it past the budget.
pub fn group_sentences<C>(
    sentences: &[String],
    max_tokens: usize,
    overlap: usize,
    counter: &C,
) -> Result<Vec<Group>>
where
    C: TokenCounter + ?Sized,
{
    let mut groups = Vec::new();
    // (sentence, tokens) so seeds can be re-summed without asking the counter again
    let mut current: Vec<(&str, usize)> = Vec::new();
    let mut tokens = 0usize;
    let mut carried = 0usize;

    for sentence in sentences {
        let n = counter.count(sentence)?;
        if current.is_empty() || tokens + n <= max_tokens {
            current.push((sentence, n));
            tokens += n;
            continue;
        }

        let seed: Vec<(&str, usize)> = current[current.len().saturating_sub(overlap)..].to_vec();
        groups.push(close(&current, tokens, carried));

        carried = seed.len();
        current = seed;
        current.push((sentence, n));
        tokens = current.iter().map(|(_, t)| t).sum();
    }

    if !current.is_empty() {
        groups.push(close(&current, tokens, carried));
    }
    Ok(groups)
}

fn close(current: &[(&str, usize)], tokens: usize, carried: usize) -> Group {
    Group {
        sentences: current.iter().map(|(s, _)| s.to_string()).collect(),
        tokens,
        carried,
    }
}

/// Group sentences, merge undersized trailing groups backward and number
/// the survivors. Counter errors propagate untouched.
pub fn chunk_sentences<C>(sentences: &[String], params: &ChunkParams, counter: &C) -> Result<Vec<Chunk>>
where
    C: TokenCounter + ?Sized,
{
    let groups = group_sentences(sentences, params.max_tokens, params.overlap, counter)?;
    let texts = merge_small(&groups, params.min_tokens);

    let total = texts.len();
    let chunks: Vec<Chunk> = texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| Chunk { text, split_number: params.first_split_number + i, total_splits: total })
        .collect();

    debug!(
        sentences = sentences.len(),
        groups = groups.len(),
        chunks = chunks.len(),
        "chunked sentences"
    );
    Ok(chunks)
}

/// Split `text` into sentences and chunk them.
pub fn chunk_text<C>(text: &str, params: &ChunkParams, counter: &C) -> Result<Vec<Chunk>>
where
    C: TokenCounter + ?Sized,
{
    chunk_sentences(&split_sentences(text), params, counter)
}

// Every group after the first whose token count is at or below `min_tokens`
// loses its carried sentences and is appended to the previous emitted text.
fn merge_small(groups: &[Group], min_tokens: usize) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(groups.len());

    for (i, group) in groups.iter().enumerate() {
        if i == 0 || group.tokens > min_tokens {
            out.push(group.text());
            continue;
        }

        let resplit = split_sentences(&group.text());
        let own = if resplit.len() == group.sentences.len() { resplit } else { group.sentences.clone() };
        let rest = own[group.carried.min(own.len())..].join(" ");
        if rest.is_empty() {
            continue;
        }

        match out.pop() {
            Some(prev) => out.push(format!("{prev} {rest}")),
            None => out.push(rest),
        }
        debug!(group = i, tokens = group.tokens, "merged undersized group backward");
    }
    out
}
