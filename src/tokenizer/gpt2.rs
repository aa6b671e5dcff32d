use anyhow::{anyhow, bail, Context, Result};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Mutex;

use super::bytes::ByteAlphabet;
use super::TokenCounter;

/// Byte-level BPE over a GPT-2 style vocabulary (p50k and friends).
#[derive(Debug)]
pub struct Gpt2Tokenizer {
    // string token -> id
    encoder: HashMap<String, usize>,
    // pair -> rank
    bpe_ranks: HashMap<(String, String), usize>,
    alphabet: ByteAlphabet,
    // GPT-2 style pretokenizer pattern
    pat: Regex,
    // BPE results per pretokenized piece, shared across threads
    bpe_cache: Mutex<HashMap<String, Vec<String>>>,
}

impl Gpt2Tokenizer {
    /// Build from GPT-2 style `vocab.json` and `merges.txt`.
    pub fn from_files<P: AsRef<Path>>(vocab_path: P, merges_path: P) -> Result<Self> {
        let vocab_file = File::open(&vocab_path).with_context(|| {
            format!("Failed to open vocab file: {}", vocab_path.as_ref().display())
        })?;
        // vocab.json is a map of "token" -> id
        let encoder: HashMap<String, usize> = serde_json::from_reader(BufReader::new(vocab_file))
            .with_context(|| "Failed to parse vocab.json")?;

        let merges_file = File::open(&merges_path).with_context(|| {
            format!("Failed to open merges file: {}", merges_path.as_ref().display())
        })?;
        let mut merges = Vec::new();
        for line in BufReader::new(merges_file).lines() {
            merges.push(line?);
        }
        Self::from_parts(encoder, merges.iter().map(String::as_str))
    }

    /// Build from an in-memory vocab and merge lines ("A B", '#' lines skipped).
    pub fn from_parts<'a, I>(encoder: HashMap<String, usize>, merges: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut bpe_ranks: HashMap<(String, String), usize> = HashMap::new();
        let mut rank = 0usize;
        for line in merges {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            if let (Some(a), Some(b)) = (parts.next(), parts.next()) {
                bpe_ranks.insert((a.to_string(), b.to_string()), rank);
                rank += 1;
            }
        }

        let pat = Regex::new(
            r"(?:'s|'t|'re|'ve|'m|'ll|'d| ?\p{L}+| ?\p{N}+| ?[^\s\p{L}\p{N}]+|\s+(?:\S|\z))",
        )?;

        Ok(Self {
            encoder,
            bpe_ranks,
            alphabet: ByteAlphabet::gpt2(),
            pat,
            bpe_cache: Mutex::new(HashMap::new()),
        })
    }

    /// Encode text into GPT-2 style token IDs.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>> {
        let mut ids: Vec<usize> = Vec::new();

        for m in self.pat.find_iter(text) {
            let transformed = self.alphabet.encode(m.as_str());
            for bpe_tok in self.bpe(&transformed)? {
                if let Some(&id) = self.encoder.get(&bpe_tok) {
                    ids.push(id);
                    continue;
                }
                // unknown merge result: fall back to its single symbols
                for ch in bpe_tok.chars() {
                    let s = ch.to_string();
                    match self.encoder.get(&s) {
                        Some(&id) => ids.push(id),
                        None => bail!("Unknown token not found in vocab: {:?}", s),
                    }
                }
            }
        }

        Ok(ids)
    }

    fn bpe(&self, token: &str) -> Result<Vec<String>> {
        let cache = |e: String| anyhow!("bpe cache poisoned: {e}");
        if let Some(cached) = self.bpe_cache.lock().map_err(|e| cache(e.to_string()))?.get(token) {
            return Ok(cached.clone());
        }

        let mut word: Vec<String> = token.chars().map(|c| c.to_string()).collect();

        while word.len() > 1 {
            // lowest-rank pair present in the word
            let best = get_pairs(&word)
                .into_iter()
                .filter_map(|pair| self.bpe_ranks.get(&pair).map(|rank| (*rank, pair)))
                .min_by_key(|(rank, _)| *rank);
            let Some((_, (first, second))) = best else { break };

            let mut i = 0usize;
            let mut merged: Vec<String> = Vec::with_capacity(word.len());
            while i < word.len() {
                if i + 1 < word.len() && word[i] == first && word[i + 1] == second {
                    merged.push(format!("{}{}", word[i], word[i + 1]));
                    i += 2;
                } else {
                    merged.push(word[i].clone());
                    i += 1;
                }
            }
            word = merged;
        }

        self.bpe_cache
            .lock()
            .map_err(|e| cache(e.to_string()))?
            .insert(token.to_string(), word.clone());
        Ok(word)
    }
}

impl TokenCounter for Gpt2Tokenizer {
    fn count(&self, text: &str) -> Result<usize> {
        Ok(self.encode(text)?.len())
    }
}

// Collect all adjacent pairs in a word.
fn get_pairs(word: &[String]) -> HashSet<(String, String)> {
    word.windows(2).map(|w| (w[0].clone(), w[1].clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tiny() -> Gpt2Tokenizer {
        let vocab: HashMap<String, usize> = ["h", "e", "l", "o", "he", "ll", "hell", "\u{120}", "\u{120}h", "."]
            .iter()
            .enumerate()
            .map(|(i, t)| (t.to_string(), i))
            .collect();
        Gpt2Tokenizer::from_parts(vocab, ["#version: 0.2", "h e", "l l", "he ll", "\u{120} h"]).unwrap()
    }

    #[test]
    fn merges_by_rank() {
        let tok = tiny();
        // "hello" -> "hell" + "o"
        assert_eq!(tok.count("hello").unwrap(), 2);
        // " hello" is one piece; "h e" outranks "Ġ h" so it ends as "Ġ" "hell" "o"
        assert_eq!(tok.encode(" hello").unwrap(), vec![7, 6, 3]);
    }

    #[test]
    fn unknown_symbol_is_an_error() {
        let tok = tiny();
        assert!(tok.count("z").is_err());
    }
}
