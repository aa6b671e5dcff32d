pub mod hf;

#[cfg(feature = "gpt2-tokenizer")]
pub mod bytes;
#[cfg(feature = "gpt2-tokenizer")]
pub mod gpt2;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{anyhow, Result};

pub use hf::HfTokenCounter;
#[cfg(feature = "gpt2-tokenizer")]
pub use gpt2::Gpt2Tokenizer;

/// Maps a string to its token count. Errors propagate to whoever is chunking.
pub trait TokenCounter: Send + Sync {
    fn count(&self, text: &str) -> Result<usize>;
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> Result<usize> + Send + Sync,
{
    fn count(&self, text: &str) -> Result<usize> {
        self(text)
    }
}

/// Counter picked at runtime from `PUBSPLIT_TOKENIZER`.
pub enum LoadedCounter {
    Hf(HfTokenCounter),
    #[cfg(feature = "gpt2-tokenizer")]
    Gpt2(Gpt2Tokenizer),
}

impl LoadedCounter {
    /// A directory holding `vocab.json` + `merges.txt` loads the byte-level BPE
    /// (with the `gpt2-tokenizer` feature), a file loads as `tokenizer.json`,
    /// anything else is treated as an HF Hub model id.
    pub fn load(source: &str) -> Result<Self> {
        let path = Path::new(source);
        #[cfg(feature = "gpt2-tokenizer")]
        {
            let (vocab, merges) = (path.join("vocab.json"), path.join("merges.txt"));
            if vocab.is_file() && merges.is_file() {
                return Ok(Self::Gpt2(Gpt2Tokenizer::from_files(vocab, merges)?));
            }
        }
        if path.is_file() {
            Ok(Self::Hf(HfTokenCounter::from_file(path)?))
        } else {
            Ok(Self::Hf(HfTokenCounter::from_pretrained(source)?))
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hf(_) => "hf",
            #[cfg(feature = "gpt2-tokenizer")]
            Self::Gpt2(_) => "gpt2-bpe",
        }
    }
}

impl TokenCounter for LoadedCounter {
    fn count(&self, text: &str) -> Result<usize> {
        match self {
            Self::Hf(c) => c.count(text),
            #[cfg(feature = "gpt2-tokenizer")]
            Self::Gpt2(c) => c.count(text),
        }
    }
}

// per-process memo keyed by text; only successful counts are cached
pub struct Memoized<C> {
    inner: C,
    cache: Mutex<HashMap<String, usize>>,
}

impl<C: TokenCounter> Memoized<C> {
    pub fn new(inner: C) -> Self {
        Self { inner, cache: Mutex::new(HashMap::new()) }
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<C: TokenCounter> TokenCounter for Memoized<C> {
    fn count(&self, text: &str) -> Result<usize> {
        if let Some(n) = self.cache.lock().map_err(|_| anyhow!("token cache poisoned"))?.get(text) {
            return Ok(*n);
        }
        let n = self.inner.count(text)?;
        self.cache
            .lock()
            .map_err(|_| anyhow!("token cache poisoned"))?
            .insert(text.to_string(), n);
        Ok(n)
    }
}
