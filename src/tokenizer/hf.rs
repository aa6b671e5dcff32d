use std::path::Path;

use anyhow::{anyhow, Context, Result};
use hf_hub::api::sync::Api;
use tokenizers::Tokenizer;

use super::TokenCounter;

pub const DEFAULT_MODEL: &str = "gpt2";

/// Hugging Face tokenizer used as a plain token counter (no padding/truncation).
#[derive(Debug, Clone)]
pub struct HfTokenCounter {
    inner: Tokenizer,
    source: String,
}

impl HfTokenCounter {
    // resolves tokenizer.json through the HF Hub cache, downloading on first use
    pub fn from_pretrained(model_id: &str) -> Result<Self> {
        let api = Api::new().context("init HF Hub api")?;
        let repo = api.model(model_id.to_string());
        let path = repo
            .get("tokenizer.json")
            .with_context(|| format!("fetch tokenizer.json for {model_id}"))?;
        let mut counter = Self::from_file(&path)?;
        counter.source = model_id.to_string();
        Ok(counter)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut inner = Tokenizer::from_file(path.as_ref())
            .map_err(|e| anyhow!("load tokenizer {}: {}", path.as_ref().display(), e))?;
        // counts must reflect the whole text, never a truncated window
        inner
            .with_truncation(None)
            .map_err(|e| anyhow!("{}", e))?;
        inner.with_padding(None);
        Ok(Self { inner, source: path.as_ref().display().to_string() })
    }

    pub fn ids(&self, text: &str) -> Result<Vec<u32>> {
        let enc = self.inner.encode(text, false).map_err(|e| anyhow!("{}", e))?;
        Ok(enc.get_ids().to_vec())
    }

    pub fn source(&self) -> &str { &self.source }

    pub fn inner(&self) -> &Tokenizer { &self.inner }
}

impl TokenCounter for HfTokenCounter {
    fn count(&self, text: &str) -> Result<usize> {
        if text.is_empty() { return Ok(0); }
        Ok(self.ids(text)?.len())
    }
}
