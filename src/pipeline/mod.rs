//! CLI commands. Each one opens its typed log context, does its work in
//! phase spans and prints either human lines or one `--json` envelope.

pub mod chunk;
pub mod fetch;
pub mod parse;
pub mod sentences;

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use crate::chunking::{ChunkParams, DEFAULT_MAX_TOKENS, DEFAULT_MIN_TOKENS, DEFAULT_OVERLAP};
use crate::config::Settings;
use crate::pubmed::Article;
use crate::tokenizer::{LoadedCounter, Memoized};

#[derive(Args, Clone, Debug)]
pub struct ChunkArgs {
    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)] pub max_tokens: usize,
    #[arg(long, default_value_t = DEFAULT_MIN_TOKENS)] pub min_tokens: usize,
    /// Sentences repeated at the start of the next chunk
    #[arg(long, default_value_t = DEFAULT_OVERLAP)] pub sentence_overlap: usize,
    /// Split number given to the first chunk
    #[arg(long, default_value_t = 1)] pub first_split: usize,
}

impl ChunkArgs {
    pub fn params(&self) -> Result<ChunkParams> {
        Ok(ChunkParams::new(self.max_tokens, self.min_tokens, self.sentence_overlap)?
            .numbered_from(self.first_split))
    }

    pub fn kv(&self) -> [(&'static str, String); 4] {
        [
            ("max_tokens", self.max_tokens.to_string()),
            ("min_tokens", self.min_tokens.to_string()),
            ("sentence_overlap", self.sentence_overlap.to_string()),
            ("first_split", self.first_split.to_string()),
        ]
    }
}

/// Text from `--text`, `--file` or stdin, in that order.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    #[arg(long, conflicts_with = "file")] pub text: Option<String>,
    #[arg(long)] pub file: Option<PathBuf>,
}

impl InputArgs {
    pub fn read(&self) -> Result<String> {
        if let Some(text) = &self.text {
            return Ok(text.clone());
        }
        if let Some(path) = &self.file {
            return fs::read_to_string(path).with_context(|| format!("read {}", path.display()));
        }
        io::read_to_string(io::stdin()).context("read stdin")
    }

    pub fn describe(&self) -> String {
        match (&self.text, &self.file) {
            (Some(_), _) => "--text".to_string(),
            (None, Some(p)) => p.display().to_string(),
            (None, None) => "stdin".to_string(),
        }
    }
}

/// `PUBSPLIT_TOKENIZER` names a local `tokenizer.json`, a `vocab.json` +
/// `merges.txt` directory or an HF Hub model id.
pub fn load_counter(settings: &Settings) -> Result<Memoized<LoadedCounter>> {
    let counter = LoadedCounter::load(&settings.tokenizer)?;
    debug!(source = %settings.tokenizer, kind = counter.kind(), "token counter loaded");
    Ok(Memoized::new(counter))
}

pub fn article_path(out_dir: &Path, pmid: &str) -> PathBuf {
    out_dir.join(format!("pubmed_{pmid}.json"))
}

/// Pretty JSON to `<out_dir>/pubmed_<pmid>.json`, replacing any previous file.
pub fn write_article(out_dir: &Path, article: &Article) -> Result<PathBuf> {
    fs::create_dir_all(out_dir).with_context(|| format!("create {}", out_dir.display()))?;
    let path = article_path(out_dir, &article.pmid);
    let file = File::create(&path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut w, article)?;
    writeln!(&mut w)?;
    w.flush()?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pubmed::AbstractSection;

    #[test]
    fn chunk_args_validate() {
        let ok = ChunkArgs { max_tokens: 50, min_tokens: 10, sentence_overlap: 1, first_split: 0 };
        assert_eq!(ok.params().unwrap().first_split_number, 0);
        let bad = ChunkArgs { max_tokens: 10, min_tokens: 10, sentence_overlap: 1, first_split: 1 };
        assert!(bad.params().is_err());
    }

    #[test]
    fn writes_pretty_article_json() {
        let dir = std::env::temp_dir().join(format!("pubsplit-out-{}", std::process::id()));
        let article = Article {
            pmid: "42".into(),
            abstract_sections: vec![AbstractSection::new("Text.".into())],
            ..Article::default()
        };
        let path = write_article(&dir, &article).unwrap();
        assert!(path.ends_with("pubmed_42.json"));

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n  \"pmid\": \"42\""));
        let back: Article = serde_json::from_str(&raw).unwrap();
        assert_eq!(back, article);
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn input_prefers_inline_text() {
        let input = InputArgs { text: Some("Hi.".into()), file: Some(PathBuf::from("/nonexistent")) };
        assert_eq!(input.read().unwrap(), "Hi.");
        assert_eq!(input.describe(), "--text");
    }
}
