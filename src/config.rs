use std::time::Duration;

use crate::tokenizer::hf::DEFAULT_MODEL;

const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;

/// Process-wide settings read from the environment (after `.env` is loaded).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    /// HF Hub model id whose `tokenizer.json` sizes chunks.
    pub tokenizer: String,
    pub http_timeout: Duration,
    /// Contact for the Crossref polite pool.
    pub mailto: Option<String>,
    pub ncbi_api_key: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tokenizer: DEFAULT_MODEL.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            mailto: None,
            ncbi_api_key: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    // unparseable or blank values fall back to defaults
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut cfg = Self::default();
        if let Some(model) = get("PUBSPLIT_TOKENIZER") {
            cfg.tokenizer = model;
        }
        if let Some(secs) = get("PUBSPLIT_HTTP_TIMEOUT_SECS").and_then(|s| s.parse::<u64>().ok()) {
            cfg.http_timeout = Duration::from_secs(secs);
        }
        cfg.mailto = get("PUBSPLIT_MAILTO");
        cfg.ncbi_api_key = get("NCBI_API_KEY");
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults_when_unset() {
        let cfg = Settings::from_lookup(|_| None);
        assert_eq!(cfg, Settings::default());
        assert_eq!(cfg.tokenizer, "gpt2");
        assert_eq!(cfg.http_timeout, Duration::from_secs(15));
    }

    #[test]
    fn reads_overrides_and_ignores_junk() {
        let env: HashMap<&str, &str> = [
            ("PUBSPLIT_TOKENIZER", "bert-base-uncased"),
            ("PUBSPLIT_HTTP_TIMEOUT_SECS", "soon"),
            ("PUBSPLIT_MAILTO", " me@example.org "),
            ("NCBI_API_KEY", ""),
        ]
        .into_iter()
        .collect();
        let cfg = Settings::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(cfg.tokenizer, "bert-base-uncased");
        assert_eq!(cfg.http_timeout, Duration::from_secs(15));
        assert_eq!(cfg.mailto.as_deref(), Some("me@example.org"));
        assert!(cfg.ncbi_api_key.is_none());
    }
}
