use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

pub const WORKS_URL: &str = "https://api.crossref.org/works/";

#[derive(Deserialize)]
struct Works {
    message: WorksMessage,
}

#[derive(Deserialize)]
struct WorksMessage {
    #[serde(rename = "is-referenced-by-count")]
    referenced_by: Option<u64>,
}

pub fn parse_citation_count(body: &str) -> Option<u64> {
    serde_json::from_str::<Works>(body).ok()?.message.referenced_by
}

pub struct CrossrefClient {
    http: Client,
    mailto: Option<String>,
}

impl CrossrefClient {
    pub fn new(http: Client, mailto: Option<String>) -> Self {
        Self { http, mailto }
    }

    /// Crossref `is-referenced-by-count` for a DOI; `None` when unknown.
    pub async fn citation_count(&self, doi: Option<&str>, pmid: &str) -> Option<u64> {
        let Some(doi) = doi.map(str::trim).filter(|d| !d.is_empty()) else {
            debug!(pmid, "no DOI, skipping citation count");
            return None;
        };

        let mut req = self.http.get(format!("{WORKS_URL}{doi}"));
        if let Some(mailto) = &self.mailto {
            req = req.query(&[("mailto", mailto.as_str())]);
        }
        let body = match req.send().await.and_then(|r| r.error_for_status()) {
            Ok(resp) => resp.text().await.ok()?,
            Err(e) => {
                warn!(pmid, doi, error = %e, "crossref lookup failed");
                return None;
            }
        };
        let count = parse_citation_count(&body);
        if count.is_none() {
            warn!(pmid, doi, "crossref response has no citation count");
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_referenced_by_count() {
        let body = r#"{"status":"ok","message":{"DOI":"10.1/x","is-referenced-by-count":42}}"#;
        assert_eq!(parse_citation_count(body), Some(42));
    }

    #[test]
    fn missing_or_garbage_is_none() {
        assert_eq!(parse_citation_count(r#"{"message":{"DOI":"10.1/x"}}"#), None);
        assert_eq!(parse_citation_count("Resource not found."), None);
    }
}
