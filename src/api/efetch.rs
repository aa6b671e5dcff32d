use anyhow::{bail, Result};
use reqwest::Client;
use tracing::{debug, warn};

pub const EFETCH_URL: &str = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi";

pub struct EfetchClient {
    http: Client,
    api_key: Option<String>,
}

impl EfetchClient {
    pub fn new(http: Client, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }

    fn params(&self, pmid: &str) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("db", "pubmed".to_string()),
            ("id", pmid.to_string()),
            ("rettype", "xml".to_string()),
        ];
        if let Some(key) = &self.api_key {
            params.push(("api_key", key.clone()));
        }
        params
    }

    /// Article XML for one PMID. An empty id is an error; HTTP trouble is
    /// logged and reported as `None`.
    pub async fn fetch_xml(&self, pmid: &str) -> Result<Option<String>> {
        let pmid = pmid.trim();
        if pmid.is_empty() {
            bail!("PubMed id is empty");
        }
        debug!(pmid, "efetch");

        let resp = match self.http.get(EFETCH_URL).query(&self.params(pmid)).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(pmid, error = %e, "efetch request failed");
                return Ok(None);
            }
        };
        let resp = match resp.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!(pmid, error = %e, "efetch returned an error status");
                return Ok(None);
            }
        };
        match resp.text().await {
            Ok(body) => Ok(Some(body)),
            Err(e) => {
                warn!(pmid, error = %e, "efetch body unreadable");
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_pmid_is_rejected() {
        let client = EfetchClient::new(Client::new(), None);
        assert!(client.fetch_xml("  ").await.is_err());
    }

    #[test]
    fn api_key_is_forwarded() {
        let client = EfetchClient::new(Client::new(), Some("k".into()));
        let params = client.params("123");
        assert!(params.contains(&("id", "123".to_string())));
        assert!(params.contains(&("api_key", "k".to_string())));
    }
}
