//! Network collaborators: efetch, Crossref citations and exaly journal ranks.
//! Failures here are logged and degrade to missing values.

pub mod crossref;
pub mod efetch;
pub mod exaly;

use anyhow::{Context, Result};
use reqwest::Client;
use tracing::debug;

use crate::config::Settings;
use crate::pubmed::Article;

pub use crossref::CrossrefClient;
pub use efetch::EfetchClient;
pub use exaly::ExalyClient;

pub fn http_client(settings: &Settings) -> Result<Client> {
    Client::builder()
        .timeout(settings.http_timeout)
        .user_agent(concat!("pubsplit/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build http client")
}

/// Optional per-article lookups, each switched on separately.
pub struct Enricher {
    crossref: Option<CrossrefClient>,
    exaly: Option<ExalyClient>,
}

impl Enricher {
    pub fn new(http: &Client, settings: &Settings, citations: bool, ranking: bool) -> Self {
        Self {
            crossref: citations.then(|| CrossrefClient::new(http.clone(), settings.mailto.clone())),
            exaly: ranking.then(|| ExalyClient::new(http.clone())),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.crossref.is_none() && self.exaly.is_none()
    }

    pub async fn enrich(&self, article: &mut Article) {
        if let Some(crossref) = &self.crossref {
            article.meta_info.citation_count = crossref.citation_count(article.doi(), &article.pmid).await;
        }
        if let Some(exaly) = &self.exaly {
            let journal = article.journal_name().unwrap_or("").to_string();
            article.meta_info.journal_ranking = exaly.ranking(&journal, &article.pmid).await;
        }
        debug!(pmid = %article.pmid, "enriched article");
    }
}
