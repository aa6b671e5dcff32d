//! PubMed article records: XML reading, field extraction and abstract splits.

pub mod extract;
pub mod types;
pub mod xml;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::chunking::{chunk_text, ChunkParams};
use crate::tokenizer::TokenCounter;

pub use types::{AbstractSection, Article, ArticleSplit, JournalRanking, MetaInfo, RankingValue};
pub use xml::{articles_from_str, open_articles, ArticleReader, Element};

/// PMID of an article tree without building the whole record.
pub fn pmid_of(root: &Element) -> String {
    extract::pmid(root, &extract::article_ids(root))
}

/// Turns `<PubmedArticle>` trees into [`Article`] records, chunking each
/// abstract section with the configured counter.
pub struct ArticleBuilder<'a> {
    params: ChunkParams,
    counter: &'a dyn TokenCounter,
}

impl<'a> ArticleBuilder<'a> {
    pub fn new(params: ChunkParams, counter: &'a dyn TokenCounter) -> Self {
        Self { params, counter }
    }

    pub fn params(&self) -> &ChunkParams {
        &self.params
    }

    /// Fails only when the token counter does.
    pub fn build(&self, root: &Element) -> Result<Article> {
        let articleids = extract::article_ids(root);
        let pmid = extract::pmid(root, &articleids);
        let meta_info = MetaInfo {
            kwd: extract::keywords(root),
            dates_history: extract::dates_history(root),
            journal: extract::journal_info(root),
            article: extract::article_info(root),
            authors: extract::authors(root),
            mesh_terms: extract::mesh_terms(root),
            articleids,
            ..MetaInfo::default()
        };

        let abstract_sections = vec![AbstractSection::new(extract::abstract_text(root))];
        let mut article_splits = Vec::new();
        for section in &abstract_sections {
            if section.text.trim().is_empty() {
                info!(pmid = %pmid, "article has no abstract; no splits");
                continue;
            }
            let chunks = chunk_text(&section.text, &self.params, self.counter)
                .with_context(|| format!("chunk abstract of pmid={pmid}"))?;
            article_splits.extend(chunks.into_iter().map(|c| ArticleSplit {
                text: c.text,
                section_title: section.section_title.clone(),
                section_type: section.section_type.clone(),
                split_number: c.split_number,
                total_splits: c.total_splits,
            }));
        }
        debug!(pmid = %pmid, splits = article_splits.len(), "built article");

        Ok(Article { abstract_sections, meta_info, pmid, article_splits })
    }

    /// Every article of an in-memory document, e.g. an efetch response.
    pub fn build_all(&self, xml: &str) -> Result<Vec<Article>> {
        articles_from_str(xml)?.iter().map(|root| self.build(root)).collect()
    }
}

#[cfg(test)]
pub(crate) const SAMPLE_XML: &str = include_str!("testdata/sample.xml");

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn words(t: &str) -> Result<usize> {
        Ok(t.split_whitespace().count())
    }

    #[test]
    fn builds_full_record() {
        let builder = ArticleBuilder::new(ChunkParams::new(8, 2, 1).unwrap(), &words);
        let articles = builder.build_all(SAMPLE_XML).unwrap();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];

        assert_eq!(a.pmid, "36464825");
        assert_eq!(a.doi(), Some("10.1038/s41586-022-05000-0"));
        assert_eq!(a.journal_name(), Some("Nature"));
        assert_eq!(a.abstract_sections[0].section_type, "ABSTRACT");
        assert!(a.meta_info.citation_count.is_none());

        assert!(!a.article_splits.is_empty());
        let n = a.article_splits.len();
        for (i, s) in a.article_splits.iter().enumerate() {
            assert_eq!(s.split_number, i + 1);
            assert_eq!(s.total_splits, n);
            assert_eq!(s.section_title, "Abstract");
        }
        assert!(a.article_splits[0].text.starts_with("BACKGROUND:"));
    }

    #[test]
    fn serialises_with_flattened_meta() {
        let builder = ArticleBuilder::new(ChunkParams::default(), &words);
        let article = builder.build_all(SAMPLE_XML).unwrap().remove(0);
        let json = serde_json::to_value(&article).unwrap();

        assert!(json["abstract"][0]["text"].as_str().unwrap().contains("METHODS:"));
        assert_eq!(json["meta_info"]["fulljournalname"], "Nature");
        assert_eq!(json["meta_info"]["title"], "Loss of TP53 drives growth.");
        assert_eq!(json["meta_info"]["publication_type"][0]["ui"], "D016428");
        assert!(json["meta_info"].get("citation_count").is_none());
        assert_eq!(json["article_splits"][0]["split_number"], 1);

        let back: Article = serde_json::from_value(json).unwrap();
        assert_eq!(back, article);
    }

    #[test]
    fn article_without_abstract_is_kept() {
        let xml = "<PubmedArticle><MedlineCitation><PMID>7</PMID><Article><ArticleTitle>T</ArticleTitle></Article></MedlineCitation></PubmedArticle>";
        let builder = ArticleBuilder::new(ChunkParams::default(), &words);
        let a = builder.build_all(xml).unwrap().remove(0);
        assert_eq!(a.pmid, "7");
        assert_eq!(a.abstract_sections[0].text, "");
        assert!(a.article_splits.is_empty());
    }

    #[test]
    fn counter_failure_fails_the_article() {
        let broken = |_: &str| -> Result<usize> { Err(anyhow!("no tokenizer")) };
        let builder = ArticleBuilder::new(ChunkParams::default(), &broken);
        let err = builder.build_all(SAMPLE_XML).unwrap_err();
        assert!(format!("{err:#}").contains("no tokenizer"));
    }
}
