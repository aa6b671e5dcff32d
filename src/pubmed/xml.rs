//! Streaming PubMed XML reader producing small owned element trees.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

pub const ARTICLE_TAG: &str = "PubmedArticle";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub nodes: Vec<Node>,
}

impl Element {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Direct text of this element, children excluded, trimmed.
    pub fn text(&self) -> String {
        let own: String = self
            .nodes
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect();
        own.trim().to_string()
    }

    /// All text under this element in document order, trimmed.
    pub fn inner_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out.trim().to_string()
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
            }
        }
    }

    fn descendants<'a>(&'a self, out: &mut Vec<&'a Element>) {
        for child in self.children() {
            out.push(child);
            child.descendants(out);
        }
    }

    /// Elements matching a slash path of child names; a leading `.//` lets
    /// the first step match at any depth.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let (deep, rest) = match path.strip_prefix(".//") {
            Some(rest) => (true, rest),
            None => (false, path),
        };
        let mut steps = rest.split('/').filter(|s| !s.is_empty());
        let Some(first) = steps.next() else { return Vec::new() };

        let mut current: Vec<&Element> = if deep {
            let mut all = Vec::new();
            self.descendants(&mut all);
            all.into_iter().filter(|e| e.name == first).collect()
        } else {
            self.children().filter(|e| e.name == first).collect()
        };
        for step in steps {
            current = current
                .into_iter()
                .flat_map(|e| e.children().filter(move |c| c.name == step))
                .collect();
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// Direct text of the first match, empty when absent.
    pub fn find_text(&self, path: &str) -> String {
        self.find(path).map(Element::text).unwrap_or_default()
    }
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attrs = Vec::new();
    for attr in start.attributes() {
        let attr = attr.with_context(|| format!("bad attribute on <{name}>"))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().with_context(|| format!("bad attribute value on <{name}>"))?;
        attrs.push((key, value.into_owned()));
    }
    Ok(Element { name, attrs, nodes: Vec::new() })
}

/// Yields one `<PubmedArticle>` tree at a time; everything between articles
/// is skipped without being kept.
pub struct ArticleReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    done: bool,
}

impl<R: BufRead> ArticleReader<R> {
    pub fn new(inner: R) -> Self {
        Self { reader: Reader::from_reader(inner), buf: Vec::new(), done: false }
    }

    fn next_article(&mut self) -> Result<Option<Element>> {
        // open elements of the article being built; empty while between articles
        let mut stack: Vec<Element> = Vec::new();

        loop {
            self.buf.clear();
            let event = self
                .reader
                .read_event_into(&mut self.buf)
                .with_context(|| format!("xml error at byte {}", self.reader.buffer_position()))?;

            match event {
                Event::Start(start) => {
                    if stack.is_empty() && start.name().as_ref() != ARTICLE_TAG.as_bytes() {
                        continue;
                    }
                    stack.push(start_element(&start)?);
                }
                Event::Empty(start) => {
                    if stack.is_empty() {
                        continue;
                    }
                    let el = start_element(&start)?;
                    if let Some(parent) = stack.last_mut() {
                        parent.nodes.push(Node::Element(el));
                    }
                }
                Event::Text(text) => {
                    if let Some(top) = stack.last_mut() {
                        let text = text.unescape().context("bad text escape")?;
                        top.nodes.push(Node::Text(text.into_owned()));
                    }
                }
                Event::CData(data) => {
                    if let Some(top) = stack.last_mut() {
                        let raw = data.into_inner();
                        top.nodes.push(Node::Text(String::from_utf8_lossy(&raw).into_owned()));
                    }
                }
                Event::End(_) => {
                    let Some(done) = stack.pop() else { continue };
                    match stack.last_mut() {
                        Some(parent) => parent.nodes.push(Node::Element(done)),
                        None => return Ok(Some(done)),
                    }
                }
                Event::Eof => return Ok(None),
                _ => {}
            }
        }
    }
}

impl<R: BufRead> Iterator for ArticleReader<R> {
    type Item = Result<Element>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_article() {
            Ok(Some(el)) => Some(Ok(el)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                // a broken stream cannot be resynchronised
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Open a PubMed XML file, transparently gunzipping `.gz` inputs.
pub fn open_articles(path: &Path) -> Result<ArticleReader<Box<dyn BufRead>>> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let gz = path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));
    let inner: Box<dyn BufRead> = if gz {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(ArticleReader::new(inner))
}

/// Every article in an in-memory document (e.g. an efetch response).
pub fn articles_from_str(xml: &str) -> Result<Vec<Element>> {
    ArticleReader::new(xml.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const DOC: &str = r#"<?xml version="1.0"?>
<!DOCTYPE PubmedArticleSet>
<PubmedArticleSet>
  <PubmedArticle>
    <MedlineCitation Status="MEDLINE">
      <PMID Version="1">111</PMID>
      <Article>
        <ArticleTitle>Effects of <i>TP53</i> loss &amp; repair</ArticleTitle>
        <Pagination><MedlinePgn/></Pagination>
      </Article>
    </MedlineCitation>
  </PubmedArticle>
  <DeleteCitation><PMID>9</PMID></DeleteCitation>
  <PubmedArticle>
    <MedlineCitation><PMID>222</PMID></MedlineCitation>
  </PubmedArticle>
</PubmedArticleSet>"#;

    #[test]
    fn yields_each_article_and_skips_the_rest() {
        let articles = articles_from_str(DOC).unwrap();
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| a.name == ARTICLE_TAG));
        assert_eq!(articles[1].find_text("MedlineCitation/PMID"), "222");
    }

    #[test]
    fn paths_text_and_attributes() {
        let article = &articles_from_str(DOC).unwrap()[0];
        let pmid = article.find(".//PMID").unwrap();
        assert_eq!(pmid.text(), "111");
        assert_eq!(pmid.attr("Version"), Some("1"));
        assert_eq!(article.find("MedlineCitation").unwrap().attr("Status"), Some("MEDLINE"));

        let title = article.find(".//Article/ArticleTitle").unwrap();
        assert_eq!(title.inner_text(), "Effects of TP53 loss & repair");
        assert_eq!(title.text(), "Effects of  loss & repair");

        // self-closing elements are kept, just empty
        assert_eq!(article.find_text(".//Pagination/MedlinePgn"), "");
        assert!(article.find("Article").is_none());
        assert!(article.find_all(".//Nope/PMID").is_empty());
    }

    #[test]
    fn reads_gzip_files() {
        let dir = std::env::temp_dir().join(format!("pubsplit-xml-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.xml.gz");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(DOC.as_bytes()).unwrap();
        std::fs::write(&path, enc.finish().unwrap()).unwrap();

        let pmids: Vec<String> = open_articles(&path)
            .unwrap()
            .map(|a| a.unwrap().find_text(".//PMID"))
            .collect();
        assert_eq!(pmids, vec!["111", "222"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn malformed_xml_surfaces_one_error() {
        let broken = "<PubmedArticle><MedlineCitation></PubmedArticle>";
        let mut reader = ArticleReader::new(broken.as_bytes());
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }
}
