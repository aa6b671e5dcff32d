use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::pubmed::{JournalRanking, RankingValue};

pub const SEARCH_URL: &str = "https://exaly.com/journals/";
const DROPPED_COLUMNS: [&str; 2] = ["star", "#"];
const IMPACT_FACTOR: &str = "Impact Factor";
const JOURNAL_COLUMN: &str = "Journal";

/// exaly journal search, one lookup per journal name per process.
pub struct ExalyClient {
    http: Client,
    cache: Mutex<HashMap<String, Option<JournalRanking>>>,
}

impl ExalyClient {
    pub fn new(http: Client) -> Self {
        Self { http, cache: Mutex::new(HashMap::new()) }
    }

    pub async fn ranking(&self, journal: &str, pmid: &str) -> Option<JournalRanking> {
        let journal = journal.trim();
        if journal.is_empty() {
            warn!(pmid, "journal name is empty, skipping ranking");
            return None;
        }
        let cached = self.cache.lock().ok().and_then(|c| c.get(journal).cloned());
        if let Some(hit) = cached {
            return hit;
        }

        let url = search_url(journal)?;
        debug!(journal, %url, "exaly search");
        let html = match self.http.get(url).send().await.and_then(|r| r.error_for_status()) {
            Ok(resp) => match resp.text().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(journal, error = %e, "exaly body unreadable");
                    return None;
                }
            },
            // transient failures are not cached
            Err(e) => {
                warn!(journal, error = %e, "exaly lookup failed");
                return None;
            }
        };

        let ranking = parse_ranking_table(&html, journal);
        if ranking.is_none() {
            warn!(journal, "no ranking table found");
        }
        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(journal.to_string(), ranking.clone());
        }
        ranking
    }
}

fn normalize(name: &str) -> String {
    name.replace('&', "and")
}

fn search_url(journal: &str) -> Option<Url> {
    Url::parse_with_params(SEARCH_URL, &[("q", normalize(journal))]).ok()
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().map(str::trim).collect()
}

/// Pick the journal's row from the first table of an exaly search page:
/// the exact (case-insensitive) name match, else the first result.
pub fn parse_ranking_table(html: &str, journal: &str) -> Option<JournalRanking> {
    let doc = Html::parse_document(html);
    let table_sel = Selector::parse("table").ok()?;
    let row_sel = Selector::parse("tr").ok()?;
    let cell_sel = Selector::parse("th, td").ok()?;

    let table = doc.select(&table_sel).next()?;
    let rows: Vec<Vec<String>> = table
        .select(&row_sel)
        .map(|row| row.select(&cell_sel).map(cell_text).collect::<Vec<_>>())
        .filter(|cells| !cells.is_empty())
        .collect();
    let (headers, body) = rows.split_first()?;
    let first = body.first()?;

    // the name sits under "Journal"; without that header, the first kept column
    let name_col = headers
        .iter()
        .position(|h| h == JOURNAL_COLUMN)
        .or_else(|| headers.iter().position(|h| !DROPPED_COLUMNS.contains(&h.as_str())))?;

    let wanted = normalize(journal).to_lowercase();
    let row = body
        .iter()
        .find(|row| {
            row.len() >= headers.len()
                && row.get(name_col).is_some_and(|name| normalize(name).to_lowercase() == wanted)
        })
        .unwrap_or(first);

    let fields: BTreeMap<String, RankingValue> = headers
        .iter()
        .zip(row)
        .filter(|(column, _)| !DROPPED_COLUMNS.contains(&column.as_str()))
        .map(|(column, raw)| (column.clone(), convert(column, raw)))
        .collect();
    Some(JournalRanking(fields))
}

// "4.2M" -> 4200000, "8.9K" -> 8900, Impact Factor as a float
fn convert(column: &str, raw: &str) -> RankingValue {
    if column == IMPACT_FACTOR {
        if let Ok(score) = raw.parse::<f64>() {
            return RankingValue::Score(score);
        }
    }
    let scaled = |digits: &str, factor: f64| {
        digits.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| (v * factor).round() as u64)
    };
    let count = match raw.as_bytes().last() {
        Some(b'K') => scaled(&raw[..raw.len() - 1], 1_000.0),
        Some(b'M') => scaled(&raw[..raw.len() - 1], 1_000_000.0),
        _ => None,
    };
    count.map(RankingValue::Count).unwrap_or_else(|| RankingValue::Text(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><body>
      <table>
        <tr><th>star</th><th>Journal</th><th>Impact Factor</th><th>Citations</th><th>Articles</th><th>#</th></tr>
        <tr><td></td><td>Nature Medicine</td><td>58.7</td><td>1.1M</td><td>6.2K</td><td>1</td></tr>
        <tr><td></td><td> Nature </td><td>49.9</td><td>4.2M</td><td>8.9K</td><td>2</td></tr>
      </table>
      <table><tr><th>Other</th></tr><tr><td>x</td></tr></table>
    </body></html>"#;

    #[test]
    fn prefers_exact_name_match() {
        let r = parse_ranking_table(PAGE, "nature").unwrap();
        assert_eq!(r.get("Journal"), Some(&RankingValue::Text("Nature".into())));
        assert_eq!(r.get("Impact Factor"), Some(&RankingValue::Score(49.9)));
        assert_eq!(r.get("Citations"), Some(&RankingValue::Count(4_200_000)));
        assert_eq!(r.get("Articles"), Some(&RankingValue::Count(8_900)));
        assert!(r.get("star").is_none() && r.get("#").is_none());
    }

    #[test]
    fn matches_name_column_without_journal_header() {
        let page = r#"<table>
          <tr><th>star</th><th>Title</th><th>Citations</th></tr>
          <tr><td></td><td>Cell Reports</td><td>2K</td></tr>
          <tr><td></td><td>Cell</td><td>3M</td></tr>
        </table>"#;
        let r = parse_ranking_table(page, "CELL").unwrap();
        assert_eq!(r.get("Title"), Some(&RankingValue::Text("Cell".into())));
        assert_eq!(r.get("Citations"), Some(&RankingValue::Count(3_000_000)));
    }

    #[test]
    fn falls_back_to_first_row() {
        let r = parse_ranking_table(PAGE, "Journal of Nothing").unwrap();
        assert_eq!(r.get("Journal"), Some(&RankingValue::Text("Nature Medicine".into())));
    }

    #[test]
    fn ampersand_matches_and() {
        let page = r#"<table><tr><th>Journal</th></tr><tr><td>A</td></tr><tr><td>Cells and Tissues</td></tr></table>"#;
        let r = parse_ranking_table(page, "Cells & Tissues").unwrap();
        assert_eq!(r.get("Journal"), Some(&RankingValue::Text("Cells and Tissues".into())));
    }

    #[test]
    fn no_table_or_no_rows() {
        assert!(parse_ranking_table("<p>nothing</p>", "Nature").is_none());
        assert!(parse_ranking_table("<table><tr><th>Journal</th></tr></table>", "Nature").is_none());
    }

    #[test]
    fn suffix_conversion_leaves_words_alone() {
        assert_eq!(convert("Citations", "12K"), RankingValue::Count(12_000));
        assert_eq!(convert("Journal", "BMJ"), RankingValue::Text("BMJ".into()));
        assert_eq!(convert("Impact Factor", "n/a"), RankingValue::Text("n/a".into()));
    }

    #[test]
    fn search_url_encodes_name() {
        let url = search_url("Cells & Tissues").unwrap();
        assert_eq!(url.as_str(), "https://exaly.com/journals/?q=Cells+and+Tissues");
    }
}
