use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const ABSTRACT_TITLE: &str = "Abstract";
pub const ABSTRACT_TYPE: &str = "ABSTRACT";

/// One JSON record per article, as written to `pubmed_<pmid>.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(rename = "abstract")]
    pub abstract_sections: Vec<AbstractSection>,
    pub meta_info: MetaInfo,
    pub pmid: String,
    pub article_splits: Vec<ArticleSplit>,
}

impl Article {
    pub fn doi(&self) -> Option<&str> {
        self.meta_info.id_of("doi")
    }

    pub fn journal_name(&self) -> Option<&str> {
        self.meta_info.journal.fulljournalname.as_deref().filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbstractSection {
    pub text: String,
    pub section_title: String,
    pub section_type: String,
}

impl AbstractSection {
    pub fn new(text: String) -> Self {
        Self { text, section_title: ABSTRACT_TITLE.into(), section_type: ABSTRACT_TYPE.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSplit {
    pub text: String,
    pub section_title: String,
    pub section_type: String,
    pub split_number: usize,
    pub total_splits: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaInfo {
    pub articleids: Vec<ArticleId>,
    pub kwd: String,
    pub dates_history: Vec<HistoryDate>,
    #[serde(flatten)]
    pub journal: JournalInfo,
    #[serde(flatten)]
    pub article: ArticleInfo,
    pub authors: Vec<Author>,
    pub mesh_terms: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub citation_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_ranking: Option<JournalRanking>,
}

impl MetaInfo {
    pub fn id_of(&self, idtype: &str) -> Option<&str> {
        self.articleids
            .iter()
            .find(|id| id.idtype == idtype && !id.value.is_empty())
            .map(|id| id.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleId {
    pub idtype: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryDate {
    pub date_type: String,
    pub year: String,
    pub month: String,
    pub day: String,
}

// Absent journal fields are left out of the JSON instead of written empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulljournalname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub journal_abbrev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pubdate: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleInfo {
    pub title: String,
    pub languages: String,
    pub volume: String,
    pub issue: String,
    pub pages: String,
    pub publication_type: Vec<PublicationType>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationType {
    pub ui: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub first: String,
    pub middle: String,
    pub last: String,
    pub suffix: String,
    pub initials: String,
    pub affiliation: String,
    pub email: String,
}

/// A row of the exaly journal table keyed by column header.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalRanking(pub BTreeMap<String, RankingValue>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RankingValue {
    Count(u64),
    Score(f64),
    Text(String),
}

impl JournalRanking {
    pub fn get(&self, column: &str) -> Option<&RankingValue> {
        self.0.get(column)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
