//! Field lookups over a `<PubmedArticle>` tree.

use super::types::{ArticleId, ArticleInfo, Author, HistoryDate, JournalInfo, PublicationType};
use super::xml::Element;

const LIST_SEP: &str = ";";
const LABEL_ATTR: &str = "Label";
const UNASSIGNED: &str = "UNASSIGNED";

/// Abstract text; structured abstracts become `LABEL:\ntext` blocks separated
/// by a blank line. Empty when the article has none.
pub fn abstract_text(root: &Element) -> String {
    let Some(article) = root.find(".//MedlineCitation/Article") else { return String::new() };

    let sections = article.find_all("Abstract/AbstractText");
    match sections.as_slice() {
        [] => article.find("Abstract").map(Element::inner_text).unwrap_or_default(),
        [only] => only.inner_text(),
        many => many
            .iter()
            .filter_map(|section| {
                let body = section.inner_text();
                if body.is_empty() {
                    return None;
                }
                match section.attr(LABEL_ATTR).map(str::trim) {
                    None | Some("") | Some(UNASSIGNED) => Some(body),
                    Some(label) => Some(format!("{label}:\n{body}")),
                }
            })
            .collect::<Vec<_>>()
            .join("\n\n"),
    }
}

pub fn article_ids(root: &Element) -> Vec<ArticleId> {
    root.find_all(".//PubmedData/ArticleIdList/ArticleId")
        .into_iter()
        .map(|id| ArticleId {
            idtype: id.attr("IdType").unwrap_or("").to_string(),
            value: id.text(),
        })
        .collect()
}

pub fn keywords(root: &Element) -> String {
    root.find_all(".//KeywordList/Keyword")
        .into_iter()
        .map(Element::inner_text)
        .collect::<Vec<_>>()
        .join(LIST_SEP)
}

pub fn dates_history(root: &Element) -> Vec<HistoryDate> {
    root.find_all(".//PubmedData/History/PubMedPubDate")
        .into_iter()
        .map(|date| HistoryDate {
            date_type: date.attr("PubStatus").unwrap_or("").to_string(),
            year: date.find_text("Year"),
            month: date.find_text("Month"),
            day: date.find_text("Day"),
        })
        .collect()
}

pub fn journal_info(root: &Element) -> JournalInfo {
    let Some(journal) = root.find(".//MedlineCitation/Article/Journal") else {
        return JournalInfo::default();
    };
    let pubdate = journal.find("JournalIssue/PubDate").and_then(|date| {
        let ymd: Vec<String> = ["Year", "Month", "Day"]
            .iter()
            .map(|p| date.find_text(p))
            .filter(|s| !s.is_empty())
            .collect();
        if ymd.is_empty() {
            Some(date.find_text("MedlineDate")).filter(|s| !s.is_empty())
        } else {
            Some(ymd.join(" "))
        }
    });

    JournalInfo {
        fulljournalname: journal.find("Title").map(Element::text),
        journal_abbrev: journal.find("ISOAbbreviation").map(Element::text),
        issn: journal.find("ISSN").map(Element::text),
        pubdate,
    }
}

pub fn article_info(root: &Element) -> ArticleInfo {
    let Some(article) = root.find(".//MedlineCitation/Article") else {
        return ArticleInfo::default();
    };
    ArticleInfo {
        title: article.find("ArticleTitle").map(Element::inner_text).unwrap_or_default(),
        languages: article
            .find_all("Language")
            .into_iter()
            .map(Element::text)
            .collect::<Vec<_>>()
            .join(LIST_SEP),
        volume: article.find_text("Journal/JournalIssue/Volume"),
        issue: article.find_text("Journal/JournalIssue/Issue"),
        pages: article.find_text("Pagination/MedlinePgn"),
        publication_type: article
            .find_all("PublicationTypeList/PublicationType")
            .into_iter()
            .map(|t| PublicationType { ui: t.attr("UI").map(str::to_string), name: t.text() })
            .collect(),
    }
}

pub fn authors(root: &Element) -> Vec<Author> {
    root.find_all(".//AuthorList/Author")
        .into_iter()
        .map(|a| Author {
            first: a.find_text("ForeName"),
            last: a.find_text("LastName"),
            suffix: a.find_text("Suffix"),
            initials: a.find_text("Initials"),
            affiliation: a
                .find("AffiliationInfo/Affiliation")
                .map(Element::inner_text)
                .unwrap_or_default(),
            ..Author::default()
        })
        .collect()
}

/// `UI:Descriptor[*] / UI:Qualifier[*]` per heading, `*` marking major topics.
pub fn mesh_terms(root: &Element) -> String {
    let Some(list) = root.find(".//MedlineCitation/MeshHeadingList") else { return String::new() };

    let tagged = |e: &Element| {
        let mut term = format!("{}:{}", e.attr("UI").unwrap_or(""), e.text());
        if e.attr("MajorTopicYN") == Some("Y") {
            term.push('*');
        }
        term
    };

    list.children()
        .filter_map(|heading| {
            let descriptor = heading.find("DescriptorName")?;
            let mut term = tagged(descriptor);
            for q in heading.find_all("QualifierName") {
                term.push_str(" / ");
                term.push_str(&tagged(q));
            }
            Some(term)
        })
        .collect::<Vec<_>>()
        .join(LIST_SEP)
}

/// PubMed id from the ArticleIdList, falling back to the citation's PMID.
pub fn pmid(root: &Element, ids: &[ArticleId]) -> String {
    ids.iter()
        .find(|id| id.idtype == "pubmed" && !id.value.is_empty())
        .map(|id| id.value.clone())
        .unwrap_or_else(|| root.find_text(".//MedlineCitation/PMID"))
}
