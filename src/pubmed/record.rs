use serde::{Deserialize, Serialize};

use crate::consts::PMC_ARTICLES_URL;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Author {
    #[serde(rename = "LastName")]
    pub last_name: String,
    #[serde(rename = "ForeName")]
    pub fore_name: String,
    #[serde(rename = "Initials")]
    pub initials: Option<String>,
    #[serde(rename = "Affiliations", default)]
    pub affiliations: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Grant {
    #[serde(rename = "GrantID")]
    pub grant_id: Option<String>,
    #[serde(rename = "Agency")]
    pub agency: Option<String>,
    #[serde(rename = "Country")]
    pub country: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArticleKind {
    #[default]
    Journal,
    Book,
}

/// One citation flattened out of a `PubmedArticle` or `PubmedBookArticle`.
///
/// For book articles the journal fields carry the publisher name, publisher
/// location and medium.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct ArticleRecord {
    pub kind: ArticleKind,
    pub pmid: String,
    pub doi: Option<String>,
    pub pmc_id: Option<String>,
    pub title: Option<String>,
    pub journal_title: Option<String>,
    pub journal_iso_abbreviation: Option<String>,
    pub journal_issn: Option<String>,
    pub publication_year: Option<String>,
    pub publication_month: Option<String>,
    pub publication_day: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub start_page: Option<String>,
    pub medline_pgn: Option<String>,
    pub authors: Vec<Author>,
    pub abstract_text: String,
    pub keywords: Vec<String>,
    pub mesh_terms: Vec<String>,
    pub publication_types: Vec<String>,
    pub coi_statement: Option<String>,
    pub grants: Vec<Grant>,
    pub linkout_urls: Vec<String>,
    pub publication_status: Option<String>,
    pub language: Option<String>,
}

impl ArticleRecord {
    pub fn new(kind: ArticleKind, pmid: impl Into<String>) -> Self {
        Self {
            kind,
            pmid: pmid.into(),
            ..Default::default()
        }
    }

    /// PMC landing page when the article is in PMC, otherwise the DOI resolver.
    pub fn full_text_url(&self) -> Option<String> {
        if let Some(pmc_id) = &self.pmc_id {
            Some(format!("{}/{}/", PMC_ARTICLES_URL, pmc_id))
        } else {
            self.doi
                .as_ref()
                .map(|doi| format!("https://doi.org/{}", doi))
        }
    }
}
