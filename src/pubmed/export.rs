use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use serde::Deserialize;

use super::record::{ArticleKind, ArticleRecord, Author, Grant};
use crate::errors::AssistantError;

pub const FIELDNAMES: [&str; 25] = [
    "PMID",
    "DOI",
    "Full_Text_URL",
    "LinkOut_URLs",
    "Title",
    "Journal_Title",
    "Journal_ISOAbbreviation",
    "Journal_ISSN",
    "Publication_Year",
    "Publication_Month",
    "Publication_Day",
    "Volume",
    "Issue",
    "StartPage",
    "MedlinePgn",
    "Authors",
    "Abstract",
    "Keywords",
    "MeSH_Terms",
    "Publication_Types",
    "CoiStatement",
    "Grants",
    "PMC_ID",
    "Publication_Status",
    "Language",
];

const LIST_SEPARATOR: &str = "; ";

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn to_row(record: &ArticleRecord) -> Result<Vec<String>, AssistantError> {
    let grants = if record.grants.is_empty() {
        String::new()
    } else {
        serde_json::to_string(&record.grants)?
    };

    Ok(vec![
        record.pmid.clone(),
        opt(&record.doi),
        record.full_text_url().unwrap_or_default(),
        record.linkout_urls.join(LIST_SEPARATOR),
        opt(&record.title),
        opt(&record.journal_title),
        opt(&record.journal_iso_abbreviation),
        opt(&record.journal_issn),
        opt(&record.publication_year),
        opt(&record.publication_month),
        opt(&record.publication_day),
        opt(&record.volume),
        opt(&record.issue),
        opt(&record.start_page),
        opt(&record.medline_pgn),
        serde_json::to_string(&record.authors)?,
        record.abstract_text.clone(),
        record.keywords.join(LIST_SEPARATOR),
        record.mesh_terms.join(LIST_SEPARATOR),
        record.publication_types.join(LIST_SEPARATOR),
        opt(&record.coi_statement),
        grants,
        opt(&record.pmc_id),
        opt(&record.publication_status),
        opt(&record.language),
    ])
}

pub fn write_records<W: Write>(writer: W, records: &[ArticleRecord]) -> Result<(), AssistantError> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(FIELDNAMES)?;
    for record in records {
        writer.write_record(to_row(record)?)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn save_csv(path: &Path, records: &[ArticleRecord]) -> Result<(), AssistantError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    write_records(File::create(path)?, records)?;
    log::info!("Data saved to {}", path.display());
    Ok(())
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "PMID")]
    pmid: String,
    #[serde(rename = "DOI", default)]
    doi: String,
    #[serde(rename = "LinkOut_URLs", default)]
    linkout_urls: String,
    #[serde(rename = "Title", default)]
    title: String,
    #[serde(rename = "Journal_Title", default)]
    journal_title: String,
    #[serde(rename = "Journal_ISOAbbreviation", default)]
    journal_iso_abbreviation: String,
    #[serde(rename = "Journal_ISSN", default)]
    journal_issn: String,
    #[serde(rename = "Publication_Year", default)]
    publication_year: String,
    #[serde(rename = "Publication_Month", default)]
    publication_month: String,
    #[serde(rename = "Publication_Day", default)]
    publication_day: String,
    #[serde(rename = "Volume", default)]
    volume: String,
    #[serde(rename = "Issue", default)]
    issue: String,
    #[serde(rename = "StartPage", default)]
    start_page: String,
    #[serde(rename = "MedlinePgn", default)]
    medline_pgn: String,
    #[serde(rename = "Authors", default)]
    authors: String,
    #[serde(rename = "Abstract", default)]
    abstract_text: String,
    #[serde(rename = "Keywords", default)]
    keywords: String,
    #[serde(rename = "MeSH_Terms", default)]
    mesh_terms: String,
    #[serde(rename = "Publication_Types", default)]
    publication_types: String,
    #[serde(rename = "CoiStatement", default)]
    coi_statement: String,
    #[serde(rename = "Grants", default)]
    grants: String,
    #[serde(rename = "PMC_ID", default)]
    pmc_id: String,
    #[serde(rename = "Publication_Status", default)]
    publication_status: String,
    #[serde(rename = "Language", default)]
    language: String,
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() { None } else { Some(value) }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

impl CsvRow {
    fn into_record(self) -> Result<ArticleRecord, AssistantError> {
        let authors: Vec<Author> = if self.authors.trim().is_empty() {
            vec![]
        } else {
            serde_json::from_str(&self.authors)?
        };
        let grants: Vec<Grant> = if self.grants.trim().is_empty() {
            vec![]
        } else {
            serde_json::from_str(&self.grants)?
        };
        // the CSV has no column for the citation type
        Ok(ArticleRecord {
            kind: ArticleKind::Journal,
            pmid: self.pmid,
            doi: non_empty(self.doi),
            pmc_id: non_empty(self.pmc_id),
            title: non_empty(self.title),
            journal_title: non_empty(self.journal_title),
            journal_iso_abbreviation: non_empty(self.journal_iso_abbreviation),
            journal_issn: non_empty(self.journal_issn),
            publication_year: non_empty(self.publication_year),
            publication_month: non_empty(self.publication_month),
            publication_day: non_empty(self.publication_day),
            volume: non_empty(self.volume),
            issue: non_empty(self.issue),
            start_page: non_empty(self.start_page),
            medline_pgn: non_empty(self.medline_pgn),
            authors,
            abstract_text: self.abstract_text,
            keywords: split_list(&self.keywords),
            mesh_terms: split_list(&self.mesh_terms),
            publication_types: split_list(&self.publication_types),
            coi_statement: non_empty(self.coi_statement),
            grants,
            linkout_urls: split_list(&self.linkout_urls),
            publication_status: non_empty(self.publication_status),
            language: non_empty(self.language),
        })
    }
}

/// Reads records back from a CSV written by [`write_records`].
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ArticleRecord>, AssistantError> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut records = vec![];
    for row in reader.deserialize::<CsvRow>() {
        records.push(row?.into_record()?);
    }
    Ok(records)
}

pub fn load_csv(path: &Path) -> Result<Vec<ArticleRecord>, AssistantError> {
    read_records(File::open(path)?)
}
