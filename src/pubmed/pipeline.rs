use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use super::client::EutilsClient;
use super::export;
use super::parser::extract_records;
use super::record::ArticleRecord;
use crate::consts;
use crate::errors::AssistantError;

#[derive(Debug, Clone)]
pub struct PipelineSummary {
    pub started_at: DateTime<Utc>,
    pub queries: usize,
    pub total_pmids: usize,
    pub extracted: usize,
    pub missing_after_first_pass: Vec<String>,
    pub still_missing: Vec<String>,
    pub output: PathBuf,
}

fn write_pmid_list(path: &Path, pmids: &BTreeSet<String>) -> Result<(), AssistantError> {
    let mut contents = String::new();
    for pmid in pmids {
        contents.push_str(pmid);
        contents.push('\n');
    }
    fs::write(path, contents)?;
    Ok(())
}

/// Searches every query, fetches the union of PMIDs, retries the ones that
/// did not come back, and writes the records to `output` as CSV. The
/// missing-PMID lists are written next to `output`.
pub async fn run_pipeline(
    client: &EutilsClient,
    queries: &[String],
    output: &Path,
) -> Result<PipelineSummary, AssistantError> {
    if queries.iter().all(|query| query.trim().is_empty()) {
        return Err(AssistantError::ValidationError(
            "error: no PubMed queries given".to_string(),
        ));
    }
    let started_at = Utc::now();
    let out_dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    fs::create_dir_all(&out_dir)?;

    let mut combined = BTreeSet::new();
    for query in queries.iter().filter(|query| !query.trim().is_empty()) {
        combined.extend(client.search(query).await);
    }
    log::info!("Total unique PubMed IDs across all queries: {}", combined.len());

    let pmids: Vec<String> = combined.iter().cloned().collect();
    let batches = client.fetch_details(&pmids).await;

    let mut records: Vec<ArticleRecord> = vec![];
    let mut processed = BTreeSet::new();
    for xml in &batches {
        let (batch_records, batch_pmids) = extract_records(xml);
        records.extend(batch_records);
        processed.extend(batch_pmids);
    }

    let missing: BTreeSet<String> = combined.difference(&processed).cloned().collect();
    log::info!("Total records extracted: {}", records.len());
    log::info!("Total PMIDs not processed: {}", missing.len());

    let mut still_missing = BTreeSet::new();
    if missing.is_empty() {
        log::info!("All PMIDs successfully processed.");
    } else {
        let preview: Vec<&str> = missing.iter().take(10).map(String::as_str).collect();
        log::warn!("Missing PMIDs: {}...", preview.join(", "));
        write_pmid_list(&out_dir.join(consts::MISSING_PMIDS_FILE), &missing)?;

        for pmid in &missing {
            client.pause().await;
            if let Some(xml) = client.fetch_one_with_retries(pmid).await {
                let (retried, _) = extract_records(&xml);
                if !retried.is_empty() {
                    records.extend(retried);
                    processed.insert(pmid.clone());
                }
            }
        }

        still_missing = combined.difference(&processed).cloned().collect();
        if still_missing.is_empty() {
            log::info!("All PMIDs successfully processed after retry.");
        } else {
            log::error!("After retry, still missing PMIDs: {}", still_missing.len());
            write_pmid_list(&out_dir.join(consts::STILL_MISSING_PMIDS_FILE), &still_missing)?;
        }
    }

    export::save_csv(output, &records)?;

    Ok(PipelineSummary {
        started_at,
        queries: queries.len(),
        total_pmids: combined.len(),
        extracted: records.len(),
        missing_after_first_pass: missing.into_iter().collect(),
        still_missing: still_missing.into_iter().collect(),
        output: output.to_path_buf(),
    })
}
