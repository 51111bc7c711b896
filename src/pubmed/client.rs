use std::collections::BTreeSet;
use std::time::Duration;

use serde::Deserialize;

use crate::config::PubMedConfig;
use crate::errors::AssistantError;

#[derive(Debug, Deserialize)]
struct ESearchResponse {
    esearchresult: ESearchResult,
}

#[derive(Debug, Deserialize)]
struct ESearchResult {
    #[serde(default)]
    count: Option<String>,
    #[serde(default)]
    idlist: Vec<String>,
    #[serde(default)]
    querykey: Option<String>,
    #[serde(default)]
    webenv: Option<String>,
    #[serde(rename = "ERROR", default)]
    error: Option<String>,
}

impl ESearchResult {
    fn total(&self) -> Result<usize, AssistantError> {
        if let Some(error) = &self.error {
            return Err(AssistantError::ApiError(format!("esearch: {}", error)));
        }
        let count = self
            .count
            .as_deref()
            .ok_or_else(|| AssistantError::ParseError("esearch: missing count".to_string()))?;
        count
            .parse()
            .map_err(|_| AssistantError::ParseError(format!("esearch: bad count {:?}", count)))
    }
}

/// NCBI E-utilities client for the `pubmed` database.
#[derive(Clone)]
pub struct EutilsClient {
    client: reqwest::Client,
    config: PubMedConfig,
}

impl EutilsClient {
    pub fn new(client: reqwest::Client, config: PubMedConfig) -> Self {
        Self { client, config }
    }

    pub(crate) async fn pause(&self) {
        if self.config.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
        }
    }

    async fn get_text(
        &self,
        endpoint: &str,
        mut params: Vec<(&'static str, String)>,
        timeout: Duration,
    ) -> Result<String, AssistantError> {
        params.push(("db", "pubmed".to_string()));
        if !self.config.api_key.is_empty() {
            params.push(("api_key", self.config.api_key.clone()));
        }

        let response = self
            .client
            .get(format!(
                "{}/{}",
                self.config.eutils_url.trim_end_matches('/'),
                endpoint
            ))
            .query(&params)
            .timeout(timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AssistantError::ApiError(format!(
                "error: status {status}, text {text}"
            )));
        }

        Ok(response.text().await?)
    }

    async fn esearch(
        &self,
        params: Vec<(&'static str, String)>,
    ) -> Result<ESearchResult, AssistantError> {
        let mut params = params;
        params.push(("retmode", "json".to_string()));
        let body = self
            .get_text("esearch.fcgi", params, Duration::from_secs(10))
            .await?;
        let response: ESearchResponse = serde_json::from_str(&body)?;
        Ok(response.esearchresult)
    }

    /// Number of PubMed records matching `query`.
    pub async fn count(&self, query: &str) -> Result<u64, AssistantError> {
        let result = self
            .esearch(vec![("term", query.to_string()), ("retmax", "0".to_string())])
            .await?;
        Ok(result.total()? as u64)
    }

    /// Every PMID matching `query`. The first page opens a history session
    /// and later pages walk it with `retstart`. A failed first request yields
    /// an empty set, a failed later page is skipped.
    pub async fn search(&self, query: &str) -> BTreeSet<String> {
        log::info!("Starting search for query: {}", query);
        let batch_size = self.config.search_batch_size.max(1);

        let first = self
            .esearch(vec![
                ("term", query.to_string()),
                ("retmax", batch_size.to_string()),
                ("usehistory", "y".to_string()),
            ])
            .await
            .and_then(|result| result.total().map(|total| (total, result)));
        let (total, first) = match first {
            Ok(found) => found,
            Err(e) => {
                log::error!("Error during PubMed search: {}", e);
                return BTreeSet::new();
            }
        };
        log::info!("Total records found for query: {}", total);

        let mut pmids: BTreeSet<String> = first.idlist.into_iter().collect();

        for retstart in (batch_size..total).step_by(batch_size) {
            self.pause().await;
            log::info!("Fetching PubMed IDs {} to {}", retstart, retstart + batch_size);

            let mut params = vec![
                ("retstart", retstart.to_string()),
                ("retmax", batch_size.to_string()),
            ];
            match (&first.querykey, &first.webenv) {
                (Some(query_key), Some(webenv)) => {
                    params.push(("query_key", query_key.clone()));
                    params.push(("WebEnv", webenv.clone()));
                }
                _ => params.push(("term", query.to_string())),
            }

            match self.esearch(params).await {
                Ok(page) => {
                    log::info!("Retrieved {} PubMed IDs", page.idlist.len());
                    pmids.extend(page.idlist);
                }
                Err(e) => log::error!(
                    "Error fetching PubMed IDs {} to {}: {}",
                    retstart,
                    retstart + batch_size,
                    e
                ),
            }
        }

        log::info!("Total unique PubMed IDs collected for query: {}", pmids.len());
        pmids
    }

    /// efetch XML for `pmids`, one document per batch. Failed batches are
    /// logged and left out.
    pub async fn fetch_details(&self, pmids: &[String]) -> Vec<String> {
        let batch_size = self.config.fetch_batch_size.max(1);
        let mut batches = vec![];

        for (index, chunk) in pmids.chunks(batch_size).enumerate() {
            if index > 0 {
                self.pause().await;
            }
            let start = index * batch_size;
            log::info!(
                "Fetching detailed records for PubMed IDs {} to {}",
                start + 1,
                start + chunk.len()
            );
            let params = vec![("id", chunk.join(",")), ("retmode", "xml".to_string())];
            match self
                .get_text("efetch.fcgi", params, Duration::from_secs(30))
                .await
            {
                Ok(xml) => {
                    log::info!("Fetched batch {} with {} records", index + 1, chunk.len());
                    batches.push(xml);
                }
                Err(e) => log::error!(
                    "Error fetching details for PubMed IDs {} to {}: {}",
                    start + 1,
                    start + chunk.len(),
                    e
                ),
            }
        }

        log::info!("Total records fetched: {} batches", batches.len());
        batches
    }

    /// efetch XML for a single PMID, `None` when the id is not numeric or the
    /// request fails.
    pub async fn fetch_one(&self, pmid: &str) -> Option<String> {
        if pmid.is_empty() || !pmid.chars().all(|c| c.is_ascii_digit()) {
            log::warn!("Invalid PMID format: {}", pmid);
            return None;
        }

        log::info!("Re-attempting fetch for PMID: {}", pmid);
        let params = vec![("id", pmid.to_string()), ("retmode", "xml".to_string())];
        match self
            .get_text("efetch.fcgi", params, Duration::from_secs(10))
            .await
        {
            Ok(xml) if !xml.trim().is_empty() => {
                log::info!("Successfully fetched PMID: {}", pmid);
                Some(xml)
            }
            Ok(_) => {
                log::error!("Empty response for PMID: {}", pmid);
                None
            }
            Err(e) => {
                log::error!("Failed to fetch PMID: {}. Error: {}", pmid, e);
                None
            }
        }
    }

    pub async fn fetch_one_with_retries(&self, pmid: &str) -> Option<String> {
        let retries = self.config.retries.max(1);
        for attempt in 1..=retries {
            if let Some(xml) = self.fetch_one(pmid).await {
                return Some(xml);
            }
            let sleep = backoff_delay(self.config.backoff_secs, attempt);
            log::info!(
                "Retrying fetch for PMID: {} after {:?} (Attempt {}/{})",
                pmid,
                sleep,
                attempt,
                retries
            );
            tokio::time::sleep(sleep).await;
        }
        log::error!("All retry attempts failed for PMID: {}", pmid);
        None
    }
}

/// `backoff * 2^(attempt - 1)`
pub fn backoff_delay(backoff_secs: f64, attempt: u32) -> Duration {
    let factor = 2f64.powi(attempt.saturating_sub(1) as i32);
    Duration::from_secs_f64((backoff_secs * factor).max(0.0))
}
