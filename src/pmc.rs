//! PubMed Central downloads: article PDFs and the open-access file list.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::config::PmcConfig;
use crate::consts;
use crate::errors::AssistantError;

/// Trims an id and adds the `PMC` prefix to bare digits. Anything that is
/// not `PMC` followed by digits is rejected.
pub fn normalize_pmc_id(raw: &str) -> Option<String> {
    let id = raw.trim();
    let digits = match id.get(..3) {
        Some(prefix) if prefix.eq_ignore_ascii_case("PMC") => &id[3..],
        _ => id,
    };
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(format!("PMC{}", digits))
}

#[derive(Debug, Serialize, Default, Clone)]
pub struct DownloadReport {
    pub downloaded: Vec<PathBuf>,
    pub failed: Vec<String>,
    pub invalid: Vec<String>,
}

pub struct PmcClient {
    client: reqwest::Client,
    config: PmcConfig,
    api_key: String,
}

impl PmcClient {
    pub fn new(client: reqwest::Client, config: PmcConfig, api_key: &str) -> Self {
        Self {
            client,
            config,
            api_key: api_key.to_string(),
        }
    }

    async fn get_bytes(&self, url: &str, with_key: bool) -> Result<Vec<u8>, AssistantError> {
        let mut request = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, consts::BROWSER_USER_AGENT);
        if with_key && !self.api_key.is_empty() {
            request = request.query(&[("api_key", self.api_key.as_str())]);
        }
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(AssistantError::ApiError(format!(
                "error: status {} for {}",
                response.status(),
                url
            )));
        }
        Ok(response.bytes().await?.to_vec())
    }

    /// Saves `<out_dir>/<PMCID>.pdf` for each id. Failures are recorded in the
    /// report and do not stop the run.
    pub async fn download_pdfs(
        &self,
        ids: &[String],
        out_dir: &Path,
    ) -> Result<DownloadReport, AssistantError> {
        if self.api_key.is_empty() {
            return Err(AssistantError::ConfigError(
                "PUBMED_API_KEY not found in environment variables".to_string(),
            ));
        }
        tokio::fs::create_dir_all(out_dir).await?;

        let mut report = DownloadReport::default();
        let mut first = true;

        for raw in ids {
            let Some(pmc_id) = normalize_pmc_id(raw) else {
                log::warn!("Skipping invalid PMC ID: {:?}", raw);
                report.invalid.push(raw.clone());
                continue;
            };
            if !first && self.config.delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.delay_ms)).await;
            }
            first = false;

            let url = format!(
                "{}/{}/pdf/",
                self.config.articles_url.trim_end_matches('/'),
                pmc_id
            );
            match self.get_bytes(&url, true).await {
                Ok(bytes) => {
                    let output_path = out_dir.join(format!("{}.pdf", pmc_id));
                    tokio::fs::write(&output_path, &bytes).await?;
                    log::info!(
                        "Downloaded PDF for {} and saved as {}",
                        pmc_id,
                        output_path.display()
                    );
                    report.downloaded.push(output_path);
                }
                Err(e) => {
                    log::error!("Error downloading PDF for {}: {}", pmc_id, e);
                    report.failed.push(pmc_id);
                }
            }
        }

        Ok(report)
    }

    /// Saves the PMC open-access non-commercial PDF list into `out_dir`.
    pub async fn download_oa_list(&self, out_dir: &Path) -> Result<PathBuf, AssistantError> {
        tokio::fs::create_dir_all(out_dir).await?;
        log::info!("Downloading {}...", consts::PMC_OA_LIST_FILE);

        let bytes = self.get_bytes(&self.config.oa_list_url, false).await?;
        let path = out_dir.join(consts::PMC_OA_LIST_FILE);
        tokio::fs::write(&path, &bytes).await?;

        log::info!(
            "Downloaded {} successfully to {}",
            consts::PMC_OA_LIST_FILE,
            path.display()
        );
        Ok(path)
    }
}
