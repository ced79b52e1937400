use crate::config::LlamaParseConfig;
use crate::loader::StructuredParser;
use crate::models::{Document, FileMeta};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Client for the LlamaCloud parsing API.
///
/// A file is uploaded as a parsing job, the job is polled until it settles,
/// and the plain-text result is fetched.
pub struct LlamaParseClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    poll_interval: Duration,
    max_wait: Duration,
}

#[derive(Deserialize)]
struct JobResponse {
    id: String,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct TextResult {
    text: String,
}

impl LlamaParseClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let defaults = LlamaParseConfig::default();
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            poll_interval: Duration::from_millis(defaults.poll_interval_ms),
            max_wait: Duration::from_secs(defaults.max_wait_secs),
        }
    }

    pub fn from_config(config: &LlamaParseConfig, api_key: &str) -> Self {
        Self::new(&config.url, api_key).with_polling(
            Duration::from_millis(config.poll_interval_ms),
            Duration::from_secs(config.max_wait_secs),
        )
    }

    /// Set how often a job is polled and how long to wait in total
    pub fn with_polling(mut self, interval: Duration, max_wait: Duration) -> Self {
        self.poll_interval = interval;
        self.max_wait = max_wait;
        self
    }

    async fn upload(&self, file: &FileMeta) -> Result<String> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .with_context(|| format!("Failed to read file for parsing: {}", file.path.display()))?;

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file.file_name());
        let form = reqwest::multipart::Form::new().part("file", part);

        let url = format!("{}/api/parsing/upload", self.base_url);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .context("Failed to connect to LlamaCloud parsing API")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("LlamaCloud upload returned error {}: {}", status, error_text);
        }

        let job: JobResponse = response
            .json()
            .await
            .context("Failed to parse LlamaCloud upload response")?;

        Ok(job.id)
    }

    async fn wait_for_job(&self, job_id: &str) -> Result<()> {
        let url = format!("{}/api/parsing/job/{}", self.base_url, job_id);
        let started = Instant::now();

        loop {
            let job: JobResponse = self
                .client
                .get(&url)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .context("Failed to poll LlamaCloud parsing job")?
                .error_for_status()
                .context("LlamaCloud job status returned non-success status")?
                .json()
                .await
                .context("Failed to parse LlamaCloud job status")?;

            match job.status.as_str() {
                "SUCCESS" | "PARTIAL_SUCCESS" => return Ok(()),
                "ERROR" | "CANCELED" | "CANCELLED" => {
                    anyhow::bail!("LlamaCloud parsing job {} ended with status {}", job_id, job.status)
                }
                _ => {}
            }

            if started.elapsed() >= self.max_wait {
                anyhow::bail!(
                    "LlamaCloud parsing job {} did not finish within {:?}",
                    job_id,
                    self.max_wait
                );
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    async fn fetch_text(&self, job_id: &str) -> Result<String> {
        let url = format!("{}/api/parsing/job/{}/result/text", self.base_url, job_id);
        let result: TextResult = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .context("Failed to fetch LlamaCloud parsing result")?
            .error_for_status()
            .context("LlamaCloud result returned non-success status")?
            .json()
            .await
            .context("Failed to parse LlamaCloud parsing result")?;

        Ok(result.text)
    }
}

#[async_trait::async_trait]
impl StructuredParser for LlamaParseClient {
    async fn parse(&self, file: &FileMeta) -> Result<Vec<Document>> {
        let job_id = self.upload(file).await?;
        tracing::debug!(job_id = %job_id, path = %file.path.display(), "parsing job submitted");

        self.wait_for_job(&job_id).await?;
        let text = self.fetch_text(&job_id).await?;

        Ok(vec![Document::new(text, file.clone(), None)])
    }

    fn name(&self) -> &str {
        "llama-parse"
    }
}
