//! HTTP job store implementation

use crate::config::HttpConfig;
use crate::errors::HttpError;
use crate::types::HttpMethod;
use async_trait::async_trait;
use jobsync_config::JobSyncConfig;
use jobsync_core::{JobDefinition, JobStore, StoreResult};
use reqwest::{Client, RequestBuilder};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

/// Remote job store speaking the v2 jobs API
///
/// The underlying `reqwest` client is built once and reused for every call.
#[derive(Debug, Clone)]
pub struct HttpJobStore {
    client: Client,
    base_url: String,
    token: String,
}

impl HttpJobStore {
    /// Create a store for the API at `base_url`
    pub fn new(
        base_url: &str,
        token: impl Into<String>,
        config: HttpConfig,
    ) -> Result<Self, HttpError> {
        url::Url::parse(base_url).map_err(|e| HttpError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        debug!(
            "Creating HTTP job store for {} with {}s timeout",
            base_url,
            config.timeout.as_secs()
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .danger_accept_invalid_certs(!config.verify_ssl)
            .redirect(reqwest::redirect::Policy::limited(
                config.max_redirects as usize,
            ))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    /// Create a store from loaded configuration
    ///
    /// Fails when no API token is configured.
    pub fn from_config(config: &JobSyncConfig) -> Result<Self, HttpError> {
        let token = config
            .api
            .token()
            .ok_or_else(|| HttpError::ConfigError("no API token configured".to_string()))?;

        Self::new(&config.api.base_url, token, config.http.clone().into())
    }

    fn jobs_url(&self, account_scope_id: u64) -> String {
        format!("{}/api/v2/accounts/{}/jobs/", self.base_url, account_scope_id)
    }

    fn job_url(&self, account_scope_id: u64, id: u64) -> String {
        format!(
            "{}/api/v2/accounts/{}/jobs/{}",
            self.base_url, account_scope_id, id
        )
    }

    fn request(&self, method: HttpMethod, url: &str) -> RequestBuilder {
        debug!("Building {} request to {}", method, url);
        self.client
            .request(method.into(), url)
            .header("Accept", "application/json")
            .header("Authorization", format!("Token {}", self.token))
    }

    /// List every job in an account, following offset pagination
    pub async fn list_jobs(&self, account_scope_id: u64) -> Result<Vec<JobDefinition>, HttpError> {
        info!("Listing jobs for account {}", account_scope_id);

        let url = self.jobs_url(account_scope_id);
        let mut jobs = Vec::new();

        loop {
            let offset = jobs.len();
            let response = send(
                self.request(HttpMethod::Get, &url)
                    .query(&[("offset", offset)]),
            )
            .await?;

            let page = match data(response)? {
                JsonValue::Array(page) => page,
                other => {
                    return Err(HttpError::UnexpectedResponse(format!(
                        "expected a list of jobs, got {}",
                        other
                    )))
                }
            };

            if page.is_empty() {
                break;
            }

            debug!("Fetched {} job(s) at offset {}", page.len(), offset);
            for job in page {
                jobs.push(serde_json::from_value(job)?);
            }
        }

        info!("Found {} job(s) in account {}", jobs.len(), account_scope_id);
        Ok(jobs)
    }

    /// Create a job and return its new identifier
    pub async fn create_job(
        &self,
        account_scope_id: u64,
        definition: &JobDefinition,
    ) -> Result<u64, HttpError> {
        let mut payload = serde_json::to_value(definition)?;
        // New jobs must carry an explicit null id
        if let Some(object) = payload.as_object_mut() {
            object.insert("id".to_string(), JsonValue::Null);
        }
        debug!("Create payload: {}", payload);

        let response = send(
            self.request(HttpMethod::Post, &self.jobs_url(account_scope_id))
                .json(&payload),
        )
        .await?;

        data(response)?
            .get("id")
            .and_then(JsonValue::as_u64)
            .ok_or_else(|| {
                HttpError::UnexpectedResponse("created job has no numeric id".to_string())
            })
    }

    /// Replace the job `id` with `definition`
    pub async fn update_job(
        &self,
        account_scope_id: u64,
        id: u64,
        definition: &JobDefinition,
    ) -> Result<(), HttpError> {
        let payload = serde_json::to_value(definition)?;
        debug!("Update payload for job {}: {}", id, payload);

        send(
            self.request(HttpMethod::Post, &self.job_url(account_scope_id, id))
                .json(&payload),
        )
        .await?;
        Ok(())
    }

    pub async fn delete_job(&self, account_scope_id: u64, id: u64) -> Result<(), HttpError> {
        send(self.request(HttpMethod::Delete, &self.job_url(account_scope_id, id))).await?;
        Ok(())
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn list(&self, account_scope_id: u64) -> StoreResult<Vec<JobDefinition>> {
        Ok(self.list_jobs(account_scope_id).await?)
    }

    async fn create(&self, account_scope_id: u64, definition: &JobDefinition) -> StoreResult<u64> {
        Ok(self.create_job(account_scope_id, definition).await?)
    }

    async fn update(
        &self,
        account_scope_id: u64,
        id: u64,
        definition: &JobDefinition,
    ) -> StoreResult<()> {
        Ok(self.update_job(account_scope_id, id, definition).await?)
    }

    async fn delete(&self, account_scope_id: u64, id: u64) -> StoreResult<()> {
        Ok(self.delete_job(account_scope_id, id).await?)
    }
}

/// Send a request and decode its JSON body, failing on non-success status
async fn send(request: RequestBuilder) -> Result<JsonValue, HttpError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    debug!("HTTP response received: {}", status.as_u16());

    if !status.is_success() {
        return Err(HttpError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if body.trim().is_empty() {
        return Ok(JsonValue::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Unwrap the `{"data": ...}` envelope
fn data(response: JsonValue) -> Result<JsonValue, HttpError> {
    match response {
        JsonValue::Object(mut object) => object
            .remove("data")
            .ok_or_else(|| HttpError::UnexpectedResponse("response has no `data` field".to_string())),
        other => Err(HttpError::UnexpectedResponse(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}
