// Animation-renderer client
//
// The renderer is the least reliable of the three upstreams and is often
// not deployed at all. With no endpoint configured the client runs in
// simulated mode: every request yields a queued job instead of an error,
// so the rest of the lesson flow keeps working.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use super::{check_status, transport_error};
use crate::config::RendererConfig;
use crate::error::GatewayError;

const PROVIDER_NAME: &str = "renderer";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderStatus {
    Queued,
    Running,
    Done,
    Failed,
}

/// A requested animation render. Terminal states (done/failed) are final —
/// the gateway never mutates a job after handing it back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderJob {
    pub job_id: String,
    pub topic: String,
    pub status: RenderStatus,
    pub result_url: Option<String>,
    pub simulated: bool,
}

pub struct RendererClient {
    client: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl RendererClient {
    pub fn new(config: &RendererConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config
                .base_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            api_key: config.api_key.clone(),
        })
    }

    /// Request a render. Never fails in simulated mode.
    pub async fn request_render(&self, topic: &str) -> Result<RenderJob, GatewayError> {
        let Some(base_url) = &self.base_url else {
            tracing::debug!(topic, "renderer not configured, returning simulated job");
            return Ok(RenderJob {
                job_id: Uuid::new_v4().to_string(),
                topic: topic.to_string(),
                status: RenderStatus::Queued,
                result_url: None,
                simulated: true,
            });
        };

        let url = format!("{base_url}/v1/renders");
        let mut request = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&RenderRequest { topic });
        if let Some(key) = &self.api_key {
            request = request.header("x-api-key", key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        let secret = self.api_key.as_deref().unwrap_or_default();
        let response = check_status(PROVIDER_NAME, response, secret).await?;

        let rendered: RenderResponse = response
            .json()
            .await
            .map_err(|e| transport_error(PROVIDER_NAME, e))?;

        Ok(map_response(topic, rendered))
    }
}

/// Map the provider's immediate response onto a job: a result URL means the
/// render already finished; a bare job id means it is in flight.
fn map_response(topic: &str, response: RenderResponse) -> RenderJob {
    let status = if response.result_url.is_some() {
        RenderStatus::Done
    } else if response.status.as_deref() == Some("failed") {
        RenderStatus::Failed
    } else if response.job_id.is_some() {
        RenderStatus::Running
    } else {
        RenderStatus::Queued
    };

    RenderJob {
        job_id: response
            .job_id
            .unwrap_or_else(|| Uuid::new_v4().to_string()),
        topic: topic.to_string(),
        status,
        result_url: response.result_url,
        simulated: false,
    }
}

// Provider wire types

#[derive(Debug, Serialize)]
struct RenderRequest<'a> {
    topic: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct RenderResponse {
    #[serde(default)]
    job_id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    result_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_renderer_simulates() {
        let client = RendererClient::new(&RendererConfig::default()).unwrap();
        let job = client.request_render("fractions").await.unwrap();
        assert_eq!(job.status, RenderStatus::Queued);
        assert!(job.simulated);
        assert!(job.result_url.is_none());
        assert!(!job.job_id.is_empty());
        assert_eq!(job.topic, "fractions");
    }

    #[tokio::test]
    async fn test_simulated_job_ids_are_unique() {
        let client = RendererClient::new(&RendererConfig::default()).unwrap();
        let a = client.request_render("t").await.unwrap();
        let b = client.request_render("t").await.unwrap();
        assert_ne!(a.job_id, b.job_id);
    }

    #[test]
    fn test_map_result_url_means_done() {
        let job = map_response(
            "t",
            RenderResponse {
                job_id: Some("job-1".to_string()),
                status: None,
                result_url: Some("https://cdn.example.com/r.mp4".to_string()),
            },
        );
        assert_eq!(job.status, RenderStatus::Done);
        assert_eq!(job.job_id, "job-1");
        assert!(!job.simulated);
    }

    #[test]
    fn test_map_job_id_without_result_means_running() {
        let job = map_response(
            "t",
            RenderResponse {
                job_id: Some("job-2".to_string()),
                status: None,
                result_url: None,
            },
        );
        assert_eq!(job.status, RenderStatus::Running);
    }

    #[test]
    fn test_map_failed_status() {
        let job = map_response(
            "t",
            RenderResponse {
                job_id: Some("job-3".to_string()),
                status: Some("failed".to_string()),
                result_url: None,
            },
        );
        assert_eq!(job.status, RenderStatus::Failed);
    }

    #[test]
    fn test_map_empty_response_means_queued() {
        let job = map_response("t", RenderResponse::default());
        assert_eq!(job.status, RenderStatus::Queued);
        assert!(!job.job_id.is_empty());
    }

    #[test]
    fn test_render_job_serializes_camel_case() {
        let job = RenderJob {
            job_id: "j1".to_string(),
            topic: "algebra".to_string(),
            status: RenderStatus::Queued,
            result_url: None,
            simulated: true,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["jobId"], "j1");
        assert_eq!(json["status"], "queued");
        assert_eq!(json["resultUrl"], serde_json::Value::Null);
        assert_eq!(json["simulated"], true);
    }
}
