//! Job status queries
//!
//! Checks an asynchronous job by its job-status URL: a single probe, or a
//! bounded poll to completion. Reading a job's status never changes
//! cluster state.

use super::ModuleOutcome;
use crate::cdm::client::CdmClient;
use crate::cdm::error::{CdmError, CdmResult};
use crate::cdm::http::ApiVersion;
use crate::cdm::jobs::{self, PollOptions};
use std::time::Duration;

#[derive(Debug, Clone, clap::Args)]
pub struct JobStatusParams {
    /// Job-status URL returned by an asynchronous API call. Absolute
    /// URLs are taken as-is; a bare path is resolved against the
    /// cluster's v1 API root.
    #[arg(long)]
    pub url: String,

    /// Poll until the job reaches a terminal status instead of probing once
    #[arg(long)]
    pub wait: bool,

    /// Seconds between polls
    #[arg(long, default_value_t = 20)]
    pub poll_interval: u64,

    /// Overall polling bound in seconds
    #[arg(long, default_value_t = 900)]
    pub poll_timeout: u64,
}

pub async fn run(client: &CdmClient, params: &JobStatusParams) -> CdmResult<ModuleOutcome> {
    let job_url = if params.url.starts_with("http") {
        url::Url::parse(&params.url)
            .map_err(|e| CdmError::InvalidParameter(format!("'{}' is not a valid job-status URL: {}", params.url, e)))?
            .to_string()
    } else {
        client.api_url(ApiVersion::V1, &params.url)
    };

    let response = if params.wait {
        let opts = PollOptions {
            poll_interval: Duration::from_secs(params.poll_interval),
            overall_timeout: Duration::from_secs(params.poll_timeout),
        };
        jobs::await_completion(client, &job_url, opts).await?
    } else {
        client.get_url(&job_url).await?
    };

    Ok(ModuleOutcome {
        changed: false,
        response,
        job_status_url: Some(job_url),
    })
}
