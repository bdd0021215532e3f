//! Asynchronous job polling
//!
//! Mutating calls that run as cluster jobs answer with a `links` array
//! containing a job-status URL. The poller GETs that URL until a terminal
//! status shows up, sleeping between polls, with a cumulative bound so an
//! appliance that never terminates a job cannot hang the invocation.

use super::client::CdmClient;
use super::error::{CdmError, CdmResult};
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Statuses the appliance reports while a job is still making progress.
const IN_PROGRESS_STATUSES: &[&str] = &["QUEUED", "ACQUIRING", "RUNNING", "FINISHING", "TO_FINISH"];

const STATUS_SUCCEEDED: &str = "SUCCEEDED";

/// Poll cadence and cumulative bound for one job.
#[derive(Debug, Clone, Copy)]
pub struct PollOptions {
    pub poll_interval: Duration,
    pub overall_timeout: Duration,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(20),
            overall_timeout: Duration::from_secs(900),
        }
    }
}

/// Pull the job-status URL out of a mutating response's `links` array.
/// Asynchronous endpoints report it under `rel: "self"`.
pub fn job_status_url(response: &Value) -> Option<String> {
    response
        .get("links")?
        .as_array()?
        .iter()
        .find(|link| link.get("rel").and_then(Value::as_str) == Some("self"))
        .and_then(|link| link.get("href"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// GET `job_url` until a terminal status is observed.
///
/// `SUCCEEDED` returns the final response body. In-progress statuses sleep
/// `poll_interval` and retry. Any other status is a terminal failure and
/// raises [`CdmError::JobFailed`]. When the next sleep would cross
/// `overall_timeout`, polling stops with [`CdmError::JobTimeout`].
pub async fn await_completion(
    client: &CdmClient,
    job_url: &str,
    opts: PollOptions,
) -> CdmResult<Value> {
    let deadline = Instant::now() + opts.overall_timeout;

    loop {
        let body = client.get_url(job_url).await?;
        let status = body
            .get("status")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                CdmError::InvalidResponse("job status response has no `status` field".to_string())
            })?;

        tracing::debug!("Job {} reported status {}", job_url, status);

        if status == STATUS_SUCCEEDED {
            return Ok(body);
        }

        if !IN_PROGRESS_STATUSES.contains(&status) {
            return Err(CdmError::JobFailed {
                status: status.to_string(),
                body: body.to_string(),
            });
        }

        if Instant::now() + opts.poll_interval > deadline {
            return Err(CdmError::JobTimeout(opts.overall_timeout));
        }
        tokio::time::sleep(opts.poll_interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_status_url_reads_the_self_link() {
        let response = json!({
            "id": "CREATE_VMWARE_SNAPSHOT_123",
            "links": [
                {"rel": "result", "href": "https://cluster/api/v1/vmware/vm/snapshot/abc"},
                {"rel": "self", "href": "https://cluster/api/v1/vmware/vm/request/CREATE_VMWARE_SNAPSHOT_123"}
            ]
        });
        assert_eq!(
            job_status_url(&response).as_deref(),
            Some("https://cluster/api/v1/vmware/vm/request/CREATE_VMWARE_SNAPSHOT_123")
        );
    }

    #[test]
    fn job_status_url_is_none_without_links() {
        assert_eq!(job_status_url(&json!({"id": "x"})), None);
    }
}
