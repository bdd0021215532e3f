//! Error taxonomy for Rubrik CDM API interactions.
//!
//! Every variant is fatal for the invoking module run: nothing in this
//! crate retries a failed request. The messages follow the wording the
//! cluster tooling has always surfaced to operators.

use std::time::Duration;
use thiserror::Error;

/// Errors produced by the CDM client and the resource modules.
#[derive(Error, Debug)]
pub enum CdmError {
    /// No usable combination of node address and auth material after
    /// merging all credential sources.
    #[error("The Rubrik login credentials are missing. Verify the correct environment variables are present or provide them through the CLI or the provider config file.")]
    CredentialsMissing,

    /// Network unreachable, TLS failure, or per-request timeout. Carries
    /// only transport detail, never cluster data.
    #[error("Unable to establish a connection to the Rubrik cluster: {0}")]
    ConnectionFailed(String),

    /// The cluster answered with a non-2xx status. The raw response body
    /// is surfaced verbatim as the failure message.
    #[error("The Rubrik cluster returned a {status} error: {body}")]
    ApiCall { status: u16, body: String },

    /// A named lookup matched nothing.
    #[error("{0}")]
    ResourceNotFound(String),

    /// A named lookup matched more than one object and no supplied filter
    /// disambiguates.
    #[error("{0}")]
    AmbiguousMatch(String),

    /// A polled job reached a terminal non-success status.
    #[error("The Rubrik job finished with status {status}: {body}")]
    JobFailed { status: String, body: String },

    /// The polling bound expired before the job reached a terminal status.
    #[error("The Rubrik job did not reach a terminal status within {0:?}")]
    JobTimeout(Duration),

    /// The response body was not the JSON shape the endpoint documents.
    #[error("Unexpected response from the Rubrik cluster: {0}")]
    InvalidResponse(String),

    /// A module parameter failed validation before any request was issued.
    #[error("{0}")]
    InvalidParameter(String),
}

pub type CdmResult<T> = Result<T, CdmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_call_error_carries_raw_body() {
        let err = CdmError::ApiCall {
            status: 422,
            body: r#"{"message":"Host already registered"}"#.to_string(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("422"));
        assert!(rendered.contains("Host already registered"));
    }

    #[test]
    fn job_failed_error_names_the_status() {
        let err = CdmError::JobFailed {
            status: "FAILED".to_string(),
            body: "{}".to_string(),
        };
        assert!(err.to_string().contains("FAILED"));
    }
}
