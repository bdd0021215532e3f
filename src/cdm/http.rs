//! HTTP utilities for Rubrik REST API calls

use super::auth::ConnectionContext;
use super::error::{CdmError, CdmResult};
use reqwest::header;
use serde_json::Value;
use std::fmt;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        format!(
            "{}... [truncated, {} bytes total]",
            &body[..MAX_LOG_BODY_LENGTH],
            body.len()
        )
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// Rubrik REST API version segments. Everything reachable under
/// `https://{node}/api/` is one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
    Internal,
}

impl ApiVersion {
    pub fn as_segment(self) -> &'static str {
        match self {
            ApiVersion::V1 => "v1",
            ApiVersion::V2 => "v2",
            ApiVersion::Internal => "internal",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_segment())
    }
}

/// HTTP verb for a single API request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

/// HTTP client wrapper for Rubrik API calls
#[derive(Clone)]
pub struct CdmHttpClient {
    client: reqwest::Client,
}

impl CdmHttpClient {
    /// Build a client honoring the context's TLS and timeout settings.
    pub fn new(context: &ConnectionContext) -> CdmResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("rbkctl/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!context.verify_tls)
            .timeout(context.timeout)
            .build()
            .map_err(|e| CdmError::ConnectionFailed(e.to_string()))?;

        Ok(Self { client })
    }

    /// Perform one request and decode the JSON body. The per-request
    /// timeout comes from the connection context at client build time.
    ///
    /// Non-2xx responses become [`CdmError::ApiCall`] carrying the raw
    /// response text; transport failures become
    /// [`CdmError::ConnectionFailed`] carrying no cluster data. An empty
    /// 2xx body decodes to JSON null.
    pub async fn request(
        &self,
        context: &ConnectionContext,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> CdmResult<Value> {
        tracing::debug!("{:?} {}", method, url);

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        }
        .header(header::AUTHORIZATION, context.authorization_header());

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Transport failure for {}: {}", url, e);
            CdmError::ConnectionFailed(e.to_string())
        })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CdmError::ConnectionFailed(e.to_string()))?;

        if !status.is_success() {
            // Only log a sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&text));
            return Err(CdmError::ApiCall {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| CdmError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(&body);
        assert!(sanitized.contains("truncated"));
        assert!(sanitized.len() < body.len());
    }

    #[test]
    fn api_version_segments() {
        assert_eq!(ApiVersion::V1.as_segment(), "v1");
        assert_eq!(ApiVersion::V2.as_segment(), "v2");
        assert_eq!(ApiVersion::Internal.as_segment(), "internal");
    }
}
