//! Rubrik CDM Client
//!
//! Main client for interacting with the cluster REST API, combining the
//! resolved connection context and the HTTP plumbing.

use super::auth::ConnectionContext;
use super::error::{CdmError, CdmResult};
use super::http::{ApiVersion, CdmHttpClient, Method};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

/// Standard Rubrik list envelope. Collection endpoints wrap their results
/// in a `data` array with a `total` count.
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
}

/// Main Rubrik CDM client
#[derive(Clone)]
pub struct CdmClient {
    pub context: ConnectionContext,
    http: CdmHttpClient,
    base_url: String,
}

impl CdmClient {
    /// Create a client for `https://{node_ip}/api`.
    pub fn new(context: ConnectionContext) -> CdmResult<Self> {
        let base_url = format!("https://{}/api", context.node_ip);
        Self::with_base_url(context, base_url)
    }

    /// Create a client against an explicit base URL. Used by tests and by
    /// lab clusters fronted by a plain-HTTP proxy.
    pub fn with_base_url(context: ConnectionContext, base_url: impl Into<String>) -> CdmResult<Self> {
        let http = CdmHttpClient::new(&context)?;
        Ok(Self {
            context,
            http,
            base_url: base_url.into(),
        })
    }

    /// Build a full API URL from an `(api_version, endpoint)` pair. The
    /// endpoint must carry its leading slash, e.g. `/cluster/me`.
    pub fn api_url(&self, version: ApiVersion, endpoint: &str) -> String {
        format!("{}/{}{}", self.base_url, version, endpoint)
    }

    /// GET an endpoint and return the parsed JSON body verbatim.
    pub async fn get(&self, version: ApiVersion, endpoint: &str) -> CdmResult<Value> {
        self.http
            .request(&self.context, Method::Get, &self.api_url(version, endpoint), None)
            .await
    }

    /// POST a JSON body to an endpoint.
    pub async fn post(&self, version: ApiVersion, endpoint: &str, body: &Value) -> CdmResult<Value> {
        self.http
            .request(
                &self.context,
                Method::Post,
                &self.api_url(version, endpoint),
                Some(body),
            )
            .await
    }

    /// PATCH a JSON body onto an endpoint.
    pub async fn patch(&self, version: ApiVersion, endpoint: &str, body: &Value) -> CdmResult<Value> {
        self.http
            .request(
                &self.context,
                Method::Patch,
                &self.api_url(version, endpoint),
                Some(body),
            )
            .await
    }

    /// DELETE an endpoint.
    pub async fn delete(&self, version: ApiVersion, endpoint: &str) -> CdmResult<Value> {
        self.http
            .request(
                &self.context,
                Method::Delete,
                &self.api_url(version, endpoint),
                None,
            )
            .await
    }

    /// GET an absolute URL, e.g. a job-status link returned by an
    /// asynchronous mutating call.
    pub async fn get_url(&self, url: &str) -> CdmResult<Value> {
        self.http
            .request(&self.context, Method::Get, url, None)
            .await
    }

    /// GET a collection endpoint and deserialize its `data` array into
    /// typed summaries. Deserialization happens once, here at the HTTP
    /// boundary; modules never index into raw JSON for lookups.
    pub async fn get_list<T: DeserializeOwned>(
        &self,
        version: ApiVersion,
        endpoint: &str,
    ) -> CdmResult<Vec<T>> {
        let body = self.get(version, endpoint).await?;
        let envelope: ListEnvelope<T> = serde_json::from_value(body)
            .map_err(|e| CdmError::InvalidResponse(format!("{} for {}", e, endpoint)))?;
        Ok(envelope.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdm::auth::{Credentials, ConnectionContext};

    fn test_context() -> ConnectionContext {
        ConnectionContext::resolve_with(
            Credentials {
                node_ip: Some("10.255.1.10".to_string()),
                username: Some("admin".to_string()),
                password: Some("pw".to_string()),
                api_token: None,
            },
            Credentials::default(),
            Credentials::default(),
        )
        .unwrap()
    }

    #[test]
    fn api_url_templates_version_and_endpoint() {
        let client = CdmClient::new(test_context()).unwrap();
        assert_eq!(
            client.api_url(ApiVersion::V1, "/cluster/me"),
            "https://10.255.1.10/api/v1/cluster/me"
        );
        assert_eq!(
            client.api_url(ApiVersion::Internal, "/managed_volume?name=mv1"),
            "https://10.255.1.10/api/internal/managed_volume?name=mv1"
        );
    }

    #[test]
    fn list_envelope_tolerates_missing_total() {
        let envelope: ListEnvelope<String> =
            serde_json::from_str(r#"{"data": ["a", "b"]}"#).unwrap();
        assert_eq!(envelope.data.len(), 2);
        assert_eq!(envelope.total, None);
    }
}
