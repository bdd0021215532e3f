//! Rubrik cluster authentication
//!
//! Resolves connection parameters from the three supported sources and
//! builds the `Authorization` header for API calls. Precedence, highest
//! first: explicit parameters, the provider config file, and the
//! `rubrik_cdm_*` environment variables.

use super::error::{CdmError, CdmResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variables read as the lowest-precedence credential source.
pub const ENV_NODE_IP: &str = "rubrik_cdm_node_ip";
pub const ENV_USERNAME: &str = "rubrik_cdm_username";
pub const ENV_PASSWORD: &str = "rubrik_cdm_password";
pub const ENV_TOKEN: &str = "rubrik_cdm_token";

/// Default per-request timeout, matching the `timeout` parameter the
/// resource modules expose.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// One source of connection parameters. All fields are optional; merging
/// across sources decides what is actually used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credentials {
    pub node_ip: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub api_token: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl Credentials {
    /// Read the `rubrik_cdm_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            node_ip: std::env::var(ENV_NODE_IP).ok(),
            username: std::env::var(ENV_USERNAME).ok(),
            password: std::env::var(ENV_PASSWORD).ok(),
            api_token: std::env::var(ENV_TOKEN).ok(),
        }
    }

    /// Fill any missing field from a lower-precedence source. Empty
    /// strings count as missing so a blank flag never shadows a
    /// configured value.
    pub fn or(self, lower: Credentials) -> Credentials {
        Credentials {
            node_ip: non_empty(self.node_ip).or(non_empty(lower.node_ip)),
            username: non_empty(self.username).or(non_empty(lower.username)),
            password: non_empty(self.password).or(non_empty(lower.password)),
            api_token: non_empty(self.api_token).or(non_empty(lower.api_token)),
        }
    }
}

/// How requests authenticate to the cluster. An API token wins over a
/// username/password pair when both are present, matching the SDK.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthScheme {
    Basic { username: String, password: String },
    Token(String),
}

/// Resolved connection parameters for one module invocation. Immutable
/// for the invocation's duration and never persisted.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub node_ip: String,
    pub auth: AuthScheme,
    /// TLS certificate verification. On by default; turned off only by the
    /// explicit `--insecure` compatibility flag for self-signed appliances.
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl ConnectionContext {
    /// Merge the credential sources and validate the result. Fails with
    /// [`CdmError::CredentialsMissing`] unless a node address plus either
    /// a username/password pair or an API token survives the merge.
    pub fn resolve(explicit: Credentials, provider: Credentials) -> CdmResult<Self> {
        Self::resolve_with(explicit, provider, Credentials::from_env())
    }

    /// Like [`ConnectionContext::resolve`], with the environment source
    /// injected so tests do not have to mutate the process environment.
    pub fn resolve_with(
        explicit: Credentials,
        provider: Credentials,
        env: Credentials,
    ) -> CdmResult<Self> {
        let merged = explicit.or(provider).or(env);

        let node_ip = merged.node_ip.ok_or(CdmError::CredentialsMissing)?;

        let auth = match (merged.api_token, merged.username, merged.password) {
            (Some(token), _, _) => AuthScheme::Token(token),
            (None, Some(username), Some(password)) => AuthScheme::Basic { username, password },
            _ => return Err(CdmError::CredentialsMissing),
        };

        Ok(Self {
            node_ip,
            auth,
            verify_tls: true,
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_insecure_tls(mut self, accept_invalid_certs: bool) -> Self {
        self.verify_tls = !accept_invalid_certs;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Authorization` header value for the resolved auth scheme.
    pub fn authorization_header(&self) -> String {
        match &self.auth {
            AuthScheme::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                format!("Basic {}", encoded)
            }
            AuthScheme::Token(token) => format!("Bearer {}", token),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(
        node_ip: Option<&str>,
        username: Option<&str>,
        password: Option<&str>,
        api_token: Option<&str>,
    ) -> Credentials {
        Credentials {
            node_ip: node_ip.map(str::to_string),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            api_token: api_token.map(str::to_string),
        }
    }

    #[test]
    fn explicit_fields_win_over_provider_and_env() {
        let context = ConnectionContext::resolve_with(
            creds(Some("10.0.0.1"), None, None, None),
            creds(Some("10.0.0.2"), Some("provider-admin"), Some("hunter2"), None),
            creds(Some("10.0.0.3"), Some("env-admin"), Some("swordfish"), None),
        )
        .unwrap();

        assert_eq!(context.node_ip, "10.0.0.1");
        assert_eq!(
            context.auth,
            AuthScheme::Basic {
                username: "provider-admin".to_string(),
                password: "hunter2".to_string(),
            }
        );
    }

    #[test]
    fn env_fills_in_when_nothing_else_is_set() {
        let context = ConnectionContext::resolve_with(
            Credentials::default(),
            Credentials::default(),
            creds(Some("cluster.example.com"), Some("admin"), Some("pw"), None),
        )
        .unwrap();

        assert_eq!(context.node_ip, "cluster.example.com");
    }

    #[test]
    fn api_token_wins_over_basic_credentials() {
        let context = ConnectionContext::resolve_with(
            creds(Some("10.0.0.1"), Some("admin"), Some("pw"), Some("tok-123")),
            Credentials::default(),
            Credentials::default(),
        )
        .unwrap();

        assert_eq!(context.auth, AuthScheme::Token("tok-123".to_string()));
        assert_eq!(context.authorization_header(), "Bearer tok-123");
    }

    #[test]
    fn missing_node_ip_fails_fast() {
        let result = ConnectionContext::resolve_with(
            creds(None, Some("admin"), Some("pw"), None),
            Credentials::default(),
            Credentials::default(),
        );
        assert!(matches!(result, Err(CdmError::CredentialsMissing)));
    }

    #[test]
    fn username_without_password_fails_fast() {
        let result = ConnectionContext::resolve_with(
            creds(Some("10.0.0.1"), Some("admin"), None, None),
            Credentials::default(),
            Credentials::default(),
        );
        assert!(matches!(result, Err(CdmError::CredentialsMissing)));
    }

    #[test]
    fn empty_strings_count_as_missing() {
        let result = ConnectionContext::resolve_with(
            creds(Some(""), Some("admin"), Some("pw"), None),
            Credentials::default(),
            Credentials::default(),
        );
        assert!(matches!(result, Err(CdmError::CredentialsMissing)));
    }

    #[test]
    fn basic_auth_header_is_base64_of_user_colon_pass() {
        let context = ConnectionContext::resolve_with(
            creds(Some("10.0.0.1"), Some("admin"), Some("RubrikGoForward"), None),
            Credentials::default(),
            Credentials::default(),
        )
        .unwrap();

        // echo -n 'admin:RubrikGoForward' | base64
        assert_eq!(
            context.authorization_header(),
            "Basic YWRtaW46UnVicmlrR29Gb3J3YXJk"
        );
    }
}
