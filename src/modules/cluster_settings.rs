//! Cluster settings
//!
//! Converges cluster-wide settings: DNS nameservers, NTP servers, and the
//! cluster timezone. Each operation compares the currently configured
//! value set before touching anything, so re-running a playbook against a
//! configured cluster is a no-op.

use super::ModuleOutcome;
use crate::cdm::client::CdmClient;
use crate::cdm::error::{CdmError, CdmResult};
use crate::cdm::http::ApiVersion;
use serde_json::{json, Value};

#[derive(Debug, Clone, clap::Args)]
pub struct DnsServersParams {
    /// DNS nameserver IPs the cluster should use
    #[arg(long = "server", required = true)]
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct NtpServersParams {
    /// NTP server addresses the cluster should sync against
    #[arg(long = "server", required = true)]
    pub servers: Vec<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct TimezoneParams {
    /// IANA timezone name, e.g. America/Chicago
    #[arg(long)]
    pub timezone: String,
}

fn sorted(servers: &[String]) -> Vec<String> {
    let mut sorted = servers.to_vec();
    sorted.sort();
    sorted
}

/// The DNS endpoint answers with a plain JSON array of server IPs.
fn string_array(body: &Value, endpoint: &str) -> CdmResult<Vec<String>> {
    body.as_array()
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .ok_or_else(|| {
            CdmError::InvalidResponse(format!("{} did not return an array of servers", endpoint))
        })
}

pub async fn run_dns(client: &CdmClient, params: &DnsServersParams) -> CdmResult<ModuleOutcome> {
    let current = client
        .get(ApiVersion::Internal, "/cluster/me/dns_nameserver")
        .await?;
    let current_servers = string_array(&current, "/cluster/me/dns_nameserver")?;

    if sorted(&current_servers) == sorted(&params.servers) {
        return Ok(ModuleOutcome::unchanged(
            "No change required. The Rubrik cluster is already configured with the provided DNS servers.",
        ));
    }

    let response = client
        .post(
            ApiVersion::Internal,
            "/cluster/me/dns_nameserver",
            &json!(params.servers),
        )
        .await?;
    Ok(ModuleOutcome::changed(response))
}

pub async fn run_ntp(client: &CdmClient, params: &NtpServersParams) -> CdmResult<ModuleOutcome> {
    // Unlike DNS, the NTP endpoint wraps its servers in a data envelope.
    let current: Vec<String> = client
        .get_list(ApiVersion::Internal, "/cluster/me/ntp_server")
        .await?;

    if sorted(&current) == sorted(&params.servers) {
        return Ok(ModuleOutcome::unchanged(
            "No change required. The Rubrik cluster is already configured with the provided NTP servers.",
        ));
    }

    let response = client
        .post(
            ApiVersion::Internal,
            "/cluster/me/ntp_server",
            &json!(params.servers),
        )
        .await?;
    Ok(ModuleOutcome::changed(response))
}

pub async fn run_timezone(client: &CdmClient, params: &TimezoneParams) -> CdmResult<ModuleOutcome> {
    let cluster = client.get(ApiVersion::V1, "/cluster/me").await?;
    let current = cluster
        .pointer("/timezone/timezone")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if current == params.timezone {
        return Ok(ModuleOutcome::unchanged(format!(
            "No change required. The Rubrik cluster is already configured with '{}' as its timezone.",
            params.timezone
        )));
    }

    let body = json!({ "timezone": { "timezone": params.timezone } });
    let response = client.patch(ApiVersion::V1, "/cluster/me", &body).await?;
    Ok(ModuleOutcome::changed(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_comparison_ignores_order() {
        let a = vec!["8.8.8.8".to_string(), "1.1.1.1".to_string()];
        let b = vec!["1.1.1.1".to_string(), "8.8.8.8".to_string()];
        assert_eq!(sorted(&a), sorted(&b));
    }

    #[test]
    fn string_array_rejects_non_arrays() {
        let result = string_array(&json!({"data": []}), "/cluster/me/dns_nameserver");
        assert!(matches!(result, Err(CdmError::InvalidResponse(_))));
    }
}
