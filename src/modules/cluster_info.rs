//! Cluster information
//!
//! Read-only cluster facts: identity, software version, timezone, and
//! node count. Never a change.

use super::ModuleOutcome;
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, clap::Args)]
pub struct ClusterInfoParams {}

/// Node entry from `GET internal /cluster/me/node`; only counted here.
#[derive(Debug, Clone, Deserialize)]
#[allow(dead_code)]
pub struct NodeSummary {
    pub id: String,
}

pub async fn run(client: &CdmClient, _params: &ClusterInfoParams) -> CdmResult<ModuleOutcome> {
    let cluster = client.get(ApiVersion::V1, "/cluster/me").await?;
    let version = client.get(ApiVersion::V1, "/cluster/me/version").await?;
    let nodes: Vec<NodeSummary> = client
        .get_list(ApiVersion::Internal, "/cluster/me/node")
        .await?;

    let response = json!({
        "id": cluster.get("id").cloned().unwrap_or(Value::Null),
        "name": cluster.get("name").cloned().unwrap_or(Value::Null),
        "version": version.get("version").cloned().unwrap_or(Value::Null),
        "timezone": cluster.pointer("/timezone/timezone").cloned().unwrap_or(Value::Null),
        "geolocation": cluster.pointer("/geolocation/address").cloned().unwrap_or(Value::Null),
        "node_count": nodes.len(),
    });

    Ok(ModuleOutcome {
        changed: false,
        response,
        job_status_url: None,
    })
}
