//! Physical host registration
//!
//! Registers a physical host with the cluster (so filesets can protect
//! it) or deletes an existing registration. Idempotent on the host's
//! presence in the `GET v1 /host` listing.

use super::{find_exact, Match, ModuleOutcome};
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;
use serde_json::json;

/// Registered host summary from `GET v1 /host`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSummary {
    pub id: String,
    pub hostname: String,
    #[serde(default)]
    pub operating_system_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum HostAction {
    Add,
    Delete,
}

#[derive(Debug, Clone, clap::Args)]
pub struct PhysicalHostParams {
    /// DNS hostname or IP address of the physical host
    #[arg(long)]
    pub hostname: String,

    /// Whether to add or delete the host registration
    #[arg(long, value_enum)]
    pub action: HostAction,
}

pub async fn run(client: &CdmClient, params: &PhysicalHostParams) -> CdmResult<ModuleOutcome> {
    let hosts: Vec<HostSummary> = client.get_list(ApiVersion::V1, "/host").await?;
    let current = find_exact(hosts, |host| host.hostname == params.hostname);

    match params.action {
        HostAction::Add => match current {
            Match::None => {
                let body = json!({
                    "hostname": params.hostname,
                    "hasAgent": true,
                });
                let response = client.post(ApiVersion::V1, "/host", &body).await?;
                Ok(ModuleOutcome::changed(response))
            }
            // One or more registrations with this hostname already exist.
            Match::One(_) | Match::Many(_) => Ok(ModuleOutcome::unchanged(format!(
                "No change required. The host '{}' is already connected to the Rubrik cluster.",
                params.hostname
            ))),
        },
        HostAction::Delete => match current {
            Match::None => Ok(ModuleOutcome::unchanged(format!(
                "No change required. The host '{}' is not present on the Rubrik cluster.",
                params.hostname
            ))),
            found => {
                let host = found.require_one("host", &params.hostname)?;
                client
                    .delete(ApiVersion::V1, &format!("/host/{}", host.id))
                    .await?;
                Ok(ModuleOutcome::changed_message(format!(
                    "The host '{}' has successfully been deleted from the Rubrik cluster.",
                    params.hostname
                )))
            }
        },
    }
}
