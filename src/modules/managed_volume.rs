//! Managed volume snapshots
//!
//! Flips a managed volume between its writable (begin) and read-only
//! snapshot (end) states for application-driven backups. Idempotent on
//! the volume's current writability.

use super::common::lookup_sla_domain;
use super::{find_exact, ModuleOutcome};
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;
use serde_json::{json, Value};

/// Managed volume summary from `GET internal /managed_volume`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedVolumeSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_writable: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ManagedVolumeAction {
    /// Open the volume for writes
    Begin,
    /// Close the volume and snapshot what was written
    End,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ManagedVolumeParams {
    /// Name of the managed volume
    #[arg(long)]
    pub name: String,

    /// Whether to begin or end the snapshot window
    #[arg(long, value_enum)]
    pub action: ManagedVolumeAction,

    /// SLA domain for retention of the closing snapshot; defaults to the
    /// SLA already assigned to the volume
    #[arg(long = "sla-domain")]
    pub sla_domain_name: Option<String>,
}

async fn lookup_managed_volume(
    client: &CdmClient,
    name: &str,
) -> CdmResult<ManagedVolumeSummary> {
    let endpoint = format!("/managed_volume?name={}", urlencoding::encode(name));
    let volumes: Vec<ManagedVolumeSummary> =
        client.get_list(ApiVersion::Internal, &endpoint).await?;
    find_exact(volumes, |mv| mv.name == name).require_one("Managed Volume", name)
}

pub async fn run(client: &CdmClient, params: &ManagedVolumeParams) -> CdmResult<ModuleOutcome> {
    let volume = lookup_managed_volume(client, &params.name).await?;

    match params.action {
        ManagedVolumeAction::Begin => {
            if volume.is_writable {
                return Ok(ModuleOutcome::unchanged(format!(
                    "No change required. The Managed Volume '{}' is already assigned in a writable state.",
                    params.name
                )));
            }
            let response = client
                .post(
                    ApiVersion::Internal,
                    &format!("/managed_volume/{}/begin_snapshot", volume.id),
                    &Value::Null,
                )
                .await?;
            Ok(ModuleOutcome::changed(response))
        }
        ManagedVolumeAction::End => {
            if !volume.is_writable {
                return Ok(ModuleOutcome::unchanged(format!(
                    "No change required. The Managed Volume '{}' is already assigned in a read-only state.",
                    params.name
                )));
            }
            let body = match &params.sla_domain_name {
                Some(sla_name) => {
                    let sla = lookup_sla_domain(client, sla_name).await?;
                    json!({ "retentionConfig": { "slaId": sla.id } })
                }
                None => json!({}),
            };
            let response = client
                .post(
                    ApiVersion::Internal,
                    &format!("/managed_volume/{}/end_snapshot", volume.id),
                    &body,
                )
                .await?;
            Ok(ModuleOutcome::changed(response))
        }
    }
}
