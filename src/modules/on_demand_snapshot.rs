//! On-demand snapshots
//!
//! Takes an on-demand snapshot of a vSphere VM, tagged with either the
//! VM's currently effective SLA domain or an explicitly named one. Always
//! a mutation: the cluster queues a snapshot job and answers with its
//! job-status URL.

use super::common::{lookup_sla_domain, lookup_vm};
use super::ModuleOutcome;
use crate::cdm::client::CdmClient;
use crate::cdm::error::{CdmError, CdmResult};
use crate::cdm::http::ApiVersion;
use crate::cdm::jobs::{self, PollOptions};
use serde_json::json;

#[derive(Debug, Clone, clap::Args)]
pub struct OnDemandSnapshotParams {
    /// Name of the vSphere VM to snapshot
    #[arg(long = "vm", alias = "vsphere-vm-name")]
    pub vsphere_vm_name: String,

    /// SLA domain to tag the snapshot with; defaults to the VM's
    /// currently effective SLA domain
    #[arg(long = "sla-domain")]
    pub sla_domain_name: Option<String>,

    /// Block until the snapshot job reaches a terminal status
    #[arg(long)]
    pub wait: bool,
}

pub async fn run(client: &CdmClient, params: &OnDemandSnapshotParams) -> CdmResult<ModuleOutcome> {
    let vm = lookup_vm(client, &params.vsphere_vm_name).await?;

    let sla_id = match &params.sla_domain_name {
        Some(name) => lookup_sla_domain(client, name).await?.id,
        None => vm.effective_sla_domain_id.clone().ok_or_else(|| {
            CdmError::ResourceNotFound(format!(
                "The vSphere VM '{}' has no effective SLA Domain; name one explicitly.",
                params.vsphere_vm_name
            ))
        })?,
    };

    let body = json!({ "slaId": sla_id });
    let response = client
        .post(ApiVersion::V1, &format!("/vmware/vm/{}/snapshot", vm.id), &body)
        .await?;

    let job_url = jobs::job_status_url(&response);

    if params.wait {
        let url = job_url.clone().ok_or_else(|| {
            CdmError::InvalidResponse(
                "snapshot response carries no job-status link to wait on".to_string(),
            )
        })?;
        let final_status = jobs::await_completion(client, &url, PollOptions::default()).await?;
        return Ok(ModuleOutcome::changed(final_status).with_job_url(job_url));
    }

    Ok(ModuleOutcome::changed(response).with_job_url(job_url))
}
