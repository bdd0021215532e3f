//! SLA domain assignment
//!
//! Assigns an SLA domain to a vSphere VM. Idempotent on the VM's
//! `configuredSlaDomainId` already pointing at the requested domain.

use super::common::{lookup_sla_domain, lookup_vm};
use super::ModuleOutcome;
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde_json::json;

#[derive(Debug, Clone, clap::Args)]
pub struct AssignSlaParams {
    /// Name of the SLA domain to assign
    #[arg(long = "sla-domain", alias = "sla")]
    pub sla_domain_name: String,

    /// Name of the vSphere VM to protect
    #[arg(long = "vm", alias = "vsphere-vm-name")]
    pub vsphere_vm_name: String,
}

pub async fn run(client: &CdmClient, params: &AssignSlaParams) -> CdmResult<ModuleOutcome> {
    let vm = lookup_vm(client, &params.vsphere_vm_name).await?;
    let proposed = lookup_sla_domain(client, &params.sla_domain_name).await?;

    if vm.configured_sla_domain_id.as_deref() == Some(proposed.id.as_str()) {
        return Ok(ModuleOutcome::unchanged(format!(
            "No change required. The vSphere VM '{}' is already configured with the '{}' SLA Domain.",
            params.vsphere_vm_name, params.sla_domain_name
        )));
    }

    let body = json!({ "configuredSlaDomainId": proposed.id });
    let response = client
        .patch(ApiVersion::V1, &format!("/vmware/vm/{}", vm.id), &body)
        .await?;

    Ok(ModuleOutcome::changed(response))
}
