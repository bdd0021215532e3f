//! Shared lookups for vSphere-backed modules
//!
//! Several modules resolve the same objects by name before acting: vSphere
//! VMs, SLA domains, ESXi hosts. The scans live here so every call site
//! applies the same filters and failure messages.

use super::{find_exact, Match};
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;

/// vSphere VM summary from `GET v1 /vmware/vm`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub configured_sla_domain_id: Option<String>,
    #[serde(default)]
    pub effective_sla_domain_id: Option<String>,
}

/// SLA domain summary from `GET v1 /sla_domain`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaDomainSummary {
    pub id: String,
    pub name: String,
}

/// ESXi host summary from `GET v1 /vmware/host`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VsphereHostSummary {
    pub id: String,
    pub name: String,
}

/// Resolve a vSphere VM by exact name. The query pre-filters on the
/// cluster side; the scan confirms the exact match since the API matches
/// substrings.
pub async fn lookup_vm(client: &CdmClient, name: &str) -> CdmResult<VmSummary> {
    let endpoint = format!(
        "/vmware/vm?primary_cluster_id=local&is_relic=false&name={}",
        urlencoding::encode(name)
    );
    let vms: Vec<VmSummary> = client.get_list(ApiVersion::V1, &endpoint).await?;
    find_exact(vms, |vm| vm.name == name).require_one("vSphere VM", name)
}

/// Resolve an SLA domain by exact name.
pub async fn lookup_sla_domain(client: &CdmClient, name: &str) -> CdmResult<SlaDomainSummary> {
    let endpoint = format!(
        "/sla_domain?primary_cluster_id=local&name={}",
        urlencoding::encode(name)
    );
    let domains: Vec<SlaDomainSummary> = client.get_list(ApiVersion::V1, &endpoint).await?;
    find_exact(domains, |sla| sla.name == name).require_one("SLA Domain", name)
}

/// Resolve an ESXi host by exact name, for live mounts targeting a
/// specific host.
pub async fn lookup_vsphere_host(client: &CdmClient, name: &str) -> CdmResult<VsphereHostSummary> {
    let hosts: Vec<VsphereHostSummary> = client.get_list(ApiVersion::V1, "/vmware/host").await?;
    find_exact(hosts, |host| host.name == name).require_one("vSphere host", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vm_summary_reads_camel_case_fields() {
        let vm: VmSummary = serde_json::from_str(
            r#"{
                "id": "VirtualMachine:::vm-1",
                "name": "sql-prod-01",
                "configuredSlaDomainId": "sla-1",
                "effectiveSlaDomainId": "sla-2",
                "powerStatus": "poweredOn"
            }"#,
        )
        .unwrap();
        assert_eq!(vm.configured_sla_domain_id.as_deref(), Some("sla-1"));
        assert_eq!(vm.effective_sla_domain_id.as_deref(), Some("sla-2"));
    }
}
