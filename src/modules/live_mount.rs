//! vSphere live mounts
//!
//! Mounts a chosen snapshot of a vSphere VM as an instantly running clone,
//! and unmounts previously created clones. Snapshot selection is by
//! RFC 3339 timestamp, truncated to minute precision, or "latest" when no
//! timestamp is given.

use super::common::{lookup_vm, lookup_vsphere_host};
use super::{find_exact, ModuleOutcome};
use crate::cdm::client::CdmClient;
use crate::cdm::error::{CdmError, CdmResult};
use crate::cdm::http::ApiVersion;
use crate::cdm::jobs;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

/// Snapshot summary from `GET v1 /vmware/vm/{id}/snapshot`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub id: String,
    pub date: String,
}

/// Live mount summary from `GET v1 /vmware/vm/snapshot/mount`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MountSummary {
    pub id: String,
    #[serde(default)]
    pub vm_id: Option<String>,
    #[serde(default)]
    pub mounted_vm_id: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LiveMountParams {
    /// Name of the vSphere VM whose snapshot to mount
    #[arg(long = "vm", alias = "vsphere-vm-name")]
    pub vsphere_vm_name: String,

    /// RFC 3339 timestamp of the snapshot to mount, matched to the
    /// minute; the most recent snapshot when omitted
    #[arg(long)]
    pub snapshot: Option<String>,

    /// ESXi host to mount on; the cluster picks one when omitted
    #[arg(long)]
    pub host: Option<String>,

    /// Leave the mounted clone powered off
    #[arg(long)]
    pub powered_off: bool,

    /// Strip network devices from the mounted clone
    #[arg(long)]
    pub remove_network_devices: bool,
}

#[derive(Debug, Clone, clap::Args)]
pub struct LiveUnmountParams {
    /// Name of the mounted clone VM to unmount
    #[arg(long = "mounted-vm")]
    pub mounted_vm_name: String,

    /// Force the unmount even if the clone cannot be cleanly powered down
    #[arg(long)]
    pub force: bool,
}

fn parse_minute(timestamp: &str) -> CdmResult<i64> {
    let parsed: DateTime<Utc> = timestamp
        .parse::<DateTime<Utc>>()
        .or_else(|_| DateTime::parse_from_rfc3339(timestamp).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|e| {
            CdmError::InvalidParameter(format!("'{}' is not an RFC 3339 timestamp: {}", timestamp, e))
        })?;
    Ok(parsed.timestamp() / 60)
}

/// Pick the snapshot to mount: an exact to-the-minute match for the
/// requested timestamp, or the most recent one.
fn select_snapshot(
    snapshots: Vec<SnapshotSummary>,
    requested: Option<&str>,
    vm_name: &str,
) -> CdmResult<SnapshotSummary> {
    if snapshots.is_empty() {
        return Err(CdmError::ResourceNotFound(format!(
            "The vSphere VM '{}' has no snapshots on the Rubrik cluster.",
            vm_name
        )));
    }

    match requested {
        None => {
            let latest = snapshots
                .into_iter()
                .max_by_key(|snapshot| parse_minute(&snapshot.date).unwrap_or(i64::MIN));
            latest.ok_or_else(|| {
                CdmError::ResourceNotFound(format!(
                    "The vSphere VM '{}' has no snapshots on the Rubrik cluster.",
                    vm_name
                ))
            })
        }
        Some(timestamp) => {
            let wanted = parse_minute(timestamp)?;
            find_exact(snapshots, |snapshot| {
                parse_minute(&snapshot.date).map(|m| m == wanted).unwrap_or(false)
            })
            .require_one("snapshot taken at the requested time for VM", vm_name)
        }
    }
}

pub async fn run_mount(client: &CdmClient, params: &LiveMountParams) -> CdmResult<ModuleOutcome> {
    let vm = lookup_vm(client, &params.vsphere_vm_name).await?;

    let snapshots: Vec<SnapshotSummary> = client
        .get_list(ApiVersion::V1, &format!("/vmware/vm/{}/snapshot", vm.id))
        .await?;
    let snapshot = select_snapshot(snapshots, params.snapshot.as_deref(), &params.vsphere_vm_name)?;

    let mut body = json!({
        "powerOn": !params.powered_off,
        "removeNetworkDevices": params.remove_network_devices,
    });
    if let Some(host_name) = &params.host {
        let host = lookup_vsphere_host(client, host_name).await?;
        body["hostId"] = Value::String(host.id);
    }

    let response = client
        .post(
            ApiVersion::V1,
            &format!("/vmware/vm/snapshot/{}/mount", snapshot.id),
            &body,
        )
        .await?;

    let job_url = jobs::job_status_url(&response);
    Ok(ModuleOutcome::changed(response).with_job_url(job_url))
}

pub async fn run_unmount(client: &CdmClient, params: &LiveUnmountParams) -> CdmResult<ModuleOutcome> {
    let mounted_vm = lookup_vm(client, &params.mounted_vm_name).await?;

    let mounts: Vec<MountSummary> = client
        .get_list(ApiVersion::V1, "/vmware/vm/snapshot/mount")
        .await?;
    let mount = find_exact(mounts, |m| {
        m.mounted_vm_id.as_deref() == Some(mounted_vm.id.as_str())
    })
    .require_one("live mount of VM", &params.mounted_vm_name)?;

    let response = client
        .delete(
            ApiVersion::V1,
            &format!("/vmware/vm/snapshot/mount/{}?force={}", mount.id, params.force),
        )
        .await?;

    let job_url = jobs::job_status_url(&response);
    Ok(ModuleOutcome::changed(response).with_job_url(job_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(id: &str, date: &str) -> SnapshotSummary {
        SnapshotSummary {
            id: id.to_string(),
            date: date.to_string(),
        }
    }

    #[test]
    fn latest_snapshot_wins_when_no_timestamp_given() {
        let snapshots = vec![
            snapshot("old", "2023-04-01T10:00:00Z"),
            snapshot("new", "2023-04-02T10:00:00Z"),
            snapshot("mid", "2023-04-01T22:30:00Z"),
        ];
        let chosen = select_snapshot(snapshots, None, "sql-01").unwrap();
        assert_eq!(chosen.id, "new");
    }

    #[test]
    fn timestamp_match_truncates_to_the_minute() {
        let snapshots = vec![
            snapshot("a", "2023-04-01T10:00:42Z"),
            snapshot("b", "2023-04-01T11:00:00Z"),
        ];
        let chosen =
            select_snapshot(snapshots, Some("2023-04-01T10:00:00Z"), "sql-01").unwrap();
        assert_eq!(chosen.id, "a");
    }

    #[test]
    fn missing_snapshot_for_timestamp_is_not_found() {
        let snapshots = vec![snapshot("a", "2023-04-01T10:00:00Z")];
        let result = select_snapshot(snapshots, Some("2023-04-02T10:00:00Z"), "sql-01");
        assert!(matches!(result, Err(CdmError::ResourceNotFound(_))));
    }

    #[test]
    fn no_snapshots_at_all_is_not_found() {
        let result = select_snapshot(Vec::new(), None, "sql-01");
        assert!(matches!(result, Err(CdmError::ResourceNotFound(_))));
    }
}
