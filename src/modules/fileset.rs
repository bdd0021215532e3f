//! Fileset templates
//!
//! Creates (or converges) a fileset template: the named set of
//! include/exclude path patterns protected as a backup unit, for either a
//! physical host OS or a NAS share. Idempotent on a template with the same
//! name and identical patterns; a same-named template with drifted
//! patterns is patched in place.

use super::{find_exact, Match, ModuleOutcome};
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;
use serde_json::{json, Value};

/// Fileset template summary from `GET v1 /fileset_template`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilesetTemplateSummary {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub includes: Vec<String>,
    #[serde(default)]
    pub excludes: Vec<String>,
    #[serde(default)]
    pub exceptions: Vec<String>,
    #[serde(default)]
    pub operating_system_type: Option<String>,
    #[serde(default)]
    pub share_type: Option<String>,
    #[serde(default)]
    pub allow_backup_network_mounts: Option<bool>,
    #[serde(default)]
    pub backup_hidden_folders: Option<bool>,
}

/// What the fileset protects. Physical filesets target a host OS; NAS
/// filesets target a share protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilesetKind {
    Linux,
    Windows,
    Nfs,
    Smb,
}

impl FilesetKind {
    fn is_nas(self) -> bool {
        matches!(self, FilesetKind::Nfs | FilesetKind::Smb)
    }

    fn api_value(self) -> &'static str {
        match self {
            FilesetKind::Linux => "Linux",
            FilesetKind::Windows => "Windows",
            FilesetKind::Nfs => "NFS",
            FilesetKind::Smb => "SMB",
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
pub struct FilesetParams {
    /// Name of the fileset template
    #[arg(long)]
    pub name: String,

    /// Operating system or NAS share protocol the fileset applies to
    #[arg(long, value_enum)]
    pub kind: FilesetKind,

    /// Path patterns to include, e.g. /etc or C:\Users
    #[arg(long = "include", required = true)]
    pub includes: Vec<String>,

    /// Path patterns to exclude
    #[arg(long = "exclude")]
    pub excludes: Vec<String>,

    /// Exceptions to the exclude patterns
    #[arg(long = "exclude-exception")]
    pub exclude_exceptions: Vec<String>,

    /// Follow network shares mounted on the host
    #[arg(long)]
    pub follow_network_shares: bool,

    /// Back up hidden folders inside the included paths
    #[arg(long)]
    pub backup_hidden_folders: bool,
}

fn same_patterns(current: &FilesetTemplateSummary, params: &FilesetParams) -> bool {
    let sorted = |patterns: &[String]| {
        let mut sorted: Vec<&String> = patterns.iter().collect();
        sorted.sort();
        sorted.into_iter().cloned().collect::<Vec<String>>()
    };

    sorted(&current.includes) == sorted(&params.includes)
        && sorted(&current.excludes) == sorted(&params.excludes)
        && sorted(&current.exceptions) == sorted(&params.exclude_exceptions)
        && current.allow_backup_network_mounts.unwrap_or(false) == params.follow_network_shares
        && current.backup_hidden_folders.unwrap_or(false) == params.backup_hidden_folders
}

fn template_body(params: &FilesetParams) -> Value {
    let mut body = json!({
        "name": params.name,
        "includes": params.includes,
        "excludes": params.excludes,
        "exceptions": params.exclude_exceptions,
        "allowBackupNetworkMounts": params.follow_network_shares,
        "backupHiddenFolders": params.backup_hidden_folders,
    });

    let key = if params.kind.is_nas() {
        "shareType"
    } else {
        "operatingSystemType"
    };
    body[key] = Value::String(params.kind.api_value().to_string());

    body
}

pub async fn run(client: &CdmClient, params: &FilesetParams) -> CdmResult<ModuleOutcome> {
    let filter = if params.kind.is_nas() {
        format!(
            "/fileset_template?primary_cluster_id=local&share_type={}&name={}",
            params.kind.api_value(),
            urlencoding::encode(&params.name)
        )
    } else {
        format!(
            "/fileset_template?primary_cluster_id=local&operating_system_type={}&name={}",
            params.kind.api_value(),
            urlencoding::encode(&params.name)
        )
    };

    let templates: Vec<FilesetTemplateSummary> = client.get_list(ApiVersion::V1, &filter).await?;

    let current = match find_exact(templates, |t| t.name == params.name) {
        Match::None => None,
        found => Some(found.require_one("fileset template", &params.name)?),
    };

    match current {
        Some(current) if same_patterns(&current, params) => Ok(ModuleOutcome::unchanged(format!(
            "No change required. The Rubrik cluster already has a '{}' fileset template configured with the provided patterns.",
            params.name
        ))),
        Some(current) => {
            let response = client
                .patch(
                    ApiVersion::V1,
                    &format!("/fileset_template/{}", current.id),
                    &template_body(params),
                )
                .await?;
            Ok(ModuleOutcome::changed(response))
        }
        None => {
            let body = json!([template_body(params)]);
            let response = client
                .post(ApiVersion::V1, "/fileset_template/bulk", &body)
                .await?;
            Ok(ModuleOutcome::changed(response))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FilesetParams {
        FilesetParams {
            name: "etc-config".to_string(),
            kind: FilesetKind::Linux,
            includes: vec!["/etc".to_string(), "/opt/app".to_string()],
            excludes: vec!["/etc/ssl".to_string()],
            exclude_exceptions: vec![],
            follow_network_shares: false,
            backup_hidden_folders: false,
        }
    }

    fn summary() -> FilesetTemplateSummary {
        FilesetTemplateSummary {
            id: "FilesetTemplate:::1".to_string(),
            name: "etc-config".to_string(),
            includes: vec!["/opt/app".to_string(), "/etc".to_string()],
            excludes: vec!["/etc/ssl".to_string()],
            exceptions: vec![],
            operating_system_type: Some("Linux".to_string()),
            share_type: None,
            allow_backup_network_mounts: Some(false),
            backup_hidden_folders: Some(false),
        }
    }

    #[test]
    fn pattern_comparison_ignores_order() {
        assert!(same_patterns(&summary(), &params()));
    }

    #[test]
    fn pattern_comparison_detects_drift() {
        let mut drifted = params();
        drifted.excludes.push("/var/tmp".to_string());
        assert!(!same_patterns(&summary(), &drifted));
    }

    #[test]
    fn nas_body_uses_share_type() {
        let mut nas = params();
        nas.kind = FilesetKind::Nfs;
        let body = template_body(&nas);
        assert_eq!(body["shareType"], "NFS");
        assert!(body.get("operatingSystemType").is_none());
    }
}
