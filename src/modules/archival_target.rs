//! Archival locations
//!
//! Adds an AWS S3 archival location to the cluster. Idempotent on an
//! existing object store with the same archive name, bucket, and region;
//! a conflicting same-named location is left for the cluster to reject so
//! its own validation message reaches the operator.

use super::{find_exact, Match, ModuleOutcome};
use crate::cdm::client::CdmClient;
use crate::cdm::error::CdmResult;
use crate::cdm::http::ApiVersion;
use serde::Deserialize;
use serde_json::{json, Value};

/// Object store summary from `GET internal /archive/object_store`. The
/// interesting fields sit inside the `definition` wrapper.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreSummary {
    pub id: String,
    pub definition: ObjectStoreDefinition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStoreDefinition {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub object_store_type: Option<String>,
    #[serde(default)]
    pub bucket: Option<String>,
    #[serde(default)]
    pub default_region: Option<String>,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ArchivalTargetParams {
    /// Name the archival location will carry on the cluster
    #[arg(long)]
    pub name: String,

    /// S3 bucket to archive into
    #[arg(long)]
    pub bucket: String,

    /// AWS region hosting the bucket, e.g. us-east-1
    #[arg(long)]
    pub region: String,

    /// AWS access key with rights to the bucket
    #[arg(long)]
    pub access_key: String,

    /// AWS secret key paired with the access key
    #[arg(long)]
    pub secret_key: String,

    /// KMS master key id for server-side encryption
    #[arg(long)]
    pub kms_master_key_id: Option<String>,

    /// S3 storage class for archived data
    #[arg(long, default_value = "STANDARD")]
    pub storage_class: String,
}

fn matches_desired(store: &ObjectStoreSummary, params: &ArchivalTargetParams) -> bool {
    store.definition.object_store_type.as_deref() == Some("S3")
        && store.definition.bucket.as_deref() == Some(params.bucket.as_str())
        && store.definition.default_region.as_deref() == Some(params.region.as_str())
}

pub async fn run(client: &CdmClient, params: &ArchivalTargetParams) -> CdmResult<ModuleOutcome> {
    let stores: Vec<ObjectStoreSummary> = client
        .get_list(ApiVersion::Internal, "/archive/object_store")
        .await?;

    let existing = find_exact(stores, |store| {
        store.definition.name.as_deref() == Some(params.name.as_str())
    });

    if let Match::One(store) = &existing {
        if matches_desired(store, params) {
            return Ok(ModuleOutcome::unchanged(format!(
                "No change required. The '{}' archival location is already configured on the Rubrik cluster.",
                params.name
            )));
        }
    }

    let mut definition = json!({
        "objectStoreType": "S3",
        "name": params.name,
        "bucket": params.bucket,
        "defaultRegion": params.region,
        "accessKey": params.access_key,
        "secretKey": params.secret_key,
        "storageClass": params.storage_class,
        "isComputeEnabled": false,
        "isConsolidationEnabled": true,
    });
    if let Some(kms_key) = &params.kms_master_key_id {
        definition["kmsMasterKeyId"] = Value::String(kms_key.clone());
    }

    let response = client
        .post(ApiVersion::Internal, "/archive/object_store", &definition)
        .await?;

    Ok(ModuleOutcome::changed(response))
}
