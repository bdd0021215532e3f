//! Resource modules
//!
//! One declarative operation per Rubrik object type. Every module follows
//! the same shape: look up current state with a GET, compare it against
//! the desired parameters, and either report "no change required" or
//! issue exactly one mutating call, optionally handing back the job-status
//! URL of an asynchronous request.

pub mod archival_target;
pub mod assign_sla;
pub mod cluster_info;
pub mod cluster_settings;
pub mod common;
pub mod fileset;
pub mod job_status;
pub mod live_mount;
pub mod managed_volume;
pub mod on_demand_snapshot;
pub mod physical_host;

use crate::cdm::error::{CdmError, CdmResult};
use serde::Serialize;
use serde_json::Value;

/// Result document handed back to the caller and serialized to stdout by
/// the CLI: the mutation's response body, or a canned "No change required"
/// string. The payload is never transformed on the way through.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleOutcome {
    pub changed: bool,
    pub response: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_status_url: Option<String>,
}

impl ModuleOutcome {
    /// The idempotent no-op result.
    pub fn unchanged(message: impl Into<String>) -> Self {
        Self {
            changed: false,
            response: Value::String(message.into()),
            job_status_url: None,
        }
    }

    /// A mutation happened; `response` is the mutating call's body.
    pub fn changed(response: Value) -> Self {
        Self {
            changed: true,
            response,
            job_status_url: None,
        }
    }

    /// A mutation whose response is a human-readable message rather than
    /// an API body (e.g. deletions, which answer with an empty 204).
    pub fn changed_message(message: impl Into<String>) -> Self {
        Self::changed(Value::String(message.into()))
    }

    pub fn with_job_url(mut self, url: Option<String>) -> Self {
        self.job_status_url = url;
        self
    }
}

/// Outcome of an exact-name scan over a list endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum Match<T> {
    None,
    One(T),
    Many(usize),
}

impl<T> Match<T> {
    pub fn is_none(&self) -> bool {
        matches!(self, Match::None)
    }

    /// Resolve to exactly one object, with descriptive failures for the
    /// zero and many cases.
    pub fn require_one(self, kind: &str, name: &str) -> CdmResult<T> {
        match self {
            Match::One(item) => Ok(item),
            Match::None => Err(CdmError::ResourceNotFound(format!(
                "There is no {} named '{}' on the Rubrik cluster.",
                kind, name
            ))),
            Match::Many(count) => Err(CdmError::AmbiguousMatch(format!(
                "Found {} objects of type {} named '{}' on the Rubrik cluster; provide additional filters to disambiguate.",
                count, kind, name
            ))),
        }
    }
}

/// Scan a fetched collection for entries satisfying `pred` and classify
/// the result as zero, one, or many.
pub fn find_exact<T, F>(items: Vec<T>, pred: F) -> Match<T>
where
    F: Fn(&T) -> bool,
{
    let mut hits: Vec<T> = items.into_iter().filter(|item| pred(item)).collect();
    match hits.len() {
        0 => Match::None,
        1 => Match::One(hits.remove(0)),
        count => Match::Many(count),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn find_exact_classifies_zero_one_many() {
        let items = vec!["alpha", "beta", "beta"];

        assert!(find_exact(items.clone(), |i| *i == "gamma").is_none());
        assert_eq!(
            find_exact(items.clone(), |i| *i == "alpha"),
            Match::One("alpha")
        );
        assert_eq!(find_exact(items, |i| *i == "beta"), Match::Many(2));
    }

    #[test]
    fn require_one_maps_zero_to_not_found() {
        let result = Match::<String>::None.require_one("SLA Domain", "Gold");
        match result {
            Err(CdmError::ResourceNotFound(msg)) => {
                assert_eq!(
                    msg,
                    "There is no SLA Domain named 'Gold' on the Rubrik cluster."
                );
            }
            other => panic!("expected ResourceNotFound, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn require_one_maps_many_to_ambiguous() {
        let result = Match::<String>::Many(3).require_one("fileset", "etc");
        assert!(matches!(result, Err(CdmError::AmbiguousMatch(_))));
    }

    #[test]
    fn outcome_serializes_without_null_job_url() {
        let outcome = ModuleOutcome::unchanged("No change required.");
        let rendered = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            rendered,
            json!({"changed": false, "response": "No change required."})
        );
    }
}
