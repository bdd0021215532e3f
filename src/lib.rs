//! rbkctl - declarative configuration for Rubrik CDM clusters
//!
//! The library splits into two layers:
//!
//! - [`cdm`] - the client core: credential resolution, the HTTP request
//!   helper, and polling for asynchronous cluster jobs
//! - [`modules`] - one declarative operation per Rubrik object type
//!   (hosts, filesets, SLA domains, snapshots, live mounts, managed
//!   volumes, archival targets, cluster settings)
//!
//! Every module run is a fresh, single-threaded request/response
//! sequence: resolve credentials, fetch current state, compare, mutate if
//! needed, and hand back a `{changed, response}` result document. No
//! state persists between invocations.

pub mod cdm;
pub mod config;
pub mod modules;
