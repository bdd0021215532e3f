//! Rubrik CDM API interaction module
//!
//! This module provides the core functionality for talking to a Rubrik
//! cluster's REST API: credential resolution, the HTTP request helper,
//! the typed client facade, and the asynchronous job poller.
//!
//! # Module Structure
//!
//! - [`auth`] - Credential resolution and Authorization header handling
//! - [`client`] - Main CDM client for making API requests
//! - [`http`] - HTTP utilities for REST API calls
//! - [`jobs`] - Polling for asynchronous cluster jobs
//! - [`error`] - The error taxonomy shared by the client and modules
//!
//! # Example
//!
//! ```ignore
//! use rbkctl::cdm::auth::{ConnectionContext, Credentials};
//! use rbkctl::cdm::client::CdmClient;
//! use rbkctl::cdm::http::ApiVersion;
//!
//! async fn example() -> rbkctl::cdm::error::CdmResult<()> {
//!     let context = ConnectionContext::resolve(Credentials::default(), Credentials::default())?;
//!     let client = CdmClient::new(context)?;
//!     let cluster = client.get(ApiVersion::V1, "/cluster/me").await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod http;
pub mod jobs;
