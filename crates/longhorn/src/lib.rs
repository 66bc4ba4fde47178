//! Longhorn manager REST client
//!
//! Implements [`sweep_core::ClusterApi`] on top of the Longhorn `/v1` API:
//!
//! - `GET  /v1/volumes`
//! - `GET  /v1/volumes/{id}`
//! - `POST /v1/volumes/{id}?action=snapshotList`
//! - `POST /v1/volumes/{id}?action=snapshotDelete`
//! - `POST /v1/volumes/{id}?action=snapshotPurge`

pub mod client;
pub mod wire;

pub use client::{normalize_endpoint, ClientError, LonghornClient};
