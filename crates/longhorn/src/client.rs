//! HTTP client for the Longhorn manager API

use crate::wire::{into_snapshots, Collection, WireSnapshot, WireVolume};
use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;
use sweep_core::{ApiError, ClusterApi, Snapshot, Volume};
use thiserror::Error;
use tracing::debug;

/// Errors constructing a client
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("cluster endpoint is empty")]
    EmptyEndpoint,

    #[error("failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Turn `host:port`, `http://host:port` or `http://host:port/v1` into the
/// API base URL ending in `/v1`
pub fn normalize_endpoint(endpoint: &str) -> Result<String, ClientError> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(ClientError::EmptyEndpoint);
    }

    let with_scheme = if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };

    if with_scheme.ends_with("/v1") {
        Ok(with_scheme)
    } else {
        Ok(format!("{with_scheme}/v1"))
    }
}

/// Longhorn implementation of [`ClusterApi`]
pub struct LonghornClient {
    client: Client,
    base_url: String,
    /// Whether each known volume advertised `snapshotList` when last read
    listable: Mutex<HashMap<String, bool>>,
}

impl LonghornClient {
    /// Create a client for `endpoint` with a per-request timeout
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url = normalize_endpoint(endpoint)?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            listable: Mutex::new(HashMap::new()),
        })
    }

    /// API base URL, ending in `/v1`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn volume_url(&self, volume_id: &str) -> String {
        format!("{}/volumes/{volume_id}", self.base_url)
    }

    fn remember(&self, volume: &WireVolume) {
        self.listable
            .lock()
            .insert(volume.key().to_string(), volume.can_list_snapshots());
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, resource: &str) -> Result<T, ApiError> {
        debug!(url, "GET");
        let response = self.client.get(url).send().await.map_err(transport)?;
        let response = check_status(response, resource).await?;
        response.json().await.map_err(decode)
    }

    async fn post_action<B: Serialize>(
        &self,
        volume_id: &str,
        action: &str,
        body: &B,
        resource: &str,
    ) -> Result<Response, ApiError> {
        let url = self.volume_url(volume_id);
        debug!(url = %url, action, "POST");
        let response = self
            .client
            .post(&url)
            .query(&[("action", action)])
            .json(body)
            .send()
            .await
            .map_err(transport)?;
        check_status(response, resource).await
    }

    async fn fetch_volume(&self, volume_id: &str) -> Result<WireVolume, ApiError> {
        let volume: WireVolume = self
            .get_json(&self.volume_url(volume_id), &format!("volume {volume_id}"))
            .await?;
        self.remember(&volume);
        Ok(volume)
    }

    async fn can_list_snapshots(&self, volume_id: &str) -> Result<bool, ApiError> {
        let known = self.listable.lock().get(volume_id).copied();
        match known {
            Some(listable) => Ok(listable),
            None => Ok(self.fetch_volume(volume_id).await?.can_list_snapshots()),
        }
    }
}

fn transport(e: reqwest::Error) -> ApiError {
    if e.is_decode() {
        decode(e)
    } else {
        ApiError::Transport(e.to_string())
    }
}

fn decode(e: reqwest::Error) -> ApiError {
    ApiError::Decode(e.to_string())
}

async fn check_status(response: Response, resource: &str) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ApiError::NotFound {
            resource: resource.to_string(),
        });
    }

    let body = response.text().await.unwrap_or_default();
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ClusterApi for LonghornClient {
    async fn list_volumes(&self) -> Result<Vec<Volume>, ApiError> {
        let url = format!("{}/volumes", self.base_url);
        let listing: Collection<WireVolume> = self.get_json(&url, "volume list").await?;

        for volume in &listing.data {
            self.remember(volume);
        }
        Ok(listing.data.into_iter().map(Volume::from).collect())
    }

    async fn list_snapshots(&self, volume_id: &str) -> Result<Vec<Snapshot>, ApiError> {
        if !self.can_list_snapshots(volume_id).await? {
            return Err(ApiError::Unsupported {
                volume: volume_id.to_string(),
            });
        }

        let response = self
            .post_action(volume_id, "snapshotList", &json!({}), &format!("volume {volume_id}"))
            .await?;
        let listing: Collection<WireSnapshot> = response.json().await.map_err(decode)?;
        Ok(into_snapshots(listing.data))
    }

    async fn delete_snapshot(&self, volume_id: &str, snapshot: &str) -> Result<(), ApiError> {
        self.post_action(
            volume_id,
            "snapshotDelete",
            &json!({ "name": snapshot }),
            &format!("snapshot {snapshot}"),
        )
        .await?;
        Ok(())
    }

    async fn purge_snapshots(&self, volume_id: &str) -> Result<(), ApiError> {
        self.post_action(volume_id, "snapshotPurge", &json!({}), &format!("volume {volume_id}"))
            .await?;
        Ok(())
    }

    async fn get_volume(&self, volume_id: &str) -> Result<Volume, ApiError> {
        self.fetch_volume(volume_id).await.map(Volume::from)
    }
}
