//! Status endpoint client.
//!
//! The endpoint speaks JSON over HTTP:
//!
//! - `POST {base}/session_state` → `["<id>", ...]`
//! - `POST {base}/torrents_status` with `{"torrent_ids": [...], "keys": [...]}`
//!   → `{"<id>": {"<key>": <value>, ...}, ...}` or `null`

use crate::error::{AppError, Result};
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use torrentview_engine::{parse_status, FieldName, RecordId, StatusMap};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can answer session and status queries.
///
/// Returned futures own everything they need, so they can be spawned and
/// the caller keeps control while they run.
pub trait StatusClient: Send + Sync + 'static {
    /// Ids of every torrent in the session.
    fn list_session_ids(&self) -> BoxFuture<'static, Result<Vec<RecordId>>>;

    /// Requested fields for the requested torrents. `None` if the remote had
    /// nothing to report.
    fn fetch_status(
        &self,
        ids: Vec<RecordId>,
        fields: Vec<FieldName>,
    ) -> BoxFuture<'static, Result<Option<StatusMap>>>;
}

/// Body of a status query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusQuery {
    pub torrent_ids: Vec<RecordId>,
    pub keys: Vec<FieldName>,
}

/// [`StatusClient`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStatusClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpStatusClient {
    /// Create a client for the endpoint at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

impl StatusClient for HttpStatusClient {
    fn list_session_ids(&self) -> BoxFuture<'static, Result<Vec<RecordId>>> {
        let request = self.http.post(self.url("session_state"));

        async move {
            let raw: serde_json::Value = request.send().await?.error_for_status()?.json().await?;
            session_ids_from_json(raw)
        }
        .boxed()
    }

    fn fetch_status(
        &self,
        ids: Vec<RecordId>,
        fields: Vec<FieldName>,
    ) -> BoxFuture<'static, Result<Option<StatusMap>>> {
        let query = StatusQuery {
            torrent_ids: ids,
            keys: fields,
        };
        let request = self.http.post(self.url("torrents_status")).json(&query);

        async move {
            let raw: serde_json::Value = request.send().await?.error_for_status()?.json().await?;
            Ok(parse_status(raw))
        }
        .boxed()
    }
}

/// Parse a session membership reply.
pub fn session_ids_from_json(raw: serde_json::Value) -> Result<Vec<RecordId>> {
    match raw {
        serde_json::Value::Null => Ok(Vec::new()),
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                serde_json::Value::String(id) => Ok(id),
                other => Err(AppError::Protocol(format!(
                    "session id must be a string, got {other}"
                ))),
            })
            .collect(),
        other => Err(AppError::Protocol(format!(
            "session state must be an array, got {other}"
        ))),
    }
}
