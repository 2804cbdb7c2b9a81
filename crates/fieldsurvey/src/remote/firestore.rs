//! Document store adapter over the Firestore REST API.
//!
//! Appends go through `documents:commit` so the creation timestamp can be a
//! server-side `REQUEST_TIME` transform. The document id is generated on the
//! client, as the Firestore SDKs do for auto-id documents.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::SurveyStore;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::record::{SurveyDraft, SyncReceipt};

/// Alphabet for auto-generated document ids.
const AUTO_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of auto-generated document ids.
const AUTO_ID_LEN: usize = 20;

/// Field holding the server-assigned creation time.
const TIMESTAMP_FIELD: &str = "timestamp";

/// Generate a 20-character alphanumeric document id.
#[must_use]
pub fn generate_document_id() -> String {
    let mut rng = rand::rng();
    (0..AUTO_ID_LEN)
        .map(|_| char::from(AUTO_ID_ALPHABET[rng.random_range(0..AUTO_ID_ALPHABET.len())]))
        .collect()
}

/// Survey store backed by a Firestore collection.
#[derive(Debug, Clone)]
pub struct FirestoreStore {
    client: reqwest::Client,
    base_url: String,
    database_path: String,
    collection: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitResponse {
    commit_time: DateTime<Utc>,
}

impl FirestoreStore {
    /// Build a store from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config.require_api_key()?.to_string();
        let archive = &config.archive;
        Self::new(
            &archive.firestore_url,
            &archive.project_id,
            &archive.database,
            &archive.collection,
            api_key,
            config.request_timeout(),
        )
    }

    /// Build a store for an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        project_id: &str,
        database: &str,
        collection: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            database_path: format!("projects/{project_id}/databases/{database}"),
            collection: collection.to_string(),
            api_key: api_key.into(),
        })
    }

    /// Collection this store appends to.
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    fn commit_url(&self) -> String {
        format!("{}/v1/{}/documents:commit", self.base_url, self.database_path)
    }

    fn document_name(&self, document_id: &str) -> String {
        format!(
            "{}/documents/{}/{document_id}",
            self.database_path, self.collection
        )
    }

    /// Build the commit body for one new document.
    fn commit_body(&self, document_id: &str, draft: &SurveyDraft) -> Value {
        json!({
            "writes": [{
                "update": {
                    "name": self.document_name(document_id),
                    "fields": encode_fields(draft),
                },
                "currentDocument": { "exists": false },
                "updateTransforms": [{
                    "fieldPath": TIMESTAMP_FIELD,
                    "setToServerValue": "REQUEST_TIME",
                }],
            }]
        })
    }

    fn write_error(&self, message: impl Into<String>) -> Error {
        Error::remote_write(&self.collection, message)
    }
}

/// Encode a draft as Firestore typed values. Unselected enums become nulls.
fn encode_fields(draft: &SurveyDraft) -> Value {
    fn token(value: Option<&'static str>) -> Value {
        value.map_or_else(
            || json!({ "nullValue": null }),
            |t| json!({ "stringValue": t }),
        )
    }

    json!({
        "name": { "stringValue": draft.identity_label },
        "region": token(draft.region.map(|p| p.token())),
        "dialect": { "stringValue": draft.dialect_name },
        "vitality": token(draft.vitality.map(|v| v.token())),
    })
}

#[async_trait::async_trait]
impl SurveyStore for FirestoreStore {
    async fn append(&self, draft: &SurveyDraft) -> Result<SyncReceipt> {
        let document_id = generate_document_id();
        debug!(
            "Committing survey {} to collection {}",
            document_id, self.collection
        );

        let response = self
            .client
            .post(self.commit_url())
            .query(&[("key", self.api_key.as_str())])
            .json(&self.commit_body(&document_id, draft))
            .send()
            .await
            .map_err(|e| {
                warn!("Archive unreachable: {e}");
                self.write_error(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Archive rejected survey {document_id}: HTTP {status}: {body}");
            return Err(self.write_error(format!("HTTP {status}")));
        }

        let commit: CommitResponse = response.json().await.map_err(|e| {
            warn!("Unreadable commit response: {e}");
            self.write_error(format!("unreadable commit response: {e}"))
        })?;

        info!("Survey {document_id} synced at {}", commit.commit_time);
        Ok(SyncReceipt {
            document_id,
            committed_at: commit.commit_time,
        })
    }
}
