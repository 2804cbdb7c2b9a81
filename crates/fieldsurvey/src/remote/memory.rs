//! In-process survey store.
//!
//! Backs `fsurvey survey --dry-run` and lets an embedding host see exactly
//! what would have been sent to the archive.

use std::io::Write;
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;

use super::{generate_document_id, SurveyStore};
use crate::error::Result;
use crate::record::{SurveyDraft, SyncReceipt};

/// One survey accepted by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivedSurvey {
    /// What the store answered.
    pub receipt: SyncReceipt,
    /// The draft as submitted.
    pub draft: SurveyDraft,
}

/// Survey store that keeps appended records in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<ArchivedSurvey>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything appended so far, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ArchivedSurvey> {
        self.lock().clone()
    }

    /// Number of appended surveys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing has been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Write one `<document id> <json>` line per accepted survey.
    ///
    /// # Errors
    ///
    /// Returns an error if a draft cannot be encoded or `out` fails.
    pub fn dump(&self, out: &mut impl Write) -> Result<()> {
        for entry in self.lock().iter() {
            let json = serde_json::to_string(&entry.draft)?;
            writeln!(out, "{} {json}", entry.receipt.document_id)?;
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<ArchivedSurvey>> {
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl SurveyStore for MemoryStore {
    async fn append(&self, draft: &SurveyDraft) -> Result<SyncReceipt> {
        let receipt = SyncReceipt {
            document_id: generate_document_id(),
            committed_at: Utc::now(),
        };
        info!("Dry-run archive accepted survey {}", receipt.document_id);
        self.lock().push(ArchivedSurvey {
            receipt: receipt.clone(),
            draft: draft.clone(),
        });
        Ok(receipt)
    }
}
