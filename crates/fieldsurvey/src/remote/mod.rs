//! Remote collaborators: the survey archive and the identity service.
//!
//! Both are opaque to the screens. Each operation is a single attempt that
//! either succeeds or fails with one undistinguished error kind.

mod firestore;
mod identity;
mod memory;

pub use firestore::{generate_document_id, FirestoreStore};
pub use identity::IdentityToolkit;
pub use memory::{ArchivedSurvey, MemoryStore};

use crate::error::Result;
use crate::record::{SurveyDraft, SyncReceipt};

/// Append-only store for survey records.
#[async_trait::async_trait]
pub trait SurveyStore: Send + Sync {
    /// Append one survey. The store assigns the document id and the
    /// creation timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RemoteWrite`] if the archive is unreachable or
    /// rejects the write.
    async fn append(&self, draft: &SurveyDraft) -> Result<SyncReceipt>;
}

/// Credential verification and reset dispatch.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verify an identifier/secret pair.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Credential`] on any failure.
    async fn verify_credentials(&self, identifier: &str, secret: &str) -> Result<()>;

    /// Send a secret-reset message to `identifier`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Credential`] on any failure.
    async fn send_reset(&self, identifier: &str) -> Result<()>;
}
