//! Test doubles for the remote collaborators and the notifier.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::Utc;
use tokio::sync::Notify;

use crate::error::{Error, Result};
use crate::notify::{Notice, Notifier};
use crate::record::{SurveyDraft, SyncReceipt};
use crate::remote::{AuthService, SurveyStore};

/// Records every notice it is shown.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Survey store that counts appends, can be told to fail, and can hold
/// every append until released.
#[derive(Debug, Default)]
pub struct FakeStore {
    appended: Mutex<Vec<SurveyDraft>>,
    fail: AtomicBool,
    gated: AtomicBool,
    gate: Notify,
}

impl FakeStore {
    pub fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    pub fn gated() -> Self {
        let store = Self::default();
        store.gated.store(true, Ordering::SeqCst);
        store
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }

    pub fn appended(&self) -> Vec<SurveyDraft> {
        self.appended.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl SurveyStore for FakeStore {
    async fn append(&self, draft: &SurveyDraft) -> Result<SyncReceipt> {
        if self.gated.load(Ordering::SeqCst) {
            self.gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::remote_write("surveys", "PERMISSION_DENIED"));
        }
        self.appended.lock().unwrap().push(draft.clone());
        Ok(SyncReceipt {
            document_id: format!("doc{}", self.appended.lock().unwrap().len()),
            committed_at: Utc::now(),
        })
    }
}

/// Auth service with a fixed set of registered accounts.
#[derive(Debug, Default)]
pub struct FakeAuth {
    accounts: HashMap<String, String>,
    sign_in_calls: AtomicUsize,
    reset_calls: AtomicUsize,
}

impl FakeAuth {
    pub fn with_account(identifier: &str, secret: &str) -> Self {
        let mut auth = Self::default();
        auth.accounts
            .insert(identifier.to_string(), secret.to_string());
        auth
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn reset_calls(&self) -> usize {
        self.reset_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AuthService for FakeAuth {
    async fn verify_credentials(&self, identifier: &str, secret: &str) -> Result<()> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        match self.accounts.get(identifier) {
            Some(expected) if expected == secret => Ok(()),
            _ => Err(Error::credential("sign_in", "INVALID_LOGIN_CREDENTIALS")),
        }
    }

    async fn send_reset(&self, identifier: &str) -> Result<()> {
        self.reset_calls.fetch_add(1, Ordering::SeqCst);
        if self.accounts.contains_key(identifier) {
            Ok(())
        } else {
            Err(Error::credential("send_reset", "EMAIL_NOT_FOUND"))
        }
    }
}
