//! The authentication screen.
//!
//! Two mutually exclusive sub-views share one identifier field: signing in
//! and requesting a secret reset. The screen never reports *why* a remote
//! credential operation failed.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use regex::Regex;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{Notice, Notifier};
use crate::remote::AuthService;

/// Loose email shape, as a browser's `type="email"` input would accept.
static EMAIL_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+$").expect("Invalid regex pattern"));

/// Host-side authentication state.
///
/// A cloneable, queryable handle. The host passes
/// [`AuthState::on_login`] to the authentication screen and asks
/// [`AuthState::is_authenticated`] when routing.
#[derive(Debug, Clone, Default)]
pub struct AuthState {
    authenticated: Arc<AtomicBool>,
}

impl AuthState {
    /// A fresh, unauthenticated state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a sign-in has succeeded.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    /// Record a successful sign-in.
    pub fn mark_authenticated(&self) {
        self.authenticated.store(true, Ordering::SeqCst);
    }

    /// A callback suitable for [`AuthScreen::new`].
    #[must_use]
    pub fn on_login(&self) -> impl Fn() + Send + Sync + 'static {
        let state = self.clone();
        move || state.mark_authenticated()
    }
}

/// Which sub-view the screen is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthView {
    /// Identifier and secret form.
    #[default]
    SignIn,
    /// Identifier-only reset form.
    ResetRequest,
}

impl AuthView {
    /// Header subtitle for the view.
    #[must_use]
    pub fn subtitle(self) -> &'static str {
        match self {
            Self::SignIn => "National Linguistic Access Portal",
            Self::ResetRequest => "Security Key Recovery",
        }
    }
}

/// The transient identifier/secret pair held by the screen.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    /// Official email (researcher id).
    pub identifier: String,
    /// Security key.
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &crate::config::mask(&self.secret))
            .finish()
    }
}

/// Why an authentication action was refused locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthRefusal {
    /// The identifier field is empty.
    #[error("an email is required")]
    MissingIdentifier,
    /// The identifier does not look like an email address.
    #[error("the email is not valid")]
    MalformedIdentifier,
    /// The secret field is empty.
    #[error("a security key is required")]
    MissingSecret,
    /// The action belongs to the other sub-view.
    #[error("not available on the {0:?} view")]
    WrongView(AuthView),
}

/// Result of an authentication action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum AuthOutcome {
    /// Sign-in succeeded and the on-login callback ran.
    Authenticated,
    /// Sign-in failed.
    Denied,
    /// Reset message dispatched; the screen is back on sign-in.
    ResetSent,
    /// Reset request failed.
    ResetFailed,
    /// Refused locally; the service was not called.
    Refused(AuthRefusal),
}

#[derive(Debug, Default)]
struct AuthScreenState {
    view: AuthView,
    credentials: Credentials,
}

/// Email/password sign-in with a reset-request side path.
///
/// There is no in-flight guard: two rapid calls both reach the service.
pub struct AuthScreen {
    service: Arc<dyn AuthService>,
    notifier: Arc<dyn Notifier>,
    on_login: Box<dyn Fn() + Send + Sync>,
    state: Mutex<AuthScreenState>,
}

impl fmt::Debug for AuthScreen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthScreen")
            .field("state", &self.lock())
            .finish_non_exhaustive()
    }
}

impl AuthScreen {
    /// Create the screen on the sign-in view. `on_login` runs once per
    /// successful sign-in.
    pub fn new(
        service: Arc<dyn AuthService>,
        notifier: Arc<dyn Notifier>,
        on_login: impl Fn() + Send + Sync + 'static,
    ) -> Self {
        Self {
            service,
            notifier,
            on_login: Box::new(on_login),
            state: Mutex::new(AuthScreenState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, AuthScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current sub-view.
    #[must_use]
    pub fn view(&self) -> AuthView {
        self.lock().view
    }

    /// Current identifier.
    #[must_use]
    pub fn identifier(&self) -> String {
        self.lock().credentials.identifier.clone()
    }

    /// Overwrite the identifier.
    pub fn set_identifier(&self, identifier: impl Into<String>) {
        self.lock().credentials.identifier = identifier.into();
    }

    /// Overwrite the secret.
    pub fn set_secret(&self, secret: impl Into<String>) {
        self.lock().credentials.secret = secret.into();
    }

    /// Switch to the reset-request view.
    pub fn show_reset(&self) {
        self.switch(AuthView::ResetRequest);
    }

    /// Switch to the sign-in view.
    pub fn show_sign_in(&self) {
        self.switch(AuthView::SignIn);
    }

    fn switch(&self, view: AuthView) {
        let mut state = self.lock();
        if state.view != view {
            debug!("Auth screen switching to {view:?}");
            state.view = view;
        }
    }

    fn check_identifier(identifier: &str) -> Result<(), AuthRefusal> {
        if identifier.is_empty() {
            Err(AuthRefusal::MissingIdentifier)
        } else if !EMAIL_SHAPE.is_match(identifier) {
            Err(AuthRefusal::MalformedIdentifier)
        } else {
            Ok(())
        }
    }

    fn expect_view(state: &AuthScreenState, view: AuthView) -> Result<(), AuthRefusal> {
        if state.view == view {
            Ok(())
        } else {
            Err(AuthRefusal::WrongView(state.view))
        }
    }

    /// Verify the held credentials with the auth service.
    pub async fn sign_in(&self) -> AuthOutcome {
        let credentials = {
            let state = self.lock();
            let checked = Self::expect_view(&state, AuthView::SignIn)
                .and_then(|()| Self::check_identifier(&state.credentials.identifier))
                .and_then(|()| {
                    if state.credentials.secret.is_empty() {
                        Err(AuthRefusal::MissingSecret)
                    } else {
                        Ok(())
                    }
                });
            if let Err(refusal) = checked {
                return AuthOutcome::Refused(refusal);
            }
            state.credentials.clone()
        };

        match self
            .service
            .verify_credentials(&credentials.identifier, &credentials.secret)
            .await
        {
            Ok(()) => {
                info!("Signed in as {}", credentials.identifier);
                (self.on_login)();
                AuthOutcome::Authenticated
            }
            Err(e) => {
                warn!("Sign-in failed: {e}");
                self.notifier.notify(Notice::AccessDenied);
                AuthOutcome::Denied
            }
        }
    }

    /// Ask the auth service to send a reset message to the held identifier.
    pub async fn request_reset(&self) -> AuthOutcome {
        let identifier = {
            let state = self.lock();
            let checked = Self::expect_view(&state, AuthView::ResetRequest)
                .and_then(|()| Self::check_identifier(&state.credentials.identifier));
            if let Err(refusal) = checked {
                return AuthOutcome::Refused(refusal);
            }
            state.credentials.identifier.clone()
        };

        match self.service.send_reset(&identifier).await {
            Ok(()) => {
                info!("Reset link requested for {identifier}");
                self.notifier.notify(Notice::ResetSent);
                self.show_sign_in();
                AuthOutcome::ResetSent
            }
            Err(e) => {
                warn!("Reset request failed: {e}");
                self.notifier.notify(Notice::ResetFailed);
                AuthOutcome::ResetFailed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeAuth, RecordingNotifier};
    use std::sync::atomic::AtomicUsize;

    const EMAIL: &str = "admin@portal.pk";
    const KEY: &str = "indus-74";

    struct Harness {
        screen: AuthScreen,
        auth: Arc<FakeAuth>,
        notifier: Arc<RecordingNotifier>,
        logins: Arc<AtomicUsize>,
    }

    fn harness() -> Harness {
        let auth = Arc::new(FakeAuth::with_account(EMAIL, KEY));
        let notifier = Arc::new(RecordingNotifier::default());
        let logins = Arc::new(AtomicUsize::new(0));
        let counter = logins.clone();
        let screen = AuthScreen::new(auth.clone(), notifier.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        Harness {
            screen,
            auth,
            notifier,
            logins,
        }
    }

    #[test]
    fn test_auth_state_on_login() {
        let state = AuthState::new();
        assert!(!state.is_authenticated());

        let callback = state.on_login();
        callback();
        assert!(state.clone().is_authenticated());
    }

    #[test]
    fn test_view_toggle() {
        let h = harness();
        assert_eq!(h.screen.view(), AuthView::SignIn);
        assert_eq!(h.screen.view().subtitle(), "National Linguistic Access Portal");

        h.screen.show_reset();
        assert_eq!(h.screen.view(), AuthView::ResetRequest);
        assert_eq!(h.screen.view().subtitle(), "Security Key Recovery");

        h.screen.show_sign_in();
        assert_eq!(h.screen.view(), AuthView::SignIn);
    }

    #[test]
    fn test_credentials_debug_hides_secret() {
        let credentials = Credentials {
            identifier: EMAIL.to_string(),
            secret: KEY.to_string(),
        };
        let debug_str = format!("{credentials:?}");
        assert!(debug_str.contains(EMAIL));
        assert!(!debug_str.contains(KEY));
    }

    #[tokio::test]
    async fn test_sign_in_success_invokes_callback_once() {
        let h = harness();
        h.screen.set_identifier(EMAIL);
        h.screen.set_secret(KEY);

        assert_eq!(h.screen.sign_in().await, AuthOutcome::Authenticated);
        assert_eq!(h.logins.load(Ordering::SeqCst), 1);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_sign_in_unregistered_is_denied() {
        let h = harness();
        h.screen.set_identifier("stranger@portal.pk");
        h.screen.set_secret("whatever");

        assert_eq!(h.screen.sign_in().await, AuthOutcome::Denied);
        assert_eq!(h.logins.load(Ordering::SeqCst), 0);
        assert_eq!(h.notifier.notices(), vec![Notice::AccessDenied]);
    }

    #[tokio::test]
    async fn test_wrong_secret_looks_like_unknown_identifier() {
        let h = harness();
        h.screen.set_identifier(EMAIL);
        h.screen.set_secret("wrong");

        assert_eq!(h.screen.sign_in().await, AuthOutcome::Denied);
        assert_eq!(h.notifier.notices(), vec![Notice::AccessDenied]);
    }

    #[tokio::test]
    async fn test_sign_in_refusals_skip_service() {
        let h = harness();

        assert_eq!(
            h.screen.sign_in().await,
            AuthOutcome::Refused(AuthRefusal::MissingIdentifier)
        );

        h.screen.set_identifier("not-an-email");
        assert_eq!(
            h.screen.sign_in().await,
            AuthOutcome::Refused(AuthRefusal::MalformedIdentifier)
        );

        h.screen.set_identifier(EMAIL);
        assert_eq!(
            h.screen.sign_in().await,
            AuthOutcome::Refused(AuthRefusal::MissingSecret)
        );

        h.screen.set_secret(KEY);
        h.screen.show_reset();
        assert_eq!(
            h.screen.sign_in().await,
            AuthOutcome::Refused(AuthRefusal::WrongView(AuthView::ResetRequest))
        );

        assert_eq!(h.auth.sign_in_calls(), 0);
        assert!(h.notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn test_rapid_sign_ins_both_reach_service() {
        let h = harness();
        h.screen.set_identifier(EMAIL);
        h.screen.set_secret(KEY);

        let (a, b) = tokio::join!(h.screen.sign_in(), h.screen.sign_in());

        assert_eq!(a, AuthOutcome::Authenticated);
        assert_eq!(b, AuthOutcome::Authenticated);
        assert_eq!(h.auth.sign_in_calls(), 2);
        assert_eq!(h.logins.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_reset_registered_returns_to_sign_in() {
        let h = harness();
        h.screen.show_reset();
        h.screen.set_identifier(EMAIL);

        assert_eq!(h.screen.request_reset().await, AuthOutcome::ResetSent);
        assert_eq!(h.screen.view(), AuthView::SignIn);
        assert_eq!(h.notifier.notices(), vec![Notice::ResetSent]);
        // The identifier carries over to the sign-in form.
        assert_eq!(h.screen.identifier(), EMAIL);
    }

    #[tokio::test]
    async fn test_reset_unknown_stays_on_reset_view() {
        let h = harness();
        h.screen.show_reset();
        h.screen.set_identifier("ghost@portal.pk");

        assert_eq!(h.screen.request_reset().await, AuthOutcome::ResetFailed);
        assert_eq!(h.screen.view(), AuthView::ResetRequest);
        assert_eq!(h.notifier.notices(), vec![Notice::ResetFailed]);
    }

    #[tokio::test]
    async fn test_reset_refused_on_sign_in_view() {
        let h = harness();
        h.screen.set_identifier(EMAIL);

        assert_eq!(
            h.screen.request_reset().await,
            AuthOutcome::Refused(AuthRefusal::WrongView(AuthView::SignIn))
        );
        assert_eq!(h.auth.reset_calls(), 0);
    }
}
