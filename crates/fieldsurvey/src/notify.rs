//! User-facing notifications.
//!
//! Screens never print. They hand a [`Notice`] to whatever [`Notifier`] the
//! host injected, which decides how to show it.

use std::fmt;
use std::io::Write;
use std::sync::Mutex;

/// A blocking, user-facing message raised by a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// The survey reached the archive.
    SyncSucceeded,
    /// The archive could not be reached or refused the write.
    SyncFailed,
    /// Sign-in failed for any reason.
    AccessDenied,
    /// A reset link was dispatched.
    ResetSent,
    /// The reset request failed for any reason.
    ResetFailed,
}

impl Notice {
    /// Whether the notice reports a failure.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::SyncFailed | Self::AccessDenied | Self::ResetFailed)
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SyncSucceeded => "✅ Data Synced to National Archive Successfully!",
            Self::SyncFailed => {
                "❌ Connection Error: Archive could not be reached. Check your Firebase Rules."
            }
            Self::AccessDenied => "Access Denied: Identity could not be verified.",
            Self::ResetSent => "Security Reset Link sent to your official email!",
            Self::ResetFailed => "Error: Researcher ID/Email not found in our records.",
        };
        f.write_str(text)
    }
}

/// Something that can show a [`Notice`] to the user.
pub trait Notifier: Send + Sync {
    /// Show the notice. Implementations must not fail.
    fn notify(&self, notice: Notice);
}

/// Writes notices as framed lines to a terminal stream.
#[derive(Debug)]
pub struct TerminalNotifier<W: Write + Send> {
    out: Mutex<W>,
}

impl TerminalNotifier<std::io::Stdout> {
    /// Notifier writing to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> TerminalNotifier<W> {
    /// Notifier writing to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    /// Consume the notifier and return the stream.
    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<W: Write + Send> Notifier for TerminalNotifier<W> {
    fn notify(&self, notice: Notice) {
        let mut out = self
            .out
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let marker = if notice.is_failure() { "!" } else { "*" };
        if let Err(e) = writeln!(out, "\n[{marker}] {notice}\n").and_then(|()| out.flush()) {
            tracing::error!("failed to show notice {notice:?}: {e}");
        }
    }
}
