//! The landing screen.
//!
//! Presentational only: a caption revealed one character per tick, a static
//! stats bar, and two navigation actions.

use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use crate::auth::AuthState;
use crate::config::LandingConfig;

/// One entry of the stats bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stat {
    /// Headline figure.
    pub value: &'static str,
    /// What the figure counts.
    pub label: &'static str,
}

/// Figures shown under the caption.
pub const STATS: [Stat; 3] = [
    Stat {
        value: "74",
        label: "Languages",
    },
    Stat {
        value: "1.2k+",
        label: "Dialects",
    },
    Stat {
        value: "240M",
        label: "Voices",
    },
];

/// Lazy sequence of caption prefixes.
///
/// Yields the empty prefix first, then one more character per item, ending
/// with the whole caption: `len + 1` items in total. Characters are Unicode
/// scalars, so a prefix never splits one.
#[derive(Debug, Clone)]
pub struct CaptionReveal {
    caption: String,
    next_chars: usize,
    total_chars: usize,
}

impl CaptionReveal {
    /// Start a reveal of `caption`.
    pub fn new(caption: impl Into<String>) -> Self {
        let caption = caption.into();
        let total_chars = caption.chars().count();
        Self {
            caption,
            next_chars: 0,
            total_chars,
        }
    }

    /// The full caption.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    fn prefix(&self, chars: usize) -> &str {
        let end = self
            .caption
            .char_indices()
            .nth(chars)
            .map_or(self.caption.len(), |(i, _)| i);
        &self.caption[..end]
    }
}

impl Iterator for CaptionReveal {
    type Item = String;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_chars > self.total_chars {
            return None;
        }
        let prefix = self.prefix(self.next_chars).to_string();
        self.next_chars += 1;
        Some(prefix)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total_chars + 1).saturating_sub(self.next_chars);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CaptionReveal {}

/// What the typewriter currently shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RevealFrame {
    /// Revealed prefix.
    pub text: String,
    /// Whether the whole caption is shown.
    pub complete: bool,
}

/// A running caption reveal.
///
/// Spawned on the current tokio runtime when created. Dropping the handle
/// aborts the timer task; there is no way to restart it.
#[derive(Debug)]
pub struct Typewriter {
    frames: watch::Receiver<RevealFrame>,
    task: JoinHandle<()>,
}

impl Typewriter {
    /// Start revealing `caption`, one character every `interval`. The first
    /// tick fires one interval after start.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn start(caption: impl Into<String>, interval: Duration) -> Self {
        let reveal = CaptionReveal::new(caption);
        let (tx, frames) = watch::channel(RevealFrame::default());

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut remaining = reveal.len();

            for text in reveal {
                ticker.tick().await;
                remaining -= 1;
                trace!("Caption reveal: {} chars", text.chars().count());
                let frame = RevealFrame {
                    text,
                    complete: remaining == 0,
                };
                if tx.send(frame).is_err() {
                    break;
                }
            }
            debug!("Caption reveal finished");
        });

        Self { frames, task }
    }

    /// Current frame.
    #[must_use]
    pub fn current(&self) -> RevealFrame {
        self.frames.borrow().clone()
    }

    /// A receiver that observes every new frame.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RevealFrame> {
        self.frames.clone()
    }

    /// Wait until the whole caption is shown and return it.
    ///
    /// Returns whatever was shown last if the reveal stops early.
    pub async fn finished(&self) -> String {
        let mut frames = self.frames.clone();
        if frames.wait_for(|frame| frame.complete).await.is_err() {
            debug!("Caption reveal stopped before completion");
        }
        let text = frames.borrow().text.clone();
        text
    }
}

impl Drop for Typewriter {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Navigation actions offered by the landing screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingAction {
    /// "Explore Archive".
    ExploreArchive,
    /// "Start Survey".
    StartSurvey,
}

/// Where a navigation action leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// The authentication screen.
    Login,
    /// The archive overview (requires sign-in).
    Archive,
    /// The survey wizard.
    Survey,
}

/// A mounted landing screen.
///
/// Holds the running [`Typewriter`]; unmounting (dropping) cancels it.
#[derive(Debug)]
pub struct Landing {
    typewriter: Typewriter,
    auth: AuthState,
}

impl Landing {
    /// Mount the screen and start the caption reveal.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    #[must_use]
    pub fn mount(config: &LandingConfig, auth: AuthState) -> Self {
        let typewriter = Typewriter::start(config.caption.clone(), config.reveal_interval());
        Self { typewriter, auth }
    }

    /// The running caption reveal.
    #[must_use]
    pub fn typewriter(&self) -> &Typewriter {
        &self.typewriter
    }

    /// Resolve a navigation action. The archive is gated on sign-in.
    #[must_use]
    pub fn navigate(&self, action: LandingAction) -> Route {
        let route = match action {
            LandingAction::StartSurvey => Route::Survey,
            LandingAction::ExploreArchive if self.auth.is_authenticated() => Route::Archive,
            LandingAction::ExploreArchive => Route::Login,
        };
        debug!("Landing action {action:?} -> {route:?}");
        route
    }
}
