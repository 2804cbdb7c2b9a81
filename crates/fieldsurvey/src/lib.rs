//! `fieldsurvey` - Field client for the Geolinguistic Survey of Pakistan
//!
//! This library provides the screens of the field client as view models
//! (the survey wizard, the authentication screen and the landing screen),
//! the remote archive and identity adapters they talk to, and a
//! line-oriented console that drives them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod auth;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod landing;
pub mod logging;
pub mod notify;
pub mod record;
pub mod remote;
pub mod wizard;

#[cfg(test)]
mod fakes;

pub use auth::{AuthScreen, AuthState};
pub use config::Config;
pub use error::{Error, Result};
pub use landing::{Landing, Typewriter};
pub use logging::init_logging;
pub use notify::{Notice, Notifier};
pub use record::{Province, SurveyDraft, VitalityStatus};
pub use wizard::SurveyWizard;
