//! The three-step survey wizard.
//!
//! The wizard owns one [`SurveyDraft`] and a [`Step`] pointer. Controls that
//! would be disabled in a form are modelled as refusals: a refused action
//! returns a [`StepRefusal`] and changes nothing.
//!
//! ```no_run
//! # async fn demo(store: std::sync::Arc<dyn fieldsurvey::remote::SurveyStore>,
//! #               notifier: std::sync::Arc<dyn fieldsurvey::notify::Notifier>) {
//! use fieldsurvey::record::{Province, TextField, VitalityStatus};
//! use fieldsurvey::wizard::{SubmitOutcome, SurveyWizard};
//!
//! let wizard = SurveyWizard::new(store, notifier);
//! wizard.set_text(TextField::IdentityLabel, "Dr. A. Khan");
//! wizard.advance().unwrap();
//! wizard.select_region(Province::Sindh);
//! wizard.advance().unwrap();
//! wizard.set_text(TextField::DialectName, "Hindko");
//! wizard.select_vitality(VitalityStatus::Endangered);
//! assert!(matches!(wizard.submit().await, SubmitOutcome::Synced(_)));
//! # }
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::notify::{Notice, Notifier};
use crate::record::{DraftField, Province, SurveyDraft, SyncReceipt, TextField, VitalityStatus};
use crate::remote::SurveyStore;

/// A wizard step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Step {
    /// Step 1: who is reporting.
    #[default]
    Identity,
    /// Step 2: where the data was collected.
    Region,
    /// Step 3: dialect and vitality; submits instead of advancing.
    Linguistics,
}

impl Step {
    /// All steps in order.
    pub const ALL: [Self; 3] = [Self::Identity, Self::Region, Self::Linguistics];

    /// 1-based step number.
    #[must_use]
    pub fn number(self) -> u8 {
        match self {
            Self::Identity => 1,
            Self::Region => 2,
            Self::Linguistics => 3,
        }
    }

    /// Short sidebar label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Identity => "Identity",
            Self::Region => "Location",
            Self::Linguistics => "Linguistics",
        }
    }

    /// Heading shown above the step.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Identity => "Personnel Identity",
            Self::Region => "Region Mapping",
            Self::Linguistics => "Linguistic Data",
        }
    }

    /// One-line instruction under the heading.
    #[must_use]
    pub fn instruction(self) -> &'static str {
        match self {
            Self::Identity => "Enter your official identification for the national archive.",
            Self::Region => "Where was this linguistic data collected?",
            Self::Linguistics => "Define the dialect and its current status.",
        }
    }

    /// Fields that must be filled before leaving this step forward.
    #[must_use]
    pub fn required_fields(self) -> &'static [DraftField] {
        match self {
            Self::Identity => &[DraftField::Text(TextField::IdentityLabel)],
            Self::Region => &[DraftField::Region],
            Self::Linguistics => &[
                DraftField::Text(TextField::DialectName),
                DraftField::Vitality,
            ],
        }
    }

    /// Sidebar marker for this step while the wizard is on `current`.
    #[must_use]
    pub fn progress(self, current: Step) -> Progress {
        match self.cmp(&current) {
            std::cmp::Ordering::Less => Progress::Done,
            std::cmp::Ordering::Equal => Progress::Active,
            std::cmp::Ordering::Greater => Progress::Pending,
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Identity => Some(Self::Region),
            Self::Region => Some(Self::Linguistics),
            Self::Linguistics => None,
        }
    }

    fn previous(self) -> Option<Self> {
        match self {
            Self::Identity => None,
            Self::Region => Some(Self::Identity),
            Self::Linguistics => Some(Self::Region),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}. {}", self.number(), self.label())
    }
}

/// Sidebar marker for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// Already passed.
    Done,
    /// Currently shown.
    Active,
    /// Not reached yet.
    Pending,
}

/// Why a wizard action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StepRefusal {
    /// A required field on the current step is empty.
    #[error("{0} is required")]
    MissingField(DraftField),
    /// A submission is already waiting on the archive.
    #[error("a submission is already in flight")]
    InFlight,
    /// There is no step before the first.
    #[error("already on the first step")]
    AtFirstStep,
    /// The last step submits rather than advancing.
    #[error("the final step submits instead of continuing")]
    AtLastStep,
    /// Submission is only offered on the last step.
    #[error("submission is only available on the final step")]
    NotOnFinalStep,
}

/// Result of [`SurveyWizard::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SubmitOutcome {
    /// The archive accepted the survey; the wizard has been reset.
    Synced(SyncReceipt),
    /// The archive write failed; draft and step are untouched.
    Failed,
    /// Submission was refused locally; nothing was sent.
    Refused(StepRefusal),
}

/// Read-only view of the wizard for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardSnapshot {
    /// Current step.
    pub step: Step,
    /// Copy of the draft.
    pub draft: SurveyDraft,
    /// Whether a submission is waiting on the archive.
    pub in_flight: bool,
}

#[derive(Debug, Default)]
struct WizardState {
    step: Step,
    draft: SurveyDraft,
    in_flight: bool,
}

impl WizardState {
    fn check_advance(&self) -> Result<Step, StepRefusal> {
        let next = self.step.next().ok_or(StepRefusal::AtLastStep)?;
        match self.draft.first_missing(self.step.required_fields()) {
            Some(field) => Err(StepRefusal::MissingField(field)),
            None => Ok(next),
        }
    }

    fn check_retreat(&self) -> Result<Step, StepRefusal> {
        if self.in_flight {
            return Err(StepRefusal::InFlight);
        }
        self.step.previous().ok_or(StepRefusal::AtFirstStep)
    }

    fn check_submit(&self) -> Result<(), StepRefusal> {
        if self.step != Step::Linguistics {
            return Err(StepRefusal::NotOnFinalStep);
        }
        if self.in_flight {
            return Err(StepRefusal::InFlight);
        }
        // Earlier steps' fields can still be edited from the final step.
        if self.draft.is_complete() {
            return Ok(());
        }
        match self.draft.first_missing(&DraftField::ALL) {
            Some(field) => Err(StepRefusal::MissingField(field)),
            None => Ok(()),
        }
    }
}

/// Clears the in-flight flag when the submission ends, however it ends.
struct InFlight<'a>(&'a Mutex<WizardState>);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight = false;
    }
}

/// Three-step survey form over one draft record.
///
/// All methods take `&self`; the state lock is never held across an await,
/// so a second `submit` racing the first observes the in-flight flag.
pub struct SurveyWizard {
    store: Arc<dyn SurveyStore>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<WizardState>,
}

impl fmt::Debug for SurveyWizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SurveyWizard")
            .field("state", &self.lock())
            .finish_non_exhaustive()
    }
}

impl SurveyWizard {
    /// Create a wizard on step 1 with an empty draft.
    #[must_use]
    pub fn new(store: Arc<dyn SurveyStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            state: Mutex::new(WizardState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WizardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current step.
    #[must_use]
    pub fn step(&self) -> Step {
        self.lock().step
    }

    /// Copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> WizardSnapshot {
        let state = self.lock();
        WizardSnapshot {
            step: state.step,
            draft: state.draft.clone(),
            in_flight: state.in_flight,
        }
    }

    /// Overwrite a free-text field.
    pub fn set_text(&self, field: TextField, value: impl Into<String>) {
        self.lock().draft.set_text(field, value);
    }

    /// Select the province, replacing any previous choice.
    pub fn select_region(&self, province: Province) {
        self.lock().draft.region = Some(province);
    }

    /// Select the vitality status, replacing any previous choice.
    pub fn select_vitality(&self, status: VitalityStatus) {
        self.lock().draft.vitality = Some(status);
    }

    /// Whether the continue control is enabled.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.lock().check_advance().is_ok()
    }

    /// Whether the back control is enabled.
    #[must_use]
    pub fn can_retreat(&self) -> bool {
        self.lock().check_retreat().is_ok()
    }

    /// Whether the submit control is enabled.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.lock().check_submit().is_ok()
    }

    /// Move to the next step.
    ///
    /// # Errors
    ///
    /// Refused when a required field of the current step is empty or the
    /// wizard is already on the last step.
    pub fn advance(&self) -> Result<Step, StepRefusal> {
        let mut state = self.lock();
        let next = state.check_advance()?;
        debug!("Wizard advancing {} -> {}", state.step, next);
        state.step = next;
        Ok(next)
    }

    /// Move to the previous step.
    ///
    /// # Errors
    ///
    /// Refused on the first step and while a submission is in flight.
    pub fn retreat(&self) -> Result<Step, StepRefusal> {
        let mut state = self.lock();
        let previous = state.check_retreat()?;
        debug!("Wizard retreating {} -> {}", state.step, previous);
        state.step = previous;
        Ok(previous)
    }

    /// Send the draft to the archive.
    ///
    /// Exactly one append is issued per accepted call. On success the user
    /// is notified and the wizard returns to step 1 with an empty draft; on
    /// failure the user is notified and nothing else changes. A refused call
    /// neither contacts the archive nor notifies.
    pub async fn submit(&self) -> SubmitOutcome {
        let (draft, guard) = {
            let mut state = self.lock();
            if let Err(refusal) = state.check_submit() {
                debug!("Submission refused: {refusal}");
                return SubmitOutcome::Refused(refusal);
            }
            state.in_flight = true;
            (state.draft.clone(), InFlight(&self.state))
        };

        match self.store.append(&draft).await {
            Ok(receipt) => {
                info!("Survey archived as {}", receipt.document_id);
                {
                    let mut state = self.lock();
                    state.draft = SurveyDraft::default();
                    state.step = Step::Identity;
                }
                drop(guard);
                self.notifier.notify(Notice::SyncSucceeded);
                SubmitOutcome::Synced(receipt)
            }
            Err(e) => {
                warn!("Survey sync failed: {e}");
                drop(guard);
                self.notifier.notify(Notice::SyncFailed);
                SubmitOutcome::Failed
            }
        }
    }
}
