//! Console driver for the survey wizard.

use std::io::{BufRead, Write};
use std::str::FromStr;

use super::{split_command, Console, ParseCommandError};
use crate::error::Result;
use crate::record::{Province, TextField, VitalityStatus};
use crate::wizard::{Progress, Step, SubmitOutcome, SurveyWizard, WizardSnapshot};

/// One line of wizard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardCommand {
    /// Overwrite a text field.
    SetText(TextField, String),
    /// Pick a province tile.
    Region(Province),
    /// Pick a vitality status.
    Vitality(VitalityStatus),
    /// Continue to the next step.
    Next,
    /// Go back one step.
    Back,
    /// Sync the draft to the archive.
    Submit,
    /// Show the command list.
    Help,
    /// Leave the wizard.
    Quit,
}

impl FromStr for WizardCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let (word, rest) = split_command(line);
        let command = match word.as_str() {
            "name" | "id" => Self::SetText(TextField::IdentityLabel, rest.to_string()),
            "dialect" => Self::SetText(TextField::DialectName, rest.to_string()),
            "region" | "province" => {
                Self::Region(rest.parse().map_err(|e| ParseCommandError(format!("{e}")))?)
            }
            "vitality" | "status" => {
                Self::Vitality(rest.parse().map_err(|e| ParseCommandError(format!("{e}")))?)
            }
            "next" | "continue" => Self::Next,
            "back" => Self::Back,
            "submit" | "sync" => Self::Submit,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(ParseCommandError::unknown(line.trim())),
        };
        Ok(command)
    }
}

const HELP: &str = "\
Commands:
  name <text>          set your full name / id         (step 1)
  region <province>    Punjab, Sindh, KPK, Balochistan, GB, Kashmir (step 2)
  dialect <text>       set the dialect name            (step 3)
  vitality <status>    Growing, Stable, Endangered     (step 3)
  next | back          move between steps
  submit               sync to the archive             (step 3)
  quit                 leave the survey";

fn render<W: Write>(out: &mut W, wizard: &SurveyWizard, snapshot: &WizardSnapshot) -> Result<()> {
    writeln!(out)?;
    let sidebar: Vec<String> = Step::ALL
        .iter()
        .map(|s| {
            let marker = match s.progress(snapshot.step) {
                Progress::Done => "✓",
                Progress::Active => ">",
                Progress::Pending => " ",
            };
            format!("[{marker}] {s}")
        })
        .collect();
    writeln!(out, "Field Portal v1.0   {}", sidebar.join("   "))?;
    writeln!(out, "== {} ==", snapshot.step.title())?;
    writeln!(out, "{}", snapshot.step.instruction())?;

    let draft = &snapshot.draft;
    match snapshot.step {
        Step::Identity => {
            writeln!(out, "  Full Name / ID: {}", draft.identity_label)?;
        }
        Step::Region => {
            let tiles: Vec<String> = Province::ALL
                .iter()
                .map(|p| {
                    if draft.region == Some(*p) {
                        format!("[{p}]")
                    } else {
                        p.to_string()
                    }
                })
                .collect();
            writeln!(out, "  Province: {}", tiles.join("  "))?;
        }
        Step::Linguistics => {
            writeln!(out, "  Dialect Name: {}", draft.dialect_name)?;
            let radios: Vec<String> = VitalityStatus::ALL
                .iter()
                .map(|v| {
                    let dot = if draft.vitality == Some(*v) { "●" } else { "○" };
                    format!("{dot} {v}")
                })
                .collect();
            writeln!(out, "  Vitality Status: {}", radios.join("  "))?;
        }
    }

    let mut controls = Vec::new();
    if snapshot.step != Step::Identity {
        controls.push(control("back", wizard.can_retreat()));
    }
    if snapshot.step == Step::Linguistics {
        let label = if snapshot.in_flight {
            "SYNCING..."
        } else {
            "submit"
        };
        controls.push(control(label, wizard.can_submit()));
    } else {
        controls.push(control("next", wizard.can_advance()));
    }
    writeln!(out, "  {}", controls.join("  "))?;
    Ok(())
}

fn control(label: &str, enabled: bool) -> String {
    if enabled {
        format!("<{label}>")
    } else {
        format!("({label}: disabled)")
    }
}

/// Run the wizard until the user quits or input ends.
///
/// # Errors
///
/// Returns an error if the console streams fail.
pub async fn run_survey<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    wizard: &SurveyWizard,
) -> Result<()> {
    writeln!(console.out(), "Type 'help' for commands.")?;

    loop {
        render(console.out(), wizard, &wizard.snapshot())?;
        let Some(line) = console.read_line("survey> ")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<WizardCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(console.out(), "{e}")?;
                continue;
            }
        };

        match command {
            WizardCommand::SetText(field, value) => wizard.set_text(field, value),
            WizardCommand::Region(province) => wizard.select_region(province),
            WizardCommand::Vitality(status) => wizard.select_vitality(status),
            WizardCommand::Next => {
                if let Err(refusal) = wizard.advance() {
                    writeln!(console.out(), "Continue is disabled: {refusal}")?;
                }
            }
            WizardCommand::Back => {
                if let Err(refusal) = wizard.retreat() {
                    writeln!(console.out(), "Back is disabled: {refusal}")?;
                }
            }
            WizardCommand::Submit => {
                if wizard.can_submit() {
                    writeln!(console.out(), "SYNCING...")?;
                    console.out().flush()?;
                }
                match wizard.submit().await {
                    SubmitOutcome::Synced(receipt) => {
                        writeln!(console.out(), "Archived as {}", receipt.document_id)?;
                    }
                    SubmitOutcome::Failed => {}
                    SubmitOutcome::Refused(refusal) => {
                        writeln!(console.out(), "Sync is disabled: {refusal}")?;
                    }
                }
            }
            WizardCommand::Help => writeln!(console.out(), "{HELP}")?,
            WizardCommand::Quit => break,
        }
    }
    Ok(())
}
