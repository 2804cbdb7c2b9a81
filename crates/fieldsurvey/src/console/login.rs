//! Console driver for the authentication screen.

use std::io::{BufRead, Write};
use std::str::FromStr;

use super::{split_command, Console, ParseCommandError};
use crate::auth::{AuthOutcome, AuthScreen, AuthState, AuthView};
use crate::error::Result;

/// One line of authentication input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthCommand {
    /// Set the official email.
    Email(String),
    /// Set the security key.
    Key(String),
    /// Submit the current sub-view's form.
    Submit,
    /// Switch to the reset-request view.
    Forgot,
    /// Switch back to sign-in.
    Back,
    /// Show the command list.
    Help,
    /// Leave the screen.
    Quit,
}

impl FromStr for AuthCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> std::result::Result<Self, Self::Err> {
        let (word, rest) = split_command(line);
        let command = match word.as_str() {
            "email" | "id" => Self::Email(rest.to_string()),
            "key" | "password" => Self::Key(rest.to_string()),
            "verify" | "send" | "submit" => Self::Submit,
            "forgot" => Self::Forgot,
            "back" => Self::Back,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => return Err(ParseCommandError::unknown(line.trim())),
        };
        Ok(command)
    }
}

const HELP: &str = "\
Commands:
  email <address>   official email (researcher id)
  key <secret>      security key                 (sign-in only)
  verify            VERIFY IDENTITY / SEND RESET LINK
  forgot            forgot security key?
  back              back to login
  quit              leave";

fn render<W: Write>(out: &mut W, screen: &AuthScreen) -> Result<()> {
    let view = screen.view();
    writeln!(out)?;
    writeln!(out, "ISLAMIC REPUBLIC OF PAKISTAN")?;
    writeln!(out, "{}", view.subtitle())?;
    match view {
        AuthView::SignIn => {
            writeln!(out, "  Official Email (Researcher ID): {}", screen.identifier())?;
            writeln!(out, "  <verify>  (forgot security key? type 'forgot')")?;
        }
        AuthView::ResetRequest => {
            writeln!(
                out,
                "  Enter your official email to receive a secure password reset link."
            )?;
            writeln!(out, "  Verify Researcher ID (Email): {}", screen.identifier())?;
            writeln!(out, "  <send>  (type 'back' to return to login)")?;
        }
    }
    Ok(())
}

/// Run the authentication screen until sign-in succeeds, the user quits,
/// or input ends. Returns whether the host is now authenticated.
///
/// # Errors
///
/// Returns an error if the console streams fail.
pub async fn run_login<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    screen: &AuthScreen,
    auth: &AuthState,
) -> Result<bool> {
    writeln!(console.out(), "Type 'help' for commands.")?;

    while !auth.is_authenticated() {
        render(console.out(), screen)?;
        let Some(line) = console.read_line("login> ")? else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<AuthCommand>() {
            Ok(command) => command,
            Err(e) => {
                writeln!(console.out(), "{e}")?;
                continue;
            }
        };

        match command {
            AuthCommand::Email(email) => screen.set_identifier(email),
            AuthCommand::Key(key) => screen.set_secret(key),
            AuthCommand::Forgot => screen.show_reset(),
            AuthCommand::Back => screen.show_sign_in(),
            AuthCommand::Help => writeln!(console.out(), "{HELP}")?,
            AuthCommand::Quit => break,
            AuthCommand::Submit => {
                let outcome = match screen.view() {
                    AuthView::SignIn => screen.sign_in().await,
                    AuthView::ResetRequest => screen.request_reset().await,
                };
                match outcome {
                    AuthOutcome::Authenticated => {
                        writeln!(console.out(), "Identity verified.")?;
                    }
                    AuthOutcome::Refused(refusal) => {
                        writeln!(console.out(), "Please fix the form: {refusal}")?;
                    }
                    AuthOutcome::Denied | AuthOutcome::ResetSent | AuthOutcome::ResetFailed => {}
                }
            }
        }
    }

    Ok(auth.is_authenticated())
}
