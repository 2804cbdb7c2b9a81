//! Console rendering of the landing screen and the archive overview.

use std::io::{BufRead, Write};

use super::Console;
use crate::error::Result;
use crate::landing::{Landing, LandingAction, Route, STATS};

fn render_stats<W: Write>(out: &mut W) -> Result<()> {
    let stats: Vec<String> = STATS
        .iter()
        .map(|s| format!("{} {}", s.value, s.label))
        .collect();
    writeln!(out, "  {}", stats.join("  |  "))?;
    Ok(())
}

/// Play the caption reveal, then ask where to go. `None` means the user
/// left (or input ended).
///
/// # Errors
///
/// Returns an error if the console streams fail.
pub async fn run_home<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    landing: &Landing,
) -> Result<Option<Route>> {
    let out = console.out();
    writeln!(out, "Digital Archive 2025")?;
    writeln!(out, "Geolinguistic Survey of Pakistan")?;
    writeln!(out)?;

    let mut frames = landing.typewriter().subscribe();
    loop {
        let frame = frames.borrow_and_update().clone();
        write!(out, "\r{}|", frame.text)?;
        out.flush()?;
        if frame.complete || frames.changed().await.is_err() {
            break;
        }
    }
    writeln!(out)?;
    writeln!(out)?;
    render_stats(out)?;

    loop {
        writeln!(console.out(), "\n  1) EXPLORE ARCHIVE   2) START SURVEY   q) quit")?;
        let Some(line) = console.read_line("home> ")? else {
            return Ok(None);
        };
        let action = match line.trim().to_ascii_lowercase().as_str() {
            "1" | "explore" | "archive" => LandingAction::ExploreArchive,
            "2" | "start" | "survey" => LandingAction::StartSurvey,
            "q" | "quit" | "exit" => return Ok(None),
            _ => continue,
        };
        return Ok(Some(landing.navigate(action)));
    }
}

/// Print the archive overview shown to signed-in users.
///
/// # Errors
///
/// Returns an error if the output stream fails.
pub fn render_archive<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "National Linguistic Archive")?;
    writeln!(out, "Survey records collected in the field are synced here.")?;
    render_stats(out)?;
    Ok(())
}
