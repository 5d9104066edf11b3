use anyhow::Result;
use crossterm::style::{Color, Stylize};
use std::io::{self, IsTerminal, Write};

use crate::tracker::Story;

/// Line printed once a story exists on the remote side
pub fn created_message(story: &Story) -> String {
    format!("Story created: {}", story.id)
}

pub fn render_story_created(story: &Story) -> Result<()> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{}", created_message(story))?;
    stdout.flush()?;
    Ok(())
}

/// Non-fatal problem: the run continues
pub fn render_warning(message: &str) -> Result<()> {
    let stderr = io::stderr();
    let color = stderr.is_terminal();
    write_warning(&mut stderr.lock(), message, color)
}

/// Yellow only when writing to a terminal; piped output stays plain.
fn write_warning(out: &mut impl Write, message: &str, color: bool) -> Result<()> {
    for line in message.lines() {
        if color {
            writeln!(out, "{}", line.with(Color::Yellow))?;
        } else {
            writeln!(out, "{}", line)?;
        }
    }
    out.flush()?;
    Ok(())
}
