use std::ffi::OsString;
use std::io::Write;

use anyhow::Result;
use colored::Colorize;

use crate::checks::Advisory;

pub fn write_advisory<W: Write>(out: &mut W, advisory: &Advisory) -> Result<()> {
    writeln!(out, "{}", advisory.headline.red().bold())?;
    for file in &advisory.files {
        writeln!(out, "{}", file.red())?;
    }
    Ok(())
}

pub fn write_success<W: Write>(out: &mut W) -> Result<()> {
    writeln!(out, "{}", "*** Preflight checks passed".green().bold())?;
    Ok(())
}

pub fn write_fatal<W: Write>(out: &mut W, message: &str) -> Result<()> {
    writeln!(out, "{}", message.red().bold())?;
    writeln!(out, "Aborting.")?;
    Ok(())
}

/// Color decision for a stream other than stdout, which `colored` does not
/// inspect on its own. `NO_COLOR` wins over `CLICOLOR_FORCE`.
pub fn should_colorize(
    is_terminal: bool,
    no_color: Option<OsString>,
    force: Option<OsString>,
) -> bool {
    if no_color.is_some_and(|v| !v.is_empty()) {
        return false;
    }
    if force.is_some_and(|v| v != "0") {
        return true;
    }
    is_terminal
}
