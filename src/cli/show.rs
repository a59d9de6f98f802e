//! Show command implementation.

use super::CliError;
use bastion::render::{render_ascii, render_summary};
use bastion::snapshot;
use std::path::Path;

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the snapshot cannot be loaded.
pub(crate) fn execute(path: &Path, summary: bool, plain: bool) -> Result<(), CliError> {
    let state = snapshot::load(path)?;
    if summary {
        print!("{}", render_summary(&state));
    } else {
        print!("{}", render_ascii(&state, !plain));
    }
    Ok(())
}
