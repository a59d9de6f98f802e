//! Run command implementation.

use super::output::{format_json, format_text};
use super::{load_config, CliError, OutputFormat};
use bastion::config::GameMode;
use bastion::render::render_ascii;
use bastion::session::run_match_with_state;
use bastion::snapshot;
use std::path::PathBuf;

/// Execute the run command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the match fails to run.
pub(crate) fn execute(
    config: Option<PathBuf>,
    max_turns: Option<u32>,
    format: OutputFormat,
    save: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if let Some(turns) = max_turns {
        config.max_turns = turns;
    }
    config.apply_mode(GameMode::AiVsAi);

    let text = format == OutputFormat::Text;
    if text && !quiet {
        println!(
            "Running {}x{} match, up to {} turns...",
            config.board.width, config.board.height, config.max_turns
        );
        println!();
    }

    let (result, state) = run_match_with_state(&config)?;

    if let Some(save_path) = save {
        snapshot::save(&state, &save_path)?;
        if text && !quiet {
            println!("Snapshot saved to: {}", save_path.display());
            println!();
        }
    }

    match format {
        OutputFormat::Text => {
            if !quiet {
                println!("{}", render_ascii(&state, false));
            }
            print!("{}", format_text(&result));
        }
        OutputFormat::Json => {
            let json = format_json(&result)
                .map_err(|e| CliError::new(format!("JSON serialization failed: {e}")))?;
            println!("{json}");
        }
    }

    Ok(())
}
