//! Config validation command implementation.

use super::CliError;
use bastion::config::GameConfig;
use bastion::GameState;
use std::fs;
use std::path::Path;

/// Execute the validate command.
///
/// # Errors
///
/// Returns an error if the file cannot be read or any check fails.
pub(crate) fn execute(path: &Path) -> Result<(), CliError> {
    let text = fs::read_to_string(path)
        .map_err(|e| CliError::new(format!("Failed to read {}: {e}", path.display())))?;

    println!("Validating: {}", path.display());
    println!();

    let config = match GameConfig::from_toml_str(&text) {
        Ok(config) => {
            print_check("TOML syntax and schema", true);
            config
        }
        Err(e) => {
            print_check("TOML syntax and schema", false);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        print_check("Configuration values", false);
        return Err(e.into());
    }
    print_check("Configuration values", true);

    let state = match GameState::new(&config) {
        Ok(state) => {
            print_check("Board generation", true);
            state
        }
        Err(e) => {
            print_check("Board generation", false);
            return Err(e.into());
        }
    };

    let catalog = state.catalog();
    println!();
    println!("Summary:");
    println!("  Board:        {}x{}", config.board.width, config.board.height);
    println!("  Catalog:      {} template(s)", catalog.len());
    for player in state.players() {
        let names: Vec<&str> = player
            .roster
            .iter()
            .filter_map(|&id| catalog.get(id))
            .map(|t| t.name.as_str())
            .collect();
        let seat = if player.is_ai { "AI" } else { "human" };
        println!(
            "  Player {}:     castle {}, {seat}, roster [{}]",
            player.id,
            player.castle,
            names.join(", ")
        );
    }
    println!(
        "  Rules:        {} hp, {} MP per roll, {} units max",
        config.rules.starting_hp, config.rules.move_points_per_roll, config.rules.max_units_per_player
    );
    println!("  Turn cap:     {}", config.max_turns);

    println!();
    println!("Validation successful!");

    Ok(())
}

fn print_check(name: &str, ok: bool) {
    let status = if ok { "OK" } else { "FAILED" };
    let symbol = if ok { "✓" } else { "✗" };
    println!("  {symbol} {name}: {status}");
}
