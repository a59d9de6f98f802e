//! Output formatting utilities for CLI.

use bastion::render::player_name;
use bastion::session::MatchResult;
use std::fmt::Write as _;

/// Format a match result as human-readable text.
pub(super) fn format_text(result: &MatchResult) -> String {
    let mut output = String::new();

    output.push_str("Match Result\n");
    match result.winner {
        Some(winner) => {
            let _ = writeln!(output, "  Winner: Player {winner} ({})", player_name(winner));
        }
        None => output.push_str("  Winner: Draw (turn cap reached)\n"),
    }
    let _ = writeln!(output, "  Turns: {}", result.turns_played);
    let _ = writeln!(output, "  Commands: {}\n", result.commands_applied);

    for player in &result.players {
        let _ = write!(
            output,
            "  Player {} ({}): castle hp {}, {} unit(s) on board",
            player.player_id,
            player_name(player.player_id),
            player.hp,
            player.units
        );
        if player.hp == 0 {
            output.push_str(" [castle fallen]");
        }
        output.push('\n');
    }

    output
}

/// Format a match result as pretty JSON.
pub(super) fn format_json(result: &MatchResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(result)
}
