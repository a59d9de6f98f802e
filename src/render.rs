//! Text rendering of a game for terminals and logs.
//!
//! Two views are provided: [`render_ascii`] draws the board as a grid,
//! optionally with ANSI colors, and [`render_summary`] lists castles and
//! units in a line-oriented form that is easy to diff and grep.

use std::fmt::{self, Write as _};

use crate::game::{Coord, GameState, Phase, PlayerId, Terrain, Tile};

const PLAYER_COLORS: [&str; 2] = [
    "\x1b[31m", // Player 1: Red
    "\x1b[34m", // Player 2: Blue
];

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const WHITE: &str = "\x1b[37m";
const GRAY: &str = "\x1b[90m";

const PLAYER_NAMES: [&str; 2] = ["Red", "Blue"];

/// Legend printed under the grid.
pub const LEGEND: &str =
    "Legend: C=Castle  M=Mountain  .=Path  ,=Plain  ~=Wasteland  #=Claimed  1-9=Unit power  Subscript=Owner";

/// Render the board as a bordered grid.
///
/// ```text
/// Turn 4  Player 1 (Red)  ACTION_PHASE
/// ┌───────────────────────────┐
/// │ .  ,  ,  ,  C₂ ,  ,  ,  . │
/// │ .  ,  M  ,  3₂ ,  ,  ,  . │
/// ...
/// └───────────────────────────┘
/// ```
#[must_use]
pub fn render_ascii(state: &GameState, color: bool) -> String {
    BoardView { state, color }.to_string()
}

/// Render castles, units and turn resources as plain lines.
#[must_use]
pub fn render_summary(state: &GameState) -> String {
    Summary(state).to_string()
}

struct BoardView<'a> {
    state: &'a GameState,
    color: bool,
}

impl BoardView<'_> {
    fn paint(&self, f: &mut fmt::Formatter<'_>, code: &str, text: &str) -> fmt::Result {
        if self.color {
            write!(f, "{code}{text}{RESET}")
        } else {
            f.write_str(text)
        }
    }

    fn header(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state;
        let current = state.current_player_id();
        write!(f, "Turn {}  ", state.turn_number())?;
        self.paint(
            f,
            player_color(current),
            &format!("Player {current} ({})", player_name(current)),
        )?;
        write!(f, "  {}", state.phase())?;
        if state.turn().move_points > 0 {
            write!(f, "  MP {}", state.turn().move_points)?;
        }
        if let Some(winner) = state.winner() {
            write!(f, "  winner: P{winner}")?;
        }
        writeln!(f)
    }

    fn grid(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.state.board();
        let inner = usize::from(board.width()) * 3 + 1;

        writeln!(f, "┌{}┐", "─".repeat(inner))?;
        for y in 0..board.height() {
            f.write_str("│ ")?;
            for x in 0..board.width() {
                let coord = Coord::new(x, y);
                match board.get(coord) {
                    Some(tile) => self.cell(f, coord, tile)?,
                    None => f.write_str("? ")?,
                }
                f.write_char(' ')?;
            }
            writeln!(f, "│")?;
        }
        writeln!(f, "└{}┘", "─".repeat(inner))
    }

    fn cell(&self, f: &mut fmt::Formatter<'_>, coord: Coord, tile: &Tile) -> fmt::Result {
        let castle_of = castle_at(self.state, coord);
        let owner = tile.owner.or(castle_of);
        let text = format!("{}{}", glyph(self.state, coord, tile), owner.map_or(" ", owner_subscript));
        match owner {
            Some(p) if tile.is_occupied() || castle_of.is_some() => {
                self.paint(f, &format!("{BOLD}{}", player_color(p)), &text)
            }
            Some(p) => self.paint(f, player_color(p), &text),
            None if tile.terrain == Terrain::Mountain => self.paint(f, WHITE, &text),
            None => self.paint(f, GRAY, &text),
        }
    }

    fn players(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let board = self.state.board();
        for player in self.state.players() {
            let seat = if player.is_ai { "AI" } else { "human" };
            self.paint(
                f,
                player_color(player.id),
                &format!("Player {} ({:>4}, {seat})", player.id, player_name(player.id)),
            )?;
            writeln!(
                f,
                ":  castle {}  hp {:<2}  units {:<2}  tiles {}",
                player.castle,
                player.hp,
                board.count_units(player.id),
                board.tiles_owned_by(player.id).count()
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for BoardView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.header(f)?;
        self.grid(f)?;
        writeln!(f)?;
        writeln!(f, "{LEGEND}")?;
        writeln!(f)?;
        self.players(f)
    }
}

struct Summary<'a>(&'a GameState);

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let board = state.board();
        writeln!(
            f,
            "=== TURN {} / PLAYER {} / {} ===",
            state.turn_number(),
            state.current_player_id(),
            state.phase()
        )?;
        writeln!(f, "BOARD {}x{}", board.width(), board.height())?;

        for player in state.players() {
            writeln!(f)?;
            writeln!(f, "PLAYER {} STATUS:", player.id)?;
            writeln!(f, "- Castle at {} with {} hp", player.castle, player.hp)?;
            writeln!(f, "- Tiles: {}", board.tiles_owned_by(player.id).count())?;
            let units: Vec<_> = board.units_of(player.id).collect();
            writeln!(f, "- Units: {}", units.len())?;
            for (at, unit) in units {
                write!(f, "  - {} at {}: POW {}/{}", unit.name, at, unit.power, unit.base_power)?;
                if unit.is_wounded() {
                    f.write_str(", wounded")?;
                }
                if player.id == state.current_player_id() && state.phase() == Phase::Action {
                    write!(f, ", PA {}", state.remaining_pa(at))?;
                    if state.has_acted(at) {
                        f.write_str(", done")?;
                    }
                }
                writeln!(f)?;
            }
        }

        let turn = state.turn();
        if turn.move_points > 0 || turn.selected_template.is_some() || turn.selected_unit.is_some() {
            writeln!(f)?;
            writeln!(f, "TURN:")?;
            writeln!(f, "- Move points: {}", turn.move_points)?;
            if let Some(template) = turn.selected_template {
                writeln!(f, "- Selected template: {template}")?;
            }
            if let Some(at) = turn.selected_unit {
                writeln!(f, "- Selected unit: {at}")?;
            }
        }
        Ok(())
    }
}

/// Owner of the castle standing on `coord`, if any.
#[must_use]
pub fn castle_at(state: &GameState, coord: Coord) -> Option<PlayerId> {
    state.players().iter().find(|p| p.castle == coord).map(|p| p.id)
}

/// Single-character picture of a tile: unit power first, then castle,
/// claimed ground and finally bare terrain.
#[must_use]
pub fn glyph(state: &GameState, coord: Coord, tile: &Tile) -> char {
    if let Some(unit) = tile.unit() {
        power_char(unit.power)
    } else if castle_at(state, coord).is_some() {
        'C'
    } else if tile.unfolded {
        '#'
    } else {
        terrain_char(tile.terrain)
    }
}

fn terrain_char(terrain: Terrain) -> char {
    match terrain {
        Terrain::Normal => '.',
        Terrain::Forest => ',',
        Terrain::Mountain => 'M',
        Terrain::Wasteland => '~',
    }
}

fn power_char(power: u32) -> char {
    match power {
        1..=9 => char::from_digit(power, 10).unwrap_or('+'),
        _ => '+',
    }
}

fn owner_subscript(owner: PlayerId) -> &'static str {
    match owner {
        1 => "₁",
        2 => "₂",
        _ => "?",
    }
}

fn player_color(player_id: PlayerId) -> &'static str {
    let idx = usize::from(player_id).saturating_sub(1);
    PLAYER_COLORS.get(idx).copied().unwrap_or(WHITE)
}

/// Display name of a player's color.
#[must_use]
pub fn player_name(player_id: PlayerId) -> &'static str {
    let idx = usize::from(player_id).saturating_sub(1);
    PLAYER_NAMES.get(idx).copied().unwrap_or("Unknown")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::game::Command;

    fn game() -> GameState {
        GameState::new(&GameConfig::default()).unwrap()
    }

    #[test]
    fn test_render_ascii_plain() {
        let output = render_ascii(&game(), false);
        assert!(output.starts_with("Turn 0  Player 1 (Red)  ROLL_PHASE"));
        assert!(output.contains("┌"));
        assert!(output.contains("┘"));
        assert!(output.contains("Legend"));
        assert!(output.contains("Player 1 ( Red, human)"));
        assert!(!output.contains('\x1b'));

        // Row 8 holds player 1's castle in the middle of a path row.
        let row = output.lines().nth(2 + 8).unwrap();
        assert_eq!(row, "│ .  .  .  .  C₁ .  .  .  .  │");
        // Mountain on row 6.
        assert!(output.lines().nth(2 + 6).unwrap().contains("M "));
    }

    #[test]
    fn test_render_ascii_colored() {
        let output = render_ascii(&game(), true);
        assert!(output.contains("\x1b[31m"));
        assert!(output.contains(RESET));
    }

    #[test]
    fn test_units_show_power() {
        let mut game = game();
        game.apply(Command::Roll).unwrap();
        game.apply(Command::Summon {
            template: 1,
            at: Coord::new(4, 8),
        })
        .unwrap();
        let output = render_ascii(&game, false);
        let row = output.lines().nth(2 + 8).unwrap();
        assert!(row.contains("3₁"));
        assert!(output.contains("MP 2"));
    }

    #[test]
    fn test_summary_lists_units() {
        let mut game = game();
        game.apply(Command::Roll).unwrap();
        game.apply(Command::Summon {
            template: 1,
            at: Coord::new(4, 8),
        })
        .unwrap();
        game.apply(Command::StartActionPhase).unwrap();
        let output = render_summary(&game);
        assert!(output.starts_with("=== TURN 0 / PLAYER 1 / ACTION_PHASE ==="));
        assert!(output.contains("- Castle at (4, 8) with 3 hp"));
        assert!(output.contains("Beast Warrior at (4, 8): POW 3/3, PA 3"));
    }

    #[test]
    fn test_summary_marks_wounded_units() {
        let mut game = game();
        game.apply(Command::Roll).unwrap();
        game.apply(Command::Summon {
            template: 1,
            at: Coord::new(4, 8),
        })
        .unwrap();
        assert!(!render_summary(&game).contains("wounded"));

        if let Some(unit) = game.board_mut().get_mut(Coord::new(4, 8)).and_then(Tile::unit_mut) {
            unit.take_damage(2);
        }
        assert!(render_summary(&game).contains("Beast Warrior at (4, 8): POW 1/3, wounded"));
    }

    #[test]
    fn test_power_char() {
        assert_eq!(power_char(1), '1');
        assert_eq!(power_char(9), '9');
        assert_eq!(power_char(10), '+');
    }
}
