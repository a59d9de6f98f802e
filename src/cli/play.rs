//! Play command implementation - interactive TUI.

// Terminal geometry is u16 throughout; board sizes are capped well below it.
#![allow(
    clippy::needless_pass_by_value,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]

use super::{load_config, CliError, ModeArg};
use bastion::config::GameMode;
use bastion::game::{
    advance_command, command_for_click, highlights, selection_view, unit_view, Command, Coord,
    GameState, Highlights, Phase, PlayerId,
};
use bastion::opponent::OpponentDriver;
use bastion::render::{castle_at, glyph, player_name};
use bastion::snapshot;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use std::collections::VecDeque;
use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Event log lines kept for the log panel.
const LOG_CAPACITY: usize = 200;

/// Snapshot written by `s` when the game was not resumed from a file.
const DEFAULT_SAVE: &str = "bastion-save.json";

/// Execute the play command.
///
/// # Errors
///
/// Returns an error if the configuration or snapshot is invalid, or the TUI fails.
pub(crate) fn execute(
    mode: ModeArg,
    config: Option<PathBuf>,
    width: Option<u16>,
    height: Option<u16>,
    speed: Option<u64>,
    resume: Option<PathBuf>,
) -> Result<(), CliError> {
    let mut config = load_config(config.as_deref())?;
    if let Some(width) = width {
        config.board.width = width;
    }
    if let Some(height) = height {
        config.board.height = height;
    }
    if let Some(ms) = speed {
        config.opponent.action_delay_ms = ms;
    }
    let mode = GameMode::from(mode);
    config.apply_mode(mode);

    let state = match &resume {
        Some(path) => {
            let mut state = snapshot::load(path)?;
            state.assign_seats(mode);
            state
        }
        None => GameState::new(&config)?,
    };
    info!(?mode, "interactive game started");

    let save_path = resume.unwrap_or_else(|| PathBuf::from(DEFAULT_SAVE));
    let app = App::new(state, OpponentDriver::new(config.opponent), mode, save_path);
    run_tui(app)
}

/// App state for the TUI.
struct App {
    state: GameState,
    driver: OpponentDriver,
    mode: GameMode,
    cursor: Coord,
    log: VecDeque<String>,
    status: Option<String>,
    save_path: PathBuf,
}

impl App {
    fn new(state: GameState, driver: OpponentDriver, mode: GameMode, save_path: PathBuf) -> Self {
        let cursor = state.current_player().castle;
        let mut app = Self {
            state,
            driver,
            mode,
            cursor,
            log: VecDeque::new(),
            status: None,
            save_path,
        };
        app.collect_events();
        app
    }

    fn human_turn(&self) -> bool {
        !self.state.is_game_over() && !self.state.current_player().is_ai
    }

    fn issue(&mut self, command: Command) {
        if !self.human_turn() {
            return;
        }
        self.status = match self.state.apply(command) {
            Ok(()) => None,
            Err(rejection) => Some(format!("{command}: {rejection}")),
        };
        self.collect_events();
    }

    fn click(&mut self) {
        if let Some(command) = command_for_click(&self.state, self.cursor) {
            self.issue(command);
        }
    }

    /// Pick the `slot`-th template (1-based) of the current roster.
    fn pick_template(&mut self, slot: usize) {
        let Some(&template) = slot
            .checked_sub(1)
            .and_then(|idx| self.state.current_player().roster.get(idx))
        else {
            return;
        };
        self.issue(Command::SelectTemplate {
            template: Some(template),
        });
    }

    fn hold(&mut self) {
        if let Some(at) = self.state.turn().selected_unit {
            self.issue(Command::Hold { at });
        }
    }

    fn advance(&mut self) {
        if let Some(command) = advance_command(self.state.phase()) {
            self.issue(command);
        }
    }

    fn deselect(&mut self) {
        match self.state.phase() {
            Phase::Build if self.state.turn().selected_template.is_some() => {
                self.issue(Command::SelectTemplate { template: None });
            }
            Phase::Action if self.state.turn().selected_unit.is_some() => {
                self.issue(Command::Select { at: None });
            }
            _ => {}
        }
    }

    fn move_cursor(&mut self, dx: i32, dy: i32) {
        let board = self.state.board();
        let clamp = |v: u16, d: i32, len: u16| {
            (i32::from(v) + d).clamp(0, i32::from(len) - 1) as u16
        };
        self.cursor = Coord::new(
            clamp(self.cursor.x, dx, board.width()),
            clamp(self.cursor.y, dy, board.height()),
        );
    }

    fn save(&mut self) {
        self.status = Some(match snapshot::save(&self.state, &self.save_path) {
            Ok(()) => format!("saved to {}", self.save_path.display()),
            Err(e) => format!("save failed: {e}"),
        });
    }

    /// Let the scripted opponent act if one of its commands is due.
    fn tick(&mut self, now: Instant) {
        if let Err(rejection) = self.driver.poll(&mut self.state, now) {
            warn!(%rejection, "opponent turn abandoned");
            self.status = Some(format!("opponent: {rejection}"));
        }
        self.collect_events();
    }

    fn collect_events(&mut self) {
        for event in self.state.take_events() {
            self.log.push_back(event.to_string());
        }
        while self.log.len() > LOG_CAPACITY {
            self.log.pop_front();
        }
    }
}

fn run_tui(mut app: App) -> Result<(), CliError> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).map_err(|e| CliError::new(e.to_string()))?;

    let result = event_loop(&mut terminal, &mut app);
    app.driver.cancel();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
) -> Result<(), CliError> {
    loop {
        terminal.draw(|f| ui(f, app)).map_err(|e| CliError::new(e.to_string()))?;

        app.tick(Instant::now());

        if event::poll(Duration::from_millis(50)).map_err(|e| CliError::new(e.to_string()))?
            && let Event::Key(key) = event::read().map_err(|e| CliError::new(e.to_string()))?
            && key.kind == KeyEventKind::Press
        {
            match key.code {
                KeyCode::Char('q') => return Ok(()),
                KeyCode::Esc => app.deselect(),
                KeyCode::Left | KeyCode::Char('h') => app.move_cursor(-1, 0),
                KeyCode::Right | KeyCode::Char('l') => app.move_cursor(1, 0),
                KeyCode::Up | KeyCode::Char('k') => app.move_cursor(0, -1),
                KeyCode::Down | KeyCode::Char('j') => app.move_cursor(0, 1),
                KeyCode::Enter | KeyCode::Char(' ') => app.click(),
                KeyCode::Char(c @ '1'..='9') => {
                    if let Some(slot) = c.to_digit(10) {
                        app.pick_template(slot as usize);
                    }
                }
                KeyCode::Char('w') => app.hold(),
                KeyCode::Char('n') => app.advance(),
                KeyCode::Char('s') => app.save(),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(10),    // Board and panels
            Constraint::Length(8),  // Event log
            Constraint::Length(3),  // Footer
        ])
        .split(f.area());

    render_header(f, chunks[0], app);

    let main_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(38)])
        .split(chunks[1]);

    render_board(f, main_chunks[0], app);
    render_side(f, main_chunks[1], app);
    render_log(f, chunks[2], app);
    render_footer(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let current = state.current_player_id();
    let title = match state.winner() {
        Some(winner) => format!(" Bastion | GAME OVER | Player {winner} ({}) wins ", player_name(winner)),
        None if state.is_game_over() => " Bastion | GAME OVER ".to_string(),
        None => {
            let seat = if state.current_player().is_ai { "AI" } else { "you" };
            let mut title = format!(
                " Bastion | Turn {} | Player {current} ({}, {seat}) | {} ",
                state.turn_number(),
                player_name(current),
                state.phase().label(),
            );
            if state.phase() == Phase::Build {
                title.push_str(&format!("| MP {} ", state.turn().move_points));
            }
            title
        }
    };

    let header = Paragraph::new(title)
        .style(
            Style::default()
                .fg(player_color(current))
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(header, area);
}

fn render_board(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let board = state.board();
    let marks = if app.human_turn() {
        highlights(state)
    } else {
        Highlights::default()
    };
    let selected = state.turn().selected_unit;

    let mut lines: Vec<Line> = Vec::new();
    for y in 0..board.height() {
        let mut spans = Vec::new();
        for x in 0..board.width() {
            let coord = Coord::new(x, y);
            let Some(tile) = board.get(coord) else {
                spans.push(Span::raw("   "));
                continue;
            };
            let owner = tile.owner.or_else(|| castle_at(state, coord));
            let mut style = Style::default().fg(owner.map_or(Color::DarkGray, player_color));
            if tile.is_occupied() || castle_at(state, coord).is_some() {
                style = style.add_modifier(Modifier::BOLD);
            }
            if let Some(bg) = highlight_color(&marks, coord) {
                style = style.bg(bg);
            }
            if selected == Some(coord) {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            if app.cursor == coord {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!(" {} ", glyph(state, coord, tile)), style));
        }
        lines.push(Line::from(spans));
    }

    let board_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Board "));

    f.render_widget(board_widget, area);
}

fn highlight_color(marks: &Highlights, coord: Coord) -> Option<Color> {
    if marks.attack.contains(&coord) {
        Some(Color::LightRed)
    } else if marks.movement.contains(&coord) {
        Some(Color::LightBlue)
    } else if marks.summon.contains(&coord) {
        Some(Color::LightYellow)
    } else if marks.deploy.contains(&coord) {
        Some(Color::LightGreen)
    } else {
        None
    }
}

fn render_side(f: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let mut lines = Vec::new();

    for player in state.players() {
        let seat = if player.is_ai { "AI" } else { "human" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("Player {} ", player.id),
                Style::default()
                    .fg(player_color(player.id))
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("({}, {seat})", player_name(player.id))),
        ]));
        lines.push(Line::from(format!(
            "  Castle {} hp {}  Units {}",
            player.castle,
            player.hp,
            state.board().count_units(player.id)
        )));
    }
    lines.push(Line::from(""));

    // Selected unit, or whatever is under the cursor.
    let detail = selection_view(state).or_else(|| unit_view(state, app.cursor));
    lines.push(Line::from(Span::styled(
        format!("Tile {}", app.cursor),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    if let Some(tile) = state.board().get(app.cursor) {
        let owner = tile.owner.map_or("unclaimed".to_string(), |p| format!("P{p}"));
        lines.push(Line::from(format!("  {} ({owner})", tile.terrain.name())));
    }
    if let Some(unit) = detail {
        let marker = if state.turn().selected_unit == Some(unit.at) {
            "selected"
        } else {
            "under cursor"
        };
        lines.push(Line::from(format!("  {} at {} [{marker}]", unit.name, unit.at)));
        lines.push(Line::from(format!(
            "  POW {}/{}  PA {}/{}{}",
            unit.power,
            unit.base_power,
            unit.remaining_pa,
            unit.action_points,
            if unit.exhausted { "  done" } else { "" }
        )));
    }
    lines.push(Line::from(""));

    let current = state.current_player();
    lines.push(Line::from(Span::styled(
        "Roster",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    for (slot, &id) in current.roster.iter().enumerate().take(9) {
        let Some(template) = state.catalog().get(id) else {
            continue;
        };
        let mut style = Style::default();
        if state.turn().selected_template == Some(id) {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if state.phase() == Phase::Build && !state.can_summon_unit(current.id, id) {
            style = style.fg(Color::DarkGray);
        }
        lines.push(Line::from(Span::styled(
            format!(
                "  [{}] {:<16} POW {} PA {}",
                slot + 1,
                template.name,
                template.base_power,
                template.action_points
            ),
            style,
        )));
    }

    let side_widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Game "))
        .wrap(Wrap { trim: false });

    f.render_widget(side_widget, area);
}

fn render_log(f: &mut Frame, area: Rect, app: &App) {
    let visible = usize::from(area.height.saturating_sub(2));
    let mut lines: Vec<Line> = app
        .log
        .iter()
        .rev()
        .take(visible)
        .rev()
        .map(|entry| Line::from(entry.as_str()))
        .collect();
    if let Some(status) = &app.status {
        lines.push(Line::from(Span::styled(
            status.as_str(),
            Style::default().fg(Color::Yellow),
        )));
        if lines.len() > visible {
            lines.remove(0);
        }
    }

    let log_widget =
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Log "));

    f.render_widget(log_widget, area);
}

fn player_color(id: PlayerId) -> Color {
    match id {
        1 => Color::Red,
        2 => Color::Blue,
        _ => Color::White,
    }
}

fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let controls = if app.state.is_game_over() {
        " [q] Quit  [s] Save  [arrows/hjkl] Cursor "
    } else if app.mode == GameMode::AiVsAi || !app.human_turn() {
        " [q] Quit  [s] Save  [arrows/hjkl] Cursor  (opponent is playing) "
    } else {
        " [q] Quit  [arrows/hjkl] Cursor  [Enter] Click  [1-9] Template  [w] Hold  [n] Next phase  [Esc] Deselect  [s] Save "
    };

    let footer = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}
