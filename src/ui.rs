//! Layout and drawing: board, sidebar (HUD, settings, statistics), overlays and the
//! end-of-session fade.

use crate::config::Settings;
use crate::grid::Cell;
use crate::hud::{Hud, format_time};
use crate::mode::Mode;
use crate::session::{EndReason, Lifecycle, SessionState};
use crate::stats::Statistics;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, Paragraph, Widget};
use std::collections::HashSet;
use std::time::Instant;
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per board cell, so cells come out roughly square.
const CELL_WIDTH: u16 = 2;
const SIDEBAR_WIDTH: u16 = 30;
const HUD_HEIGHT: u16 = 9;
const SETTINGS_HEIGHT: u16 = 8;
const STATS_HEIGHT: u16 = 11;
const SIDEBAR_HEIGHT: u16 = HUD_HEIGHT + 1 + SETTINGS_HEIGHT + 1 + STATS_HEIGHT;

/// Duration of the snake fade-out when a session ends, in ms.
const END_FADE_MS: u32 = 600;

/// Everything one frame needs.
pub struct View<'a> {
    pub session: &'a SessionState,
    pub settings: &'a Settings,
    pub hud: &'a Hud,
    pub stats: &'a Statistics,
    pub theme: &'a Theme,
    /// Set when the last finished session beat the mode's best.
    pub new_best: bool,
    pub now: Instant,
}

/// Board (with border) size in terminal cells for an `n`×`n` grid.
fn board_outer_size(n: i32) -> (u16, u16) {
    let n = u16::try_from(n.max(0)).unwrap_or(u16::MAX);
    (n.saturating_mul(CELL_WIDTH) + 2, n + 2)
}

/// Board and sidebar rects, centred in `area`.
fn split_game_area(area: Rect, n: i32) -> (Rect, Rect) {
    let (pw, ph) = board_outer_size(n);
    let total_w = pw + SIDEBAR_WIDTH;
    let total_h = ph.max(SIDEBAR_HEIGHT);

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_h),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);
    let board = Rect {
        height: ph.min(inner[0].height),
        ..inner[0]
    };
    (board, inner[1])
}

/// Inner board rect (no border) for a board drawn at `outer`.
fn board_inner(outer: Rect, n: i32) -> Rect {
    let (pw, ph) = board_outer_size(n);
    Rect {
        x: outer.x + 1,
        y: outer.y + 1,
        width: (pw - 2).min(outer.width.saturating_sub(2)),
        height: (ph - 2).min(outer.height.saturating_sub(2)),
    }
}

fn cell_position(board: Rect, cell: Cell) -> Option<Position> {
    let x = u16::try_from(cell.x).ok()?;
    let y = u16::try_from(cell.y).ok()?;
    Some(Position::new(board.x + x * CELL_WIDTH, board.y + y))
}

/// Paints one board cell (two terminal columns), clipped to `board`.
fn put(buf: &mut Buffer, board: Rect, cell: Cell, symbols: [&str; 2], style: Style) {
    let Some(pos) = cell_position(board, cell) else {
        return;
    };
    if pos.y >= board.bottom() {
        return;
    }
    for (dx, symbol) in (0u16..).zip(symbols) {
        let x = pos.x + dx;
        if x < board.right() {
            buf[(x, pos.y)].set_symbol(symbol).set_style(style);
        }
    }
}

/// Buffer positions covered by the snake, for the fade filter.
fn snake_buffer_positions(board: Rect, session: &SessionState) -> HashSet<(u16, u16)> {
    let mut set = HashSet::new();
    for &cell in session.snake.cells() {
        if let Some(pos) = cell_position(board, cell) {
            for dx in 0..CELL_WIDTH {
                set.insert((pos.x + dx, pos.y));
            }
        }
    }
    set
}

/// Draw the whole screen. While a session is ended, runs the snake fade-out held in
/// `end_effect` / `end_effect_process_time`; once it has finished the snake is no longer drawn.
pub fn draw(
    frame: &mut Frame,
    view: &View<'_>,
    end_effect: &mut Option<Effect>,
    end_effect_process_time: &mut Option<Instant>,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(view.theme.board))
        .render(area, frame.buffer_mut());

    let n = view.session.grid.size;
    let (board_outer, sidebar) = split_game_area(area, n);
    let ended = view.session.lifecycle == Lifecycle::Ended;
    let hide_snake = ended && end_effect.as_ref().is_some_and(Effect::done);

    draw_board(frame, view, board_outer, hide_snake);
    draw_sidebar(frame, view, sidebar);

    if ended && !hide_snake {
        apply_end_effect(
            frame,
            view,
            board_outer,
            end_effect,
            end_effect_process_time,
        );
    }

    match view.session.lifecycle {
        Lifecycle::Idle => draw_ready_overlay(frame, view, board_outer),
        Lifecycle::Paused => draw_pause_overlay(frame, view, board_outer),
        Lifecycle::Ended => draw_end_overlay(frame, view, board_outer),
        Lifecycle::Running => {}
    }
}

/// Create or advance the fade that dissolves the snake into the board colour.
fn apply_end_effect(
    frame: &mut Frame,
    view: &View<'_>,
    board_outer: Rect,
    end_effect: &mut Option<Effect>,
    end_effect_process_time: &mut Option<Instant>,
) {
    let board = board_inner(board_outer, view.session.grid.size);
    let delta = end_effect_process_time
        .map(|t| view.now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    let tfx_delta = TfxDuration::from_millis(delta_ms);
    *end_effect_process_time = Some(view.now);

    if end_effect.is_none() {
        let snake_set = snake_buffer_positions(board, view.session);
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| {
            snake_set.contains(&(pos.x, pos.y))
        }));
        let bg = view.theme.board;
        let effect = fx::fade_to(bg, bg, (END_FADE_MS, Interpolation::Linear))
            .with_filter(filter)
            .with_area(board);
        *end_effect = Some(effect);
    }

    if let Some(effect) = end_effect {
        frame.render_effect(effect, board, tfx_delta);
    }
}

fn draw_board(frame: &mut Frame, view: &View<'_>, outer: Rect, hide_snake: bool) {
    let theme = view.theme;
    let session = view.session;
    let n = session.grid.size;
    let title = if view.settings.wrap {
        format!(" snaketui  {}  | wrap ", session.mode.name())
    } else {
        format!(" snaketui  {} ", session.mode.name())
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.board))
        .title(Span::styled(title, theme.title));
    block.render(outer, frame.buffer_mut());
    let board = board_inner(outer, n);
    let buf = frame.buffer_mut();

    let empty = if view.settings.show_grid {
        (["·", " "], Style::default().fg(theme.grid).bg(theme.board))
    } else {
        ([" ", " "], Style::default().bg(theme.board))
    };
    for y in 0..n {
        for x in 0..n {
            put(buf, board, Cell::new(x, y), empty.0, empty.1);
        }
    }

    let obstacle = Style::default().fg(theme.obstacle).bg(theme.board);
    for &cell in &session.obstacles {
        put(buf, board, cell, ["█", "█"], obstacle);
    }
    if let Some(portals) = session.portals {
        let style = Style::default()
            .fg(theme.portal)
            .bg(theme.board)
            .add_modifier(Modifier::BOLD);
        for cell in portals {
            put(buf, board, cell, ["(", ")"], style);
        }
    }
    put(
        buf,
        board,
        session.food,
        ["●", " "],
        Style::default().fg(theme.food).bg(theme.board),
    );

    if hide_snake {
        return;
    }
    let len = session.snake.len();
    for (i, &cell) in session.snake.cells().enumerate() {
        let color = theme.segment_color(i, len, view.settings.trail);
        put(buf, board, cell, ["█", "█"], Style::default().fg(color).bg(theme.board));
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn labelled<'a>(label: &'a str, value: String, title: Style, fg: Style) -> Line<'a> {
    Line::from(vec![Span::styled(label, title), Span::styled(value, fg)])
}

fn section(frame: &mut Frame, area: Rect, name: &str, theme: &Theme) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.board))
        .title(Span::styled(format!(" {name} "), theme.title));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    inner
}

fn draw_sidebar(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HUD_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(SETTINGS_HEIGHT),
            Constraint::Length(1),
            Constraint::Length(STATS_HEIGHT),
        ])
        .split(area);
    draw_hud(frame, view, chunks[0]);
    draw_settings(frame, view, chunks[2]);
    draw_stats(frame, view, chunks[4]);
}

fn draw_hud(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let title = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);
    let hud = view.hud;
    let inner = section(frame, area, "Score", theme);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let clock_label = if view.session.time_limit > 0.0 {
        "Left:  "
    } else {
        "Time:  "
    };
    let lines = vec![
        labelled("Mode:  ", hud.mode_name.to_string(), title, fg),
        labelled("Score: ", hud.score.to_string(), title, fg),
        labelled("Best:  ", hud.best.to_string(), title, fg),
        labelled(clock_label, hud.clock_label(), title, fg),
        labelled("Speed: ", hud.speed_label(), title, fg),
    ];
    Paragraph::new(Text::from(lines)).render(rows[0], frame.buffer_mut());

    let running = view.session.lifecycle == Lifecycle::Running;
    let ratio = if running && hud.combo > 1 {
        view.session.scoring.window_left(view.now)
    } else {
        0.0
    };
    Paragraph::new(Line::from(Span::styled(format!("Combo x{}", hud.combo), title)))
        .render(rows[1], frame.buffer_mut());
    let bar_color = if ratio > 0.6 {
        Color::Green
    } else if ratio > 0.3 {
        Color::Yellow
    } else {
        Color::Red
    };
    Gauge::default()
        .ratio(ratio)
        .label("")
        .gauge_style(Style::default().fg(bar_color).bg(theme.grid))
        .render(rows[2], frame.buffer_mut());
}

fn draw_settings(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let s = view.settings;
    let title = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);
    let inner = section(frame, area, "Settings", theme);
    let lines = vec![
        labelled("Grid [ ]    ", format!("{0}x{0}", s.grid_size), title, fg),
        labelled("Wrap o      ", on_off(s.wrap).to_string(), title, fg),
        labelled("Trail t     ", on_off(s.trail).to_string(), title, fg),
        labelled("Lines g     ", on_off(s.show_grid).to_string(), title, fg),
        labelled("Sound b     ", on_off(s.sound).to_string(), title, fg),
        labelled("Theme c     ", s.theme.label().to_string(), title, fg),
    ];
    Paragraph::new(Text::from(lines)).render(inner, frame.buffer_mut());
}

fn draw_stats(frame: &mut Frame, view: &View<'_>, area: Rect) {
    let theme = view.theme;
    let st = view.stats;
    let title = Style::default().fg(theme.title);
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);
    let inner = section(frame, area, "Statistics", theme);
    let mut lines = vec![
        labelled("Games:   ", st.games_played.to_string(), title, fg),
        labelled("Food:    ", st.total_food.to_string(), title, fg),
        labelled("Played:  ", format_time(st.total_time), title, fg),
        labelled("Longest: ", st.max_length.to_string(), title, fg),
    ];
    for mode in Mode::ALL {
        let style = if mode == view.session.mode { fg } else { dim };
        lines.push(Line::from(vec![
            Span::styled(format!("{:<12}", mode.name()), style),
            Span::styled(st.best(mode).to_string(), style),
        ]));
    }
    Paragraph::new(Text::from(lines)).render(inner, frame.buffer_mut());
}

/// Centred popup over the board.
fn popup_rect(board: Rect, width: u16, height: u16) -> Rect {
    Rect {
        x: board.x + board.width.saturating_sub(width) / 2,
        y: board.y + board.height.saturating_sub(height) / 2,
        width: width.min(board.width),
        height: height.min(board.height),
    }
}

fn render_popup(frame: &mut Frame, theme: &Theme, rect: Rect, lines: Vec<Line<'_>>) {
    Clear.render(rect, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .style(Style::default().bg(theme.board))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.board)),
        )
        .render(rect, frame.buffer_mut());
}

fn draw_ready_overlay(frame: &mut Frame, view: &View<'_>, board: Rect) {
    let theme = view.theme;
    let fg = Style::default().fg(theme.main_fg);
    let dim = Style::default().fg(theme.inactive_fg);
    let mode = view.session.mode;
    let lines = vec![
        Line::from(Span::styled(
            format!(" {} ", mode.name()),
            Style::default()
                .fg(Color::Black)
                .bg(theme.title)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(mode.description(), fg)),
        Line::from(""),
        Line::from(Span::styled("Space  start", fg)),
        Line::from(Span::styled("arrows / wasd / hjkl  steer", dim)),
        Line::from(Span::styled("m mode   x surprise me", dim)),
        Line::from(Span::styled("+/- speed   q quit", dim)),
    ];
    render_popup(frame, theme, popup_rect(board, 34, 9), lines);
}

fn draw_pause_overlay(frame: &mut Frame, view: &View<'_>, board: Rect) {
    let theme = view.theme;
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " Space: resume    Q: quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    render_popup(frame, theme, popup_rect(board, 30, 6), lines);
}

fn draw_end_overlay(frame: &mut Frame, view: &View<'_>, board: Rect) {
    let theme = view.theme;
    let session = view.session;
    let fg = Style::default().fg(theme.main_fg);
    let reason = session.end_reason;
    let title = match reason {
        Some(EndReason::TimeExpired) => " Time's up! ",
        _ => " Game Over ",
    };
    let mut lines = vec![
        Line::from(Span::styled(
            title,
            Style::default().fg(Color::White).bg(Color::Red),
        )),
        Line::from(Span::styled(reason.map(EndReason::message).unwrap_or(""), fg)),
        Line::from(""),
        Line::from(Span::styled(format!("Score: {}", session.score()), fg)),
        Line::from(Span::styled(format!("Best: {}", view.hud.best), fg)),
        Line::from(Span::styled(
            format!(
                "Food: {}   Length: {}   {}",
                session.food_eaten,
                session.snake.len(),
                format_time(session.elapsed)
            ),
            fg,
        )),
    ];
    if view.new_best {
        lines.push(Line::from(Span::styled(
            "New record!",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Space: restart    Q: quit",
        fg,
    )));
    render_popup(frame, theme, popup_rect(board, 34, 12), lines);
}
