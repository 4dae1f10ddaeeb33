//! Terminal UI rendering with ratatui
//!
//! Strictly a read-only view of the game state: the board with the
//! falling piece overlaid, the next-piece preview, the score panel, and
//! the pause/game-over overlays.

use crate::board::{BOARD_HEIGHT, BOARD_WIDTH, Cell};
use crate::game::{Game, GameState};
use crate::piece::Piece;
use crate::settings::Settings;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

/// Total width needed: board(22) + next/stats(16)
const GAME_WIDTH: u16 = 38;
/// Total height needed: board(20) + 2 for borders
const GAME_HEIGHT: u16 = 22;

/// Render the whole game screen
pub fn render_game(frame: &mut Frame, game: &Game, settings: &Settings) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(22), // Board (10*2 + 2 for borders)
            Constraint::Length(16), // Next piece + stats
        ])
        .split(game_area);

    render_board(frame, main_layout[0], game, settings);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Next piece box
            Constraint::Min(8),    // Stats
        ])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], game.next_piece(), settings);
    render_stats(frame, right_layout[1], game);

    match game.state() {
        GameState::Paused => render_overlay(frame, area, "PAUSED", "Press P to play"),
        GameState::GameOver => render_overlay(frame, area, "GAME OVER", "Press P for a new game"),
        GameState::Running => {}
    }
}

/// Center a rect within another rect
fn center_rect(area: Rect, width: u16, height: u16) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Render the board with the falling piece overlaid
fn render_board(frame: &mut Frame, area: Rect, game: &Game, settings: &Settings) {
    let (block_char, empty_char) = settings.visual.block_chars();

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines: Vec<Line> = Vec::with_capacity(BOARD_HEIGHT);
    for row in 0..BOARD_HEIGHT {
        let mut spans = Vec::with_capacity(BOARD_WIDTH);
        for col in 0..BOARD_WIDTH {
            let on_piece = game
                .current_piece()
                .cells()
                .any(|(r, c)| r == row as i32 && c == col as i32);

            let (text, style) = if on_piece {
                (
                    block_char,
                    Style::default().fg(game.current_piece().kind.color()),
                )
            } else {
                match game.board().get(row as i32, col as i32) {
                    Some(Cell::Filled(kind)) => (block_char, Style::default().fg(kind.color())),
                    _ => (empty_char, Style::default().fg(Color::DarkGray)),
                }
            };
            spans.push(Span::styled(text, style));
        }
        lines.push(Line::from(spans));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the next piece preview box
fn render_next(frame: &mut Frame, area: Rect, piece: &Piece, settings: &Settings) {
    let (block_char, _) = settings.visual.block_chars();

    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mask = &piece.mask;
    let mut lines = Vec::with_capacity(mask.side());
    for row in 0..mask.side() {
        let mut spans = Vec::with_capacity(mask.side());
        for col in 0..mask.side() {
            if mask.is_filled(row, col) {
                spans.push(Span::styled(
                    block_char,
                    Style::default().fg(piece.kind.color()),
                ));
            } else {
                spans.push(Span::raw("  "));
            }
        }
        lines.push(Line::from(spans));
    }

    let paragraph = Paragraph::new(lines).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}

/// Render the score panel
fn render_stats(frame: &mut Frame, area: Rect, game: &Game) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let score = game.score();
    let lines = vec![
        Line::from(Span::styled("SCORE", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.points),
            Style::default().fg(Color::Yellow).bold(),
        )),
        Line::raw(""),
        Line::from(Span::styled("LEVEL", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.level),
            Style::default().fg(Color::Cyan),
        )),
        Line::raw(""),
        Line::from(Span::styled("LINES", Style::default().fg(Color::Gray))),
        Line::from(Span::styled(
            format!("{}", score.lines),
            Style::default().fg(Color::Green),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render a centered overlay with a title and a hint line
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_width = 26u16;
    let popup_height = 5u16;
    let popup_area = center_rect(area, popup_width, popup_height);

    // Clear the background
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title.to_string(), Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle.to_string(), Style::default().fg(Color::Gray)),
    ];

    let paragraph = Paragraph::new(text).alignment(Alignment::Center);
    frame.render_widget(paragraph, inner);
}
