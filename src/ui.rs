//! Terminal UI rendering with ratatui

use crate::game::{ROW_CRUSH_COOLDOWN_MS, Snapshot};
use crate::grid::{Cell, GRID_HEIGHT, GRID_WIDTH};
use crate::piece::Piece;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Paragraph},
};

const BLOCK: &str = "██";
const EMPTY: &str = "  ";

/// Total width needed: board(22) + sidebar(20)
const GAME_WIDTH: u16 = 42;
/// Total height needed: board(20) + 2 for borders
const GAME_HEIGHT: u16 = GRID_HEIGHT as u16 + 2;

const CONTROLS: [(&str, &str); 10] = [
    ("← →", "move"),
    ("↑", "rotate"),
    ("↓", "soft drop (hold)"),
    ("Enter", "pause / resume"),
    ("R", "restart"),
    ("F", "row-crush (bottom 3 rows)"),
    ("+ -", "repeat speed"),
    ("S", "reset high score"),
    ("H", "toggle this screen at start"),
    ("Esc", "quit"),
];

/// Render the startup help screen
pub fn render_help(frame: &mut Frame, hide_help: bool) {
    let area = center_rect(frame.area(), 44, 22);

    let block = Block::default()
        .title(" ROWCRUSH ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut lines = vec![
        Line::raw(""),
        Line::styled("CONTROLS", Style::default().fg(Color::Cyan).bold()),
        Line::raw(""),
    ];
    for (key, what) in CONTROLS {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:>6}  "), Style::default().fg(Color::Yellow)),
            Span::styled(format!("{what:<28}"), Style::default().fg(Color::White)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        format!("Row-crush cooldown: {}s", ROW_CRUSH_COOLDOWN_MS / 1000),
        Style::default().fg(Color::Gray),
    ));
    lines.push(Line::raw(""));
    lines.push(Line::styled(
        "Press SPACE to start",
        Style::default().fg(Color::Green).bold(),
    ));
    let checkbox = if hide_help { "[x]" } else { "[ ]" };
    lines.push(Line::styled(
        format!("{checkbox} don't show again (H)"),
        Style::default().fg(Color::DarkGray),
    ));

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

/// Render a running game
pub fn render_game(frame: &mut Frame, snapshot: &Snapshot, high_score: u64) {
    let area = frame.area();
    let game_area = center_rect(area, GAME_WIDTH, GAME_HEIGHT);

    let main_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(GRID_WIDTH as u16 * 2 + 2),
            Constraint::Length(20),
        ])
        .split(game_area);

    render_board(frame, main_layout[0], snapshot);

    let right_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),  // Next piece
            Constraint::Min(10),    // Stats
            Constraint::Length(3),  // Row-crush gauge
        ])
        .split(main_layout[1]);

    render_next(frame, right_layout[0], &snapshot.next_piece);
    render_stats(frame, right_layout[1], snapshot, high_score);
    render_cooldown(frame, right_layout[2], snapshot.cooldown_remaining_ms);

    if snapshot.game_over {
        render_overlay(frame, area, "GAME OVER", "R restart | Esc quit");
    } else if snapshot.paused {
        render_overlay(frame, area, "PAUSED", "Enter to resume");
    }
}

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

fn render_board(frame: &mut Frame, area: Rect, snapshot: &Snapshot) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::White));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let piece = &snapshot.current_piece;
    let piece_cells: Vec<(i32, i32)> = piece.block_positions().collect();

    let lines: Vec<Line> = snapshot
        .grid
        .rows()
        .enumerate()
        .map(|(y, row)| {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(x, cell)| {
                    if piece_cells.contains(&(x as i32, y as i32)) {
                        Span::styled(BLOCK, Style::default().fg(piece.color()))
                    } else {
                        match cell {
                            Cell::Filled(color) => Span::styled(BLOCK, Style::default().fg(*color)),
                            Cell::Empty => Span::raw(EMPTY),
                        }
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Render the preview piece
fn render_next(frame: &mut Frame, area: Rect, piece: &Piece) {
    let block = Block::default()
        .title(" NEXT ")
        .title_alignment(Alignment::Center)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let shape = piece.shape();
    let lines: Vec<Line> = (0..shape.height())
        .map(|row| {
            let spans: Vec<Span> = (0..shape.width())
                .map(|col| {
                    if shape.is_filled(col, row) {
                        Span::styled(BLOCK, Style::default().fg(piece.color()))
                    } else {
                        Span::raw(EMPTY)
                    }
                })
                .collect();
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}

fn render_stats(frame: &mut Frame, area: Rect, snapshot: &Snapshot, high_score: u64) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Gray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let label = |text: &'static str| Line::from(Span::styled(text, Style::default().fg(Color::Gray)));

    let lines = vec![
        label("SCORE"),
        Line::from(Span::styled(
            snapshot.score.to_string(),
            Style::default().fg(Color::Yellow).bold(),
        )),
        label("HIGH"),
        Line::from(Span::styled(
            high_score.max(snapshot.score).to_string(),
            Style::default().fg(Color::Magenta),
        )),
        label("LINES"),
        Line::from(Span::styled(
            snapshot.total_lines.to_string(),
            Style::default().fg(Color::Green),
        )),
        label("SPEED"),
        Line::from(Span::styled(
            format!("{} ms", snapshot.falling_speed_ms),
            Style::default().fg(Color::Cyan),
        )),
        label("REPEAT"),
        Line::from(Span::styled(
            format!("{} ms", snapshot.repeat_delay_ms),
            Style::default().fg(Color::Cyan),
        )),
    ];

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Row-crush cooldown bar: fills up as the ability recharges
fn render_cooldown(frame: &mut Frame, area: Rect, remaining_ms: u64) {
    let ratio = 1.0 - (remaining_ms.min(ROW_CRUSH_COOLDOWN_MS) as f64 / ROW_CRUSH_COOLDOWN_MS as f64);
    let (color, label) = if remaining_ms == 0 {
        (Color::Green, "READY".to_string())
    } else {
        (Color::Red, format!("{}s", remaining_ms.div_ceil(1000)))
    };

    let gauge = Gauge::default()
        .block(
            Block::default()
                .title(" CRUSH ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Gray)),
        )
        .gauge_style(Style::default().fg(color))
        .ratio(ratio)
        .label(label);
    frame.render_widget(gauge, area);
}

/// Render an overlay (for pause/game over)
fn render_overlay(frame: &mut Frame, area: Rect, title: &str, subtitle: &str) {
    let popup_area = center_rect(area, 26, 5);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .style(Style::default().bg(Color::Black));
    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let text = vec![
        Line::styled(title, Style::default().fg(Color::Yellow).bold()),
        Line::raw(""),
        Line::styled(subtitle, Style::default().fg(Color::Gray)),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), inner);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Game, GameConfig};
    use ratatui::{Terminal, backend::TestBackend};

    #[test]
    fn test_render_game_draws_score() {
        let game = Game::with_seed(GameConfig::default(), 3, 0);
        let backend = TestBackend::new(60, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_game(frame, &game.snapshot(0), 1234))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("SCORE"));
        assert!(text.contains("1234"));
        assert!(text.contains("READY"));
    }

    #[test]
    fn test_render_help_lists_controls() {
        let backend = TestBackend::new(60, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_help(frame, true)).unwrap();

        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();
        assert!(text.contains("CONTROLS"));
        assert!(text.contains("[x]"));
    }

    #[test]
    fn test_center_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 20, 10);
        let rect = center_rect(area, 40, 5);
        assert_eq!(rect.width, 20);
        assert_eq!(rect.y, 2);
    }
}
