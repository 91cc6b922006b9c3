use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
};

use crate::game::{GameConfig, GameState, Lane};
use crate::metrics::GameMetrics;

/// Text rows used for the road view
const VIEW_ROWS: usize = 22;
/// Character columns across the road surface
const VIEW_COLS: usize = 30;

pub struct Renderer {
    config: GameConfig,
}

impl Renderer {
    pub fn new(config: GameConfig) -> Self {
        Self { config }
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Road view
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        let stats = self.render_stats(chunks[0], state, metrics);
        frame.render_widget(stats, chunks[0]);

        let road_area = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(10),
                Constraint::Percentage(80),
                Constraint::Percentage(10),
            ])
            .split(chunks[1])[1];

        if state.is_alive {
            let road = self.render_road(road_area, state);
            frame.render_widget(road, road_area);
        } else {
            let crash = self.render_crash(road_area, state);
            frame.render_widget(crash, road_area);
        }

        let controls = self.render_controls(chunks[2]);
        frame.render_widget(controls, chunks[2]);
    }

    /// Column span a car occupies in the character grid
    fn lane_cols(lane: Lane) -> std::ops::Range<usize> {
        match lane {
            Lane::Left => 6..12,
            Lane::Right => 18..24,
        }
    }

    /// Rows a car occupies, from its vertical extent in playfield pixels
    fn car_rows(&self, center_y: f32, height: f32) -> std::ops::Range<usize> {
        let row_h = self.config.screen_height / VIEW_ROWS as f32;
        let top = ((center_y - height / 2.0) / row_h).floor().max(0.0) as usize;
        let bottom = ((center_y + height / 2.0) / row_h).ceil().min(VIEW_ROWS as f32) as usize;
        top..bottom.max(top)
    }

    fn render_road(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let player_rows = self.car_rows(state.player.center_y, state.player.height);
        let player_cols = Self::lane_cols(state.player.lane);
        let opponent_rows = self.car_rows(state.opponent.center_y, state.opponent.height);
        let opponent_cols = Self::lane_cols(state.opponent.lane);

        let row_h = self.config.screen_height / VIEW_ROWS as f32;
        let segment = self.config.dash_segment();
        let dash_h = self.config.screen_height / 20.0;

        let mut lines = Vec::with_capacity(VIEW_ROWS);
        for row in 0..VIEW_ROWS {
            let mut spans = Vec::with_capacity(VIEW_COLS);
            let row_center_y = (row as f32 + 0.5) * row_h;
            let dash_here =
                (row_center_y - state.line_offset).rem_euclid(segment) < dash_h;

            for col in 0..VIEW_COLS {
                let span = if opponent_rows.contains(&row) && opponent_cols.contains(&col) {
                    Span::styled("█", Style::default().fg(Color::Red))
                } else if player_rows.contains(&row) && player_cols.contains(&col) {
                    Span::styled(
                        "█",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )
                } else if col == 0 || col == VIEW_COLS - 1 {
                    Span::styled("▐", Style::default().fg(Color::White))
                } else if (col == 14 || col == 15) && dash_here {
                    Span::styled("┃", Style::default().fg(Color::Yellow))
                } else {
                    Span::styled(" ", Style::default().fg(Color::DarkGray))
                };
                spans.push(span);
            }
            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::Green))
                    .title(" Road "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, _area: Rect, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw("    "),
            Span::styled("Level: ", Style::default().fg(Color::Yellow)),
            Span::styled(state.level.to_string(), Style::default().fg(Color::White)),
            Span::raw("    "),
            Span::styled("Speed: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("{:.1}", state.speed),
                Style::default().fg(Color::White),
            ),
            Span::raw("    "),
            Span::styled("Time: ", Style::default().fg(Color::Yellow)),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_crash(&self, _area: Rect, state: &GameState) -> Paragraph<'_> {
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "CRASHED",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Cars dodged: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    state.score.to_string(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::styled("Level reached: ", Style::default().fg(Color::Yellow)),
                Span::styled(state.level.to_string(), Style::default().fg(Color::White)),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Press ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "R",
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to restart or ", Style::default().fg(Color::Gray)),
                Span::styled(
                    "Q",
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                ),
                Span::styled(" to quit", Style::default().fg(Color::Gray)),
            ]),
        ];

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_controls(&self, _area: Rect) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("A/D", Style::default().fg(Color::Cyan)),
            Span::raw(" to steer | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_columns_do_not_overlap() {
        let left = Renderer::lane_cols(Lane::Left);
        let right = Renderer::lane_cols(Lane::Right);
        assert!(left.end <= right.start);
    }

    #[test]
    fn test_car_rows_clamped_to_view() {
        let renderer = Renderer::new(GameConfig::default());

        // Off-screen opponent occupies no rows
        let rows = renderer.car_rows(-200.0, 200.0);
        assert!(rows.is_empty() || rows.start == 0);

        // Player near the bottom stays inside the view
        let rows = renderer.car_rows(561.0, 200.0);
        assert!(rows.end <= VIEW_ROWS);
        assert!(!rows.is_empty());
    }
}
