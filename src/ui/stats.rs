//! Stats tab rendering.

use crate::api::Stats;
use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the stats tab as a grid of counters.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    let outer = Block::default()
        .borders(Borders::ALL)
        .border_style(app.theme.border)
        .title(" Stats ");
    let inner = outer.inner(area);
    f.render_widget(outer, area);

    let Some(stats) = &app.stats else {
        let msg = if app.stats_loading {
            "Loading stats..."
        } else {
            "Stats unavailable, press [r] to retry"
        };
        f.render_widget(
            Paragraph::new(msg)
                .alignment(Alignment::Center)
                .style(app.theme.muted),
            inner,
        );
        return;
    };

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Length(4), Constraint::Min(0)])
        .split(inner);

    let counters = counters(stats);
    for (row, pair) in rows.iter().take(2).zip(counters.chunks(2)) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(*row);
        for (col, (label, value)) in cols.iter().zip(pair) {
            let card = Paragraph::new(vec![
                Line::from(Span::styled(value.to_string(), app.theme.card_value)),
                Line::from(Span::styled(*label, app.theme.muted)),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(app.theme.border),
            );
            f.render_widget(card, *col);
        }
    }
}

/// Counters in display order.
pub(super) fn counters(stats: &Stats) -> [(&'static str, u64); 4] {
    [
        ("Total posts", stats.total_posts),
        ("Pushed", stats.pushed_posts),
        ("Not pushed", stats.unpushed_posts),
        ("Subscriptions", stats.total_subscriptions),
    ]
}
