//! Render functions for the TUI.
//!
//! Frame layout, top to bottom: status cards, tab bar, active tab body,
//! status bar. Forms, confirm dialogs, detailed notices and help are drawn
//! as overlays on top.

use crate::app::{App, Tab};
use crate::form::Form;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs, Wrap},
    Frame,
};

use super::{config_tab, help, posts, stats, status, subscriptions};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 12;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_cards(f, app, chunks[0]);
    render_tab_bar(f, app, chunks[1]);
    match app.tab {
        Tab::Config => config_tab::render(f, app, chunks[2]),
        Tab::Subscriptions => subscriptions::render(f, app, chunks[2]),
        Tab::Posts => posts::render(f, app, chunks[2]),
        Tab::Stats => stats::render(f, app, chunks[2]),
    }
    status::render(f, app, chunks[3]);

    if let Some(form) = &app.form {
        render_form_overlay(f, app, form);
    }

    if let Some(confirm) = &app.pending_confirm {
        render_confirm_overlay(f, app, &confirm.prompt());
    }

    if app.notice.as_ref().is_some_and(|n| !n.details.is_empty()) {
        render_notice_overlay(f, app);
    }

    if app.show_help {
        help::render(f, app);
    }
}

/// Header cards: active subscriptions, today's messages, total posts.
fn render_cards(f: &mut Frame, app: &App, area: Rect) {
    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let values = match &app.stats {
        Some(s) => [s.total_subscriptions, s.today_messages, s.total_posts].map(|v| v.to_string()),
        None => ["-", "-", "-"].map(String::from),
    };
    let titles = [" Subscriptions ", " Today's messages ", " Total posts "];

    for ((title, value), rect) in titles.into_iter().zip(values).zip(cards.iter()) {
        let card = Paragraph::new(Span::styled(value, app.theme.card_value))
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(app.theme.border)
                    .title(title),
            );
        f.render_widget(card, *rect);
    }
}

fn render_tab_bar(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("{} {}", i + 1, t.title())))
        .collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(app.theme.tab)
        .highlight_style(app.theme.tab_active)
        .divider("|");
    f.render_widget(tabs, area);
}

/// Rectangle of fixed size centered in `area`, shrunk to fit.
pub(super) fn centered_fixed(width: u16, height: u16, area: Rect) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the active form centered on screen.
fn render_form_overlay(f: &mut Frame, app: &App, form: &Form) {
    let mut lines: Vec<Line> = Vec::with_capacity(form.fields.len() * 3 + 2);
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let label_style = if focused {
            app.theme.heading
        } else {
            app.theme.muted
        };
        lines.push(Line::from(Span::styled(field.label, label_style)));
        let cursor = if focused { "_" } else { "" };
        lines.push(Line::from(format!("> {}{}", field.display(), cursor)));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(Span::styled(
        "(Enter) Submit  (Tab) Next field  (Esc) Cancel",
        app.theme.hint,
    )));

    let height = lines.len() as u16 + 2;
    let overlay = centered_fixed(64, height, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_focused)
                .title(format!(" {} ", form.kind.title())),
        )
        .style(app.theme.body);
    f.render_widget(paragraph, overlay);
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, app: &App, prompt: &str) {
    let text = format!("{}\n\n(y) Confirm  (n/Esc) Cancel", prompt);
    let height = text.lines().count() as u16 + 2;
    let overlay = centered_fixed(50, height, f.area());

    if overlay.width < 10 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_focused)
                .title(" Confirm "),
        )
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false })
        .style(app.theme.body);

    f.render_widget(paragraph, overlay);
}

/// Notice with a detail list, drawn as a box until it expires.
fn render_notice_overlay(f: &mut Frame, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };

    let mut lines = vec![Line::from("")];
    lines.extend(notice.details.iter().map(|d| Line::from(format!("  - {}", d))));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("(Esc) Dismiss", app.theme.hint)));

    let height = lines.len() as u16 + 2;
    let overlay = centered_fixed(70, height, f.area());
    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.notice(notice.kind))
                .title(format!(" {} ", notice.text)),
        )
        .wrap(Wrap { trim: false })
        .style(app.theme.body);
    f.render_widget(paragraph, overlay);
}
