//! Help overlay listing the live keybindings, config overrides included.
//!
//! Keys bound to the same action in the same context share one row.

use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{
    layout::{Constraint, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Row, Table},
    Frame,
};

use super::render::centered_fixed;

/// Sections in display order.
const SECTIONS: [(Context, &str); 6] = [
    (Context::Global, "Anywhere"),
    (Context::Config, "Config tab"),
    (Context::Subscriptions, "Subscriptions tab"),
    (Context::Posts, "Posts tab"),
    (Context::Form, "Forms and filter editing"),
    (Context::Confirm, "Confirmation prompts"),
];

/// One row of the help table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum HelpEntry {
    Section(&'static str),
    Binding { keys: String, description: &'static str },
    Blank,
}

pub fn render(f: &mut Frame, app: &App) {
    let area = centered_fixed(72, f.area().height, f.area());
    if area.width < 30 || area.height < 8 {
        return;
    }
    f.render_widget(Clear, area);

    let entries = help_entries(app);
    // Border top and bottom, header row and its margin.
    let visible = area.height.saturating_sub(4) as usize;
    let (start, max_scroll) = scroll_window(entries.len(), visible, app.help_scroll_offset);

    let rows: Vec<Row> = entries
        .iter()
        .skip(start)
        .take(visible)
        .map(|entry| match entry {
            HelpEntry::Section(label) => Row::new(vec![
                Line::from(Span::styled(*label, app.theme.heading)),
                Line::default(),
            ]),
            HelpEntry::Binding { keys, description } => {
                Row::new(vec![format!("  {}", keys), description.to_string()])
            }
            HelpEntry::Blank => Row::new(vec![String::new(), String::new()]),
        })
        .collect();

    let title = if max_scroll > 0 {
        format!(" Keys ({}/{}) ", start + 1, max_scroll + 1)
    } else {
        " Keys ".to_string()
    };

    let table = Table::new(rows, [Constraint::Length(22), Constraint::Min(20)])
        .header(
            Row::new(vec!["Key", "Action"])
                .style(app.theme.muted.add_modifier(Modifier::BOLD))
                .bottom_margin(1),
        )
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_focused)
                .title(title),
        )
        .style(app.theme.body);
    f.render_widget(table, area);

    let footer = Rect {
        x: area.x + 2,
        y: area.y + area.height - 1,
        width: area.width.saturating_sub(4),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(Span::styled(footer_hint(app, max_scroll > 0), app.theme.hint)),
        footer,
    );
}

/// First visible entry and the largest useful offset.
pub(super) fn scroll_window(total: usize, visible: usize, offset: usize) -> (usize, usize) {
    let max_scroll = total.saturating_sub(visible);
    (offset.min(max_scroll), max_scroll)
}

fn footer_hint(app: &App, scrollable: bool) -> String {
    let first = |action| {
        app.keybindings
            .keys_for(Context::Global, action)
            .into_iter()
            .next()
            .unwrap_or_default()
    };
    let close = format!(" {}/Esc close ", first(Action::ShowHelp));
    if scrollable {
        format!(" {}/{} scroll,{}", first(Action::NavDown), first(Action::NavUp), close)
    } else {
        close
    }
}

pub(super) fn help_entries(app: &App) -> Vec<HelpEntry> {
    let bindings = app.keybindings.all_bindings();
    let mut entries = Vec::new();

    for (context, label) in SECTIONS {
        let mut grouped: Vec<(Action, Vec<String>, &'static str)> = Vec::new();
        for (_, key, action, description) in bindings.iter().filter(|b| b.0 == context) {
            match grouped.iter_mut().find(|(a, _, _)| *a == *action) {
                Some((_, keys, _)) => keys.push(key.clone()),
                None => grouped.push((*action, vec![key.clone()], *description)),
            }
        }
        if grouped.is_empty() {
            continue;
        }

        if !entries.is_empty() {
            entries.push(HelpEntry::Blank);
        }
        entries.push(HelpEntry::Section(label));
        entries.extend(grouped.into_iter().map(|(_, keys, description)| HelpEntry::Binding {
            keys: keys.join(", "),
            description,
        }));
    }
    entries
}
