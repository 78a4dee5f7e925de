//! Config tab: bot token state, Telegram bot health and binding, push
//! settings.

use crate::api::{format_timestamp, TelegramStatus, UserConfig};
use crate::app::App;
use crate::theme::Theme;
use crate::util::sanitize;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the config tab
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let telegram = match &app.user_config {
        None if app.config_loading => vec![Line::from("Loading config...")],
        None => vec![Line::from("Config not loaded, press [r] to retry")],
        Some(cfg) => telegram_lines(
            cfg,
            app.telegram.as_ref(),
            app.telegram_loading,
            &app.theme,
        ),
    };
    f.render_widget(
        Paragraph::new(telegram)
            .wrap(Wrap { trim: false })
            .block(panel(" Telegram ", &app.theme)),
        chunks[0],
    );

    let settings = match &app.user_config {
        Some(cfg) => push_settings_lines(cfg, app.settings_saving, &app.theme),
        None => Vec::new(),
    };
    f.render_widget(
        Paragraph::new(settings).block(panel(" Push Settings ", &app.theme)),
        chunks[1],
    );
}

fn panel<'a>(title: &'a str, theme: &Theme) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border)
        .title(title)
}

fn field(label: &'static str, value: impl Into<String>, style: ratatui::style::Style) -> Line<'static> {
    Line::from(vec![
        Span::raw(format!("  {:<14}", label)),
        Span::styled(value.into(), style),
    ])
}

/// Bot token state, bot health and info, and binding details.
pub(super) fn telegram_lines(
    cfg: &UserConfig,
    status: Option<&TelegramStatus>,
    loading: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let configured = cfg.has_bot_token();
    let mut lines = vec![
        Line::from(Span::styled("Bot Token", theme.heading)),
        field(
            "Status",
            if configured { "Configured" } else { "Not configured" },
            theme.flag(configured),
        ),
    ];

    if !configured {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Press [b] to set a bot token from @BotFather",
            theme.muted,
        )));
        return lines;
    }

    let Some(status) = status else {
        let text = if loading {
            "  Checking bot status..."
        } else {
            "  Bot status unavailable"
        };
        lines.push(Line::from(Span::styled(text, theme.muted)));
        return lines;
    };

    lines.push(field(
        "Bot",
        if status.connected {
            "Running"
        } else {
            "Token invalid"
        },
        theme.flag(status.connected),
    ));

    if let Some(info) = status.visible_bot_info() {
        lines.push(field("Bot ID", info.id.to_string(), theme.body));
        lines.push(field(
            "Username",
            format!("@{}", sanitize(&info.username)),
            theme.body,
        ));
        lines.push(field("Name", sanitize(&info.first_name).into_owned(), theme.body));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("User Binding", theme.heading)));

    if status.is_bound() {
        let binding = &status.config;
        lines.push(field("Status", "Bound", theme.ok));
        lines.push(field(
            "User",
            binding
                .bound_user_name
                .as_deref()
                .map(|n| sanitize(n).into_owned())
                .unwrap_or_else(|| "Unknown".to_string()),
            theme.body,
        ));
        lines.push(field(
            "Username",
            binding
                .bound_user_username
                .as_deref()
                .map(|u| format!("@{}", sanitize(u)))
                .unwrap_or_else(|| "None".to_string()),
            theme.body,
        ));
        lines.push(field(
            "Chat ID",
            if binding.has_chat_id { "Set" } else { "Not set" },
            theme.flag(binding.has_chat_id),
        ));
        lines.push(field(
            "Bound at",
            binding
                .last_check_time
                .as_deref()
                .map(format_timestamp)
                .unwrap_or_else(|| "Unknown".to_string()),
            theme.body,
        ));
    } else {
        lines.push(field("Status", "Not bound", theme.bad));
        lines.push(Line::from(Span::styled(
            "  Open the bot in Telegram and send /start to bind your account",
            theme.muted,
        )));
    }

    lines
}

pub(super) fn push_settings_lines(
    cfg: &UserConfig,
    saving: bool,
    theme: &Theme,
) -> Vec<Line<'static>> {
    let checkbox = |on: bool| if on { "[x]" } else { "[ ]" };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(format!("{} ", checkbox(cfg.stop_push)), theme.heading),
            Span::raw("Stop push [s]"),
        ]),
        Line::from(vec![
            Span::styled(format!("{} ", checkbox(cfg.only_title)), theme.heading),
            Span::raw("Title only [o]"),
        ]),
    ];
    if saving {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Saving...", theme.muted)));
    }
    lines
}
