//! Semantic styles for the dashboard.
//!
//! Render code asks for a role (`theme.selected`, `theme.notice(kind)`)
//! rather than hardcoding colors.

use ratatui::style::{Color, Modifier, Style};

use crate::api::PushStatus;
use crate::app::NoticeKind;

#[derive(Debug, Clone)]
pub struct Theme {
    // -- Chrome --
    pub border: Style,
    pub border_focused: Style,
    pub tab: Style,
    pub tab_active: Style,
    pub status_bar: Style,
    pub hint: Style,

    // -- Content --
    pub heading: Style,
    pub body: Style,
    pub muted: Style,
    pub selected: Style,
    pub card_value: Style,
    pub ok: Style,
    pub bad: Style,

    // -- Page strip --
    pub page: Style,
    pub page_active: Style,
    pub page_disabled: Style,

    // -- Notices --
    pub info: Style,
    pub success: Style,
    pub warning: Style,
    pub error: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            border: Style::default().fg(Color::DarkGray),
            border_focused: Style::default().fg(Color::Cyan),
            tab: Style::default().fg(Color::Gray),
            tab_active: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            hint: Style::default().fg(Color::DarkGray),

            heading: Style::default().add_modifier(Modifier::BOLD),
            body: Style::default(),
            muted: Style::default().fg(Color::Gray),
            selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            card_value: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            ok: Style::default().fg(Color::Green),
            bad: Style::default().fg(Color::Red),

            page: Style::default().fg(Color::White),
            page_active: Style::default()
                .bg(Color::Cyan)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
            page_disabled: Style::default().fg(Color::DarkGray),

            info: Style::default().bg(Color::Blue).fg(Color::White),
            success: Style::default().bg(Color::Green).fg(Color::Black),
            warning: Style::default().bg(Color::Yellow).fg(Color::Black),
            error: Style::default().bg(Color::Red).fg(Color::White),
        }
    }
}

impl Theme {
    pub fn notice(&self, kind: NoticeKind) -> Style {
        match kind {
            NoticeKind::Info => self.info,
            NoticeKind::Success => self.success,
            NoticeKind::Warning => self.warning,
            NoticeKind::Error => self.error,
        }
    }

    pub fn push_status(&self, status: PushStatus) -> Style {
        match status {
            PushStatus::Pushed => self.ok,
            PushStatus::Pending => Style::default().fg(Color::Yellow),
            PushStatus::Skipped => self.muted,
        }
    }

    /// Green for a healthy flag, red otherwise.
    pub fn flag(&self, healthy: bool) -> Style {
        if healthy {
            self.ok
        } else {
            self.bad
        }
    }
}
