use crate::app::App;
use crate::keybindings::{Action, Context};
use ratatui::{layout::Rect, widgets::Paragraph, Frame};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let (text, style): (Cow<'_, str>, _) = match &app.notice {
        Some(notice) => (
            Cow::Borrowed(notice.text.as_ref()),
            app.theme.notice(notice.kind),
        ),
        None => (Cow::Owned(hints(app)), app.theme.status_bar),
    };

    f.render_widget(Paragraph::new(text).style(style), area);
}

/// Key hints for the focused context, built from the live bindings so
/// config overrides show up.
fn hints(app: &App) -> String {
    let context = app.kb_context();
    let actions: &[Action] = match context {
        Context::Config => &[
            Action::SetBotToken,
            Action::TestBot,
            Action::SendTestMessage,
            Action::UnbindUser,
            Action::ToggleStopPush,
            Action::ToggleOnlyTitle,
            Action::Refresh,
        ],
        Context::Subscriptions => &[
            Action::AddSubscription,
            Action::DeleteSubscription,
            Action::Refresh,
        ],
        Context::Posts => &[
            Action::EditFilters,
            Action::ClearFilters,
            Action::PrevPage,
            Action::NextPage,
            Action::GotoPage,
            Action::OpenInBrowser,
            Action::FetchRss,
        ],
        Context::Stats => &[Action::Refresh],
        Context::Form => &[Action::Submit, Action::NextField, Action::Cancel],
        Context::Confirm => &[Action::Confirm, Action::Deny],
        Context::Global => &[],
    };

    let mut parts: Vec<String> = actions
        .iter()
        .filter_map(|&action| hint(app, context, action))
        .collect();
    if !context.is_modal() {
        parts.extend(
            [Action::NextTab, Action::ShowHelp, Action::Quit]
                .into_iter()
                .filter_map(|action| hint(app, Context::Global, action)),
        );
    }
    parts.join("  ")
}

fn hint(app: &App, context: Context, action: Action) -> Option<String> {
    let mut keys = app.keybindings.keys_for(context, action);
    if keys.is_empty() && !context.is_modal() {
        keys = app.keybindings.keys_for(Context::Global, action);
    }
    let key = keys.into_iter().next()?;
    Some(format!("[{}] {}", key, action.name().replace('_', " ")))
}
