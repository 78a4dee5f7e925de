//! Input handling for the TUI.
//!
//! Keys are resolved to actions through the keybinding registry in the
//! context of whatever currently has focus: help overlay, confirm dialog,
//! modal form, posts filter editor, or the active tab.

use crate::api::{BotTokenRequest, NewSubscription};
use crate::app::{App, AppEvent, ConfirmAction, ExitReason, NoticeKind, Tab};
use crate::form::{Form, FormKind};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::validate_link;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::tasks;

/// Main input dispatch function.
pub(super) fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    if app.exit.is_some() {
        return;
    }

    if app.show_help {
        handle_help_input(app, code);
        return;
    }

    if app.pending_confirm.is_some() {
        handle_confirm_input(app, code, modifiers, event_tx);
        return;
    }

    if app.form.is_some() {
        handle_form_input(app, code, modifiers, event_tx);
        return;
    }

    if app.editing_filters && app.tab == Tab::Posts {
        handle_filter_input(app, code, modifiers, event_tx);
        return;
    }

    let action = app
        .keybindings
        .action_for_key(code, modifiers, app.tab.context());
    if let Some(action) = action {
        handle_tab_action(app, action, event_tx);
    }
}

/// Help overlay captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
}

// ============================================================================
// Tabs
// ============================================================================

/// Switch tabs and load the data the new tab shows.
pub(super) fn switch_tab(app: &mut App, tab: Tab, event_tx: &mpsc::Sender<AppEvent>) {
    app.tab = tab;
    app.editing_filters = false;
    tracing::debug!(tab = tab.title(), "Switched tab");
    match tab {
        Tab::Config => tasks::load_config(app, event_tx),
        Tab::Subscriptions => tasks::load_subscriptions(app, event_tx),
        Tab::Posts => {
            let req = app.posts.refresh();
            tasks::spawn_posts(app, req, false, event_tx);
        }
        Tab::Stats => tasks::load_stats(app, event_tx),
    }
}

fn handle_tab_action(app: &mut App, action: KbAction, event_tx: &mpsc::Sender<AppEvent>) {
    match action {
        KbAction::Quit => app.exit = Some(ExitReason::Quit),
        KbAction::Logout => app.pending_confirm = Some(ConfirmAction::Logout),
        KbAction::ShowHelp => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        KbAction::Back => app.notice = None,
        KbAction::NextTab => {
            let tab = app.tab.next();
            switch_tab(app, tab, event_tx);
        }
        KbAction::PrevTab => {
            let tab = app.tab.prev();
            switch_tab(app, tab, event_tx);
        }
        KbAction::TabConfig => switch_tab(app, Tab::Config, event_tx),
        KbAction::TabSubscriptions => switch_tab(app, Tab::Subscriptions, event_tx),
        KbAction::TabPosts => switch_tab(app, Tab::Posts, event_tx),
        KbAction::TabStats => switch_tab(app, Tab::Stats, event_tx),
        KbAction::NavDown => match app.tab {
            Tab::Subscriptions => {
                if app.selected_subscription + 1 < app.subscriptions.len() {
                    app.selected_subscription += 1;
                }
            }
            Tab::Posts => app.posts.select_next(),
            _ => {}
        },
        KbAction::NavUp => match app.tab {
            Tab::Subscriptions => {
                app.selected_subscription = app.selected_subscription.saturating_sub(1);
            }
            Tab::Posts => app.posts.select_prev(),
            _ => {}
        },
        KbAction::Refresh => refresh_tab(app, event_tx),

        // Config tab
        KbAction::SetBotToken => {
            app.form = Some(Form::bot_token(&app.client.default_webhook_url()));
        }
        KbAction::TestBot => {
            if require_bot_token(app) {
                app.notify(NoticeKind::Info, "Testing bot connection...");
                tasks::test_bot(app, event_tx);
            }
        }
        KbAction::SendTestMessage => {
            if require_bot_token(app) {
                app.form = Some(Form::send_test_message());
            }
        }
        KbAction::UnbindUser => {
            if app.telegram.as_ref().is_some_and(|t| t.is_bound()) {
                app.pending_confirm = Some(ConfirmAction::UnbindUser);
            } else {
                app.notify(NoticeKind::Info, "No Telegram user is bound");
            }
        }
        KbAction::ToggleStopPush => toggle_push_setting(app, event_tx, |s| {
            s.stop_push = !s.stop_push;
        }),
        KbAction::ToggleOnlyTitle => toggle_push_setting(app, event_tx, |s| {
            s.only_title = !s.only_title;
        }),

        // Subscriptions tab
        KbAction::AddSubscription => app.form = Some(Form::add_subscription()),
        KbAction::DeleteSubscription => {
            if let Some(sub) = app.selected_subscription() {
                let summary = sub
                    .keywords()
                    .or_else(|| sub.creator.clone())
                    .or_else(|| sub.category.clone())
                    .unwrap_or_else(|| format!("#{}", sub.id));
                app.pending_confirm = Some(ConfirmAction::DeleteSubscription {
                    id: sub.id,
                    summary,
                });
            }
        }

        // Posts tab
        KbAction::EditFilters => app.editing_filters = true,
        KbAction::ClearFilters => {
            let req = app.posts.clear();
            tasks::spawn_posts(app, req, false, event_tx);
        }
        KbAction::NextPage => {
            if let Some(req) = app.posts.next_page() {
                tasks::spawn_posts(app, req, false, event_tx);
            }
        }
        KbAction::PrevPage => {
            if let Some(req) = app.posts.prev_page() {
                tasks::spawn_posts(app, req, false, event_tx);
            }
        }
        KbAction::FirstPage => {
            if let Some(req) = app.posts.goto_page(1) {
                tasks::spawn_posts(app, req, false, event_tx);
            }
        }
        KbAction::LastPage => {
            let last = app.posts.page().total_pages;
            if let Some(req) = app.posts.goto_page(last) {
                tasks::spawn_posts(app, req, false, event_tx);
            }
        }
        KbAction::GotoPage => {
            if app.posts.page().total_pages > 1 {
                app.form = Some(Form::goto_page());
            }
        }
        KbAction::OpenInBrowser => open_selected_post(app),
        KbAction::FetchRss => {
            if !app.rss_fetching {
                app.notify(NoticeKind::Info, "Updating RSS...");
                tasks::fetch_rss(app, event_tx);
            }
        }

        // Modal-only actions never resolve in a tab context.
        KbAction::Submit
        | KbAction::Cancel
        | KbAction::NextField
        | KbAction::PrevField
        | KbAction::Confirm
        | KbAction::Deny => {}
    }
}

fn refresh_tab(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    match app.tab {
        Tab::Config => {
            app.notify(NoticeKind::Info, "Refreshing status...");
            app.announce_telegram = app.has_bot_token();
            tasks::load_config(app, event_tx);
        }
        Tab::Subscriptions => tasks::load_subscriptions(app, event_tx),
        Tab::Posts => {
            let req = app.posts.refresh();
            tasks::spawn_posts(app, req, true, event_tx);
        }
        Tab::Stats => tasks::load_stats(app, event_tx),
    }
}

fn require_bot_token(app: &mut App) -> bool {
    if app.has_bot_token() {
        true
    } else {
        app.notify(NoticeKind::Warning, "Set a bot token first");
        false
    }
}

fn toggle_push_setting(
    app: &mut App,
    event_tx: &mpsc::Sender<AppEvent>,
    change: impl FnOnce(&mut crate::api::PushSettings),
) {
    if app.settings_saving {
        return;
    }
    let Some(cfg) = app.user_config.as_ref() else {
        return;
    };
    let mut settings = cfg.push_settings();
    change(&mut settings);
    tasks::save_push_settings(app, settings, event_tx);
}

fn open_selected_post(app: &mut App) {
    let Some(post) = app.posts.selected_post() else {
        return;
    };
    let link = app.post_link(post);
    match validate_link(&link) {
        Ok(url) => {
            if let Err(e) = open::that(url.as_str()) {
                tracing::warn!(error = %e, "Failed to open browser");
                app.notify(NoticeKind::Error, format!("Failed to open browser: {}", e));
            }
        }
        Err(e) => app.notify(NoticeKind::Error, format!("Invalid post link: {}", e)),
    }
}

// ============================================================================
// Confirm dialog
// ============================================================================

fn handle_confirm_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Confirm)
    {
        Some(KbAction::Confirm) => {
            let Some(confirm) = app.pending_confirm.take() else {
                return;
            };
            match confirm {
                ConfirmAction::DeleteSubscription { id, .. } => {
                    tasks::delete_subscription(app, id, event_tx);
                }
                ConfirmAction::UnbindUser => tasks::unbind_user(app, event_tx),
                ConfirmAction::Logout => {
                    app.notify(NoticeKind::Info, "Logging out...");
                    tasks::logout(app, event_tx);
                }
            }
        }
        Some(KbAction::Deny) => app.pending_confirm = None,
        _ => {}
    }
}

// ============================================================================
// Forms
// ============================================================================

fn handle_form_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let action = app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Form);
    let Some(form) = app.form.as_mut() else {
        return;
    };

    match action {
        Some(KbAction::Submit) => submit_form(app, event_tx),
        Some(KbAction::Cancel) => app.form = None,
        Some(KbAction::NextField) => form.next_field(),
        Some(KbAction::PrevField) => form.prev_field(),
        _ => match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => form.push_char(c),
            KeyCode::Backspace => form.backspace(),
            _ => {}
        },
    }
}

fn submit_form(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let Some(mut form) = app.form.take() else {
        return;
    };

    match form.kind {
        FormKind::BotToken => {
            if form.value(0).trim().is_empty() {
                app.notify(NoticeKind::Error, "Please enter a bot token");
                app.form = Some(form);
                return;
            }
            let token = form.take_secret(0);
            let req = BotTokenRequest::new(token, Some(form.value(1)));
            app.notify(NoticeKind::Info, "Saving bot token...");
            tasks::set_bot_token(app, req, event_tx);
        }
        FormKind::AddSubscription => {
            let sub = NewSubscription::from_inputs(
                [form.value(0), form.value(1), form.value(2)],
                form.value(3),
                form.value(4),
            );
            if !sub.has_condition() {
                app.notify(
                    NoticeKind::Error,
                    "Enter at least one keyword, creator or category",
                );
                app.form = Some(form);
                return;
            }
            tasks::create_subscription(app, sub, event_tx);
        }
        FormKind::SendTestMessage => {
            let message = form.value(0).trim();
            let message = (!message.is_empty()).then(|| message.to_string());
            tasks::send_test_message(app, message, event_tx);
        }
        FormKind::GotoPage => {
            let total = app.posts.page().total_pages;
            match form.value(0).parse::<u32>() {
                Ok(page) if page == app.posts.requested_page() => {}
                Ok(page) if (1..=total).contains(&page) => {
                    if let Some(req) = app.posts.goto_page(page) {
                        tasks::spawn_posts(app, req, false, event_tx);
                    }
                }
                _ => {
                    app.notify(
                        NoticeKind::Error,
                        format!("Enter a page between 1 and {}", total),
                    );
                    app.form = Some(form);
                }
            }
        }
    }
}

// ============================================================================
// Posts filter editor
// ============================================================================

fn handle_filter_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match app
        .keybindings
        .action_for_key(code, modifiers, KbContext::Form)
    {
        Some(KbAction::Submit) => {
            app.editing_filters = false;
            let req = app.posts.submit();
            tasks::spawn_posts(app, req, false, event_tx);
        }
        Some(KbAction::Cancel) => app.editing_filters = false,
        Some(KbAction::NextField) => app.posts.focus_next_field(),
        Some(KbAction::PrevField) => app.posts.focus_prev_field(),
        _ => match code {
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => {
                app.posts.input_char(c)
            }
            KeyCode::Backspace => app.posts.input_backspace(),
            _ => {}
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Subscription, TelegramStatus, UserConfig};
    use crate::app::test_app;

    fn press(app: &mut App, code: KeyCode, tx: &mpsc::Sender<AppEvent>) {
        handle_input(app, code, KeyModifiers::NONE, tx);
    }

    fn type_str(app: &mut App, s: &str, tx: &mpsc::Sender<AppEvent>) {
        for c in s.chars() {
            press(app, KeyCode::Char(c), tx);
        }
    }

    fn subscription(id: i64, keyword: &str) -> Subscription {
        Subscription {
            id,
            keyword1: Some(keyword.to_string()),
            keyword2: None,
            keyword3: None,
            creator: None,
            category: None,
        }
    }

    #[tokio::test]
    async fn test_number_keys_switch_tabs_and_load() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_tabs");
        press(&mut app, KeyCode::Char('2'), &tx);
        assert_eq!(app.tab, Tab::Subscriptions);
        assert!(app.subscriptions_loading);

        press(&mut app, KeyCode::Char('3'), &tx);
        assert_eq!(app.tab, Tab::Posts);
        assert!(app.posts.is_loading());
        assert!(app.posts_handle.is_some());
    }

    #[tokio::test]
    async fn test_quit_sets_exit() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_quit");
        press(&mut app, KeyCode::Char('q'), &tx);
        assert_eq!(app.exit, Some(ExitReason::Quit));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_delete");
        app.tab = Tab::Subscriptions;
        app.subscriptions = vec![subscription(7, "rust"), subscription(8, "tokio")];
        press(&mut app, KeyCode::Char('j'), &tx);
        press(&mut app, KeyCode::Char('d'), &tx);

        assert_eq!(
            app.pending_confirm,
            Some(ConfirmAction::DeleteSubscription {
                id: 8,
                summary: "tokio".to_string()
            })
        );

        press(&mut app, KeyCode::Char('n'), &tx);
        assert!(app.pending_confirm.is_none());
        assert!(app.tasks.is_empty());
    }

    #[tokio::test]
    async fn test_empty_subscription_form_is_rejected_locally() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_sub_form");
        app.tab = Tab::Subscriptions;
        press(&mut app, KeyCode::Char('a'), &tx);
        type_str(&mut app, "   ", &tx);
        press(&mut app, KeyCode::Enter, &tx);

        assert!(app.form.is_some());
        assert!(app.tasks.is_empty());
        assert_eq!(app.notice.as_ref().unwrap().kind, NoticeKind::Error);
    }

    #[tokio::test]
    async fn test_form_swallows_tab_shortcuts() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_form_typing");
        app.tab = Tab::Subscriptions;
        press(&mut app, KeyCode::Char('a'), &tx);
        type_str(&mut app, "q2", &tx);

        assert_eq!(app.form.as_ref().unwrap().value(0), "q2");
        assert_eq!(app.tab, Tab::Subscriptions);
        assert!(app.exit.is_none());
    }

    #[tokio::test]
    async fn test_bot_token_required() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_bot_token");
        press(&mut app, KeyCode::Char('b'), &tx);
        assert_eq!(
            app.form.as_ref().unwrap().value(1),
            "http://127.0.0.1:9/telegram/webhook"
        );
        press(&mut app, KeyCode::Enter, &tx);
        assert!(app.form.is_some());

        type_str(&mut app, "123:abc", &tx);
        press(&mut app, KeyCode::Enter, &tx);
        assert!(app.form.is_none());
        assert_eq!(app.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_unbind_only_offered_when_bound() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_unbind");
        press(&mut app, KeyCode::Char('u'), &tx);
        assert!(app.pending_confirm.is_none());

        let mut status = TelegramStatus {
            configured: true,
            connected: true,
            bound: true,
            ..TelegramStatus::default()
        };
        status.config.has_chat_id = true;
        app.telegram = Some(status);
        press(&mut app, KeyCode::Char('u'), &tx);
        assert_eq!(app.pending_confirm, Some(ConfirmAction::UnbindUser));
    }

    #[tokio::test]
    async fn test_toggle_push_setting_spawns_save() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_toggle");
        press(&mut app, KeyCode::Char('s'), &tx);
        assert!(!app.settings_saving);

        app.user_config = Some(UserConfig::default());
        press(&mut app, KeyCode::Char('s'), &tx);
        assert!(app.settings_saving);
        // A second toggle waits for the first save.
        press(&mut app, KeyCode::Char('o'), &tx);
        assert_eq!(app.tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_returning_to_posts_keeps_page_and_filters() {
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_posts_return");
        app.tab = Tab::Posts;
        press(&mut app, KeyCode::Char('/'), &tx);
        type_str(&mut app, "rust", &tx);
        press(&mut app, KeyCode::Enter, &tx);
        let seq = app.posts.latest_seq();
        app.posts.apply(
            seq,
            crate::api::PostsPage {
                posts: Vec::new(),
                total: 60,
                page: 3,
                total_pages: 3,
            },
        );

        press(&mut app, KeyCode::Char('1'), &tx);
        press(&mut app, KeyCode::Char('3'), &tx);

        assert_eq!(app.tab, Tab::Posts);
        assert_eq!(app.posts.latest_seq(), seq + 1);
        assert_eq!(app.posts.requested_page(), 3);
        assert_eq!(
            app.posts.filters().get(crate::filters::FilterKey::Search),
            Some("rust")
        );
    }

    #[tokio::test]
    async fn test_filter_typing_is_debounced() {
        tokio::time::pause();
        let (tx, _rx) = mpsc::channel(16);
        let mut app = test_app("input_filters");
        app.tab = Tab::Posts;
        press(&mut app, KeyCode::Char('/'), &tx);
        assert!(app.editing_filters);

        let before = app.posts.latest_seq();
        type_str(&mut app, "rust", &tx);
        assert_eq!(app.posts.latest_seq(), before);
        assert!(app.posts.debounce_deadline().is_some());

        press(&mut app, KeyCode::Enter, &tx);
        assert!(!app.editing_filters);
        assert_eq!(app.posts.latest_seq(), before + 1);
        assert!(app.posts.debounce_deadline().is_none());
        assert_eq!(
            app.posts.filters().get(crate::filters::FilterKey::Search),
            Some("rust")
        );
    }
}
