//! Application event handling.
//!
//! Processes completion events from background API tasks. A `401` on any
//! event ends the session before anything else is looked at.

use crate::api::{
    ApiError, BotTokenOutcome, PostsPage, RssFetchOutcome, Subscription, TelegramStatus,
    UserConfig,
};
use crate::app::{App, AppEvent, ExitReason, NoticeKind};
use crate::posts::Applied;
use tokio::sync::mpsc;

use super::tasks;

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent, event_tx: &mpsc::Sender<AppEvent>) {
    if app.session_expired() {
        tracing::debug!("Ignoring event after session expiry");
        return;
    }

    // Logging out is best-effort: the local credential goes either way.
    if let AppEvent::LoggedOut(result) = event {
        handle_logged_out(app, result);
        return;
    }

    if event.error().is_some_and(ApiError::is_unauthorized) {
        app.expire_session();
        return;
    }

    match event {
        AppEvent::StatsLoaded(result) => {
            app.stats_loading = false;
            match result {
                Ok(stats) => app.stats = Some(stats),
                Err(e) => app.notify_failure(&e, "Failed to load stats"),
            }
        }
        AppEvent::ConfigLoaded(result) => handle_config_loaded(app, result, event_tx),
        AppEvent::TelegramStatusLoaded(result) => handle_telegram_status(app, result),
        AppEvent::SubscriptionsLoaded(result) => handle_subscriptions_loaded(app, result),
        AppEvent::SubscriptionCreated(result) => match result {
            Ok(()) => {
                app.notify(NoticeKind::Success, "Subscription added");
                tasks::load_subscriptions(app, event_tx);
                tasks::load_stats(app, event_tx);
            }
            Err(e) => app.notify_failure(&e, "Failed to add subscription"),
        },
        AppEvent::SubscriptionDeleted { id, result } => match result {
            Ok(()) => {
                tracing::info!(id, "Subscription deleted");
                app.notify(NoticeKind::Success, "Subscription deleted");
                tasks::load_subscriptions(app, event_tx);
                tasks::load_stats(app, event_tx);
            }
            Err(e) => app.notify_failure(&e, "Failed to delete subscription"),
        },
        AppEvent::PostsLoaded {
            seq,
            announce,
            result,
        } => handle_posts_loaded(app, seq, announce, result),
        AppEvent::PushSettingsSaved { settings, result } => {
            app.settings_saving = false;
            match result {
                Ok(()) => {
                    if let Some(cfg) = app.user_config.as_mut() {
                        cfg.stop_push = settings.stop_push;
                        cfg.only_title = settings.only_title;
                    }
                    app.notify(NoticeKind::Success, "Push settings saved");
                }
                Err(e) => app.notify_failure(&e, "Failed to save push settings"),
            }
        }
        AppEvent::BotTokenSaved(result) => handle_bot_token_saved(app, result, event_tx),
        AppEvent::BotTested(result) => match result {
            Ok(message) => {
                let text = message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Bot connection test succeeded".to_string());
                app.notify(NoticeKind::Success, text);
            }
            Err(e) => app.notify_failure(&e, "Bot connection test failed"),
        },
        AppEvent::TestMessageSent(result) => match result {
            Ok(()) => app.notify(NoticeKind::Success, "Test message sent"),
            Err(e) => app.notify_failure(&e, "Failed to send test message"),
        },
        AppEvent::UserUnbound(result) => match result {
            Ok(()) => {
                app.notify(NoticeKind::Success, "User binding removed");
                tasks::load_telegram_status(app, event_tx);
            }
            Err(e) => app.notify_failure(&e, "Failed to unbind user"),
        },
        AppEvent::RssFetched(result) => handle_rss_fetched(app, result, event_tx),
        AppEvent::LoggedOut(_) => {}
        AppEvent::PostsTaskPanicked { seq, error } => {
            tracing::error!(seq, error = %error, "Posts task panicked");
            if app.posts.fail(seq) == Applied::Current {
                app.notify(NoticeKind::Error, "Internal error in posts task");
            }
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.notify(NoticeKind::Error, format!("Internal error in {} task", task));
        }
    }
}

fn handle_config_loaded(
    app: &mut App,
    result: Result<UserConfig, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    app.config_loading = false;
    match result {
        Ok(cfg) => {
            let has_token = cfg.has_bot_token();
            app.user_config = Some(cfg);
            if has_token {
                tasks::load_telegram_status(app, event_tx);
            } else {
                app.telegram = None;
            }
        }
        Err(e) => app.notify_failure(&e, "Failed to load config"),
    }
}

fn handle_telegram_status(app: &mut App, result: Result<TelegramStatus, ApiError>) {
    app.telegram_loading = false;
    let announce = std::mem::take(&mut app.announce_telegram);
    match result {
        Ok(status) => {
            app.telegram = Some(status);
            if announce {
                app.notify(NoticeKind::Success, "Status refreshed");
            }
        }
        Err(e) => app.notify_failure(&e, "Failed to load Telegram status"),
    }
}

fn handle_subscriptions_loaded(app: &mut App, result: Result<Vec<Subscription>, ApiError>) {
    app.subscriptions_loading = false;
    match result {
        Ok(subs) => {
            app.subscriptions = subs;
            app.subscriptions_loaded = true;
            app.clamp_subscription_selection();
        }
        Err(e) => app.notify_failure(&e, "Failed to load subscriptions"),
    }
}

fn handle_posts_loaded(
    app: &mut App,
    seq: u64,
    announce: bool,
    result: Result<PostsPage, ApiError>,
) {
    match result {
        Ok(page) => {
            if app.posts.apply(seq, page) == Applied::Current && announce {
                app.notify(NoticeKind::Success, "Posts list refreshed");
            }
        }
        Err(e) => {
            if app.posts.fail(seq) == Applied::Current {
                tracing::warn!(seq, error = %e, "Posts request failed");
                app.notify_failure(&e, "Failed to load posts");
            }
        }
    }
}

fn handle_bot_token_saved(
    app: &mut App,
    result: Result<BotTokenOutcome, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            app.notify_failure(&e, "Failed to set bot token");
            return;
        }
    };

    if outcome.webhook_set {
        app.notify(NoticeKind::Success, "Bot token and webhook set");
    } else {
        match (&outcome.webhook_error, outcome.webhook_suggestions) {
            (Some(error), Some(suggestions)) if !suggestions.is_empty() => {
                let mut details = vec![format!("Error: {}", error)];
                details.extend(suggestions);
                app.notify_detailed(
                    NoticeKind::Warning,
                    "Bot token saved, but webhook setup failed",
                    details,
                );
            }
            _ => app.notify(
                NoticeKind::Warning,
                "Bot token saved, but webhook setup failed",
            ),
        }
    }
    tasks::load_config(app, event_tx);
}

fn handle_rss_fetched(
    app: &mut App,
    result: Result<RssFetchOutcome, ApiError>,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    app.rss_fetching = false;
    match result {
        Ok(outcome) => {
            app.notify(
                NoticeKind::Success,
                format!("RSS updated, {} new posts", outcome.new),
            );
            let req = app.posts.reload_first_page();
            tasks::spawn_posts(app, req, false, event_tx);
            tasks::load_stats(app, event_tx);
        }
        Err(e) => app.notify_failure(&e, "RSS update failed"),
    }
}

fn handle_logged_out(app: &mut App, result: Result<(), ApiError>) {
    match result {
        Ok(()) => tracing::info!("Server session cleared"),
        Err(e) => tracing::warn!(error = %e, "Server-side logout failed"),
    }
    if let Err(e) = app.session.clear() {
        tracing::error!(error = %e, "Failed to clear session file");
    }
    app.abort_tasks();
    app.exit = Some(ExitReason::LoggedOut);
}
