//! Background API tasks.
//!
//! Every backend call runs on its own tokio task and reports back through the
//! `AppEvent` channel. Panics inside a task are caught and delivered as
//! `AppEvent::TaskPanicked` so the loop keeps running.

use crate::api::{BotTokenRequest, NewSubscription, PushSettings};
use crate::app::{App, AppEvent};
use crate::posts::PostsRequest;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Run a future, converting a panic into an error message.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

/// Spawn a task whose output is a single event.
fn spawn_event<F>(task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    spawn_event_or(task, tx, future, move |error| AppEvent::TaskPanicked {
        task,
        error,
    })
}

/// Like [`spawn_event`], with the event sent when the task panics.
fn spawn_event_or<F, P>(
    task: &'static str,
    tx: &mpsc::Sender<AppEvent>,
    future: F,
    on_panic: P,
) -> JoinHandle<()>
where
    F: Future<Output = AppEvent> + Send + 'static,
    P: FnOnce(String) -> AppEvent + Send + 'static,
{
    let tx = tx.clone();
    tokio::spawn(async move {
        let event = match catch_task_panic(future).await {
            Ok(event) => event,
            Err(error) => {
                tracing::error!(task, error = %error, "Background task panicked");
                on_panic(error)
            }
        };
        if let Err(e) = tx.send(event).await {
            tracing::warn!(task, error = %e, "Channel send failed (receiver dropped)");
        }
    })
}

/// Spawn a tracked task; nothing is spawned once the session has ended.
fn spawn_tracked<F>(app: &mut App, task: &'static str, tx: &mpsc::Sender<AppEvent>, future: F)
where
    F: Future<Output = AppEvent> + Send + 'static,
{
    if app.exit.is_some() {
        return;
    }
    tracing::debug!(task, "Spawning API task");
    let handle = spawn_event(task, tx, future);
    app.track(handle);
}

// ============================================================================
// Posts
// ============================================================================

/// Run a posts request, aborting the previous one still in flight.
pub(super) fn spawn_posts(
    app: &mut App,
    req: PostsRequest,
    announce: bool,
    tx: &mpsc::Sender<AppEvent>,
) {
    if app.exit.is_some() {
        return;
    }
    if let Some(handle) = app.posts_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous posts request");
    }

    let client = app.client.clone();
    let seq = req.seq;
    app.posts_handle = Some(spawn_event_or(
        "posts",
        tx,
        async move {
            let result = client.list_posts(req.page, req.limit, &req.filters).await;
            AppEvent::PostsLoaded {
                seq,
                announce,
                result,
            }
        },
        move |error| AppEvent::PostsTaskPanicked { seq, error },
    ));
    app.needs_redraw = true;
}

// ============================================================================
// Loads
// ============================================================================

pub(super) fn load_stats(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.stats_loading = true;
    let client = app.client.clone();
    spawn_tracked(app, "stats", tx, async move {
        AppEvent::StatsLoaded(client.get_stats().await)
    });
}

pub(super) fn load_config(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.config_loading = true;
    let client = app.client.clone();
    spawn_tracked(app, "config", tx, async move {
        AppEvent::ConfigLoaded(client.get_config().await)
    });
}

pub(super) fn load_telegram_status(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.telegram_loading = true;
    let client = app.client.clone();
    spawn_tracked(app, "telegram_status", tx, async move {
        AppEvent::TelegramStatusLoaded(client.telegram_status().await)
    });
}

pub(super) fn load_subscriptions(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.subscriptions_loading = true;
    let client = app.client.clone();
    spawn_tracked(app, "subscriptions", tx, async move {
        AppEvent::SubscriptionsLoaded(client.list_subscriptions().await)
    });
}

// ============================================================================
// Commands
// ============================================================================

pub(super) fn create_subscription(
    app: &mut App,
    sub: NewSubscription,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    spawn_tracked(app, "create_subscription", tx, async move {
        AppEvent::SubscriptionCreated(client.create_subscription(&sub).await)
    });
}

pub(super) fn delete_subscription(app: &mut App, id: i64, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_tracked(app, "delete_subscription", tx, async move {
        let result = client.delete_subscription(id).await;
        AppEvent::SubscriptionDeleted { id, result }
    });
}

pub(super) fn save_push_settings(
    app: &mut App,
    settings: PushSettings,
    tx: &mpsc::Sender<AppEvent>,
) {
    app.settings_saving = true;
    let client = app.client.clone();
    spawn_tracked(app, "push_settings", tx, async move {
        let result = client.update_push_settings(settings).await;
        AppEvent::PushSettingsSaved { settings, result }
    });
}

pub(super) fn set_bot_token(app: &mut App, req: BotTokenRequest, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_tracked(app, "bot_token", tx, async move {
        AppEvent::BotTokenSaved(client.set_bot_token(&req).await)
    });
}

pub(super) fn test_bot(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_tracked(app, "test_bot", tx, async move {
        AppEvent::BotTested(client.test_bot().await)
    });
}

pub(super) fn send_test_message(
    app: &mut App,
    message: Option<String>,
    tx: &mpsc::Sender<AppEvent>,
) {
    let client = app.client.clone();
    spawn_tracked(app, "send_test", tx, async move {
        AppEvent::TestMessageSent(client.send_test_message(message.as_deref()).await)
    });
}

pub(super) fn unbind_user(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_tracked(app, "unbind", tx, async move {
        AppEvent::UserUnbound(client.unbind_user().await)
    });
}

pub(super) fn fetch_rss(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    app.rss_fetching = true;
    let client = app.client.clone();
    spawn_tracked(app, "rss_fetch", tx, async move {
        AppEvent::RssFetched(client.fetch_rss().await)
    });
}

pub(super) fn logout(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let client = app.client.clone();
    spawn_tracked(app, "logout", tx, async move {
        AppEvent::LoggedOut(client.logout().await)
    });
}
