use crate::api::{
    ApiClient, ApiError, BotTokenOutcome, Post, PostsPage, PushSettings, RssFetchOutcome, Stats,
    Subscription, TelegramStatus, UserConfig,
};
use crate::config::Config;
use crate::form::Form;
use crate::keybindings::{Context, KeybindingRegistry};
use crate::posts::PostsController;
use crate::session::SessionStore;
use crate::theme::Theme;
use std::borrow::Cow;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Lifetime of a one-line notice.
pub const NOTICE_TTL: Duration = Duration::from_secs(3);
/// Lifetime of a notice with a detail list.
pub const DETAILED_NOTICE_TTL: Duration = Duration::from_secs(10);

// ============================================================================
// Tabs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Config,
    Subscriptions,
    Posts,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Config, Tab::Subscriptions, Tab::Posts, Tab::Stats];

    pub fn title(self) -> &'static str {
        match self {
            Tab::Config => "Config",
            Tab::Subscriptions => "Subscriptions",
            Tab::Posts => "Posts",
            Tab::Stats => "Stats",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Config => 0,
            Tab::Subscriptions => 1,
            Tab::Posts => 2,
            Tab::Stats => 3,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn context(self) -> Context {
        match self {
            Tab::Config => Context::Config,
            Tab::Subscriptions => Context::Subscriptions,
            Tab::Posts => Context::Posts,
            Tab::Stats => Context::Stats,
        }
    }
}

// ============================================================================
// Notices
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Transient message shown in the status bar (or as an overlay when it
/// carries details).
#[derive(Debug, Clone)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: Cow<'static, str>,
    pub details: Vec<String>,
    pub shown_at: Instant,
    pub ttl: Duration,
}

impl Notice {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= self.ttl
    }
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Destructive operations that need a yes/no first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteSubscription { id: i64, summary: String },
    UnbindUser,
    Logout,
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            ConfirmAction::DeleteSubscription { summary, .. } => {
                format!("Delete subscription \"{}\"?", summary)
            }
            ConfirmAction::UnbindUser => {
                "Unbind the Telegram user?\n\nPushes stop until someone binds again.".to_string()
            }
            ConfirmAction::Logout => "Log out of the dashboard?".to_string(),
        }
    }
}

/// Why the event loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    Quit,
    LoggedOut,
    SessionExpired,
}

// ============================================================================
// Background Events
// ============================================================================

/// Completion events sent by background API tasks.
#[derive(Debug)]
pub enum AppEvent {
    StatsLoaded(Result<Stats, ApiError>),
    ConfigLoaded(Result<UserConfig, ApiError>),
    TelegramStatusLoaded(Result<TelegramStatus, ApiError>),
    SubscriptionsLoaded(Result<Vec<Subscription>, ApiError>),
    SubscriptionCreated(Result<(), ApiError>),
    SubscriptionDeleted {
        id: i64,
        result: Result<(), ApiError>,
    },
    /// A posts page arrived for request `seq`.
    ///
    /// `announce` asks for a success notice (manual refresh).
    PostsLoaded {
        seq: u64,
        announce: bool,
        result: Result<PostsPage, ApiError>,
    },
    PushSettingsSaved {
        settings: PushSettings,
        result: Result<(), ApiError>,
    },
    BotTokenSaved(Result<BotTokenOutcome, ApiError>),
    BotTested(Result<Option<String>, ApiError>),
    TestMessageSent(Result<(), ApiError>),
    UserUnbound(Result<(), ApiError>),
    RssFetched(Result<RssFetchOutcome, ApiError>),
    LoggedOut(Result<(), ApiError>),
    /// The posts fetch for `seq` panicked.
    PostsTaskPanicked {
        seq: u64,
        error: String,
    },
    /// A background task panicked.
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

impl AppEvent {
    /// The API error this event carries, if any.
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            AppEvent::StatsLoaded(Err(e))
            | AppEvent::ConfigLoaded(Err(e))
            | AppEvent::TelegramStatusLoaded(Err(e))
            | AppEvent::SubscriptionsLoaded(Err(e))
            | AppEvent::SubscriptionCreated(Err(e))
            | AppEvent::SubscriptionDeleted { result: Err(e), .. }
            | AppEvent::PostsLoaded { result: Err(e), .. }
            | AppEvent::PushSettingsSaved { result: Err(e), .. }
            | AppEvent::BotTokenSaved(Err(e))
            | AppEvent::BotTested(Err(e))
            | AppEvent::TestMessageSent(Err(e))
            | AppEvent::UserUnbound(Err(e))
            | AppEvent::RssFetched(Err(e))
            | AppEvent::LoggedOut(Err(e)) => Some(e),
            _ => None,
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub client: ApiClient,
    pub config: Config,
    pub session: SessionStore,
    pub keybindings: KeybindingRegistry,
    pub theme: Theme,

    pub tab: Tab,

    // Data
    pub stats: Option<Stats>,
    pub user_config: Option<UserConfig>,
    pub telegram: Option<TelegramStatus>,
    pub subscriptions: Vec<Subscription>,
    pub subscriptions_loaded: bool,
    pub selected_subscription: usize,
    pub posts: PostsController,

    // Requests in flight, for spinners and duplicate suppression
    pub config_loading: bool,
    pub telegram_loading: bool,
    pub subscriptions_loading: bool,
    pub stats_loading: bool,
    pub rss_fetching: bool,
    pub settings_saving: bool,
    /// Announce the next Telegram status load (manual refresh).
    pub announce_telegram: bool,

    // Overlays
    /// Filter draft of the posts tab has keyboard focus.
    pub editing_filters: bool,
    pub form: Option<Form>,
    pub pending_confirm: Option<ConfirmAction>,
    pub show_help: bool,
    pub help_scroll_offset: usize,

    pub notice: Option<Notice>,

    /// Dirty flag to skip unnecessary frame renders
    pub needs_redraw: bool,

    /// Set once the loop must stop. A session expiry overrides anything else.
    pub exit: Option<ExitReason>,

    /// Handle of the latest posts fetch. A new fetch aborts the previous one.
    pub posts_handle: Option<JoinHandle<()>>,

    /// Other in-flight API tasks; aborted when the session ends.
    pub tasks: Vec<JoinHandle<()>>,
}

impl App {
    pub fn new(client: ApiClient, config: Config, session: SessionStore) -> Self {
        let mut keybindings = KeybindingRegistry::new();
        for warning in keybindings.apply_overrides(&config.keybindings) {
            tracing::warn!("{}", warning);
        }

        let posts = PostsController::new(config.page_size, config.search_debounce());

        Self {
            client,
            config,
            session,
            keybindings,
            theme: Theme::default(),
            tab: Tab::Config,
            stats: None,
            user_config: None,
            telegram: None,
            subscriptions: Vec::new(),
            subscriptions_loaded: false,
            selected_subscription: 0,
            posts,
            config_loading: false,
            telegram_loading: false,
            subscriptions_loading: false,
            stats_loading: false,
            rss_fetching: false,
            settings_saving: false,
            announce_telegram: false,
            editing_filters: false,
            form: None,
            pending_confirm: None,
            show_help: false,
            help_scroll_offset: 0,
            notice: None,
            needs_redraw: true,
            exit: None,
            posts_handle: None,
            tasks: Vec::new(),
        }
    }

    /// Keybinding context for the current overlay or tab.
    pub fn kb_context(&self) -> Context {
        if self.pending_confirm.is_some() {
            Context::Confirm
        } else if self.form.is_some() || (self.editing_filters && self.tab == Tab::Posts) {
            Context::Form
        } else {
            self.tab.context()
        }
    }

    // ========================================================================
    // Notices
    // ========================================================================

    pub fn notify(&mut self, kind: NoticeKind, text: impl Into<Cow<'static, str>>) {
        self.notice = Some(Notice {
            kind,
            text: text.into(),
            details: Vec::new(),
            shown_at: Instant::now(),
            ttl: NOTICE_TTL,
        });
        self.needs_redraw = true;
    }

    /// Notice with a title and bullet list, kept on screen longer.
    pub fn notify_detailed(
        &mut self,
        kind: NoticeKind,
        title: impl Into<Cow<'static, str>>,
        details: Vec<String>,
    ) {
        self.notice = Some(Notice {
            kind,
            text: title.into(),
            details,
            shown_at: Instant::now(),
            ttl: DETAILED_NOTICE_TTL,
        });
        self.needs_redraw = true;
    }

    /// Error notice for a failed operation.
    pub fn notify_failure(&mut self, err: &ApiError, default: &str) {
        self.notify(NoticeKind::Error, err.user_message(default));
    }

    /// Clear the notice if it has expired. Returns true if one was cleared.
    pub fn clear_expired_notice(&mut self) -> bool {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.is_expired(Instant::now()))
        {
            self.notice = None;
            return true;
        }
        false
    }

    // ========================================================================
    // Tasks & session
    // ========================================================================

    /// Keep a handle to an in-flight task, dropping finished ones.
    pub fn track(&mut self, handle: JoinHandle<()>) {
        self.tasks.retain(|h| !h.is_finished());
        self.tasks.push(handle);
    }

    /// The backend rejected the session: discard the credential, stop all
    /// in-flight work and end the loop.
    pub fn expire_session(&mut self) {
        if self.exit == Some(ExitReason::SessionExpired) {
            return;
        }
        tracing::warn!("Session rejected by backend (401), discarding credential");
        if let Err(e) = self.session.clear() {
            tracing::error!(error = %e, "Failed to clear session file");
        }
        self.abort_tasks();
        self.exit = Some(ExitReason::SessionExpired);
    }

    pub fn abort_tasks(&mut self) {
        if let Some(handle) = self.posts_handle.take() {
            handle.abort();
        }
        for handle in self.tasks.drain(..) {
            handle.abort();
        }
    }

    pub fn session_expired(&self) -> bool {
        self.exit == Some(ExitReason::SessionExpired)
    }

    // ========================================================================
    // Selection helpers
    // ========================================================================

    pub fn selected_subscription(&self) -> Option<&Subscription> {
        self.subscriptions.get(self.selected_subscription)
    }

    pub fn clamp_subscription_selection(&mut self) {
        self.selected_subscription = self
            .selected_subscription
            .min(self.subscriptions.len().saturating_sub(1));
    }

    pub fn post_link(&self, post: &Post) -> String {
        self.config.post_link(post.post_id)
    }

    pub fn has_bot_token(&self) -> bool {
        self.user_config
            .as_ref()
            .is_some_and(UserConfig::has_bot_token)
    }
}

/// App pointed at a closed local port, with its session file under a
/// per-test temp directory.
#[cfg(test)]
pub(crate) fn test_app(name: &str) -> App {
    let client = ApiClient::new(
        "http://127.0.0.1:9",
        secrecy::SecretString::from("tok"),
        Duration::from_secs(5),
    )
    .unwrap();
    let dir = std::env::temp_dir().join(format!("tgrss_dash_app_{}", name));
    App::new(client, Config::default(), SessionStore::in_dir(&dir))
}
