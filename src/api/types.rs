//! Wire records exchanged with the backend.

use chrono::{DateTime, Local};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Envelope
// ============================================================================

/// Response envelope used by every endpoint: `{ success, message?, data? }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
}

/// Accept `0`/`1` integers as well as booleans for flag fields.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
        Null(()),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
        Flag::Null(()) => false,
    })
}

/// The backend stores flags as integers.
fn flag_as_int<S>(value: &bool, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u8(u8::from(*value))
}

/// Render an ISO-8601 timestamp in local time, falling back to the raw text.
pub fn format_timestamp(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => raw.to_string(),
    }
}

// ============================================================================
// Posts
// ============================================================================

/// Push state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PushStatus {
    /// Matched but not yet pushed (`0`).
    Pending,
    /// Pushed to Telegram (`1`).
    Pushed,
    /// No subscription matched (any other code).
    Skipped,
}

impl PushStatus {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => PushStatus::Pending,
            1 => PushStatus::Pushed,
            _ => PushStatus::Skipped,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            PushStatus::Pending => 0,
            PushStatus::Pushed => 1,
            PushStatus::Skipped => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PushStatus::Pending => "Not pushed",
            PushStatus::Pushed => "Pushed",
            PushStatus::Skipped => "No push needed",
        }
    }
}

impl<'de> Deserialize<'de> for PushStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(PushStatus::from_code(i64::deserialize(deserializer)?))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Post {
    pub post_id: i64,
    pub title: String,
    #[serde(default)]
    pub creator: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub pub_date: String,
    pub push_status: PushStatus,
}

/// One page of `GET /api/posts`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostsPage {
    #[serde(default)]
    pub posts: Vec<Post>,
    #[serde(default)]
    pub total: u64,
    pub page: u32,
    #[serde(rename = "totalPages", default)]
    pub total_pages: u32,
}

// ============================================================================
// Subscriptions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Subscription {
    pub id: i64,
    #[serde(default)]
    pub keyword1: Option<String>,
    #[serde(default)]
    pub keyword2: Option<String>,
    #[serde(default)]
    pub keyword3: Option<String>,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Subscription {
    /// Non-empty keywords joined with " + ".
    pub fn keywords(&self) -> Option<String> {
        let parts: Vec<&str> = [&self.keyword1, &self.keyword2, &self.keyword3]
            .into_iter()
            .filter_map(|k| k.as_deref())
            .filter(|k| !k.is_empty())
            .collect();
        (!parts.is_empty()).then(|| parts.join(" + "))
    }
}

/// Body of `POST /api/subscriptions`. Blank fields are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NewSubscription {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword1: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword2: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword3: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl NewSubscription {
    /// Build from raw inputs, dropping blank ones.
    pub fn from_inputs(
        keywords: [&str; 3],
        creator: &str,
        category: &str,
    ) -> Self {
        let keep = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            keyword1: keep(keywords[0]),
            keyword2: keep(keywords[1]),
            keyword3: keep(keywords[2]),
            creator: keep(creator),
            category: keep(category),
        }
    }

    /// At least one keyword, creator or category is required.
    pub fn has_condition(&self) -> bool {
        self.keyword1.is_some()
            || self.keyword2.is_some()
            || self.keyword3.is_some()
            || self.creator.is_some()
            || self.category.is_some()
    }
}

// ============================================================================
// Configuration & stats
// ============================================================================

/// `GET /api/config` payload.
#[derive(Clone, Default, Deserialize)]
pub struct UserConfig {
    #[serde(default)]
    pub bot_token: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub stop_push: bool,
    #[serde(default, deserialize_with = "flag")]
    pub only_title: bool,
}

impl UserConfig {
    pub fn has_bot_token(&self) -> bool {
        self.bot_token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn push_settings(&self) -> PushSettings {
        PushSettings {
            stop_push: self.stop_push,
            only_title: self.only_title,
        }
    }
}

impl std::fmt::Debug for UserConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserConfig")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "[REDACTED]"))
            .field("stop_push", &self.stop_push)
            .field("only_title", &self.only_title)
            .finish()
    }
}

/// Body of `PUT /api/config`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PushSettings {
    #[serde(serialize_with = "flag_as_int")]
    pub stop_push: bool,
    #[serde(serialize_with = "flag_as_int")]
    pub only_title: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Stats {
    pub total_posts: u64,
    pub pushed_posts: u64,
    pub unpushed_posts: u64,
    pub total_subscriptions: u64,
    pub today_messages: u64,
}

// ============================================================================
// Telegram
// ============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BotInfo {
    pub id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    #[serde(deserialize_with = "flag")]
    pub has_chat_id: bool,
    pub bound_user_name: Option<String>,
    pub bound_user_username: Option<String>,
    pub last_check_time: Option<String>,
}

/// `GET /api/telegram/status` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TelegramStatus {
    pub configured: bool,
    pub connected: bool,
    pub bound: bool,
    pub bot_info: Option<BotInfo>,
    pub config: BindingConfig,
}

impl TelegramStatus {
    /// Bot details are only meaningful for a configured, reachable bot.
    pub fn visible_bot_info(&self) -> Option<&BotInfo> {
        if self.configured && self.connected {
            self.bot_info.as_ref()
        } else {
            None
        }
    }

    /// A user is bound only when the backend also has their chat id.
    pub fn is_bound(&self) -> bool {
        self.bound && self.config.has_chat_id
    }
}

/// Body of `POST /api/bot-token`.
pub struct BotTokenRequest {
    pub bot_token: SecretString,
    pub webhook_url: Option<String>,
}

impl BotTokenRequest {
    /// Blank webhook URLs are omitted; others are trimmed.
    pub fn new(bot_token: SecretString, webhook_url: Option<&str>) -> Self {
        let webhook_url = webhook_url
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string);
        Self {
            bot_token,
            webhook_url,
        }
    }

    pub(crate) fn to_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({ "bot_token": self.bot_token.expose_secret() });
        if let Some(url) = &self.webhook_url {
            body["webhook_url"] = serde_json::Value::String(url.clone());
        }
        body
    }
}

impl std::fmt::Debug for BotTokenRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotTokenRequest")
            .field("bot_token", &"[REDACTED]")
            .field("webhook_url", &self.webhook_url)
            .finish()
    }
}

/// `POST /api/bot-token` payload.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BotTokenOutcome {
    pub webhook_set: bool,
    pub webhook_error: Option<String>,
    pub webhook_suggestions: Option<Vec<String>>,
}

/// `POST /api/rss/fetch` payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RssFetchOutcome {
    pub new: u64,
}
