//! Client for the push backend's REST API.
//!
//! Every call is authenticated with the session token. The backend wraps
//! payloads in a `{ success, message, data }` envelope; [`ApiClient`]
//! unwraps it and maps failures onto [`ApiError`].

mod client;
mod error;
mod types;

pub use client::{ApiClient, DEFAULT_TIMEOUT, MAX_RESPONSE_SIZE};
pub use error::ApiError;
pub use types::{
    format_timestamp, BindingConfig, BotInfo, BotTokenOutcome, BotTokenRequest, Envelope,
    NewSubscription, Post, PostsPage, PushSettings, PushStatus, RssFetchOutcome, Stats,
    Subscription, TelegramStatus, UserConfig,
};
