//! Terminal dashboard.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `tasks` - Spawning of backend calls
//! - `render` - Frame layout and overlays
//! - `config_tab`, `subscriptions`, `posts`, `stats` - Tab bodies
//! - `status` - Status bar
//! - `help` - Keybinding overlay

mod config_tab;
mod events;
mod help;
mod input;
mod loop_runner;
mod posts;
mod render;
mod stats;
mod status;
mod subscriptions;
mod tasks;

pub use loop_runner::run;
