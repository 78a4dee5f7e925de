//! Terminal admin console for an RSS to Telegram push service.
//!
//! The binary in `main.rs` wires these modules together; they are exposed
//! as a library so integration tests can drive the API client and the
//! posts controller against a mock backend.

pub mod api;
pub mod app;
pub mod config;
pub mod debounce;
pub mod filters;
pub mod form;
pub mod keybindings;
pub mod pagination;
pub mod posts;
pub mod session;
pub mod theme;
pub mod ui;
pub mod util;
