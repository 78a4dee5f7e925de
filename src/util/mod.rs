//! Utility functions shared by the client and the UI.
//!
//! - **URL checks**: backend base URL policy and links opened in the browser
//! - **Text**: sanitizing backend-provided strings and fitting them to a width

mod text;
mod url_check;

pub use text::{display_width, sanitize, truncate_to_width};
pub use url_check::{host_is_local, validate_base_url, validate_link, UrlCheckError};
