//! API module for all HTTP handlers

pub mod handlers;
pub mod webhook;

// Re-export handlers
pub use handlers::{handle_panic, health};
pub use webhook::{handle_jenkins_webhook, print_request_body};
