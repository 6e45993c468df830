// Presentation layer - HTTP routes and JSON responses
pub mod app_state;
pub mod handlers;
pub mod router;
