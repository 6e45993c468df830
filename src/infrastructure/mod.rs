// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod motion_api;
