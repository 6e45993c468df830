//! Backend for the asset vibration dashboard: fetches sites, assets and
//! sensor channels from the condition-monitoring API and serves chart-ready
//! composite points with a monthly summary.
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
