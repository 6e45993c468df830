// Application layer - Use cases over the monitoring repository
pub mod asset_service;
pub mod monitoring_repository;

#[cfg(test)]
pub mod fake_repository;
