// Application layer - Use cases and the seams to infrastructure
pub mod alert_service;
pub mod alert_store;
pub mod color_rules;
pub mod dashboard_service;
pub mod playback;
pub mod playback_service;
pub mod polygon_repository;
pub mod polygon_service;
pub mod polygon_store;
pub mod resolver;
pub mod synthesizer;
pub mod weather_provider;
pub mod weather_service;
