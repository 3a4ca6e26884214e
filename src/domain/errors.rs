use thiserror::Error;

/// Recoverable failures raised by the calculation engine and the polygon store
#[derive(Debug, Error, PartialEq)]
pub enum DomainError {
    #[error("Time series is empty")]
    EmptySeries,

    #[error("Invalid polygon ring: {vertices} vertices")]
    InvalidRing { vertices: usize },

    #[error("Polygon not found: {id}")]
    PolygonNotFound { id: String },

    #[error("Color rule {rule_id} not found on polygon {polygon_id}")]
    RuleNotFound { polygon_id: String, rule_id: String },

    #[error("Alert not found: {id}")]
    AlertNotFound { id: String },

    #[error("Unsupported playback speed: {0}x")]
    InvalidSpeed(u8),
}
