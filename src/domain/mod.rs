// Domain layer - Value types and pure calculations
pub mod alert;
pub mod errors;
pub mod geometry;
pub mod metrics;
pub mod polygon;
pub mod time_window;
pub mod weather;
