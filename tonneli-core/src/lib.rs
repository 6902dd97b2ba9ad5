//! Core types and service wiring for the tonneli waste schedule aggregator.

/// Municipal street directories.
pub mod directory;
/// Domain models and identifiers shared by all providers.
pub mod model;
/// Registry and helpers for plugging city-specific providers into the service.
pub mod plugin;
/// Traits describing the provider interfaces.
pub mod ports;
/// Turning weekly collection days into upcoming pickup dates.
pub mod projection;
/// Matching free-text street names against a directory.
pub mod resolve;
/// High-level service facade used by clients.
pub mod service;

pub use directory::*;
pub use model::*;
pub use plugin::*;
pub use ports::*;
pub use projection::*;
pub use resolve::*;
pub use service::*;
