pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod geocoding;
pub mod locks;
pub mod logging;
pub mod metrics;
mod persist;
pub mod services;
pub mod tracking;

pub use engine::{TrackingEngine, TrackingEngineBuilder};
pub use error::{EngineError, EngineResult};
