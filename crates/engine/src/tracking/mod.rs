//! Background location sampling.
//!
//! One sampler task per worker with an open session, owned by the
//! [`TrackingRegistry`].

pub mod registry;
pub mod sampler;

pub use registry::{EnsureOutcome, TrackingRegistry, TrackingStatus};
pub use sampler::{LocationSampler, TickOutcome};
