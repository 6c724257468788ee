//! Utility helpers: the generational body arena and detection metrics.

pub mod allocator;
pub mod profiling;

pub use allocator::{Arena, BodyId, GenerationalId};
pub use profiling::{DetectionMetrics, ScopedTimer};
