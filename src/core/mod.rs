//! Geometry and bodies as seen by collision detection.

pub mod body;
pub mod constraints;
pub mod edge;
pub mod types;

pub use body::{Body, EdgeRef, NonCollideSet, Vertex};
pub use constraints::Joint;
pub use edge::{Edge, EdgeContact, EdgeShape};
pub use types::Pose2;
