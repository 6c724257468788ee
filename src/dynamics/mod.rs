//! Grouping of detected collisions for the solver.

pub mod island;

pub use island::{gather, independent_group, joint_closure, partition_independent};
