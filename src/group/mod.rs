//! Metric groups
//!
//! A group owns the metrics of one subsystem, hands out stable handles for
//! them, and applies one level/mask policy to all of them.

mod group;


pub use group::Group;
