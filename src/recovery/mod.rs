//! Local fault recovery for display subsystems.

pub mod boundary;

pub use boundary::{BoundaryState, FaultBoundary};
