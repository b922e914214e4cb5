//! Workflow modules consumed by every dashboard variant.

pub mod intake;
pub mod review;
