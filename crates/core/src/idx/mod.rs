//! Query planning against the field index, and the storage used when index results spill to
//! disk.
pub mod ivarator;
pub mod planner;
