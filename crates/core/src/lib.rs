//! Ephany catalog core.
//!
//! Pure domain logic for the asset read/write path: the attribute schema
//! registry, the unit conversion engine, and the orchestration that rewrites
//! dimensional values between caller units and canonical storage units. No
//! database or HTTP dependencies live here.

pub mod attributes;
pub mod dimensions;
pub mod error;
pub mod hashing;
pub mod types;
pub mod units;
