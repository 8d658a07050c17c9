//! Utility modules for the migration pipeline.

pub mod hash;
pub mod plural;
