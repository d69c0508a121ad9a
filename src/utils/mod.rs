//! Shared filesystem and checksum helpers for pipeline stages.

pub mod checksum;
pub mod fs;
