//! Duplicate grouping module.
//!
//! This module provides the result model produced by the walker:
//! - Group keys (canonical name + size)
//! - Duplicate groups and their space accounting
//! - Scan counters

pub mod groups;

pub use groups::{DuplicateGroup, GroupKey, ScanResult, ScanStats};
