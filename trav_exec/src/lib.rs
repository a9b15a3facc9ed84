//! # Traversability library.
//!
//! Layered grid maps and the filters which turn an elevation map into traversability layers.
//! This library is used by the `trav_exec` executable and benchmarks, and can be used by other
//! crates in the workspace.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Map module - layered grid maps and the raster interface filters run on
pub mod map;

/// Filters module - traversability filters, the filter registry and filter chains
pub mod filters;
