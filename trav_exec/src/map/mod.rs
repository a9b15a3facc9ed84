//! # Map
//!
//! This module implements the [`GridMap`] layered map, the [`Raster`] trait through which filters
//! access it, and the [`TerrainMap`] elevation map. [`GridMap`] is inspired by
//! [grid_map](https://github.com/ANYbotics/grid_map) by ANYbotics. The
//! [paper](https://www.researchgate.net/publication/284415855_A_Universal_Grid_Map_Library_Implementation_and_Use_Case_for_Rough_Terrain_Navigation)
//! gives a good intro the concepts behind `grid_map`.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Main [`GridMap`] base implementation
mod grid_map;

/// Cell iterators over a [`GridMap`]
mod iter;

/// The [`Raster`] capability trait
mod raster;

/// Implements the [`TerrainMap`] type
mod terrain_map;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use grid_map::{GridMap, GridMapError};
pub use iter::{CircleIterator, GridMapIterator};
pub use raster::Raster;
pub use terrain_map::{TerrainMap, ELEVATION_LAYER};
