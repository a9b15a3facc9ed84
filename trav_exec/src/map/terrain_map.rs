//! # Terrain Map
//!
//! An elevation map: a [`GridMap`] carrying at least the [`ELEVATION_LAYER`], where unobserved
//! cells hold `None`.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::ops::{Deref, DerefMut, Range};

use super::{GridMap, GridMapError};
use nalgebra::{Point2, Vector2};
use ndarray::Array2;
use noise::{NoiseFn, Perlin};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the layer holding terrain height, in meters.
pub const ELEVATION_LAYER: &str = "elevation";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Terrain Map
#[derive(Clone, Debug)]
pub struct TerrainMap(pub(super) GridMap<Option<f64>, String>);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TerrainMap {
    /// Create a new empty terrain map with the given grid information.
    pub fn new(
        cell_size: Vector2<f64>,
        num_cells: Vector2<usize>,
        centre_position: Point2<f64>,
    ) -> Result<Self, GridMapError> {
        let map = GridMap::new(
            cell_size,
            num_cells,
            centre_position,
            &[ELEVATION_LAYER.to_string()],
            None,
        )?;

        Ok(Self(map))
    }

    /// Create a terrain map from an array of heights, indexed by x cell then y cell.
    pub fn from_heights(
        cell_size: Vector2<f64>,
        centre_position: Point2<f64>,
        heights: Array2<Option<f64>>,
    ) -> Result<Self, GridMapError> {
        let (x, y) = heights.dim();
        let mut map = Self::new(cell_size, Vector2::new(x, y), centre_position)?;

        map.0.set_layer(ELEVATION_LAYER.to_string(), heights)?;

        Ok(map)
    }

    /// Generate a random terrain map using a Perlin noise system
    pub fn generate_random(
        cell_size: Vector2<f64>,
        num_cells: Vector2<usize>,
        centre_position: Point2<f64>,
        perlin_scale: Vector2<f64>,
        perlin_offset: Vector2<f64>,
    ) -> Result<Self, GridMapError> {
        let map = Self::new(cell_size, num_cells, centre_position)?;

        let perlin = Perlin::new();

        let map = map.0.map(ELEVATION_LAYER, |_, pos, _| {
            Some(perlin.get([
                pos.x * perlin_scale.x + perlin_offset.x,
                pos.y * perlin_scale.y + perlin_offset.y,
            ]))
        })?;

        Ok(Self(map))
    }

    /// Returns the range of height in the terrain, or an error if the map has no valid heights
    pub fn range(&self) -> Result<Range<f64>, GridMapError> {
        let mut min = None;
        let mut max = None;

        for &height in self.get_layer(ELEVATION_LAYER)?.iter().flatten() {
            match min {
                Some(m) if height >= m => (),
                _ => min = Some(height),
            }
            match max {
                Some(m) if height <= m => (),
                _ => max = Some(height),
            }
        }

        match (min, max) {
            (Some(min), Some(max)) => Ok(min..max),
            _ => Err(GridMapError::Empty),
        }
    }

    /// Consume the terrain map, returning the underlying grid map.
    pub fn into_inner(self) -> GridMap<Option<f64>, String> {
        self.0
    }
}

impl Deref for TerrainMap {
    type Target = GridMap<Option<f64>, String>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for TerrainMap {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
