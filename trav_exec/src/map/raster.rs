//! # Raster
//!
//! The [`Raster`] trait is the set of grid operations the traversability filters need: layer
//! values by name and cell, layer management, cell positions, and cell iteration over the whole
//! map or over a circular window. Filters are written against this trait rather than a concrete
//! map type.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;

use super::{GridMap, GridMapError};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A 2D grid of square cells carrying named scalar layers, where any cell's value may be invalid.
pub trait Raster: Clone {
    /// Error returned when a value can't be written.
    type Error: std::error::Error + Send + Sync + 'static;

    fn has_layer(&self, layer: &str) -> bool;

    /// Add a layer where every cell is invalid. An existing layer of the same name is reset.
    fn add_layer(&mut self, layer: &str);

    /// Remove a layer, returning `true` if it existed.
    fn remove_layer(&mut self, layer: &str) -> bool;

    /// Names of all layers in the raster.
    fn layer_names(&self) -> Vec<String>;

    /// Value of the given layer in the given cell, or `None` if the value is invalid, the layer
    /// doesn't exist or the cell is outside the raster.
    fn value(&self, layer: &str, cell: &Point2<usize>) -> Option<f64>;

    fn set_value(&mut self, layer: &str, cell: &Point2<usize>, value: f64)
        -> Result<(), Self::Error>;

    /// Position of the centre of the cell, or `None` if the cell is outside the raster.
    fn cell_position(&self, cell: &Point2<usize>) -> Option<Point2<f64>>;

    /// Every cell in the raster, each exactly once.
    fn cells(&self) -> Box<dyn Iterator<Item = Point2<usize>>>;

    /// Every cell whose centre lies within `radius` of `centre`. May be empty near the edges of
    /// the raster.
    fn cells_in_circle(
        &self,
        centre: &Point2<f64>,
        radius: f64,
    ) -> Box<dyn Iterator<Item = Point2<usize>>>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

/// `None` and NaN are both treated as invalid.
impl Raster for GridMap<Option<f64>, String> {
    type Error = GridMapError;

    fn has_layer(&self, layer: &str) -> bool {
        GridMap::has_layer(self, layer)
    }

    fn add_layer(&mut self, layer: &str) {
        GridMap::add_layer(self, layer.to_string())
    }

    fn remove_layer(&mut self, layer: &str) -> bool {
        GridMap::remove_layer(self, layer)
    }

    fn layer_names(&self) -> Vec<String> {
        self.layers().cloned().collect()
    }

    fn value(&self, layer: &str, cell: &Point2<usize>) -> Option<f64> {
        self.get(layer, cell)
            .ok()
            .flatten()
            .filter(|v| !v.is_nan())
    }

    fn set_value(
        &mut self,
        layer: &str,
        cell: &Point2<usize>,
        value: f64,
    ) -> Result<(), GridMapError> {
        self.set(layer, cell, Some(value))
    }

    fn cell_position(&self, cell: &Point2<usize>) -> Option<Point2<f64>> {
        GridMap::cell_position(self, cell).ok()
    }

    fn cells(&self) -> Box<dyn Iterator<Item = Point2<usize>>> {
        Box::new(GridMap::cells(self))
    }

    fn cells_in_circle(
        &self,
        centre: &Point2<f64>,
        radius: f64,
    ) -> Box<dyn Iterator<Item = Point2<usize>>> {
        Box::new(self.circle_iter(centre, radius))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector2;

    #[test]
    fn test_raster_grid_map() -> Result<(), GridMapError> {
        let mut map: GridMap<Option<f64>, String> = GridMap::new(
            Vector2::new(0.5, 0.5),
            Vector2::new(4, 4),
            Point2::new(0.0, 0.0),
            &["elevation".to_string()],
            None,
        )?;
        let cell = Point2::new(1, 2);

        assert_eq!(Raster::value(&map, "elevation", &cell), None);
        map.set_value("elevation", &cell, 2.0)?;
        assert_eq!(Raster::value(&map, "elevation", &cell), Some(2.0));

        // Unknown layers and cells outside the map read as invalid
        assert_eq!(Raster::value(&map, "step_height", &cell), None);
        assert_eq!(Raster::value(&map, "elevation", &Point2::new(4, 0)), None);

        assert_eq!(Raster::cells(&map).count(), 16);
        assert_eq!(Raster::cells_in_circle(&map, &Point2::new(0.25, 0.25), 0.5).count(), 5);
        assert_eq!(
            Raster::cell_position(&map, &Point2::new(0, 0)),
            Some(Point2::new(0.75, 0.75))
        );
        assert_eq!(Raster::cell_position(&map, &Point2::new(0, 4)), None);

        Raster::add_layer(&mut map, "step_height");
        let mut names = map.layer_names();
        names.sort();
        assert_eq!(names, vec!["elevation".to_string(), "step_height".to_string()]);
        assert!(Raster::remove_layer(&mut map, "step_height"));
        assert!(!Raster::has_layer(&map, "step_height"));

        Ok(())
    }

    #[test]
    fn test_nan_is_invalid() -> Result<(), GridMapError> {
        let mut map: GridMap<Option<f64>, String> = GridMap::new(
            Vector2::new(1.0, 1.0),
            Vector2::new(2, 2),
            Point2::new(0.0, 0.0),
            &["elevation".to_string()],
            None,
        )?;
        map.set("elevation", &Point2::new(0, 0), Some(f64::NAN))?;

        assert_eq!(Raster::value(&map, "elevation", &Point2::new(0, 0)), None);

        Ok(())
    }
}
