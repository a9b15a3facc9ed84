//! # Grid Map
//!
//! [`GridMap`] is inspired by
//! [grid_map](https://github.com/ANYbotics/grid_map) by ANYbotics. The
//! [paper](https://www.researchgate.net/publication/284415855_A_Universal_Grid_Map_Library_Implementation_and_Use_Case_for_Rough_Terrain_Navigation)
//! gives a good intro the concepts behind `grid_map`.
//!
//! Cell `(0, 0)` is the upper-left cell of the map, i.e. the one with the largest x and y
//! position. Cell indices grow as position decreases.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::{borrow::Borrow, collections::HashMap, fs, hash::Hash, io, path::Path};

use nalgebra::{Point2, Vector2};
use ndarray::{Array2, ArrayView2};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use super::iter::{CircleIterator, GridMapIterator};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A grid-based map containing many layers of information.
///
/// Based on [grid_map](https://github.com/ANYbotics/grid_map) by ANYbotics.
#[derive(Clone, Debug)]
pub struct GridMap<T, L>
where
    T: Clone,
    L: Hash + Eq,
{
    /// The size of each grid cell in meters per cell
    cell_size: Vector2<f64>,

    /// The number of cells in each axis of the map
    num_cells: Vector2<usize>,

    /// Position of the centre of the map
    centre_position: Point2<f64>,

    /// Position of the upper-left point of the map (corner of cell (0, 0))
    upper_left_position: Point2<f64>,

    /// Position of the lower-right point of the map (corner of cell at num_cells - 1)
    lower_right_position: Point2<f64>,

    /// Value given to every cell of a newly added layer
    empty_value: T,

    /// Layer data, each array is indexed by x cell then y cell
    layers: HashMap<L, Array2<T>>,
}

/// A simpler version of GridMap which minimises the data serialized
#[derive(Serialize, Deserialize)]
pub(super) struct SerializableGridMap<T, L>
where
    L: Hash + Eq,
{
    /// The type of data contained in the map
    data_type: String,

    /// The size of each grid cell in meters per cell
    cell_size: (f64, f64),

    /// The number of cells in each axis of the map
    num_cells: (usize, usize),

    /// Position of the centre of the map
    centre_position: (f64, f64),

    /// Value given to every cell of a newly added layer
    empty_value: T,

    /// Layer data, each array is indexed by x cell then y cell
    layers: HashMap<L, Array2<T>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum GridMapError {
    #[error("Requested position or cell outside map bounds")]
    OutsideMap,

    #[error("Attempted to access unknown layer")]
    UnknownLayer,

    #[error("Map created with no layers, there must be at least one")]
    NoLayers,

    #[error("Invalid map geometry: {0}")]
    InvalidGeometry(String),

    #[error("An IO operation failed: {0}")]
    IoError(io::Error),

    #[error("Couldn't deserialize the given GridMap: {0}")]
    DeserializeError(serde_json::Error),

    #[error("Couldn't serialize the given GridMap: {0}")]
    SerializeError(serde_json::Error),

    #[error("Provided array shape doesn't match the expected shape")]
    IncompatibleShape,

    #[error("Grid map is empty")]
    Empty,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T, L> GridMap<T, L>
where
    T: Clone,
    L: Hash + Eq + Clone,
{
    /// Create a new GridMap with the given cell size, number of cells, position of the centre of
    /// the map, initial layers, and initial empty value.
    pub fn new(
        cell_size: Vector2<f64>,
        num_cells: Vector2<usize>,
        centre_position: Point2<f64>,
        layers: &[L],
        empty_value: T,
    ) -> Result<Self, GridMapError> {
        // Check for empty map
        if layers.is_empty() {
            return Err(GridMapError::NoLayers);
        }

        if !(cell_size.x > 0.0 && cell_size.y > 0.0)
            || !cell_size.x.is_finite()
            || !cell_size.y.is_finite()
        {
            return Err(GridMapError::InvalidGeometry(format!(
                "cell size must be finite and positive, got ({}, {})",
                cell_size.x, cell_size.y
            )));
        }

        if num_cells.x == 0 || num_cells.y == 0 {
            return Err(GridMapError::InvalidGeometry(format!(
                "map must contain at least one cell, got ({}, {})",
                num_cells.x, num_cells.y
            )));
        }

        // Calculate extremes of map
        let half_length = Vector2::new(
            0.5 * cell_size.x * (num_cells.x as f64),
            0.5 * cell_size.y * (num_cells.y as f64),
        );

        let mut map = Self {
            cell_size,
            num_cells,
            centre_position,
            upper_left_position: centre_position + half_length,
            lower_right_position: centre_position - half_length,
            empty_value,
            layers: HashMap::new(),
        };

        for layer in layers {
            map.add_layer(layer.clone());
        }

        Ok(map)
    }

    /// Add a layer filled with the empty value.
    ///
    /// If the layer already exists its data is reset to the empty value, so a layer is never
    /// duplicated.
    pub fn add_layer(&mut self, layer: L) {
        let data = Array2::from_elem(
            (self.num_cells.x, self.num_cells.y),
            self.empty_value.clone(),
        );
        self.layers.insert(layer, data);
    }

    /// Remove a layer, returning `true` if it existed.
    pub fn remove_layer<Q>(&mut self, layer: &Q) -> bool
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.layers.remove(layer).is_some()
    }

    pub fn has_layer<Q>(&self, layer: &Q) -> bool
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.layers.contains_key(layer)
    }

    /// Iterate over the names of all layers in the map, in no particular order.
    pub fn layers(&self) -> impl Iterator<Item = &L> {
        self.layers.keys()
    }

    /// Set all data in the given layer, adding the layer if it doesn't exist yet.
    pub fn set_layer(&mut self, layer: L, data: Array2<T>) -> Result<(), GridMapError> {
        // Check the data is of the correct size
        if data.dim() != (self.num_cells.x, self.num_cells.y) {
            return Err(GridMapError::IncompatibleShape);
        }

        self.layers.insert(layer, data);

        Ok(())
    }

    fn layer_data<Q>(&self, layer: &Q) -> Result<&Array2<T>, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.layers.get(layer).ok_or(GridMapError::UnknownLayer)
    }

    pub fn position_in_map(&self, position: &Point2<f64>) -> bool {
        // Test to see if the position is inside the box bound by a and b
        position.x <= self.upper_left_position.x
            && position.x >= self.lower_right_position.x
            && position.y <= self.upper_left_position.y
            && position.y >= self.lower_right_position.y
    }

    pub fn cell_in_map(&self, cell: &Point2<usize>) -> bool {
        // Check that the cell indexes are less than the number of cells
        cell.x < self.num_cells.x && cell.y < self.num_cells.y
    }

    pub fn get<Q>(&self, layer: &Q, cell: &Point2<usize>) -> Result<T, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let data = self.layer_data(layer)?;

        if !self.cell_in_map(cell) {
            return Err(GridMapError::OutsideMap);
        }

        Ok(data[[cell.x, cell.y]].clone())
    }

    pub fn get_position<Q>(&self, layer: &Q, position: &Point2<f64>) -> Result<T, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let cell = self.position_to_cell(position)?;

        self.get(layer, &cell)
    }

    pub fn get_mut<Q>(&mut self, layer: &Q, cell: &Point2<usize>) -> Result<&mut T, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        if !self.cell_in_map(cell) {
            return Err(GridMapError::OutsideMap);
        }

        match self.layers.get_mut(layer) {
            Some(data) => Ok(&mut data[[cell.x, cell.y]]),
            None => Err(GridMapError::UnknownLayer),
        }
    }

    pub fn set<Q>(&mut self, layer: &Q, cell: &Point2<usize>, value: T) -> Result<(), GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        *self.get_mut(layer, cell)? = value;

        Ok(())
    }

    pub fn get_layer<Q>(&self, layer: &Q) -> Result<ArrayView2<T>, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.layer_data(layer)?.view())
    }

    pub fn cell_position(&self, cell: &Point2<usize>) -> Result<Point2<f64>, GridMapError> {
        // Check cell in map
        if !self.cell_in_map(cell) {
            return Err(GridMapError::OutsideMap);
        }

        // The upper-left corner of the cell is the map's upper-left position less cell_size*cell,
        // then half a cell size more gets to the centre.
        Ok(Point2::new(
            self.upper_left_position.x - self.cell_size.x * (cell.x as f64 + 0.5),
            self.upper_left_position.y - self.cell_size.y * (cell.y as f64 + 0.5),
        ))
    }

    pub fn position_to_cell(&self, position: &Point2<f64>) -> Result<Point2<usize>, GridMapError> {
        // Check position in map
        if !self.position_in_map(position) {
            return Err(GridMapError::OutsideMap);
        }

        // Cell of a given position is equal to the difference between the upper left, normalized by
        // the cell size, and floored to get to usize.
        let cell = Point2::new(
            ((self.upper_left_position.x - position.x) / self.cell_size.x).floor() as usize,
            ((self.upper_left_position.y - position.y) / self.cell_size.y).floor() as usize,
        );

        // Double check cell in map, the lower-right edge itself belongs to no cell
        match self.cell_in_map(&cell) {
            true => Ok(cell),
            false => Err(GridMapError::OutsideMap),
        }
    }

    pub fn cell_size(&self) -> Vector2<f64> {
        self.cell_size
    }

    pub fn num_cells(&self) -> Vector2<usize> {
        self.num_cells
    }

    pub fn centre_position(&self) -> Point2<f64> {
        self.centre_position
    }

    /// The length of each axis of the map in meters
    pub fn length(&self) -> Vector2<f64> {
        self.upper_left_position - self.lower_right_position
    }

    /// Iterate over the index of every cell in the map.
    pub fn cells(&self) -> GridMapIterator {
        GridMapIterator::new(self.num_cells)
    }

    /// Iterate over the index of every cell whose centre lies within `radius` of `centre`.
    pub fn circle_iter(&self, centre: &Point2<f64>, radius: f64) -> CircleIterator {
        CircleIterator::new(
            self.upper_left_position,
            self.cell_size,
            self.num_cells,
            *centre,
            radius,
        )
    }

    /// Build a copy of this map where each value of `layer` is replaced by the output of `f`,
    /// which is given the cell index, cell position and current value.
    pub fn map<Q, F>(&self, layer: &Q, f: F) -> Result<Self, GridMapError>
    where
        L: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        F: Fn(Point2<usize>, Point2<f64>, T) -> T,
    {
        let mut out = self.clone();

        let data = match out.layers.get_mut(layer) {
            Some(d) => d,
            None => return Err(GridMapError::UnknownLayer),
        };

        for (idx, t) in data.indexed_iter_mut() {
            // Get cell index and position
            let cell = Point2::new(idx.0, idx.1);
            let pos = self.cell_position(&cell)?;

            *t = f(cell, pos, t.clone());
        }

        Ok(out)
    }
}

impl<T, L> GridMap<T, L>
where
    T: Clone + Serialize + DeserializeOwned,
    L: Hash + Eq + Clone + Serialize + DeserializeOwned,
{
    /// Load the grid map from the given path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GridMapError> {
        // Read file into string
        let s = fs::read_to_string(path).map_err(GridMapError::IoError)?;

        // Deserialize the gridmap from the path
        let ser: SerializableGridMap<T, L> =
            serde_json::from_str(&s).map_err(GridMapError::DeserializeError)?;

        ser.into_grid_map()
    }

    /// Save the grid map to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GridMapError> {
        // Serialize the map to a string
        let s = serde_json::to_string(&SerializableGridMap::from_grid_map(self))
            .map_err(GridMapError::SerializeError)?;

        fs::write(path, s).map_err(GridMapError::IoError)
    }
}

impl<T, L> SerializableGridMap<T, L>
where
    T: Clone,
    L: Hash + Eq + Clone,
{
    pub(super) fn from_grid_map(map: &GridMap<T, L>) -> Self {
        Self {
            data_type: std::any::type_name::<T>().into(),
            cell_size: (map.cell_size.x, map.cell_size.y),
            num_cells: (map.num_cells.x, map.num_cells.y),
            centre_position: (map.centre_position.x, map.centre_position.y),
            empty_value: map.empty_value.clone(),
            layers: map.layers.clone(),
        }
    }

    pub(super) fn into_grid_map(self) -> Result<GridMap<T, L>, GridMapError> {
        // Only the first layer is needed to build the geometry, the data is moved in afterwards
        let first_layer = match self.layers.keys().next() {
            Some(l) => l.clone(),
            None => return Err(GridMapError::NoLayers),
        };

        let mut map = GridMap::new(
            Vector2::new(self.cell_size.0, self.cell_size.1),
            Vector2::new(self.num_cells.0, self.num_cells.1),
            Point2::new(self.centre_position.0, self.centre_position.1),
            &[first_layer],
            self.empty_value,
        )?;

        for (layer, data) in self.layers {
            map.set_layer(layer, data)?;
        }

        Ok(map)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn test_map() -> Result<GridMap<Option<f64>, String>, GridMapError> {
        GridMap::new(
            Vector2::new(1.0, 1.0),
            Vector2::new(20, 30),
            Point2::new(10.0, 15.0),
            &["elevation".to_string()],
            None,
        )
    }

    #[test]
    fn test_grid_map() -> Result<(), GridMapError> {
        let map = test_map()?;

        // Test out of bounds detection
        assert!(map.position_in_map(&Point2::new(10.0, 15.0)));
        assert!(map.position_in_map(&Point2::new(0.0, 0.0)));
        assert!(map.position_in_map(&Point2::new(20.0, 30.0)));
        assert_eq!(map.position_in_map(&Point2::new(-20.0, 30.0)), false);
        assert_eq!(map.position_in_map(&Point2::new(20.1, 30.0)), false);

        // Test position->cell
        assert_eq!(map.position_to_cell(&Point2::new(20.0, 30.0))?, Point2::new(0, 0));
        assert_eq!(map.position_to_cell(&Point2::new(10.0, 10.0))?, Point2::new(10, 20));
        assert_eq!(map.position_to_cell(&Point2::new(5.9, 12.5))?, Point2::new(14, 17));
        assert!(matches!(
            map.position_to_cell(&Point2::new(0.0, 0.0)),
            Err(GridMapError::OutsideMap)
        ));

        // Test cell->position
        assert_eq!(map.cell_position(&Point2::new(0, 0))?, Point2::new(19.5, 29.5));
        assert_eq!(map.cell_position(&Point2::new(10, 20))?, Point2::new(9.5, 9.5));
        assert_eq!(map.cell_position(&Point2::new(14, 17))?, Point2::new(5.5, 12.5));
        assert!(matches!(
            map.cell_position(&Point2::new(20, 0)),
            Err(GridMapError::OutsideMap)
        ));

        assert_eq!(map.length(), Vector2::new(20.0, 30.0));

        Ok(())
    }

    #[test]
    fn test_invalid_geometry() {
        let bad_size: Result<GridMap<Option<f64>, String>, _> = GridMap::new(
            Vector2::new(0.0, 1.0),
            Vector2::new(2, 2),
            Point2::new(0.0, 0.0),
            &["elevation".to_string()],
            None,
        );
        assert!(matches!(bad_size, Err(GridMapError::InvalidGeometry(_))));

        let no_layers: Result<GridMap<Option<f64>, String>, _> = GridMap::new(
            Vector2::new(1.0, 1.0),
            Vector2::new(2, 2),
            Point2::new(0.0, 0.0),
            &[],
            None,
        );
        assert!(matches!(no_layers, Err(GridMapError::NoLayers)));
    }

    #[test]
    fn test_layers() -> Result<(), GridMapError> {
        let mut map = test_map()?;
        let cell = Point2::new(3, 4);

        assert!(map.has_layer("elevation"));
        assert!(!map.has_layer("step_height"));
        assert!(matches!(
            map.get("step_height", &cell),
            Err(GridMapError::UnknownLayer)
        ));

        map.add_layer("step_height".to_string());
        map.set("step_height", &cell, Some(0.25))?;
        assert_eq!(map.get("step_height", &cell)?, Some(0.25));
        assert_eq!(map.get_position("step_height", &Point2::new(16.5, 25.5))?, Some(0.25));

        // Re-adding a layer resets it rather than duplicating it
        map.add_layer("step_height".to_string());
        assert_eq!(map.get("step_height", &cell)?, None);
        assert_eq!(map.layers().count(), 2);

        assert!(map.remove_layer("step_height"));
        assert!(!map.remove_layer("step_height"));
        assert_eq!(map.layers().collect::<Vec<_>>(), vec!["elevation"]);

        assert!(matches!(
            map.set("elevation", &Point2::new(20, 30), Some(1.0)),
            Err(GridMapError::OutsideMap)
        ));
        assert!(matches!(
            map.set_layer("elevation".to_string(), Array2::from_elem((2, 2), None)),
            Err(GridMapError::IncompatibleShape)
        ));

        Ok(())
    }

    #[test]
    fn test_map_fn() -> Result<(), GridMapError> {
        let map = test_map()?.map("elevation", |cell, pos, _| {
            Some(cell.x as f64 + pos.y)
        })?;

        assert_eq!(map.get("elevation", &Point2::new(2, 0))?, Some(2.0 + 29.5));
        assert!(matches!(
            map.map("unknown", |_, _, v| v),
            Err(GridMapError::UnknownLayer)
        ));

        Ok(())
    }

    #[test]
    fn test_save_load() -> Result<(), GridMapError> {
        let mut map = test_map()?;
        map.set("elevation", &Point2::new(1, 2), Some(0.5))?;

        let path = std::env::temp_dir().join("trav_grid_map_test_save_load.json");
        map.save(&path)?;
        let loaded: GridMap<Option<f64>, String> = GridMap::load(&path)?;
        let _ = fs::remove_file(&path);

        assert_eq!(loaded.num_cells(), map.num_cells());
        assert_eq!(loaded.centre_position(), map.centre_position());
        assert_eq!(loaded.get_layer("elevation")?, map.get_layer("elevation")?);

        Ok(())
    }
}
