//! # Grid Map Iterators
//!
//! Iterators over cell indices of a [`GridMap`](super::GridMap). The iterators copy the map
//! geometry they need rather than borrowing the map, so layers can be written to while iterating.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Iterates over every cell in a map exactly once.
#[derive(Debug, Clone)]
pub struct GridMapIterator {
    num_cells: Vector2<usize>,
    next_linear_index: usize,
}

/// Iterates over the cells whose centres lie inside a circle (border included).
///
/// The circle is clipped to the map, so near the map edges fewer cells are produced, and none at
/// all if the circle lies fully outside the map.
#[derive(Debug, Clone)]
pub struct CircleIterator {
    centre: Point2<f64>,
    radius_sq: f64,
    upper_left_position: Point2<f64>,
    cell_size: Vector2<f64>,

    /// Inclusive cell bounds of the circle's bounding box, clipped to the map
    min_cell: Point2<usize>,
    max_cell: Point2<usize>,

    next_cell: Option<Point2<usize>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl GridMapIterator {
    pub(super) fn new(num_cells: Vector2<usize>) -> Self {
        Self {
            num_cells,
            next_linear_index: 0,
        }
    }

    fn total(&self) -> usize {
        self.num_cells.x * self.num_cells.y
    }
}

impl Iterator for GridMapIterator {
    type Item = Point2<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_linear_index >= self.total() {
            return None;
        }

        let cell = Point2::new(
            self.next_linear_index / self.num_cells.y,
            self.next_linear_index % self.num_cells.y,
        );
        self.next_linear_index += 1;

        Some(cell)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.total().saturating_sub(self.next_linear_index);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridMapIterator {}

impl CircleIterator {
    pub(super) fn new(
        upper_left_position: Point2<f64>,
        cell_size: Vector2<f64>,
        num_cells: Vector2<usize>,
        centre: Point2<f64>,
        radius: f64,
    ) -> Self {
        // Bounding box of the circle in (unclipped) cell space. Cell index grows as position
        // decreases, so the largest position gives the smallest index.
        let min_x = ((upper_left_position.x - (centre.x + radius)) / cell_size.x).floor();
        let max_x = ((upper_left_position.x - (centre.x - radius)) / cell_size.x).floor();
        let min_y = ((upper_left_position.y - (centre.y + radius)) / cell_size.y).floor();
        let max_y = ((upper_left_position.y - (centre.y - radius)) / cell_size.y).floor();

        let last_x = (num_cells.x as f64) - 1.0;
        let last_y = (num_cells.y as f64) - 1.0;

        // Written so that NaN bounds (from a NaN centre) also count as outside
        let outside = radius.is_nan()
            || radius < 0.0
            || !(max_x >= 0.0 && max_y >= 0.0 && min_x <= last_x && min_y <= last_y);

        let min_cell = Point2::new(min_x.max(0.0) as usize, min_y.max(0.0) as usize);
        let max_cell = Point2::new(max_x.min(last_x) as usize, max_y.min(last_y) as usize);

        Self {
            centre,
            radius_sq: radius * radius,
            upper_left_position,
            cell_size,
            min_cell,
            max_cell,
            next_cell: if outside {
                None
            } else {
                Some(min_cell)
            },
        }
    }

    fn contains(&self, cell: &Point2<usize>) -> bool {
        let dx = self.upper_left_position.x - self.cell_size.x * (cell.x as f64 + 0.5) - self.centre.x;
        let dy = self.upper_left_position.y - self.cell_size.y * (cell.y as f64 + 0.5) - self.centre.y;

        dx * dx + dy * dy <= self.radius_sq
    }
}

impl Iterator for CircleIterator {
    type Item = Point2<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let cell = self.next_cell?;

            self.next_cell = if cell.y < self.max_cell.y {
                Some(Point2::new(cell.x, cell.y + 1))
            } else if cell.x < self.max_cell.x {
                Some(Point2::new(cell.x + 1, self.min_cell.y))
            } else {
                None
            };

            if self.contains(&cell) {
                return Some(cell);
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    /// A 5x5 map of 1m cells centred on the origin, cell (0, 0) is centred at (2, 2).
    fn circle(centre: Point2<f64>, radius: f64) -> Vec<Point2<usize>> {
        CircleIterator::new(
            Point2::new(2.5, 2.5),
            Vector2::new(1.0, 1.0),
            Vector2::new(5, 5),
            centre,
            radius,
        )
        .collect()
    }

    #[test]
    fn test_grid_map_iterator() {
        let iter = GridMapIterator::new(Vector2::new(3, 4));
        assert_eq!(iter.len(), 12);

        let cells: HashSet<Point2<usize>> = iter.collect();
        assert_eq!(cells.len(), 12);
        assert!(cells.contains(&Point2::new(2, 3)));
        assert!(!cells.contains(&Point2::new(3, 0)));
    }

    #[test]
    fn test_circle_iterator() {
        // Centre cell plus the four orthogonal neighbours
        let cells: HashSet<Point2<usize>> = circle(Point2::new(0.0, 0.0), 1.1).into_iter().collect();
        let expected: HashSet<Point2<usize>> = vec![
            Point2::new(2, 2),
            Point2::new(1, 2),
            Point2::new(3, 2),
            Point2::new(2, 1),
            Point2::new(2, 3),
        ]
        .into_iter()
        .collect();
        assert_eq!(cells, expected);

        // Full 3x3 neighbourhood
        assert_eq!(circle(Point2::new(0.0, 0.0), 1.5).len(), 9);

        // A radius smaller than a cell still contains the centre cell
        assert_eq!(circle(Point2::new(0.0, 0.0), 0.01), vec![Point2::new(2, 2)]);
    }

    #[test]
    fn test_circle_iterator_clipping() {
        // Corner cell (0, 0), only itself and two neighbours are inside the map
        assert_eq!(circle(Point2::new(2.0, 2.0), 1.1).len(), 3);

        // Circle lying completely outside the map
        assert!(circle(Point2::new(10.0, 10.0), 1.0).is_empty());
        assert!(circle(Point2::new(-10.0, 0.0), 1.0).is_empty());

        // Degenerate radii
        assert!(circle(Point2::new(0.0, 0.0), -1.0).is_empty());
        assert!(circle(Point2::new(0.0, 0.0), f64::NAN).is_empty());
        assert_eq!(circle(Point2::new(0.0, 0.0), f64::INFINITY).len(), 25);
    }
}
