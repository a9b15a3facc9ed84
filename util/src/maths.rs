//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Map a value from one range into another.
///
/// The value is not clamped, so values outside `source_range` map to values outside
/// `target_range`.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float
{
    target_range.0
        + ((value - source_range.0)
        * (target_range.1 - target_range.0)
        / (source_range.1 - source_range.0))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lin_map() {
        assert_eq!(lin_map((0.0, 0.3), (1.0, 0.0), 0.0), 1.0);
        assert_eq!(lin_map((0.0, 0.3), (1.0, 0.0), 0.3), 0.0);
        assert!((lin_map((0.0, 0.3), (1.0, 0.0), 0.15) - 0.5f64).abs() < 1e-12);
        assert_eq!(lin_map((0.0, 2.0), (0.0, 4.0), 3.0), 6.0);
    }
}
