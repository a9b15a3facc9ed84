//! # Filter Parameters
//!
//! Filters read their configuration through the [`ParamSource`] key-value interface. The usual
//! source is the `params` table of a filter in a filter chain parameter file.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use toml::{value::Table, Value};

use super::ConfigError;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A provider of named parameter values.
///
/// Each getter returns `None` if the key is missing or holds a value of another type.
pub trait ParamSource {
    /// Get a real value. Integer values are accepted and converted.
    fn get_f64(&self, key: &str) -> Option<f64>;

    fn get_i64(&self, key: &str) -> Option<i64>;

    fn get_str(&self, key: &str) -> Option<&str>;

    fn get_bool(&self, key: &str) -> Option<bool>;
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ParamSource for Table {
    fn get_f64(&self, key: &str) -> Option<f64> {
        match self.get(key) {
            Some(Value::Float(f)) => Some(*f),
            Some(Value::Integer(i)) => Some(*i as f64),
            _ => None,
        }
    }

    fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_integer)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get a required real parameter.
pub fn require_f64(params: &dyn ParamSource, key: &str) -> Result<f64, ConfigError> {
    params.get_f64(key).ok_or_else(|| ConfigError::missing(key, "real"))
}

/// Get a required integer parameter.
pub fn require_i64(params: &dyn ParamSource, key: &str) -> Result<i64, ConfigError> {
    params.get_i64(key).ok_or_else(|| ConfigError::missing(key, "integer"))
}

/// Get a required string parameter.
pub fn require_str<'a>(params: &'a dyn ParamSource, key: &str) -> Result<&'a str, ConfigError> {
    params.get_str(key).ok_or_else(|| ConfigError::missing(key, "string"))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn table() -> Table {
        util::params::from_str(
            r#"
            critical_value = 0.3
            critical_cell_number = 5
            map_type = "traversability_step"
            truncate_cell_ratio = false
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_table_source() {
        let t = table();

        assert_eq!(t.get_f64("critical_value"), Some(0.3));
        assert_eq!(t.get_f64("critical_cell_number"), Some(5.0));
        assert_eq!(t.get_i64("critical_cell_number"), Some(5));
        assert_eq!(t.get_i64("critical_value"), None);
        assert_eq!(t.get_str("map_type"), Some("traversability_step"));
        assert_eq!(t.get_str("critical_value"), None);
        assert_eq!(t.get_bool("truncate_cell_ratio"), Some(false));
        assert_eq!(t.get_f64("missing"), None);
    }

    #[test]
    fn test_require() {
        let t = table();

        assert_eq!(require_f64(&t, "critical_value").unwrap(), 0.3);
        assert_eq!(require_str(&t, "map_type").unwrap(), "traversability_step");

        match require_i64(&t, "first_window_radius") {
            Err(ConfigError::MissingParam { key, expected }) => {
                assert_eq!(key, "first_window_radius");
                assert_eq!(expected, "integer");
            }
            other => panic!("Expected a missing parameter error, got {:?}", other),
        }
    }
}
