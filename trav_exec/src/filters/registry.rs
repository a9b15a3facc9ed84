//! # Filter Registry
//!
//! Maps filter type names, as they appear in filter chain parameter files, to constructors of
//! unconfigured filters.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use log::debug;

use super::{ConfigError, Filter, StepFilter};
use crate::map::Raster;

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// Creates an unconfigured filter with the given instance name.
pub type FilterConstructor<R> = fn(&str) -> Box<dyn Filter<R>>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct FilterRegistry<R: Raster> {
    constructors: HashMap<String, FilterConstructor<R>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: Raster + 'static> FilterRegistry<R> {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Create a registry holding every filter type provided by this crate.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();

        registry.register(StepFilter::TYPE_NAME, |name| Box::new(StepFilter::new(name)));

        registry
    }

    /// Register a filter type, replacing any existing type of the same name.
    pub fn register(&mut self, filter_type: &str, constructor: FilterConstructor<R>) {
        debug!("Registering filter type '{}'", filter_type);
        self.constructors.insert(filter_type.into(), constructor);
    }

    pub fn contains(&self, filter_type: &str) -> bool {
        self.constructors.contains_key(filter_type)
    }

    /// Create a new unconfigured filter of the given type.
    pub fn create(&self, filter_type: &str, name: &str) -> Result<Box<dyn Filter<R>>, ConfigError> {
        match self.constructors.get(filter_type) {
            Some(constructor) => Ok(constructor(name)),
            None => Err(ConfigError::UnknownFilterType(filter_type.into())),
        }
    }
}

impl<R: Raster + 'static> Default for FilterRegistry<R> {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::map::GridMap;

    type Map = GridMap<Option<f64>, String>;

    #[test]
    fn test_defaults() {
        let registry = FilterRegistry::<Map>::with_defaults();

        assert!(registry.contains("StepFilter"));

        let filter = registry.create("StepFilter", "step").unwrap();
        assert_eq!(filter.name(), "step");
        assert_eq!(filter.filter_type(), "StepFilter");
    }

    #[test]
    fn test_unknown_type() {
        let registry = FilterRegistry::<Map>::new();

        match registry.create("StepFilter", "step") {
            Err(ConfigError::UnknownFilterType(t)) => assert_eq!(t, "StepFilter"),
            Err(e) => panic!("Expected an unknown filter type error, got {}", e),
            Ok(_) => panic!("Expected an unknown filter type error"),
        }
    }

    #[test]
    fn test_register() {
        let mut registry = FilterRegistry::<Map>::new();
        registry.register("Step", |name| Box::new(StepFilter::new(name)));

        assert!(registry.contains("Step"));
        assert!(!registry.contains("StepFilter"));
        assert_eq!(registry.create("Step", "a").unwrap().name(), "a");
    }
}
