//! # Filter Chain
//!
//! A sequence of configured filters, each run on the output of the one before it. Chains are
//! built from a parameter file of the form:
//!
//! ```toml
//! [[filters]]
//! name = "step"
//! type = "StepFilter"
//!
//! [filters.params]
//! critical_value = 0.3
//! first_window_radius = 0.08
//! second_window_radius = 0.08
//! critical_cell_number = 5
//! map_type = "traversability_step"
//! ```

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use log::{debug, info};
use serde::{Deserialize, Serialize};
use toml::value::Table;

use super::{ConfigError, Filter, FilterError, FilterRegistry};
use crate::map::Raster;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of a single filter in the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterSpec {
    /// Name of the filter instance, unique in the chain
    pub name: String,

    /// Type of the filter, as registered in the [`FilterRegistry`]
    #[serde(rename = "type")]
    pub filter_type: String,

    #[serde(default)]
    pub params: Table,
}

/// Parameters of a filter chain.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterChainParams {
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

pub struct FilterChain<R: Raster> {
    filters: Vec<Box<dyn Filter<R>>>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<R: Raster + 'static> FilterChain<R> {
    /// Create an empty chain.
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
        }
    }

    /// Create and configure every filter in the parameters, in order.
    pub fn from_params(
        params: &FilterChainParams,
        registry: &FilterRegistry<R>,
    ) -> Result<Self, ConfigError> {
        let mut chain = Self::new();

        for spec in &params.filters {
            if chain.contains(&spec.name) {
                return Err(ConfigError::DuplicateFilterName(spec.name.clone()));
            }

            let mut filter = registry.create(&spec.filter_type, &spec.name)?;
            filter.configure(&spec.params)?;

            chain.push(filter)?;
        }

        info!("Filter chain configured: {:?}", chain.names());

        Ok(chain)
    }

    /// Append a configured filter to the end of the chain.
    pub fn push(&mut self, filter: Box<dyn Filter<R>>) -> Result<(), ConfigError> {
        if self.contains(filter.name()) {
            return Err(ConfigError::DuplicateFilterName(filter.name().into()));
        }

        self.filters.push(filter);

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.filters.iter().any(|f| f.name() == name)
    }

    /// Names of the filters in the order they are run.
    pub fn names(&self) -> Vec<&str> {
        self.filters.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// Run every filter in turn, returning the output of the last one.
    ///
    /// An empty chain returns a copy of the input.
    pub fn update(&self, map_in: &R) -> Result<R, FilterError> {
        let mut filters = self.filters.iter();

        let mut map = match filters.next() {
            Some(f) => {
                debug!("Running filter '{}'", f.name());
                f.update(map_in)?
            }
            None => return Ok(map_in.clone()),
        };

        for f in filters {
            debug!("Running filter '{}'", f.name());
            map = f.update(&map)?;
        }

        Ok(map)
    }
}

impl<R: Raster + 'static> Default for FilterChain<R> {
    fn default() -> Self {
        Self::new()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::filters::{StepFilter, StepFilterConfig};
    use crate::map::{GridMap, TerrainMap, ELEVATION_LAYER};
    use nalgebra::{Point2, Vector2};
    use ndarray::Array2;

    type Map = GridMap<Option<f64>, String>;

    const CHAIN_PARAMS: &str = r#"
        [[filters]]
        name = "step_coarse"
        type = "StepFilter"

        [filters.params]
        critical_value = 0.3
        first_window_radius = 1.1
        second_window_radius = 1.1
        critical_cell_number = 1
        map_type = "step_coarse"

        [[filters]]
        name = "step_fine"
        type = "StepFilter"

        [filters.params]
        critical_value = 0.5
        first_window_radius = 0.5
        second_window_radius = 0.5
        critical_cell_number = 1
        map_type = "step_fine"
    "#;

    fn spike_map() -> Map {
        let mut heights = Array2::from_elem((5, 5), Some(0.0));
        heights[[2, 2]] = Some(1.0);

        TerrainMap::from_heights(Vector2::new(1.0, 1.0), Point2::new(0.0, 0.0), heights)
            .unwrap()
            .into_inner()
    }

    #[test]
    fn test_chain_from_params() {
        let params: FilterChainParams = util::params::from_str(CHAIN_PARAMS).unwrap();
        let registry = FilterRegistry::with_defaults();

        let chain = FilterChain::<Map>::from_params(&params, &registry).unwrap();
        assert_eq!(chain.names(), vec!["step_coarse", "step_fine"]);

        let map_out = chain.update(&spike_map()).unwrap();

        let mut layers = map_out.layer_names();
        layers.sort();
        assert_eq!(layers, vec![ELEVATION_LAYER, "step_coarse", "step_fine"]);

        // The fine window only covers the cell itself, so no steps are found
        assert!(map_out.get_layer("step_fine").unwrap().iter().all(|v| v.is_none()));
        assert_eq!(map_out.get("step_coarse", &Point2::new(2, 2)).unwrap(), Some(0.0));
    }

    #[test]
    fn test_empty_chain() {
        let chain = FilterChain::<Map>::new();
        assert!(chain.is_empty());

        let map_in = spike_map();
        let map_out = chain.update(&map_in).unwrap();

        assert_eq!(map_out.layer_names(), map_in.layer_names());
        assert_eq!(
            map_out.get_layer(ELEVATION_LAYER).unwrap(),
            map_in.get_layer(ELEVATION_LAYER).unwrap()
        );
    }

    #[test]
    fn test_duplicate_names() {
        let text = CHAIN_PARAMS.replace("step_fine", "step_coarse");
        let params: FilterChainParams = util::params::from_str(&text).unwrap();

        match FilterChain::<Map>::from_params(&params, &FilterRegistry::with_defaults()) {
            Err(ConfigError::DuplicateFilterName(n)) => assert_eq!(n, "step_coarse"),
            Err(e) => panic!("Expected a duplicate name error, got {}", e),
            Ok(_) => panic!("Expected a duplicate name error"),
        }

        let mut chain = FilterChain::<Map>::new();
        let filter = StepFilter::with_config("step", StepFilterConfig::default()).unwrap();
        chain.push(Box::new(filter.clone())).unwrap();
        assert!(chain.push(Box::new(filter)).is_err());
        assert_eq!(chain.len(), 1);
    }

    #[test]
    fn test_config_errors() {
        let text = CHAIN_PARAMS.replace("type = \"StepFilter\"", "type = \"SlopeFilter\"");
        let params: FilterChainParams = util::params::from_str(&text).unwrap();
        assert!(matches!(
            FilterChain::<Map>::from_params(&params, &FilterRegistry::with_defaults()),
            Err(ConfigError::UnknownFilterType(_))
        ));

        let text = CHAIN_PARAMS.replace("critical_value = 0.5", "");
        let params: FilterChainParams = util::params::from_str(&text).unwrap();
        match FilterChain::<Map>::from_params(&params, &FilterRegistry::with_defaults()) {
            Err(e) => assert_eq!(e.key(), Some("critical_value")),
            Ok(_) => panic!("Expected a missing parameter error"),
        }
    }
}
