//! # Traversability Filters
//!
//! Filters are configured transforms from one [`Raster`] to another. Each filter is configured
//! once from a [`ParamSource`], and can then be run on any number of rasters. Filters are
//! normally created by type name through a [`FilterRegistry`] and run in sequence by a
//! [`FilterChain`].

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Filter chain - runs a sequence of filters, each on the output of the last
mod chain;

/// Parameter sources used to configure filters
pub mod params;

/// Filter registry - creates filters from their type name
mod registry;

/// Step filter - scores terrain by the height of nearby steps
mod step;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use chain::{FilterChain, FilterChainParams, FilterSpec};
pub use params::ParamSource;
pub use registry::{FilterConstructor, FilterRegistry};
pub use step::{StepFilter, StepFilterConfig, STEP_HEIGHT_LAYER};

use crate::map::Raster;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A configurable raster transform.
pub trait Filter<R: Raster> {
    /// Name of this filter instance.
    fn name(&self) -> &str;

    /// Name of the filter type, as used in the [`FilterRegistry`].
    fn filter_type(&self) -> &str;

    /// Configure the filter from the given parameters.
    ///
    /// On error the filter is left unconfigured.
    fn configure(&mut self, params: &dyn ParamSource) -> Result<(), ConfigError>;

    /// Run the filter on `map_in`, returning the filtered raster.
    fn update(&self, map_in: &R) -> Result<R, FilterError>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while configuring a filter or filter chain.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Parameter '{key}' was not found or is not a {expected} value")]
    MissingParam { key: String, expected: String },

    #[error("Parameter '{key}' is invalid: {reason}")]
    InvalidParam { key: String, reason: String },

    #[error("Unknown filter type '{0}'")]
    UnknownFilterType(String),

    #[error("More than one filter in the chain is named '{0}'")]
    DuplicateFilterName(String),
}

/// Errors that can occur while running a filter.
#[derive(Debug, thiserror::Error)]
pub enum FilterError {
    #[error("Filter '{0}' has not been successfully configured")]
    NotConfigured(String),

    #[error("Error writing to the raster: {0}")]
    Raster(Box<dyn std::error::Error + Send + Sync>),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FilterError {
    pub(crate) fn raster<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        Self::Raster(Box::new(error))
    }
}

impl ConfigError {
    pub(crate) fn missing(key: &str, expected: &str) -> Self {
        Self::MissingParam {
            key: key.into(),
            expected: expected.into(),
        }
    }

    pub(crate) fn invalid<S: Into<String>>(key: &str, reason: S) -> Self {
        Self::InvalidParam {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// The parameter key this error refers to, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::MissingParam { key, .. } | Self::InvalidParam { key, .. } => Some(key),
            _ => None,
        }
    }
}
