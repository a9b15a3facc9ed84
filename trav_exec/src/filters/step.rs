//! # Step Filter
//!
//! Scores each cell of an elevation map by the height of the steps (curbs, ledges, rocks) around
//! it. Two windowed passes are made over the map:
//!
//! 1. **Step height**: for each cell with a valid elevation, the largest absolute height
//!    difference to any valid cell within `first_window_radius` is written into the
//!    [`STEP_HEIGHT_LAYER`], provided it is non-zero.
//! 2. **Traversability**: for each cell, the step heights within `second_window_radius` are
//!    reduced to a single step, which is damped by the number of critical steps seen, and mapped
//!    into the `map_type` layer:
//!
//! ```text
//!  value
//!    1 ┤●
//!      │   ●
//!      │      ●
//!      │         ●
//!    0 ┤            ●●●●●●●●●●●
//!      └────────────┬──────────► step
//!                critical_value
//! ```
//!
//! A value of 1 means no step was found, 0 means the terrain cannot be traversed. Cells with no
//! step height in their second window are left invalid. The step height layer is removed
//! before the filtered map is returned.

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use log::{debug, error, info, trace, warn};

use super::{
    params::{require_f64, require_i64, require_str},
    ConfigError, Filter, FilterError, ParamSource,
};
use crate::map::{Raster, ELEVATION_LAYER};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Name of the intermediate layer holding the step height of each cell.
pub const STEP_HEIGHT_LAYER: &str = "step_height";

const CRITICAL_VALUE_KEY: &str = "critical_value";
const FIRST_WINDOW_RADIUS_KEY: &str = "first_window_radius";
const SECOND_WINDOW_RADIUS_KEY: &str = "second_window_radius";
const CRITICAL_CELL_NUMBER_KEY: &str = "critical_cell_number";
const MAP_TYPE_KEY: &str = "map_type";
const TRUNCATE_CELL_RATIO_KEY: &str = "truncate_cell_ratio";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters of the [`StepFilter`].
#[derive(Debug, Clone, PartialEq)]
pub struct StepFilterConfig {
    /// Step height above which the terrain cannot be traversed.
    ///
    /// Units: meters
    pub critical_value: f64,

    /// Radius of the window in which elevation differences are searched for.
    ///
    /// Units: meters
    pub first_window_radius: f64,

    /// Radius of the window in which step heights are aggregated.
    ///
    /// Units: meters
    pub second_window_radius: f64,

    /// Number of critical steps in the second window needed for a step to count at its full
    /// height.
    pub critical_cell_number: u32,

    /// Name of the output layer.
    pub map_type: String,

    /// Use integer division when computing the ratio of critical steps to
    /// `critical_cell_number`, so the ratio is 0 until `critical_cell_number` critical steps are
    /// seen. If `false` the ratio is real valued.
    pub truncate_cell_ratio: bool,
}

/// Filter which scores terrain by the height of nearby steps.
#[derive(Debug, Clone)]
pub struct StepFilter {
    name: String,

    /// `None` until configured successfully
    config: Option<StepFilterConfig>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for StepFilterConfig {
    fn default() -> Self {
        Self {
            critical_value: 0.3,
            first_window_radius: 0.08,
            second_window_radius: 0.08,
            critical_cell_number: 5,
            map_type: "traversability_step".into(),
            truncate_cell_ratio: true,
        }
    }
}

impl StepFilterConfig {
    /// Read and validate the configuration from the given parameters.
    pub fn from_params(params: &dyn ParamSource) -> Result<Self, ConfigError> {
        let critical_value = require_f64(params, CRITICAL_VALUE_KEY)?;
        let first_window_radius = require_f64(params, FIRST_WINDOW_RADIUS_KEY)?;
        let second_window_radius = require_f64(params, SECOND_WINDOW_RADIUS_KEY)?;

        let critical_cell_number = require_i64(params, CRITICAL_CELL_NUMBER_KEY)?;
        if critical_cell_number <= 0 {
            return Err(ConfigError::invalid(
                CRITICAL_CELL_NUMBER_KEY,
                format!("must be greater than zero, got {}", critical_cell_number),
            ));
        }
        let critical_cell_number = u32::try_from(critical_cell_number).map_err(|_| {
            ConfigError::invalid(
                CRITICAL_CELL_NUMBER_KEY,
                format!("must be at most {}, got {}", u32::MAX, critical_cell_number),
            )
        })?;

        let map_type = require_str(params, MAP_TYPE_KEY)?.to_string();

        let config = Self {
            critical_value,
            first_window_radius,
            second_window_radius,
            critical_cell_number,
            map_type,
            truncate_cell_ratio: params.get_bool(TRUNCATE_CELL_RATIO_KEY).unwrap_or(true),
        };

        config.validate()?;

        Ok(config)
    }

    /// Check every parameter is within its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_positive(CRITICAL_VALUE_KEY, self.critical_value)?;
        check_positive(FIRST_WINDOW_RADIUS_KEY, self.first_window_radius)?;
        check_positive(SECOND_WINDOW_RADIUS_KEY, self.second_window_radius)?;

        if self.critical_cell_number == 0 {
            return Err(ConfigError::invalid(
                CRITICAL_CELL_NUMBER_KEY,
                "must be greater than zero",
            ));
        }

        if self.map_type.is_empty() {
            return Err(ConfigError::invalid(MAP_TYPE_KEY, "must not be empty"));
        }

        if self.map_type == ELEVATION_LAYER || self.map_type == STEP_HEIGHT_LAYER {
            return Err(ConfigError::invalid(
                MAP_TYPE_KEY,
                format!("'{}' is a reserved layer name", self.map_type),
            ));
        }

        Ok(())
    }

    fn log(&self, filter_name: &str) {
        info!("Step filter '{}' configured:", filter_name);
        info!("    Critical step height = {}", self.critical_value);
        info!("    First window radius = {}", self.first_window_radius);
        info!("    Second window radius = {}", self.second_window_radius);
        info!("    Number of critical cells = {}", self.critical_cell_number);
        info!("    Step map type = {}", self.map_type);
        info!("    Truncate cell ratio = {}", self.truncate_cell_ratio);
    }

    /// Ratio of the number of critical steps seen to `critical_cell_number`.
    fn cell_ratio(&self, num_critical: u32) -> f64 {
        if self.truncate_cell_ratio {
            (num_critical / self.critical_cell_number) as f64
        } else {
            num_critical as f64 / self.critical_cell_number as f64
        }
    }

    /// First pass, fills the step height layer. Returns the number of cells given a step height.
    fn calculate_step_height<R: Raster>(&self, map: &mut R) -> Result<usize, FilterError> {
        let mut num_steps = 0;

        for cell in map.cells() {
            let height = match map.value(ELEVATION_LAYER, &cell) {
                Some(h) => h,
                None => continue,
            };
            let centre = match map.cell_position(&cell) {
                Some(p) => p,
                None => continue,
            };

            // Get the highest step in the circular window
            let mut step_max = 0.0;
            for other in map.cells_in_circle(&centre, self.first_window_radius) {
                if let Some(other_height) = map.value(ELEVATION_LAYER, &other) {
                    let step = (height - other_height).abs();
                    if step > step_max {
                        step_max = step;
                    }
                }
            }

            if step_max > 0.0 {
                map.set_value(STEP_HEIGHT_LAYER, &cell, step_max)
                    .map_err(FilterError::raster)?;
                num_steps += 1;
            }
        }

        Ok(num_steps)
    }

    /// Second pass, fills the output layer from the step height layer. Returns the number of
    /// cells given a value.
    fn calculate_traversability<R: Raster>(&self, map: &mut R) -> Result<usize, FilterError> {
        let mut num_valid = 0;

        for cell in map.cells() {
            let centre = match map.cell_position(&cell) {
                Some(p) => p,
                None => continue,
            };

            let mut is_valid = false;
            let mut step_max = 0.0;

            // Counts the times the running maximum is raised above the critical value, rather
            // than the number of critical cells
            let mut num_critical = 0;

            for other in map.cells_in_circle(&centre, self.second_window_radius) {
                let step = match map.value(STEP_HEIGHT_LAYER, &other) {
                    Some(s) => s,
                    None => continue,
                };
                is_valid = true;

                if step > step_max {
                    step_max = step;
                    if step_max > self.critical_value {
                        trace!("Step max = {} at {:?}", step_max, other);
                        num_critical += 1;
                    }
                }
            }

            if !is_valid {
                continue;
            }

            let step = step_max.min(self.cell_ratio(num_critical) * step_max);

            let value = if step < self.critical_value {
                util::maths::lin_map((0.0, self.critical_value), (1.0, 0.0), step)
            } else {
                0.0
            };

            map.set_value(&self.map_type, &cell, value)
                .map_err(FilterError::raster)?;
            num_valid += 1;
        }

        Ok(num_valid)
    }
}

impl StepFilter {
    /// Name of this filter type in a [`FilterRegistry`](super::FilterRegistry).
    pub const TYPE_NAME: &'static str = "StepFilter";

    /// Create a new, unconfigured, step filter.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            config: None,
        }
    }

    /// Create a step filter from an existing configuration.
    pub fn with_config(name: &str, config: StepFilterConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        config.log(name);

        Ok(Self {
            name: name.into(),
            config: Some(config),
        })
    }

    /// The current configuration, or `None` if the filter is not configured.
    pub fn config(&self) -> Option<&StepFilterConfig> {
        self.config.as_ref()
    }
}

impl<R: Raster> Filter<R> for StepFilter {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter_type(&self) -> &str {
        Self::TYPE_NAME
    }

    fn configure(&mut self, params: &dyn ParamSource) -> Result<(), ConfigError> {
        self.config = None;

        match StepFilterConfig::from_params(params) {
            Ok(config) => {
                config.log(&self.name);
                self.config = Some(config);
                Ok(())
            }
            Err(e) => {
                error!("Step filter '{}' could not be configured: {}", self.name, e);
                Err(e)
            }
        }
    }

    fn update(&self, map_in: &R) -> Result<R, FilterError> {
        let config = match &self.config {
            Some(c) => c,
            None => return Err(FilterError::NotConfigured(self.name.clone())),
        };

        if !map_in.has_layer(ELEVATION_LAYER) {
            warn!(
                "Step filter '{}' input has no '{}' layer, the output will be empty",
                self.name, ELEVATION_LAYER
            );
        }
        if map_in.has_layer(STEP_HEIGHT_LAYER) {
            warn!(
                "Step filter '{}' input already has a '{}' layer, it will be removed",
                self.name, STEP_HEIGHT_LAYER
            );
        }

        // Add the new layers to the output map
        let mut map_out = map_in.clone();
        map_out.add_layer(&config.map_type);
        map_out.add_layer(STEP_HEIGHT_LAYER);

        let num_steps = config.calculate_step_height(&mut map_out)?;
        let num_valid = config.calculate_traversability(&mut map_out)?;

        map_out.remove_layer(STEP_HEIGHT_LAYER);

        debug!(
            "Step filter '{}': {} cells with a step height, {} cells with a '{}' value",
            self.name, num_steps, num_valid, config.map_type
        );

        Ok(map_out)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn check_positive(key: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            key,
            format!("must be a finite value greater than zero, got {}", value),
        ))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
