//! Traversability executable entry point.
//!
//! Runs the filter chain described by `step_filter.toml` on an elevation map.
//!
//! # Usage
//!
//! ```text
//! trav_exec [elevation_map.json]
//! ```
//!
//! If no map is given a random terrain map is generated. The input and filtered maps are saved
//! into the session directory as `elevation_map.json` and `filtered_map.json`.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{debug, info, warn};
use nalgebra::{Point2, Vector2};
use std::env;

// Internal
use trav_lib::{
    filters::{FilterChain, FilterChainParams, FilterRegistry},
    map::{GridMap, Raster, TerrainMap},
};
use util::{
    logger::{logger_init, LogParams},
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Size of the cells of the generated terrain map.
///
/// Units: meters
const RANDOM_MAP_CELL_SIZE_M: f64 = 0.05;

/// Number of cells along each side of the generated terrain map.
const RANDOM_MAP_NUM_CELLS: usize = 200;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("trav_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    let log_params: LogParams =
        util::params::load("log.toml").wrap_err("Could not load the log parameters")?;
    logger_init(&log_params, &session).wrap_err("Failed to initialise logging")?;

    info!("Traversability Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let chain_params: FilterChainParams = util::params::load("step_filter.toml")
        .wrap_err("Could not load the filter chain parameters")?;

    let registry = FilterRegistry::with_defaults();
    let chain = FilterChain::from_params(&chain_params, &registry)
        .wrap_err("Could not configure the filter chain")?;

    if chain.is_empty() {
        warn!("The filter chain is empty, the output map will be a copy of the input");
    }

    // ---- LOAD INPUT MAP ----

    let args: Vec<String> = env::args().collect();
    debug!("CLI arguments: {:?}", args);

    let map_in: GridMap<Option<f64>, String> = match args.len() {
        2 => {
            info!("Loading elevation map from \"{}\"", &args[1]);
            GridMap::load(&args[1]).wrap_err("Failed to load the elevation map")?
        }
        1 => {
            info!("No elevation map provided, generating a random terrain map");
            TerrainMap::generate_random(
                Vector2::new(RANDOM_MAP_CELL_SIZE_M, RANDOM_MAP_CELL_SIZE_M),
                Vector2::new(RANDOM_MAP_NUM_CELLS, RANDOM_MAP_NUM_CELLS),
                Point2::new(0.0, 0.0),
                Vector2::new(0.5, 0.5),
                Vector2::new(0.0, 0.0),
            )
            .wrap_err("Failed to generate the terrain map")?
            .into_inner()
        }
        _ => {
            return Err(eyre!(
                "Expected either zero or one argument, found {}",
                args.len() - 1
            ))
        }
    };

    info!(
        "Input map has {} x {} cells of {} x {} m, layers {:?}",
        map_in.num_cells().x,
        map_in.num_cells().y,
        map_in.cell_size().x,
        map_in.cell_size().y,
        map_in.layer_names()
    );

    // ---- RUN FILTERS ----

    let map_out = chain
        .update(&map_in)
        .wrap_err("Failed to run the filter chain")?;

    for layer in map_out.layer_names() {
        if map_in.has_layer(&layer) {
            continue;
        }

        let values = map_out.get_layer(&layer)?;
        let mut valid = values.iter().flatten().filter(|v| !v.is_nan());

        match valid.next() {
            Some(&first) => {
                let (min, max, count) = valid.fold((first, first, 1), |(min, max, count), &v| {
                    (min.min(v), max.max(v), count + 1)
                });
                info!(
                    "Layer '{}': {} valid cells, values from {:.3} to {:.3}",
                    layer, count, min, max
                );
            }
            None => info!("Layer '{}': no valid cells", layer),
        }
    }

    // ---- SAVE MAPS ----

    map_in
        .save(session.path("elevation_map.json"))
        .wrap_err("Failed to save the input map")?;
    map_out
        .save(session.path("filtered_map.json"))
        .wrap_err("Failed to save the filtered map")?;

    info!("Maps saved to {:?}", session.session_root);

    Ok(())
}
