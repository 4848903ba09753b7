//! Command-line interface for the rendezvous meeting-point engine.
//!
//! Each subcommand reads a JSON participant list, answers one engine
//! operation against the maps web services and prints the JSON result.
//! Options are layered from flags, configuration files and `RENDEZVOUS_*`
//! environment variables.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use rendezvous_core::EngineConfig;
use std::io::Write;

mod error;
mod midpoint;
mod optimize;
mod provider;
mod request;
mod routes;

pub use error::CliError;

use midpoint::{MidpointArgs, run_midpoint_with};
use optimize::{OptimizeArgs, run_optimize_with};
use provider::{HttpProviderBuilder, RoutingProviderBuilder};
use routes::{RoutesArgs, run_routes_with};

pub(crate) const ARG_REQUEST: &str = "request";
pub(crate) const ARG_MAPS_BASE_URL: &str = "maps-base-url";
pub(crate) const ARG_MAPS_API_KEY: &str = "maps-api-key";
pub(crate) const ARG_OBJECTIVE: &str = "objective";
pub(crate) const ARG_FORCE: &str = "force";
pub(crate) const ARG_CATEGORY: &str = "category";
pub(crate) const ARG_RADIUS_METERS: &str = "radius-meters";
pub(crate) const ARG_TARGET_LAT: &str = "target-lat";
pub(crate) const ARG_TARGET_LNG: &str = "target-lng";
pub(crate) const ARG_OUTPUT: &str = "output";

/// Run the rendezvous CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// request cannot be read, or the engine cannot answer it.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    run_command(cli.command, &HttpProviderBuilder, &mut stdout)
}

fn run_command(
    command: Command,
    builder: &dyn RoutingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    match command {
        Command::Midpoint(args) => run_midpoint_with(args, builder, writer),
        Command::Optimize(args) => run_optimize_with(args, builder, writer),
        Command::Routes(args) => run_routes_with(args, builder, writer),
    }
}

/// Default engine configuration with the venue overrides applied.
pub(crate) fn engine_config(category: Option<String>, radius_meters: Option<u32>) -> EngineConfig {
    let mut config = EngineConfig::default();
    if let Some(venue_category) = category {
        config = config.with_venue_category(venue_category);
    }
    if let Some(radius) = radius_meters {
        config = config.with_search_radius(radius);
    }
    config
}

#[derive(Debug, Parser)]
#[command(
    name = "rendezvous",
    about = "Find fair meeting points for a group of travellers",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Geometric midpoint with address, venues and travel times.
    Midpoint(MidpointArgs),
    /// Venue that minimises the group's travel time.
    Optimize(OptimizeArgs),
    /// Routes from each participant to a chosen point.
    Routes(RoutesArgs),
}

#[cfg(test)]
mod tests;
