//! `optimize` command: travel-time optimised meeting venue.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rendezvous_core::{EngineConfig, Objective};
use serde::{Deserialize, Serialize};

use crate::provider::{MapsConfig, RoutingProviderBuilder, block_on, build_engine};
use crate::request::{load_participants, require_existing, write_result};
use crate::{
    ARG_CATEGORY, ARG_FORCE, ARG_MAPS_API_KEY, ARG_MAPS_BASE_URL, ARG_OBJECTIVE, ARG_OUTPUT,
    ARG_RADIUS_METERS, ARG_REQUEST, CliError, engine_config,
};

pub(crate) const ENV_OPTIMIZE_REQUEST: &str = "RENDEZVOUS_CMDS_OPTIMIZE_REQUEST_PATH";
pub(crate) const ENV_OPTIMIZE_MAPS_API_KEY: &str = "RENDEZVOUS_CMDS_OPTIMIZE_MAPS_API_KEY";

/// CLI arguments for the `optimize` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Refine the group's centroid against real travel times, \
                 then score nearby venues by the chosen objective and \
                 return the best one with every participant's journey.",
    about = "Find the venue that minimises travel time"
)]
#[ortho_config(prefix = "RENDEZVOUS")]
pub(crate) struct OptimizeArgs {
    /// Path to a JSON file listing the participants.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) request_path: Option<Utf8PathBuf>,
    /// Base URL of the maps web services.
    #[arg(long = ARG_MAPS_BASE_URL, value_name = "url")]
    #[serde(default)]
    pub(crate) maps_base_url: Option<String>,
    /// API key for the maps web services.
    #[arg(long = ARG_MAPS_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) maps_api_key: Option<String>,
    /// `minimize_max` (default) or `minimize_total`.
    #[arg(long = ARG_OBJECTIVE, value_name = "objective")]
    #[serde(default)]
    pub(crate) objective: Option<Objective>,
    /// Ignore any cached result and recompute.
    #[arg(long = ARG_FORCE)]
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub(crate) force: bool,
    /// Places category to score, e.g. `restaurant`.
    #[arg(long = ARG_CATEGORY, value_name = "type")]
    #[serde(default)]
    pub(crate) category: Option<String>,
    /// Venue search radius in metres.
    #[arg(long = ARG_RADIUS_METERS, value_name = "metres")]
    #[serde(default)]
    pub(crate) radius_meters: Option<u32>,
    /// Write the result here instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl OptimizeArgs {
    pub(crate) fn into_config(self) -> Result<OptimizeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        OptimizeConfig::try_from(merged)
    }
}

/// Resolved `optimize` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OptimizeConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) maps: MapsConfig,
    pub(crate) engine: EngineConfig,
    pub(crate) objective: Objective,
    pub(crate) force: bool,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<OptimizeArgs> for OptimizeConfig {
    type Error = CliError;

    fn try_from(args: OptimizeArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_OPTIMIZE_REQUEST,
        })?;
        let maps = MapsConfig::resolve(
            args.maps_base_url,
            args.maps_api_key,
            ENV_OPTIMIZE_MAPS_API_KEY,
        )?;
        Ok(Self {
            request_path,
            maps,
            engine: engine_config(args.category, args.radius_meters),
            objective: args.objective.unwrap_or_default(),
            force: args.force,
            output: args.output,
        })
    }
}

pub(crate) fn run_optimize_with(
    args: OptimizeArgs,
    builder: &dyn RoutingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let participants = load_participants(&config.request_path)?;
    let engine = build_engine(builder, &config.maps, config.engine)?;
    let result = block_on(engine.compute_time_optimized_midpoint(
        &participants,
        config.objective,
        config.force,
    ))??;
    write_result(&result, config.output.as_deref(), writer)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<OptimizeConfig, CliError> {
    let merged = OptimizeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    OptimizeConfig::try_from(merged)
}
