//! `routes` command: every participant's route to a target point.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use rendezvous_core::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::provider::{MapsConfig, RoutingProviderBuilder, block_on, build_engine};
use crate::request::{load_participants, require_existing, write_result};
use crate::{
    ARG_MAPS_API_KEY, ARG_MAPS_BASE_URL, ARG_OUTPUT, ARG_REQUEST, ARG_TARGET_LAT, ARG_TARGET_LNG,
    CliError,
};

pub(crate) const ENV_ROUTES_REQUEST: &str = "RENDEZVOUS_CMDS_ROUTES_REQUEST_PATH";
pub(crate) const ENV_ROUTES_MAPS_API_KEY: &str = "RENDEZVOUS_CMDS_ROUTES_MAPS_API_KEY";
pub(crate) const ENV_ROUTES_TARGET_LAT: &str = "RENDEZVOUS_CMDS_ROUTES_TARGET_LAT";
pub(crate) const ENV_ROUTES_TARGET_LNG: &str = "RENDEZVOUS_CMDS_ROUTES_TARGET_LNG";

/// CLI arguments for the `routes` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Route every located participant to the target point in \
                 their own travel mode. Participants who cannot be routed \
                 are listed separately.",
    about = "Route each participant to a chosen point"
)]
#[ortho_config(prefix = "RENDEZVOUS")]
pub(crate) struct RoutesArgs {
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
    /// Latitude of the meeting point.
    #[arg(long = ARG_TARGET_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) target_lat: Option<f64>,
    /// Longitude of the meeting point.
    #[arg(long = ARG_TARGET_LNG, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) target_lng: Option<f64>,
    /// Write the result here instead of standard output.
    #[arg(long = ARG_OUTPUT, value_name = "path")]
    #[serde(default)]
    pub(crate) output: Option<Utf8PathBuf>,
}

impl RoutesArgs {
    pub(crate) fn into_config(self) -> Result<RoutesConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RoutesConfig::try_from(merged)
    }
}

/// Resolved `routes` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RoutesConfig {
    pub(crate) request_path: Utf8PathBuf,
    pub(crate) maps: MapsConfig,
    pub(crate) target: GeoPoint,
    pub(crate) output: Option<Utf8PathBuf>,
}

impl TryFrom<RoutesArgs> for RoutesConfig {
    type Error = CliError;

    fn try_from(args: RoutesArgs) -> Result<Self, Self::Error> {
        let request_path = args.request_path.ok_or(CliError::MissingArgument {
            field: ARG_REQUEST,
            env: ENV_ROUTES_REQUEST,
        })?;
        let lat = args.target_lat.ok_or(CliError::MissingArgument {
            field: ARG_TARGET_LAT,
            env: ENV_ROUTES_TARGET_LAT,
        })?;
        let lng = args.target_lng.ok_or(CliError::MissingArgument {
            field: ARG_TARGET_LNG,
            env: ENV_ROUTES_TARGET_LNG,
        })?;
        let target = GeoPoint::new(lat, lng).map_err(CliError::InvalidTarget)?;
        let maps = MapsConfig::resolve(
            args.maps_base_url,
            args.maps_api_key,
            ENV_ROUTES_MAPS_API_KEY,
        )?;
        Ok(Self {
            request_path,
            maps,
            target,
            output: args.output,
        })
    }
}

pub(crate) fn run_routes_with(
    args: RoutesArgs,
    builder: &dyn RoutingProviderBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    require_existing(&config.request_path, ARG_REQUEST)?;
    let participants = load_participants(&config.request_path)?;
    let engine = build_engine(builder, &config.maps, rendezvous_core::EngineConfig::default())?;
    let result = block_on(engine.compute_routes_to_point(&participants, config.target))??;
    write_result(&result, config.output.as_deref(), writer)
}
