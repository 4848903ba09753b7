//! Routing provider and engine construction for CLI commands.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use rendezvous_core::{EngineConfig, MeetingPointEngine, ResultCache, RoutingProvider};
use rendezvous_data::{DEFAULT_BASE_URL, HttpRoutingProvider, HttpRoutingProviderConfig};

use crate::{ARG_MAPS_API_KEY, CliError};

/// Engine driven through a type-erased provider.
pub(crate) type CliEngine = MeetingPointEngine<Arc<dyn RoutingProvider>>;

/// Resolved connection settings for the maps service.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct MapsConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: String,
}

impl fmt::Debug for MapsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MapsConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl MapsConfig {
    /// Resolve merged flag values; a blank key counts as missing.
    pub(crate) fn resolve(
        base_url: Option<String>,
        api_key: Option<String>,
        api_key_env: &'static str,
    ) -> Result<Self, CliError> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_MAPS_API_KEY,
                env: api_key_env,
            })?;
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_owned()),
            api_key,
        })
    }
}

/// Builds the routing provider for the current invocation.
pub(crate) trait RoutingProviderBuilder {
    fn build(&self, maps: &MapsConfig) -> Result<Arc<dyn RoutingProvider>, CliError>;
}

/// Builds an [`HttpRoutingProvider`] for the configured service.
pub(crate) struct HttpProviderBuilder;

impl RoutingProviderBuilder for HttpProviderBuilder {
    fn build(&self, maps: &MapsConfig) -> Result<Arc<dyn RoutingProvider>, CliError> {
        let config =
            HttpRoutingProviderConfig::new(maps.api_key.clone()).with_base_url(maps.base_url.clone());
        let provider = HttpRoutingProvider::with_config(config).map_err(|source| {
            CliError::BuildRoutingProvider {
                base_url: maps.base_url.clone(),
                source,
            }
        })?;
        Ok(Arc::new(provider))
    }
}

/// Build an engine with a fresh cache.
///
/// Each CLI invocation answers one request, so nothing outlives the process.
pub(crate) fn build_engine(
    builder: &dyn RoutingProviderBuilder,
    maps: &MapsConfig,
    config: EngineConfig,
) -> Result<CliEngine, CliError> {
    let provider = builder.build(maps)?;
    Ok(MeetingPointEngine::new(
        provider,
        Arc::new(ResultCache::new()),
        config,
    ))
}

/// Drive `future` to completion on a current-thread runtime.
pub(crate) fn block_on<F: Future>(future: F) -> Result<F::Output, CliError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::StartRuntime)?;
    Ok(runtime.block_on(future))
}
