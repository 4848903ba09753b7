//! Test helpers for writing request files and injecting a stub provider.

use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use rendezvous_core::RoutingProvider;
use rendezvous_core::test_support::HaversineRoutingProvider;
use tempfile::TempDir;

use crate::CliError;
use crate::provider::{MapsConfig, RoutingProviderBuilder};

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Temporary directory with its UTF-8 path.
pub(super) fn workspace() -> (TempDir, Utf8PathBuf) {
    let tmp = TempDir::new().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8 workspace");
    (tmp, root)
}

/// Three drivers a few kilometres apart in central Taipei.
pub(super) const THREE_DRIVERS: &str = r#"{
  "participants": [
    { "id": "a", "lat": 25.03, "lng": 121.56, "travelMode": "driving" },
    { "id": "b", "lat": 25.04, "lng": 121.55, "travelMode": "driving" },
    { "id": "c", "lat": 25.02, "lng": 121.57 }
  ]
}"#;

/// Hands the same stub provider to every engine it builds.
pub(super) struct StubProviderBuilder {
    pub(super) provider: Arc<HaversineRoutingProvider>,
}

impl RoutingProviderBuilder for StubProviderBuilder {
    fn build(&self, _maps: &MapsConfig) -> Result<Arc<dyn RoutingProvider>, CliError> {
        let provider = Arc::clone(&self.provider);
        let erased: Arc<dyn RoutingProvider> = provider;
        Ok(erased)
    }
}
