//! Provider surfaces: named registries of resource runtimes and data
//! sources.

use concord_provider::{DataSource, Resource, ResourceRuntime};
use concord_transport::DiscordRest;
use std::collections::HashMap;
use std::sync::Arc;

/// One provider surface: the legacy schema-map provider or the framework
/// typed-handler provider. Mechanically identical; the split mirrors the
/// migration boundary between the two registries.
pub struct ProviderSurface {
    name: &'static str,
    resources: HashMap<&'static str, ResourceRuntime>,
    data_sources: HashMap<&'static str, Arc<dyn DataSource>>,
}

impl ProviderSurface {
    fn from_parts(
        name: &'static str,
        resources: Vec<Arc<dyn Resource>>,
        data_sources: Vec<Arc<dyn DataSource>>,
    ) -> Self {
        let resources = resources
            .into_iter()
            .map(|r| (r.type_name(), ResourceRuntime::new(r)))
            .collect();
        let data_sources = data_sources
            .into_iter()
            .map(|d| (d.type_name(), d))
            .collect();
        Self {
            name,
            resources,
            data_sources,
        }
    }

    /// The long-standing resource surface.
    pub fn legacy() -> Self {
        Self::from_parts(
            "legacy",
            concord_resources::legacy_resources(),
            concord_resources::legacy_data_sources(),
        )
    }

    /// The newer typed-handler surface.
    pub fn framework() -> Self {
        Self::from_parts(
            "framework",
            concord_resources::framework_resources(),
            concord_resources::framework_data_sources(),
        )
    }

    /// Surface name, for logs and duplicate-type errors.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Every resource type name this surface serves. Resources and data
    /// sources are separate namespaces; `discord_role` names both.
    pub fn resource_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Every data-source type name this surface serves.
    pub fn data_source_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }

    /// Hand the shared transport to every resource runtime.
    pub fn configure(&self, rest: &DiscordRest) {
        for runtime in self.resources.values() {
            runtime.configure(rest.clone());
        }
    }

    /// The runtime for a resource type, when this surface serves it.
    pub fn resource(&self, type_name: &str) -> Option<&ResourceRuntime> {
        self.resources.get(type_name)
    }

    /// The handler for a data-source type, when this surface serves it.
    pub fn data_source(&self, type_name: &str) -> Option<&Arc<dyn DataSource>> {
        self.data_sources.get(type_name)
    }
}
