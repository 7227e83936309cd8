//! The uniform resource lifecycle.
//!
//! Wraps a [`Resource`] with the cross-cutting behaviors every handler
//! shares: configuration errors when the transport is missing, config
//! validation, plan modification, read-back after create and update,
//! 404-as-tombstone, write-only preservation, 404-as-success on delete,
//! and state-only destroy for authoritative-set resources.

use crate::{
    Context, DestroyScope, Diagnostics, Resource, ResourceState, plan_modify, validate_config,
};
use concord_core::AttrValue;
use concord_error::{ConcordResult, PluginError, PluginErrorKind};
use concord_transport::DiscordRest;
use std::sync::{Arc, RwLock};
use tracing::{debug, instrument, warn};

/// A configured resource handler with the uniform lifecycle applied.
pub struct ResourceRuntime {
    resource: Arc<dyn Resource>,
    transport: RwLock<Option<DiscordRest>>,
}

impl ResourceRuntime {
    /// Wrap a resource implementation.
    pub fn new(resource: Arc<dyn Resource>) -> Self {
        Self {
            resource,
            transport: RwLock::new(None),
        }
    }

    /// The wrapped resource's type name.
    pub fn type_name(&self) -> &'static str {
        self.resource.type_name()
    }

    /// The wrapped resource's schema.
    pub fn schema(&self) -> crate::Schema {
        self.resource.schema()
    }

    /// Receive the shared transport from the plugin server.
    pub fn configure(&self, rest: DiscordRest) {
        *self.transport.write().expect("transport lock poisoned") = Some(rest);
    }

    fn context(&self) -> ConcordResult<Context> {
        let guard = self.transport.read().expect("transport lock poisoned");
        match guard.as_ref() {
            Some(rest) => Ok(Context::new(rest.clone())),
            None => Err(PluginError::new(PluginErrorKind::NotConfigured(format!(
                "{} was used before the provider received a transport",
                self.resource.type_name()
            )))
            .into()),
        }
    }

    /// Config-time validation.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub fn validate(&self, config: &ResourceState) -> Diagnostics {
        validate_config(&self.resource.schema(), config)
    }

    /// Plan modification: JSON normalization, CRLF trimming, write-only
    /// prior-value-wins.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub fn plan(&self, prior: Option<&ResourceState>, planned: &mut ResourceState) -> Diagnostics {
        plan_modify(&self.resource.schema(), prior, planned)
    }

    /// Create, then read back to fill computed fields.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub async fn create(&self, mut planned: ResourceState) -> (Option<ResourceState>, Diagnostics) {
        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(e) => return (None, e.into()),
        };
        if let Err(e) = self.resource.create(&ctx, &mut planned).await {
            return (None, e.into());
        }
        debug!(id = ?planned.id(), "Created, reading back computed fields");
        match self.read_preserving(&ctx, planned.clone()).await {
            Ok(Some(state)) => (Some(state), Diagnostics::new()),
            Ok(None) => {
                let mut diags = Diagnostics::new();
                diags.error(
                    "created object disappeared",
                    "the remote object vanished between create and read-back",
                );
                (None, diags)
            }
            // Partial apply: keep what create wrote so state is not lost.
            Err(e) => (Some(planned), e.into()),
        }
    }

    /// Refresh. `None` with empty diagnostics means the remote object is
    /// gone and the host should drop it from state.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub async fn read(&self, state: ResourceState) -> (Option<ResourceState>, Diagnostics) {
        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(e) => return (None, e.into()),
        };
        match self.read_preserving(&ctx, state).await {
            Ok(outcome) => (outcome, Diagnostics::new()),
            Err(e) => (None, e.into()),
        }
    }

    /// Update, then read back so server-mutated fields land in state.
    /// An error after partial mutation still attempts the read-back.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub async fn update(
        &self,
        mut planned: ResourceState,
        prior: ResourceState,
    ) -> (Option<ResourceState>, Diagnostics) {
        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(e) => return (None, e.into()),
        };
        let update_result = self.resource.update(&ctx, &mut planned, &prior).await;

        let mut diags = Diagnostics::new();
        if let Err(e) = &update_result {
            warn!(error = %e, "Update failed, attempting read-back for accurate state");
            diags.error("update failed", e.to_string());
        }

        match self.read_preserving(&ctx, planned.clone()).await {
            Ok(Some(state)) => (Some(state), diags),
            Ok(None) => {
                if update_result.is_ok() {
                    diags.error(
                        "updated object disappeared",
                        "the remote object vanished between update and read-back",
                    );
                }
                (None, diags)
            }
            Err(read_err) => {
                if update_result.is_ok() {
                    diags.extend(read_err.into());
                }
                (Some(planned), diags)
            }
        }
    }

    /// Delete. Authoritative-set resources skip the remote call and warn;
    /// a 404 from the remote delete is success.
    #[instrument(skip_all, fields(resource = self.type_name()))]
    pub async fn delete(&self, state: ResourceState) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if self.resource.destroy_scope() == DestroyScope::StateOnly {
            warn!(resource = self.type_name(), "State-only destroy, remote left unchanged");
            diags.warn(
                "destroy removes state only",
                format!(
                    "{} manages remote configuration that has no meaningful default; \
                     the remote object was left unchanged",
                    self.type_name()
                ),
            );
            return diags;
        }

        let ctx = match self.context() {
            Ok(ctx) => ctx,
            Err(e) => return e.into(),
        };
        match self.resource.delete(&ctx, &state).await {
            Ok(()) => diags,
            Err(e) if e.is_not_found() => {
                debug!("Remote object already gone, delete succeeds");
                diags
            }
            Err(e) => e.into(),
        }
    }

    /// Seed state from an import id; the host triggers Read next.
    #[instrument(skip_all, fields(resource = self.type_name(), id))]
    pub fn import(&self, id: &str) -> (Option<ResourceState>, Diagnostics) {
        match self.resource.import(id) {
            Ok(state) => (Some(state), Diagnostics::new()),
            Err(e) => (None, e.into()),
        }
    }

    /// The shared read-into-state routine: run the resource's read, map
    /// 404 to a tombstone, and restore write-only attributes afterwards.
    async fn read_preserving(
        &self,
        ctx: &Context,
        mut state: ResourceState,
    ) -> ConcordResult<Option<ResourceState>> {
        let schema = self.resource.schema();
        let preserved: Vec<(&'static str, AttrValue)> = schema
            .write_only_names()
            .map(|name| (name, state.get(name)))
            .filter(|(_, value)| value.is_known())
            .collect();

        match self.resource.read(ctx, &mut state).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                debug!("Read returned 404, tombstoning");
                state.clear_id();
                return Ok(None);
            }
            Err(e) => return Err(e),
        }
        if state.is_tombstone() {
            return Ok(None);
        }

        for (name, value) in preserved {
            state.set(name, value);
        }
        Ok(Some(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Attribute, Schema};
    use concord_error::TransportError;
    use concord_transport::RestConfig;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// A scripted resource for exercising the lifecycle without a network.
    #[derive(Default)]
    struct FakeResource {
        read_404: std::sync::atomic::AtomicBool,
        delete_404: std::sync::atomic::AtomicBool,
        deletes: AtomicU32,
        reads: AtomicU32,
    }

    #[async_trait::async_trait]
    impl Resource for FakeResource {
        fn type_name(&self) -> &'static str {
            "discord_fake"
        }

        fn schema(&self) -> Schema {
            Schema::new()
                .attribute(Attribute::string("name").require())
                .attribute(Attribute::string("reason").write_only_attr())
                .attribute(Attribute::string("echo").compute())
        }

        async fn create(&self, _ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
            state.set_id("81384788765712384");
            Ok(())
        }

        async fn read(&self, _ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.read_404.load(Ordering::SeqCst) {
                return Err(TransportError::new("GET", "/fake", 404, Some(10003), "gone").into());
            }
            state.set_known("echo", json!("from-remote"));
            // Remote never returns the reason; a naive read would null it.
            state.set_null("reason");
            Ok(())
        }

        async fn update(
            &self,
            _ctx: &Context,
            _planned: &mut ResourceState,
            _prior: &ResourceState,
        ) -> ConcordResult<()> {
            Ok(())
        }

        async fn delete(&self, _ctx: &Context, _state: &ResourceState) -> ConcordResult<()> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            if self.delete_404.load(Ordering::SeqCst) {
                return Err(TransportError::new("DELETE", "/fake", 404, None, "gone").into());
            }
            Ok(())
        }
    }

    struct StateOnlyResource(FakeResource);

    #[async_trait::async_trait]
    impl Resource for StateOnlyResource {
        fn type_name(&self) -> &'static str {
            "discord_fake_order"
        }
        fn schema(&self) -> Schema {
            self.0.schema()
        }
        fn destroy_scope(&self) -> DestroyScope {
            DestroyScope::StateOnly
        }
        async fn create(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
            self.0.create(ctx, state).await
        }
        async fn read(&self, ctx: &Context, state: &mut ResourceState) -> ConcordResult<()> {
            self.0.read(ctx, state).await
        }
        async fn update(
            &self,
            ctx: &Context,
            planned: &mut ResourceState,
            prior: &ResourceState,
        ) -> ConcordResult<()> {
            self.0.update(ctx, planned, prior).await
        }
        async fn delete(&self, ctx: &Context, state: &ResourceState) -> ConcordResult<()> {
            self.0.delete(ctx, state).await
        }
    }

    fn runtime_with(resource: Arc<dyn Resource>) -> ResourceRuntime {
        let runtime = ResourceRuntime::new(resource);
        let config = RestConfig::builder().token("test").build().unwrap();
        runtime.configure(DiscordRest::new(config).unwrap());
        runtime
    }

    #[tokio::test]
    async fn test_unconfigured_resource_errors() {
        let runtime = ResourceRuntime::new(Arc::new(FakeResource::default()));
        let (state, diags) = runtime.create(ResourceState::new()).await;
        assert!(state.is_none());
        assert!(diags.has_errors());
    }

    #[tokio::test]
    async fn test_create_reads_back_and_preserves_write_only() {
        let runtime = runtime_with(Arc::new(FakeResource::default()));
        let mut planned = ResourceState::new();
        planned.set_known("name", json!("x"));
        planned.set_known("reason", json!("audit trail"));

        let (state, diags) = runtime.create(planned).await;
        assert!(!diags.has_errors());
        let state = state.unwrap();
        assert_eq!(state.id().as_deref(), Some("81384788765712384"));
        assert_eq!(state.str_value("echo").as_deref(), Some("from-remote"));
        // The write-only reason survived the read that nulled it.
        assert_eq!(state.str_value("reason").as_deref(), Some("audit trail"));
    }

    #[tokio::test]
    async fn test_read_404_is_tombstone_not_error() {
        let fake = Arc::new(FakeResource::default());
        fake.read_404.store(true, Ordering::SeqCst);
        let runtime = runtime_with(fake);

        let mut state = ResourceState::new();
        state.set_id("81384788765712384");
        let (out, diags) = runtime.read(state).await;
        assert!(out.is_none());
        assert!(diags.is_empty());
    }

    #[tokio::test]
    async fn test_delete_404_is_success() {
        let fake = Arc::new(FakeResource::default());
        fake.delete_404.store(true, Ordering::SeqCst);
        let runtime = runtime_with(fake.clone());

        let diags = runtime.delete(ResourceState::new()).await;
        assert!(!diags.has_errors());
        assert_eq!(fake.deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_state_only_destroy_warns_and_skips_remote() {
        let inner = FakeResource::default();
        let runtime = runtime_with(Arc::new(StateOnlyResource(inner)));

        let diags = runtime.delete(ResourceState::new()).await;
        assert!(!diags.has_errors());
        assert_eq!(diags.len(), 1);
    }

    #[tokio::test]
    async fn test_update_reads_back() {
        let fake = Arc::new(FakeResource::default());
        let runtime = runtime_with(fake.clone());
        let mut prior = ResourceState::new();
        prior.set_id("81384788765712384");
        prior.set_known("name", json!("old"));
        let mut planned = prior.clone();
        planned.set_known("name", json!("new"));

        let (state, diags) = runtime.update(planned, prior).await;
        assert!(!diags.has_errors());
        assert!(state.is_some());
        assert_eq!(fake.reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_default_import_sets_id() {
        let runtime = ResourceRuntime::new(Arc::new(FakeResource::default()));
        let (state, diags) = runtime.import("81384788765712384");
        assert!(!diags.has_errors());
        assert_eq!(state.unwrap().id().as_deref(), Some("81384788765712384"));
        let (none, diags) = runtime.import("");
        assert!(none.is_none());
        assert!(diags.has_errors());
    }
}
