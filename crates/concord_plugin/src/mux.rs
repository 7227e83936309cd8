//! Request routing across provider surfaces.

use crate::frame::{Op, Request, Response};
use crate::provider::ProviderSurface;
use concord_error::{PluginError, PluginErrorKind};
use concord_provider::{Context, DataSource, Diagnostics, ResourceRuntime, ResourceState, Schema};
use concord_transport::{DiscordRest, RestConfig};
use serde_json::{Map, Value, json};
use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Routes each request to the one surface serving its type and owns the
/// shared transport.
pub struct ProviderMux {
    surfaces: Vec<ProviderSurface>,
    transport: RwLock<Option<DiscordRest>>,
}

impl ProviderMux {
    /// Compose surfaces, rejecting any type name two of them both claim.
    ///
    /// # Errors
    ///
    /// Returns [`PluginErrorKind::DuplicateType`] when two surfaces
    /// register the same resource (or data-source) type name.
    pub fn new(surfaces: Vec<ProviderSurface>) -> Result<Self, PluginError> {
        let mut resources = HashSet::new();
        let mut data_sources = HashSet::new();
        for surface in &surfaces {
            for name in surface.resource_names() {
                if !resources.insert(name) {
                    return Err(PluginError::new(PluginErrorKind::DuplicateType(
                        name.to_string(),
                    )));
                }
            }
            for name in surface.data_source_names() {
                if !data_sources.insert(name) {
                    return Err(PluginError::new(PluginErrorKind::DuplicateType(
                        name.to_string(),
                    )));
                }
            }
        }
        info!(
            surfaces = surfaces.len(),
            resources = resources.len(),
            data_sources = data_sources.len(),
            "Provider mux assembled"
        );
        Ok(Self {
            surfaces,
            transport: RwLock::new(None),
        })
    }

    /// The standard pairing: legacy + framework.
    pub fn standard() -> Result<Self, PluginError> {
        Self::new(vec![ProviderSurface::legacy(), ProviderSurface::framework()])
    }

    fn runtime(&self, type_name: &str) -> Result<&ResourceRuntime, PluginError> {
        self.surfaces
            .iter()
            .find_map(|s| s.resource(type_name))
            .ok_or_else(|| PluginError::new(PluginErrorKind::UnknownType(type_name.to_string())))
    }

    fn data_source(&self, type_name: &str) -> Result<&Arc<dyn DataSource>, PluginError> {
        self.surfaces
            .iter()
            .find_map(|s| s.data_source(type_name))
            .ok_or_else(|| PluginError::new(PluginErrorKind::UnknownType(type_name.to_string())))
    }

    /// Build the shared transport from the Configure payload and hand it
    /// to every surface.
    pub fn configure(&self, config: &Map<String, Value>) -> Diagnostics {
        let mut diags = Diagnostics::new();
        let Some(token) = config.get("token").and_then(Value::as_str) else {
            diags.error("missing token", "provider configuration requires a bot token");
            return diags;
        };

        let mut builder = RestConfig::builder();
        builder.token(token);
        if let Some(base_url) = config.get("base_url").and_then(Value::as_str) {
            builder.base_url(base_url);
        }
        if let Some(user_agent) = config.get("user_agent").and_then(Value::as_str) {
            builder.user_agent(user_agent);
        }
        if let Some(seconds) = config.get("timeout_seconds").and_then(Value::as_u64) {
            builder.request_timeout(Duration::from_secs(seconds));
        }
        if let Some(attempts) = config.get("max_attempts").and_then(Value::as_u64) {
            builder.max_attempts(attempts as u32);
        }

        let rest = match builder.build() {
            Ok(rest_config) => match DiscordRest::new(rest_config) {
                Ok(rest) => rest,
                Err(e) => {
                    diags.error("transport init failed", e.to_string());
                    return diags;
                }
            },
            Err(e) => {
                diags.error("invalid provider configuration", e.to_string());
                return diags;
            }
        };

        for surface in &self.surfaces {
            surface.configure(&rest);
        }
        *self.transport.write().expect("transport lock poisoned") = Some(rest);
        debug!("Transport configured and distributed to all surfaces");
        diags
    }

    fn context(&self) -> Result<Context, PluginError> {
        let guard = self.transport.read().expect("transport lock poisoned");
        match guard.as_ref() {
            Some(rest) => Ok(Context::new(rest.clone())),
            None => Err(PluginError::new(PluginErrorKind::NotConfigured(
                "data source used before Configure".to_string(),
            ))),
        }
    }

    /// Dispatch one request frame.
    #[instrument(skip_all, fields(id = request.id, op = ?request.op))]
    pub async fn handle(&self, request: Request) -> Response {
        let id = request.id;
        match self.dispatch(request).await {
            Ok(response) => response,
            Err(e) => {
                let mut diags = Diagnostics::new();
                diags.error("request failed", e.to_string());
                Response::diagnostics(id, diags)
            }
        }
    }

    async fn dispatch(&self, request: Request) -> Result<Response, PluginError> {
        let id = request.id;
        let op = request.op;
        let type_name = request.type_name.as_deref().unwrap_or_default();

        let frame_error = move |what: &str| {
            PluginError::new(PluginErrorKind::MalformedFrame(format!(
                "{:?} requires {}",
                op, what
            )))
        };

        match op {
            Op::Configure => {
                let config = request.config.as_ref().ok_or_else(|| frame_error("config"))?;
                Ok(Response::diagnostics(id, self.configure(config)))
            }
            Op::Schema => {
                let schema = match self.runtime(type_name) {
                    Ok(runtime) => runtime.schema(),
                    Err(_) => self.data_source(type_name)?.schema(),
                };
                Ok(Response {
                    id,
                    state: None,
                    schema: Some(describe_schema(&schema)),
                    diagnostics: Diagnostics::new(),
                })
            }
            Op::Validate => {
                let config = request.config.ok_or_else(|| frame_error("config"))?;
                let diags = self
                    .runtime(type_name)?
                    .validate(&ResourceState::from_map(config));
                Ok(Response::diagnostics(id, diags))
            }
            Op::Plan => {
                let planned = request.planned.ok_or_else(|| frame_error("planned"))?;
                let prior = request.prior.map(ResourceState::from_map);
                let mut planned = ResourceState::from_map(planned);
                let diags = self.runtime(type_name)?.plan(prior.as_ref(), &mut planned);
                Ok(Response::with_state(id, Some(planned.into_map()), diags))
            }
            Op::Create => {
                let planned = request.planned.ok_or_else(|| frame_error("planned"))?;
                let (state, diags) = self
                    .runtime(type_name)?
                    .create(ResourceState::from_map(planned))
                    .await;
                Ok(Response::with_state(id, state.map(ResourceState::into_map), diags))
            }
            Op::Read => {
                let state = request.state.ok_or_else(|| frame_error("state"))?;
                let (state, diags) = self
                    .runtime(type_name)?
                    .read(ResourceState::from_map(state))
                    .await;
                Ok(Response::with_state(id, state.map(ResourceState::into_map), diags))
            }
            Op::Update => {
                let planned = request.planned.ok_or_else(|| frame_error("planned"))?;
                let prior = request.prior.ok_or_else(|| frame_error("prior"))?;
                let (state, diags) = self
                    .runtime(type_name)?
                    .update(ResourceState::from_map(planned), ResourceState::from_map(prior))
                    .await;
                Ok(Response::with_state(id, state.map(ResourceState::into_map), diags))
            }
            Op::Delete => {
                let state = request.state.ok_or_else(|| frame_error("state"))?;
                let diags = self
                    .runtime(type_name)?
                    .delete(ResourceState::from_map(state))
                    .await;
                Ok(Response::diagnostics(id, diags))
            }
            Op::Import => {
                let import_id = request.import_id.ok_or_else(|| frame_error("import_id"))?;
                let (state, diags) = self.runtime(type_name)?.import(&import_id);
                Ok(Response::with_state(id, state.map(ResourceState::into_map), diags))
            }
            Op::ReadData => {
                let config = request.config.ok_or_else(|| frame_error("config"))?;
                let ctx = self.context()?;
                let mut state = ResourceState::from_map(config);
                match self.data_source(type_name)?.read(&ctx, &mut state).await {
                    Ok(()) => Ok(Response::with_state(
                        id,
                        Some(state.into_map()),
                        Diagnostics::new(),
                    )),
                    Err(e) => Ok(Response::diagnostics(id, e.into())),
                }
            }
        }
    }
}

/// Serialize a schema for the host: attribute metadata without validators.
fn describe_schema(schema: &Schema) -> Value {
    let attributes: Vec<Value> = schema
        .attributes()
        .iter()
        .map(|a| {
            json!({
                "name": a.name(),
                "type": a.attr_type().to_string(),
                "required": a.required(),
                "computed": a.computed(),
                "write_only": a.write_only(),
                "requires_replace": a.requires_replace(),
            })
        })
        .collect();
    json!({ "attributes": attributes })
}
