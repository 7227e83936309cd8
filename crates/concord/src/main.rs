//! The provider binary: bind the plugin socket and serve until stopped.

use concord::ProviderConfig;
use concord_error::ConcordResult;
use concord_plugin::{PluginServer, ProviderMux};
use serde_json::{Map, Value, json};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        error!(error = %e, "Provider exited");
        std::process::exit(1);
    }
}

async fn run() -> ConcordResult<()> {
    let settings = ProviderConfig::load()?;
    let mux = ProviderMux::standard()?;

    // A token from the environment lets the transport come up before the
    // host ever sends a Configure frame; without one we wait for it.
    match settings.token() {
        Some(_) => {
            let diags = mux.configure(&configure_payload(&settings));
            if diags.has_errors() {
                for diag in diags.iter() {
                    error!(
                        summary = %diag.summary(),
                        detail = diag.detail().as_deref().unwrap_or_default(),
                        "Configuration failed"
                    );
                }
                return Err(concord_error::ConfigError::new("transport initialization failed").into());
            }
            info!("Transport configured from the environment");
        }
        None => {
            warn!("No token in the environment; waiting for a Configure frame");
        }
    }

    let server = PluginServer::new(mux, settings.socket_path());
    server.serve().await
}

fn configure_payload(settings: &ProviderConfig) -> Map<String, Value> {
    let mut payload = Map::new();
    if let Some(token) = settings.token() {
        payload.insert("token".to_string(), json!(token));
    }
    if let Some(user_agent) = settings.user_agent() {
        payload.insert("user_agent".to_string(), json!(user_agent));
    }
    payload.insert("timeout_seconds".to_string(), json!(settings.timeout_seconds()));
    payload.insert("max_attempts".to_string(), json!(settings.max_attempts()));
    payload
}
