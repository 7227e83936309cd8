//! The unix-socket plugin endpoint.

use crate::frame::{Request, Response};
use crate::mux::ProviderMux;
use concord_error::{ConcordResult, PluginError, PluginErrorKind};
use concord_provider::Diagnostics;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, info, instrument, warn};

/// Protocol version advertised in the handshake line.
pub const PROTOCOL_VERSION: u32 = 6;

/// Serves the mux over a unix socket: one JSON frame per line, one
/// response line per request, connections handled concurrently.
pub struct PluginServer {
    mux: Arc<ProviderMux>,
    socket_path: PathBuf,
}

impl PluginServer {
    /// A server for `mux` listening at `socket_path`.
    pub fn new(mux: ProviderMux, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            mux: Arc::new(mux),
            socket_path: socket_path.into(),
        }
    }

    /// Bind the socket and print the handshake line.
    ///
    /// # Errors
    ///
    /// Returns [`PluginErrorKind::BindFailed`] when the socket cannot be
    /// bound; the binary turns this into a non-zero exit.
    pub fn bind(&self) -> ConcordResult<UnixListener> {
        // A stale socket file from a crashed run would make bind fail.
        if self.socket_path.exists() {
            let _ = std::fs::remove_file(&self.socket_path);
        }
        let listener = UnixListener::bind(&self.socket_path).map_err(|e| {
            PluginError::new(PluginErrorKind::BindFailed(format!(
                "{}: {}",
                self.socket_path.display(),
                e
            )))
        })?;
        // The host parses this line to find the endpoint.
        println!("{}|unix|{}", PROTOCOL_VERSION, self.socket_path.display());
        info!(path = %self.socket_path.display(), "Plugin endpoint bound");
        Ok(listener)
    }

    /// Accept and serve connections until the process is stopped.
    #[instrument(skip_all, fields(path = %self.socket_path.display()))]
    pub async fn serve(&self) -> ConcordResult<()> {
        let listener = self.bind()?;
        loop {
            match listener.accept().await {
                Ok((stream, _addr)) => {
                    let mux = Arc::clone(&self.mux);
                    tokio::spawn(async move {
                        if let Err(e) = serve_connection(mux, stream).await {
                            warn!(error = %e, "Connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    warn!(error = %e, "Accept failed");
                }
            }
        }
    }

    /// The socket path this server binds.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

/// Serve one connection until the host closes it.
pub async fn serve_connection(mux: Arc<ProviderMux>, stream: UnixStream) -> std::io::Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Request>(&line) {
            Ok(request) => mux.handle(request).await,
            Err(e) => {
                let mut diags = Diagnostics::new();
                diags.error(
                    "malformed frame",
                    PluginError::new(PluginErrorKind::MalformedFrame(e.to_string())).to_string(),
                );
                Response::diagnostics(0, diags)
            }
        };
        let mut encoded = match serde_json::to_string(&response) {
            Ok(encoded) => encoded,
            Err(e) => {
                warn!(error = %e, "Failed to encode response frame");
                continue;
            }
        };
        encoded.push('\n');
        writer.write_all(encoded.as_bytes()).await?;
    }
    debug!("Host closed the connection");
    Ok(())
}
