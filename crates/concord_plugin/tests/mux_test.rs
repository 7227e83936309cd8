use concord_plugin::{Op, PluginServer, ProviderMux, ProviderSurface, Request, Response};
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

fn object(value: Value) -> Map<String, Value> {
    value.as_object().expect("object literal").clone()
}

fn request(id: u64, op: Op, type_name: &str) -> Request {
    Request {
        id,
        op,
        type_name: Some(type_name.to_string()),
        config: None,
        state: None,
        planned: None,
        prior: None,
        import_id: None,
    }
}

#[test]
fn test_duplicate_type_rejected_at_startup() {
    let result = ProviderMux::new(vec![ProviderSurface::legacy(), ProviderSurface::legacy()]);
    assert!(result.is_err());
    let message = result.err().map(|e| e.to_string()).unwrap_or_default();
    assert!(message.contains("Duplicate type"), "{message}");
}

#[test]
fn test_standard_pairing_has_no_duplicates() {
    assert!(ProviderMux::standard().is_ok());
}

#[tokio::test]
async fn test_unknown_type_is_a_diagnostic() {
    let mux = ProviderMux::standard().unwrap();
    let mut req = request(1, Op::Read, "discord_widget");
    req.state = Some(object(json!({"id": "81384788765712384"})));
    let response = mux.handle(req).await;
    assert!(response.diagnostics.has_errors());
    assert!(response.state.is_none());
}

#[tokio::test]
async fn test_schema_op_describes_attributes() {
    let mux = ProviderMux::standard().unwrap();
    let response = mux.handle(request(2, Op::Schema, "discord_channel")).await;
    assert!(!response.diagnostics.has_errors());
    let schema = response.schema.expect("schema payload");
    let attributes = schema["attributes"].as_array().expect("attributes");
    let server_id = attributes
        .iter()
        .find(|a| a["name"] == "server_id")
        .expect("server_id attribute");
    assert_eq!(server_id["required"], json!(true));
    assert_eq!(server_id["requires_replace"], json!(true));
}

#[tokio::test]
async fn test_validate_routes_to_owning_surface() {
    let mux = ProviderMux::standard().unwrap();
    // Sticker lives on the framework surface; a bad config must still
    // reach it through the shared endpoint.
    let mut req = request(3, Op::Validate, "discord_sticker");
    req.config = Some(object(json!({"name": "party"})));
    let response = mux.handle(req).await;
    assert!(response.diagnostics.has_errors());
}

#[tokio::test]
async fn test_data_source_before_configure_errors() {
    let mux = ProviderMux::standard().unwrap();
    let mut req = request(4, Op::ReadData, "discord_color");
    req.config = Some(object(json!({"hex": "#7289da"})));
    let response = mux.handle(req).await;
    assert!(response.diagnostics.has_errors());
}

#[tokio::test]
async fn test_local_data_source_after_configure() {
    let mux = ProviderMux::standard().unwrap();
    let configure = Request {
        id: 5,
        op: Op::Configure,
        type_name: None,
        config: Some(object(json!({"token": "test-token"}))),
        state: None,
        planned: None,
        prior: None,
        import_id: None,
    };
    assert!(!mux.handle(configure).await.diagnostics.has_errors());

    let mut req = request(6, Op::ReadData, "discord_color");
    req.config = Some(object(json!({"hex": "#7289da"})));
    let response = mux.handle(req).await;
    assert!(!response.diagnostics.has_errors());
    let state = response.state.expect("resolved state");
    assert_eq!(state.get("dec"), Some(&json!(0x7289da)));
}

#[tokio::test]
async fn test_import_composite_id_over_mux() {
    let mux = ProviderMux::standard().unwrap();
    let mut req = request(7, Op::Import, "discord_ban");
    req.import_id = Some("81384788765712384:53908232506183680".to_string());
    let response = mux.handle(req).await;
    assert!(!response.diagnostics.has_errors());
    let state = response.state.expect("imported state");
    assert_eq!(state.get("user_id"), Some(&json!("53908232506183680")));

    let mut bad = request(8, Op::Import, "discord_ban");
    bad.import_id = Some("missing-colon".to_string());
    assert!(mux.handle(bad).await.diagnostics.has_errors());
}

#[tokio::test]
async fn test_socket_round_trip() -> anyhow::Result<()> {
    let dir = std::env::temp_dir().join(format!("concord-plugin-{}", std::process::id()));
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("endpoint.sock");

    let server = PluginServer::new(ProviderMux::standard()?, &path);
    let server = Arc::new(server);
    let serving = Arc::clone(&server);
    tokio::spawn(async move {
        let _ = serving.serve().await;
    });

    // Wait for the socket to appear.
    for _ in 0..50 {
        if path.exists() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }

    let stream = UnixStream::connect(&path).await?;
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    let frame = json!({
        "id": 9,
        "op": "schema",
        "type": "discord_role",
    })
    .to_string()
        + "\n";
    writer.write_all(frame.as_bytes()).await?;

    let line = lines.next_line().await?.expect("response line");
    let response: Response = serde_json::from_str(&line)?;
    assert_eq!(response.id, 9);
    assert!(response.schema.is_some());

    // A malformed line still gets a diagnostics frame back.
    writer.write_all(b"not json\n").await?;
    let line = lines.next_line().await?.expect("error line");
    let response: Response = serde_json::from_str(&line)?;
    assert!(response.diagnostics.has_errors());

    std::fs::remove_file(&path).ok();
    Ok(())
}
