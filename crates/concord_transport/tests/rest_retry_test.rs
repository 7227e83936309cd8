//! Transport behavior against a local HTTP fixture.
//!
//! A minimal HTTP/1.1 server on a loopback TCP socket feeds the transport
//! scripted responses so retry and error surfacing can be observed without
//! touching Discord.

use concord_transport::{DiscordRest, Method, RestConfig};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one scripted HTTP response per queued script entry, closing the
/// connection after each so the client reconnects for retries.
async fn spawn_fixture(responses: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        for response in responses {
            let (mut socket, _) = match listener.accept().await {
                Ok(pair) => pair,
                Err(_) => return,
            };
            // Drain the request head; bodies in these tests are small
            // enough to arrive in one read.
            let mut buf = [0u8; 8192];
            let _ = socket.read(&mut buf).await;
            let _ = socket.write_all(response.as_bytes()).await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

fn response(status: &str, extra_headers: &[(&str, &str)], body: &str) -> String {
    let mut out = format!("HTTP/1.1 {}\r\n", status);
    for (name, value) in extra_headers {
        out.push_str(&format!("{}: {}\r\n", name, value));
    }
    out.push_str(&format!(
        "Content-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    ));
    out
}

fn rest_for(base_url: &str) -> DiscordRest {
    let config = RestConfig::builder()
        .token("test-token")
        .base_url(base_url)
        .max_attempts(3u32)
        .max_backoff(Duration::from_millis(50))
        .build()
        .unwrap();
    DiscordRest::new(config).unwrap()
}

#[tokio::test]
async fn test_429_then_200_waits_and_returns_body() -> anyhow::Result<()> {
    let base = spawn_fixture(vec![
        response(
            "429 Too Many Requests",
            &[("Retry-After", "0.2")],
            r#"{"message":"You are being rate limited.","retry_after":0.2,"global":false}"#,
        ),
        response("200 OK", &[], r#"{"id":"81384788765712384","name":"general"}"#),
    ])
    .await;

    let rest = rest_for(&base);
    let start = Instant::now();
    let body = rest
        .do_json(Method::GET, "/channels/81384788765712384", &[], None, None)
        .await?
        .expect("response body");

    assert!(
        start.elapsed() >= Duration::from_millis(200),
        "coordinator must wait out Retry-After"
    );
    assert_eq!(body["name"], "general");
    Ok(())
}

#[tokio::test]
async fn test_500_then_200_retries_get() {
    let base = spawn_fixture(vec![
        response("500 Internal Server Error", &[], r#"{"message":"oops"}"#),
        response("200 OK", &[], r#"{"id":"1"}"#),
    ])
    .await;

    let rest = rest_for(&base);
    let body = rest
        .do_json(Method::GET, "/users/@me", &[], None, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(body["id"], "1");
}

#[tokio::test]
async fn test_404_surfaces_status_and_code() {
    let base = spawn_fixture(vec![response(
        "404 Not Found",
        &[],
        r#"{"message":"Unknown Guild","code":10004}"#,
    )])
    .await;

    let rest = rest_for(&base);
    let err = rest
        .do_json(Method::GET, "/guilds/81384788765712384", &[], None, None)
        .await
        .unwrap_err();

    let transport = err.as_transport().expect("transport error");
    assert!(transport.is_not_found());
    assert_eq!(*transport.discord_code(), Some(10004));
    assert!(transport.message().contains("Unknown Guild"));
}

#[tokio::test]
async fn test_204_returns_none() {
    let base = spawn_fixture(vec![
        "HTTP/1.1 204 No Content\r\nConnection: close\r\n\r\n".to_string(),
    ])
    .await;

    let rest = rest_for(&base);
    let body = rest
        .do_json(
            Method::DELETE,
            "/guilds/81384788765712384/bans/53908232506183680",
            &[],
            None,
            Some("unbanned via concord"),
        )
        .await
        .unwrap();
    assert!(body.is_none());
}

#[tokio::test]
async fn test_bucket_bookkeeping_updates_from_headers() {
    let base = spawn_fixture(vec![response(
        "200 OK",
        &[
            ("X-RateLimit-Bucket", "abcd1234"),
            ("X-RateLimit-Remaining", "4"),
            ("X-RateLimit-Reset-After", "5.0"),
        ],
        r#"{"id":"1"}"#,
    )])
    .await;

    let rest = rest_for(&base);
    rest.do_json(Method::GET, "/gateway", &[], None, None)
        .await
        .unwrap();

    let snap = rest
        .limiter()
        .snapshot("GET:/gateway")
        .await
        .expect("bucket recorded");
    assert_eq!(snap.remaining, Some(4));
    assert_eq!(snap.bucket_key.as_deref(), Some("abcd1234"));
    assert!(snap.reset_pending);
}
