use std::time::Duration;

use sweep_engine::{FailureKind, ReqwestTransport, Transport, TransportSettings};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport(settings: TransportSettings) -> ReqwestTransport {
    ReqwestTransport::new(&settings).expect("transport builds")
}

#[tokio::test]
async fn transport_counts_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/doc"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<html>ok</html>", "text/html; charset=utf-8"),
        )
        .mount(&server)
        .await;

    let url = format!("{}/doc", server.uri());
    let output = transport(TransportSettings::default())
        .fetch(&url)
        .await
        .expect("fetch ok");

    assert_eq!(output.status, 200);
    assert_eq!(output.final_url, url);
    assert_eq!(output.bytes, 15);
    assert_eq!(output.retry_after, None);
}

#[tokio::test]
async fn transport_returns_error_statuses_as_output() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/missing", server.uri());
    let output = transport(TransportSettings::default())
        .fetch(&url)
        .await
        .expect("http errors are not transport errors");
    assert_eq!(output.status, 404);
}

#[tokio::test]
async fn transport_reads_retry_after_on_throttle() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "3"))
        .mount(&server)
        .await;

    let url = format!("{}/busy", server.uri());
    let output = transport(TransportSettings::default())
        .fetch(&url)
        .await
        .unwrap();
    assert_eq!(output.status, 429);
    assert_eq!(output.retry_after, Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn transport_times_out_on_slow_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_string("slow"),
        )
        .mount(&server)
        .await;

    let settings = TransportSettings {
        request_timeout: Duration::from_millis(50),
        ..TransportSettings::default()
    };
    let url = format!("{}/slow", server.uri());

    let err = transport(settings).fetch(&url).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn transport_rejects_invalid_url() {
    let err = transport(TransportSettings::default())
        .fetch("not a url")
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

#[tokio::test]
async fn transport_reports_refused_connection_as_network_error() {
    // Bind then drop a listener so the port is known to be closed.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = transport(TransportSettings::default())
        .fetch(&format!("http://{addr}/"))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Network);
}

#[tokio::test]
async fn transport_follows_redirects_within_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200).set_body_string("moved"))
        .mount(&server)
        .await;

    let output = transport(TransportSettings::default())
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap();
    assert_eq!(output.status, 200);
    assert_eq!(output.final_url, format!("{}/new", server.uri()));

    let no_redirects = TransportSettings {
        redirect_limit: 0,
        ..TransportSettings::default()
    };
    let err = transport(no_redirects)
        .fetch(&format!("{}/old", server.uri()))
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::RedirectLimitExceeded);
}

#[tokio::test]
async fn transport_rotates_user_agents() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(header("user-agent", "agent-one"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(header("user-agent", "agent-two"))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let settings = TransportSettings {
        user_agents: vec!["agent-one".to_string(), "agent-two".to_string()],
        ..TransportSettings::default()
    };
    let transport = transport(settings);
    let url = format!("{}/page", server.uri());
    for _ in 0..4 {
        assert_eq!(transport.fetch(&url).await.unwrap().status, 200);
    }
    server.verify().await;
}
