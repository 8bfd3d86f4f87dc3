#![allow(clippy::unwrap_used)]
// Integration tests for `InfluxClient` using wiremock.

use chrono::{TimeZone, Utc};
use url::Url;
use wiremock::matchers::{body_string, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unipoll_api::{BatchConfig, BatchPoints, Error, InfluxClient, Point};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(username: Option<&str>) -> (MockServer, InfluxClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = InfluxClient::with_client(
        reqwest::Client::new(),
        base_url,
        username.map(str::to_owned),
        username.map(|_| "secret".to_string().into()),
    );
    (server, client)
}

fn batch(precision: &str) -> BatchPoints {
    let mut batch = BatchPoints::new(&BatchConfig {
        database: "unifi".into(),
        precision: precision.into(),
        retention_policy: None,
    })
    .unwrap();
    batch.add_point(
        Point::builder("uap")
            .tag("mac", "aa:bb")
            .field("num_sta", 3_i64)
            .timestamp(Utc.timestamp_opt(100, 0).unwrap())
            .build()
            .unwrap(),
    );
    batch
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_write_posts_line_protocol() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .and(query_param("db", "unifi"))
        .and(query_param("precision", "s"))
        .and(body_string("uap,mac=aa:bb num_sta=3i 100\n"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.write(&batch("s")).await.unwrap();
}

#[tokio::test]
async fn test_write_sends_basic_auth_when_configured() {
    let (server, client) = setup(Some("poller")).await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.write(&batch("ns")).await.unwrap();
}

#[tokio::test]
async fn test_write_failure_carries_status_and_body() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(
            ResponseTemplate::new(404).set_body_string(r#"{"error":"database not found: \"unifi\""}"#),
        )
        .mount(&server)
        .await;

    let err = client.write(&batch("s")).await.unwrap_err();

    match err {
        Error::Influx { status, message } => {
            assert_eq!(status, 404);
            assert!(message.contains("database not found"));
        }
        other => panic!("expected Influx error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_batch_is_not_sent() {
    let (server, client) = setup(None).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let empty = BatchPoints::new(&BatchConfig::new("unifi")).unwrap();
    client.write(&empty).await.unwrap();
}

#[tokio::test]
async fn test_write_keeps_url_path_prefix() {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/influx", server.uri())).unwrap();
    let client = InfluxClient::with_client(reqwest::Client::new(), base_url, None, None);

    Mock::given(method("POST"))
        .and(path("/influx/write"))
        .and(query_param("db", "unifi"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(404))
        .expect(0)
        .mount(&server)
        .await;

    client.write(&batch("s")).await.unwrap();
}
