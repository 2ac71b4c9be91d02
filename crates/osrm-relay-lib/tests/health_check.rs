use std::time::Duration;

use osrm_relay_lib::health::{check_engine_status, run_checks, EngineCheck, FileStatus, SAMPLE_ROUTE};
use osrm_relay_lib::EngineConfig;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn healthy_engine_reports_ok_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/route/v1/driving/{}", SAMPLE_ROUTE)))
        .and(query_param("overview", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "Ok", "routes": []})))
        .mount(&server)
        .await;

    let check = check_engine_status(
        &EngineConfig::new(format!("{}/", server.uri())),
        Duration::from_secs(2),
    ).await;
    assert_eq!(
        check,
        EngineCheck::Ok {
            status_code: 200,
            payload: json!({"code": "Ok", "routes": []}),
        }
    );
}

#[tokio::test]
async fn sample_route_uses_configured_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/route/v1/foot/{}", SAMPLE_ROUTE)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "Ok"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"code": "InvalidUrl"})))
        .mount(&server)
        .await;

    let config = EngineConfig::new(server.uri()).with_profile("foot");
    let check = check_engine_status(&config, Duration::from_secs(2)).await;

    assert!(check.is_ok(), "{check:?}");
}

#[tokio::test]
async fn error_status_keeps_text_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let check = check_engine_status(&EngineConfig::new(server.uri()), Duration::from_secs(2)).await;
    assert_eq!(
        check,
        EngineCheck::Error {
            status_code: 500,
            payload: json!("boom"),
        }
    );
}

#[tokio::test]
async fn unreachable_engine_is_reported() {
    let check = check_engine_status(&EngineConfig::new("http://127.0.0.1:9"), Duration::from_secs(2)).await;
    assert!(matches!(check, EngineCheck::Unreachable { .. }), "{check:?}");
}

#[tokio::test]
async fn report_combines_engine_and_files() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "Ok"})))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let report = run_checks(&EngineConfig::new(server.uri()), dir.path()).await;

    assert_eq!(report.osrm_url, server.uri());
    assert!(report.osrm.is_ok());
    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0].status, FileStatus::Missing);
    assert!(!report.is_healthy());

    let rendered = serde_json::to_value(&report).unwrap();
    assert_eq!(rendered["osrm"]["status"], "ok");
    assert_eq!(rendered["data"][0]["status"], "missing");
}
