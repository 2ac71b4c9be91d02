mod common;

use std::time::Duration;

use common::{client_for, fixture};
use osrm_relay_lib::{
    Coordinate, CoordinateSequence, EngineConfig, Error, Operation, QueryParams, RoutingClient,
};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn seq(text: &str) -> CoordinateSequence {
    text.parse().expect("valid coordinate sequence")
}

#[tokio::test]
async fn route_defaults_overview_false() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/1,1;2,2"))
        .and(query_param("overview", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("route_two_legs.json")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .route(&seq("1,1;2,2"), &QueryParams::new())
        .await
        .expect("route succeeds");

    assert!(response.is_successful());
    assert_eq!(response.routes()[0].legs.len(), 2);
}

#[tokio::test]
async fn route_keeps_caller_overview() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/1,1;2,2"))
        .and(query_param("overview", "full"))
        .and(query_param("steps", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "Ok", "routes": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let params = QueryParams::new()
        .with("overview", "full")
        .with("steps", "true");
    let response = client.route(&seq("1,1;2,2"), &params).await.unwrap();
    assert!(response.is_ok());

    let requests = server.received_requests().await.unwrap();
    let overview: Vec<_> = requests[0]
        .url
        .query_pairs()
        .filter(|(k, _)| k == "overview")
        .collect();
    assert_eq!(overview.len(), 1);
}

#[tokio::test]
async fn route_places_via_points_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/route/v1/driving/1,1;1.5,1.5;1.7,1.7;2,2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("route_two_legs.json")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let start: Coordinate = "1,1".parse().unwrap();
    let end: Coordinate = "2,2".parse().unwrap();
    let via: Vec<Coordinate> = vec!["1.5,1.5".parse().unwrap(), "1.7,1.7".parse().unwrap()];

    let sequence = CoordinateSequence::route(&start, &via, &end);
    client.route(&sequence, &QueryParams::new()).await.unwrap();
}

#[tokio::test]
async fn other_operations_do_not_add_overview() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/table/v1/driving/30.7233,46.4825;30.74,46.5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("table_two_points.json")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .table(&seq("30.7233,46.4825;30.74,46.5"), &QueryParams::new())
        .await
        .unwrap();

    assert_eq!(serde_json::to_value(&response).unwrap(), fixture("table_two_points.json"));
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].url.query().is_none());
}

#[tokio::test]
async fn nearest_match_and_trip_paths() {
    let server = MockServer::start().await;
    for (route, body) in [
        ("/nearest/v1/driving/3,4", fixture("nearest_one_candidate.json")),
        ("/match/v1/driving/1,1;2,2;3,3", json!({"code": "Ok", "matchings": [], "tracepoints": []})),
        ("/trip/v1/driving/1,1;2,2", json!({"code": "Ok", "trips": [], "waypoints": []})),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = client_for(&server);
    let point: Coordinate = "3,4".parse().unwrap();
    let nearest = client.nearest(&point, &QueryParams::new()).await.unwrap();
    assert_eq!(nearest.waypoints().len(), 1);

    let matched = client
        .match_trace(&seq("1,1;2,2;3,3"), &QueryParams::new())
        .await
        .unwrap();
    assert!(matched.extra.contains_key("matchings"));

    let trip = client.trip(&seq("1,1;2,2"), &QueryParams::new()).await.unwrap();
    assert!(trip.extra.contains_key("trips"));
}

#[tokio::test]
async fn unsuccessful_code_is_returned_verbatim() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(fixture("route_no_route.json")))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let response = client
        .route(&seq("1,1;2,2"), &QueryParams::new())
        .await
        .unwrap();
    assert_eq!(response.code, "NoRoute");
    assert!(!response.is_successful());
}

#[tokio::test]
async fn non_success_status_is_rejected_with_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({"code": "NoSegment", "message": "Could not find a matching segment"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .route(&seq("1,1;2,2"), &QueryParams::new())
        .await
        .unwrap_err();

    match err {
        Error::EngineRejected { status, payload } => {
            assert_eq!(status, 400);
            assert_eq!(payload.engine_code(), Some("NoSegment"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn text_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .table(&seq("1,1"), &QueryParams::new())
        .await
        .unwrap_err();

    match err {
        Error::EngineRejected { status, payload } => {
            assert_eq!(status, 503);
            assert_eq!(payload.to_json(), json!({"error": "overloaded"}));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .route(&seq("1,1;2,2"), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
}

#[tokio::test]
async fn unreachable_engine_is_service_unavailable() {
    // Port 9 (discard) is not expected to accept HTTP connections.
    let config = EngineConfig::new("http://127.0.0.1:9").with_timeout(Duration::from_secs(2));
    let client = RoutingClient::new(config).unwrap();

    let err = client
        .route(&seq("1,1;2,2"), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::ServiceUnavailable { .. }), "{err:?}");
}

#[tokio::test]
async fn too_few_coordinates_fail_before_any_call() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    let err = client
        .query(Operation::Route, &seq("1,1"), &QueryParams::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidCoordinates { .. }));
    assert!(server.received_requests().await.unwrap().is_empty());
}
