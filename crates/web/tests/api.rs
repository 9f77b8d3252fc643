use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use public_transport::{memory::MemoryDatabase, placement::AnchorScope};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;
use web::{router, WebState};

fn app() -> Router {
    router(WebState::new(MemoryDatabase::default(), AnchorScope::Route))
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// A "bus" type and a node with three stops.
async fn seed(app: &Router) -> Vec<String> {
    let (status, _) = send(app, Method::PUT, "/api/v1/types/", Some(json!({"name": "bus"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, node) = send(
        app,
        Method::POST,
        "/api/v1/nodes/",
        Some(json!({
            "name": "Hauptbahnhof",
            "stops": [
                {"lat": "54.1", "lon": "10.1"},
                {"lat": "54.2", "lon": "10.2"},
                {"lat": "54.3", "lon": "10.3"},
            ],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let node_id = node["id"].as_str().unwrap().to_owned();

    let (_, stops) = send(app, Method::GET, "/api/v1/stops/", None).await;
    let stops = stops.as_array().unwrap();
    assert_eq!(stops.len(), 3);
    assert!(stops.iter().all(|stop| stop["node_id"] == node_id.as_str()));
    stops
        .iter()
        .map(|stop| stop["id"].as_str().unwrap().to_owned())
        .collect()
}

#[tokio::test]
async fn test_ping() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/ping", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "pong!");
}

#[tokio::test]
async fn test_type_created_twice_conflicts() {
    let app = app();
    let (status, body) =
        send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "tram"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "tram"}));

    let (status, body) =
        send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "tram"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["resourceType"], "Type");
    assert_eq!(body["resourceIdentifier"], "tram");
    assert_eq!(body["httpMethod"], "PUT");
}

#[tokio::test]
async fn test_type_renamed_through_path() {
    let app = app();
    send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "bus"}))).await;

    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/types/bus",
        Some(json!({"name": "coach"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"name": "coach"}));

    let (status, _) = send(&app, Method::GET, "/api/v1/types/bus", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, Method::GET, "/api/v1/types/coach", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_type_named_like_schema_route_is_refused() {
    let app = app();
    let (status, body) =
        send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "schema"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["resourceType"], "Type");
    assert_eq!(body["resourceIdentifier"], "schema");

    send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "bus"}))).await;
    let (status, _) = send(
        &app,
        Method::PUT,
        "/api/v1/types/bus",
        Some(json!({"name": "schema"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, types) = send(&app, Method::GET, "/api/v1/types/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(types, json!([{"name": "bus"}]));
    let (status, schema) = send(&app, Method::GET, "/api/v1/types/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(schema.get("name").is_none());
}

#[tokio::test]
async fn test_route_upsert_assigns_id() {
    let app = app();
    send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "bus"}))).await;

    let (status, route) = send(
        &app,
        Method::PUT,
        "/api/v1/routes/",
        Some(json!({"number": "42", "type_name": "bus"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = route["id"].as_str().unwrap();
    assert_ne!(id, Uuid::nil().to_string());

    let (status, fetched) = send(&app, Method::GET, &format!("/api/v1/routes/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, route);
}

#[tokio::test]
async fn test_route_with_unknown_type_conflicts() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::PUT,
        "/api/v1/routes/",
        Some(json!({"number": "42", "type_name": "ferry"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["resourceType"], "Route");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_missing_route_names_request() {
    let app = app();
    let id = Uuid::now_v7();
    let uri = format!("/api/v1/routes/{id}");
    let (status, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["httpMethod"], "GET");
    assert_eq!(body["requestedUri"], uri.as_str());
    assert_eq!(body["resourceType"], "Route");
    assert_eq!(body["resourceIdentifier"], id.to_string());
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn test_stop_on_taken_coordinates_conflicts() {
    let app = app();
    seed(&app).await;
    let (_, nodes) = send(&app, Method::GET, "/api/v1/nodes/", None).await;
    let node_id = nodes[0]["id"].clone();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stops/",
        Some(json!({"node_id": node_id, "lat": "54.2", "lon": "10.2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["resourceType"], "Stop");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/stops/",
        Some(json!({"node_id": node_id, "lat": "54.4", "lon": "10.4"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_stop_out_of_range_is_rejected() {
    let app = app();
    seed(&app).await;
    let (_, nodes) = send(&app, Method::GET, "/api/v1/nodes/", None).await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/stops/",
        Some(json!({"node_id": nodes[0]["id"], "lat": "91", "lon": "10"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["message"], "Request body could not be read.");
    assert!(body["details"].as_str().unwrap().contains("out of range"));

    let (_, stops) = send(&app, Method::GET, "/api/v1/stops/", None).await;
    assert_eq!(stops.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_malformed_id_in_path_is_rejected() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/routes/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Request path could not be read.");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_place_stop_after_anchor() {
    let app = app();
    let stops = seed(&app).await;

    let (status, route) = send(
        &app,
        Method::POST,
        "/api/v1/routes/",
        Some(json!({"number": "7", "type_name": "bus", "stops": [stops[0], stops[1]]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let route_id = route["id"].as_str().unwrap().to_owned();

    let (status, placed) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/routes/{route_id}/stops/{}?after={}", stops[2], stops[0]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(placed["distance"], 50);

    let (_, route_stops) = send(
        &app,
        Method::GET,
        &format!("/api/v1/routes/{route_id}/stops"),
        None,
    )
    .await;
    let order = route_stops
        .as_array()
        .unwrap()
        .iter()
        .map(|route_stop| {
            (
                route_stop["stop_id"].as_str().unwrap().to_owned(),
                route_stop["distance"].as_i64().unwrap(),
            )
        })
        .collect::<Vec<_>>();
    assert_eq!(
        order,
        vec![
            (stops[0].clone(), 0),
            (stops[2].clone(), 50),
            (stops[1].clone(), 100),
        ]
    );
}

#[tokio::test]
async fn test_place_after_stop_not_on_route() {
    let app = app();
    let stops = seed(&app).await;
    let (_, route) = send(
        &app,
        Method::POST,
        "/api/v1/routes/",
        Some(json!({"number": "7", "type_name": "bus", "stops": [stops[0]]})),
    )
    .await;
    let route_id = route["id"].as_str().unwrap().to_owned();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/v1/routes/{route_id}/stops/{}?after={}", stops[2], stops[1]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["resourceType"], "RouteStop");
}

#[tokio::test]
async fn test_append_and_filter_route_stops() {
    let app = app();
    let stops = seed(&app).await;
    let (_, route) = send(
        &app,
        Method::PUT,
        "/api/v1/routes/",
        Some(json!({"number": "9", "type_name": "bus"})),
    )
    .await;
    let route_id = route["id"].as_str().unwrap().to_owned();

    for stop_id in &stops {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/api/v1/routes/{route_id}/stops/{stop_id}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/routes/{route_id}/stops/{}", stops[0]),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, filtered) = send(
        &app,
        Method::GET,
        &format!("/api/v1/route_stops/?stop_id={}", stops[2]),
        None,
    )
    .await;
    assert_eq!(
        filtered,
        json!([{"route_id": route_id, "stop_id": stops[2], "distance": 200}])
    );
}

#[tokio::test]
async fn test_delete_unit() {
    let app = app();
    send(&app, Method::PUT, "/api/v1/types/", Some(json!({"name": "bus"}))).await;
    let (_, route) = send(
        &app,
        Method::PUT,
        "/api/v1/routes/",
        Some(json!({"number": "3", "type_name": "bus"})),
    )
    .await;
    let uri = format!("/api/v1/units/{}", route["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["resourceType"], "Unit");
}

#[tokio::test]
async fn test_node_with_stops_is_not_deleted() {
    let app = app();
    seed(&app).await;
    let (_, nodes) = send(&app, Method::GET, "/api/v1/nodes/", None).await;
    let uri = format!("/api/v1/nodes/{}", nodes[0]["id"].as_str().unwrap());

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_schema_with_example_data() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::GET,
        "/api/v1/stops/schema?exampleData=true",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_object());
}

#[tokio::test]
async fn test_unknown_path() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/v1/trains/", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Not Found");
    assert_eq!(body["requestedUri"], "/api/v1/trains/");

    let (status, _) = send(&app, Method::GET, "/elsewhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
