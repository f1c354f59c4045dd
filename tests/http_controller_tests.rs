mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::test_app;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use tradecompanion::routes;

async fn response_json(res: axum::response::Response) -> Value {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn response_body_string(res: axum::response::Response) -> String {
    let bytes = res.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8_lossy(&bytes).to_string()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_endpoints() {
    let app = routes::app(test_app().state);

    let res = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(response_body_string(res).await, "ok");

    let res = app.oneshot(get("/health/db")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let app = routes::app(test_app().state);

    let res = app.oneshot(get("/nope")).await.unwrap();

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(response_json(res).await["success"], false);
}

#[tokio::test]
async fn quote_lookup_and_upstream_failure() {
    let t = test_app();
    t.quotes.set("AAPL", 190.0);
    t.quotes.fail("DOWN");
    let app = routes::app(t.state);

    let res = app.clone().oneshot(get("/quote/aapl")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = response_json(res).await;
    assert_eq!(body["symbol"], "AAPL");
    assert_eq!(body["price"], 190.0);

    let res = app.oneshot(get("/quote/DOWN")).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(response_json(res).await["success"], false);
}

#[tokio::test]
async fn create_list_and_delete_alert() {
    let app = routes::app(test_app().state);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/42/alerts",
            json!({ "symbol": "aapl", "condition": "above", "threshold": 150 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let body = response_json(res).await;
    assert_eq!(body["success"], true);
    let id = body["alert_id"].as_i64().unwrap();

    let res = app.clone().oneshot(get("/users/42/alerts")).await.unwrap();
    let body = response_json(res).await;
    let alerts = body["alerts"].as_array().unwrap();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0]["symbol"], "AAPL");
    assert_eq!(alerts[0]["condition"], "above");

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/42/alerts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/42/alerts/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        response_json(res).await,
        json!({ "success": false, "error": format!("alert {id} not found") })
    );
}

#[tokio::test]
async fn create_alert_validation_errors_are_400() {
    let app = routes::app(test_app().state);

    for body in [
        json!({ "symbol": "AAPL", "condition": "above", "threshold": "abc" }),
        json!({ "symbol": "AAPL", "condition": "sideways", "threshold": 10 }),
        json!({ "symbol": "AAPL", "condition": "above", "threshold": -1 }),
        json!({ "symbol": "AAPL", "condition": "above" }),
    ] {
        let res = app
            .clone()
            .oneshot(json_request("POST", "/users/42/alerts", body.clone()))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response_json(res).await["success"], false);
    }
}

#[tokio::test]
async fn threshold_may_be_a_string() {
    let app = routes::app(test_app().state);

    let res = app
        .oneshot(json_request(
            "POST",
            "/users/42/alerts",
            json!({ "symbol": "MSFT", "condition": "<", "threshold": "$300.5" }),
        ))
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(response_json(res).await["alert"]["threshold"], 300.5);
}

#[tokio::test]
async fn trades_and_positions() {
    let t = test_app();
    t.quotes.set("AAPL", 110.0);
    let app = routes::app(t.state);

    let res = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/users/7/trades",
            json!({ "action": "buy", "symbol": "AAPL", "quantity": 10, "price": 100 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let trade_id = response_json(res).await["trade_id"].as_i64().unwrap();

    let res = app.clone().oneshot(get("/users/7/trades")).await.unwrap();
    assert_eq!(response_json(res).await["trades"].as_array().unwrap().len(), 1);

    let res = app.clone().oneshot(get("/users/7/positions")).await.unwrap();
    let body = response_json(res).await;
    assert_eq!(body["positions"][0]["symbol"], "AAPL");
    assert_eq!(body["positions"][0]["pnl"], 100.0);

    let res = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/users/7/trades/{trade_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = app
        .oneshot(json_request(
            "POST",
            "/users/7/trades",
            json!({ "action": "short", "symbol": "AAPL", "quantity": 1, "price": 1 }),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        response_json(res).await["error"],
        "action must be 'buy' or 'sell'"
    );
}

#[tokio::test]
async fn malformed_json_body_is_json_400() {
    let app = routes::app(test_app().state);

    let req = Request::builder()
        .method("POST")
        .uri("/users/1/alerts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"symbol": "AAPL", "condition": "#))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = response_json(res).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("JSON"));
}

#[tokio::test]
async fn missing_content_type_is_json_400() {
    let app = routes::app(test_app().state);

    let req = Request::builder()
        .method("POST")
        .uri("/users/1/trades")
        .body(Body::from(
            json!({ "action": "buy", "symbol": "AAPL", "quantity": 1, "price": 1 }).to_string(),
        ))
        .unwrap();
    let res = app.oneshot(req).await.unwrap();

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response_json(res).await["success"], false);
}

#[tokio::test]
async fn non_numeric_ids_are_json_400() {
    let app = routes::app(test_app().state);

    for (method, uri) in [
        ("DELETE", "/users/1/alerts/abc"),
        ("DELETE", "/users/1/trades/abc"),
        ("GET", "/users/someone/alerts"),
        ("GET", "/users/someone/positions"),
    ] {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let res = app.clone().oneshot(req).await.unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
        assert_eq!(response_json(res).await["success"], false, "{method} {uri}");
    }
}

#[tokio::test]
async fn events_stream_carries_fired_alerts() {
    let t = test_app();
    let app = routes::app(t.state.clone());

    let res = app.oneshot(get("/events")).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/event-stream"));

    let user = t.state.users.get_or_create(42).await.unwrap();
    t.state.alerts.add_alert(user.id, "AAPL", "above", 150.0).await.unwrap();
    t.quotes.set("AAPL", 155.0);
    assert_eq!(t.state.alerts.check_alerts().await.fired.len(), 1);

    let mut body = res.into_body();
    let mut received = String::new();
    while !received.contains("\n\n") {
        let frame = tokio::time::timeout(std::time::Duration::from_secs(2), body.frame())
            .await
            .expect("no event within 2s")
            .expect("stream ended")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            received.push_str(&String::from_utf8_lossy(&data));
        }
    }

    assert!(received.contains("event: alertTriggered"), "{received}");
    assert!(received.contains(r#""symbol":"AAPL""#), "{received}");
    assert!(received.contains(r#""price":155.0"#), "{received}");
}
