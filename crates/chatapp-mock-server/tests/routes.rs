use axum::body::Body;
use axum::http::{self, Request, StatusCode};
use chatapp_mock_server::{MockData, app, app_with};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn users_lists_seeded_accounts() {
    let resp = app().oneshot(get("/users")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let users = body_json(resp).await;
    let names: Vec<&str> = users
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["username"].as_str())
        .collect();
    assert!(names.contains(&"Ajs"));
    assert!(names.contains(&"A_JS_H"));
}

#[tokio::test]
async fn posted_messages_are_echoed_and_listed() {
    let data = MockData::default().shared();
    let posted = json!([{
        "id": "1", "fromUser": "Ajs", "toUser": "A_JS_H",
        "message": "hello", "createdAt": "2024-10-09 04:16:53.338"
    }]);

    let resp = app_with(data.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(posted.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await, posted);

    let listed = body_json(app_with(data).oneshot(get("/messages")).await.unwrap()).await;
    assert_eq!(listed, posted);
}

#[tokio::test]
async fn posting_a_bare_object_is_rejected() {
    let resp = app()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/messages")
                .header(http::header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"id":"1"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn dns_query_answers_known_names() {
    let resp = app().oneshot(get("/dns-query?name=chat.test&type=A")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[http::header::CONTENT_TYPE], "application/dns-json");

    let answer = body_json(resp).await;
    assert_eq!(answer["Status"], 0);
    assert_eq!(answer["Answer"][0]["data"], "127.0.0.1");
    assert_eq!(answer["Answer"][0]["TTL"], 60);
}

#[tokio::test]
async fn dns_query_unknown_name_has_no_answer() {
    let answer = body_json(app().oneshot(get("/dns-query?name=nowhere.test&type=A")).await.unwrap()).await;
    assert_eq!(answer["Status"], 3);
    assert!(answer.get("Answer").is_none());
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let resp = app().oneshot(get("/friends")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
