//! Drives `RestPlatform` against a local axum stub of the hosted platform and
//! checks what actually goes over the wire.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use secrecy::SecretString;
use serde_json::{json, Value};
use tokio::sync::Mutex;

use salesdesk_api::config::PlatformConfig;
use salesdesk_api::filter::Filter;
use salesdesk_api::platform::{DataPlatform, NewPrincipal, PlatformError, RestPlatform, Table};

const SERVICE_KEY: &str = "stub-service-key";

#[derive(Debug, Clone)]
struct Recorded {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    apikey: Option<String>,
    authorization: Option<String>,
    prefer: Option<String>,
    body: Option<Value>,
}

type Log = Arc<Mutex<Vec<Recorded>>>;

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

async fn record(log: &Log, method: Method, path: String, query: Vec<(String, String)>, headers: &HeaderMap, body: Option<Value>) {
    log.lock().await.push(Recorded {
        method,
        path,
        query,
        apikey: header(headers, "apikey"),
        authorization: header(headers, "authorization"),
        prefer: header(headers, "prefer"),
        body,
    });
}

async fn table_get(
    State(log): State<Log>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Json<Value> {
    record(&log, Method::GET, format!("/rest/v1/{}", table), query, &headers, None).await;
    Json(json!([{ "id": 1, "user_id": "u-1", "customer": "Acme" }]))
}

async fn table_post(
    State(log): State<Log>,
    Path(table): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&log, Method::POST, format!("/rest/v1/{}", table), vec![], &headers, Some(body.clone())).await;
    if body["email"] == "dup@example.com" {
        return (
            StatusCode::CONFLICT,
            Json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint \"users_email_key\""
            })),
        );
    }
    let mut row = body;
    row["id"] = json!(42);
    (StatusCode::CREATED, Json(json!([row])))
}

async fn table_patch(
    State(log): State<Log>,
    Path(table): Path<String>,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Json<Value> {
    record(&log, Method::PATCH, format!("/rest/v1/{}", table), query, &headers, Some(body)).await;
    Json(json!([]))
}

async fn create_user(State(log): State<Log>, headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    record(&log, Method::POST, "/auth/v1/admin/users".into(), vec![], &headers, Some(body.clone())).await;
    Json(json!({ "id": "p-123", "email": body["email"], "aud": "authenticated" }))
}

async fn delete_user(State(log): State<Log>, Path(id): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    record(&log, Method::DELETE, format!("/auth/v1/admin/users/{}", id), vec![], &headers, None).await;
    if id == "missing" {
        return (StatusCode::NOT_FOUND, Json(json!({ "code": 404, "msg": "User not found" })));
    }
    (StatusCode::OK, Json(json!({})))
}

async fn spawn_stub() -> (RestPlatform, Log) {
    let log: Log = Arc::default();
    let router = Router::new()
        .route("/rest/v1/", get(|| async { Json(json!({ "swagger": "2.0" })) }))
        .route("/rest/v1/:table", get(table_get).post(table_post).patch(table_patch))
        .route("/auth/v1/admin/users", post(create_user))
        .route("/auth/v1/admin/users/:id", delete(delete_user))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    let platform = RestPlatform::new(&PlatformConfig {
        url: format!("http://{}/", addr),
        service_role_key: SecretString::from(SERVICE_KEY.to_string()),
        timeout_secs: 5,
    })
    .unwrap();
    (platform, log)
}

fn assert_service_credentials(recorded: &Recorded) {
    assert_eq!(recorded.apikey.as_deref(), Some(SERVICE_KEY));
    assert_eq!(
        recorded.authorization.as_deref(),
        Some(format!("Bearer {}", SERVICE_KEY).as_str())
    );
}

#[tokio::test]
async fn select_sends_equality_filters() {
    let (platform, log) = spawn_stub().await;

    let filter = Filter::new().eq("user_id", "u-1").unwrap().limit(1).unwrap();
    let rows = platform.select(Table::Visits, &filter).await.unwrap();
    assert_eq!(rows[0]["customer"], "Acme");

    let log = log.lock().await;
    let request = &log[0];
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.path, "/rest/v1/visits");
    assert_service_credentials(request);
    assert!(request.query.contains(&("select".into(), "*".into())));
    assert!(request.query.contains(&("user_id".into(), "eq.u-1".into())));
    assert!(request.query.contains(&("limit".into(), "1".into())));
}

#[tokio::test]
async fn email_filters_survive_url_encoding() {
    let (platform, log) = spawn_stub().await;

    let filter = Filter::new().eq("email", "a+b@example.com").unwrap();
    platform.select(Table::Users, &filter).await.unwrap();

    let log = log.lock().await;
    assert!(log[0].query.contains(&("email".into(), "eq.a+b@example.com".into())));
}

#[tokio::test]
async fn writes_ask_for_the_representation() {
    let (platform, log) = spawn_stub().await;

    let inserted = platform
        .insert(Table::Opportunities, json!({ "user_id": "u-1", "stage": 1 }))
        .await
        .unwrap();
    assert_eq!(inserted[0]["id"], 42);

    let filter = Filter::new().eq("id", 42).unwrap().eq("user_id", "u-1").unwrap();
    let updated = platform
        .update(Table::Opportunities, &filter, json!({ "stage": 2 }))
        .await
        .unwrap();
    assert!(updated.is_empty());

    let log = log.lock().await;
    for request in log.iter() {
        assert_service_credentials(request);
        assert_eq!(request.prefer.as_deref(), Some("return=representation"));
        assert_eq!(request.path, "/rest/v1/opportunities");
    }
    assert_eq!(log[1].method, Method::PATCH);
    assert!(log[1].query.contains(&("id".into(), "eq.42".into())));
    assert!(log[1].query.contains(&("user_id".into(), "eq.u-1".into())));
    assert_eq!(log[1].body, Some(json!({ "stage": 2 })));
}

#[tokio::test]
async fn remote_errors_carry_status_and_message() {
    let (platform, _) = spawn_stub().await;

    let err = platform
        .insert(Table::Users, json!({ "email": "dup@example.com" }))
        .await
        .unwrap_err();

    match err {
        PlatformError::Api { status, message } => {
            assert_eq!(status, 409);
            assert!(message.starts_with("duplicate key value"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn principal_lifecycle_uses_admin_api() {
    let (platform, log) = spawn_stub().await;

    let principal = platform
        .create_principal(&NewPrincipal {
            email: "new@example.com".into(),
            password: "initial-pass".into(),
            email_confirm: true,
            user_metadata: json!({ "name": "New Rep", "role": "sales" }),
        })
        .await
        .unwrap();
    assert_eq!(principal.id, "p-123");

    platform.delete_principal(&principal.id).await.unwrap();

    let err = platform.delete_principal("missing").await.unwrap_err();
    assert!(matches!(err, PlatformError::Api { status: 404, ref message } if message == "User not found"));

    let log = log.lock().await;
    assert_eq!(log[0].path, "/auth/v1/admin/users");
    assert_service_credentials(&log[0]);
    let body = log[0].body.clone().unwrap();
    assert_eq!(body["email_confirm"], true);
    assert_eq!(body["user_metadata"]["role"], "sales");
    assert_eq!(log[1].method, Method::DELETE);
    assert_eq!(log[1].path, "/auth/v1/admin/users/p-123");
}

#[tokio::test]
async fn health_check_hits_rest_root() {
    let (platform, _) = spawn_stub().await;
    platform.health_check().await.unwrap();
}

#[tokio::test]
async fn unreachable_platform_is_a_transport_error() {
    let port = portpicker::pick_unused_port().unwrap();
    let platform = RestPlatform::new(&PlatformConfig {
        url: format!("http://127.0.0.1:{}", port),
        service_role_key: SecretString::from(SERVICE_KEY.to_string()),
        timeout_secs: 2,
    })
    .unwrap();

    let err = platform.health_check().await.unwrap_err();
    assert!(matches!(err, PlatformError::Http(_)));
}
