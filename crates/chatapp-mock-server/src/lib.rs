//! In-memory chat backend for local development and tests.
//!
//! Serves the users and messages collections as plain JSON arrays and a
//! tiny `application/dns-json` resolver so DoH paths can be exercised
//! without leaving the machine.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::RwLock;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

const SEED_USERS: &str = include_str!("../../../fixtures/users-sample-data.json");
const SEED_MESSAGES: &str = include_str!("../../../fixtures/messages-sample-data.json");

/// Collections are kept as raw JSON so whatever is posted comes back
/// unchanged, and malformed records can be seeded on purpose.
#[derive(Debug, Clone, Default)]
pub struct MockData {
    pub users: Vec<Value>,
    pub messages: Vec<Value>,
    /// Host name to IPv4 literal, answered on `/dns-query`.
    pub dns: HashMap<String, String>,
}

pub type SharedData = Arc<RwLock<MockData>>;

impl MockData {
    /// Bundled sample users and messages, `chat.test` resolving to loopback.
    pub fn seeded() -> Self {
        Self {
            users: serde_json::from_str(SEED_USERS).unwrap_or_default(),
            messages: serde_json::from_str(SEED_MESSAGES).unwrap_or_default(),
            dns: HashMap::new(),
        }
        .with_dns("chat.test", "127.0.0.1")
    }

    /// Load `users-sample-data.json` and `messages-sample-data.json` from `dir`.
    pub fn from_dir(dir: &Path) -> anyhow::Result<Self> {
        let users = std::fs::read(dir.join("users-sample-data.json"))?;
        let messages = std::fs::read(dir.join("messages-sample-data.json"))?;
        Ok(Self {
            users: serde_json::from_slice(&users)?,
            messages: serde_json::from_slice(&messages)?,
            dns: HashMap::new(),
        }
        .with_dns("chat.test", "127.0.0.1"))
    }

    pub fn with_users(mut self, users: Vec<Value>) -> Self {
        self.users = users;
        self
    }

    pub fn with_messages(mut self, messages: Vec<Value>) -> Self {
        self.messages = messages;
        self
    }

    pub fn with_dns(mut self, name: &str, address: &str) -> Self {
        self.dns.insert(name.to_string(), address.to_string());
        self
    }

    pub fn shared(self) -> SharedData {
        Arc::new(RwLock::new(self))
    }
}

pub fn app() -> Router {
    app_with(MockData::seeded().shared())
}

pub fn app_with(data: SharedData) -> Router {
    Router::new()
        .route("/users", get(list_users))
        .route("/messages", get(list_messages).post(store_messages))
        .route("/dns-query", get(dns_query))
        .layer(TraceLayer::new_for_http())
        .with_state(data)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    serve(listener, MockData::seeded().shared()).await
}

pub async fn serve(listener: TcpListener, data: SharedData) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!("Mock chat backend listening on {}", addr);
    }
    axum::serve(listener, app_with(data)).await
}

async fn list_users(State(data): State<SharedData>) -> Json<Vec<Value>> {
    Json(data.read().await.users.clone())
}

async fn list_messages(State(data): State<SharedData>) -> Json<Vec<Value>> {
    Json(data.read().await.messages.clone())
}

/// Appends the posted array and echoes it back.
async fn store_messages(
    State(data): State<SharedData>,
    Json(posted): Json<Vec<Value>>,
) -> (StatusCode, Json<Vec<Value>>) {
    debug!("Storing {} message(s)", posted.len());
    data.write().await.messages.extend(posted.iter().cloned());
    (StatusCode::CREATED, Json(posted))
}

#[derive(Debug, Deserialize)]
pub struct DnsQuery {
    pub name: String,
    #[serde(rename = "type", default)]
    pub record_type: Option<String>,
}

async fn dns_query(State(data): State<SharedData>, Query(query): Query<DnsQuery>) -> impl IntoResponse {
    let data = data.read().await;
    let question = json!([{ "name": format!("{}.", query.name), "type": 1 }]);

    let body = match data.dns.get(query.name.trim_end_matches('.')) {
        Some(address) => json!({
            "Status": 0, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
            "Question": question,
            "Answer": [{ "name": format!("{}.", query.name), "type": 1, "TTL": 60, "data": address }],
        }),
        None => json!({
            "Status": 3, "TC": false, "RD": true, "RA": true, "AD": false, "CD": false,
            "Question": question,
            "Comment": format!("NXDOMAIN for {} ({})", query.name, query.record_type.as_deref().unwrap_or("A")),
        }),
    };

    ([(header::CONTENT_TYPE, "application/dns-json")], body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_data_comes_from_bundled_fixtures() {
        let data = MockData::seeded();
        assert!(data.users.iter().any(|u| u["username"] == "Ajs"));
        assert!(!data.messages.is_empty());
        assert_eq!(data.dns.get("chat.test").map(String::as_str), Some("127.0.0.1"));
    }

    #[test]
    fn builders_replace_collections() {
        let data = MockData::default()
            .with_users(vec![json!({"username": "x"})])
            .with_messages(Vec::new());
        assert_eq!(data.users.len(), 1);
        assert!(data.messages.is_empty());
        assert!(data.dns.is_empty());
    }

    #[test]
    fn dns_query_type_is_optional() {
        let query: DnsQuery = serde_json::from_str(r#"{"name":"chat.test"}"#).unwrap();
        assert_eq!(query.name, "chat.test");
        assert!(query.record_type.is_none());
    }
}
