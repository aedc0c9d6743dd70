use async_trait::async_trait;
use bytes::Bytes;
use chatapp_net::{CachePolicy, NetworkError, RequestExecutor, Result};
use chatapp_types::{Message, Messages, codec};
use serde_json::Value;
use tracing::debug;

use crate::endpoints::{self, FETCH_MESSAGE, STORE_MESSAGE};

#[async_trait]
pub trait MessagesFetchService: Send + Sync {
    async fn fetch_data(&self) -> Result<Bytes>;

    /// Messages exchanged between `username` and `from_user`, either
    /// direction, in the order the backend lists them.
    async fn fetch_messages(&self, username: &str, from_user: &str) -> Result<Messages> {
        let data = self.fetch_data().await?;
        conversation(&data, username, from_user)
    }
}

#[async_trait]
pub trait MessagesStoreService: Send + Sync {
    /// Send `message` and return whatever the backend answered with.
    async fn store_data(&self, message: &Message) -> Result<Bytes>;

    /// `true` once the backend accepted the message. The echoed body is
    /// not inspected.
    async fn store_message(&self, username: &str, message: &Message) -> Result<bool> {
        debug!("{} storing message {}", username, message.id);
        self.store_data(message).await?;
        Ok(true)
    }
}

pub fn conversation(data: &[u8], username: &str, from_user: &str) -> Result<Messages> {
    if data.is_empty() {
        return Err(NetworkError::EmptyResponse);
    }
    let mut messages = codec::decode_messages(data)?;
    messages.retain(|m| m.is_between(username, from_user));
    Ok(messages)
}

/// Wire shape of a store: a JSON array holding the one message object.
pub fn store_body(message: &Message) -> Value {
    Value::Array(vec![Value::Object(message.to_map())])
}

/// Fetches and stores against the same messages collection.
#[derive(Clone)]
pub struct HttpMessagesService {
    executor: RequestExecutor,
    cache_policy: Option<CachePolicy>,
}

impl HttpMessagesService {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor, cache_policy: None }
    }

    /// Applies to fetches only.
    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }
}

#[async_trait]
impl MessagesFetchService for HttpMessagesService {
    async fn fetch_data(&self) -> Result<Bytes> {
        let request = endpoints::get(&self.executor, FETCH_MESSAGE, self.cache_policy);
        Ok(self.executor.execute(request).await?.body)
    }
}

#[async_trait]
impl MessagesStoreService for HttpMessagesService {
    async fn store_data(&self, message: &Message) -> Result<Bytes> {
        let request = endpoints::post(&self.executor, STORE_MESSAGE, store_body(message));
        Ok(self.executor.execute(request).await?.body)
    }
}
