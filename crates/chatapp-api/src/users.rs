use async_trait::async_trait;
use bytes::Bytes;
use chatapp_net::{CachePolicy, NetworkError, RequestExecutor, Result};
use chatapp_types::{User, Users, codec};
use tracing::debug;

use crate::endpoints::{self, FETCH_USER};

/// Looks up a single account by its login credentials.
#[async_trait]
pub trait UserFetchService: Send + Sync {
    /// Raw users collection as served.
    async fn fetch_data(&self) -> Result<Bytes>;

    /// First user whose username and password both match.
    ///
    /// `DataNotFound` when the list decodes but holds no match,
    /// `EmptyResponse` for an empty body, `Parsing` for malformed JSON.
    async fn fetch_user(&self, username: &str, password: &str) -> Result<User> {
        let data = self.fetch_data().await?;
        find_user(&data, username, password)
    }
}

/// Lists every account except the caller's.
#[async_trait]
pub trait FriendsFetchService: Send + Sync {
    async fn fetch_data(&self) -> Result<Bytes>;

    /// Users list with at most one entry removed: the first matching the
    /// caller's credentials. An empty list is a success.
    async fn fetch_friends(&self, username: &str, password: &str) -> Result<Users> {
        let data = self.fetch_data().await?;
        friends_of(&data, username, password)
    }
}

fn decode_users(data: &[u8]) -> Result<Users> {
    if data.is_empty() {
        return Err(NetworkError::EmptyResponse);
    }
    Ok(codec::decode_users(data)?)
}

pub fn find_user(data: &[u8], username: &str, password: &str) -> Result<User> {
    decode_users(data)?
        .into_iter()
        .find(|u| u.matches_credentials(username, password))
        .ok_or(NetworkError::DataNotFound)
}

pub fn friends_of(data: &[u8], username: &str, password: &str) -> Result<Users> {
    let mut users = decode_users(data)?;
    if let Some(index) = users.iter().position(|u| u.matches_credentials(username, password)) {
        users.remove(index);
    }
    Ok(users)
}

#[derive(Clone)]
pub struct HttpUserService {
    executor: RequestExecutor,
    cache_policy: Option<CachePolicy>,
}

impl HttpUserService {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor, cache_policy: None }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }
}

#[async_trait]
impl UserFetchService for HttpUserService {
    async fn fetch_data(&self) -> Result<Bytes> {
        let request = endpoints::get(&self.executor, FETCH_USER, self.cache_policy);
        let response = self.executor.execute(request).await?;
        debug!("Fetched users ({} bytes)", response.body.len());
        Ok(response.body)
    }
}

#[derive(Clone)]
pub struct HttpFriendsService {
    executor: RequestExecutor,
    cache_policy: Option<CachePolicy>,
}

impl HttpFriendsService {
    pub fn new(executor: RequestExecutor) -> Self {
        Self { executor, cache_policy: None }
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }
}

#[async_trait]
impl FriendsFetchService for HttpFriendsService {
    async fn fetch_data(&self) -> Result<Bytes> {
        let request = endpoints::get(&self.executor, FETCH_USER, self.cache_policy);
        Ok(self.executor.execute(request).await?.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS: &[u8] = br#"[
        {"id":"1","username":"Ajs","password":"S@thish25","name":"A","avatar":"","uuid":"5f0c8a52-4bb4-4f43-9f6d-0f0a4d3c1a01","createdAt":"x"},
        {"id":"2","username":"Ajs","password":"S@thish25","name":"B","avatar":"","uuid":"a7e3b1d4-2c6e-4b8a-9e21-6d5f0c3b2a02","createdAt":"y"},
        {"id":"3","username":"A_JS_H","password":"pw","name":"C","avatar":"","uuid":"c2d9f6a1-8b3e-4f7c-a1d2-3e4f5a6b7c03","createdAt":"z"}
    ]"#;

    #[test]
    fn first_match_wins() {
        let user = find_user(USERS, "Ajs", "S@thish25").unwrap();
        assert_eq!(user.id, "1");
    }

    #[test]
    fn wrong_password_is_not_found() {
        assert!(find_user(USERS, "Ajs", "S@thish").unwrap_err().is_not_found());
    }

    #[test]
    fn friends_drop_only_one_duplicate() {
        let friends = friends_of(USERS, "Ajs", "S@thish25").unwrap();
        let ids: Vec<&str> = friends.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3"]);
    }

    #[test]
    fn unknown_caller_keeps_everyone() {
        assert_eq!(friends_of(USERS, "ghost", "pw").unwrap().len(), 3);
    }

    #[test]
    fn empty_body_and_garbage_are_distinct() {
        assert!(matches!(find_user(b"", "a", "b"), Err(NetworkError::EmptyResponse)));
        assert!(find_user(b"{not json", "a", "b").unwrap_err().is_parsing());
        assert!(friends_of(b"[{\"id\":1}]", "a", "b").unwrap_err().is_parsing());
    }
}
