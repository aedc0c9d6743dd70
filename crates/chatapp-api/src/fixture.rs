//! Services that read and write JSON files instead of talking to a backend.
//!
//! Each service points at `<dir>/<content file>.json`. Switching
//! `is_successful` off makes every call fail with `NetworkError::Testing`
//! before the file is touched.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use chatapp_net::{NetworkError, Result};
use chatapp_types::{FileError, Message, codec};
use serde_json::Value;
use tracing::debug;

use crate::messages::{MessagesFetchService, MessagesStoreService, store_body};
use crate::users::{FriendsFetchService, UserFetchService};

pub const USERS_SAMPLE: &str = "users-sample-data";
pub const USERS_BAD_SAMPLE: &str = "users-sample-bad-data";
pub const FRIENDS_SAMPLE: &str = "friends-sample-data";
pub const FRIENDS_BAD_SAMPLE: &str = "friends-sample-bad-data";
pub const FRIENDS_EMPTY_SAMPLE: &str = "friends-sample-no-data";
pub const MESSAGES_SAMPLE: &str = "messages-sample-data";
pub const MESSAGES_BAD_SAMPLE: &str = "messages-sample-bad-data";
pub const MESSAGES_EMPTY_SAMPLE: &str = "messages-sample-no-data";
pub const MESSAGES_WRITE_SAMPLE: &str = "messages-sample-write-data";

/// One JSON file plus the success switch.
#[derive(Debug, Clone)]
pub struct FixtureFile {
    path: PathBuf,
    is_successful: bool,
}

impl FixtureFile {
    pub fn new(dir: &Path, content_file: &str) -> Self {
        Self {
            path: dir.join(format!("{content_file}.json")),
            is_successful: true,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn check(&self) -> Result<()> {
        if self.is_successful { Ok(()) } else { Err(NetworkError::Testing) }
    }

    fn read(&self) -> Result<Bytes> {
        self.check()?;
        Ok(Bytes::from(codec::read_json_file(&self.path)?))
    }

    /// Append the stored array's entries to the file's array.
    fn append(&self, stored: &Value) -> Result<Bytes> {
        self.check()?;
        let existing = codec::read_json_file(&self.path)?;
        let mut all: Vec<Value> = if existing.iter().all(u8::is_ascii_whitespace) {
            Vec::new()
        } else {
            serde_json::from_slice(&existing).map_err(|_| FileError::BadData)?
        };
        if let Value::Array(items) = stored {
            all.extend(items.iter().cloned());
        }

        let encoded = codec::encode_pretty(&all)?;
        codec::write_json_file(&self.path, Some(encoded.as_bytes()))?;
        debug!("Fixture {} now holds {} entries", self.path.display(), all.len());
        Ok(Bytes::from(codec::encode(stored)?))
    }
}

macro_rules! fixture_service {
    ($(#[$doc:meta])* $name:ident, $default:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $name {
            file: FixtureFile,
        }

        impl $name {
            pub fn new(dir: &Path) -> Self {
                Self::with_content_file(dir, $default)
            }

            pub fn with_content_file(dir: &Path, content_file: &str) -> Self {
                Self { file: FixtureFile::new(dir, content_file) }
            }

            pub fn with_success(mut self, is_successful: bool) -> Self {
                self.file.is_successful = is_successful;
                self
            }

            pub fn file(&self) -> &FixtureFile {
                &self.file
            }
        }
    };
}

fixture_service!(
    /// Users read from `users-sample-data.json` by default.
    FixtureUserService,
    USERS_SAMPLE
);
fixture_service!(FixtureFriendsService, FRIENDS_SAMPLE);
fixture_service!(FixtureMessagesFetchService, MESSAGES_SAMPLE);
fixture_service!(
    /// Stores append to `messages-sample-write-data.json` by default.
    FixtureMessagesStoreService,
    MESSAGES_WRITE_SAMPLE
);

#[async_trait]
impl UserFetchService for FixtureUserService {
    async fn fetch_data(&self) -> Result<Bytes> {
        self.file.read()
    }
}

#[async_trait]
impl FriendsFetchService for FixtureFriendsService {
    async fn fetch_data(&self) -> Result<Bytes> {
        self.file.read()
    }
}

#[async_trait]
impl MessagesFetchService for FixtureMessagesFetchService {
    async fn fetch_data(&self) -> Result<Bytes> {
        self.file.read()
    }
}

#[async_trait]
impl MessagesStoreService for FixtureMessagesStoreService {
    async fn store_data(&self, message: &Message) -> Result<Bytes> {
        self.file.append(&store_body(message))
    }
}
