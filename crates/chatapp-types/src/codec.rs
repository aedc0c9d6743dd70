//! JSON encode/decode helpers for the wire records.
//!
//! Record timestamps stay free-form strings. The generic helpers at the
//! bottom encode `chrono` dates as ISO-8601 for any other payload.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::FileError;
use crate::models::{Message, Messages, User, Users};

pub fn decode_user(bytes: &[u8]) -> serde_json::Result<User> {
    serde_json::from_slice(bytes)
}

pub fn decode_users(bytes: &[u8]) -> serde_json::Result<Users> {
    serde_json::from_slice(bytes)
}

pub fn decode_message(bytes: &[u8]) -> serde_json::Result<Message> {
    serde_json::from_slice(bytes)
}

pub fn decode_messages(bytes: &[u8]) -> serde_json::Result<Messages> {
    serde_json::from_slice(bytes)
}

pub fn encode<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(value)
}

pub fn encode_pretty<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// Read a whole JSON fixture file.
///
/// A missing file is `FileError::NotFound`.
pub fn read_json_file(path: &Path) -> Result<Vec<u8>, FileError> {
    if !path.is_file() {
        return Err(FileError::NotFound);
    }
    let data = std::fs::read(path).map_err(FileError::Reading)?;
    debug!("Read {} bytes from {}", data.len(), path.display());
    Ok(data)
}

/// Overwrite an existing JSON fixture file.
pub fn write_json_file(path: &Path, data: Option<&[u8]>) -> Result<(), FileError> {
    let data = data.ok_or(FileError::EmptyData)?;
    if !path.is_file() {
        return Err(FileError::NotFound);
    }
    std::fs::write(path, data).map_err(FileError::Write)?;
    debug!("Wrote {} bytes to {}", data.len(), path.display());
    Ok(())
}

/// Decode a fixture file into any deserialisable type.
pub fn decode_file<T: DeserializeOwned>(path: &Path) -> Result<T, FileError> {
    let data = read_json_file(path)?;
    if data.is_empty() {
        return Err(FileError::EmptyData);
    }
    serde_json::from_slice(&data).map_err(|_| FileError::BadData)
}

/// Serde adapter for `DateTime<Utc>` fields encoded as ISO-8601 with
/// second precision, e.g. `#[serde(with = "chatapp_types::codec::iso8601")]`.
pub mod iso8601 {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn format(date: &DateTime<Utc>) -> String {
        date.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
    }

    pub fn serialize<S: Serializer>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(date))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }
}
