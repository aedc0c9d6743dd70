//! Plain-data description of an outgoing API call.
//!
//! `ApiRequest` carries everything the executor needs: where to go, what
//! to send, and how long to wait. Nothing here touches the network.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

use crate::cache::CachePolicy;

pub const CACHE_CONTROL: &str = "Cache-Control";
pub const CONTENT_TYPE: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const MULTIPART_FIELD: &str = "imageFile";
pub const MULTIPART_FILE_NAME: &str = "imageFile.png";
pub const MULTIPART_CONTENT_TYPE: &str = "image/png";

pub type Headers = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    /// Serialised to JSON bytes when sent.
    Json(Value),
    /// Wrapped in a single-part `multipart/form-data` envelope.
    Multipart { file_name: String, data: Vec<u8> },
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub host: String,
    pub path: String,
    pub query: String,
    pub headers: Headers,
    pub body: RequestBody,
    pub cache_policy: Option<CachePolicy>,
    pub timeout: Duration,
}

/// Headers every API call carries.
pub fn default_headers() -> Headers {
    let mut headers = Headers::new();
    headers.insert(CACHE_CONTROL.into(), "no-cache".into());
    headers.insert(CONTENT_TYPE.into(), JSON_CONTENT_TYPE.into());
    headers
}

/// Overlay `update` onto `base`; keys present in both take the update's value.
pub fn merge_headers(base: &Headers, update: Option<&Headers>) -> Headers {
    let mut merged = base.clone();
    if let Some(update) = update {
        merged.extend(update.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
    merged
}

impl ApiRequest {
    fn new(method: HttpMethod, host: &str, path: &str, body: RequestBody) -> Self {
        Self {
            method,
            host: host.to_string(),
            path: path.to_string(),
            query: String::new(),
            headers: Headers::new(),
            body,
            cache_policy: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn get(host: &str, path: &str) -> Self {
        Self::new(HttpMethod::Get, host, path, RequestBody::Empty)
    }

    pub fn post_json(host: &str, path: &str, body: Value) -> Self {
        Self::new(HttpMethod::Post, host, path, RequestBody::Json(body))
    }

    pub fn multipart(host: &str, path: &str, file_name: Option<&str>, data: Vec<u8>) -> Self {
        let file_name = file_name.unwrap_or(MULTIPART_FILE_NAME).to_string();
        Self::new(HttpMethod::Post, host, path, RequestBody::Multipart { file_name, data })
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = merge_headers(&self.headers, Some(&headers));
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.cache_policy = Some(policy);
        self
    }

    /// A zero timeout leaves the client defaults in place.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `host + path` with spaces stripped, then `?query` when present.
    ///
    /// The result is not validated here; the executor reports strings that
    /// do not parse.
    pub fn url(&self) -> String {
        let mut url: String = format!("{}{}", self.host, self.path)
            .chars()
            .filter(|c| *c != ' ')
            .collect();
        if !self.query.is_empty() {
            url.push('?');
            url.push_str(&self.query);
        }
        url
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn asks_for_no_cache(&self) -> bool {
        self.header(CACHE_CONTROL)
            .is_some_and(|v| v.to_ascii_lowercase().contains("no-cache"))
    }

    /// Final headers and body bytes as they go on the wire.
    pub fn encode_body(&self) -> serde_json::Result<(Headers, Option<Vec<u8>>)> {
        match &self.body {
            RequestBody::Empty => Ok((self.headers.clone(), None)),
            RequestBody::Json(value) => {
                let mut headers = self.headers.clone();
                if self.header(CONTENT_TYPE).is_none() {
                    headers.insert(CONTENT_TYPE.into(), JSON_CONTENT_TYPE.into());
                }
                Ok((headers, Some(serde_json::to_vec(value)?)))
            }
            RequestBody::Multipart { file_name, data } => {
                let boundary = Uuid::new_v4().to_string();
                let mut headers: Headers = self
                    .headers
                    .iter()
                    .filter(|(k, _)| !k.eq_ignore_ascii_case(CONTENT_TYPE))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                headers.insert(
                    CONTENT_TYPE.into(),
                    format!("multipart/form-data; boundary={boundary}"),
                );
                Ok((headers, Some(multipart_envelope(&boundary, file_name, data))))
            }
        }
    }
}

/// Single file part, framed the way the upload endpoint expects.
pub fn multipart_envelope(boundary: &str, file_name: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);
    body.extend_from_slice(format!("\r\n--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{MULTIPART_FIELD}\"; filename=\"{file_name}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {MULTIPART_CONTENT_TYPE}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Host - {}", self.method.as_str(), self.host)?;
        if !self.path.is_empty() {
            write!(f, " Path - {}", self.path)?;
        }
        if !self.query.is_empty() {
            write!(f, " Query - {}", self.query)?;
        }
        if !self.headers.is_empty() {
            write!(f, " Header - {:?}", self.headers)?;
        }
        if let RequestBody::Json(value) = &self.body {
            write!(f, " Body - {value}")?;
        }
        Ok(())
    }
}
