use std::error::Error as StdError;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use url::Url;

use crate::cache::{CachePolicy, CachedResponse, UrlCache};
use crate::config::{ClientConfig, ResolutionMode};
use crate::doh::{DohClient, DohResolver};
use crate::error::{NetworkError, Result};
use crate::main_queue::MainQueue;
use crate::request::{ApiRequest, Headers, HttpMethod};

/// Added on top of a request's own timeout to bound the whole exchange.
///
/// The request's `timeout` itself bounds each wait for data: the response
/// head, then the body. `ClientConfig::timeout` only limits connecting.
pub const TIMEOUT_GRACE: Duration = Duration::from_secs(2);

const HOST: &str = "Host";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    pub status: u16,
    pub url: String,
    pub headers: Headers,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub body: Bytes,
    pub meta: ResponseMeta,
}

impl HttpResponse {
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Sends `ApiRequest`s.
///
/// Owns the HTTP client, the URL cache, and (unless resolution is `System`)
/// a DoH client. Clones share all three.
#[derive(Clone)]
pub struct RequestExecutor {
    inner: Arc<ExecutorInner>,
}

struct ExecutorInner {
    http: reqwest::Client,
    doh: Option<DohClient>,
    cache: Arc<UrlCache>,
    config: ClientConfig,
}

impl RequestExecutor {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let cache = Arc::new(UrlCache::new(config.cache.clone()));
        let doh = match config.resolution {
            ResolutionMode::System => None,
            ResolutionMode::DohNative | ResolutionMode::DohRewrite => Some(DohClient::public()?),
        };
        Self::with_parts(config, cache, doh)
    }

    /// Build around a caller-supplied cache and DoH client.
    pub fn with_parts(config: ClientConfig, cache: Arc<UrlCache>, doh: Option<DohClient>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        let timeout = config.timeout();
        if !timeout.is_zero() {
            builder = builder.connect_timeout(timeout);
        }

        if config.resolution == ResolutionMode::DohNative {
            if let Some(doh) = &doh {
                builder = builder.dns_resolver(Arc::new(DohResolver::new(doh.clone())));
            }
        }

        let http = builder.build()?;
        debug!("Request executor ready ({:?} resolution)", config.resolution);

        Ok(Self {
            inner: Arc::new(ExecutorInner { http, doh, cache, config }),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    pub fn cache(&self) -> &Arc<UrlCache> {
        &self.inner.cache
    }

    /// Run the request on the runtime and wait for it.
    pub async fn execute(&self, request: ApiRequest) -> Result<HttpResponse> {
        let this = self.clone();
        tokio::spawn(async move { this.perform(request).await })
            .await
            .map_err(|e| NetworkError::Task(e.to_string()))?
    }

    /// Run the request on the runtime; `completion` is delivered through
    /// `queue`, never on the task that did the work.
    pub fn execute_with_completion<F>(&self, request: ApiRequest, queue: &MainQueue, completion: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<HttpResponse>) + Send + 'static,
    {
        let this = self.clone();
        let queue = queue.clone();
        tokio::spawn(async move {
            let result = this.perform(request).await;
            queue.dispatch(move || completion(result));
        })
    }

    async fn perform(&self, request: ApiRequest) -> Result<HttpResponse> {
        let url_string = request.url();
        let url = Url::parse(&url_string).map_err(|_| NetworkError::InvalidUrl(url_string.clone()))?;
        debug!("{}", request);

        let policy = match request.method {
            HttpMethod::Get => request.cache_policy,
            HttpMethod::Post => None,
        };

        if let Some(policy) = policy {
            if let Some(hit) = self.lookup_cache(&request, policy, &url_string)? {
                return Ok(hit);
            }
        }

        let response = self.send(&request, url).await?;

        if policy.is_some() {
            self.inner.cache.put(&url_string, CachedResponse {
                status: response.meta.status,
                body: response.body.clone(),
            });
        }
        Ok(response)
    }

    fn lookup_cache(&self, request: &ApiRequest, policy: CachePolicy, url: &str) -> Result<Option<HttpResponse>> {
        let hit = match policy {
            CachePolicy::ReloadIgnoringCache => None,
            CachePolicy::UseProtocol if request.asks_for_no_cache() => None,
            CachePolicy::UseProtocol | CachePolicy::ReturnCacheElseLoad => self.inner.cache.get(url),
            CachePolicy::ReturnCacheDontLoad => {
                Some(self.inner.cache.get(url).ok_or_else(|| NetworkError::CacheMiss(url.to_string()))?)
            }
        };

        Ok(hit.map(|cached| HttpResponse {
            body: cached.body,
            meta: ResponseMeta {
                status: cached.status,
                url: url.to_string(),
                headers: Headers::new(),
            },
        }))
    }

    async fn send(&self, request: &ApiRequest, mut url: Url) -> Result<HttpResponse> {
        let (mut headers, body) = request.encode_body()?;

        if self.inner.config.resolution == ResolutionMode::DohRewrite {
            if let Some(doh) = &self.inner.doh {
                let rewritten = doh.rewrite(&url, self.inner.config.doh_host_header).await?;
                headers.retain(|k, _| !k.eq_ignore_ascii_case(HOST));
                headers.insert(HOST.into(), rewritten.host_header);
                url = rewritten.url;
            }
        }

        let method = match request.method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
        };

        let mut builder = self.inner.http.request(method, url);
        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder.body(body);
        }
        if !request.timeout.is_zero() {
            builder = builder.timeout(request.timeout + TIMEOUT_GRACE);
        }

        let response = within(request.timeout, builder.send()).await?.map_err(transport_error)?;
        let status = response.status();
        let final_url = response.url().to_string();
        let response_headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();

        if !status.is_success() {
            warn!("{} {} answered {}", request.method.as_str(), final_url, status);
            return Err(NetworkError::InvalidResponse { status: status.as_u16() });
        }

        let body = within(request.timeout, response.bytes()).await??;
        debug!("{} {} -> {} ({} bytes)", request.method.as_str(), final_url, status, body.len());

        Ok(HttpResponse {
            body,
            meta: ResponseMeta {
                status: status.as_u16(),
                url: final_url,
                headers: response_headers,
            },
        })
    }
}

async fn within<F: Future>(limit: Duration, fut: F) -> Result<F::Output> {
    if limit.is_zero() {
        return Ok(fut.await);
    }
    tokio::time::timeout(limit, fut).await.map_err(|_| NetworkError::Timeout(limit))
}

/// Resolver failures reach us wrapped inside the client's connect error.
fn transport_error(err: reqwest::Error) -> NetworkError {
    let mut source = StdError::source(&err);
    while let Some(cause) = source {
        if let Some(NetworkError::Resolution(reason)) = cause.downcast_ref::<NetworkError>() {
            return NetworkError::Resolution(reason.clone());
        }
        source = cause.source();
    }
    NetworkError::Transport(err)
}
