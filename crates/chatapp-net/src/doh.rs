//! DNS-over-HTTPS name resolution.
//!
//! Every lookup picks one of the configured resolvers at random and asks
//! for the host's A records as `application/dns-json`. The result is used
//! one of two ways:
//!
//! - `DohResolver` plugs into the HTTP client as its resolver, so requests
//!   keep their URL, `Host` header, and TLS name.
//! - `DohClient::rewrite` swaps the host in the URL for the first answer
//!   and reports the value to send as `Host`.
//!
//! Any failure is a `NetworkError::Resolution`. There is no retry and no
//! fallback to the system resolver.

use std::error::Error as StdError;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;

use rand::seq::IndexedRandom;
use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::DohHostHeader;
use crate::error::{NetworkError, Result};

pub const DNS_JSON: &str = "application/dns-json";

/// Public resolvers a lookup may be sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DohProvider {
    Cloudflare,
    Google,
}

impl DohProvider {
    pub const ALL: [DohProvider; 2] = [DohProvider::Google, DohProvider::Cloudflare];

    pub fn endpoint(self) -> DohEndpoint {
        match self {
            DohProvider::Cloudflare => DohEndpoint {
                url: "https://cloudflare-dns.com/dns-query".into(),
                server_addresses: vec![
                    Ipv4Addr::new(1, 1, 1, 1).into(),
                    Ipv4Addr::new(1, 0, 0, 1).into(),
                    Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1111).into(),
                    Ipv6Addr::new(0x2606, 0x4700, 0x4700, 0, 0, 0, 0, 0x1001).into(),
                ],
            },
            DohProvider::Google => DohEndpoint {
                url: "https://dns.google/dns-query".into(),
                server_addresses: vec![
                    Ipv4Addr::new(8, 8, 8, 8).into(),
                    Ipv4Addr::new(8, 8, 4, 4).into(),
                    Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8888).into(),
                    Ipv6Addr::new(0x2001, 0x4860, 0x4860, 0, 0, 0, 0, 0x8844).into(),
                ],
            },
        }
    }
}

/// Where to send DoH queries.
///
/// `server_addresses` pin the endpoint's own hostname so reaching the
/// resolver never needs a plaintext lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DohEndpoint {
    pub url: String,
    pub server_addresses: Vec<IpAddr>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Status")]
    pub status: Option<i32>,
    #[serde(rename = "TC")]
    pub tc: Option<bool>,
    #[serde(rename = "RD")]
    pub rd: Option<bool>,
    #[serde(rename = "RA")]
    pub ra: Option<bool>,
    #[serde(rename = "AD")]
    pub ad: Option<bool>,
    #[serde(rename = "CD")]
    pub cd: Option<bool>,
    #[serde(rename = "Question")]
    pub question: Option<Vec<DohQuestion>>,
    #[serde(rename = "Answer")]
    pub answer: Option<Vec<DohAnswer>>,
    #[serde(rename = "Comment")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DohQuestion {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DohAnswer {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub record_type: Option<u16>,
    #[serde(rename = "TTL")]
    pub ttl: Option<u32>,
    pub data: Option<String>,
}

impl DohResponse {
    /// `data` of the first answer, if it has one.
    pub fn first_answer_data(&self) -> Option<&str> {
        self.answer
            .as_ref()?
            .first()?
            .data
            .as_deref()
            .filter(|d| !d.is_empty())
    }

    /// Every answer whose `data` is an IP literal, in answer order.
    pub fn addresses(&self) -> Vec<IpAddr> {
        self.answer
            .iter()
            .flatten()
            .filter_map(|a| a.data.as_deref()?.parse().ok())
            .collect()
    }
}

/// A URL after DoH substitution, plus the `Host` value to send with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewrittenUrl {
    pub url: Url,
    pub host_header: String,
}

#[derive(Clone)]
pub struct DohClient {
    inner: Arc<DohClientInner>,
}

struct DohClientInner {
    endpoints: Vec<DohEndpoint>,
    http: reqwest::Client,
}

impl DohClient {
    /// Client for the two public resolvers.
    pub fn public() -> Result<Self> {
        Self::with_endpoints(DohProvider::ALL.iter().map(|p| p.endpoint()).collect())
    }

    pub fn with_endpoints(endpoints: Vec<DohEndpoint>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        for endpoint in &endpoints {
            let Some(host) = Url::parse(&endpoint.url).ok().and_then(|u| u.host_str().map(str::to_owned)) else {
                return Err(NetworkError::InvalidUrl(endpoint.url.clone()));
            };
            if !endpoint.server_addresses.is_empty() {
                let addrs: Vec<SocketAddr> = endpoint
                    .server_addresses
                    .iter()
                    .map(|ip| SocketAddr::new(*ip, 443))
                    .collect();
                builder = builder.resolve_to_addrs(&host, &addrs);
            }
        }
        let http = builder.build()?;
        Ok(Self {
            inner: Arc::new(DohClientInner { endpoints, http }),
        })
    }

    pub fn endpoints(&self) -> &[DohEndpoint] {
        &self.inner.endpoints
    }

    /// Uniform random choice among the configured endpoints.
    pub fn pick_endpoint(&self) -> Result<&DohEndpoint> {
        self.inner
            .endpoints
            .choose(&mut rand::rng())
            .ok_or_else(|| NetworkError::Resolution("no DoH endpoint configured".into()))
    }

    /// Ask one randomly chosen resolver for `name`'s A records.
    pub async fn query(&self, name: &str) -> Result<DohResponse> {
        let endpoint = self.pick_endpoint()?;
        debug!("DoH query for {} via {}", name, endpoint.url);

        let response = self
            .inner
            .http
            .get(&endpoint.url)
            .query(&[("name", name), ("type", "A")])
            .header(ACCEPT, DNS_JSON)
            .send()
            .await
            .map_err(|e| NetworkError::Resolution(format!("{name}: {e}")))?;

        let body = response
            .bytes()
            .await
            .map_err(|e| NetworkError::Resolution(format!("{name}: {e}")))?;

        serde_json::from_slice(&body)
            .map_err(|e| NetworkError::Resolution(format!("{name}: undecodable answer: {e}")))
    }

    pub async fn lookup(&self, name: &str) -> Result<Vec<IpAddr>> {
        let addrs = self.query(name).await?.addresses();
        if addrs.is_empty() {
            warn!("DoH returned no address for {}", name);
            return Err(NetworkError::Resolution(format!("no address for {name}")));
        }
        Ok(addrs)
    }

    /// Resolve `url`'s host and substitute the first answer into the URL.
    ///
    /// Every occurrence of the host text is replaced, method/body/headers
    /// are the caller's to carry over.
    pub async fn rewrite(&self, url: &Url, host_header: DohHostHeader) -> Result<RewrittenUrl> {
        let name = url
            .host_str()
            .ok_or_else(|| NetworkError::Resolution(format!("{url} has no host")))?;

        let response = self.query(name).await?;
        let data = response
            .first_answer_data()
            .ok_or_else(|| NetworkError::Resolution(format!("no answer data for {name}")))?;

        let rewritten = Url::parse(&url.as_str().replace(name, data))
            .map_err(|_| NetworkError::Resolution(format!("cannot rewrite {url} with {data}")))?;

        let host_header = match host_header {
            DohHostHeader::ResolvedAddress => data.to_string(),
            DohHostHeader::OriginalName => match url.port() {
                Some(port) => format!("{name}:{port}"),
                None => name.to_string(),
            },
        };
        debug!("DoH rewrote {} -> {}", url, rewritten);
        Ok(RewrittenUrl { url: rewritten, host_header })
    }
}

/// `reqwest` resolver hook backed by DoH.
#[derive(Clone)]
pub struct DohResolver {
    client: DohClient,
}

impl DohResolver {
    pub fn new(client: DohClient) -> Self {
        Self { client }
    }
}

impl Resolve for DohResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let client = self.client.clone();
        Box::pin(async move {
            let ips = client
                .lookup(name.as_str())
                .await
                .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;
            // Port is filled in by the connector from the request URL.
            let addrs: Addrs = Box::new(ips.into_iter().map(|ip| SocketAddr::new(ip, 0)));
            Ok::<_, Box<dyn StdError + Send + Sync>>(addrs)
        })
    }
}
