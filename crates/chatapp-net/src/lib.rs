pub mod cache;
pub mod config;
pub mod doh;
pub mod error;
pub mod executor;
pub mod main_queue;
pub mod request;

pub use cache::{CachePolicy, CachedResponse, UrlCache};
pub use config::{CacheConfig, ClientConfig, DohHostHeader, ResolutionMode};
pub use doh::{DohClient, DohEndpoint, DohProvider, DohResolver};
pub use error::{NetworkError, Result};
pub use executor::{HttpResponse, RequestExecutor, ResponseMeta};
pub use main_queue::{MainLoop, MainQueue, main_queue};
pub use request::{ApiRequest, Headers, HttpMethod, RequestBody, default_headers, merge_headers};
