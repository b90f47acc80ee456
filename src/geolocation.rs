//! Visitor geolocation.
//!
//! Resolves an IP address to a coarse location through an ipapi-compatible
//! upstream. Results are cached per IP for the life of the process, and
//! concurrent lookups of the same IP share one upstream request.

use axum::http::HeaderMap;
use moka::future::Cache;
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use crate::errors::AppError;
use crate::models::GeoLocation;

/// Raw upstream reply. ipapi signals errors in-band with `error: true`.
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    ip: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    postal: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
}

#[derive(Clone)]
pub struct GeoLocator {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<IpAddr, Arc<GeoLocation>>,
}

impl GeoLocator {
    /// Creates a new `GeoLocator` with a 24 hour, 10k entry cache.
    pub fn new(base_url: String) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create geolocation client: {}", e))
            })?;

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(86_400))
            .max_capacity(10_000)
            .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            cache,
        })
    }

    /// Returns the cached location for `ip`, fetching it at most once even
    /// under concurrent callers. Failed lookups are not cached.
    pub async fn locate(&self, ip: IpAddr) -> Result<Arc<GeoLocation>, AppError> {
        self.cache
            .try_get_with(ip, self.fetch(ip))
            .await
            .map_err(|e| (*e).clone())
    }

    async fn fetch(&self, ip: IpAddr) -> Result<Arc<GeoLocation>, AppError> {
        let url = format!("{}/{}/json/", self.base_url, ip);
        tracing::debug!("Looking up geolocation for {}", ip);

        let response = self.client.get(&url).send().await.map_err(|e| {
            AppError::ExternalApiError(format!("Geolocation request failed: {}", e))
        })?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApiError(format!(
                "Geolocation API returned {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            AppError::ExternalApiError(format!("Failed to parse geolocation response: {}", e))
        })?;

        if data.error {
            return Err(AppError::ExternalApiError(format!(
                "Geolocation lookup refused: {}",
                data.reason.as_deref().unwrap_or("unknown reason")
            )));
        }

        Ok(Arc::new(GeoLocation {
            city: data.city.unwrap_or_default(),
            region: data.region.unwrap_or_default(),
            pincode: data.postal.unwrap_or_default(),
            country: data.country_name.unwrap_or_default(),
            ip: data.ip.unwrap_or_else(|| ip.to_string()),
        }))
    }
}

/// Works out the visitor's address: first `X-Forwarded-For` hop, then
/// `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    let header_ip = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .and_then(|v| v.trim().parse::<IpAddr>().ok())
    };

    header_ip("x-forwarded-for")
        .or_else(|| header_ip("x-real-ip"))
        .or_else(|| peer.map(|addr| addr.ip()))
}
