use std::{future::Future, time::Duration};

use reqwest::StatusCode;
use serde::Deserialize;

use crate::models::Coordinate;

/// Place classes preferred over generic points of interest, in Nominatim vocabulary.
const SETTLEMENT_TYPES: &[&str] = &[
    "city",
    "town",
    "village",
    "hamlet",
    "municipality",
    "suburb",
    "administrative",
    "county",
    "state",
    "province",
    "region",
    "country",
];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeocodeError {
    #[error("place name must not be empty")]
    EmptyQuery,
    #[error("could not find \"{0}\"; check the spelling or use the \"City, Country\" format")]
    NotFound(String),
    #[error("geocoding service unavailable after {attempts} attempt(s): {reason}")]
    NetworkFailure { attempts: u32, reason: String },
}

/// Outcome of a single failed request against a geocoding service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("transient failure: {0}")]
    Transient(String),
    #[error("request rejected: {0}")]
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCandidate {
    pub coordinate: Coordinate,
    pub display_name: String,
    pub category: Option<String>,
    pub place_type: Option<String>,
    pub address_type: Option<String>,
    pub country: Option<String>,
}

impl GeocodeCandidate {
    fn is_settlement(&self) -> bool {
        let typed = [&self.address_type, &self.place_type]
            .into_iter()
            .flatten()
            .any(|t| SETTLEMENT_TYPES.contains(&t.as_str()));
        typed || matches!(self.category.as_deref(), Some("place" | "boundary"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: Coordinate,
    pub display_name: String,
    pub country: Option<String>,
}

/// One raw lookup against an external geocoding service, returning ranked candidates.
pub trait GeocodingBackend: Send + Sync {
    fn search(
        &self,
        query: &str,
    ) -> impl Future<Output = Result<Vec<GeocodeCandidate>, BackendError>> + Send;
}

/// Resolves a free-text place name to a single coordinate.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, place: &str) -> impl Future<Output = Result<GeocodedPlace, GeocodeError>> + Send;
}

pub trait Sleeper: Send + Sync {
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Bounded retry with exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay after the given failed attempt (1-based): base, 2×base, 4×base, ...
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// Validates queries, retries transient failures and picks the best candidate.
pub struct GeocoderAdapter<B, S = TokioSleeper> {
    backend: B,
    sleeper: S,
    policy: RetryPolicy,
}

pub type NominatimGeocoder = GeocoderAdapter<NominatimBackend, TokioSleeper>;

impl<B: GeocodingBackend> GeocoderAdapter<B, TokioSleeper> {
    pub fn new(backend: B) -> Self {
        Self::with_policy(backend, TokioSleeper, RetryPolicy::default())
    }
}

impl<B: GeocodingBackend, S: Sleeper> GeocoderAdapter<B, S> {
    pub fn with_policy(backend: B, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            backend,
            sleeper,
            policy,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }
}

impl<B: GeocodingBackend, S: Sleeper> Geocoder for GeocoderAdapter<B, S> {
    async fn geocode(&self, place: &str) -> Result<GeocodedPlace, GeocodeError> {
        let query = place.trim();
        if query.is_empty() {
            return Err(GeocodeError::EmptyQuery);
        }

        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.backend.search(query).await {
                Ok(candidates) => {
                    let place = select_best(candidates)
                        .ok_or_else(|| GeocodeError::NotFound(query.to_string()))?;
                    tracing::debug!(
                        "Geocoded \"{query}\" to {} ({:.4}, {:.4})",
                        place.display_name,
                        place.coordinate.lat,
                        place.coordinate.lon
                    );
                    return Ok(place);
                }
                Err(BackendError::Rejected(reason)) => {
                    return Err(GeocodeError::NetworkFailure {
                        attempts: attempt,
                        reason,
                    });
                }
                Err(BackendError::Transient(reason)) if attempt >= max_attempts => {
                    tracing::warn!("Geocoding \"{query}\" failed after {attempt} attempt(s): {reason}");
                    return Err(GeocodeError::NetworkFailure {
                        attempts: attempt,
                        reason,
                    });
                }
                Err(BackendError::Transient(reason)) => {
                    let delay = self.policy.delay_after(attempt);
                    tracing::warn!(
                        "Geocoding \"{query}\" attempt {attempt}/{max_attempts} failed: {reason}; retrying in {delay:?}"
                    );
                    self.sleeper.sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// First settlement-like candidate in service order, else the first valid one.
pub fn select_best(candidates: Vec<GeocodeCandidate>) -> Option<GeocodedPlace> {
    let valid: Vec<GeocodeCandidate> = candidates
        .into_iter()
        .filter(|c| c.coordinate.is_valid())
        .collect();
    let chosen = valid
        .iter()
        .position(GeocodeCandidate::is_settlement)
        .unwrap_or(0);
    valid.into_iter().nth(chosen).map(|c| GeocodedPlace {
        coordinate: c.coordinate,
        display_name: c.display_name,
        country: c.country,
    })
}

/// Nominatim (OpenStreetMap) search API.
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimBackend {
    pub fn new(
        base_url: impl Into<String>,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl GeocodingBackend for NominatimBackend {
    async fn search(&self, query: &str) -> Result<Vec<GeocodeCandidate>, BackendError> {
        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "jsonv2"),
                ("addressdetails", "1"),
                ("limit", "5"),
            ])
            .send()
            .await
            .map_err(|e| BackendError::Transient(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            return Err(BackendError::Transient(format!("{url} returned {status}")));
        }
        if !status.is_success() {
            return Err(BackendError::Rejected(format!("{url} returned {status}")));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                BackendError::Transient(e.to_string())
            } else {
                BackendError::Rejected(format!("unreadable response: {e}"))
            }
        })?;

        Ok(places
            .into_iter()
            .filter_map(NominatimPlace::into_candidate)
            .collect())
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default, rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    addresstype: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    #[serde(default)]
    country: Option<String>,
}

impl NominatimPlace {
    fn into_candidate(self) -> Option<GeocodeCandidate> {
        let lat = self.lat.trim().parse().ok()?;
        let lon = self.lon.trim().parse().ok()?;
        Some(GeocodeCandidate {
            coordinate: Coordinate { lat, lon },
            display_name: self.display_name,
            category: self.category,
            place_type: self.place_type,
            address_type: self.addresstype,
            country: self.address.and_then(|a| a.country),
        })
    }
}
