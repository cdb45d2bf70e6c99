use crate::{
    Config,
    auth::TokenProvider,
    error::ApiError,
    model::{City, ComfortIndexDetail, WeatherSnapshot},
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod http;

pub use http::HttpWeatherGateway;

/// Result of a fail-soft list fetch.
///
/// The error itself is logged by the gateway and never handed to the caller;
/// `Unavailable` only tells the caller that nothing new should be cached.
#[derive(Debug, Clone, PartialEq)]
pub enum Listing {
    Fetched(Vec<WeatherSnapshot>),
    Unavailable,
}

impl Listing {
    /// Snapshots to render; empty when the fetch failed.
    pub fn into_snapshots(self) -> Vec<WeatherSnapshot> {
        match self {
            Listing::Fetched(snapshots) => snapshots,
            Listing::Unavailable => Vec::new(),
        }
    }

    pub fn is_fetched(&self) -> bool {
        matches!(self, Listing::Fetched(_))
    }
}

/// Remote operations the controllers depend on.
///
/// Order and rank of listed cities are the backend's; implementations must
/// not re-sort.
#[async_trait]
pub trait WeatherGateway: Send + Sync + Debug {
    /// Full ranked city set. Never fails; see [`Listing`].
    async fn list_cities(&self, force_refresh: bool) -> Listing;

    async fn city(&self, city_id: &str, force_refresh: bool) -> Result<WeatherSnapshot, ApiError>;

    async fn comfort_index(&self, city_id: &str) -> Result<ComfortIndexDetail, ApiError>;

    /// Cities the backend knows about. Empty on failure.
    async fn supported_cities(&self) -> Vec<City>;
}

/// Build the HTTP gateway from config. `tokens` is shared with whatever else
/// needs the session, such as the route guard.
pub fn gateway_from_config(
    config: &Config,
    tokens: Arc<dyn TokenProvider>,
) -> anyhow::Result<HttpWeatherGateway> {
    let base = config.api_base_url()?;
    tracing::debug!(api_url = %base, "building weather gateway");

    let gateway = HttpWeatherGateway::new(base, tokens, config.request_timeout())?;
    Ok(gateway)
}
