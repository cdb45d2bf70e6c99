use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::{
    auth::{RequestAuthorizer, TokenProvider},
    error::ApiError,
    model::{CacheStatusReport, City, ComfortIndexDetail, HealthReport, WeatherSnapshot},
};

use super::{Listing, WeatherGateway};

/// [`WeatherGateway`] over the backend's REST API (`/api/v1`).
///
/// Every request goes through [`RequestAuthorizer`] before it is sent.
#[derive(Debug, Clone)]
pub struct HttpWeatherGateway {
    http: Client,
    base: Url,
    authorizer: RequestAuthorizer,
}

impl HttpWeatherGateway {
    pub fn new(
        base: Url,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http, base, tokens))
    }

    pub fn with_client(http: Client, base: Url, tokens: Arc<dyn TokenProvider>) -> Self {
        let authorizer = RequestAuthorizer::new(&base, tokens);
        Self {
            http,
            base,
            authorizer,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Backend liveness, `GET /weather/health`.
    #[instrument(skip(self), level = "debug")]
    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        let url = self.endpoint(&["weather", "health"])?;
        self.get_json(url, None).await
    }

    /// Backend cache bookkeeping for a city, `GET /cache/status/{id}`.
    #[instrument(skip(self), level = "debug")]
    pub async fn cache_status(&self, city_id: &str) -> Result<CacheStatusReport, ApiError> {
        let url = self.endpoint(&["cache", "status", city_id])?;
        self.get_json(url, None).await
    }

    async fn fetch_cities(&self, force_refresh: bool) -> Result<Vec<WeatherSnapshot>, ApiError> {
        let url = self.endpoint(&["weather", "cities"])?;
        self.get_json(url, Some(force_refresh)).await
    }

    async fn fetch_supported_cities(&self) -> Result<Vec<City>, ApiError> {
        let url = self.endpoint(&["weather", "supported-cities"])?;
        self.get_json(url, None).await
    }

    /// Append percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Single dispatch path: build, authorize, send, check status, decode.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        force_refresh: Option<bool>,
    ) -> Result<T, ApiError> {
        let mut builder = self.http.get(url);
        if let Some(force) = force_refresh {
            builder = builder.query(&[("forceRefresh", force)]);
        }

        let request = self.authorizer.authorize(builder.build()?).await;
        let res = self.http.execute(request).await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl WeatherGateway for HttpWeatherGateway {
    #[instrument(skip(self), level = "debug")]
    async fn list_cities(&self, force_refresh: bool) -> Listing {
        match self.fetch_cities(force_refresh).await {
            Ok(snapshots) => {
                tracing::debug!(cities = snapshots.len(), "fetched city list");
                Listing::Fetched(snapshots)
            }
            Err(e) => {
                tracing::error!(error = %e, force_refresh, "failed to fetch city weather list");
                Listing::Unavailable
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn city(&self, city_id: &str, force_refresh: bool) -> Result<WeatherSnapshot, ApiError> {
        let url = self.endpoint(&["weather", "city", city_id])?;
        self.get_json(url, Some(force_refresh)).await.inspect_err(|e| {
            tracing::error!(city_id = %city_id, error = %e, "failed to fetch city weather");
        })
    }

    #[instrument(skip(self), level = "debug")]
    async fn comfort_index(&self, city_id: &str) -> Result<ComfortIndexDetail, ApiError> {
        let url = self.endpoint(&["weather", "comfort-index", city_id])?;
        self.get_json(url, None).await
    }

    #[instrument(skip(self), level = "debug")]
    async fn supported_cities(&self) -> Vec<City> {
        self.fetch_supported_cities().await.unwrap_or_else(|e| {
            tracing::error!(error = %e, "failed to fetch supported cities");
            Vec::new()
        })
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        let head: String = body.chars().take(MAX).collect();
        format!("{head}...")
    } else {
        body.to_string()
    }
}
