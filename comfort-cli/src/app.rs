use std::{sync::Arc, time::Duration};

use anyhow::{Result, bail};
use comfort_core::{
    Config, DashboardController, DetailController, GuardDecision, HttpWeatherGateway, Route,
    RouteGuard, SnapshotCache, StaticTokenProvider, TokenProvider, TokenSession, ViewState,
    WeatherGateway, gateway_from_config,
};

use crate::view;

/// Wiring shared by every data command.
pub struct App {
    gateway: Arc<HttpWeatherGateway>,
    guard: RouteGuard,
    cache: SnapshotCache,
}

impl App {
    pub fn from_config(config: &Config) -> Result<Self> {
        tracing::debug!(signed_in = config.is_signed_in(), "loading session");
        let tokens: Arc<dyn TokenProvider> = Arc::new(StaticTokenProvider::from_config(config));

        let gateway = Arc::new(gateway_from_config(config, tokens.clone())?);
        let guard =
            RouteGuard::new(Arc::new(TokenSession::new(tokens))).with_timeout(config.guard_timeout());

        Ok(Self {
            gateway,
            guard,
            cache: SnapshotCache::new(),
        })
    }

    /// Resolve a path through the route table and render the view it lands on.
    pub async fn open(&self, path: &str) -> Result<()> {
        match Route::parse(path) {
            Route::Dashboard => self.dashboard(false, "").await,
            Route::Weather(city) => self.city(&city, false).await,
            Route::Login | Route::Callback => {
                println!("{}", sign_in_hint());
                Ok(())
            }
        }
    }

    pub async fn dashboard(&self, refresh: bool, search: &str) -> Result<()> {
        self.enter(&Route::Dashboard).await?;

        let dashboard = DashboardController::new(self.gateway(), self.cache.clone());
        dashboard.set_search_query(search);
        dashboard.load(refresh).await;

        print!(
            "{}",
            view::render_dashboard(&dashboard.filtered(), dashboard.last_updated(), search)
        );
        dashboard.teardown();
        Ok(())
    }

    /// Refresh on an interval and re-render every new cache generation.
    pub async fn watch(&self, interval: Duration, search: &str) -> Result<()> {
        self.enter(&Route::Dashboard).await?;

        let dashboard = DashboardController::new(self.gateway(), self.cache.clone());
        let mut subscription = self.cache.subscribe();
        let query = search.to_string();

        let printer = tokio::spawn(async move {
            while let Some(collection) = subscription.next().await {
                if collection.generation() == 0 {
                    continue;
                }
                let rows: Vec<_> = collection
                    .snapshots()
                    .iter()
                    .filter(|s| query.is_empty() || s.matches(&query))
                    .cloned()
                    .collect();
                println!("-- generation {} --", collection.generation());
                print!(
                    "{}",
                    view::render_dashboard(&rows, Some(chrono::Utc::now()), &query)
                );
            }
        });

        dashboard.activate().await;

        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    dashboard.refresh().await;
                    let showing_stale = matches!(dashboard.state(), ViewState::Ready(ref s) if s.is_empty())
                        && !self.cache.current().is_empty();
                    if showing_stale {
                        eprintln!(
                            "Backend unavailable, still showing generation {}.",
                            self.cache.current().generation()
                        );
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        dashboard.teardown();
        printer.abort();
        Ok(())
    }

    pub async fn city(&self, city_id: &str, refresh: bool) -> Result<()> {
        self.enter(&Route::Weather(city_id.to_string())).await?;

        let detail = DetailController::new(self.gateway());
        detail.activate_with(city_id, refresh).await;

        let result = match detail.state() {
            ViewState::Ready(ready) => {
                print!(
                    "{}",
                    view::render_detail(&ready.weather, ready.comfort_index.as_ref())
                );
                Ok(())
            }
            ViewState::Error(message) => Err(anyhow::anyhow!(message)),
            ViewState::Loading => Err(anyhow::anyhow!("City view did not finish loading")),
        };
        detail.teardown();
        result
    }

    pub async fn cities(&self) -> Result<()> {
        let cities = self.gateway.supported_cities().await;
        print!("{}", view::render_cities(&cities));
        Ok(())
    }

    pub async fn health(&self) -> Result<()> {
        match self.gateway.health().await {
            Ok(report) => {
                print!("{}", view::render_health(&report));
                Ok(())
            }
            Err(e) => bail!("{}\n({e})", e.user_message()),
        }
    }

    pub async fn cache_status(&self, city_id: &str) -> Result<()> {
        match self.gateway.cache_status(city_id).await {
            Ok(report) => {
                print!("{}", view::render_cache_status(&report));
                Ok(())
            }
            Err(e) => bail!("{}\n({e})", e.user_message()),
        }
    }

    fn gateway(&self) -> Arc<dyn WeatherGateway> {
        self.gateway.clone()
    }

    async fn enter(&self, route: &Route) -> Result<()> {
        match self.guard.check(route).await {
            GuardDecision::Allow => Ok(()),
            GuardDecision::Redirect(to) => {
                bail!("Cannot open {route}: not signed in (redirected to {to}).\n{}", sign_in_hint())
            }
        }
    }
}

fn sign_in_hint() -> String {
    format!(
        "Hint: run `comfort configure` and paste an access token, or set {}.",
        comfort_core::config::ACCESS_TOKEN_ENV
    )
}
