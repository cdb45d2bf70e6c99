use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::{
    auth::Route,
    cache::SnapshotCache,
    gateway::{Listing, WeatherGateway},
    model::WeatherSnapshot,
};

use super::{LoadTickets, ViewState};

#[derive(Debug)]
struct DashboardState {
    view: ViewState<Arc<[WeatherSnapshot]>>,
    search_query: String,
    selected_city: Option<String>,
    last_updated: Option<DateTime<Utc>>,
    tickets: LoadTickets,
}

/// Ranked city list with live search.
#[derive(Debug)]
pub struct DashboardController {
    gateway: Arc<dyn WeatherGateway>,
    cache: SnapshotCache,
    state: Mutex<DashboardState>,
}

impl DashboardController {
    pub fn new(gateway: Arc<dyn WeatherGateway>, cache: SnapshotCache) -> Self {
        Self {
            gateway,
            cache,
            state: Mutex::new(DashboardState {
                view: ViewState::Loading,
                search_query: String::new(),
                selected_city: None,
                last_updated: None,
                tickets: LoadTickets::default(),
            }),
        }
    }

    /// Initial load when the view opens.
    pub async fn activate(&self) {
        self.load(false).await;
    }

    pub async fn refresh(&self) {
        self.load(true).await;
    }

    /// Fetch the city list and move to `Ready`.
    ///
    /// A successful fetch is published to the cache. A failed fetch leaves
    /// the cache alone and shows an empty list.
    pub async fn load(&self, force_refresh: bool) {
        let ticket = {
            let mut state = self.state.lock();
            let Some(ticket) = state.tickets.issue() else {
                return;
            };
            state.view = ViewState::Loading;
            ticket
        };

        let listing = self.gateway.list_cities(force_refresh).await;

        let mut state = self.state.lock();
        if !state.tickets.is_current(ticket) {
            tracing::debug!(ticket, "discarding superseded city list");
            return;
        }

        let snapshots = match listing {
            Listing::Fetched(snapshots) => self.cache.publish(snapshots).shared(),
            Listing::Unavailable => Arc::from(Vec::new()),
        };
        state.view = ViewState::Ready(snapshots);
        state.last_updated = Some(Utc::now());
    }

    pub fn state(&self) -> ViewState<Arc<[WeatherSnapshot]>> {
        self.state.lock().view.clone()
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.state.lock().last_updated
    }

    /// Cities in the current list whose name or country contains `query`.
    ///
    /// The query is matched as given, without trimming. An empty query returns
    /// the whole list. Nothing is returned while not `Ready`.
    pub fn filter(&self, query: &str) -> Vec<WeatherSnapshot> {
        let state = self.state.lock();
        let Some(snapshots) = state.view.ready() else {
            return Vec::new();
        };

        if query.is_empty() {
            return snapshots.to_vec();
        }

        snapshots
            .iter()
            .filter(|s| s.matches(query))
            .cloned()
            .collect()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        self.state.lock().search_query = query.into();
    }

    pub fn search_query(&self) -> String {
        self.state.lock().search_query.clone()
    }

    /// The current list filtered by the stored search query.
    pub fn filtered(&self) -> Vec<WeatherSnapshot> {
        let query = self.search_query();
        self.filter(&query)
    }

    /// Remember the chosen city and return the route to its detail view.
    pub fn select_city(&self, city_id: &str) -> Route {
        self.state.lock().selected_city = Some(city_id.to_string());
        Route::Weather(city_id.to_string())
    }

    pub fn selected_city(&self) -> Option<String> {
        self.state.lock().selected_city.clone()
    }

    /// Stop accepting results. In-flight loads finish but change nothing.
    pub fn teardown(&self) {
        self.state.lock().tickets.tear_down();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{controller::testing::FakeGateway, model::fixtures::snapshot};

    fn berlin_paris() -> Vec<WeatherSnapshot> {
        vec![
            snapshot("2950159", "Berlin", "Germany", 1),
            snapshot("2988507", "Paris", "France", 2),
        ]
    }

    fn names(snapshots: &[WeatherSnapshot]) -> Vec<&str> {
        snapshots.iter().map(|s| s.city_name.as_str()).collect()
    }

    #[tokio::test]
    async fn starts_loading_then_becomes_ready() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway.clone(), cache.clone());

        assert!(dashboard.state().is_loading());
        assert!(dashboard.last_updated().is_none());

        dashboard.activate().await;

        let state = dashboard.state();
        assert_eq!(names(state.ready().unwrap()), ["Berlin", "Paris"]);
        assert!(dashboard.last_updated().is_some());
        assert_eq!(cache.current().generation(), 1);
        assert_eq!(gateway.calls(), ["list_cities(false)"]);
    }

    #[tokio::test]
    async fn refresh_forces_backend_refresh() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        let dashboard = DashboardController::new(gateway.clone(), SnapshotCache::new());

        dashboard.refresh().await;

        assert_eq!(gateway.calls(), ["list_cities(true)"]);
    }

    #[tokio::test]
    async fn successful_load_publishes_exactly_once_and_in_full() {
        for force_refresh in [false, true] {
            let gateway = FakeGateway::new();
            gateway.push_listing(Listing::Fetched(berlin_paris()));
            gateway.push_listing(Listing::Fetched(vec![snapshot("3143244", "Oslo", "Norway", 1)]));
            let cache = SnapshotCache::new();
            let mut sub = cache.subscribe();
            let dashboard = DashboardController::new(gateway, cache.clone());

            dashboard.load(force_refresh).await;
            dashboard.load(force_refresh).await;

            let initial = sub.next().await.unwrap();
            assert_eq!(initial.generation(), 0);

            let first = sub.next().await.unwrap();
            assert_eq!(names(first.snapshots()), ["Berlin", "Paris"]);

            let second = sub.next().await.unwrap();
            assert_eq!(second.generation(), 2);
            assert_eq!(names(second.snapshots()), ["Oslo"]);

            assert!(sub.try_next().is_none());
        }
    }

    #[tokio::test]
    async fn failed_load_keeps_cache_and_shows_empty_list() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        gateway.push_listing(Listing::Unavailable);
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway, cache.clone());

        dashboard.load(false).await;
        dashboard.refresh().await;

        assert!(dashboard.state().ready().unwrap().is_empty());
        assert!(dashboard.state().error().is_none());

        let mut late = cache.subscribe();
        let replayed = late.next().await.unwrap();
        assert_eq!(replayed.generation(), 1);
        assert_eq!(names(replayed.snapshots()), ["Berlin", "Paris"]);
    }

    #[tokio::test]
    async fn failed_first_load_leaves_initial_empty_collection() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Unavailable);
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway, cache.clone());

        dashboard.activate().await;

        let mut sub = cache.subscribe();
        let current = sub.next().await.unwrap();
        assert_eq!(current.generation(), 0);
        assert!(current.is_empty());
    }

    #[tokio::test]
    async fn filter_matches_name_or_country_case_insensitively() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        let dashboard = DashboardController::new(gateway, SnapshotCache::new());
        dashboard.activate().await;

        assert_eq!(names(&dashboard.filter("")), ["Berlin", "Paris"]);
        assert_eq!(names(&dashboard.filter("ger")), ["Berlin"]);
        assert_eq!(names(&dashboard.filter("PARIS")), ["Paris"]);
        assert_eq!(names(&dashboard.filter("fran")), ["Paris"]);
        assert!(dashboard.filter("tokyo").is_empty());
        assert!(dashboard.filter("  ").is_empty());
        assert!(dashboard.filter(" paris").is_empty());

        // Filtering never changes the underlying list.
        assert_eq!(dashboard.state().ready().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn stored_search_query_drives_filtered_view() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        let dashboard = DashboardController::new(gateway, SnapshotCache::new());
        dashboard.activate().await;

        dashboard.set_search_query("Fr");
        assert_eq!(dashboard.search_query(), "Fr");
        assert_eq!(names(&dashboard.filtered()), ["Paris"]);

        dashboard.set_search_query("");
        assert_eq!(dashboard.filtered().len(), 2);
    }

    #[test]
    fn filter_is_empty_while_loading() {
        let dashboard = DashboardController::new(FakeGateway::new(), SnapshotCache::new());
        assert!(dashboard.filter("").is_empty());
    }

    #[test]
    fn select_city_returns_detail_route() {
        let dashboard = DashboardController::new(FakeGateway::new(), SnapshotCache::new());
        let route = dashboard.select_city("2643743");

        assert_eq!(route, Route::Weather("2643743".into()));
        assert_eq!(dashboard.selected_city().as_deref(), Some("2643743"));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_earlier_load_cannot_overwrite_newer_one() {
        let gateway = FakeGateway::new();
        gateway.push_delayed_listing(
            Duration::from_millis(500),
            Listing::Fetched(vec![snapshot("1", "Stale", "Nowhere", 1)]),
        );
        gateway.push_delayed_listing(Duration::from_millis(10), Listing::Fetched(berlin_paris()));
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway, cache.clone());

        tokio::join!(dashboard.load(false), dashboard.refresh());

        assert_eq!(names(dashboard.state().ready().unwrap()), ["Berlin", "Paris"]);
        assert_eq!(cache.current().generation(), 1);
        assert_eq!(names(cache.current().snapshots()), ["Berlin", "Paris"]);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_during_load_discards_its_result() {
        let gateway = FakeGateway::new();
        gateway.push_delayed_listing(Duration::from_millis(200), Listing::Fetched(berlin_paris()));
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway.clone(), cache.clone());

        let teardown_midway = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            dashboard.teardown();
        };
        tokio::join!(dashboard.activate(), teardown_midway);

        assert_eq!(gateway.calls(), ["list_cities(false)"]);
        assert!(dashboard.state().is_loading());
        assert!(dashboard.last_updated().is_none());
        assert_eq!(cache.current().generation(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn teardown_during_refresh_keeps_previous_list() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        gateway.push_delayed_listing(
            Duration::from_millis(200),
            Listing::Fetched(vec![snapshot("3143244", "Oslo", "Norway", 1)]),
        );
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway, cache.clone());
        dashboard.activate().await;
        let updated = dashboard.last_updated();

        let teardown_midway = async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            dashboard.teardown();
        };
        tokio::join!(dashboard.refresh(), teardown_midway);

        assert_eq!(cache.current().generation(), 1);
        assert_eq!(names(cache.current().snapshots()), ["Berlin", "Paris"]);
        assert_eq!(dashboard.last_updated(), updated);
    }

    #[tokio::test]
    async fn teardown_suppresses_later_results() {
        let gateway = FakeGateway::new();
        gateway.push_listing(Listing::Fetched(berlin_paris()));
        let cache = SnapshotCache::new();
        let dashboard = DashboardController::new(gateway.clone(), cache.clone());

        dashboard.teardown();
        dashboard.activate().await;

        assert!(dashboard.state().is_loading());
        assert_eq!(cache.current().generation(), 0);
        assert!(gateway.calls().is_empty());
    }
}
