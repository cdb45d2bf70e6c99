//! View controllers that sequence gateway calls and own per-view state.
//!
//! Controllers take `&self` so a refresh can be issued while a load is in
//! flight. Each load takes a ticket, and only the most recently started load
//! may write its result back. A torn-down controller ignores every completion.

pub mod dashboard;
pub mod detail;

pub use dashboard::DashboardController;
pub use detail::{CityDetail, DetailController};

/// Tagged state of a view.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Loading,
    Ready(T),
    Error(String),
}

impl<T> ViewState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ViewState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Ticket bookkeeping shared by the controllers.
#[derive(Debug, Default)]
pub(crate) struct LoadTickets {
    latest: u64,
    torn_down: bool,
}

impl LoadTickets {
    /// Start a load. `None` once torn down.
    pub(crate) fn issue(&mut self) -> Option<u64> {
        if self.torn_down {
            return None;
        }
        self.latest += 1;
        Some(self.latest)
    }

    /// Whether a completion holding `ticket` may still write state.
    pub(crate) fn is_current(&self, ticket: u64) -> bool {
        !self.torn_down && ticket == self.latest
    }

    pub(crate) fn tear_down(&mut self) {
        self.torn_down = true;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::{collections::VecDeque, sync::Arc, time::Duration};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use reqwest::StatusCode;

    use crate::{
        error::ApiError,
        gateway::{Listing, WeatherGateway},
        model::{City, ComfortIndexDetail, WeatherSnapshot},
    };

    /// Scripted gateway: each call pops the next queued answer.
    #[derive(Debug, Default)]
    pub struct FakeGateway {
        pub listings: Mutex<VecDeque<(Duration, Listing)>>,
        pub cities: Mutex<VecDeque<(Duration, Option<WeatherSnapshot>)>>,
        pub comfort: Mutex<VecDeque<Option<ComfortIndexDetail>>>,
        pub calls: Mutex<Vec<String>>,
    }

    impl FakeGateway {
        pub fn new() -> Arc<Self> {
            Arc::new(Self::default())
        }

        pub fn push_listing(&self, listing: Listing) {
            self.push_delayed_listing(Duration::ZERO, listing);
        }

        pub fn push_delayed_listing(&self, delay: Duration, listing: Listing) {
            self.listings.lock().push_back((delay, listing));
        }

        pub fn push_city(&self, city: Option<WeatherSnapshot>) {
            self.push_delayed_city(Duration::ZERO, city);
        }

        pub fn push_delayed_city(&self, delay: Duration, city: Option<WeatherSnapshot>) {
            self.cities.lock().push_back((delay, city));
        }

        pub fn push_comfort(&self, detail: Option<ComfortIndexDetail>) {
            self.comfort.lock().push_back(detail);
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }

        fn not_found() -> ApiError {
            ApiError::Status {
                status: StatusCode::NOT_FOUND,
                body: "not found".into(),
            }
        }
    }

    #[async_trait]
    impl WeatherGateway for FakeGateway {
        async fn list_cities(&self, force_refresh: bool) -> Listing {
            self.calls.lock().push(format!("list_cities({force_refresh})"));
            let next = self.listings.lock().pop_front();
            let (delay, listing) = next.unwrap_or((Duration::ZERO, Listing::Unavailable));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            listing
        }

        async fn city(&self, city_id: &str, force_refresh: bool) -> Result<WeatherSnapshot, ApiError> {
            self.calls.lock().push(format!("city({city_id}, {force_refresh})"));
            let next = self.cities.lock().pop_front();
            let (delay, city) = next.unwrap_or((Duration::ZERO, None));
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            city.ok_or_else(Self::not_found)
        }

        async fn comfort_index(&self, city_id: &str) -> Result<ComfortIndexDetail, ApiError> {
            self.calls.lock().push(format!("comfort_index({city_id})"));
            let next = self.comfort.lock().pop_front().flatten();
            next.ok_or_else(Self::not_found)
        }

        async fn supported_cities(&self) -> Vec<City> {
            self.calls.lock().push("supported_cities".into());
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_state_accessors() {
        let ready: ViewState<u8> = ViewState::Ready(3);
        assert_eq!(ready.ready(), Some(&3));
        assert!(!ready.is_loading());
        assert!(ready.error().is_none());

        let failed: ViewState<u8> = ViewState::Error("boom".into());
        assert_eq!(failed.error(), Some("boom"));
        assert!(failed.ready().is_none());
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut tickets = LoadTickets::default();
        let first = tickets.issue().unwrap();
        let second = tickets.issue().unwrap();

        assert!(!tickets.is_current(first));
        assert!(tickets.is_current(second));
    }

    #[test]
    fn teardown_invalidates_everything() {
        let mut tickets = LoadTickets::default();
        let ticket = tickets.issue().unwrap();
        tickets.tear_down();

        assert!(!tickets.is_current(ticket));
        assert!(tickets.issue().is_none());
    }
}
