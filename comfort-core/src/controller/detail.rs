use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
    auth::Route,
    gateway::WeatherGateway,
    model::{ComfortIndexDetail, WeatherSnapshot},
};

use super::{LoadTickets, ViewState};

pub const DETAIL_ERROR_MESSAGE: &str = "Failed to load weather details. Please try again.";

/// Everything the detail view renders once loading has finished.
#[derive(Debug, Clone, PartialEq)]
pub struct CityDetail {
    pub weather: WeatherSnapshot,
    /// Absent when the comfort-index fetch failed.
    pub comfort_index: Option<ComfortIndexDetail>,
}

#[derive(Debug)]
struct DetailState {
    city_id: Option<String>,
    view: ViewState<CityDetail>,
    /// Weather already received while the comfort index is still loading.
    pending_weather: Option<WeatherSnapshot>,
    tickets: LoadTickets,
}

/// Single-city view: weather first, then the comfort breakdown.
///
/// The comfort index is optional. If it cannot be fetched the view still
/// becomes `Ready` with the weather alone.
#[derive(Debug)]
pub struct DetailController {
    gateway: Arc<dyn WeatherGateway>,
    state: Mutex<DetailState>,
}

impl DetailController {
    pub fn new(gateway: Arc<dyn WeatherGateway>) -> Self {
        Self {
            gateway,
            state: Mutex::new(DetailState {
                city_id: None,
                view: ViewState::Loading,
                pending_weather: None,
                tickets: LoadTickets::default(),
            }),
        }
    }

    /// Open the view for `city_id`.
    pub async fn activate(&self, city_id: &str) {
        self.activate_with(city_id, false).await;
    }

    /// Open the view for `city_id`, optionally bypassing the backend cache.
    pub async fn activate_with(&self, city_id: &str, force_refresh: bool) {
        self.state.lock().city_id = Some(city_id.to_string());
        self.load(force_refresh).await;
    }

    pub async fn refresh(&self) {
        self.load(true).await;
    }

    pub async fn load(&self, force_refresh: bool) {
        let (ticket, city_id) = {
            let mut state = self.state.lock();
            let Some(city_id) = state.city_id.clone() else {
                tracing::warn!("detail load requested before a city was chosen");
                return;
            };
            let Some(ticket) = state.tickets.issue() else {
                return;
            };
            state.view = ViewState::Loading;
            state.pending_weather = None;
            (ticket, city_id)
        };

        let weather = match self.gateway.city(&city_id, force_refresh).await {
            Ok(weather) => weather,
            Err(e) => {
                tracing::error!(city_id = %city_id, error = %e, "could not load weather details");
                let mut state = self.state.lock();
                if state.tickets.is_current(ticket) {
                    state.view = ViewState::Error(DETAIL_ERROR_MESSAGE.to_string());
                }
                return;
            }
        };

        {
            let mut state = self.state.lock();
            if !state.tickets.is_current(ticket) {
                tracing::debug!(city_id = %city_id, ticket, "discarding superseded city weather");
                return;
            }
            state.pending_weather = Some(weather.clone());
        }

        let comfort_index = match self.gateway.comfort_index(&city_id).await {
            Ok(detail) => Some(detail),
            Err(e) => {
                tracing::warn!(city_id = %city_id, error = %e, "comfort index unavailable");
                None
            }
        };

        let mut state = self.state.lock();
        if !state.tickets.is_current(ticket) {
            tracing::debug!(city_id = %city_id, ticket, "discarding superseded comfort index");
            return;
        }
        state.pending_weather = None;
        state.view = ViewState::Ready(CityDetail {
            weather,
            comfort_index,
        });
    }

    pub fn state(&self) -> ViewState<CityDetail> {
        self.state.lock().view.clone()
    }

    pub fn city_id(&self) -> Option<String> {
        self.state.lock().city_id.clone()
    }

    /// Weather to show: the finished detail, or the snapshot received so far.
    pub fn weather(&self) -> Option<WeatherSnapshot> {
        let state = self.state.lock();
        match &state.view {
            ViewState::Ready(detail) => Some(detail.weather.clone()),
            _ => state.pending_weather.clone(),
        }
    }

    pub fn comfort_index(&self) -> Option<ComfortIndexDetail> {
        self.state
            .lock()
            .view
            .ready()
            .and_then(|detail| detail.comfort_index.clone())
    }

    pub fn go_back(&self) -> Route {
        Route::Dashboard
    }

    pub fn teardown(&self) {
        self.state.lock().tickets.tear_down();
    }
}
