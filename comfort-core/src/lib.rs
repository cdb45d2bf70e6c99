//! Core library for the `comfort` dashboard client.
//!
//! This crate defines:
//! - Configuration & credential handling
//! - Bearer-token authorization and route guarding
//! - The weather backend gateway and its shared models
//! - The snapshot cache and the dashboard/detail controllers
//! - Display classification (rank, comfort and impact tiers)
//!
//! It is used by `comfort-cli`, but can also be reused by other front-ends.

pub mod auth;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod model;
pub mod presentation;

pub use auth::{
    GuardDecision, RequestAuthorizer, Route, RouteGuard, SessionProbe, SessionStatus,
    StaticTokenProvider, TokenProvider, TokenSession,
};
pub use cache::{SnapshotCache, SnapshotCollection, SnapshotSubscription};
pub use config::Config;
pub use controller::{CityDetail, DashboardController, DetailController, ViewState};
pub use error::{ApiError, TokenError};
pub use gateway::{HttpWeatherGateway, Listing, WeatherGateway, gateway_from_config};
pub use model::{CacheStatus, City, ComfortIndexDetail, WeatherSnapshot};
pub use presentation::{ComfortTier, ImpactTier, RankTier};
