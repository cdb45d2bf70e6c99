use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

/// One city's weather as served by `/weather/cities` and `/weather/city/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_id: String,
    pub city_name: String,
    pub country: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub wind_speed: f64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub cloudiness: u32,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub visibility: u32,
    pub weather_description: String,
    pub weather_icon: String,
    pub comfort_score: f64,
    pub comfort_level: String,
    /// Only set on listed cities; the single-city endpoint sends `null`.
    #[serde(default)]
    pub rank: Option<u32>,
    #[serde(default)]
    pub cache_status: CacheStatus,
    pub timestamp: String,
}

impl WeatherSnapshot {
    /// Capture time reported by the backend, if it is in a recognisable format.
    pub fn captured_at(&self) -> Option<NaiveDateTime> {
        const FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

        FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(&self.timestamp, fmt).ok())
    }

    /// Case-insensitive match on city name or country.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.city_name.to_lowercase().contains(&query) || self.country.to_lowercase().contains(&query)
    }
}

/// Upstream omits clouds or visibility for some stations and the backend
/// forwards that as `null`.
fn null_as_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or_default())
}

/// Whether the backend served a snapshot from its own cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheStatus {
    Hit,
    Miss,
    Expired,
    Error,
    NotCached,
    #[default]
    #[serde(other)]
    Unknown,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Expired => "EXPIRED",
            CacheStatus::Error => "ERROR",
            CacheStatus::NotCached => "NOT_CACHED",
            CacheStatus::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Comfort breakdown from `/weather/comfort-index/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComfortIndexDetail {
    pub comfort_score: f64,
    pub comfort_level: String,
    pub temperature_impact: f64,
    pub humidity_impact: f64,
    pub wind_impact: f64,
}

impl ComfortIndexDetail {
    /// Impact sub-scores with their display labels, in display order.
    pub fn impacts(&self) -> [(&'static str, f64); 3] {
        [
            ("Temperature", self.temperature_impact),
            ("Humidity", self.humidity_impact),
            ("Wind", self.wind_impact),
        ]
    }
}

/// Entry of `/weather/supported-cities`.
///
/// The backend names the fields `cityCode`/`cityName` and sends no country.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    #[serde(alias = "cityCode")]
    pub id: String,
    #[serde(alias = "cityName")]
    pub name: String,
    #[serde(default)]
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl HealthReport {
    pub fn is_up(&self) -> bool {
        self.status.eq_ignore_ascii_case("up")
    }
}

/// Backend cache bookkeeping for one city, from `/cache/status/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStatusReport {
    pub city_id: String,
    pub cache_status: CacheStatus,
    #[serde(default)]
    pub ttl_seconds: Option<u64>,
    #[serde(default)]
    pub cache_key: Option<String>,
    #[serde(default)]
    pub is_expired: Option<bool>,
}
