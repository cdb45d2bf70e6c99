//! Plain-text rendering of the dashboard and detail views.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use comfort_core::{
    City, ComfortIndexDetail, ComfortTier, ImpactTier, RankTier, WeatherSnapshot,
    model::{CacheStatusReport, HealthReport},
    presentation::render_impact_bar,
};

const BAR_WIDTH: usize = 20;

pub fn render_dashboard(
    snapshots: &[WeatherSnapshot],
    last_updated: Option<DateTime<Utc>>,
    query: &str,
) -> String {
    let mut out = String::new();

    if !query.is_empty() {
        let _ = writeln!(out, "Search: \"{query}\"");
    }

    if snapshots.is_empty() {
        out.push_str(if query.is_empty() {
            "No weather data available.\n"
        } else {
            "No cities match your search.\n"
        });
    } else {
        let _ = writeln!(
            out,
            "{:<6} {:>4}  {:<18} {:<8} {:>7} {:>7} {:>5} {:>7}  {:<10} {}",
            "", "Rank", "City", "Country", "Temp", "Feels", "Hum", "Wind", "Comfort", "Score"
        );
        for s in snapshots {
            let _ = writeln!(out, "{}", dashboard_row(s));
        }
    }

    if let Some(at) = last_updated {
        let _ = writeln!(
            out,
            "Last updated {}",
            at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
        );
    }

    out
}

fn dashboard_row(s: &WeatherSnapshot) -> String {
    let comfort = ComfortTier::classify(&s.comfort_level);
    format!(
        "{:<6} {:>4}  {:<18} {:<8} {:>5.1}°C {:>5.1}°C {:>4.0}% {:>3.1}m/s  {} {:<8} {:>5.1}",
        RankTier::from_rank(s.rank).badge(),
        s.rank.map_or_else(|| "-".to_string(), |r| r.to_string()),
        truncate(&s.city_name, 18),
        truncate(&s.country, 8),
        s.temperature,
        s.feels_like,
        s.humidity,
        s.wind_speed,
        comfort.marker(),
        comfort.label(),
        s.comfort_score,
    )
}

pub fn render_detail(weather: &WeatherSnapshot, comfort_index: Option<&ComfortIndexDetail>) -> String {
    let mut out = String::new();
    let rank = RankTier::from_rank(weather.rank);
    let comfort = ComfortTier::classify(&weather.comfort_level);

    match weather.rank {
        Some(position) => {
            let _ = writeln!(
                out,
                "{}, {}  (#{position} {})",
                weather.city_name,
                weather.country,
                rank.badge()
            );
        }
        None => {
            let _ = writeln!(out, "{}, {}", weather.city_name, weather.country);
        }
    }
    let _ = writeln!(
        out,
        "{} [{}]",
        weather.weather_description, weather.weather_icon
    );
    let _ = writeln!(
        out,
        "Temperature {:.1}°C (feels like {:.1}°C)",
        weather.temperature, weather.feels_like
    );
    let _ = writeln!(
        out,
        "Humidity {:.0}%  Pressure {:.0} hPa  Wind {:.1} m/s",
        weather.humidity, weather.pressure, weather.wind_speed
    );
    let _ = writeln!(
        out,
        "Cloudiness {}%  Visibility {:.1} km",
        weather.cloudiness,
        f64::from(weather.visibility) / 1000.0
    );
    let _ = writeln!(
        out,
        "Comfort {:.1} ({}) {}",
        weather.comfort_score,
        weather.comfort_level,
        comfort.marker()
    );

    let captured = weather
        .captured_at()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| weather.timestamp.clone());
    let _ = writeln!(out, "Captured {captured}  cache {}", weather.cache_status);

    if let Some(detail) = comfort_index {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Comfort breakdown: {:.1} ({})",
            detail.comfort_score, detail.comfort_level
        );
        for (label, impact) in detail.impacts() {
            let tier = ImpactTier::from_impact(impact);
            let _ = writeln!(
                out,
                "  {:<12} {} {:>5.1} {}",
                label,
                render_impact_bar(impact, BAR_WIDTH),
                impact,
                tier.text_style()
            );
        }
    }

    out
}

pub fn render_cities(cities: &[City]) -> String {
    if cities.is_empty() {
        return "No supported cities reported.\n".to_string();
    }

    let mut out = String::new();
    for city in cities {
        let _ = writeln!(out, "{:<10} {:<20} {}", city.id, city.name, city.country);
    }
    out
}

pub fn render_health(report: &HealthReport) -> String {
    match &report.timestamp {
        Some(at) => format!("Backend status: {} (at {at})\n", report.status),
        None => format!("Backend status: {}\n", report.status),
    }
}

pub fn render_cache_status(report: &CacheStatusReport) -> String {
    let mut out = format!("City {}: {}", report.city_id, report.cache_status);
    if let Some(ttl) = report.ttl_seconds {
        let _ = write!(out, ", ttl {ttl}s");
    }
    if let Some(expired) = report.is_expired {
        out.push_str(if expired { ", expired" } else { ", fresh" });
    }
    out.push('\n');
    out
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{head}…")
    } else {
        s.to_string()
    }
}
