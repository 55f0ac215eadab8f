use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::model::{Coordinates, Location, UnitSystem};

pub mod geoip;
pub mod openweather;

pub use geoip::{GeoIpLocation, GeoIpService};
pub use openweather::OpenWeatherProvider;

/// Source of weather data and geocoding.
///
/// Records are returned as the provider sent them; field extraction works
/// on the raw documents.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current-weather record for `coords`.
    async fn current(&self, coords: Coordinates, units: UnitSystem) -> anyhow::Result<Value>;

    /// Forecast envelope holding at most `count` points.
    async fn forecast(
        &self,
        coords: Coordinates,
        units: UnitSystem,
        count: u32,
    ) -> anyhow::Result<Value>;

    /// Coordinates of the best match for `location`.
    async fn geocode(&self, location: &Location) -> anyhow::Result<Coordinates>;
}

/// HTTP client shared by every upstream service of a run.
pub fn http_client() -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("terminal-weather/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
