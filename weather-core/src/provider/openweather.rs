use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::model::{Coordinates, Location, UnitSystem};

use super::{WeatherProvider, truncate_body};

const BASE_URL: &str = "https://api.openweathermap.org";

/// OpenWeatherMap current weather, 3-hourly forecast and direct geocoding.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn with_client(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }

    async fn get(&self, what: &str, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let url = format!("{BASE_URL}{path}");
        debug!(%url, what, "requesting OpenWeather");

        let res = self
            .http
            .get(&url)
            .query(query)
            .query(&[("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read OpenWeather {what} response body"))?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather {what} request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse OpenWeather {what} JSON"))
    }
}

fn position(coords: Coordinates) -> [(&'static str, String); 2] {
    [("lat", coords.lat.to_string()), ("lon", coords.lon.to_string())]
}

#[derive(Debug, Deserialize)]
struct OwGeoMatch {
    lat: f64,
    lon: f64,
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current(&self, coords: Coordinates, units: UnitSystem) -> Result<Value> {
        let [lat, lon] = position(coords);
        self.get("current weather", "/data/2.5/weather", &[lat, lon, ("units", units.to_string())])
            .await
    }

    async fn forecast(&self, coords: Coordinates, units: UnitSystem, count: u32) -> Result<Value> {
        let [lat, lon] = position(coords);
        self.get(
            "5-day forecast",
            "/data/2.5/forecast",
            &[lat, lon, ("units", units.to_string()), ("cnt", count.to_string())],
        )
        .await
    }

    async fn geocode(&self, location: &Location) -> Result<Coordinates> {
        let found = self
            .get("geocoding", "/geo/1.0/direct", &[("q", location.query()), ("limit", "1".to_string())])
            .await?;

        let matches: Vec<OwGeoMatch> =
            serde_json::from_value(found).context("Failed to parse OpenWeather geocoding JSON")?;

        let first = matches
            .first()
            .ok_or_else(|| anyhow!("no match found for location: {}", location.query()))?;

        Ok(Coordinates { lat: first.lat, lon: first.lon })
    }
}
