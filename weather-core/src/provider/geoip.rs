//! Best-effort guess of the user's position from GeoIP web services.

use anyhow::{Context, Result, anyhow, bail};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::model::{Coordinates, separate};

use super::truncate_body;

/// Position reported by a GeoIP service.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoIpLocation {
    pub coords: Coordinates,
    pub country_name: String,
    pub city: String,
}

/// JSON keys naming, in order: latitude, longitude, country name, country code, city.
///
/// The country code slot is part of the list syntax but never read.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FieldMap {
    lat: String,
    lon: String,
    country_name: String,
    city: String,
}

impl FieldMap {
    fn parse(spec: &str) -> Result<Self> {
        match *separate(spec).as_slice() {
            [lat, lon, country_name, _, city] => Ok(Self {
                lat: lat.to_string(),
                lon: lon.to_string(),
                country_name: country_name.to_string(),
                city: city.to_string(),
            }),
            _ => bail!("invalid number of fields for geoip-url (expected 5): {spec}"),
        }
    }

    fn apply(&self, body: &Value) -> Result<GeoIpLocation> {
        let text = |key: &str| -> Result<String> {
            match body.get(key) {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(Value::Null) | None => Err(anyhow!("GeoIP response has no field '{key}'")),
                Some(other) => Ok(other.to_string()),
            }
        };
        let number = |key: &str| -> Result<f64> {
            match body.get(key) {
                Some(Value::Number(n)) => n.as_f64().ok_or_else(|| anyhow!("'{key}' is not a number")),
                Some(Value::String(s)) => s.trim().parse().with_context(|| format!("'{key}' is not a number")),
                _ => Err(anyhow!("GeoIP response has no numeric field '{key}'")),
            }
        };

        Ok(GeoIpLocation {
            coords: Coordinates { lat: number(&self.lat)?, lon: number(&self.lon)? },
            country_name: text(&self.country_name)?,
            city: text(&self.city)?,
        })
    }
}

/// The configured GeoIP services, tried in order.
#[derive(Debug, Clone)]
pub struct GeoIpService {
    services: Vec<(String, String)>,
    http: Client,
}

impl GeoIpService {
    /// Pair each URL with the field list at the same position.
    pub fn new(urls: &[String], fields: &[String], http: Client) -> Self {
        if urls.len() != fields.len() {
            warn!(urls = urls.len(), fields = fields.len(), "geoip-url and geoip-fields counts differ");
        }
        let services = urls.iter().cloned().zip(fields.iter().cloned()).collect();
        Self { services, http }
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// First successful answer, or `None` if every service failed.
    pub async fn guess(&self) -> Option<GeoIpLocation> {
        for (url, fields) in &self.services {
            match self.query(url, fields).await {
                Ok(found) => {
                    debug!(%url, city = %found.city, "GeoIP lookup succeeded");
                    return Some(found);
                }
                Err(err) => warn!(%url, "GeoIP lookup failed: {err:#}"),
            }
        }
        None
    }

    async fn query(&self, url: &str, fields: &str) -> Result<GeoIpLocation> {
        let map = FieldMap::parse(fields)?;

        let res = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request to GeoIP service {url}"))?;

        let status = res.status();
        let body = res.text().await.context("Failed to read GeoIP response body")?;

        if !status.is_success() {
            bail!("GeoIP request failed with status {status}: {}", truncate_body(&body));
        }

        let json: Value = serde_json::from_str(&body).context("Failed to parse GeoIP JSON")?;
        map.apply(&json)
    }
}
