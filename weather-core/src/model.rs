use std::{fmt, str::FromStr};

use crate::error::WeatherError;

/// Measurement system requested from the provider; selects unit symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitSystem {
    Standard,
    #[default]
    Metric,
    Imperial,
}

impl UnitSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Standard => "standard",
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UnitSystem {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "standard" => Ok(UnitSystem::Standard),
            "metric" => Ok(UnitSystem::Metric),
            "imperial" => Ok(UnitSystem::Imperial),
            other => Err(WeatherError::validation(format!(
                "invalid units: {other} (expected one of: metric, imperial, standard)"
            ))),
        }
    }
}

/// Split a comma-separated string, trimming each part.
pub fn separate(csv: &str) -> Vec<&str> {
    csv.split(',').map(str::trim).collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    /// Parse `latitude,longitude`.
    pub fn parse(s: &str) -> Result<Self, WeatherError> {
        let invalid = || WeatherError::validation(format!("invalid geocoordinates string: {s}"));

        let &[lat, lon] = separate(s).as_slice() else {
            return Err(invalid());
        };

        Ok(Self {
            lat: lat.parse().map_err(|_| invalid())?,
            lon: lon.parse().map_err(|_| invalid())?,
        })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lon)
    }
}

/// A free-text location of the form `city[,country]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub city: String,
    pub country: String,
}

impl Location {
    pub fn parse(s: &str) -> Result<Self, WeatherError> {
        let invalid = || WeatherError::validation(format!("invalid location string: {s}"));

        let (city, country) = match *separate(s).as_slice() {
            [city] => (city, ""),
            [city, country] => (city, country),
            _ => return Err(invalid()),
        };

        if city.is_empty() {
            return Err(invalid());
        }

        Ok(Self { city: city.to_string(), country: country.to_string() })
    }

    /// Query string for the geocoding endpoint.
    pub fn query(&self) -> String {
        if self.country.is_empty() {
            self.city.clone()
        } else {
            format!("{},{}", self.city, self.country)
        }
    }
}
