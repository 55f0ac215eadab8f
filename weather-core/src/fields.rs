//! The fixed set of fields that can be requested for display.

use std::collections::HashSet;

use crate::{
    error::{Result, WeatherError},
    model::{UnitSystem, separate},
};

/// What a field measures; decides the unit symbol appended on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitCategory {
    None,
    Temperature,
    Pressure,
    Percent,
    Distance,
    Speed,
    Angle,
    Volume,
}

impl UnitCategory {
    /// Symbol appended to a value of this category.
    pub fn symbol(&self, units: UnitSystem) -> &'static str {
        match (self, units) {
            (UnitCategory::None, _) => "",
            (UnitCategory::Temperature, UnitSystem::Standard) => "K",
            (UnitCategory::Temperature, UnitSystem::Metric) => "°C",
            (UnitCategory::Temperature, UnitSystem::Imperial) => "°F",
            (UnitCategory::Pressure, _) => " hPa",
            (UnitCategory::Percent, _) => "%",
            (UnitCategory::Distance, _) => " m",
            (UnitCategory::Speed, UnitSystem::Imperial) => " mph",
            (UnitCategory::Speed, _) => " m/s",
            (UnitCategory::Angle, _) => "°",
            (UnitCategory::Volume, _) => " mm",
        }
    }
}

/// Where in a provider record a field lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// `city` name: top-level for instants, `city.name` for forecasts.
    City,
    /// Text of the first entry of the `weather` list.
    Description,
    /// Member of the `main` object.
    Main(&'static str),
    /// Top-level scalar.
    TopLevel(&'static str),
    /// Member of the `wind` object.
    Wind(&'static str),
    /// One-hour accumulation under `rain`.
    Rain,
    /// Coverage under `clouds.all`.
    Clouds,
    /// `sys.<name>` for instants, `city.<name>` for forecasts.
    Daylight(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub unit: UnitCategory,
    pub extraction: Extraction,
}

impl FieldDescriptor {
    /// Fields describing a whole forecast rather than one point of it.
    pub fn is_envelope_level(&self) -> bool {
        matches!(self.extraction, Extraction::City | Extraction::Daylight(_))
    }

    /// Fields holding a unix timestamp.
    pub fn is_time(&self) -> bool {
        matches!(self.extraction, Extraction::TopLevel("dt") | Extraction::Daylight(_))
    }
}

const fn field(name: &'static str, unit: UnitCategory, extraction: Extraction) -> FieldDescriptor {
    FieldDescriptor { name, unit, extraction }
}

use Extraction as E;
use UnitCategory as U;

/// Every displayable field, in display order.
pub static CATALOG: &[FieldDescriptor] = &[
    field("city", U::None, E::City),
    field("desc", U::None, E::Description),
    field("temp", U::Temperature, E::Main("temp")),
    field("feels_like", U::Temperature, E::Main("feels_like")),
    field("temp_min", U::Temperature, E::Main("temp_min")),
    field("temp_max", U::Temperature, E::Main("temp_max")),
    field("pressure", U::Pressure, E::Main("pressure")),
    field("sea_level", U::Pressure, E::Main("sea_level")),
    field("grnd_level", U::Pressure, E::Main("grnd_level")),
    field("humidity", U::Percent, E::Main("humidity")),
    field("clouds", U::Percent, E::Clouds),
    field("visibility", U::Distance, E::TopLevel("visibility")),
    field("wind_speed", U::Speed, E::Wind("speed")),
    field("wind_gust", U::Speed, E::Wind("gust")),
    field("wind_deg", U::Angle, E::Wind("deg")),
    field("rain", U::Volume, E::Rain),
    field("sunrise", U::None, E::Daylight("sunrise")),
    field("sunset", U::None, E::Daylight("sunset")),
    field("dt", U::None, E::TopLevel("dt")),
];

pub fn lookup(name: &str) -> Option<&'static FieldDescriptor> {
    CATALOG.iter().find(|f| f.name == name)
}

pub fn names() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().map(|f| f.name)
}

/// Turn a `fields` value (comma-separated names, or `all`) into descriptors.
///
/// Every unknown name is reported, not just the first.
pub fn select(spec: &str) -> Result<Vec<&'static FieldDescriptor>> {
    if spec.trim() == "all" {
        return Ok(CATALOG.iter().collect());
    }

    let requested = separate(spec);

    let mut seen = HashSet::new();
    let unknown: Vec<&str> = requested
        .iter()
        .copied()
        .filter(|name| lookup(name).is_none())
        .filter(|name| seen.insert(*name))
        .collect();

    if !unknown.is_empty() {
        return Err(WeatherError::validation(format!("invalid fields: {}", unknown.join(" "))));
    }

    Ok(requested.into_iter().filter_map(lookup).collect())
}
