//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - The configuration cascade: locating and parsing the config file and
//!   merging it with command-line values and built-in defaults
//! - The catalog of displayable fields and their extraction from provider records
//! - Day-range windowing of 3-hourly forecasts in the location's timezone
//! - Unit-aware formatting of the selected fields
//! - The upstream weather, geocoding and GeoIP collaborators
//!
//! It is used by `terminal-weather`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod extract;
pub mod fields;
pub mod locator;
pub mod model;
pub mod output;
pub mod provider;
pub mod resolver;
pub mod selection;
pub mod window;

pub use config::{ConfigDocument, DEFAULTS, VARIABLES, VariableSpec};
pub use error::{Result, WeatherError};
pub use extract::{FieldValue, RecordKind};
pub use fields::FieldDescriptor;
pub use model::{Coordinates, Location, UnitSystem};
pub use output::Formatter;
pub use provider::{GeoIpService, OpenWeatherProvider, WeatherProvider};
pub use resolver::{ArgTable, ResolvedParameter, Resolver};
pub use selection::Place;
pub use window::{DayWindow, Period};
