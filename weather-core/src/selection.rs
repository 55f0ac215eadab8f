//! Choosing where and when to report on, from command-line values and the cascade.

use crate::{
    error::Result,
    resolver::Resolver,
    window::{DayWindow, Period},
};

/// A place as the user wrote it, before parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Place {
    Coordinates(String),
    Named(String),
}

/// Explicit command-line coordinates, then a command-line location, then
/// the same two from the config file.
///
/// `None` means the caller has to guess.
pub fn select_place(
    cli_coordinates: Option<&str>,
    cli_location: Option<&str>,
    resolver: &Resolver,
) -> Option<Place> {
    let non_empty = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(str::to_string);

    if let Some(coords) = non_empty(cli_coordinates) {
        return Some(Place::Coordinates(coords));
    }
    if let Some(location) = non_empty(cli_location) {
        return Some(Place::Named(location));
    }
    if let Some(coords) = non_empty(resolver.resolve("geocoordinates").as_value()) {
        return Some(Place::Coordinates(coords));
    }
    non_empty(resolver.resolve("location").as_value()).map(Place::Named)
}

/// Day range to report, or `None` for current weather.
///
/// An explicit day range wins, then a period named on the command line,
/// then a `days` variable (only when no period was named), then `when`.
pub fn select_window(
    cli_days: Option<&str>,
    cli_period: Option<&str>,
    resolver: &Resolver,
) -> Result<Option<DayWindow>> {
    if let Some(days) = cli_days {
        return DayWindow::parse(days).map(Some);
    }
    if let Some(period) = cli_period {
        return Ok(period.parse::<Period>()?.window());
    }
    if let Some(days) = resolver.resolve("days").as_value() {
        return DayWindow::parse(days).map(Some);
    }

    let when = resolver.resolve("when");
    Ok(when.as_value().unwrap_or("now").parse::<Period>()?.window())
}
