use std::path::{Path, PathBuf};

use chrono::{Offset, Utc};
use clap::Parser;
use tracing::debug;
use weather_core::{
    ArgTable, ConfigDocument, Coordinates, DEFAULTS, Formatter, GeoIpService, Location,
    OpenWeatherProvider, Place, Resolver, UnitSystem, VARIABLES, WeatherError, WeatherProvider,
    config, fields, locator, output, provider, selection, window,
};

use crate::{logging, prompt};

const VERSION: &str = concat!("Terminal-weather version ", env!("CARGO_PKG_VERSION"));

const COPYRIGHT: &str = "\
Copyright (C) 2026 Hassan El anabi
Terminal-weather comes with ABSOLUTELY NO WARRANTY.
You may redistribute copies of Terminal-weather
under the terms of the GNU General Public License.
For more information about these matters, see the file named COPYING.";

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", about = "Get current weather and forecasts for upcoming days")]
pub struct Cli {
    /// Show weather data for the specified time period (default: now).
    #[arg(value_parser = ["now", "today", "tomorrow", "forecast"], conflicts_with = "days")]
    pub when: Option<String>,

    /// Configuration file.
    #[arg(short, long)]
    pub conf: Option<PathBuf>,

    /// Show forecasts for the specified day or a range of the form: [start],[end].
    #[arg(short, long)]
    pub days: Option<String>,

    /// Enable debugging messages.
    #[arg(short = 'D', long)]
    pub debug: bool,

    /// Comma-separated list of fields to show (default: city,desc,temp), or 'all'.
    ///
    /// Available fields are: city, desc, temp, feels_like, temp_min, temp_max,
    /// pressure, sea_level, grnd_level, humidity, clouds, visibility,
    /// wind_speed, wind_gust, wind_deg, rain, sunrise, sunset, dt.
    #[arg(short, long)]
    pub fields: Option<String>,

    /// Show results in raw JSON format.
    #[arg(short, long)]
    pub json: bool,

    /// OpenWeatherMap API key.
    #[arg(short, long)]
    pub key: Option<String>,

    /// Measurement system (default: metric).
    #[arg(short, long, value_parser = ["metric", "imperial", "standard"])]
    pub units: Option<String>,

    /// Geocoordinates of the form: latitude,longitude.
    #[arg(short, long, conflicts_with = "location", allow_hyphen_values = true)]
    pub geocoordinates: Option<String>,

    /// A location of the form: city[,country].
    #[arg(short, long)]
    pub location: Option<String>,

    /// Show software version and copyright notice.
    #[arg(short = 'v', long)]
    pub version: bool,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        if self.version {
            println!("{VERSION}\n{COPYRIGHT}");
            return Ok(());
        }

        // Installed before locating so skipped config paths are reported.
        let log = logging::init(self.debug);

        let conf_path = locator::locate(self.conf.as_deref(), &locator::Environment::from_process())?;
        let document = ConfigDocument::parse(&conf_path, VARIABLES)?;
        let resolver = Resolver::new(self.arg_table(), document, DEFAULTS);
        if resolver.is_enabled("debug") {
            log.enable_debug();
        }
        debug!(path = %conf_path.display(), "configuration loaded");

        let keys = resolver.require("key", "unable to find any API keys")?;
        let api_key = keys
            .last()
            .ok_or_else(|| WeatherError::Lookup("unable to find any API keys".into()))?
            .to_string();

        // Everything that can be validated is checked before prompting or fetching.
        let fields_spec = resolver.resolve("fields");
        let fields = fields::select(fields_spec.as_value().unwrap_or_default())?;
        let units: UnitSystem = resolver.resolve("units").as_value().unwrap_or("metric").parse()?;
        let window = selection::select_window(self.days.as_deref(), self.when.as_deref(), &resolver)?;
        let time_format = resolver.resolve("time-format");
        let formatter = Formatter::new(
            units,
            Utc.fix(),
            time_format.as_value().unwrap_or_default(),
        )?;
        let json = resolver.is_enabled("json");

        let http = provider::http_client().map_err(WeatherError::Upstream)?;
        let owm = OpenWeatherProvider::with_client(api_key, http.clone());

        let coords = self.coordinates(&resolver, &owm, &http, &conf_path).await?;
        debug!(%coords, %units, ?window, "fetching weather data");

        let rendered = match window {
            None => {
                let record = owm.current(coords, units).await.map_err(WeatherError::Upstream)?;
                if json {
                    serde_json::to_string(&record)?
                } else {
                    output::render_instant(&record, &fields, &formatter)
                }
            }
            Some(days) => {
                let count = window::points_to_request(days.end());
                debug!(count, "forecast points requested");

                let envelope =
                    owm.forecast(coords, units, count).await.map_err(WeatherError::Upstream)?;
                let points = window::select_points(&envelope, days, Utc::now());
                debug!(selected = points.len(), "forecast points in window");

                if json {
                    serde_json::to_string(&output::windowed_json(&envelope, &points))?
                } else {
                    output::render_forecast(&envelope, &points, &fields, &formatter)
                }
            }
        };

        println!("{rendered}");
        Ok(())
    }

    /// Command-line values keyed by their config variable names.
    fn arg_table(&self) -> ArgTable {
        let flag = |on: bool| on.then(|| "yes".to_string());

        [
            ("key", self.key.clone()),
            ("units", self.units.clone()),
            ("fields", self.fields.clone()),
            ("location", self.location.clone()),
            ("geocoordinates", self.geocoordinates.clone()),
            ("days", self.days.clone()),
            ("when", self.when.clone()),
            ("debug", flag(self.debug)),
            ("json", flag(self.json)),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
    }

    async fn coordinates(
        &self,
        resolver: &Resolver,
        owm: &OpenWeatherProvider,
        http: &reqwest::Client,
        conf_path: &Path,
    ) -> anyhow::Result<Coordinates> {
        let place = selection::select_place(
            self.geocoordinates.as_deref(),
            self.location.as_deref(),
            resolver,
        );

        let coords = match place {
            Some(Place::Coordinates(s)) => Coordinates::parse(&s)?,
            Some(Place::Named(s)) => {
                let location = Location::parse(&s)?;
                owm.geocode(&location).await.map_err(WeatherError::Upstream)?
            }
            None => guess_location(resolver, http, conf_path).await?.ok_or_else(|| {
                WeatherError::validation(
                    "one of 'geocoordinates' or 'location' must be specified \
                     to get the corresponding weather data",
                )
            })?,
        };

        Ok(coords)
    }
}

/// Ask the configured GeoIP services where the user is, confirm it with
/// them, and offer to remember the answer.
async fn guess_location(
    resolver: &Resolver,
    http: &reqwest::Client,
    conf_path: &Path,
) -> anyhow::Result<Option<Coordinates>> {
    let urls = resolver.resolve("geoip-url");
    let geoip_fields = resolver.resolve("geoip-fields");
    let geoip = GeoIpService::new(urls.values(), geoip_fields.values(), http.clone());

    if geoip.is_empty() {
        return Ok(None);
    }

    let Some(found) = geoip.guess().await else {
        return Ok(None);
    };

    eprintln!("It appears that you are in {}, {}", found.city, found.country_name);
    if !prompt::confirm("Is this your correct location?") {
        return Ok(None);
    }

    if prompt::confirm("Would you like to save this location for future runs?") {
        eprintln!("The following configuration file will be updated:\n{}", conf_path.display());
        if prompt::confirm("Do you agree?") {
            config::append_variable(conf_path, VARIABLES, "geocoordinates", &found.coords.to_string())?;
        }
    }

    Ok(Some(found.coords))
}
