//! Selecting the points of a forecast that fall into a range of local days.

use std::{str::FromStr, sync::LazyLock};

use chrono::{DateTime, Days, FixedOffset, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;
use serde_json::Value;

use crate::{
    error::{Result, WeatherError},
    extract::{RecordKind, timezone_offset},
    model::separate,
};

/// Last day (counting today as 0) the provider forecasts.
pub const MAX_DAYS: u32 = 5;

/// Hours between two forecast points.
pub const INTERVAL_HOURS: u32 = 3;

static DAYS_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]*,?[0-9]*$").expect("days pattern is valid"));

/// Named time period accepted on the command line or as `when`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Now,
    Today,
    Tomorrow,
    Forecast,
}

impl Period {
    /// Day range for the period; `None` for the single-point `now`.
    pub fn window(self) -> Option<DayWindow> {
        match self {
            Period::Now => None,
            Period::Today => Some(DayWindow { start: 0, end: 0 }),
            Period::Tomorrow => Some(DayWindow { start: 1, end: 1 }),
            Period::Forecast => Some(DayWindow { start: 0, end: MAX_DAYS }),
        }
    }
}

impl FromStr for Period {
    type Err = WeatherError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "now" => Ok(Period::Now),
            "today" => Ok(Period::Today),
            "tomorrow" => Ok(Period::Tomorrow),
            "forecast" => Ok(Period::Forecast),
            other => Err(WeatherError::validation(format!(
                "invalid value for parameter \"when\": {other}"
            ))),
        }
    }
}

/// Inclusive range of provider-local days, day 0 being today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    start: u32,
    end: u32,
}

impl DayWindow {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start > end {
            return Err(WeatherError::validation(format!(
                "invalid day range {start},{end}\nFirst day must be less than or equal to second day"
            )));
        }
        if end > MAX_DAYS {
            return Err(WeatherError::validation(format!(
                "invalid day range {start},{end}\nForecasts only reach {MAX_DAYS} days ahead"
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse `N` or `[start],[end]`; a missing start is 0 and a missing end is [`MAX_DAYS`].
    pub fn parse(token: &str) -> Result<Self> {
        let invalid = |info: &str| {
            let mut msg = format!("invalid value of argument \"days\": {token}");
            if !info.is_empty() {
                msg.push('\n');
                msg.push_str(info);
            }
            WeatherError::validation(msg)
        };

        if token.is_empty() || !DAYS_TOKEN.is_match(token) {
            return Err(invalid(""));
        }

        let number = |s: &str, fallback: u32| -> Result<u32> {
            if s.is_empty() { Ok(fallback) } else { s.parse().map_err(|_| invalid("")) }
        };

        let (start, end) = match *separate(token).as_slice() {
            [day] => {
                let day = number(day, 0)?;
                (day, day)
            }
            [start, end] => (number(start, 0)?, number(end, MAX_DAYS)?),
            _ => return Err(invalid("")),
        };

        if start > end {
            return Err(invalid("First day must be less than or equal to second day"));
        }
        if end > MAX_DAYS {
            return Err(invalid(&format!("Forecasts only reach {MAX_DAYS} days ahead")));
        }

        Ok(Self { start, end })
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Half-open interval `[midnight + start days, midnight + (end + 1) days)`
    /// where midnight is the start of today at `offset`.
    pub fn bounds(
        &self,
        now: DateTime<Utc>,
        offset: FixedOffset,
    ) -> (DateTime<FixedOffset>, DateTime<FixedOffset>) {
        let local_now = now.with_timezone(&offset);
        // A fixed offset has no gaps, so local midnight always exists.
        let midnight = offset
            .from_local_datetime(&local_now.date_naive().and_time(NaiveTime::MIN))
            .single()
            .unwrap_or(local_now);

        let from = midnight + Days::new(u64::from(self.start));
        let to = midnight + Days::new(u64::from(self.end) + 1);
        (from, to)
    }

    pub fn contains(&self, timestamp: i64, now: DateTime<Utc>, offset: FixedOffset) -> bool {
        let Some(at) = DateTime::from_timestamp(timestamp, 0) else {
            return false;
        };
        let (from, to) = self.bounds(now, offset);
        let at = at.with_timezone(&offset);
        from <= at && at < to
    }
}

/// Number of forecast points to request so that day `end_day` is fully covered.
///
/// The location's hour is unknown until the forecast arrives, so this sizes
/// for local midnight, the hour that needs the most points.
pub fn points_to_request(end_day: u32) -> u32 {
    let hours = 24 + end_day.min(MAX_DAYS) * 24;
    hours.div_ceil(INTERVAL_HOURS)
}

/// Fixed offset of a forecast envelope; UTC if the provider omitted it.
pub fn envelope_offset(envelope: &Value) -> FixedOffset {
    timezone_offset(envelope, RecordKind::ForecastEnvelope)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| Utc.fix())
}

/// Points of `envelope` whose timestamps fall inside `window`, in order.
pub fn select_points<'a>(envelope: &'a Value, window: DayWindow, now: DateTime<Utc>) -> Vec<&'a Value> {
    let offset = envelope_offset(envelope);

    envelope
        .get("list")
        .and_then(Value::as_array)
        .map(|points| {
            points
                .iter()
                .filter(|p| {
                    p.get("dt")
                        .and_then(Value::as_i64)
                        .is_some_and(|ts| window.contains(ts, now, offset))
                })
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).single().expect("valid date")
    }

    #[test]
    fn named_periods() {
        assert_eq!(Period::Today.window(), Some(DayWindow::new(0, 0).unwrap()));
        assert_eq!(Period::Tomorrow.window(), Some(DayWindow::new(1, 1).unwrap()));
        assert_eq!(Period::Forecast.window(), Some(DayWindow::new(0, 5).unwrap()));
        assert_eq!(Period::Now.window(), None);

        assert_eq!("tomorrow".parse::<Period>().unwrap(), Period::Tomorrow);
        let err = "yesterday".parse::<Period>().unwrap_err();
        assert!(err.to_string().contains("yesterday"));
    }

    #[test]
    fn day_tokens() {
        assert_eq!(DayWindow::parse("2").unwrap(), DayWindow::new(2, 2).unwrap());
        assert_eq!(DayWindow::parse("1,3").unwrap(), DayWindow::new(1, 3).unwrap());
        assert_eq!(DayWindow::parse(",3").unwrap(), DayWindow::new(0, 3).unwrap());
        assert_eq!(DayWindow::parse("2,").unwrap(), DayWindow::new(2, MAX_DAYS).unwrap());
        assert_eq!(DayWindow::parse(",").unwrap(), DayWindow::new(0, MAX_DAYS).unwrap());
    }

    #[test]
    fn bad_day_tokens() {
        for token in ["", "a", "-1", "1,2,3", "1;2", " 1"] {
            let err = DayWindow::parse(token).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{token:?}");
        }

        let err = DayWindow::parse("3,1").unwrap_err();
        assert!(err.to_string().contains("less than or equal"));
        assert!(DayWindow::new(4, 2).is_err());
    }

    #[test]
    fn days_past_the_forecast_are_rejected() {
        for token in ["6", "2,6", "100000000", "0,4294967295"] {
            let err = DayWindow::parse(token).unwrap_err();
            assert_eq!(err.exit_code(), 2, "{token:?}");
            assert!(err.to_string().contains(token), "{token:?}");
        }
        assert!(DayWindow::new(0, MAX_DAYS + 1).is_err());
        assert_eq!(DayWindow::parse("5").unwrap(), DayWindow::new(5, 5).unwrap());
    }

    #[test]
    fn midnight_boundary_is_inclusive_at_start() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        // 10:00 local on 2024-03-10.
        let now = utc(2024, 3, 10, 8, 0, 0);
        let window = DayWindow::new(1, 1).unwrap();

        // Local midnight starting 2024-03-11 is 22:00 UTC on the 10th.
        let midnight = utc(2024, 3, 10, 22, 0, 0).timestamp();
        assert!(window.contains(midnight, now, offset));
        assert!(!window.contains(midnight - 1, now, offset));

        let next_midnight = midnight + 24 * 3600;
        assert!(window.contains(next_midnight - 1, now, offset));
        assert!(!window.contains(next_midnight, now, offset));
    }

    #[test]
    fn local_day_differs_from_utc_day() {
        // 23:30 UTC is already tomorrow at UTC+9.
        let offset = FixedOffset::east_opt(9 * 3600).unwrap();
        let now = utc(2024, 6, 1, 12, 0, 0);
        let today = DayWindow::new(0, 0).unwrap();
        let tomorrow = DayWindow::new(1, 1).unwrap();

        let ts = utc(2024, 6, 1, 23, 30, 0).timestamp();
        assert!(!today.contains(ts, now, offset));
        assert!(tomorrow.contains(ts, now, offset));
    }

    #[test]
    fn select_points_filters_envelope() {
        let now = utc(2024, 1, 15, 13, 0, 0);
        let start = utc(2024, 1, 15, 15, 0, 0).timestamp();
        let list: Vec<Value> = (0..16)
            .map(|i| json!({ "dt": start + i * 3 * 3600, "main": { "temp": i } }))
            .collect();
        let envelope = json!({ "city": { "name": "London", "timezone": 0 }, "list": list });

        let today = select_points(&envelope, DayWindow::new(0, 0).unwrap(), now);
        // 15:00, 18:00 and 21:00 UTC remain today.
        assert_eq!(today.len(), 3);

        let tomorrow = select_points(&envelope, DayWindow::new(1, 1).unwrap(), now);
        assert_eq!(tomorrow.len(), 8);
        assert_eq!(tomorrow[0]["dt"], json!(utc(2024, 1, 16, 0, 0, 0).timestamp()));

        let empty = json!({ "city": { "timezone": 0 } });
        assert!(select_points(&empty, DayWindow::new(0, 0).unwrap(), now).is_empty());
    }

    #[test]
    fn request_sizing_covers_window() {
        assert_eq!(points_to_request(0), 8);
        assert_eq!(points_to_request(1), 16);
        assert_eq!(points_to_request(MAX_DAYS), 48);

        // Whatever the location's hour, the last requested day is reachable.
        for hour in 0..24 {
            for end in 0..=MAX_DAYS {
                let covered = points_to_request(end) * INTERVAL_HOURS;
                assert!(covered >= 24 - hour + end * 24, "hour {hour} end {end}");
            }
        }
    }

    #[test]
    fn request_sizing_ignores_host_clock() {
        // Host at UTC+9 reads 12:00 while the location, at UTC, reads 03:00.
        let now = utc(2024, 6, 1, 3, 0, 0);
        let today = DayWindow::new(0, 0).unwrap();

        // The provider answers from the next 3-hour slot onwards.
        let first = utc(2024, 6, 1, 6, 0, 0).timestamp();
        let list: Vec<Value> = (0..i64::from(points_to_request(today.end())))
            .map(|i| json!({ "dt": first + i * 3 * 3600 }))
            .collect();
        let envelope = json!({ "city": { "name": "London", "timezone": 0 }, "list": list });

        // 06:00 through 21:00 UTC.
        assert_eq!(select_points(&envelope, today, now).len(), 6);
    }
}
