//! Pulling field values out of provider records.

use serde_json::Value;

use crate::fields::{Extraction, FieldDescriptor};

/// Which shape of provider document a value is being read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// Current-weather response.
    Instant,
    /// Whole forecast response: `city` metadata plus the `list` of points.
    ForecastEnvelope,
    /// One entry of a forecast `list`.
    ForecastPoint,
}

/// A raw field value. Missing optional branches yield `Absent`.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Absent,
    Present(Value),
}

impl FieldValue {
    fn from_option(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Null) | None => FieldValue::Absent,
            Some(v) => FieldValue::Present(v.clone()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, FieldValue::Absent)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Present(v) => v.as_i64(),
            FieldValue::Absent => None,
        }
    }
}

/// Read `field` from `record`.
pub fn extract(record: &Value, kind: RecordKind, field: &FieldDescriptor) -> FieldValue {
    use RecordKind::*;

    let value = match (field.extraction, kind) {
        (Extraction::City, Instant) => record.get("name"),
        (Extraction::City, ForecastEnvelope) => record.pointer("/city/name"),
        (Extraction::Daylight(name), Instant) => record.get("sys").and_then(|s| s.get(name)),
        (Extraction::Daylight(name), ForecastEnvelope) => record.get("city").and_then(|c| c.get(name)),
        (Extraction::City | Extraction::Daylight(_), ForecastPoint) => None,

        (_, ForecastEnvelope) => None,

        (Extraction::Description, _) => record.pointer("/weather/0/description"),
        (Extraction::Main(name), _) => record.get("main").and_then(|m| m.get(name)),
        (Extraction::TopLevel(name), _) => record.get(name),
        (Extraction::Wind(name), _) => record.get("wind").and_then(|w| w.get(name)),
        (Extraction::Rain, _) => record.pointer("/rain/1h"),
        (Extraction::Clouds, _) => record.pointer("/clouds/all"),
    };

    FieldValue::from_option(value)
}

/// Seconds east of UTC for the record's location.
pub fn timezone_offset(record: &Value, kind: RecordKind) -> Option<i64> {
    match kind {
        RecordKind::Instant | RecordKind::ForecastPoint => record.get("timezone"),
        RecordKind::ForecastEnvelope => record.pointer("/city/timezone"),
    }
    .and_then(Value::as_i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::lookup;
    use serde_json::json;

    fn get(record: &Value, kind: RecordKind, name: &str) -> FieldValue {
        extract(record, kind, lookup(name).expect("known field"))
    }

    fn instant() -> Value {
        json!({
            "name": "Paris",
            "dt": 1_700_000_000,
            "timezone": 3600,
            "visibility": 10000,
            "weather": [{ "description": "light rain" }],
            "main": { "temp": 11.5, "humidity": 87, "pressure": 1008 },
            "wind": { "speed": 4.1, "deg": 230 },
            "rain": { "1h": 0.25 },
            "clouds": { "all": 90 },
            "sys": { "sunrise": 1_699_944_000, "sunset": 1_699_977_000 }
        })
    }

    #[test]
    fn instant_fields() {
        let rec = instant();
        assert_eq!(get(&rec, RecordKind::Instant, "city"), FieldValue::Present(json!("Paris")));
        assert_eq!(get(&rec, RecordKind::Instant, "desc"), FieldValue::Present(json!("light rain")));
        assert_eq!(get(&rec, RecordKind::Instant, "temp"), FieldValue::Present(json!(11.5)));
        assert_eq!(get(&rec, RecordKind::Instant, "visibility"), FieldValue::Present(json!(10000)));
        assert_eq!(get(&rec, RecordKind::Instant, "wind_deg"), FieldValue::Present(json!(230)));
        assert_eq!(get(&rec, RecordKind::Instant, "rain"), FieldValue::Present(json!(0.25)));
        assert_eq!(get(&rec, RecordKind::Instant, "clouds"), FieldValue::Present(json!(90)));
        assert_eq!(get(&rec, RecordKind::Instant, "sunrise").as_i64(), Some(1_699_944_000));
        assert_eq!(timezone_offset(&rec, RecordKind::Instant), Some(3600));
    }

    #[test]
    fn missing_branches_are_absent() {
        let rec = json!({ "main": { "temp": 3.0 }, "weather": [] });

        for name in ["wind_speed", "wind_gust", "rain", "clouds", "desc", "sea_level", "sunset", "city"] {
            assert!(get(&rec, RecordKind::Instant, name).is_absent(), "{name}");
        }
        assert!(get(&instant(), RecordKind::Instant, "wind_gust").is_absent());
    }

    #[test]
    fn forecast_envelope_and_point_branch() {
        let envelope = json!({
            "city": { "name": "Oslo", "timezone": 7200, "sunrise": 100, "sunset": 200 },
            "list": [{ "dt": 150, "main": { "temp": -2.0 }, "sys": { "pod": "d" } }]
        });
        let point = &envelope["list"][0];

        assert_eq!(get(&envelope, RecordKind::ForecastEnvelope, "city"), FieldValue::Present(json!("Oslo")));
        assert_eq!(get(&envelope, RecordKind::ForecastEnvelope, "sunset").as_i64(), Some(200));
        assert!(get(&envelope, RecordKind::ForecastEnvelope, "temp").is_absent());
        assert_eq!(timezone_offset(&envelope, RecordKind::ForecastEnvelope), Some(7200));

        assert_eq!(get(point, RecordKind::ForecastPoint, "temp"), FieldValue::Present(json!(-2.0)));
        assert_eq!(get(point, RecordKind::ForecastPoint, "dt").as_i64(), Some(150));
        assert!(get(point, RecordKind::ForecastPoint, "sunrise").is_absent());
        assert!(get(point, RecordKind::ForecastPoint, "city").is_absent());
    }
}
