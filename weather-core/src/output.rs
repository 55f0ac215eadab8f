//! Rendering extracted values as aligned text.

use chrono::{
    DateTime, FixedOffset,
    format::{Item, StrftimeItems},
};
use serde_json::Value;

use crate::{
    error::{Result, WeatherError},
    extract::{FieldValue, RecordKind, extract, timezone_offset},
    fields::{self, Extraction, FieldDescriptor},
    model::UnitSystem,
    window::envelope_offset,
};

/// Shown in place of any value the provider did not send.
pub const MISSING: &str = "None";

const DAYLIGHT_FORMAT: &str = "%H:%M";
const FIELD_SEP: &str = "  ";
const POINT_SEP: &str = "\n---\n";

/// Turns raw field values into display strings.
#[derive(Debug, Clone)]
pub struct Formatter {
    units: UnitSystem,
    offset: FixedOffset,
    time_format: String,
}

impl Formatter {
    /// Fails if `time_format` is not a valid strftime pattern.
    pub fn new(units: UnitSystem, offset: FixedOffset, time_format: &str) -> Result<Self> {
        if StrftimeItems::new(time_format).any(|item| matches!(item, Item::Error)) {
            return Err(WeatherError::validation(format!("invalid time format: {time_format}")));
        }

        Ok(Self { units, offset, time_format: time_format.to_string() })
    }

    pub fn with_offset(&self, offset: FixedOffset) -> Self {
        Self { offset, ..self.clone() }
    }

    pub fn format(&self, field: &FieldDescriptor, value: &FieldValue) -> String {
        let FieldValue::Present(raw) = value else {
            return MISSING.to_string();
        };

        if field.is_time() {
            let pattern = match field.extraction {
                Extraction::Daylight(_) => DAYLIGHT_FORMAT,
                _ => self.time_format.as_str(),
            };
            return match raw.as_i64().and_then(|ts| self.local_time(ts)) {
                Some(at) => at.format(pattern).to_string(),
                None => plain(raw),
            };
        }

        let mut out = plain(raw);
        out.push_str(field.unit.symbol(self.units));
        if field.extraction == Extraction::Rain {
            out.push_str(" (1h)");
        }
        out
    }

    fn local_time(&self, timestamp: i64) -> Option<DateTime<FixedOffset>> {
        DateTime::from_timestamp(timestamp, 0).map(|at| at.with_timezone(&self.offset))
    }
}

fn plain(raw: &Value) -> String {
    match raw {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn label_width(fields: &[&FieldDescriptor]) -> usize {
    fields.iter().map(|f| f.name.len()).max().unwrap_or(0)
}

fn render_rows(
    record: &Value,
    kind: RecordKind,
    fields: &[&FieldDescriptor],
    width: usize,
    formatter: &Formatter,
) -> String {
    fields
        .iter()
        .map(|field| {
            let value = formatter.format(field, &extract(record, kind, field));
            format!("{:<width$}{FIELD_SEP}{value}", field.name)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Text for a current-weather record.
pub fn render_instant(record: &Value, fields: &[&FieldDescriptor], formatter: &Formatter) -> String {
    let formatter = match timezone_offset(record, RecordKind::Instant)
        .and_then(|secs| i32::try_from(secs).ok())
        .and_then(FixedOffset::east_opt)
    {
        Some(offset) => formatter.with_offset(offset),
        None => formatter.clone(),
    };

    render_rows(record, RecordKind::Instant, fields, label_width(fields), &formatter)
}

/// Text for the selected `points` of a forecast `envelope`.
///
/// `dt` leads every point; envelope-level fields are printed once at the end.
pub fn render_forecast(
    envelope: &Value,
    points: &[&Value],
    fields: &[&FieldDescriptor],
    formatter: &Formatter,
) -> String {
    let formatter = formatter.with_offset(envelope_offset(envelope));

    let dt: Option<&FieldDescriptor> = fields::lookup("dt");
    let point_fields: Vec<&FieldDescriptor> = dt
        .into_iter()
        .chain(fields.iter().copied().filter(|f| !f.is_envelope_level() && f.name != "dt"))
        .collect();
    let envelope_fields: Vec<&FieldDescriptor> =
        fields.iter().copied().filter(|f| f.is_envelope_level()).collect();

    let width = label_width(&point_fields).max(label_width(&envelope_fields));

    let mut blocks: Vec<String> = points
        .iter()
        .map(|point| render_rows(point, RecordKind::ForecastPoint, &point_fields, width, &formatter))
        .collect();

    if !envelope_fields.is_empty() {
        blocks.push(render_rows(
            envelope,
            RecordKind::ForecastEnvelope,
            &envelope_fields,
            width,
            &formatter,
        ));
    }

    blocks.join(POINT_SEP)
}

/// `envelope` with its point list narrowed to `points`.
pub fn windowed_json(envelope: &Value, points: &[&Value]) -> Value {
    let mut out = envelope.clone();
    if let Some(obj) = out.as_object_mut() {
        obj.insert("cnt".into(), Value::from(points.len()));
        obj.insert("list".into(), Value::Array(points.iter().map(|p| (*p).clone()).collect()));
    }
    out
}
