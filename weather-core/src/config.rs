use std::{
    collections::HashMap,
    fs::{self, OpenOptions},
    io::Write,
    path::Path,
    sync::LazyLock,
};

use regex::Regex;
use thiserror::Error;
use tracing::debug;

use crate::error::{Result, WeatherError};

static ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z]+(-[a-z]+)*=").expect("entry pattern is valid"));

/// Whether a variable may be assigned more than once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Singleton,
    Cumulative,
}

/// The two fixed membership sets a config file is checked against.
#[derive(Debug, Clone, Copy)]
pub struct VariableSpec {
    pub cumulative: &'static [&'static str],
    pub singleton: &'static [&'static str],
}

impl VariableSpec {
    pub fn arity(&self, name: &str) -> Option<Arity> {
        if self.cumulative.contains(&name) {
            Some(Arity::Cumulative)
        } else if self.singleton.contains(&name) {
            Some(Arity::Singleton)
        } else {
            None
        }
    }

    pub fn is_cumulative(&self, name: &str) -> bool {
        self.arity(name) == Some(Arity::Cumulative)
    }
}

/// Variables understood by terminal-weather.
pub const VARIABLES: VariableSpec = VariableSpec {
    cumulative: &["geoip-url", "geoip-fields", "key"],
    singleton: &[
        "days",
        "location",
        "geocoordinates",
        "when",
        "fields",
        "units",
        "debug",
        "json",
        "time-format",
    ],
};

/// Built-in values used when neither the command line nor the file sets a variable.
pub const DEFAULTS: &[(&str, &str)] = &[
    ("when", "now"),
    ("fields", "city,desc,temp"),
    ("time-format", "%a %e %b %l %p"),
    ("units", "metric"),
];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigParseError {
    #[error("invalid configuration entry on line {line}: {entry}")]
    InvalidEntry { line: usize, entry: String },

    #[error("unrecognized configuration variable: {0}")]
    UnrecognizedVariable(String),

    #[error("multiple values were assigned to non-cumulative configuration variable: {0}")]
    MultipleValues(String),
}

/// One variable as read from the file. Singletons hold exactly one value,
/// cumulative variables hold every assignment in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigVariable {
    pub name: String,
    pub arity: Arity,
    values: Vec<String>,
}

impl ConfigVariable {
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

/// A parsed configuration file.
#[derive(Debug, Clone)]
pub struct ConfigDocument {
    spec: VariableSpec,
    variables: HashMap<String, ConfigVariable>,
}

impl ConfigDocument {
    /// A document with no assignments.
    pub fn empty(spec: VariableSpec) -> Self {
        Self { spec, variables: HashMap::new() }
    }

    /// Read and parse the file at `path`.
    pub fn parse(path: &Path, spec: VariableSpec) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|source| WeatherError::ConfigRead { path: path.to_path_buf(), source })?;

        let doc = Self::parse_str(&contents, spec)
            .map_err(|source| WeatherError::ConfigParse { path: path.to_path_buf(), source })?;

        debug!(path = %path.display(), variables = doc.variables.len(), "parsed configuration file");
        Ok(doc)
    }

    /// Parse configuration text, stopping at the first offending line.
    pub fn parse_str(contents: &str, spec: VariableSpec) -> Result<Self, ConfigParseError> {
        let mut doc = Self::empty(spec);

        for (idx, raw) in contents.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }

            if !ENTRY.is_match(line) {
                return Err(ConfigParseError::InvalidEntry { line: idx + 1, entry: line.to_string() });
            }

            // The pattern guarantees an '='.
            let (key, value) = line.split_once('=').unwrap_or((line, ""));
            doc.store(key, value.trim())?;
        }

        Ok(doc)
    }

    fn store(&mut self, key: &str, value: &str) -> Result<(), ConfigParseError> {
        let arity = self
            .spec
            .arity(key)
            .ok_or_else(|| ConfigParseError::UnrecognizedVariable(key.to_string()))?;

        match self.variables.get_mut(key) {
            None => {
                self.variables.insert(
                    key.to_string(),
                    ConfigVariable { name: key.to_string(), arity, values: vec![value.to_string()] },
                );
            }
            Some(var) if arity == Arity::Cumulative => var.values.push(value.to_string()),
            Some(_) => return Err(ConfigParseError::MultipleValues(key.to_string())),
        }

        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ConfigVariable> {
        self.variables.get(name)
    }

    pub fn spec(&self) -> VariableSpec {
        self.spec
    }
}

/// Append `name=value` to the config file at `path`.
///
/// This is the only writer of configuration; the in-memory document of the
/// current run is left untouched.
pub fn append_variable(path: &Path, spec: VariableSpec, name: &str, value: &str) -> Result<()> {
    if spec.arity(name).is_none() {
        return Err(WeatherError::validation(format!(
            "unrecognized configuration variable: {name}"
        )));
    }

    let write_err = |source: std::io::Error| WeatherError::ConfigWrite { path: path.to_path_buf(), source };

    let mut file = OpenOptions::new().append(true).open(path).map_err(write_err)?;
    write!(file, "\n{name}={value}\n").map_err(write_err)?;

    debug!(path = %path.display(), name, "appended configuration variable");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPEC: VariableSpec =
        VariableSpec { cumulative: &["c", "d", "key"], singleton: &["a", "b", "units"] };

    #[test]
    fn singleton_and_cumulative_values() {
        let doc = ConfigDocument::parse_str("a=b\nc=first\n", SPEC).expect("valid config");

        let a = doc.get("a").expect("a is set");
        assert_eq!(a.arity, Arity::Singleton);
        assert_eq!(a.values(), ["b"]);

        let c = doc.get("c").expect("c is set");
        assert_eq!(c.arity, Arity::Cumulative);
        assert_eq!(c.values(), ["first"]);
    }

    #[test]
    fn cumulative_values_keep_file_order() {
        let text = "a=0\nb=1\nc=2\nd=3\nc=4\nd=5\n\nc=6\n";
        let doc = ConfigDocument::parse_str(text, SPEC).expect("valid config");

        assert_eq!(doc.get("a").unwrap().values(), ["0"]);
        assert_eq!(doc.get("b").unwrap().values(), ["1"]);
        assert_eq!(doc.get("c").unwrap().values(), ["2", "4", "6"]);
        assert_eq!(doc.get("d").unwrap().values(), ["3", "5"]);
    }

    #[test]
    fn value_is_remainder_after_first_equals() {
        let doc = ConfigDocument::parse_str("  a=x=y, z  \n", SPEC).expect("valid config");
        assert_eq!(doc.get("a").unwrap().values(), ["x=y, z"]);
    }

    #[test]
    fn unknown_variable_is_named() {
        let err = ConfigDocument::parse_str("a=1\nbogus-key=2\n", SPEC).unwrap_err();
        assert_eq!(err, ConfigParseError::UnrecognizedVariable("bogus-key".into()));
        assert!(err.to_string().contains("bogus-key"));
    }

    #[test]
    fn singleton_assigned_twice_fails() {
        let err = ConfigDocument::parse_str("units=metric\nunits=imperial\n", SPEC).unwrap_err();
        assert_eq!(err, ConfigParseError::MultipleValues("units".into()));
    }

    #[test]
    fn malformed_lines_are_rejected() {
        for line in ["a = b", "A=b", "a--b=c", "-a=b", "a", "=b", "a_b=c"] {
            let err = ConfigDocument::parse_str(line, SPEC).unwrap_err();
            assert!(
                matches!(err, ConfigParseError::InvalidEntry { line: 1, .. }),
                "{line:?} should be rejected, got {err:?}"
            );
        }
    }

    #[test]
    fn first_offending_line_is_reported() {
        let err = ConfigDocument::parse_str("a=1\n\nnot valid\nzzz=1\n", SPEC).unwrap_err();
        assert_eq!(err, ConfigParseError::InvalidEntry { line: 3, entry: "not valid".into() });
    }

    #[test]
    fn parse_reads_file_and_wraps_errors() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conf");
        fs::write(&path, "key=ABC123\nunits=imperial\n").unwrap();

        let doc = ConfigDocument::parse(&path, VARIABLES).expect("valid config");
        assert_eq!(doc.get("key").unwrap().values(), ["ABC123"]);

        fs::write(&path, "colour=red\n").unwrap();
        let err = ConfigDocument::parse(&path, VARIABLES).unwrap_err();
        assert!(matches!(err, WeatherError::ConfigParse { .. }));
        assert_eq!(err.exit_code(), 3);

        let err = ConfigDocument::parse(&dir.path().join("missing"), VARIABLES).unwrap_err();
        assert!(matches!(err, WeatherError::ConfigRead { .. }));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn append_adds_a_parsable_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conf");
        fs::write(&path, "key=ABC123").unwrap();

        append_variable(&path, VARIABLES, "geocoordinates", "48.85,2.35").expect("append");

        let doc = ConfigDocument::parse(&path, VARIABLES).expect("still valid");
        assert_eq!(doc.get("geocoordinates").unwrap().values(), ["48.85,2.35"]);
    }

    #[test]
    fn append_rejects_unknown_variable() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("conf");
        fs::write(&path, "").unwrap();

        let err = append_variable(&path, VARIABLES, "colour", "red").unwrap_err();
        assert!(err.to_string().contains("colour"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "");
    }
}
