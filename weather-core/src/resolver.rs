use std::collections::HashMap;

use tracing::debug;

use crate::{
    config::{Arity, ConfigDocument},
    error::{Result, WeatherError},
};

/// Outcome of a lookup through the cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedParameter {
    Value(String),
    List(Vec<String>),
    Absent,
}

impl ResolvedParameter {
    pub fn is_absent(&self) -> bool {
        matches!(self, ResolvedParameter::Absent)
    }

    /// The value of a singleton variable.
    pub fn as_value(&self) -> Option<&str> {
        match self {
            ResolvedParameter::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Every value of a cumulative variable, or the single value otherwise.
    pub fn values(&self) -> &[String] {
        match self {
            ResolvedParameter::Value(v) => std::slice::from_ref(v),
            ResolvedParameter::List(vs) => vs,
            ResolvedParameter::Absent => &[],
        }
    }

    /// The most recently assigned value.
    pub fn last(&self) -> Option<&str> {
        self.values().last().map(String::as_str)
    }
}

/// Command-line supplied values, keyed by config variable name.
pub type ArgTable = HashMap<String, String>;

/// Merges command-line values, the config file and built-in defaults.
///
/// Precedence is non-empty command-line value, then config file, then default.
#[derive(Debug, Clone)]
pub struct Resolver {
    args: ArgTable,
    document: ConfigDocument,
    defaults: &'static [(&'static str, &'static str)],
}

impl Resolver {
    pub fn new(
        args: ArgTable,
        document: ConfigDocument,
        defaults: &'static [(&'static str, &'static str)],
    ) -> Self {
        Self { args, document, defaults }
    }

    pub fn resolve(&self, key: &str) -> ResolvedParameter {
        let cumulative = self.document.spec().is_cumulative(key);

        if let Some(value) = self.args.get(key).filter(|v| !v.is_empty()) {
            debug!(key, source = "command line", "resolved");
            return if cumulative {
                ResolvedParameter::List(vec![value.clone()])
            } else {
                ResolvedParameter::Value(value.clone())
            };
        }

        // An empty singleton in the file counts as unset.
        let from_file = self.document.get(key).and_then(|var| match var.arity {
            Arity::Cumulative => Some(ResolvedParameter::List(var.values().to_vec())),
            Arity::Singleton => var
                .values()
                .first()
                .filter(|v| !v.is_empty())
                .map(|v| ResolvedParameter::Value(v.clone())),
        });
        if let Some(found) = from_file {
            debug!(key, source = "config file", "resolved");
            return found;
        }

        match self.defaults.iter().find(|(name, _)| *name == key) {
            Some((_, value)) => {
                debug!(key, source = "default", "resolved");
                if cumulative {
                    ResolvedParameter::List(vec![(*value).to_string()])
                } else {
                    ResolvedParameter::Value((*value).to_string())
                }
            }
            None => ResolvedParameter::Absent,
        }
    }

    /// Like [`Resolver::resolve`] but an absent result is a lookup error.
    pub fn require(&self, key: &str, message: &str) -> Result<ResolvedParameter> {
        match self.resolve(key) {
            ResolvedParameter::Absent => Err(WeatherError::Lookup(message.to_string())),
            found => Ok(found),
        }
    }

    /// Whether a flag-like variable is switched on.
    pub fn is_enabled(&self, key: &str) -> bool {
        self.resolve(key)
            .last()
            .is_some_and(|v| !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "no" | "false" | "0"))
    }
}
