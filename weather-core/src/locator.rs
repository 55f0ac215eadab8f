//! Selection of the configuration file for a run.

use std::{
    env,
    path::{Path, PathBuf},
};

use directories::BaseDirs;
use tracing::{debug, warn};

use crate::error::{Result, WeatherError};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "TERMINAL_WEATHER_CF";

const APP_DIR: &str = "terminal-weather";

/// The slice of the process environment the locator looks at.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    pub config_file: Option<PathBuf>,
    pub xdg_config_home: Option<PathBuf>,
    pub home: Option<PathBuf>,
}

impl Environment {
    pub fn from_process() -> Self {
        let var = |name: &str| env::var_os(name).filter(|v| !v.is_empty()).map(PathBuf::from);

        Self {
            config_file: var(CONFIG_ENV),
            xdg_config_home: var("XDG_CONFIG_HOME"),
            home: var("HOME").or_else(|| BaseDirs::new().map(|d| d.home_dir().to_path_buf())),
        }
    }

    /// Candidate paths in priority order, after the explicit command-line path.
    fn candidates(&self) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(4);

        if let Some(path) = &self.config_file {
            out.push(path.clone());
        }
        if let Some(xdg) = &self.xdg_config_home {
            out.push(xdg.join(APP_DIR).join("conf"));
        }
        if let Some(home) = &self.home {
            out.push(home.join(".config").join(APP_DIR).join("conf"));
            out.push(home.join(".terminal-weather"));
        }

        out
    }
}

/// Pick the configuration file: the first candidate that is an existing
/// regular file wins.
///
/// The returned path is the one any later write-back must use.
pub fn locate(cli_path: Option<&Path>, env: &Environment) -> Result<PathBuf> {
    let explicit = cli_path.map(Path::to_path_buf);

    for (idx, candidate) in explicit.iter().cloned().chain(env.candidates()).enumerate() {
        if candidate.is_file() {
            debug!(path = %candidate.display(), "using configuration file");
            return Ok(candidate);
        }

        let is_explicit = (idx == 0 && explicit.is_some())
            || env.config_file.as_ref() == Some(&candidate);
        if is_explicit {
            warn!(path = %candidate.display(), "configuration file does not exist, skipping");
        }
    }

    Err(WeatherError::Locate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn nothing_found_is_a_locate_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = Environment {
            home: Some(dir.path().to_path_buf()),
            ..Environment::default()
        };

        let err = locate(None, &env).unwrap_err();
        assert!(matches!(err, WeatherError::Locate));
        assert_eq!(err.to_string(), "unable to locate configuration file");
    }

    #[test]
    fn priority_chain_is_respected() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let mut env = Environment {
            home: Some(root.join("home")),
            xdg_config_home: Some(root.join("xdg")),
            config_file: Some(root.join("env_conf")),
        };

        let dotfile = root.join("home/.terminal-weather");
        touch(&dotfile);
        assert_eq!(locate(None, &env).unwrap(), dotfile);

        let home_conf = root.join("home/.config/terminal-weather/conf");
        touch(&home_conf);
        assert_eq!(locate(None, &env).unwrap(), home_conf);

        let xdg_conf = root.join("xdg/terminal-weather/conf");
        touch(&xdg_conf);
        assert_eq!(locate(None, &env).unwrap(), xdg_conf);

        let env_conf = root.join("env_conf");
        touch(&env_conf);
        assert_eq!(locate(None, &env).unwrap(), env_conf);

        let cli_conf = root.join("cli_conf");
        touch(&cli_conf);
        assert_eq!(locate(Some(&cli_conf), &env).unwrap(), cli_conf);

        env.config_file = None;
        assert_eq!(locate(None, &env).unwrap(), xdg_conf);
    }

    #[test]
    fn directories_and_missing_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("xdg/terminal-weather/conf")).unwrap();
        let dotfile = root.join(".terminal-weather");
        touch(&dotfile);

        let env = Environment {
            home: Some(root.to_path_buf()),
            xdg_config_home: Some(root.join("xdg")),
            config_file: Some(root.join("does-not-exist")),
        };

        let missing = root.join("also-missing");
        assert_eq!(locate(Some(&missing), &env).unwrap(), dotfile);
    }
}
