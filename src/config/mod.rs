use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parse::{DirPath, NotFoundPath, ParseError};
use crate::waker::{WakeOptions, DEFAULT_BROADCAST, DEFAULT_PORT};

#[cfg(not(feature = "log"))]
use crate::debug;
#[cfg(feature = "log")]
use log::debug;

pub static CONFIG_FOLDER: &str = ".config/wol";
pub static DATABASE_FILE: &str = "aliases.json";
pub static CONFIG_SEARCH_FILE: [&str; 4] = [
    "config.yaml",
    "config.yml",
    "config.toml",
    "config.json",
];

/// Optional defaults, overridden by the command line.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub broadcast: Option<String>,
    pub port: Option<u16>,
    pub database: Option<PathBuf>,
}

impl Config {
    pub fn folder(home: &Path) -> PathBuf {
        home.join(CONFIG_FOLDER)
    }

    pub fn default_database(home: &Path) -> PathBuf {
        Self::folder(home).join(DATABASE_FILE)
    }

    /// First existing config file under `~/.config/wol`, if any.
    pub fn search(home: &Path) -> Option<PathBuf> {
        let folder = Self::folder(home);
        CONFIG_SEARCH_FILE
            .iter()
            .map(|f| folder.join(f))
            .find(|p| p.is_file())
    }

    /// Looks for a config in the default location. Not having one is fine.
    pub fn load_default(home: &Path) -> Result<Config, ParseError> {
        match Self::search(home) {
            Some(p) => {
                debug!("using configuration {:?}", p);
                Config::try_from(p.as_path())
            }
            None => {
                debug!("no configuration found, using defaults");
                Ok(Config::default())
            }
        }
    }

    pub fn database_path(&self, home: &Path) -> PathBuf {
        match &self.database {
            Some(p) => p.clone(),
            None => Self::default_database(home),
        }
    }

    /// Layers command line values over this config and the built-in defaults.
    pub fn wake_options(
        &self,
        interface: Option<String>,
        broadcast: Option<String>,
        port: Option<u16>,
    ) -> WakeOptions {
        WakeOptions {
            interface: interface.filter(|i| !i.is_empty()),
            broadcast: broadcast
                .or_else(|| self.broadcast.clone())
                .unwrap_or_else(|| DEFAULT_BROADCAST.to_owned()),
            port: port.or(self.port).unwrap_or(DEFAULT_PORT),
        }
    }
}

impl<'a> TryFrom<&'a Path> for Config {
    type Error = ParseError;

    fn try_from(value: &'a Path) -> Result<Self, Self::Error> {
        let display = value.to_string_lossy().into_owned();
        if !value.exists() {
            return Err(ParseError::from(NotFoundPath::from(display)));
        }
        if value.is_dir() {
            return Err(ParseError::from(DirPath::from(display)));
        }
        let content = read_to_string(value)?;
        if display.ends_with(".yml") || display.ends_with(".yaml") {
            Ok(serde_yml::from_str(&content)?)
        } else if display.ends_with(".toml") {
            Ok(toml::from_str(&content)?)
        } else {
            Ok(serde_json::from_str(&content)?)
        }
    }
}

impl<'a> TryFrom<&'a str> for Config {
    type Error = ParseError;

    fn try_from(value: &'a str) -> Result<Self, Self::Error> {
        Self::try_from(Path::new(value))
    }
}
