// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use lcadash_app::{RouteScheme, Theme};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

const CONFIG_VERSION: i64 = 1;
const DEFAULT_THEME_POLL: &str = "200ms";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub version: i64,
    #[serde(default)]
    pub storage: Storage,
    #[serde(default)]
    pub routing: Routing,
    #[serde(default)]
    pub ui: Ui,
    #[serde(default)]
    pub logging: Logging,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            storage: Storage::default(),
            routing: Routing::default(),
            ui: Ui::default(),
            logging: Logging::default(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Storage {
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Routing {
    pub scheme: Option<String>,
    pub start: Option<String>,
}

impl Default for Routing {
    fn default() -> Self {
        Self {
            scheme: Some(RouteScheme::Hash.as_str().to_owned()),
            start: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Ui {
    pub theme: Option<String>,
    pub theme_poll: Option<String>,
}

impl Default for Ui {
    fn default() -> Self {
        Self {
            theme: Some(Theme::Dark.as_str().to_owned()),
            theme_poll: Some(DEFAULT_THEME_POLL.to_owned()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Logging {
    pub level: Option<String>,
    pub file: Option<String>,
}

impl Default for Logging {
    fn default() -> Self {
        Self {
            level: Some(DEFAULT_LOG_LEVEL.to_owned()),
            file: None,
        }
    }
}

impl Config {
    pub fn default_path() -> Result<PathBuf> {
        if let Some(path) = env::var_os("LCADASH_CONFIG_PATH") {
            return Ok(PathBuf::from(path));
        }

        let config_root = dirs::config_dir().ok_or_else(|| {
            anyhow!("cannot resolve config directory; set LCADASH_CONFIG_PATH to the config file")
        })?;

        let app_dir = config_root.join(lcadash_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create config directory {}", app_dir.display()))?;
        Ok(app_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("parse TOML config {}", path.display()))?;

        let version = value
            .get("version")
            .and_then(toml::Value::as_integer)
            .ok_or_else(|| {
                anyhow!(
                    "config file {} has no version. Add `version = 1` at the top; settings live under [storage], [routing], [ui], and [logging]",
                    path.display()
                )
            })?;

        if version != CONFIG_VERSION {
            bail!(
                "unsupported config version {} in {}; expected version = 1",
                version,
                path.display()
            );
        }

        let config: Config = value
            .try_into()
            .with_context(|| format!("decode config {}", path.display()))?;
        config.validate(path)?;
        Ok(config)
    }

    fn validate(&self, path: &Path) -> Result<()> {
        if let Some(db_path) = &self.storage.db_path {
            lcadash_db::validate_db_path(db_path)?;
        }

        if let Some(scheme) = &self.routing.scheme
            && RouteScheme::parse(scheme).is_none()
        {
            bail!(
                "routing.scheme in {} must be one of hash, query, path; got {scheme:?}",
                path.display()
            );
        }

        if let Some(theme) = &self.ui.theme
            && Theme::parse(theme).is_none()
        {
            bail!(
                "ui.theme in {} must be dark or light; got {theme:?}",
                path.display()
            );
        }

        if let Some(poll) = &self.ui.theme_poll {
            let parsed = parse_duration(poll)?;
            if parsed <= Duration::ZERO {
                bail!(
                    "ui.theme_poll in {} must be positive, got {}",
                    path.display(),
                    poll
                );
            }
        }

        if let Some(level) = &self.logging.level
            && level.parse::<Level>().is_err()
        {
            bail!(
                "logging.level in {} must be one of error, warn, info, debug, trace; got {level:?}",
                path.display()
            );
        }

        Ok(())
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        match &self.storage.db_path {
            Some(path) => Ok(PathBuf::from(path)),
            None => lcadash_db::default_db_path(),
        }
    }

    pub fn route_scheme(&self) -> RouteScheme {
        self.routing
            .scheme
            .as_deref()
            .and_then(RouteScheme::parse)
            .unwrap_or(RouteScheme::Hash)
    }

    pub fn start_address(&self) -> &str {
        self.routing.start.as_deref().unwrap_or("")
    }

    pub fn theme(&self) -> Theme {
        self.ui
            .theme
            .as_deref()
            .and_then(Theme::parse)
            .unwrap_or(Theme::Dark)
    }

    pub fn theme_poll(&self) -> Result<Duration> {
        parse_duration(self.ui.theme_poll.as_deref().unwrap_or(DEFAULT_THEME_POLL))
    }

    pub fn log_level(&self) -> Level {
        self.logging
            .level
            .as_deref()
            .and_then(|level| level.parse().ok())
            .unwrap_or(Level::INFO)
    }

    pub fn log_path(&self) -> Result<PathBuf> {
        if let Some(file) = &self.logging.file {
            return Ok(PathBuf::from(file));
        }

        let data_root = dirs::data_local_dir()
            .ok_or_else(|| anyhow!("cannot resolve data directory; set [logging].file"))?;
        let app_dir = data_root.join(lcadash_db::APP_NAME);
        fs::create_dir_all(&app_dir)
            .with_context(|| format!("create log directory {}", app_dir.display()))?;
        Ok(app_dir.join("lcadash.log"))
    }

    pub fn example_config(path: &Path) -> String {
        format!(
            "# lcadash config\n# Place this file at: {}\n\nversion = 1\n\n[storage]\n# Optional. Default is platform data dir (for example ~/.local/share/lcadash/lcadash.db)\n# db_path = \"/absolute/path/to/lcadash.db\"\n\n[routing]\n# hash (#page), query (?page=page) or path (/page)\nscheme = \"hash\"\n# start = \"#modeling/calculation-setup\"\n\n[ui]\ntheme = \"dark\"\ntheme_poll = \"{}\"\n\n[logging]\nlevel = \"{}\"\n# file = \"/absolute/path/to/lcadash.log\"\n",
            path.display(),
            DEFAULT_THEME_POLL,
            DEFAULT_LOG_LEVEL,
        )
    }
}

fn parse_duration(raw: &str) -> Result<Duration> {
    if let Some(value) = raw.strip_suffix("ms") {
        let millis: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_millis(millis));
    }
    if let Some(value) = raw.strip_suffix('s') {
        let secs: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        return Ok(Duration::from_secs(secs));
    }
    if let Some(value) = raw.strip_suffix('m') {
        let mins: u64 = value
            .parse()
            .with_context(|| format!("invalid duration {raw:?}"))?;
        let secs = mins
            .checked_mul(60)
            .ok_or_else(|| anyhow!("duration {raw:?} is too large"))?;
        return Ok(Duration::from_secs(secs));
    }

    bail!("invalid duration {raw:?}; use one of: <N>ms, <N>s, <N>m (for example 200ms or 1s)")
}
