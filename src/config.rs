/*
 *  config.rs
 *
 *  StatScreen - system stats at a glance
 *  (c) 2020-26 Stuart Hunter
 *
 *  Options file loading, CLI overrides and typed settings
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::deutils::{describe, value_as_bool, value_as_i64, value_as_string};
use crate::registry::ScreenKind;

/// Fallback when neither a per-screen nor a default duration is configured.
pub const DEFAULT_DURATION_SECS: u64 = 10;
pub const DEFAULT_GRACEFUL_EXIT_TEXT: &str = "Goodbye";
pub const DEFAULT_SCREENSHOT_DIR: &str = "./img/examples/";
pub const DEFAULT_I2C_BUS: u8 = 1;
pub const DEFAULT_I2C_ADDRESS: u8 = 0x3C;

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("option '{key}' has malformed value '{value}', expected {expected}")]
    Malformed {
        key: String,
        value: String,
        expected: &'static str,
    },
}

/// CLI overrides. Options that mirror file settings are `Option`s so they
/// only win when given.
#[derive(Debug, Parser, Clone, Default)]
#[command(name = "statscreen", about = "System stats on a small OLED", version)]
pub struct Cli {
    /// Path to an options file, JSON or YAML (overrides search)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// Enable debug logging
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub debug: bool,
    /// Render to an in-memory panel instead of I2C hardware
    #[arg(long, action = ArgAction::SetTrue)]
    pub headless: bool,
    /// I2C bus number, e.g. 1 for /dev/i2c-1
    #[arg(long)]
    pub i2c_bus: Option<u8>,
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// dump the merged options and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
    /// Render a single screen once instead of rotating, e.g. `--screen cpu`
    #[arg(long)]
    pub screen: Option<ScreenKind>,
}

/// Flat option lookup. Keys are lower-cased on the way in and `null`
/// values count as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(BTreeMap<String, Value>);

impl Options {
    pub fn from_map<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        Options(
            entries
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k.as_ref().to_lowercase(), v))
                .collect(),
        )
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let map: BTreeMap<String, Value> = serde_json::from_str(s)?;
        Ok(Self::from_map(map))
    }

    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        // an empty document deserializes to unit, treat it as no options
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        let map: BTreeMap<String, Value> = serde_yaml::from_str(s)?;
        Ok(Self::from_map(map))
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        if value.is_null() {
            self.0.remove(&key.to_lowercase());
        } else {
            self.0.insert(key.to_lowercase(), value);
        }
    }

    pub fn raw(&self, key: &str) -> Option<&Value> {
        self.0.get(&key.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get_str(&self, key: &str) -> Option<String> {
        self.raw(key).and_then(value_as_string)
    }

    pub fn get_bool(&self, key: &str) -> Result<Option<bool>, ConfigError> {
        self.coerce(key, "a boolean", value_as_bool)
    }

    pub fn get_int(&self, key: &str) -> Result<Option<i64>, ConfigError> {
        self.coerce(key, "an integer", value_as_i64)
    }

    /// Non-negative integer, rejecting anything below zero.
    pub fn get_count(&self, key: &str) -> Result<Option<u64>, ConfigError> {
        match self.get_int(key)? {
            Some(n) if n < 0 => Err(self.malformed(key, "a non-negative integer")),
            Some(n) => Ok(Some(n as u64)),
            None => Ok(None),
        }
    }

    fn coerce<T>(
        &self,
        key: &str,
        expected: &'static str,
        f: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>, ConfigError> {
        match self.raw(key) {
            None => Ok(None),
            Some(v) => f(v).map(Some).ok_or_else(|| self.malformed(key, expected)),
        }
    }

    fn malformed(&self, key: &str, expected: &'static str) -> ConfigError {
        ConfigError::Malformed {
            key: key.to_lowercase(),
            value: self.raw(key).map(describe).unwrap_or_default(),
            expected,
        }
    }
}

/// Screen-scoped option names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenOption {
    Show,
    Limit,
    Duration,
}

impl ScreenOption {
    pub fn key(self, screen: ScreenKind) -> String {
        match self {
            ScreenOption::Show => format!("show_{}_screen", screen.as_str()),
            ScreenOption::Limit => format!("{}_screen_limit", screen.as_str()),
            ScreenOption::Duration => format!("{}_screen_duration", screen.as_str()),
        }
    }
}

/// Resolved per-screen options, validated once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenSettings {
    /// `None` when the show option is absent
    pub show: Option<bool>,
    /// `None` when the limit option is absent
    pub limit: Option<u32>,
    pub duration_secs: u64,
}

impl ScreenSettings {
    pub fn resolve(
        screen: ScreenKind,
        options: &Options,
        default_duration: u64,
    ) -> Result<Self, ConfigError> {
        let show = options.get_bool(&ScreenOption::Show.key(screen))?;

        let limit_key = ScreenOption::Limit.key(screen);
        let limit = match options.get_count(&limit_key)? {
            Some(n) => Some(
                u32::try_from(n).map_err(|_| options.malformed(&limit_key, "a limit below 2^32"))?,
            ),
            None => None,
        };

        let duration_secs = options
            .get_count(&ScreenOption::Duration.key(screen))?
            .unwrap_or(default_duration);

        Ok(Self { show, limit, duration_secs })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "C" => Some(TemperatureUnit::Celsius),
            "F" => Some(TemperatureUnit::Fahrenheit),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn from_celsius(self, celsius: f64) -> f64 {
        match self {
            TemperatureUnit::Celsius => celsius,
            TemperatureUnit::Fahrenheit => celsius * 9.0 / 5.0 + 32.0,
        }
    }
}

/// Panel wiring and presentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplaySettings {
    pub i2c_bus: u8,
    pub address: u8,
    pub width: u32,
    pub height: u32,
    pub rotate_180: bool,
    pub screenshot_dir: Option<PathBuf>,
    pub show_icons: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            i2c_bus: DEFAULT_I2C_BUS,
            address: DEFAULT_I2C_ADDRESS,
            width: 128,
            height: 32,
            rotate_180: false,
            screenshot_dir: None,
            show_icons: true,
        }
    }
}

impl DisplaySettings {
    pub fn i2c_path(&self) -> String {
        format!("/dev/i2c-{}", self.i2c_bus)
    }
}

/// Everything outside the screen registry, resolved from the options.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub default_duration: u64,
    pub scroll_amplitude: i32,
    pub welcome_text: Option<String>,
    pub static_text: Option<String>,
    pub static_noscroll: bool,
    pub graceful_exit_text: String,
    pub temperature_unit: TemperatureUnit,
    pub display: DisplaySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_duration: DEFAULT_DURATION_SECS,
            scroll_amplitude: 0,
            welcome_text: None,
            static_text: None,
            static_noscroll: false,
            graceful_exit_text: DEFAULT_GRACEFUL_EXIT_TEXT.to_string(),
            temperature_unit: TemperatureUnit::Celsius,
            display: DisplaySettings::default(),
        }
    }
}

impl Settings {
    pub fn from_options(options: &Options) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();

        if let Some(d) = options.get_count("default_duration")? {
            settings.default_duration = d;
        }

        if let Some(a) = options.get_count("scroll_amplitude")? {
            settings.scroll_amplitude = i32::try_from(a)
                .map_err(|_| options.malformed("scroll_amplitude", "a small amplitude"))?;
        }

        settings.welcome_text = non_empty(options.get_str("welcome_screen_text"));
        settings.static_text = non_empty(options.get_str("static_screen_text"));
        settings.static_noscroll = options.get_bool("static_screen_text_noscroll")?.unwrap_or(false);

        if let Some(text) = non_empty(options.get_str("graceful_exit_text")) {
            settings.graceful_exit_text = text;
        }

        if let Some(unit) = options.get_str("temperature_unit") {
            match TemperatureUnit::parse(&unit) {
                Some(u) => settings.temperature_unit = u,
                None => warn!("Unknown temperature unit '{}', using C", unit),
            }
        }

        settings.display = Self::display_from_options(options)?;
        Ok(settings)
    }

    fn display_from_options(options: &Options) -> Result<DisplaySettings, ConfigError> {
        let mut display = DisplaySettings::default();

        if let Some(bus) = options.get_count("i2c_bus")? {
            display.i2c_bus = u8::try_from(bus)
                .map_err(|_| options.malformed("i2c_bus", "a bus number 0-255"))?;
        }

        // rotate accepts a flag or the angle itself
        if let Some(v) = options.raw("rotate") {
            display.rotate_180 = match (value_as_bool(v), value_as_i64(v)) {
                (Some(b), _) => b,
                (None, Some(180)) => true,
                _ => return Err(options.malformed("rotate", "a boolean, 0 or 180")),
            };
        }

        // screenshot accepts a flag or a target directory
        if let Some(v) = options.raw("screenshot") {
            display.screenshot_dir = match value_as_bool(v) {
                Some(true) => Some(PathBuf::from(DEFAULT_SCREENSHOT_DIR)),
                Some(false) => None,
                None => value_as_string(v).filter(|s| !s.is_empty()).map(PathBuf::from),
            };
        }

        if let Some(icons) = options.get_bool("show_icons")? {
            display.show_icons = icons;
        }

        Ok(display)
    }

    pub fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(bus) = cli.i2c_bus { self.display.i2c_bus = bus; }
        if let Some(w) = cli.width     { self.display.width = w; }
        if let Some(h) = cli.height    { self.display.height = h; }
    }

    /// Put any invariants here (ranges etc.)
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.display.width, self.display.height) {
            (128, 32) | (128, 64) => Ok(()),
            (w, h) => Err(ConfigError::Validation(format!(
                "unsupported panel size {}x{}, expected 128x32 or 128x64",
                w, h
            ))),
        }
    }
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|t| !t.trim().is_empty())
}

/// Read options: the explicit path if given, otherwise the first file found
/// on the search path, otherwise nothing (all defaults).
pub fn load(cli: &Cli) -> Result<Options, ConfigError> {
    if let Some(p) = cli.config.as_ref() {
        if !p.exists() {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
        return read_options(p);
    }

    match find_config_file() {
        Some(p) => read_options(&p),
        None => {
            info!("No options file found, using defaults");
            Ok(Options::default())
        }
    }
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // add-on layout first
    for candidate in &["options.json", "/data/options.json"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    if let Some(home) = home_dir() {
        let p = home.join(".config/statscreen/config.yaml");
        if p.exists() { return Some(p) }
    }
    let p = PathBuf::from("statscreen.yaml");
    if p.exists() { return Some(p) }
    None
}

pub fn read_options(path: &Path) -> Result<Options, ConfigError> {
    info!("Loading config: {}", path.display());
    let s = fs::read_to_string(path)?;
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml") | Some("yml") => Options::from_yaml_str(&s),
        _ => Options::from_json_str(&s),
    }
}
