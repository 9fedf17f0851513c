//! Settings loading
//!
//! Settings are resolved in this order:
//! 1. environment variables
//! 2. the `evolution.toml` file
//! 3. defaults
//!
//! Inside the file, `${VAR_NAME}` is expanded from the environment.

use std::path::Path;
use std::str::FromStr;

use evo_governor::{GovernorConfig, GovernorConfigUpdate, Profile};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{EvolutionError, Result};

/// Settings file looked up by [`Settings::load`]
pub const CONFIG_FILE: &str = "evolution.toml";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Gateway connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Gateway root, without trailing `/`
    pub base_url: String,

    /// Global API key sent as the `apikey` header
    pub api_key: String,

    /// Instance name used in instance-scoped endpoints
    pub instance: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl ApiSettings {
    pub fn new(base_url: &str, api_key: &str, instance: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            instance: instance.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let missing: Vec<&str> = [
            ("base_url", &self.base_url),
            ("api_key", &self.api_key),
            ("instance", &self.instance),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if !missing.is_empty() {
            return Err(EvolutionError::Config(format!(
                "missing API settings: {}",
                missing.join(", ")
            )));
        }
        if self.timeout_secs == 0 {
            return Err(EvolutionError::Config("timeout_secs must be > 0".to_string()));
        }
        Ok(())
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

/// Complete settings: gateway access plus governor limits
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub governor: GovernorConfig,
}

/// TOML layout of `evolution.toml`
#[derive(Debug, Default, Deserialize)]
struct TomlSettings {
    #[serde(default)]
    api: TomlApiSettings,
    #[serde(default)]
    governor: TomlGovernorSettings,
}

#[derive(Debug, Default, Deserialize)]
struct TomlApiSettings {
    base_url: Option<String>,
    api_key: Option<String>,
    instance: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct TomlGovernorSettings {
    profile: Option<Profile>,
    #[serde(flatten)]
    overrides: GovernorConfigUpdate,
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

impl Settings {
    /// Load from the default location
    ///
    /// Reads `.env` if present, then `./evolution.toml` with environment
    /// overrides, falling back to the environment alone.
    pub fn load() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!(path = %path.display(), "Loaded .env");
        }

        if Path::new(CONFIG_FILE).exists() {
            return Self::from_toml_file(CONFIG_FILE);
        }

        Self::from_env()
    }

    /// Load a TOML file, apply environment overrides and validate
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            EvolutionError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let settings = Self::layered(&content, env_lookup)?;
        settings.api.validate()?;
        Ok(settings)
    }

    /// Parse TOML content with `${VAR}` expansion. No environment overrides
    /// are applied and API settings may still be incomplete.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Self::parse_toml(content, &env_lookup, None)
    }

    /// Build from environment variables only
    pub fn from_env() -> Result<Self> {
        let mut settings = Self::default();
        settings.apply_overrides(env_lookup)?;
        settings.api.validate()?;
        Ok(settings)
    }

    /// Apply `EVOLUTION_*` and `GOVERNOR_*` variables on top of these settings
    ///
    /// `GOVERNOR_PROFILE` is applied first and resets every field the
    /// profile covers, then the individual `GOVERNOR_*` fields.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(env_lookup)
    }

    /// File settings layered as: defaults, profile, `[governor]` fields,
    /// environment fields. `GOVERNOR_PROFILE` replaces the file's profile
    /// instead of overriding its fields.
    fn layered<F>(content: &str, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = env_profile(&lookup)?;
        let mut settings = Self::parse_toml(content, &lookup, profile)?;
        settings.apply_field_overrides(&lookup)?;
        Ok(settings)
    }

    fn parse_toml<F>(content: &str, lookup: &F, profile: Option<Profile>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, lookup);
        let file: TomlSettings = toml::from_str(&expanded)
            .map_err(|e| EvolutionError::Config(format!("invalid settings file: {}", e)))?;

        let mut api = ApiSettings::default();
        if let Some(base_url) = file.api.base_url {
            api.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = file.api.api_key {
            api.api_key = api_key;
        }
        if let Some(instance) = file.api.instance {
            api.instance = instance;
        }
        if let Some(timeout) = file.api.timeout_secs {
            api.timeout_secs = timeout;
        }

        let mut governor = GovernorConfig::default();
        if let Some(profile) = profile.or(file.governor.profile) {
            governor = governor.merged(&profile.update())?;
        }
        governor = governor.merged(&file.governor.overrides)?;

        Ok(Self { api, governor })
    }

    fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(profile) = env_profile(&lookup)? {
            self.governor = self.governor.merged(&profile.update())?;
        }
        self.apply_field_overrides(&lookup)
    }

    fn apply_field_overrides<F>(&mut self, lookup: &F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        // API
        if let Some(base_url) = non_empty("EVOLUTION_BASE_URL") {
            self.api.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_key) = non_empty("EVOLUTION_API_KEY") {
            self.api.api_key = api_key;
        }
        if let Some(instance) = non_empty("EVOLUTION_INSTANCE") {
            self.api.instance = instance;
        }
        if let Some(timeout) = parse_var(&non_empty, "EVOLUTION_TIMEOUT") {
            self.api.timeout_secs = timeout;
        }

        // Governor
        let update = GovernorConfigUpdate {
            per_minute: parse_var(&non_empty, "GOVERNOR_PER_MINUTE"),
            per_hour: parse_var(&non_empty, "GOVERNOR_PER_HOUR"),
            per_day: parse_var(&non_empty, "GOVERNOR_PER_DAY"),
            delay_min_secs: parse_var(&non_empty, "GOVERNOR_DELAY_MIN"),
            delay_max_secs: parse_var(&non_empty, "GOVERNOR_DELAY_MAX"),
            start_hour: parse_var(&non_empty, "GOVERNOR_START_HOUR"),
            end_hour: parse_var(&non_empty, "GOVERNOR_END_HOUR"),
            allow_sunday: non_empty("GOVERNOR_ALLOW_SUNDAY").map(|v| parse_flag(&v)),
            ..Default::default()
        };
        self.governor = self.governor.merged(&update)?;

        Ok(())
    }
}

fn env_profile<F>(lookup: &F) -> Result<Option<Profile>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup("GOVERNOR_PROFILE").filter(|v| !v.trim().is_empty()) {
        Some(name) => Ok(Some(Profile::from_str(&name)?)),
        None => Ok(None),
    }
}

/// Parse a numeric variable; unparsable values are ignored with a warning
fn parse_var<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "Ignoring unparsable setting");
            None
        }
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Expand `${VAR}` references; unknown variables become the empty string
fn expand_env_vars<F>(value: &str, lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(value.len());
    let mut chars = value.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next();

            let mut var_name = String::new();
            for c in chars.by_ref() {
                if c == '}' {
                    break;
                }
                var_name.push(c);
            }

            if let Some(env_value) = lookup(&var_name) {
                result.push_str(&env_value);
            }
        } else {
            result.push(c);
        }
    }

    result
}
