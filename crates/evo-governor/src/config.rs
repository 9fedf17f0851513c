//! Governor configuration
//!
//! A `GovernorConfig` is always complete and valid. Partial changes go
//! through `GovernorConfigUpdate`, whose present fields replace the current
//! ones; the named profiles are such updates applied over the defaults.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GovernorError, Result};

/// Rate limits, pacing and schedule for one governor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GovernorConfig {
    /// Successful sends allowed in any trailing 60 seconds
    pub per_minute: u32,
    /// Successful sends allowed in any trailing hour
    pub per_hour: u32,
    /// Successful sends allowed in any trailing 24 hours
    pub per_day: u32,
    /// Lower bound of the random pause before each send
    pub delay_min_secs: u64,
    /// Upper bound of the random pause before each send
    pub delay_max_secs: u64,
    /// Emit a typing indicator and wait before sending
    pub use_presence: bool,
    /// Check that the recipient exists before sending
    pub validate_recipient: bool,
    /// First hour of the day (local time) sends are allowed
    pub start_hour: u32,
    /// Last hour of the day (inclusive) sends are allowed
    pub end_hour: u32,
    pub allow_sunday: bool,
    /// Transport failures in a row that trigger the failure cooldown
    pub max_consecutive_failures: u32,
    /// Length of the failure cooldown
    pub failure_pause_secs: u64,
}

impl Default for GovernorConfig {
    fn default() -> Self {
        Self {
            per_minute: 2,
            per_hour: 50,
            per_day: 200,
            delay_min_secs: 3,
            delay_max_secs: 8,
            use_presence: true,
            validate_recipient: true,
            start_hour: 8,
            end_hour: 22,
            allow_sunday: false,
            max_consecutive_failures: 3,
            failure_pause_secs: 300,
        }
    }
}

impl GovernorConfig {
    /// Defaults with a profile applied
    pub fn from_profile(profile: Profile) -> Self {
        let mut config = Self::default();
        config.apply(&profile.update());
        config
    }

    /// Most restrictive preset, for numbers that were just activated
    pub fn new_number() -> Self {
        Self::from_profile(Profile::NewNumber)
    }

    pub fn established_number() -> Self {
        Self::from_profile(Profile::Established)
    }

    /// Verified business numbers; skips recipient validation
    pub fn business_number() -> Self {
        Self::from_profile(Profile::Business)
    }

    /// Check the invariants every config must hold
    pub fn validate(&self) -> Result<()> {
        if self.per_minute == 0 || self.per_hour == 0 || self.per_day == 0 {
            return Err(GovernorError::InvalidConfig(
                "rate limits must be positive".to_string(),
            ));
        }
        if self.delay_min_secs > self.delay_max_secs {
            return Err(GovernorError::InvalidConfig(format!(
                "delay_min_secs ({}) is greater than delay_max_secs ({})",
                self.delay_min_secs, self.delay_max_secs
            )));
        }
        if self.end_hour > 23 || self.start_hour > self.end_hour {
            return Err(GovernorError::InvalidConfig(format!(
                "invalid hour window {}..={}",
                self.start_hour, self.end_hour
            )));
        }
        if self.max_consecutive_failures == 0 {
            return Err(GovernorError::InvalidConfig(
                "max_consecutive_failures must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Merge an update into a copy of this config and validate the result
    pub fn merged(&self, update: &GovernorConfigUpdate) -> Result<Self> {
        let mut next = self.clone();
        next.apply(update);
        next.validate()?;
        Ok(next)
    }

    fn apply(&mut self, update: &GovernorConfigUpdate) {
        if let Some(v) = update.per_minute {
            self.per_minute = v;
        }
        if let Some(v) = update.per_hour {
            self.per_hour = v;
        }
        if let Some(v) = update.per_day {
            self.per_day = v;
        }
        if let Some(v) = update.delay_min_secs {
            self.delay_min_secs = v;
        }
        if let Some(v) = update.delay_max_secs {
            self.delay_max_secs = v;
        }
        if let Some(v) = update.use_presence {
            self.use_presence = v;
        }
        if let Some(v) = update.validate_recipient {
            self.validate_recipient = v;
        }
        if let Some(v) = update.start_hour {
            self.start_hour = v;
        }
        if let Some(v) = update.end_hour {
            self.end_hour = v;
        }
        if let Some(v) = update.allow_sunday {
            self.allow_sunday = v;
        }
        if let Some(v) = update.max_consecutive_failures {
            self.max_consecutive_failures = v;
        }
        if let Some(v) = update.failure_pause_secs {
            self.failure_pause_secs = v;
        }
    }
}

/// Partial configuration; `None` keeps the current value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GovernorConfigUpdate {
    pub per_minute: Option<u32>,
    pub per_hour: Option<u32>,
    pub per_day: Option<u32>,
    pub delay_min_secs: Option<u64>,
    pub delay_max_secs: Option<u64>,
    pub use_presence: Option<bool>,
    pub validate_recipient: Option<bool>,
    pub start_hour: Option<u32>,
    pub end_hour: Option<u32>,
    pub allow_sunday: Option<bool>,
    pub max_consecutive_failures: Option<u32>,
    pub failure_pause_secs: Option<u64>,
}

/// Named configuration presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Profile {
    NewNumber,
    Established,
    Business,
}

impl Profile {
    /// The fields this profile sets over the defaults
    pub fn update(self) -> GovernorConfigUpdate {
        match self {
            Profile::NewNumber => GovernorConfigUpdate {
                per_minute: Some(1),
                per_hour: Some(20),
                per_day: Some(50),
                delay_min_secs: Some(5),
                delay_max_secs: Some(10),
                use_presence: Some(true),
                validate_recipient: Some(true),
                max_consecutive_failures: Some(2),
                ..Default::default()
            },
            Profile::Established => GovernorConfigUpdate {
                per_minute: Some(3),
                per_hour: Some(100),
                per_day: Some(300),
                delay_min_secs: Some(2),
                delay_max_secs: Some(5),
                use_presence: Some(true),
                validate_recipient: Some(true),
                max_consecutive_failures: Some(3),
                ..Default::default()
            },
            Profile::Business => GovernorConfigUpdate {
                per_minute: Some(5),
                per_hour: Some(200),
                per_day: Some(500),
                delay_min_secs: Some(1),
                delay_max_secs: Some(3),
                use_presence: Some(true),
                validate_recipient: Some(false),
                max_consecutive_failures: Some(5),
                ..Default::default()
            },
        }
    }
}

impl FromStr for Profile {
    type Err = GovernorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "new-number" | "new" => Ok(Profile::NewNumber),
            "established" | "established-number" => Ok(Profile::Established),
            "business" | "business-number" => Ok(Profile::Business),
            other => Err(GovernorError::UnknownProfile(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = GovernorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.per_minute, 2);
        assert_eq!(config.failure_pause_secs, 300);
        assert_eq!((config.start_hour, config.end_hour), (8, 22));
    }

    #[test]
    fn test_profiles() {
        let new = GovernorConfig::new_number();
        assert_eq!((new.per_minute, new.per_hour, new.per_day), (1, 20, 50));
        assert_eq!((new.delay_min_secs, new.delay_max_secs), (5, 10));
        assert_eq!(new.max_consecutive_failures, 2);
        // Fields the profile leaves alone keep their defaults
        assert_eq!(new.failure_pause_secs, 300);

        let established = GovernorConfig::established_number();
        assert_eq!(
            (established.per_minute, established.per_hour, established.per_day),
            (3, 100, 300)
        );
        assert_eq!(established.max_consecutive_failures, 3);

        let business = GovernorConfig::business_number();
        assert_eq!((business.per_minute, business.per_hour), (5, 200));
        assert_eq!((business.delay_min_secs, business.delay_max_secs), (1, 3));
        assert!(!business.validate_recipient);
        assert_eq!(business.max_consecutive_failures, 5);
    }

    #[test]
    fn test_merge_overrides_only_given_fields() {
        let config = GovernorConfig::default();
        let merged = config
            .merged(&GovernorConfigUpdate {
                per_minute: Some(10),
                allow_sunday: Some(true),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(merged.per_minute, 10);
        assert!(merged.allow_sunday);
        assert_eq!(merged.per_hour, config.per_hour);
        assert_eq!(merged.delay_max_secs, config.delay_max_secs);
    }

    #[test]
    fn test_merge_rejects_invalid_result() {
        let config = GovernorConfig::default();
        let result = config.merged(&GovernorConfigUpdate {
            delay_min_secs: Some(20),
            ..Default::default()
        });
        assert!(matches!(result, Err(GovernorError::InvalidConfig(_))));

        let result = config.merged(&GovernorConfigUpdate {
            end_hour: Some(24),
            ..Default::default()
        });
        assert!(result.is_err());

        let result = config.merged(&GovernorConfigUpdate {
            per_day: Some(0),
            ..Default::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_profile_from_str() {
        assert_eq!("new-number".parse::<Profile>().unwrap(), Profile::NewNumber);
        assert_eq!("Established".parse::<Profile>().unwrap(), Profile::Established);
        assert_eq!("business_number".parse::<Profile>().unwrap(), Profile::Business);
        assert!("vip".parse::<Profile>().is_err());
    }
}
