use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::errors::ApplicationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigValue {
    pub value: String,
    pub source: ConfigValueSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValueSource {
    EnvironmentVariable { name: String },
    Default,
}

/// Description of one configuration value with environment variable → default priority
pub struct ConfigSpec {
    env_provider: Arc<dyn EnvironmentProvider + Send + Sync>,
    env_override: Option<String>,
    default_value: Option<String>,
    min_length: Option<usize>,
    validator: Option<fn(&str) -> Result<(), String>>,
}

impl ConfigSpec {
    pub fn new(env_provider: Arc<dyn EnvironmentProvider + Send + Sync>) -> Self {
        Self {
            env_provider,
            env_override: None,
            default_value: None,
            min_length: None,
            validator: None,
        }
    }

    pub fn env_override(mut self, name: &str) -> Self {
        self.env_override = Some(name.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn min_length(mut self, length: usize) -> Self {
        self.min_length = Some(length);
        self
    }

    pub fn validator(mut self, f: fn(&str) -> Result<(), String>) -> Self {
        self.validator = Some(f);
        self
    }

    fn setting_name(&self) -> &str {
        self.env_override.as_deref().unwrap_or("setting")
    }

    /// Load a setting value with source tracking
    ///
    /// A set environment variable wins over the default. A setting with neither
    /// is a `MissingRequiredSetting` error.
    pub fn load_setting_with_source(&self) -> Result<ConfigValue, ApplicationError> {
        if let Some(env_var) = &self.env_override {
            if let Some(value) = self.env_provider.get_var(env_var) {
                self.validate_value(&value, env_var)?;

                return Ok(ConfigValue {
                    value,
                    source: ConfigValueSource::EnvironmentVariable { name: env_var.clone() },
                });
            }
        }

        match &self.default_value {
            Some(value) => {
                self.validate_value(value, self.setting_name())?;
                Ok(ConfigValue {
                    value: value.clone(),
                    source: ConfigValueSource::Default,
                })
            }
            None => Err(ApplicationError::MissingRequiredSetting {
                setting_name: self.setting_name().to_string(),
            }),
        }
    }

    /// Validate a setting value according to the ConfigSpec rules
    pub fn validate_value(&self, value: &str, setting_name: &str) -> Result<(), ApplicationError> {
        if let Some(min_len) = self.min_length {
            if value.len() < min_len {
                return Err(ApplicationError::InvalidSetting {
                    setting_name: setting_name.to_string(),
                    reason: format!("Value must be at least {} characters long", min_len),
                });
            }
        }

        if let Some(validator) = self.validator {
            validator(value).map_err(|reason| ApplicationError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason,
            })?;
        }

        Ok(())
    }
}

/// Type parsing utilities for configuration values
impl ConfigSpec {
    /// Parse a port number from string with validation
    ///
    /// # Returns
    /// * `Ok(u16)` - Parsed port number
    /// * `Err(ApplicationError)` - Parse error or validation error
    pub fn parse_port(value: &str, setting_name: &str) -> Result<u16, ApplicationError> {
        let port = value.trim().parse::<u16>()
            .map_err(|e| ApplicationError::ParseError {
                setting_name: setting_name.to_string(),
                error: format!("Expected port number (1-65535), got '{}': {}", value, e),
            })?;

        if port == 0 {
            return Err(ApplicationError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason: "Port number must be between 1 and 65535".to_string(),
            });
        }

        Ok(port)
    }

    /// Parse a positive size (buffer lengths and similar)
    pub fn parse_size(value: &str, setting_name: &str) -> Result<usize, ApplicationError> {
        let size = value.trim().parse::<usize>()
            .map_err(|e| ApplicationError::ParseError {
                setting_name: setting_name.to_string(),
                error: format!("Expected positive integer, got '{}': {}", value, e),
            })?;

        if size == 0 {
            return Err(ApplicationError::InvalidSetting {
                setting_name: setting_name.to_string(),
                reason: "Value must be greater than 0".to_string(),
            });
        }

        Ok(size)
    }
}

/// Validation functions for use with ConfigSpec::validator
impl ConfigSpec {
    pub fn validate_port_range(value: &str, min: u16, max: u16) -> Result<(), String> {
        let parsed = value.parse::<u16>()
            .map_err(|_| format!("Expected port number between {} and {}", min, max))?;

        if parsed < min || parsed > max {
            return Err(format!("Port {} is outside valid range {}-{}", parsed, min, max));
        }

        Ok(())
    }

    /// Validate a host address (IPv4, IPv6 or hostname)
    ///
    /// Checks format only; no DNS resolution.
    pub fn validate_host_address(value: &str) -> Result<(), String> {
        if value.is_empty() {
            return Err("Host address cannot be empty".to_string());
        }

        if value.contains(':') {
            let bare = value.trim_start_matches('[').trim_end_matches(']');
            return bare
                .parse::<std::net::Ipv6Addr>()
                .map(|_| ())
                .map_err(|_| "Invalid IPv6 address format".to_string());
        }

        let parts: Vec<&str> = value.split('.').collect();
        if parts.len() == 4 && parts.iter().all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())) {
            return value
                .parse::<std::net::Ipv4Addr>()
                .map(|_| ())
                .map_err(|_| format!("Invalid IPv4 address: '{}'", value));
        }

        if value.chars().any(char::is_whitespace) {
            return Err("Host address cannot contain whitespace characters".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockEnvironment;

    #[test]
    fn test_env_value_wins_over_default() {
        let env = Arc::new(MockEnvironment::empty().with_var("PORT", "8080"));

        let value = ConfigSpec::new(env)
            .env_override("PORT")
            .default_value("3000")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "8080");
        assert_eq!(
            value.source,
            ConfigValueSource::EnvironmentVariable { name: "PORT".to_string() }
        );
    }

    #[test]
    fn test_default_used_when_env_missing() {
        let value = ConfigSpec::new(Arc::new(MockEnvironment::empty()))
            .env_override("PORT")
            .default_value("3000")
            .load_setting_with_source()
            .unwrap();

        assert_eq!(value.value, "3000");
        assert_eq!(value.source, ConfigValueSource::Default);
    }

    #[test]
    fn test_missing_required_setting() {
        let result = ConfigSpec::new(Arc::new(MockEnvironment::empty()))
            .env_override("JWT_SECRET")
            .load_setting_with_source();

        assert!(matches!(
            result,
            Err(ApplicationError::MissingRequiredSetting { setting_name }) if setting_name == "JWT_SECRET"
        ));
    }

    #[test]
    fn test_min_length_is_enforced() {
        let env = Arc::new(MockEnvironment::empty().with_var("JWT_SECRET", "short"));

        let result = ConfigSpec::new(env)
            .env_override("JWT_SECRET")
            .min_length(32)
            .load_setting_with_source();

        assert!(matches!(result, Err(ApplicationError::InvalidSetting { .. })));
    }

    #[test]
    fn test_parse_port() {
        assert_eq!(ConfigSpec::parse_port("8080", "PORT").unwrap(), 8080);
        assert!(ConfigSpec::parse_port("0", "PORT").is_err());
        assert!(ConfigSpec::parse_port("70000", "PORT").is_err());
    }

    #[test]
    fn test_parse_size() {
        assert_eq!(ConfigSpec::parse_size("1000", "AUDIT_BUFFER_SIZE").unwrap(), 1000);
        assert!(ConfigSpec::parse_size("0", "AUDIT_BUFFER_SIZE").is_err());
        assert!(ConfigSpec::parse_size("lots", "AUDIT_BUFFER_SIZE").is_err());
    }

    #[test]
    fn test_validate_host_address() {
        assert!(ConfigSpec::validate_host_address("0.0.0.0").is_ok());
        assert!(ConfigSpec::validate_host_address("localhost").is_ok());
        assert!(ConfigSpec::validate_host_address("::1").is_ok());
        assert!(ConfigSpec::validate_host_address("256.1.1.1").is_err());
        assert!(ConfigSpec::validate_host_address("bad host").is_err());
        assert!(ConfigSpec::validate_host_address("").is_err());
    }
}
