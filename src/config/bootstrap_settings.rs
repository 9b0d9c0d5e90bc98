use std::fmt;
use std::sync::Arc;

use crate::config::EnvironmentProvider;
use crate::config::config_spec::ConfigSpec;
use crate::config::errors::ApplicationError;

/// Minimum length of the token signing secret
pub const MIN_JWT_SECRET_LENGTH: usize = 32;

/// Bootstrap settings for infrastructure configuration
pub struct BootstrapSettings {
    database_url: String,
    audit_database_url: String,
    server_host: String,
    server_port: u16,
    jwt_secret: String,
    password_pepper: String,
    audit_buffer_size: usize,
}

impl BootstrapSettings {
    /// Load bootstrap settings through the given environment provider
    ///
    /// `JWT_SECRET` and `PASSWORD_PEPPER` are required; everything else has a default.
    pub fn from_env_provider(env_provider: Arc<dyn EnvironmentProvider + Send + Sync>) -> Result<Self, ApplicationError> {
        let database_url = ConfigSpec::new(env_provider.clone())
            .env_override("DATABASE_URL")
            .default_value("sqlite://documents.db?mode=rwc")
            .min_length(1)
            .load_setting_with_source()?
            .value;

        let audit_database_url = ConfigSpec::new(env_provider.clone())
            .env_override("AUDIT_DATABASE_URL")
            .default_value("sqlite://audit.db?mode=rwc")
            .min_length(1)
            .load_setting_with_source()?
            .value;

        let server_host = ConfigSpec::new(env_provider.clone())
            .env_override("HOST")
            .default_value("0.0.0.0")
            .validator(ConfigSpec::validate_host_address)
            .load_setting_with_source()?
            .value;

        let port_value = ConfigSpec::new(env_provider.clone())
            .env_override("PORT")
            .default_value("3000")
            .validator(|value| ConfigSpec::validate_port_range(value, 1, 65535))
            .load_setting_with_source()?
            .value;
        let server_port = ConfigSpec::parse_port(&port_value, "PORT")?;

        let jwt_secret = ConfigSpec::new(env_provider.clone())
            .env_override("JWT_SECRET")
            .min_length(MIN_JWT_SECRET_LENGTH)
            .load_setting_with_source()?
            .value;

        let password_pepper = ConfigSpec::new(env_provider.clone())
            .env_override("PASSWORD_PEPPER")
            .min_length(1)
            .load_setting_with_source()?
            .value;

        let buffer_value = ConfigSpec::new(env_provider)
            .env_override("AUDIT_BUFFER_SIZE")
            .default_value("1000")
            .load_setting_with_source()?
            .value;
        let audit_buffer_size = ConfigSpec::parse_size(&buffer_value, "AUDIT_BUFFER_SIZE")?;

        Ok(Self {
            database_url,
            audit_database_url,
            server_host,
            server_port,
            jwt_secret,
            password_pepper,
            audit_buffer_size,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ApplicationError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }

    pub fn server_host(&self) -> &str {
        &self.server_host
    }

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn jwt_secret(&self) -> &str {
        &self.jwt_secret
    }

    pub fn password_pepper(&self) -> &str {
        &self.password_pepper
    }

    pub fn audit_buffer_size(&self) -> usize {
        self.audit_buffer_size
    }
}

impl fmt::Debug for BootstrapSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BootstrapSettings")
            .field("database_url", &self.database_url)
            .field("audit_database_url", &self.audit_database_url)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("jwt_secret", &"<redacted>")
            .field("password_pepper", &"<redacted>")
            .field("audit_buffer_size", &self.audit_buffer_size)
            .finish()
    }
}
