//! Service configuration
//!
//! Configuration is read from environment variables (a `.env` file is loaded
//! by `main` before this runs) with fallback to development defaults. The
//! store connection string has no fallback and must be provided when the
//! MongoDB backend is selected.

use std::path::PathBuf;
use std::time::Duration;

/// Database name used when neither `MONGODB_DATABASE` nor the URI names one.
pub const DEFAULT_DATABASE: &str = "pharmacyDB";

/// Page directory, relative to the working directory, unless `FRONTEND_DIR`
/// overrides it.
pub const DEFAULT_FRONTEND_DIR: &str = "frontend";

/// Which record store adapter the service runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Mongo,
    Memory,
}

/// Store connection settings.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub backend: StoreBackend,

    /// MongoDB connection string. `None` only for the memory backend.
    pub uri: Option<String>,

    /// Explicit database name; the URI's default database is used otherwise.
    pub database: Option<String>,

    /// Server selection and connect timeout.
    pub connect_timeout: Duration,

    /// Keep serving (pages, health) when the store cannot be reached.
    pub start_without_store: bool,
}

/// Credentials accepted by the login endpoint.
#[derive(Clone)]
pub struct AuthConfig {
    pub username: String,
    pub password: String,
    pub token: String,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: "admin".to_string(),
            password: "admin123".to_string(),
            token: "demo_jwt_token_admin_2024".to_string(),
        }
    }
}

/// Top-level service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTTP listen port
    pub port: u16,

    pub store: StoreConfig,

    pub auth: AuthConfig,

    /// Directory holding the HTML pages.
    pub frontend_dir: PathBuf,

    /// Include error details in 500 responses.
    pub expose_error_details: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            store: StoreConfig {
                backend: StoreBackend::Memory,
                uri: None,
                database: None,
                connect_timeout: Duration::from_millis(30_000),
                start_without_store: false,
            },
            auth: AuthConfig::default(),
            frontend_dir: PathBuf::from(DEFAULT_FRONTEND_DIR),
            expose_error_details: false,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue("PORT".to_string()))?,
            None => 3000,
        };

        let backend = match var("STORE_BACKEND").as_deref().map(str::trim) {
            None | Some("mongo") | Some("mongodb") => StoreBackend::Mongo,
            Some("memory") => StoreBackend::Memory,
            Some(_) => return Err(ConfigError::InvalidValue("STORE_BACKEND".to_string())),
        };

        let uri = var("MONGODB_URI");
        if backend == StoreBackend::Mongo && uri.is_none() {
            return Err(ConfigError::MissingRequired("MONGODB_URI".to_string()));
        }

        let connect_timeout = match var("STORE_CONNECT_TIMEOUT_MS") {
            Some(raw) => Duration::from_millis(raw.trim().parse().map_err(|_| {
                ConfigError::InvalidValue("STORE_CONNECT_TIMEOUT_MS".to_string())
            })?),
            None => Duration::from_millis(30_000),
        };

        let start_without_store = parse_flag(var("START_WITHOUT_STORE"), "START_WITHOUT_STORE")?;

        let defaults = AuthConfig::default();
        let auth = AuthConfig {
            username: var("ADMIN_USERNAME").unwrap_or(defaults.username),
            password: var("ADMIN_PASSWORD").unwrap_or(defaults.password),
            token: var("ADMIN_TOKEN").unwrap_or(defaults.token),
        };

        let expose_error_details = var("APP_ENV")
            .map(|env| env.trim().eq_ignore_ascii_case("development"))
            .unwrap_or(false);

        Ok(Self {
            port,
            store: StoreConfig {
                backend,
                uri,
                database: var("MONGODB_DATABASE"),
                connect_timeout,
                start_without_store,
            },
            auth,
            frontend_dir: PathBuf::from(
                var("FRONTEND_DIR").unwrap_or_else(|| DEFAULT_FRONTEND_DIR.to_string()),
            ),
            expose_error_details,
        })
    }
}

fn parse_flag(raw: Option<String>, key: &str) -> Result<bool, ConfigError> {
    match raw.as_deref().map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None => Ok(false),
        Some("1" | "true" | "yes" | "on") => Ok(true),
        Some("0" | "false" | "no" | "off") => Ok(false),
        Some(_) => Err(ConfigError::InvalidValue(key.to_string())),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn mongo_backend_requires_uri() {
        let err = load(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref key) if key == "MONGODB_URI"));
    }

    #[test]
    fn defaults_apply_when_only_uri_is_set() {
        let config = load(&[("MONGODB_URI", "mongodb://localhost:27017")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.store.backend, StoreBackend::Mongo);
        assert_eq!(config.store.connect_timeout, Duration::from_secs(30));
        assert!(!config.store.start_without_store);
        assert!(!config.expose_error_details);
        assert_eq!(config.auth.username, "admin");
        assert_eq!(config.auth.password, "admin123");
        assert_eq!(config.frontend_dir, PathBuf::from("frontend"));
    }

    #[test]
    fn frontend_dir_can_be_overridden() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("FRONTEND_DIR", "/srv/pharmacy/pages"),
        ])
        .unwrap();
        assert_eq!(config.frontend_dir, PathBuf::from("/srv/pharmacy/pages"));
    }

    #[test]
    fn memory_backend_needs_no_uri() {
        let config = load(&[("STORE_BACKEND", "memory"), ("PORT", "8080")]).unwrap();
        assert_eq!(config.store.backend, StoreBackend::Memory);
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn rejects_bad_port_and_flags() {
        assert!(matches!(
            load(&[("STORE_BACKEND", "memory"), ("PORT", "eighty")]),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            load(&[("STORE_BACKEND", "memory"), ("START_WITHOUT_STORE", "maybe")]),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn development_env_exposes_details() {
        let config = load(&[
            ("STORE_BACKEND", "memory"),
            ("APP_ENV", "Development"),
            ("START_WITHOUT_STORE", "true"),
        ])
        .unwrap();
        assert!(config.expose_error_details);
        assert!(config.store.start_without_store);
    }

    #[test]
    fn auth_debug_output_hides_secrets() {
        let rendered = format!("{:?}", AuthConfig::default());
        assert!(!rendered.contains("admin123"));
        assert!(rendered.contains("<redacted>"));
    }
}
