use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Stage the marketplace is running in; chosen by `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the binary needs, resolved once at startup from the
/// environment (a `.env` file is honored when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub media: MediaConfig,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let raw_port = var_or("APP_PORT", "3000");
        let port = raw_port
            .parse::<u16>()
            .map_err(|_| ConfigError::BadPort { value: raw_port })?;

        Ok(Self {
            environment: AppEnvironment::parse(&var_or("APP_ENV", "development")),
            server: ServerConfig {
                host: var_or("APP_HOST", "127.0.0.1"),
                port,
            },
            telemetry: TelemetryConfig {
                log_level: var_or("APP_LOG_LEVEL", "info"),
            },
            media: MediaConfig {
                public_base_url: var_or(
                    "APP_MEDIA_BASE_URL",
                    "https://media.casamercato.local",
                ),
            },
        })
    }
}

/// HTTP bind address for the serve command.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// `localhost` is accepted as a spelling of the loopback address;
    /// anything else must be a literal IP.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip = if self.host.eq_ignore_ascii_case("localhost") {
            IpAddr::from([127, 0, 0, 1])
        } else {
            self.host.parse().map_err(|_| ConfigError::BadHost {
                value: self.host.clone(),
            })?
        };
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where staged listing images are served from.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub public_base_url: String,
}

#[derive(Debug)]
pub enum ConfigError {
    BadPort { value: String },
    BadHost { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::BadPort { value } => {
                write!(f, "APP_PORT must be a u16, got {value:?}")
            }
            ConfigError::BadHost { value } => {
                write!(f, "APP_HOST must be an IP address or localhost, got {value:?}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    // Env vars are process-global; serialize the tests that touch them.
    fn env_lock() -> &'static Mutex<()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_MEDIA_BASE_URL",
        ] {
            env::remove_var(key);
        }
    }

    #[test]
    fn defaults_cover_an_empty_environment() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        let config = AppConfig::load().expect("defaults load");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(
            config.media.public_base_url,
            "https://media.casamercato.local"
        );
    }

    #[test]
    fn localhost_resolves_to_loopback() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn garbage_port_is_rejected() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        env::set_var("APP_PORT", "annuncio");
        let err = AppConfig::load().expect_err("port must fail");
        assert!(matches!(err, ConfigError::BadPort { .. }));
    }

    #[test]
    fn production_aliases_are_recognized() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        env::set_var("APP_ENV", "PROD");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Production);
    }
}
