use secrecy::{ExposeSecret, SecretString};
use std::env;
use std::net::IpAddr;
use thiserror::Error;

/// Errors raised while loading configuration at start-up
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(&'static str, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub platform: PlatformConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

/// Connection settings for the hosted data platform
#[derive(Debug, Clone)]
pub struct PlatformConfig {
    pub url: String,
    pub service_role_key: SecretString,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: SecretString,
    pub jwt_expiry_hours: u64,
    /// bcrypt work factor for stored passwords
    pub password_cost: u32,
    pub admin_token: SecretString,
    /// Accept the unsigned `x-user-email` header as an identity source
    pub allow_legacy_identity_header: bool,
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    /// Build configuration from the process environment.
    ///
    /// Defaults are chosen by `APP_ENV`, then individual variables override them.
    /// Platform credentials and signing secrets have no defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let secrets = Secrets {
            platform_url: required("SUPABASE_URL")?,
            service_role_key: required("SUPABASE_SERVICE_ROLE_KEY")?.into(),
            jwt_secret: required("JWT_SECRET")?.into(),
            admin_token: required("ADMIN_PROVISIONING_TOKEN")?.into(),
        };

        url::Url::parse(&secrets.platform_url)
            .map_err(|e| ConfigError::InvalidEnvVar("SUPABASE_URL", e.to_string()))?;

        let config = match environment {
            Environment::Production => Self::production(secrets),
            Environment::Staging => Self::staging(secrets),
            Environment::Development => Self::development(secrets),
        };

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Result<Self, ConfigError> {
        // Server overrides
        if let Ok(v) = env::var("HOST") {
            self.server.host = v
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("HOST", v.clone()))?;
        }
        if let Some(v) = env::var("SALESDESK_API_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v
                .parse()
                .map_err(|_| ConfigError::InvalidEnvVar("PORT", v.clone()))?;
        }

        // Platform overrides
        if let Ok(v) = env::var("PLATFORM_TIMEOUT_SECS") {
            self.platform.timeout_secs = v.parse().unwrap_or(self.platform.timeout_secs);
        }

        // API overrides
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = parse_expiry_hours(&v)?;
        }
        if let Ok(v) = env::var("SECURITY_PASSWORD_COST") {
            self.security.password_cost = v.parse().unwrap_or(self.security.password_cost);
        }
        if let Ok(v) = env::var("SECURITY_ALLOW_LEGACY_IDENTITY_HEADER") {
            self.security.allow_legacy_identity_header =
                v.parse().unwrap_or(self.security.allow_legacy_identity_header);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        Ok(self)
    }

    fn development(secrets: Secrets) -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: IpAddr::from([0, 0, 0, 0]),
                port: 8000,
            },
            platform: PlatformConfig {
                url: secrets.platform_url,
                service_role_key: secrets.service_role_key,
                timeout_secs: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                jwt_secret: secrets.jwt_secret,
                jwt_expiry_hours: 24 * 7, // 1 week
                password_cost: 10,
                admin_token: secrets.admin_token,
                allow_legacy_identity_header: false,
                enable_cors: true,
                // Empty list means any origin
                cors_origins: vec![],
            },
        }
    }

    fn staging(secrets: Secrets) -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: IpAddr::from([0, 0, 0, 0]),
                port: 8000,
            },
            platform: PlatformConfig {
                url: secrets.platform_url,
                service_role_key: secrets.service_role_key,
                timeout_secs: 15,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                jwt_secret: secrets.jwt_secret,
                jwt_expiry_hours: 24,
                password_cost: 11,
                admin_token: secrets.admin_token,
                allow_legacy_identity_header: false,
                enable_cors: true,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
        }
    }

    fn production(secrets: Secrets) -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: IpAddr::from([0, 0, 0, 0]),
                port: 8000,
            },
            platform: PlatformConfig {
                url: secrets.platform_url,
                service_role_key: secrets.service_role_key,
                timeout_secs: 10,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                jwt_secret: secrets.jwt_secret,
                jwt_expiry_hours: 8,
                password_cost: 12,
                admin_token: secrets.admin_token,
                allow_legacy_identity_header: false,
                enable_cors: true,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
        }
    }

    /// Configuration for tests: development defaults with fixed secrets
    pub fn for_testing() -> Self {
        let mut config = Self::development(Secrets {
            platform_url: "http://127.0.0.1:54321".to_string(),
            service_role_key: SecretString::from("test-service-role-key".to_string()),
            jwt_secret: SecretString::from("test-jwt-secret-with-enough-length".to_string()),
            admin_token: SecretString::from("test-admin-token".to_string()),
        });
        // bcrypt minimum
        config.security.password_cost = 4;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Platform url without a trailing slash
    pub fn platform_base_url(&self) -> &str {
        self.platform.url.trim_end_matches('/')
    }

    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.security.jwt_secret.expose_secret().as_bytes()
    }
}

struct Secrets {
    platform_url: String,
    service_role_key: SecretString,
    jwt_secret: SecretString,
    admin_token: SecretString,
}

/// Longest bearer token lifetime accepted from the environment
pub const MAX_JWT_EXPIRY_HOURS: u64 = 24 * 366;

fn parse_expiry_hours(value: &str) -> Result<u64, ConfigError> {
    match value.trim().parse::<u64>() {
        Ok(hours) if (1..=MAX_JWT_EXPIRY_HOURS).contains(&hours) => Ok(hours),
        _ => Err(ConfigError::InvalidEnvVar(
            "SECURITY_JWT_EXPIRY_HOURS",
            format!("{} (expected 1..={} hours)", value, MAX_JWT_EXPIRY_HOURS),
        )),
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    match env::var(name) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::MissingEnvVar(name)),
    }
}
