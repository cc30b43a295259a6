/*
 * Responsibility
 * - load environment / .env settings (tenant, audience, issuer, JWKS, path scope, ...)
 * - validate values (startup fails when something is missing)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

use crate::services::auth::PathScopeTable;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(raw: Option<String>) -> Self {
        match raw
            .unwrap_or_else(|| "development".to_string())
            .to_ascii_lowercase()
            .as_str()
        {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,
    pub route_prefix: String,
    pub service_name: String,
    pub cors_allowed_origins: Vec<String>,
    pub request_timeout: Duration,

    pub auth_tenant_id: String,
    pub auth_audience: String,
    pub auth_issuer: String,
    pub auth_jwks_url: Url,
    pub access_token_leeway_seconds: u64,

    pub jwks_cache_ttl: Duration,
    pub jwks_min_refresh: Duration,
    pub jwks_fetch_timeout: Duration,

    pub path_scope: PathScopeTable,

    pub health_check_url: Url,
    pub health_check_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let seconds = |key: &'static str, default: u64| -> Result<Duration, ConfigError> {
            match get(key) {
                Some(v) => v
                    .trim()
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| ConfigError::Invalid(key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        // The function host hands custom handlers their port here.
        let port: u16 = match get("FUNCTIONS_CUSTOMHANDLER_PORT").or_else(|| get("PORT")) {
            Some(p) => p.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(get("APP_ENV"));

        let route_prefix = get("ROUTE_PREFIX")
            .map(|p| p.trim().trim_end_matches('/').to_string())
            .unwrap_or_default();
        if !route_prefix.is_empty() && !route_prefix.starts_with('/') {
            return Err(ConfigError::Invalid("ROUTE_PREFIX"));
        }

        let service_name = get("SERVICE_NAME").unwrap_or_else(|| "function-demo".to_string());

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        let request_timeout = seconds("REQUEST_TIMEOUT_SECONDS", 30)?;

        let auth_tenant_id = get("AUTH_TENANT_ID")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_TENANT_ID"))?;

        let auth_audience = get("AUTH_AUDIENCE")
            .filter(|v| !v.trim().is_empty())
            .ok_or(ConfigError::Missing("AUTH_AUDIENCE"))?;

        let auth_issuer = get("AUTH_ISSUER")
            .unwrap_or_else(|| format!("https://sts.windows.net/{}/", auth_tenant_id));

        let auth_jwks_url = get("AUTH_JWKS_URL").unwrap_or_else(|| {
            format!(
                "https://login.microsoftonline.com/{}/discovery/v2.0/keys",
                auth_tenant_id
            )
        });
        let auth_jwks_url =
            Url::parse(&auth_jwks_url).map_err(|_| ConfigError::Invalid("AUTH_JWKS_URL"))?;

        let access_token_leeway_seconds = seconds("ACCESS_TOKEN_LEEWAY_SECONDS", 60)?.as_secs();

        let jwks_cache_ttl = seconds("JWKS_CACHE_TTL_SECONDS", 300)?;
        let jwks_min_refresh = seconds("JWKS_MIN_REFRESH_SECONDS", 30)?;
        let jwks_fetch_timeout = seconds("JWKS_FETCH_TIMEOUT_SECONDS", 5)?;

        let path_scope = PathScopeTable::parse(
            &get("PATH_SCOPE").unwrap_or_else(|| "/vault=GetSecret".to_string()),
        )
        .map_err(|_| ConfigError::Invalid("PATH_SCOPE"))?;

        let health_check_url = get("HEALTH_CHECK_URL")
            .unwrap_or_else(|| "https://www.linkedin.com".to_string());
        let health_check_url =
            Url::parse(&health_check_url).map_err(|_| ConfigError::Invalid("HEALTH_CHECK_URL"))?;
        let health_check_timeout = seconds("HEALTH_CHECK_TIMEOUT_SECONDS", 10)?;

        Ok(Self {
            addr,
            app_env,
            route_prefix,
            service_name,
            cors_allowed_origins,
            request_timeout,
            auth_tenant_id,
            auth_audience,
            auth_issuer,
            auth_jwks_url,
            access_token_leeway_seconds,
            jwks_cache_ttl,
            jwks_min_refresh,
            jwks_fetch_timeout,
            path_scope,
            health_check_url,
            health_check_timeout,
        })
    }
}
