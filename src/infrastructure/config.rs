use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// Settings for the token codec
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    /// Seconds
    pub access_token_expiry: i64,
    /// Seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub domain: Option<String>,
    pub access_max_age: i64,
    pub refresh_max_age: i64,
    pub refresh_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProviderKind {
    Log,
    Http,
}

impl FromStr for EmailProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "log" | "noop" => Ok(EmailProviderKind::Log),
            "http" => Ok(EmailProviderKind::Http),
            other => Err(anyhow::anyhow!("Unknown EMAIL_PROVIDER: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProviderKind,
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub frontend_url: String,
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub port: u16,
    pub jwt: JwtConfig,
    pub cookies: CookieConfig,
    pub email: EmailConfig,
    /// Accepted Google OAuth client ids; empty disables federated login
    pub google_client_ids: Vec<String>,
    pub admin: Option<AdminConfig>,
    /// Empty means any origin
    pub cors_allowed_origins: Vec<String>,
    pub rate_limit_per_minute: u64,
}

pub const DEFAULT_ACCESS_TOKEN_EXPIRY: i64 = 900;
pub const DEFAULT_REFRESH_PATH: &str = "/api/v1/auth/refresh";
const MIN_SECRET_LENGTH: usize = 32;

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database = DatabaseConfig {
            url: get("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: parse_or(&get, "DB_MAX_CONNECTIONS", 20)?,
            min_connections: parse_or(&get, "DB_MIN_CONNECTIONS", 5)?,
            acquire_timeout_secs: parse_or(&get, "DB_ACQUIRE_TIMEOUT_SECS", 3)?,
            idle_timeout_secs: parse_or(&get, "DB_IDLE_TIMEOUT_SECS", 600)?,
        };
        let port = parse_or(&get, "PORT", 3000u16)?;

        let secret = get("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!(
                "JWT_SECRET must be at least {} bytes long",
                MIN_SECRET_LENGTH
            );
        }

        let access_token_expiry =
            parse_or(&get, "JWT_ACCESS_TOKEN_EXPIRY", DEFAULT_ACCESS_TOKEN_EXPIRY)?;
        if access_token_expiry <= 0 {
            anyhow::bail!("JWT_ACCESS_TOKEN_EXPIRY must be positive");
        }
        let refresh_token_expiry =
            parse_or(&get, "JWT_REFRESH_TOKEN_EXPIRY", access_token_expiry * 7)?;
        if refresh_token_expiry <= access_token_expiry {
            anyhow::bail!("JWT_REFRESH_TOKEN_EXPIRY must be longer than the access token expiry");
        }

        let jwt = JwtConfig {
            secret,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "gatehouse".to_string()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "gatehouse-api".to_string()),
            access_token_expiry,
            refresh_token_expiry,
        };

        let cookies = CookieConfig {
            domain: get("COOKIE_DOMAIN"),
            access_max_age: parse_or(&get, "ACCESS_COOKIE_MAX_AGE", access_token_expiry)?,
            refresh_max_age: parse_or(&get, "REFRESH_COOKIE_MAX_AGE", refresh_token_expiry)?,
            refresh_path: get("REFRESH_COOKIE_PATH")
                .unwrap_or_else(|| DEFAULT_REFRESH_PATH.to_string()),
        };

        let provider = get("EMAIL_PROVIDER")
            .unwrap_or_default()
            .parse::<EmailProviderKind>()?;
        let email = EmailConfig {
            provider,
            api_url: get("EMAIL_API_URL"),
            api_key: get("EMAIL_API_KEY"),
            from: get("EMAIL_FROM").unwrap_or_else(|| "no-reply@localhost".to_string()),
            frontend_url: get("FRONTEND_URL")
                .unwrap_or_else(|| "http://localhost:3000".to_string())
                .trim_end_matches('/')
                .to_string(),
        };
        if email.provider == EmailProviderKind::Http && email.api_url.is_none() {
            anyhow::bail!("EMAIL_API_URL must be set when EMAIL_PROVIDER=http");
        }

        let google_client_ids = get("GOOGLE_CLIENT_IDS")
            .map(|ids| split_list(&ids))
            .unwrap_or_default();

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .filter(|origins| origins.trim() != "*")
            .map(|origins| split_list(&origins))
            .unwrap_or_default();

        let rate_limit_per_minute = parse_or(&get, "RATE_LIMIT_PER_MINUTE", 60u64)?;
        if rate_limit_per_minute == 0 {
            anyhow::bail!("RATE_LIMIT_PER_MINUTE must be positive");
        }

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminConfig { email, password }),
            _ => None,
        };

        Ok(Self {
            database,
            port,
            jwt,
            cookies,
            email,
            google_client_ids,
            admin,
            cors_allowed_origins,
            rate_limit_per_minute,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("Invalid value for {}: {}", key, e)),
        None => Ok(default),
    }
}
