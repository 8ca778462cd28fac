/*
 * Responsibility
 * - 環境変数や設定の読み込み (PORT, APP_ENV, JWT の署名設定など)
 * - 設定値のバリデーション (不足なら起動失敗)
 */
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use jsonwebtoken::Algorithm;

use crate::services::auth::signing::{
    DEFAULT_CLAIMS_KEY, DEFAULT_FORM_BODY_LIMIT, DEFAULT_FORM_KEY, DEFAULT_TOKEN_KEY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Production,
}

impl AppEnv {
    fn parse(value: Option<&str>) -> Self {
        match value
            .unwrap_or("development")
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

#[derive(Debug, PartialEq, Eq)]
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

/// Key material for the configured algorithm.
#[derive(Clone)]
pub enum JwtKey {
    Secret(String),
    PublicKeyPem(String),
}

impl fmt::Debug for JwtKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 鍵そのものはログに出さない
        match self {
            JwtKey::Secret(_) => f.write_str("Secret(..)"),
            JwtKey::PublicKeyPem(_) => f.write_str("PublicKeyPem(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    pub jwt_algorithm: Algorithm,
    pub jwt_key: JwtKey,
    pub jwt_form_key: String,
    pub jwt_token_key: String,
    pub jwt_claims_key: String,
    pub jwt_leeway_seconds: u64,
    pub jwt_form_body_limit: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key/value source (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = lookup("PORT")
            .map(|s| s.parse::<u16>().map_err(|_| ConfigError::Invalid("PORT")))
            .transpose()?
            .unwrap_or(3000);

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = AppEnv::parse(lookup("APP_ENV").as_deref());

        let jwt_algorithm = lookup("JWT_ALGORITHM")
            .map(|s| {
                Algorithm::from_str(s.trim()).map_err(|_| ConfigError::Invalid("JWT_ALGORITHM"))
            })
            .transpose()?
            .unwrap_or(Algorithm::HS256);

        let jwt_key = match jwt_algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                let secret = lookup("JWT_SECRET")
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::Missing("JWT_SECRET"))?;
                JwtKey::Secret(secret)
            }
            _ => {
                let pem = lookup("JWT_PUBLIC_KEY_PEM")
                    .filter(|s| !s.is_empty())
                    .ok_or(ConfigError::Missing("JWT_PUBLIC_KEY_PEM"))?
                    .replace("\\n", "\n");
                JwtKey::PublicKeyPem(pem)
            }
        };

        let jwt_form_key = lookup("JWT_FORM_KEY").unwrap_or_else(|| DEFAULT_FORM_KEY.to_string());
        let jwt_token_key =
            lookup("JWT_TOKEN_KEY").unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string());
        let jwt_claims_key =
            lookup("JWT_CLAIMS_KEY").unwrap_or_else(|| DEFAULT_CLAIMS_KEY.to_string());

        if jwt_token_key == jwt_claims_key {
            return Err(ConfigError::Invalid("JWT_CLAIMS_KEY"));
        }

        let jwt_leeway_seconds = lookup("JWT_LEEWAY_SECONDS")
            .map(|v| {
                v.parse::<u64>()
                    .map_err(|_| ConfigError::Invalid("JWT_LEEWAY_SECONDS"))
            })
            .transpose()?
            .unwrap_or(0);

        let jwt_form_body_limit = lookup("JWT_FORM_BODY_LIMIT")
            .map(|v| {
                v.parse::<usize>()
                    .map_err(|_| ConfigError::Invalid("JWT_FORM_BODY_LIMIT"))
            })
            .transpose()?
            .unwrap_or(DEFAULT_FORM_BODY_LIMIT);

        Ok(Self {
            addr,
            app_env,
            jwt_algorithm,
            jwt_key,
            jwt_form_key,
            jwt_token_key,
            jwt_claims_key,
            jwt_leeway_seconds,
            jwt_form_body_limit,
        })
    }
}
