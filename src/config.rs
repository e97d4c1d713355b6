use std::env;
use std::ops::RangeInclusive;
use std::time::Duration;

// bcrypt rejeita custos fora desse intervalo
const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;
const COOKIE_EXPIRE_DAYS: RangeInclusive<i64> = 1..=3650;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expires_in: Duration,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: String,
    pub mongo_db: String,
    pub jwt: JwtConfig,
    pub cookie_expire_days: i64,
    pub bcrypt_cost: u32,
    pub allowed_origins: Vec<String>,
}

impl AppConfig {
    /// Lê a configuração do ambiente (depois de `dotenv()`), uma única vez no startup
    pub fn from_env() -> Result<Self, ConfigError> {
        let jwt = JwtConfig {
            secret: required("JWT_SECRET_KEY")?,
            expires_in: parse_duration("JWT_EXPIRES", &optional("JWT_EXPIRES", "7d"))?,
            issuer: optional("JWT_ISSUER", "hospital-service"),
            audience: optional("JWT_AUDIENCE", "hospital-api"),
        };

        let allowed_origins = ["FRONTEND_URL", "DASHBOARD_URL"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .filter(|origin| !origin.trim().is_empty())
            .collect();

        Ok(Self {
            host: optional("HOST", "0.0.0.0"),
            port: parse_number("PORT", &optional("PORT", "4000"))?,
            mongo_uri: required("MONGO_URI")?,
            mongo_db: optional("MONGO_DB", "hospital"),
            jwt,
            cookie_expire_days: parse_in_range(
                "COOKIE_EXPIRE",
                &optional("COOKIE_EXPIRE", "7"),
                COOKIE_EXPIRE_DAYS,
            )?,
            bcrypt_cost: parse_in_range(
                "BCRYPT_COST",
                &optional("BCRYPT_COST", "10"),
                BCRYPT_COST_RANGE,
            )?,
            allowed_origins,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn optional(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

/// Número que precisa cair dentro de `range`
fn parse_in_range<T>(
    name: &'static str,
    value: &str,
    range: RangeInclusive<T>,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd,
{
    let parsed: T = parse_number(name, value)?;
    if range.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        })
    }
}

/// Interpreta durações no formato "7d", "12h", "30m", "45s" ou segundos puros ("3600")
pub fn parse_duration(name: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name,
        value: value.to_string(),
    };

    let trimmed = value.trim();
    let (digits, multiplier) = match trimmed.chars().last() {
        Some('d') => (&trimmed[..trimmed.len() - 1], 24 * 60 * 60),
        Some('h') => (&trimmed[..trimmed.len() - 1], 60 * 60),
        Some('m') => (&trimmed[..trimmed.len() - 1], 60),
        Some('s') => (&trimmed[..trimmed.len() - 1], 1),
        Some(c) if c.is_ascii_digit() => (trimmed, 1),
        _ => return Err(invalid()),
    };

    let amount: u64 = digits.trim().parse().map_err(|_| invalid())?;
    if amount == 0 {
        return Err(invalid());
    }
    // exp é somado a um timestamp i64
    let secs = amount
        .checked_mul(multiplier)
        .filter(|secs| i64::try_from(*secs).is_ok())
        .ok_or_else(invalid)?;
    Ok(Duration::from_secs(secs))
}
