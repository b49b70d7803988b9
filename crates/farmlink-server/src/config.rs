//! Server configuration gathered from Shuttle secrets

use anyhow::{bail, Context, Result};
use shuttle_runtime::SecretStore;

pub const DEFAULT_ACCESS_TOKEN_MINUTES: i64 = 60;
pub const DEFAULT_REFRESH_TOKEN_DAYS: i64 = 30;
pub const DEFAULT_STATS_UTC_OFFSET_HOURS: i32 = 7;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub jwt_secret: String,
    pub access_token_minutes: i64,
    pub refresh_token_days: i64,
    /// Seed an administrator with these credentials on startup
    pub admin: Option<AdminSeed>,
    /// Payments are disabled when absent
    pub vnpay: Option<VnpayConfig>,
    pub stats_utc_offset_hours: i32,
}

#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct VnpayConfig {
    pub tmn_code: String,
    pub hash_secret: String,
    pub pay_url: String,
    pub return_url: String,
    pub ipn_url: String,
}

impl ServerConfig {
    pub fn from_secrets(secrets: &SecretStore) -> Result<Self> {
        Self::from_lookup(|key| secrets.get(key))
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let jwt_secret = get("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .context("JWT_SECRET must be set")?;

        let access_token_minutes = parse_or(&get, "ACCESS_TOKEN_MINUTES", DEFAULT_ACCESS_TOKEN_MINUTES)?;
        let refresh_token_days = parse_or(&get, "REFRESH_TOKEN_DAYS", DEFAULT_REFRESH_TOKEN_DAYS)?;
        let stats_utc_offset_hours =
            parse_or(&get, "STATS_UTC_OFFSET_HOURS", DEFAULT_STATS_UTC_OFFSET_HOURS)?;
        if !(-12..=14).contains(&stats_utc_offset_hours) {
            bail!("STATS_UTC_OFFSET_HOURS out of range: {}", stats_utc_offset_hours);
        }

        let admin = match (get("ADMIN_EMAIL"), get("ADMIN_PASSWORD")) {
            (Some(email), Some(password)) => Some(AdminSeed { email, password }),
            (Some(_), None) => bail!("ADMIN_EMAIL is set but ADMIN_PASSWORD is missing"),
            _ => None,
        };

        let vnpay = match (
            get("VNPAY_TMN_CODE"),
            get("VNPAY_HASH_SECRET"),
            get("VNPAY_PAY_URL"),
            get("VNPAY_RETURN_URL"),
            get("VNPAY_IPN_URL"),
        ) {
            (Some(tmn_code), Some(hash_secret), Some(pay_url), Some(return_url), Some(ipn_url)) => {
                Some(VnpayConfig {
                    tmn_code,
                    hash_secret,
                    pay_url,
                    return_url,
                    ipn_url,
                })
            }
            _ => None,
        };

        Ok(Self {
            jwt_secret,
            access_token_minutes,
            refresh_token_days,
            admin,
            vnpay,
            stats_utc_offset_hours,
        })
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid number: {}", key, raw)),
        None => Ok(default),
    }
}
