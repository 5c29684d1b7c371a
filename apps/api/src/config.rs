use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::ranking::jitter::JitterMode;
use crate::ranking::scoring::{PlatformWeights, RankingMode, ScoreConfig};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: AppEnvironment,
    pub database_url: String,
    pub pool: PoolSettings,
    pub bootstrap_schema: bool,
    pub port: u16,
    pub rust_log: String,
    pub ranking: RankingSettings,
}

/// Deployment environment, read from `ENV`. Development echoes SQL statements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Production,
}

impl AppEnvironment {
    pub fn echo_sql(&self) -> bool {
        matches!(self, AppEnvironment::Development)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub acquire_timeout_secs: u64,
    pub max_lifetime_secs: u64,
}

#[derive(Debug, Clone)]
pub struct RankingSettings {
    pub score: ScoreConfig,
    pub jitter: JitterMode,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL")
            .context("Required environment variable 'DATABASE_URL' is not set")?;

        let environment = match lookup("ENV").as_deref() {
            None | Some("development") => AppEnvironment::Development,
            Some("production") => AppEnvironment::Production,
            Some(other) => bail!("ENV must be 'development' or 'production', got '{other}'"),
        };

        Ok(Config {
            environment,
            database_url,
            pool: PoolSettings {
                max_connections: parse_or(&lookup, "DB_POOL_SIZE", 20)?,
                connect_timeout_secs: parse_or(&lookup, "DB_CONNECT_TIMEOUT", 60)?,
                acquire_timeout_secs: parse_or(&lookup, "DB_POOL_TIMEOUT", 300)?,
                max_lifetime_secs: parse_or(&lookup, "DB_POOL_RECYCLE", 1800)?,
            },
            bootstrap_schema: parse_or(&lookup, "DB_BOOTSTRAP_SCHEMA", true)?,
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ranking: RankingSettings::from_lookup(&lookup)?,
        })
    }
}

impl RankingSettings {
    fn from_lookup<F>(lookup: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ScoreConfig::default();
        let platform_defaults = PlatformWeights::default();

        let mode = match lookup("RANKING_MODE").as_deref() {
            None | Some("scalar") => RankingMode::Scalar,
            Some("tiered") => RankingMode::Tiered,
            Some(other) => bail!("RANKING_MODE must be 'scalar' or 'tiered', got '{other}'"),
        };

        let jitter = match lookup("RANKING_JITTER").as_deref() {
            None | Some("live") => JitterMode::Live,
            Some("off") => JitterMode::Off,
            Some("bucketed") => {
                let bucket_secs: u64 = parse_or(lookup, "RANKING_JITTER_BUCKET_SECS", 300)?;
                if bucket_secs == 0 {
                    bail!("RANKING_JITTER_BUCKET_SECS must be greater than zero");
                }
                JitterMode::Bucketed { bucket_secs }
            }
            Some(other) => {
                bail!("RANKING_JITTER must be 'off', 'live' or 'bucketed', got '{other}'")
            }
        };

        let jitter_fraction = parse_or(lookup, "RANKING_JITTER_FRACTION", defaults.jitter_fraction)?;
        if !(0.0..=1.0).contains(&jitter_fraction) {
            bail!("RANKING_JITTER_FRACTION must be within [0, 1], got {jitter_fraction}");
        }

        let score = ScoreConfig {
            mode,
            platform: PlatformWeights {
                sexy: finite_or(lookup, "PLATFORM_WEIGHT_SEXY", platform_defaults.sexy)?,
                pump: finite_or(lookup, "PLATFORM_WEIGHT_PUMP", platform_defaults.pump)?,
                other: finite_or(lookup, "PLATFORM_WEIGHT_OTHER", platform_defaults.other)?,
            },
            activity: defaults.activity,
            time_scale: finite_or(lookup, "RANKING_TIME_SCALE", defaults.time_scale)?,
            decay_rate: finite_or(lookup, "RANKING_DECAY_RATE", defaults.decay_rate)?,
            jitter_fraction,
        };
        if score.decay_rate < 0.0 {
            bail!("RANKING_DECAY_RATE must not be negative");
        }

        Ok(RankingSettings { score, jitter })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
    }
}

fn finite_or<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    if !value.is_finite() {
        bail!("{key} must be a finite number, got {value}");
    }
    Ok(value)
}
