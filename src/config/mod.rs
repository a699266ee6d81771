use std::env;
use std::str::FromStr;

use chrono::Duration;
use rust_decimal::Decimal;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_PAYMENT_WINDOW_HOURS: i64 = 24;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 300;

/// Loyalty policy constants. The earlier handlers disagreed on these values,
/// so they are configured in exactly one place:
/// - new customers start with 50,000 points;
/// - a successful referral credits 10,000 points to the referrer, funded by
///   the platform (pure credit, no matching debit anywhere).
const DEFAULT_WELCOME_POINTS: i64 = 50_000;
const DEFAULT_REFERRAL_BONUS_POINTS: i64 = 10_000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// How long a booking may sit in `WAITING_PAYMENT` before the sweeper
    /// expires it.
    pub payment_window: Duration,
    /// Sweeper tick interval.
    pub sweep_interval: std::time::Duration,
    pub welcome_points: Decimal,
    pub referral_bonus_points: Decimal,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/eventku".to_string()),
            port: parse_or_default("PORT", DEFAULT_PORT),
            payment_window: Duration::hours(parse_or_default(
                "PAYMENT_WINDOW_HOURS",
                DEFAULT_PAYMENT_WINDOW_HOURS,
            )),
            sweep_interval: std::time::Duration::from_secs(parse_or_default(
                "SWEEP_INTERVAL_SECS",
                DEFAULT_SWEEP_INTERVAL_SECS,
            )),
            welcome_points: Decimal::from(parse_or_default(
                "WELCOME_POINTS",
                DEFAULT_WELCOME_POINTS,
            )),
            referral_bonus_points: Decimal::from(parse_or_default(
                "REFERRAL_BONUS_POINTS",
                DEFAULT_REFERRAL_BONUS_POINTS,
            )),
        }
    }
}

fn parse_or_default<T: FromStr + Copy>(name: &str, default: T) -> T {
    match env::var(name) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(var = name, value = %raw, "Unparseable value, using default");
                default
            }
        },
        Err(_) => default,
    }
}
