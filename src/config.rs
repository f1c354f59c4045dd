use std::{env, str::FromStr, time::Duration};

use crate::services::alerts_service::{AlertSettings, TriggerPolicy};
use crate::services::rate_limiter::RateLimits;

#[derive(Debug, Clone)]
pub struct Settings {
    pub host: String,
    pub port: u16,

    // unset => in-memory store
    pub mongodb_uri: Option<String>,
    pub mongodb_db: String,

    pub finnhub_api_key: String,

    pub telegram_bot_token: Option<String>,
    pub telegram_api_base: String,

    pub alert_check_interval_secs: u64,
    pub alert_fetch_batch_size: usize,
    pub alert_trigger_policy: TriggerPolicy,
    pub max_alerts_per_user: usize,

    pub quote_cache_ttl_secs: u64,

    pub rate_limit_basic_per_min: usize,
    pub rate_limit_premium_per_min: usize,

    pub admin_telegram_ids: Vec<i64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            mongodb_uri: None,
            mongodb_db: "tradecompanion".to_string(),
            finnhub_api_key: String::new(),
            telegram_bot_token: None,
            telegram_api_base: "https://api.telegram.org".to_string(),
            alert_check_interval_secs: 30,
            alert_fetch_batch_size: 10,
            alert_trigger_policy: TriggerPolicy::Once,
            max_alerts_per_user: 50,
            quote_cache_ttl_secs: 10,
            rate_limit_basic_per_min: 20,
            rate_limit_premium_per_min: 60,
            admin_telegram_ids: Vec::new(),
        }
    }
}

impl Settings {
    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            fetch_batch_size: self.alert_fetch_batch_size.max(1),
            policy: self.alert_trigger_policy,
            max_alerts_per_user: self.max_alerts_per_user,
        }
    }

    pub fn rate_limits(&self) -> RateLimits {
        RateLimits {
            basic_per_window: self.rate_limit_basic_per_min,
            premium_per_window: self.rate_limit_premium_per_min,
            window: Duration::from_secs(60),
        }
    }

    pub fn alert_check_interval(&self) -> Duration {
        Duration::from_secs(self.alert_check_interval_secs.max(1))
    }

    pub fn quote_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.quote_cache_ttl_secs)
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    match non_empty(key) {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        None => default,
    }
}

pub fn parse_id_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .filter_map(|s| s.trim().parse::<i64>().ok())
        .collect()
}

pub fn load() -> Settings {
    // Loads .env if present (no crash if missing)
    dotenvy::dotenv().ok();

    let d = Settings::default();

    Settings {
        host: non_empty("HOST").unwrap_or(d.host),
        port: parsed("PORT", d.port),

        mongodb_uri: non_empty("MONGODB_URI"),
        mongodb_db: non_empty("MONGODB_DB").unwrap_or(d.mongodb_db),

        finnhub_api_key: non_empty("FINNHUB_API_KEY").unwrap_or_default(),

        telegram_bot_token: non_empty("TELEGRAM_BOT_TOKEN"),
        telegram_api_base: non_empty("TELEGRAM_API_BASE").unwrap_or(d.telegram_api_base),

        alert_check_interval_secs: parsed("ALERT_CHECK_INTERVAL_SECS", d.alert_check_interval_secs),
        alert_fetch_batch_size: parsed("ALERT_FETCH_BATCH_SIZE", d.alert_fetch_batch_size),
        alert_trigger_policy: parsed("ALERT_TRIGGER_POLICY", d.alert_trigger_policy),
        max_alerts_per_user: parsed("MAX_ALERTS_PER_USER", d.max_alerts_per_user),

        quote_cache_ttl_secs: parsed("QUOTE_CACHE_TTL_SECS", d.quote_cache_ttl_secs),

        rate_limit_basic_per_min: parsed("RATE_LIMIT_BASIC_PER_MIN", d.rate_limit_basic_per_min),
        rate_limit_premium_per_min: parsed("RATE_LIMIT_PREMIUM_PER_MIN", d.rate_limit_premium_per_min),

        admin_telegram_ids: non_empty("ADMIN_TELEGRAM_IDS")
            .map(|raw| parse_id_list(&raw))
            .unwrap_or_default(),
    }
}
