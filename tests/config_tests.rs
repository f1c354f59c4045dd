use std::time::Duration;

use tradecompanion::{
    config::{parse_id_list, Settings},
    services::alerts_service::TriggerPolicy,
};

#[test]
fn admin_ids_skip_garbage() {
    assert_eq!(parse_id_list("1, 2,abc,,-3"), vec![1, 2, -3]);
    assert!(parse_id_list("").is_empty());
}

#[test]
fn defaults_feed_the_services() {
    let s = Settings::default();

    let alerts = s.alert_settings();
    assert_eq!(alerts.fetch_batch_size, 10);
    assert_eq!(alerts.policy, TriggerPolicy::Once);
    assert_eq!(alerts.max_alerts_per_user, 50);

    let limits = s.rate_limits();
    assert_eq!(limits.basic_per_window, 20);
    assert_eq!(limits.premium_per_window, 60);
    assert_eq!(limits.window, Duration::from_secs(60));

    assert_eq!(s.alert_check_interval(), Duration::from_secs(30));
    assert_eq!(s.quote_cache_ttl(), Duration::from_secs(10));
}

#[test]
fn zero_values_are_clamped() {
    let s = Settings {
        alert_check_interval_secs: 0,
        alert_fetch_batch_size: 0,
        ..Settings::default()
    };

    assert_eq!(s.alert_check_interval(), Duration::from_secs(1));
    assert_eq!(s.alert_settings().fetch_batch_size, 1);
}

#[test]
fn trigger_policy_parses() {
    assert_eq!("ONCE".parse::<TriggerPolicy>().unwrap(), TriggerPolicy::Once);
    assert_eq!("rearm".parse::<TriggerPolicy>().unwrap(), TriggerPolicy::Rearm);
    assert!("sometimes".parse::<TriggerPolicy>().is_err());
}
