//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use usher_config::UsherConfig;

#[test]
fn loads_engine_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[engine]
chunk_size = 10
max_retries = 5
base_delay_ms = 100
backoff_multiplier = 2
"#,
        )?;

        let config: UsherConfig = Figment::from(Serialized::defaults(UsherConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.engine.chunk_size, 10);
        assert_eq!(config.engine.max_retries, 5);
        assert_eq!(config.engine.base_delay_ms, 100);
        assert_eq!(config.engine.backoff_multiplier, 2);
        Ok(())
    });
}

#[test]
fn loads_timeouts_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[timeouts]
breakout_close_wait_ms = 8000
breakout_close_poll_ms = 250
email_wait_ms = 15000
email_poll_ms = 500
"#,
        )?;

        let config: UsherConfig = Figment::from(Serialized::defaults(UsherConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.timeouts.breakout_close_wait_ms, 8_000);
        assert_eq!(config.timeouts.breakout_close_poll_ms, 250);
        assert_eq!(config.timeouts.email_wait_ms, 15_000);
        assert_eq!(config.timeouts.email_poll_ms, 500);
        Ok(())
    });
}

#[test]
fn loads_full_config_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[engine]
chunk_size = 8
max_retries = 2

[timeouts]
breakout_close_wait_ms = 3000

[storage]
state_dir = "/var/lib/usher"
trail = false
"#,
        )?;

        let config: UsherConfig = Figment::from(Serialized::defaults(UsherConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.engine.chunk_size, 8);
        assert_eq!(config.engine.max_retries, 2);
        // Unset fields keep their defaults.
        assert_eq!(config.engine.base_delay_ms, 300);
        assert_eq!(config.timeouts.breakout_close_wait_ms, 3_000);
        assert_eq!(config.timeouts.breakout_close_poll_ms, 400);
        assert_eq!(config.storage.state_dir, "/var/lib/usher");
        assert!(!config.storage.trail);
        Ok(())
    });
}

#[test]
fn env_var_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.set_env("USHER_ENGINE__MAX_RETRIES", "7");

        jail.create_file(
            "config.toml",
            r#"
[engine]
max_retries = 1
chunk_size = 3
"#,
        )?;

        let config: UsherConfig = Figment::from(Serialized::defaults(UsherConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("USHER_").split("__"))
            .extract()?;

        // Env should win over TOML
        assert_eq!(config.engine.max_retries, 7);
        // TOML value not overridden by env should remain
        assert_eq!(config.engine.chunk_size, 3);
        Ok(())
    });
}

/// Documents the figment gotcha: typo'd env var keys are silently ignored.
#[test]
fn typo_env_var_silently_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("USHER_ENGINE__MAX_RETRIESS", "99");

        let config: UsherConfig = Figment::from(Serialized::defaults(UsherConfig::default()))
            .merge(Env::prefixed("USHER_").split("__"))
            .extract()?;

        assert_eq!(
            config.engine.max_retries, 3,
            "typo'd env var should be silently ignored by figment"
        );
        Ok(())
    });
}
