use std::env;

use appointd::config::Config;
use serial_test::serial;

const CONFIG_VARS: &[&str] = &[
    "DATABASE_URL",
    "JWT_SECRET",
    "JWT_EXPIRATION_DAYS",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "PAGE_SIZE",
    "MAIL_FROM",
];

fn snapshot_env() -> Vec<(&'static str, Option<String>)> {
    CONFIG_VARS
        .iter()
        .map(|key| (*key, env::var(key).ok()))
        .collect()
}

fn restore_env(snapshot: Vec<(&'static str, Option<String>)>) {
    for (key, value) in snapshot {
        match value {
            Some(val) => env::set_var(key, val),
            None => env::remove_var(key),
        }
    }
}

#[test]
#[serial]
fn config_defaults_when_env_is_empty() {
    let snapshot = snapshot_env();
    for key in CONFIG_VARS {
        env::remove_var(key);
    }

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://@localhost:5432/appointd");
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
    assert_eq!(config.environment, "development");
    assert_eq!(config.page_size, 10);
    assert_eq!(config.mail_from, "appointments@localhost");

    restore_env(snapshot);
}

#[test]
#[serial]
fn config_reads_custom_values() {
    let snapshot = snapshot_env();

    env::set_var("DATABASE_URL", "postgres://test@db:5432/appointments");
    env::set_var("JWT_SECRET", "test-secret");
    env::set_var("JWT_EXPIRATION_DAYS", "7");
    env::set_var("HOST", "0.0.0.0");
    env::set_var("PORT", "3000");
    env::set_var("ENVIRONMENT", "production");
    env::set_var("PAGE_SIZE", "25");
    env::set_var("MAIL_FROM", "booking@example.com");

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.database_url, "postgres://test@db:5432/appointments");
    assert_eq!(config.jwt_secret, "test-secret");
    assert_eq!(config.jwt_expiration_days, 7);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 3000);
    assert_eq!(config.environment, "production");
    assert_eq!(config.page_size, 25);
    assert_eq!(config.mail_from, "booking@example.com");

    restore_env(snapshot);
}

#[test]
#[serial]
fn invalid_numeric_values_fall_back_to_defaults() {
    let snapshot = snapshot_env();

    env::set_var("PORT", "not-a-port");
    env::set_var("JWT_EXPIRATION_DAYS", "soon");
    env::set_var("PAGE_SIZE", "lots");

    let config = Config::from_env_only().unwrap();

    assert_eq!(config.port, 8080);
    assert_eq!(config.jwt_expiration_days, 30);
    assert_eq!(config.page_size, 10);

    restore_env(snapshot);
}

#[test]
fn environment_detection() {
    let mut config = Config {
        database_url: "test".to_string(),
        jwt_secret: "test".to_string(),
        jwt_expiration_days: 1,
        host: "localhost".to_string(),
        port: 8080,
        environment: "production".to_string(),
        page_size: 10,
        mail_from: "test@localhost".to_string(),
    };

    assert!(config.is_production());
    assert!(!config.is_development());

    config.environment = "development".to_string();
    assert!(!config.is_production());
    assert!(config.is_development());
}

#[test]
fn server_address_formatting() {
    let config = Config {
        database_url: "test".to_string(),
        jwt_secret: "test".to_string(),
        jwt_expiration_days: 1,
        host: "192.168.1.1".to_string(),
        port: 9000,
        environment: "test".to_string(),
        page_size: 10,
        mail_from: "test@localhost".to_string(),
    };

    assert_eq!(config.server_address(), "192.168.1.1:9000");
}
