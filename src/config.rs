//! 設定
//!
//! 既定値 → `config/default` → `config/{RUN_MODE}` → 環境変数（`LIBRARY__*`）
//! → `DATABASE_URL` の順に重ねる。

use crate::domain::ReservationPolicy;
use chrono::Duration;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    /// 起動時にマイグレーションを適用する
    pub run_migrations: bool,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct AuthConfig {
    pub session_ttl_hours: i64,
}

impl AuthConfig {
    pub fn session_ttl(&self) -> Result<Duration, ConfigError> {
        in_range(
            "auth.session_ttl_hours",
            self.session_ttl_hours,
            Duration::try_hours,
        )
    }
}

/// ログの出力形式
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `RUST_LOG` 未設定時のフィルタ
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct I18nConfig {
    pub default_locale: String,
    /// `<locale>.json` を置くディレクトリ（未指定なら英語のみ）
    pub locales_dir: Option<String>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ReservationsConfig {
    pub loan_period_days: i64,
    pub reminder_window_days: i64,
}

impl ReservationsConfig {
    pub fn policy(&self) -> Result<ReservationPolicy, ConfigError> {
        Ok(ReservationPolicy {
            loan_period: in_range(
                "reservations.loan_period_days",
                self.loan_period_days,
                Duration::try_days,
            )?,
            reminder_window: in_range(
                "reservations.reminder_window_days",
                self.reminder_window_days,
                Duration::try_days,
            )?,
        })
    }
}

/// 範囲外の値は設定エラー
fn in_range(
    key: &str,
    value: i64,
    to_duration: fn(i64) -> Option<Duration>,
) -> Result<Duration, ConfigError> {
    to_duration(value)
        .ok_or_else(|| ConfigError::Message(format!("{} is out of range: {}", key, value)))
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub i18n: I18nConfig,
    pub reservations: ReservationsConfig,
}

impl AppConfig {
    /// 設定ファイルと環境変数から読み込む
    ///
    /// 設定ファイルはどちらも省略可能。
    pub fn load() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let config = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // LIBRARY__SERVER__PORT=8080 など
            .add_source(
                Environment::with_prefix("LIBRARY")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("database.url", env::var("DATABASE_URL").ok())?
            .build()?;

        config.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgres://localhost/library".to_string(),
            max_connections: 5,
            run_migrations: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_hours: 24,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "rusty_library_reservations=debug,tower_http=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            default_locale: "en".to_string(),
            locales_dir: None,
        }
    }
}

impl Default for ReservationsConfig {
    fn default() -> Self {
        Self {
            loan_period_days: crate::domain::DEFAULT_LOAN_PERIOD_DAYS,
            reminder_window_days: crate::domain::REMINDER_WINDOW_DAYS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_toml(raw: &str) -> AppConfig {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server_addr(), "0.0.0.0:3000");
        assert_eq!(config.auth.session_ttl_hours, 24);
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert_eq!(
            config.reservations.policy().unwrap(),
            ReservationPolicy::default()
        );
        assert_eq!(config.auth.session_ttl().unwrap(), Duration::hours(24));
    }

    #[test]
    fn test_empty_source_yields_defaults() {
        assert_eq!(from_toml(""), AppConfig::default());
    }

    #[test]
    fn test_partial_override_keeps_other_defaults() {
        let config = from_toml(
            r#"
            [server]
            port = 8080

            [logging]
            format = "json"

            [reservations]
            loan_period_days = 14
            "#,
        );

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Json);
        let policy = config.reservations.policy().unwrap();
        assert_eq!(policy.loan_period, Duration::days(14));
        assert_eq!(policy.reminder_window, Duration::days(12));
    }

    #[test]
    fn test_out_of_range_durations_are_config_errors() {
        let config = from_toml(
            r#"
            [auth]
            session_ttl_hours = 9223372036854775807

            [reservations]
            reminder_window_days = 9223372036854775807
            "#,
        );

        assert!(matches!(
            config.reservations.policy(),
            Err(ConfigError::Message(message)) if message.contains("reminder_window_days")
        ));
        assert!(matches!(
            config.auth.session_ttl(),
            Err(ConfigError::Message(message)) if message.contains("session_ttl_hours")
        ));
    }

    #[test]
    fn test_unknown_log_format_is_rejected() {
        let result = Config::builder()
            .add_source(File::from_str(
                "[logging]\nformat = \"xml\"",
                FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<AppConfig>();
        assert!(result.is_err());
    }
}
