//! # Core Service 設定
//!
//! 環境変数から Core Service サーバーの設定を読み込む。
//!
//! 必須変数の欠落や値のパース失敗は [`ConfigError`] として返す。

use std::env;

use strum::IntoStaticStr;
use thiserror::Error;

/// 設定読み込みエラー
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// 必須の環境変数が未設定
    #[error("{0} が設定されていません")]
    Missing(&'static str),

    /// 値のパースに失敗
    #[error("{key} の値が不正です: {value:?}（{reason}）")]
    Invalid {
        key:    &'static str,
        value:  String,
        reason: String,
    },
}

/// Core Service サーバーの設定
#[derive(Debug, Clone)]
pub struct CoreConfig {
    /// バインドアドレス
    pub host:         String,
    /// ポート番号
    pub port:         u16,
    /// データベース接続 URL
    pub database_url: String,
    /// 実行環境（`development` | `production` など）
    pub app_env:      String,
    /// 通知設定
    pub notification: NotificationConfig,
}

/// 通知の送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum NotificationBackend {
    /// SMTP サーバー経由で送信
    Smtp,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知機能の設定
///
/// `NOTIFICATION_BACKEND` 未設定時は `APP_ENV=production` なら SMTP、それ以外は Noop。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    pub backend:       NotificationBackend,
    pub smtp_host:     String,
    pub smtp_port:     u16,
    /// implicit TLS を使うか
    pub smtp_secure:   bool,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    /// 送信元メールアドレス
    pub from_address:  String,
    /// フロントエンド URL（メール内リンク用）
    pub base_url:      String,
}

impl CoreConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を読み込む
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let app_env = lookup("APP_ENV").unwrap_or_else(|| "development".to_string());

        Ok(Self {
            host: lookup("CORE_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_port("CORE_PORT", lookup("CORE_PORT"))?
                .ok_or(ConfigError::Missing("CORE_PORT"))?,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            notification: NotificationConfig::from_lookup(&lookup, &app_env)?,
            app_env,
        })
    }
}

impl NotificationConfig {
    fn from_lookup(
        lookup: &impl Fn(&str) -> Option<String>,
        app_env: &str,
    ) -> Result<Self, ConfigError> {
        let backend = match lookup("NOTIFICATION_BACKEND") {
            Some(value) => value
                .parse::<NotificationBackend>()
                .map_err(|e| ConfigError::Invalid {
                    key:    "NOTIFICATION_BACKEND",
                    value:  value.clone(),
                    reason: e.to_string(),
                })?,
            None if app_env == "production" => NotificationBackend::Smtp,
            None => NotificationBackend::Noop,
        };

        Ok(Self {
            backend,
            smtp_host: lookup("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port: parse_port("SMTP_PORT", lookup("SMTP_PORT"))?.unwrap_or(1025),
            smtp_secure: parse_bool("SMTP_SECURE", lookup("SMTP_SECURE"))?.unwrap_or(false),
            smtp_username: lookup("SMTP_USERNAME").filter(|v| !v.is_empty()),
            smtp_password: lookup("SMTP_PASSWORD").filter(|v| !v.is_empty()),
            from_address: lookup("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@teamboard.example.com".to_string()),
            base_url: lookup("NOTIFICATION_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "http://localhost:5173".to_string()),
        })
    }
}

fn parse_port(key: &'static str, value: Option<String>) -> Result<Option<u16>, ConfigError> {
    value
        .map(|v| {
            v.trim().parse::<u16>().map_err(|e| ConfigError::Invalid {
                key,
                value: v.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: Option<String>) -> Result<Option<bool>, ConfigError> {
    value
        .map(|v| match v.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" | "" => Ok(false),
            _ => Err(ConfigError::Invalid {
                key,
                value: v.clone(),
                reason: "true または false を指定してください".to_string(),
            }),
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("CORE_PORT", "13001"),
        ("DATABASE_URL", "postgres://localhost/teamboard"),
    ];

    #[test]
    fn test_未設定の項目はデフォルト値になる() {
        let config = CoreConfig::from_lookup(lookup_from(&REQUIRED)).unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 13001);
        assert_eq!(config.app_env, "development");
        assert_eq!(
            config.notification,
            NotificationConfig {
                backend:       NotificationBackend::Noop,
                smtp_host:     "localhost".to_string(),
                smtp_port:     1025,
                smtp_secure:   false,
                smtp_username: None,
                smtp_password: None,
                from_address:  "noreply@teamboard.example.com".to_string(),
                base_url:      "http://localhost:5173".to_string(),
            }
        );
    }

    #[rstest]
    #[case("CORE_PORT")]
    #[case("DATABASE_URL")]
    fn test_必須項目がなければmissingエラー(#[case] missing: &'static str) {
        let pairs: Vec<(&str, &str)> = REQUIRED
            .iter()
            .copied()
            .filter(|(k, _)| *k != missing)
            .collect();

        let result = CoreConfig::from_lookup(lookup_from(&pairs));

        assert_eq!(result.unwrap_err(), ConfigError::Missing(missing));
    }

    #[rstest]
    #[case("CORE_PORT", "not-a-port")]
    #[case("CORE_PORT", "70000")]
    #[case("SMTP_PORT", "-1")]
    fn test_不正なポートはinvalidエラー(#[case] key: &'static str, #[case] value: &str) {
        let mut pairs = REQUIRED.to_vec();
        pairs.retain(|(k, _)| *k != key);
        pairs.push((key, value));

        let result = CoreConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(result, Err(ConfigError::Invalid { key: k, .. }) if k == key));
    }

    #[rstest]
    #[case(None, "production", NotificationBackend::Smtp)]
    #[case(None, "development", NotificationBackend::Noop)]
    #[case(Some("noop"), "production", NotificationBackend::Noop)]
    #[case(Some("SMTP"), "development", NotificationBackend::Smtp)]
    fn test_送信バックエンドの選択(
        #[case] backend: Option<&str>,
        #[case] app_env: &str,
        #[case] expected: NotificationBackend,
    ) {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", app_env));
        if let Some(backend) = backend {
            pairs.push(("NOTIFICATION_BACKEND", backend));
        }

        let config = CoreConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.notification.backend, expected);
    }

    #[test]
    fn test_不明な送信バックエンドはinvalidエラー() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("NOTIFICATION_BACKEND", "ses"));

        let result = CoreConfig::from_lookup(lookup_from(&pairs));

        assert!(matches!(
            result,
            Err(ConfigError::Invalid { key: "NOTIFICATION_BACKEND", .. })
        ));
    }

    #[test]
    fn test_smtp認証情報とtls設定を読み込む() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("SMTP_SECURE", "true"),
            ("SMTP_USERNAME", "mailer"),
            ("SMTP_PASSWORD", "secret"),
            ("NOTIFICATION_BASE_URL", "https://teamboard.example.com/"),
        ]);

        let config = CoreConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert!(config.notification.smtp_secure);
        assert_eq!(config.notification.smtp_username.as_deref(), Some("mailer"));
        assert_eq!(config.notification.smtp_password.as_deref(), Some("secret"));
        assert_eq!(config.notification.base_url, "https://teamboard.example.com");
    }
}
