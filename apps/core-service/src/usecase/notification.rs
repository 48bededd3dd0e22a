//! # 通知ユースケース
//!
//! 業務操作をトリガーとしたメール通知の生成・送信を担当する。
//!
//! - [`route`]: イベント種別ごとの受信者取得元とテンプレート名
//! - [`context`]: トリガーとなったエンティティと関連エンティティの読み込み
//! - [`recipient_resolver`]: 受信者の解決と重複排除
//! - [`template_renderer`]: tera による件名・本文の生成
//! - [`service`]: 上記を束ねる [`NotificationService`]

pub mod context;
pub mod recipient_resolver;
pub mod route;
pub mod service;
pub mod template_renderer;

use std::sync::Arc;

pub use context::{ContextLoader, LoadError, NotificationContext};
pub use recipient_resolver::RecipientResolver;
pub use route::{NotificationRoute, RecipientSource, route_for};
pub use service::NotificationService;
use teamboard_domain::notification::NotificationError;
use teamboard_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    SmtpNotificationSender,
    SmtpSettings,
};
pub use template_renderer::{RenderedEmail, TemplateRenderer};

use crate::config::{NotificationBackend, NotificationConfig};

impl From<&NotificationConfig> for SmtpSettings {
    fn from(config: &NotificationConfig) -> Self {
        Self {
            host:         config.smtp_host.clone(),
            port:         config.smtp_port,
            secure:       config.smtp_secure,
            username:     config.smtp_username.clone(),
            password:     config.smtp_password.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

/// 設定に応じた送信実装を作成する
///
/// プロセス起動時に一度だけ呼び出す。
pub fn build_notification_sender(
    config: &NotificationConfig,
) -> Result<Arc<dyn NotificationSender>, NotificationError> {
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                secure = config.smtp_secure,
                "SMTP 送信を使用します"
            );
            Ok(Arc::new(SmtpNotificationSender::new(&SmtpSettings::from(
                config,
            ))?))
        }
        NotificationBackend::Noop => {
            tracing::info!("Noop 送信を使用します（メールは送信されません）");
            Ok(Arc::new(NoopNotificationSender))
        }
    }
}
