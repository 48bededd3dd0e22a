//! Noop 通知送信実装
//!
//! メールを実際に送信せず、ログ出力のみ行う。
//! 開発環境や通知無効化時に使用する。

use async_trait::async_trait;
use teamboard_domain::notification::{EmailMessage, NotificationError, SendReceipt};
use uuid::Uuid;

use super::NotificationSender;

/// Noop 通知送信（ログ出力のみ）
///
/// 常に成功し、`mock-<uuid>` 形式の合成メッセージ ID を返す。
#[derive(Debug, Clone, Default)]
pub struct NoopNotificationSender;

#[async_trait]
impl NotificationSender for NoopNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        let message_id = format!("mock-{}", Uuid::new_v4());

        tracing::info!(
            recipient_count = email.recipient_count(),
            subject = %email.subject,
            attachment_count = email.attachments.len(),
            message_id = %message_id,
            "Noop: メール送信をスキップ"
        );

        Ok(SendReceipt { message_id })
    }
}
