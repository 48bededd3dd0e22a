//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **2 つの実装**: SMTP（lettre）、Noop（ログ出力のみ）
//! - **起動時に選択**: どちらを使うかはプロセス起動時に一度だけ決め、
//!   `Arc<dyn NotificationSender>` として注入する

mod noop;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use smtp::{SmtpNotificationSender, SmtpSettings};
use teamboard_domain::notification::{EmailMessage, NotificationError, SendReceipt};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// 実装はパニックせず、すべての失敗を `NotificationError` で返す。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信し、メッセージ ID を返す
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError>;
}
