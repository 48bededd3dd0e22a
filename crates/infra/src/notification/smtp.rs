//! SMTP 通知送信実装
//!
//! lettre の `AsyncSmtpTransport` を使用してメールを送信する。
//! コネクションプールは使わず、送信ごとに接続する。
//! 開発環境では Mailpit（ローカル SMTP サーバー）に接続する。

use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport,
    AsyncTransport,
    Tokio1Executor,
    message::{
        Attachment as MailAttachment,
        Mailbox,
        Message,
        MultiPart,
        SinglePart,
        header::ContentType,
    },
    transport::smtp::authentication::Credentials,
};
use teamboard_domain::notification::{EmailMessage, NotificationError, SendReceipt};
use uuid::Uuid;

use super::NotificationSender;

/// SMTP 接続設定
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    /// SMTP サーバーのホスト名（例: "localhost"）
    pub host:         String,
    /// SMTP サーバーのポート番号（例: 1025 for Mailpit）
    pub port:         u16,
    /// `true` なら implicit TLS、`false` なら平文で接続する
    pub secure:       bool,
    pub username:     Option<String>,
    pub password:     Option<String>,
    /// 送信元メールアドレス
    pub from_address: String,
}

/// SMTP 通知送信
///
/// `lettre::AsyncSmtpTransport<Tokio1Executor>` をラップする。
pub struct SmtpNotificationSender {
    transport:      AsyncSmtpTransport<Tokio1Executor>,
    from:           Mailbox,
    message_domain: String,
}

impl SmtpNotificationSender {
    /// 新しい SMTP 送信インスタンスを作成
    ///
    /// 送信元アドレスが不正な場合や TLS の初期化に失敗した場合はエラー。
    pub fn new(settings: &SmtpSettings) -> Result<Self, NotificationError> {
        let from: Mailbox = settings
            .from_address
            .parse()
            .map_err(|e| NotificationError::SendFailed(format!("送信元アドレス不正: {e}")))?;

        let builder = if settings.secure {
            AsyncSmtpTransport::<Tokio1Executor>::relay(&settings.host)
                .map_err(|e| NotificationError::SendFailed(format!("TLS 設定失敗: {e}")))?
                .port(settings.port)
        } else {
            // builder_dangerous: TLS なしで接続（Mailpit 等のローカル SMTP 向け）
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&settings.host)
                .port(settings.port)
        };

        let builder = match (&settings.username, &settings.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        let message_domain = from.email.domain().to_string();

        Ok(Self {
            transport: builder.build(),
            from,
            message_domain,
        })
    }

    /// `EmailMessage` から lettre の `Message` を組み立てる
    fn build_message(
        &self,
        email: &EmailMessage,
        message_id: &str,
    ) -> Result<Message, NotificationError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(&email.subject)
            .message_id(Some(message_id.to_string()));

        // 解析できない宛先は除外し、残りの宛先には送る
        let to = valid_mailboxes(&email.to);
        let cc = valid_mailboxes(&email.cc);
        let bcc = valid_mailboxes(&email.bcc);
        if to.is_empty() && cc.is_empty() && bcc.is_empty() {
            return Err(NotificationError::SendFailed(
                "有効な宛先アドレスがありません".to_string(),
            ));
        }

        for mailbox in to {
            builder = builder.to(mailbox);
        }
        for mailbox in cc {
            builder = builder.cc(mailbox);
        }
        for mailbox in bcc {
            builder = builder.bcc(mailbox);
        }

        let alternative = MultiPart::alternative()
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_PLAIN)
                    .body(email.text_body.clone()),
            )
            .singlepart(
                SinglePart::builder()
                    .header(ContentType::TEXT_HTML)
                    .body(email.html_body.clone()),
            );

        let body = if email.attachments.is_empty() {
            alternative
        } else {
            let mut mixed = MultiPart::mixed().multipart(alternative);
            for attachment in &email.attachments {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    NotificationError::SendFailed(format!("添付ファイルの Content-Type 不正: {e}"))
                })?;
                mixed = mixed.singlepart(
                    MailAttachment::new(attachment.filename.clone())
                        .body(attachment.content.clone(), content_type),
                );
            }
            mixed
        };

        builder
            .multipart(body)
            .map_err(|e| NotificationError::SendFailed(format!("メッセージ構築失敗: {e}")))
    }
}

fn valid_mailboxes(addresses: &[String]) -> Vec<Mailbox> {
    addresses
        .iter()
        .filter_map(|address| match address.parse::<Mailbox>() {
            Ok(mailbox) => Some(mailbox),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    "SMTP: 解析できない宛先アドレスを除外しました"
                );
                None
            }
        })
        .collect()
}

#[async_trait]
impl NotificationSender for SmtpNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        let message_id = format!("<{}@{}>", Uuid::now_v7(), self.message_domain);
        let message = self.build_message(email, &message_id)?;

        self.transport
            .send(message)
            .await
            .map_err(|e| NotificationError::SendFailed(format!("SMTP 送信失敗: {e}")))?;

        tracing::debug!(
            recipient_count = email.recipient_count(),
            message_id = %message_id,
            "SMTP: メールを送信しました"
        );

        Ok(SendReceipt { message_id })
    }
}

#[cfg(test)]
mod tests {
    use teamboard_domain::notification::Attachment;

    use super::*;

    fn settings() -> SmtpSettings {
        SmtpSettings {
            host:         "localhost".to_string(),
            port:         1025,
            secure:       false,
            username:     None,
            password:     None,
            from_address: "noreply@teamboard.example.com".to_string(),
        }
    }

    fn email() -> EmailMessage {
        EmailMessage {
            to: vec![
                "alice@example.com".to_string(),
                "bob@example.com".to_string(),
            ],
            subject: "Task Assigned: Write docs".to_string(),
            html_body: "<p>hello</p>".to_string(),
            text_body: "hello".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SmtpNotificationSender>();
    }

    #[tokio::test]
    async fn test_不正な送信元アドレスはエラーになる() {
        let result = SmtpNotificationSender::new(&SmtpSettings {
            from_address: "not-an-address".to_string(),
            ..settings()
        });

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_メッセージに全宛先とmessage_idが設定される() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();

        let message = sender
            .build_message(&email(), "<abc@teamboard.example.com>")
            .unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("alice@example.com"));
        assert!(raw.contains("bob@example.com"));
        assert!(raw.contains("Message-ID: <abc@teamboard.example.com>"));
    }

    #[tokio::test]
    async fn test_不正な宛先アドレスはエラーになる() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();
        let email = EmailMessage {
            to: vec!["broken".to_string()],
            ..email()
        };

        let result = sender.build_message(&email, "<id@example.com>");

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
    }

    #[tokio::test]
    async fn test_解析できない宛先は除外され残りの宛先に送られる() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();
        let email = EmailMessage {
            to: vec![
                "good@example.com".to_string(),
                "bad admin@example.com".to_string(),
            ],
            ..email()
        };

        let message = sender.build_message(&email, "<id@example.com>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("good@example.com"));
        assert!(!raw.contains("bad admin@example.com"));
        assert_eq!(message.envelope().to().len(), 1);
    }

    #[tokio::test]
    async fn test_添付ファイル付きメッセージを構築できる() {
        let sender = SmtpNotificationSender::new(&settings()).unwrap();
        let email = EmailMessage {
            attachments: vec![Attachment {
                filename:     "report.csv".to_string(),
                content_type: "text/csv".to_string(),
                content:      b"a,b\n1,2\n".to_vec(),
            }],
            ..email()
        };

        let message = sender.build_message(&email, "<id@example.com>").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("report.csv"));
    }
}
