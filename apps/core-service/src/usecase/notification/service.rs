//! # 通知サービス
//!
//! コンテキスト読み込み → 受信者解決 → テンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **ベストエフォート**: `notify()` はエラーを返さず、結果を [`NotificationOutcome`] で返す。
//!   呼び出し元の業務処理はロールバックされない
//! - **汎用ディスパッチ**: イベント種別ごとの差分は [`route_for`] のルートと
//!   [`ContextLoader`] に閉じ込め、送信フローは 1 本にする
//! - **1 イベント 1 通**: 解決した受信者全員を宛先にして 1 回だけ送信する。再送はしない

use std::sync::Arc;

use teamboard_domain::{
    comment::CommentId,
    leave::LeaveRequestId,
    notification::{EmailMessage, NotificationEvent, NotificationEventType, NotificationOutcome},
    project::{MilestoneId, ProjectId},
    task::{TaskId, TaskStatus},
    user::UserId,
};
use teamboard_infra::notification::NotificationSender;
use teamboard_shared::{
    event_log::{error as log_error, event},
    log_business_event,
};

use super::{
    ContextLoader,
    LoadError,
    RecipientResolver,
    TemplateRenderer,
    route::route_for,
};

/// 通知サービス
///
/// 業務操作に伴うメール通知の全体フローを統合する。
pub struct NotificationService {
    sender:   Arc<dyn NotificationSender>,
    renderer: TemplateRenderer,
    loader:   ContextLoader,
    resolver: RecipientResolver,
}

impl NotificationService {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        renderer: TemplateRenderer,
        loader: ContextLoader,
        resolver: RecipientResolver,
    ) -> Self {
        Self {
            sender,
            renderer,
            loader,
            resolver,
        }
    }

    /// 通知を送信する
    ///
    /// 失敗はすべて戻り値の [`NotificationOutcome`] で表現し、パニックしない。
    #[tracing::instrument(skip_all, level = "debug", fields(event_type = %event.event_type()))]
    pub async fn notify(&self, event: NotificationEvent) -> NotificationOutcome {
        let event_type = event.event_type();
        let event_type_str: &str = event_type.into();
        let entity_type = entity_type_of(event_type);
        let route = route_for(event_type);

        let context = match self.loader.load(&event).await {
            Ok(context) => context,
            Err(LoadError::NotFound(entity)) => {
                tracing::info!(
                    notification.event_type = event_type_str,
                    entity,
                    "通知対象のエンティティが見つからないため送信しない"
                );
                return NotificationOutcome::Failed {
                    error: LoadError::NotFound(entity).to_string(),
                };
            }
            Err(LoadError::Infra(e)) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    notification.event_type = event_type_str,
                    span_trace = %e.span_trace(),
                    "通知コンテキストの読み込みに失敗: {}",
                    e
                );
                return NotificationOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let recipients = match self.resolver.resolve(&route, &context).await {
            Ok(recipients) => recipients,
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    notification.event_type = event_type_str,
                    span_trace = %e.span_trace(),
                    "通知受信者の解決に失敗: {}",
                    e
                );
                return NotificationOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        if recipients.is_empty() {
            log_business_event!(
                event.category = event::category::NOTIFICATION,
                event.action = event::action::NOTIFICATION_SKIPPED,
                event.entity_type = entity_type,
                event.result = event::result::SKIPPED,
                notification.event_type = event_type_str,
                "通知受信者がいないため送信をスキップ"
            );
            return NotificationOutcome::skipped_no_recipients();
        }

        let rendered = match self.renderer.render(&context.payload) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::TEMPLATE,
                    notification.event_type = event_type_str,
                    "通知テンプレートのレンダリングに失敗: {}",
                    e
                );
                return NotificationOutcome::Failed {
                    error: e.to_string(),
                };
            }
        };

        let addresses: Vec<String> = recipients.into_iter().map(|r| r.email).collect();
        let email = EmailMessage {
            to: addresses.clone(),
            subject: rendered.subject,
            html_body: rendered.html_body,
            text_body: rendered.text_body,
            ..EmailMessage::default()
        };

        match self.sender.send_email(&email).await {
            Ok(receipt) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.entity_type = entity_type,
                    event.result = event::result::SUCCESS,
                    notification.event_type = event_type_str,
                    notification.recipient_count = addresses.len(),
                    notification.message_id = %receipt.message_id,
                    "通知メール送信成功"
                );
                NotificationOutcome::Sent {
                    message_id: receipt.message_id,
                    recipients: addresses,
                }
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.entity_type = entity_type,
                    event.result = event::result::FAILURE,
                    notification.event_type = event_type_str,
                    notification.recipient_count = addresses.len(),
                    error.category = log_error::category::EXTERNAL_SERVICE,
                    error.kind = log_error::kind::MAIL_TRANSPORT,
                    error = %e,
                    "通知メール送信失敗"
                );
                NotificationOutcome::Warning {
                    warning: e.to_string(),
                }
            }
        }
    }

    pub async fn notify_new_team_member(&self, user_id: &UserId) -> NotificationOutcome {
        self.notify(NotificationEvent::NewTeamMember {
            user_id: user_id.clone(),
        })
        .await
    }

    pub async fn notify_task_assigned(
        &self,
        task_id: &TaskId,
        assigned_by: &UserId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::TaskAssigned {
            task_id:     task_id.clone(),
            assigned_by: assigned_by.clone(),
        })
        .await
    }

    pub async fn notify_task_status_changed(
        &self,
        task_id: &TaskId,
        previous_status: TaskStatus,
        changed_by: &UserId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::TaskStatusChanged {
            task_id: task_id.clone(),
            previous_status,
            changed_by: changed_by.clone(),
        })
        .await
    }

    pub async fn notify_comment_added(&self, comment_id: &CommentId) -> NotificationOutcome {
        self.notify(NotificationEvent::CommentAdded {
            comment_id: comment_id.clone(),
        })
        .await
    }

    pub async fn notify_project_created(&self, project_id: &ProjectId) -> NotificationOutcome {
        self.notify(NotificationEvent::ProjectCreated {
            project_id: project_id.clone(),
        })
        .await
    }

    pub async fn notify_project_member_added(
        &self,
        project_id: &ProjectId,
        member_id: &UserId,
        added_by: &UserId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::ProjectMemberAdded {
            project_id: project_id.clone(),
            member_id:  member_id.clone(),
            added_by:   added_by.clone(),
        })
        .await
    }

    pub async fn notify_milestone_completed(
        &self,
        milestone_id: &MilestoneId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::MilestoneCompleted {
            milestone_id: milestone_id.clone(),
        })
        .await
    }

    pub async fn notify_leave_submitted(
        &self,
        leave_request_id: &LeaveRequestId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::LeaveSubmitted {
            leave_request_id: leave_request_id.clone(),
        })
        .await
    }

    pub async fn notify_leave_status_changed(
        &self,
        leave_request_id: &LeaveRequestId,
    ) -> NotificationOutcome {
        self.notify(NotificationEvent::LeaveStatusChanged {
            leave_request_id: leave_request_id.clone(),
        })
        .await
    }
}

/// イベント種別に対応するビジネスイベントログのエンティティ種別
pub(crate) fn entity_type_of(event_type: NotificationEventType) -> &'static str {
    match event_type {
        NotificationEventType::NewTeamMember => event::entity_type::USER,
        NotificationEventType::TaskAssigned | NotificationEventType::TaskStatusChanged => {
            event::entity_type::TASK
        }
        NotificationEventType::CommentAdded => event::entity_type::COMMENT,
        NotificationEventType::ProjectCreated | NotificationEventType::ProjectMemberAdded => {
            event::entity_type::PROJECT
        }
        NotificationEventType::MilestoneCompleted => event::entity_type::MILESTONE,
        NotificationEventType::LeaveSubmitted | NotificationEventType::LeaveStatusChanged => {
            event::entity_type::LEAVE_REQUEST
        }
    }
}
