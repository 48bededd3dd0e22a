//! # 休暇申請ユースケース
//!
//! 休暇申請の提出・承認・却下と、それぞれの通知。
//!
//! ## 審査のルール
//!
//! - 審査できるのは有効な管理者・マネージャーのみ（それ以外は `Forbidden`）
//! - `pending` 以外の申請は審査できない（`Conflict`）
//! - 永続化は `WHERE status = 'pending'` の条件付き更新で、対象の申請以外は変更しない

use std::sync::Arc;

use chrono::NaiveDate;
use teamboard_domain::{
    clock::Clock,
    leave::{LeaveRequest, LeaveRequestId, LeaveType, NewLeaveRequest},
    user::{UserId, UserRole},
};
use teamboard_infra::repository::{LeaveRequestRepository, UserRepository};
use teamboard_shared::{event_log::event, log_business_event};

use super::{
    WithNotification,
    helpers::{FindResultExt, warn_if_failed},
    notification::NotificationService,
};
use crate::error::CoreError;

/// 休暇申請の入力
pub struct SubmitLeaveInput {
    pub user_id:    UserId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    pub reason:     Option<String>,
}

/// 承認・却下の入力
pub struct ReviewLeaveInput {
    pub leave_request_id: LeaveRequestId,
    pub reviewer_id:      UserId,
    pub notes:            Option<String>,
}

/// 審査の判定
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Decision {
    Approve,
    Reject,
}

pub struct LeaveUseCaseImpl {
    leave_repo:   Arc<dyn LeaveRequestRepository>,
    user_repo:    Arc<dyn UserRepository>,
    notification: Arc<NotificationService>,
    clock:        Arc<dyn Clock>,
}

impl LeaveUseCaseImpl {
    pub fn new(
        leave_repo: Arc<dyn LeaveRequestRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            leave_repo,
            user_repo,
            notification,
            clock,
        }
    }

    /// 休暇を申請し、申請者とマネージャーに通知する
    pub async fn submit_leave(
        &self,
        input: SubmitLeaveInput,
    ) -> Result<WithNotification<LeaveRequest>, CoreError> {
        self.user_repo
            .find_by_id(&input.user_id)
            .await
            .or_not_found("ユーザー")?;

        let leave = LeaveRequest::new(NewLeaveRequest {
            id:         LeaveRequestId::new(),
            user_id:    input.user_id,
            leave_type: input.leave_type,
            start_date: input.start_date,
            end_date:   input.end_date,
            reason:     input.reason,
            now:        self.clock.now(),
        })?;
        self.leave_repo.insert(&leave).await?;

        log_business_event!(
            event.category = event::category::LEAVE,
            event.action = event::action::LEAVE_SUBMITTED,
            event.entity_type = event::entity_type::LEAVE_REQUEST,
            event.entity_id = %leave.id(),
            event.actor_id = %leave.user_id(),
            event.result = event::result::SUCCESS,
            "休暇を申請"
        );

        let outcome = self.notification.notify_leave_submitted(leave.id()).await;
        warn_if_failed(&outcome, event::action::LEAVE_SUBMITTED);

        Ok(WithNotification::notified(leave, outcome))
    }

    /// 休暇申請を承認する
    pub async fn approve_leave(
        &self,
        input: ReviewLeaveInput,
    ) -> Result<WithNotification<LeaveRequest>, CoreError> {
        self.review(input, Decision::Approve).await
    }

    /// 休暇申請を却下する
    pub async fn reject_leave(
        &self,
        input: ReviewLeaveInput,
    ) -> Result<WithNotification<LeaveRequest>, CoreError> {
        self.review(input, Decision::Reject).await
    }

    async fn review(
        &self,
        input: ReviewLeaveInput,
        decision: Decision,
    ) -> Result<WithNotification<LeaveRequest>, CoreError> {
        let reviewer = self
            .user_repo
            .find_by_id(&input.reviewer_id)
            .await
            .or_not_found("審査者")?;
        if !reviewer.is_active() || !matches!(reviewer.role(), UserRole::Admin | UserRole::Manager)
        {
            return Err(CoreError::Forbidden(
                "休暇申請を審査できるのは管理者またはマネージャーのみです".to_string(),
            ));
        }

        let leave = self
            .leave_repo
            .find_by_id(&input.leave_request_id)
            .await
            .or_not_found("休暇申請")?;

        let now = self.clock.now();
        let (leave, action) = match decision {
            Decision::Approve => (
                leave.approved(input.reviewer_id, input.notes, now)?,
                event::action::LEAVE_APPROVED,
            ),
            Decision::Reject => (
                leave.rejected(input.reviewer_id, input.notes, now)?,
                event::action::LEAVE_REJECTED,
            ),
        };
        self.leave_repo.update_review(&leave).await?;

        log_business_event!(
            event.category = event::category::LEAVE,
            event.action = action,
            event.entity_type = event::entity_type::LEAVE_REQUEST,
            event.entity_id = %leave.id(),
            event.actor_id = %reviewer.id(),
            event.result = event::result::SUCCESS,
            "休暇申請を審査"
        );

        let outcome = self
            .notification
            .notify_leave_status_changed(leave.id())
            .await;
        warn_if_failed(&outcome, action);

        Ok(WithNotification::notified(leave, outcome))
    }
}
