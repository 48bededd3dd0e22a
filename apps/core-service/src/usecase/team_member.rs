//! # チームメンバーユースケース
//!
//! 管理者によるメンバー登録と、管理者への新メンバー通知。

use std::sync::Arc;

use teamboard_domain::{
    clock::Clock,
    user::{Email, NewUser, User, UserId, UserRole},
    value_objects::UserName,
};
use teamboard_infra::repository::UserRepository;
use teamboard_shared::{event_log::event, log_business_event};

use super::{WithNotification, helpers::warn_if_failed, notification::NotificationService};
use crate::error::CoreError;

/// メンバー登録の入力
pub struct CreateTeamMemberInput {
    pub name:       String,
    pub email:      String,
    pub role:       UserRole,
    pub department: Option<String>,
}

pub struct TeamMemberUseCaseImpl {
    user_repo:    Arc<dyn UserRepository>,
    notification: Arc<NotificationService>,
    clock:        Arc<dyn Clock>,
}

impl TeamMemberUseCaseImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        notification: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            user_repo,
            notification,
            clock,
        }
    }

    /// メンバーを登録し、管理者に通知する
    ///
    /// メールアドレスが登録済みの場合は `CoreError::Conflict`。
    pub async fn create_team_member(
        &self,
        input: CreateTeamMemberInput,
    ) -> Result<WithNotification<User>, CoreError> {
        let name = UserName::new(input.name)?;
        let email = Email::new(input.email)?;

        if self
            .user_repo
            .find_by_email(&email)
            .await
            .map_err(|e| CoreError::Internal(format!("ユーザーの取得に失敗: {}", e)))?
            .is_some()
        {
            return Err(CoreError::Conflict(format!(
                "メールアドレスは既に登録されています: {}",
                email
            )));
        }

        let user = User::new(NewUser {
            id: UserId::new(),
            name,
            email,
            role: input.role,
            department: input.department.filter(|d| !d.trim().is_empty()),
            now: self.clock.now(),
        });
        self.user_repo.insert(&user).await?;

        log_business_event!(
            event.category = event::category::TEAM,
            event.action = event::action::TEAM_MEMBER_CREATED,
            event.entity_type = event::entity_type::USER,
            event.entity_id = %user.id(),
            event.result = event::result::SUCCESS,
            "チームメンバーを登録"
        );

        let outcome = self.notification.notify_new_team_member(user.id()).await;
        warn_if_failed(&outcome, event::action::TEAM_MEMBER_CREATED);

        Ok(WithNotification::notified(user, outcome))
    }
}
