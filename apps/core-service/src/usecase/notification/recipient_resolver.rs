//! # 受信者解決
//!
//! [`NotificationRoute`] の受信者取得元を順に展開し、メールアドレスで重複排除した
//! 受信者リストを作る。
//!
//! - メールアドレスの比較は大文字小文字を区別しない
//! - 最初に現れた受信者を残し、出現順を保つ
//! - 役割（管理者・マネージャー）で引く場合は有効なユーザーのみ

use std::sync::Arc;

use itertools::Itertools;
use teamboard_domain::{
    notification::Recipient,
    user::{User, UserRole},
};
use teamboard_infra::{InfraError, repository::UserRepository};

use super::{
    context::NotificationContext,
    route::{NotificationRoute, RecipientSource},
};

/// 受信者リゾルバ
pub struct RecipientResolver {
    user_repo: Arc<dyn UserRepository>,
}

impl RecipientResolver {
    pub fn new(user_repo: Arc<dyn UserRepository>) -> Self {
        Self { user_repo }
    }

    /// ルートとコンテキストから受信者を解決する
    pub async fn resolve(
        &self,
        route: &NotificationRoute,
        context: &NotificationContext,
    ) -> Result<Vec<Recipient>, InfraError> {
        let mut candidates: Vec<Recipient> = Vec::new();

        for source in route.sources {
            match source {
                RecipientSource::Assignee => {
                    candidates.extend(context.assignee.iter().map(to_recipient));
                }
                RecipientSource::ProjectMembers => {
                    candidates.extend(context.project_members.iter().map(to_recipient));
                }
                RecipientSource::Admins => {
                    candidates.extend(self.active_by_role(UserRole::Admin).await?);
                }
                RecipientSource::Managers => {
                    candidates.extend(self.active_by_role(UserRole::Manager).await?);
                }
                RecipientSource::Requester => {
                    candidates.extend(context.requester.iter().map(to_recipient));
                }
                RecipientSource::AddedMember => {
                    candidates.extend(context.added_member.iter().map(to_recipient));
                }
            }
        }

        Ok(dedup_by_email(candidates))
    }

    async fn active_by_role(&self, role: UserRole) -> Result<Vec<Recipient>, InfraError> {
        let users = self.user_repo.find_active_by_role(role).await?;
        Ok(users.iter().map(to_recipient).collect())
    }
}

fn to_recipient(user: &User) -> Recipient {
    Recipient {
        user_id: user.id().clone(),
        name:    user.name().as_str().to_string(),
        email:   user.email().as_str().to_string(),
    }
}

/// メールアドレス（大文字小文字を無視）で重複を除く
///
/// 最初に現れた受信者を残し、順序は保持する。
pub fn dedup_by_email(recipients: Vec<Recipient>) -> Vec<Recipient> {
    recipients
        .into_iter()
        .unique_by(|r| r.email.to_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Utc};
    use pretty_assertions::assert_eq;
    use teamboard_domain::{
        notification::{NotificationEventType, NotificationPayload},
        user::{Email, NewUser, UserId, UserRecord, UserStatus},
        value_objects::UserName,
    };
    use teamboard_infra::mock::MockUserRepository;

    use super::*;
    use crate::usecase::notification::route::route_for;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn user(name: &str, email: &str, role: UserRole) -> User {
        User::new(NewUser {
            id: UserId::new(),
            name: UserName::new(name).unwrap(),
            email: Email::new(email).unwrap(),
            role,
            department: None,
            now: now(),
        })
    }

    fn inactive_user(name: &str, email: &str, role: UserRole) -> User {
        User::from_db(UserRecord {
            id: UserId::new(),
            name: UserName::new(name).unwrap(),
            email: Email::new(email).unwrap(),
            role,
            department: None,
            status: UserStatus::Inactive,
            created_at: now(),
            updated_at: now(),
        })
    }

    fn recipient(name: &str, email: &str) -> Recipient {
        Recipient {
            user_id: UserId::new(),
            name:    name.to_string(),
            email:   email.to_string(),
        }
    }

    fn context() -> NotificationContext {
        NotificationContext {
            payload:         NotificationPayload::NewTeamMember {
                member_id:   UserId::new(),
                member_name: "新人".to_string(),
                email:       "new@example.com".to_string(),
                role:        "member".to_string(),
                department:  None,
            },
            assignee:        None,
            project_members: Vec::new(),
            requester:       None,
            added_member:    None,
        }
    }

    #[test]
    fn test_dedup_by_emailは大文字小文字を無視して先勝ちで順序を保つ() {
        let recipients = vec![
            recipient("A", "a@example.com"),
            recipient("B", "b@example.com"),
            recipient("A2", "A@Example.com"),
            recipient("C", "c@example.com"),
        ];

        let result = dedup_by_email(recipients);

        let names: Vec<&str> = result.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
    }

    #[tokio::test]
    async fn test_プロジェクトメンバー兼管理者は一度だけ含まれる() {
        let user_repo = MockUserRepository::new();
        let admin = user("管理者", "admin@example.com", UserRole::Admin);
        let assignee = user("担当者", "assignee@example.com", UserRole::Member);
        user_repo.add_user(admin.clone());
        user_repo.add_user(assignee.clone());
        let resolver = RecipientResolver::new(Arc::new(user_repo));

        let mut ctx = context();
        ctx.assignee = Some(assignee);
        ctx.project_members = vec![admin];

        let result = resolver
            .resolve(&route_for(NotificationEventType::TaskStatusChanged), &ctx)
            .await
            .unwrap();

        let emails: Vec<&str> = result.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["assignee@example.com", "admin@example.com"]);
    }

    #[tokio::test]
    async fn test_休暇申請は申請者とマネージャーに届く() {
        let user_repo = MockUserRepository::new();
        let manager = user("マネージャー", "manager@example.com", UserRole::Manager);
        user_repo.add_user(manager);
        user_repo.add_user(user("管理者", "admin@example.com", UserRole::Admin));
        let resolver = RecipientResolver::new(Arc::new(user_repo));

        let mut ctx = context();
        ctx.requester = Some(user("申請者", "requester@example.com", UserRole::Member));

        let result = resolver
            .resolve(&route_for(NotificationEventType::LeaveSubmitted), &ctx)
            .await
            .unwrap();

        let emails: Vec<&str> = result.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(emails, vec!["requester@example.com", "manager@example.com"]);
    }

    #[tokio::test]
    async fn test_担当者がいなければタスク割り当ての受信者は空() {
        let resolver = RecipientResolver::new(Arc::new(MockUserRepository::new()));

        let result = resolver
            .resolve(&route_for(NotificationEventType::TaskAssigned), &context())
            .await
            .unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_無効化された管理者とマネージャーは宛先に含まれない() {
        let user_repo = MockUserRepository::new();
        user_repo.add_user(user("管理者", "admin@example.com", UserRole::Admin));
        user_repo.add_user(inactive_user("元管理者", "former-admin@example.com", UserRole::Admin));
        user_repo.add_user(inactive_user(
            "元マネージャー",
            "former-manager@example.com",
            UserRole::Manager,
        ));
        let resolver = RecipientResolver::new(Arc::new(user_repo));

        let mut ctx = context();
        ctx.requester = Some(user("申請者", "requester@example.com", UserRole::Member));

        let team = resolver
            .resolve(&route_for(NotificationEventType::NewTeamMember), &ctx)
            .await
            .unwrap();
        let leave = resolver
            .resolve(&route_for(NotificationEventType::LeaveSubmitted), &ctx)
            .await
            .unwrap();

        let team_emails: Vec<&str> = team.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(team_emails, vec!["admin@example.com"]);
        let leave_emails: Vec<&str> = leave.iter().map(|r| r.email.as_str()).collect();
        assert_eq!(leave_emails, vec!["requester@example.com"]);
    }
}
