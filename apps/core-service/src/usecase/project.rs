//! # プロジェクトユースケース
//!
//! プロジェクト作成・メンバー追加・マイルストーン作成/完了と、それぞれの通知。

use std::sync::Arc;

use chrono::NaiveDate;
use teamboard_domain::{
    clock::Clock,
    project::{Milestone, MilestoneId, NewProject, Project, ProjectId},
    user::UserId,
    value_objects::{MilestoneTitle, ProjectName},
};
use teamboard_infra::repository::{MilestoneRepository, ProjectRepository, UserRepository};
use teamboard_shared::{event_log::event, log_business_event};

use super::{
    WithNotification,
    helpers::{FindResultExt, warn_if_failed},
    notification::NotificationService,
};
use crate::error::CoreError;

/// プロジェクト作成の入力
pub struct CreateProjectInput {
    pub name:        String,
    pub description: Option<String>,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    pub created_by:  UserId,
}

/// メンバー追加の入力
pub struct AddProjectMemberInput {
    pub project_id: ProjectId,
    pub user_id:    UserId,
    pub added_by:   UserId,
}

/// マイルストーン作成の入力
pub struct CreateMilestoneInput {
    pub project_id: ProjectId,
    pub title:      String,
    pub due_date:   Option<NaiveDate>,
}

/// マイルストーン完了の入力
pub struct CompleteMilestoneInput {
    pub project_id:   ProjectId,
    pub milestone_id: MilestoneId,
    pub completed_by: UserId,
}

pub struct ProjectUseCaseImpl {
    project_repo:   Arc<dyn ProjectRepository>,
    milestone_repo: Arc<dyn MilestoneRepository>,
    user_repo:      Arc<dyn UserRepository>,
    notification:   Arc<NotificationService>,
    clock:          Arc<dyn Clock>,
}

impl ProjectUseCaseImpl {
    pub fn new(
        project_repo: Arc<dyn ProjectRepository>,
        milestone_repo: Arc<dyn MilestoneRepository>,
        user_repo: Arc<dyn UserRepository>,
        notification: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            project_repo,
            milestone_repo,
            user_repo,
            notification,
            clock,
        }
    }

    /// プロジェクトを作成し、管理者に通知する
    pub async fn create_project(
        &self,
        input: CreateProjectInput,
    ) -> Result<WithNotification<Project>, CoreError> {
        let project = Project::new(NewProject {
            id:          ProjectId::new(),
            name:        ProjectName::new(input.name)?,
            description: input.description.filter(|d| !d.trim().is_empty()),
            start_date:  input.start_date,
            end_date:    input.end_date,
            created_by:  input.created_by,
            now:         self.clock.now(),
        })?;
        self.project_repo.insert(&project).await?;

        log_business_event!(
            event.category = event::category::PROJECT,
            event.action = event::action::PROJECT_CREATED,
            event.entity_type = event::entity_type::PROJECT,
            event.entity_id = %project.id(),
            event.actor_id = %project.created_by(),
            event.result = event::result::SUCCESS,
            "プロジェクトを作成"
        );

        let outcome = self.notification.notify_project_created(project.id()).await;
        warn_if_failed(&outcome, event::action::PROJECT_CREATED);

        Ok(WithNotification::notified(project, outcome))
    }

    /// メンバーを追加する
    ///
    /// 既にメンバーだった場合は何もせず、通知もしない。
    pub async fn add_member(
        &self,
        input: AddProjectMemberInput,
    ) -> Result<WithNotification<Project>, CoreError> {
        let project = self
            .project_repo
            .find_by_id(&input.project_id)
            .await
            .or_not_found("プロジェクト")?;
        self.user_repo
            .find_by_id(&input.user_id)
            .await
            .or_not_found("ユーザー")?;

        let added = self
            .project_repo
            .add_member(project.id(), &input.user_id, self.clock.now())
            .await?;
        if !added {
            return Ok(WithNotification::silent(project));
        }

        log_business_event!(
            event.category = event::category::PROJECT,
            event.action = event::action::PROJECT_MEMBER_ADDED,
            event.entity_type = event::entity_type::PROJECT,
            event.entity_id = %project.id(),
            event.actor_id = %input.added_by,
            event.result = event::result::SUCCESS,
            project.member_id = %input.user_id,
            "プロジェクトにメンバーを追加"
        );

        let outcome = self
            .notification
            .notify_project_member_added(project.id(), &input.user_id, &input.added_by)
            .await;
        warn_if_failed(&outcome, event::action::PROJECT_MEMBER_ADDED);

        Ok(WithNotification::notified(project, outcome))
    }

    /// マイルストーンを作成する（通知なし）
    pub async fn create_milestone(
        &self,
        input: CreateMilestoneInput,
    ) -> Result<Milestone, CoreError> {
        let title = MilestoneTitle::new(input.title)?;
        let project = self
            .project_repo
            .find_by_id(&input.project_id)
            .await
            .or_not_found("プロジェクト")?;

        let milestone = Milestone::new(
            MilestoneId::new(),
            project.id().clone(),
            title,
            input.due_date,
            self.clock.now(),
        );
        self.milestone_repo.insert(&milestone).await?;

        Ok(milestone)
    }

    /// マイルストーンを完了し、プロジェクトメンバーに通知する
    ///
    /// 完了済みのマイルストーンは `CoreError::Conflict`。
    pub async fn complete_milestone(
        &self,
        input: CompleteMilestoneInput,
    ) -> Result<WithNotification<Milestone>, CoreError> {
        let milestone = self
            .milestone_repo
            .find_by_id(&input.milestone_id)
            .await
            .or_not_found("マイルストーン")?;
        if milestone.project_id() != &input.project_id {
            return Err(CoreError::NotFound(
                "マイルストーンが見つかりません".to_string(),
            ));
        }

        let milestone = milestone.completed(input.completed_by.clone(), self.clock.now())?;
        self.milestone_repo.mark_completed(&milestone).await?;

        log_business_event!(
            event.category = event::category::PROJECT,
            event.action = event::action::MILESTONE_COMPLETED,
            event.entity_type = event::entity_type::MILESTONE,
            event.entity_id = %milestone.id(),
            event.actor_id = %input.completed_by,
            event.result = event::result::SUCCESS,
            "マイルストーンを完了"
        );

        let outcome = self
            .notification
            .notify_milestone_completed(milestone.id())
            .await;
        warn_if_failed(&outcome, event::action::MILESTONE_COMPLETED);

        Ok(WithNotification::notified(milestone, outcome))
    }
}
