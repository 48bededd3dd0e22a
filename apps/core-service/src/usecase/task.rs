//! # タスクユースケース
//!
//! タスクの作成・担当者割り当て・ステータス変更と、それぞれの通知。
//!
//! - 作成時は担当者がいる場合のみ `task_assigned` を通知する
//! - ステータス変更は値が変わった場合のみ `task_status_changed` を通知する

use std::sync::Arc;

use chrono::NaiveDate;
use teamboard_domain::{
    clock::Clock,
    project::ProjectId,
    task::{NewTask, Task, TaskId, TaskPriority, TaskStatus},
    user::UserId,
    value_objects::TaskTitle,
};
use teamboard_infra::repository::{ProjectRepository, TaskRepository, UserRepository};
use teamboard_shared::{event_log::event, log_business_event};

use super::{
    WithNotification,
    helpers::{FindResultExt, warn_if_failed},
    notification::NotificationService,
};
use crate::error::CoreError;

/// タスク作成の入力
pub struct CreateTaskInput {
    pub title:       String,
    pub description: Option<String>,
    pub priority:    TaskPriority,
    pub due_date:    Option<NaiveDate>,
    pub project_id:  Option<ProjectId>,
    pub assignee_id: Option<UserId>,
    pub created_by:  UserId,
}

/// 担当者割り当ての入力
pub struct AssignTaskInput {
    pub task_id:     TaskId,
    pub assignee_id: UserId,
    pub assigned_by: UserId,
}

/// ステータス変更の入力
pub struct ChangeTaskStatusInput {
    pub task_id:    TaskId,
    pub status:     TaskStatus,
    pub changed_by: UserId,
}

pub struct TaskUseCaseImpl {
    task_repo:    Arc<dyn TaskRepository>,
    user_repo:    Arc<dyn UserRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    notification: Arc<NotificationService>,
    clock:        Arc<dyn Clock>,
}

impl TaskUseCaseImpl {
    pub fn new(
        task_repo: Arc<dyn TaskRepository>,
        user_repo: Arc<dyn UserRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        notification: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            task_repo,
            user_repo,
            project_repo,
            notification,
            clock,
        }
    }

    /// タスクを作成する
    pub async fn create_task(
        &self,
        input: CreateTaskInput,
    ) -> Result<WithNotification<Task>, CoreError> {
        let title = TaskTitle::new(input.title)?;

        if let Some(project_id) = &input.project_id {
            self.project_repo
                .find_by_id(project_id)
                .await
                .or_not_found("プロジェクト")?;
        }
        if let Some(assignee_id) = &input.assignee_id {
            self.user_repo
                .find_by_id(assignee_id)
                .await
                .or_not_found("担当者")?;
        }

        let task = Task::new(NewTask {
            id: TaskId::new(),
            title,
            description: input.description.filter(|d| !d.trim().is_empty()),
            priority: input.priority,
            due_date: input.due_date,
            project_id: input.project_id,
            assignee_id: input.assignee_id,
            created_by: input.created_by.clone(),
            now: self.clock.now(),
        });
        self.task_repo.insert(&task).await?;

        log_business_event!(
            event.category = event::category::TASK,
            event.action = event::action::TASK_CREATED,
            event.entity_type = event::entity_type::TASK,
            event.entity_id = %task.id(),
            event.actor_id = %input.created_by,
            event.result = event::result::SUCCESS,
            "タスクを作成"
        );

        if task.assignee_id().is_none() {
            return Ok(WithNotification::silent(task));
        }

        let outcome = self
            .notification
            .notify_task_assigned(task.id(), &input.created_by)
            .await;
        warn_if_failed(&outcome, event::action::TASK_CREATED);

        Ok(WithNotification::notified(task, outcome))
    }

    /// 担当者を割り当てる
    pub async fn assign_task(
        &self,
        input: AssignTaskInput,
    ) -> Result<WithNotification<Task>, CoreError> {
        let task = self
            .task_repo
            .find_by_id(&input.task_id)
            .await
            .or_not_found("タスク")?;
        self.user_repo
            .find_by_id(&input.assignee_id)
            .await
            .or_not_found("担当者")?;

        let task = task.assigned_to(input.assignee_id, self.clock.now());
        self.task_repo.update(&task).await?;

        log_business_event!(
            event.category = event::category::TASK,
            event.action = event::action::TASK_ASSIGNED,
            event.entity_type = event::entity_type::TASK,
            event.entity_id = %task.id(),
            event.actor_id = %input.assigned_by,
            event.result = event::result::SUCCESS,
            "タスクの担当者を割り当て"
        );

        let outcome = self
            .notification
            .notify_task_assigned(task.id(), &input.assigned_by)
            .await;
        warn_if_failed(&outcome, event::action::TASK_ASSIGNED);

        Ok(WithNotification::notified(task, outcome))
    }

    /// ステータスを変更する
    ///
    /// 現在と同じステータスが指定された場合は保存も通知も行わない。
    pub async fn change_status(
        &self,
        input: ChangeTaskStatusInput,
    ) -> Result<WithNotification<Task>, CoreError> {
        let task = self
            .task_repo
            .find_by_id(&input.task_id)
            .await
            .or_not_found("タスク")?;

        let previous_status = task.status();
        if previous_status == input.status {
            return Ok(WithNotification::silent(task));
        }

        let task = task.with_status(input.status, self.clock.now());
        self.task_repo.update(&task).await?;

        log_business_event!(
            event.category = event::category::TASK,
            event.action = event::action::TASK_STATUS_CHANGED,
            event.entity_type = event::entity_type::TASK,
            event.entity_id = %task.id(),
            event.actor_id = %input.changed_by,
            event.result = event::result::SUCCESS,
            task.previous_status = %previous_status,
            task.status = %task.status(),
            "タスクのステータスを変更"
        );

        let outcome = self
            .notification
            .notify_task_status_changed(task.id(), previous_status, &input.changed_by)
            .await;
        warn_if_failed(&outcome, event::action::TASK_STATUS_CHANGED);

        Ok(WithNotification::notified(task, outcome))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use teamboard_domain::{notification::NotificationOutcome, user::UserRole};
    use teamboard_infra::mock::MockNotificationSender;

    use super::*;
    use crate::test_utils::{MockRepos, make_task, make_user};

    fn create_input(assignee_id: Option<UserId>, created_by: UserId) -> CreateTaskInput {
        CreateTaskInput {
            title: "Prepare sprint demo".to_string(),
            description: None,
            priority: TaskPriority::Medium,
            due_date: None,
            project_id: None,
            assignee_id,
            created_by,
        }
    }

    #[tokio::test]
    async fn test_担当者なしのタスク作成では通知しない() {
        let repos = MockRepos::new();
        let sender = MockNotificationSender::new();
        let sut = repos.task_usecase(sender.clone());

        let result = sut.create_task(create_input(None, UserId::new())).await.unwrap();

        assert!(result.notification.is_none());
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn test_担当者付きのタスク作成では担当者に通知する() {
        let repos = MockRepos::new();
        let sender = MockNotificationSender::new();
        let assignee = make_user("Hanako", "hanako@example.com", UserRole::Member);
        repos.users.add_user(assignee.clone());
        let sut = repos.task_usecase(sender.clone());

        let result = sut
            .create_task(create_input(Some(assignee.id().clone()), UserId::new()))
            .await
            .unwrap();

        assert_eq!(result.value.assignee_id(), Some(assignee.id()));
        assert!(matches!(result.notification, Some(NotificationOutcome::Sent { .. })));
        assert_eq!(sender.sent_emails()[0].subject, "Task Assigned: Prepare sprint demo");
    }

    #[tokio::test]
    async fn test_存在しない担当者ではタスクを作成できない() {
        let repos = MockRepos::new();
        let sut = repos.task_usecase(MockNotificationSender::new());

        let result = sut
            .create_task(create_input(Some(UserId::new()), UserId::new()))
            .await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_同じステータスへの変更は通知しない() {
        let repos = MockRepos::new();
        let sender = MockNotificationSender::new();
        let task = make_task("Fix header", None, None, &UserId::new());
        repos.tasks.add_task(task.clone());
        let sut = repos.task_usecase(sender.clone());

        let result = sut
            .change_status(ChangeTaskStatusInput {
                task_id:    task.id().clone(),
                status:     TaskStatus::Todo,
                changed_by: UserId::new(),
            })
            .await
            .unwrap();

        assert!(result.notification.is_none());
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn test_通知の宛先がいなくてもステータス変更は成功する() {
        let repos = MockRepos::new();
        let sender = MockNotificationSender::new();
        let task = make_task("Fix header", None, None, &UserId::new());
        repos.tasks.add_task(task.clone());
        let sut = repos.task_usecase(sender.clone());

        let result = sut
            .change_status(ChangeTaskStatusInput {
                task_id:    task.id().clone(),
                status:     TaskStatus::Completed,
                changed_by: UserId::new(),
            })
            .await
            .unwrap();

        assert_eq!(result.value.status(), TaskStatus::Completed);
        assert_eq!(
            result.notification,
            Some(NotificationOutcome::skipped_no_recipients())
        );
        assert_eq!(sender.call_count(), 0);
    }
}
