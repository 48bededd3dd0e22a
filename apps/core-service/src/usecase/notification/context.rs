//! # 通知コンテキストの読み込み
//!
//! 通知イベントを起点に、トリガーとなったエンティティと関連エンティティを読み込み、
//! テンプレート用のペイロードと受信者候補をまとめる。
//!
//! トリガーとなったエンティティが見つからない場合のみ [`LoadError::NotFound`] を返す。
//! 担当者・プロジェクトなど任意の関連が欠けている場合は、ペイロード上の `None` と
//! 空の受信者候補になる。

use std::sync::Arc;

use teamboard_domain::{
    comment::CommentTarget,
    leave::{LeaveRequest, LeaveRequestId},
    notification::{
        CommentTargetKind,
        LeaveSummary,
        NotificationEvent,
        NotificationPayload,
        ProjectSummary,
        TaskSummary,
    },
    project::{Project, ProjectId},
    task::{Task, TaskId},
    user::{User, UserId},
};
use teamboard_infra::{
    InfraError,
    repository::{
        CommentRepository,
        LeaveRequestRepository,
        MilestoneRepository,
        ProjectRepository,
        TaskRepository,
        UserRepository,
    },
};
use thiserror::Error;

/// コンテキスト読み込みエラー
#[derive(Debug, Error)]
pub enum LoadError {
    /// トリガーとなったエンティティが存在しない
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Infra(#[from] InfraError),
}

/// 通知 1 件分のコンテキスト
#[derive(Debug, Clone)]
pub struct NotificationContext {
    /// テンプレートに渡すペイロード
    pub payload:         NotificationPayload,
    /// タスクの担当者
    pub assignee:        Option<User>,
    /// 関連プロジェクトのメンバー（追加順）
    pub project_members: Vec<User>,
    /// 休暇申請の申請者
    pub requester:       Option<User>,
    /// プロジェクトに追加されたメンバー
    pub added_member:    Option<User>,
}

impl NotificationContext {
    fn new(payload: NotificationPayload) -> Self {
        Self {
            payload,
            assignee: None,
            project_members: Vec::new(),
            requester: None,
            added_member: None,
        }
    }
}

/// 通知コンテキストのローダー
pub struct ContextLoader {
    user_repo:      Arc<dyn UserRepository>,
    task_repo:      Arc<dyn TaskRepository>,
    project_repo:   Arc<dyn ProjectRepository>,
    milestone_repo: Arc<dyn MilestoneRepository>,
    leave_repo:     Arc<dyn LeaveRequestRepository>,
    comment_repo:   Arc<dyn CommentRepository>,
}

impl ContextLoader {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        task_repo: Arc<dyn TaskRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        milestone_repo: Arc<dyn MilestoneRepository>,
        leave_repo: Arc<dyn LeaveRequestRepository>,
        comment_repo: Arc<dyn CommentRepository>,
    ) -> Self {
        Self {
            user_repo,
            task_repo,
            project_repo,
            milestone_repo,
            leave_repo,
            comment_repo,
        }
    }

    /// イベントに対応するコンテキストを読み込む
    pub async fn load(&self, event: &NotificationEvent) -> Result<NotificationContext, LoadError> {
        match event {
            NotificationEvent::NewTeamMember { user_id } => {
                let user = self.require_user(user_id).await?;
                Ok(NotificationContext::new(
                    NotificationPayload::NewTeamMember {
                        member_id:   user.id().clone(),
                        member_name: user.name().as_str().to_string(),
                        email:       user.email().as_str().to_string(),
                        role:        user.role().to_string(),
                        department:  user.department().map(str::to_string),
                    },
                ))
            }
            NotificationEvent::TaskAssigned {
                task_id,
                assigned_by,
            } => {
                let task = self.require_task(task_id).await?;
                let assignee = self.find_user(task.assignee_id()).await?;
                let assigned_by = self.find_user(Some(assigned_by)).await?;
                let project = self.find_project(task.project_id()).await?;

                let mut context = NotificationContext::new(NotificationPayload::TaskAssigned {
                    task:             TaskSummary::from(&task),
                    assignee_name:    display_name(assignee.as_ref()),
                    assigned_by_name: display_name(assigned_by.as_ref()),
                    project_name:     project.as_ref().map(project_name),
                });
                context.assignee = assignee;
                Ok(context)
            }
            NotificationEvent::TaskStatusChanged {
                task_id,
                previous_status,
                changed_by,
            } => {
                let task = self.require_task(task_id).await?;
                let assignee = self.find_user(task.assignee_id()).await?;
                let changed_by = self.find_user(Some(changed_by)).await?;
                let project = self.find_project(task.project_id()).await?;
                let project_members = self.project_members(project.as_ref()).await?;

                let mut context = NotificationContext::new(NotificationPayload::TaskStatusChanged {
                    task:            TaskSummary::from(&task),
                    previous_status: *previous_status,
                    changed_by_name: display_name(changed_by.as_ref()),
                    project_name:    project.as_ref().map(project_name),
                });
                context.assignee = assignee;
                context.project_members = project_members;
                Ok(context)
            }
            NotificationEvent::CommentAdded { comment_id } => {
                let comment = self
                    .comment_repo
                    .find_by_id(comment_id)
                    .await?
                    .ok_or(LoadError::NotFound("Comment"))?;
                let author = self.find_user(Some(comment.author_id())).await?;

                let (target_kind, target_name, task, project) = match comment.target() {
                    CommentTarget::Task(task_id) => {
                        let task = self.require_task(task_id).await?;
                        let project = self.find_project(task.project_id()).await?;
                        let name = task.title().as_str().to_string();
                        (CommentTargetKind::Task, name, Some(task), project)
                    }
                    CommentTarget::Project(project_id) => {
                        let project = self.require_project(project_id).await?;
                        let name = project_name(&project);
                        (CommentTargetKind::Project, name, None, Some(project))
                    }
                };

                let assignee = match &task {
                    Some(task) => self.find_user(task.assignee_id()).await?,
                    None => None,
                };
                let project_members = self.project_members(project.as_ref()).await?;

                let mut context = NotificationContext::new(NotificationPayload::CommentAdded {
                    target_kind,
                    target_id: comment.target().as_uuid().to_string(),
                    target_name,
                    author_name: display_name(author.as_ref()),
                    body: comment.body().as_str().to_string(),
                    project_name: project.as_ref().map(project_name),
                });
                context.assignee = assignee;
                context.project_members = project_members;
                Ok(context)
            }
            NotificationEvent::ProjectCreated { project_id } => {
                let project = self.require_project(project_id).await?;
                let created_by = self.find_user(Some(project.created_by())).await?;

                Ok(NotificationContext::new(
                    NotificationPayload::ProjectCreated {
                        project:         ProjectSummary::from(&project),
                        created_by_name: display_name(created_by.as_ref()),
                    },
                ))
            }
            NotificationEvent::ProjectMemberAdded {
                project_id,
                member_id,
                added_by,
            } => {
                let project = self.require_project(project_id).await?;
                let member = self.require_user(member_id).await?;
                let added_by = self.find_user(Some(added_by)).await?;

                let mut context =
                    NotificationContext::new(NotificationPayload::ProjectMemberAdded {
                        project:       ProjectSummary::from(&project),
                        member_name:   member.name().as_str().to_string(),
                        added_by_name: display_name(added_by.as_ref()),
                    });
                context.added_member = Some(member);
                Ok(context)
            }
            NotificationEvent::MilestoneCompleted { milestone_id } => {
                let milestone = self
                    .milestone_repo
                    .find_by_id(milestone_id)
                    .await?
                    .ok_or(LoadError::NotFound("Milestone"))?;
                let project = self.require_project(milestone.project_id()).await?;
                let completed_by = self.find_user(milestone.completed_by()).await?;
                let project_members = self.project_members(Some(&project)).await?;

                let mut context =
                    NotificationContext::new(NotificationPayload::MilestoneCompleted {
                        project_id:        project.id().clone(),
                        project_name:      project_name(&project),
                        milestone_title:   milestone.title().as_str().to_string(),
                        due_date:          milestone.due_date(),
                        completed_by_name: display_name(completed_by.as_ref()),
                    });
                context.project_members = project_members;
                Ok(context)
            }
            NotificationEvent::LeaveSubmitted { leave_request_id } => {
                let (leave, requester) = self.require_leave(leave_request_id).await?;

                let mut context = NotificationContext::new(NotificationPayload::LeaveSubmitted {
                    leave:     LeaveSummary::from(&leave),
                    user_name: requester.name().as_str().to_string(),
                });
                context.requester = Some(requester);
                Ok(context)
            }
            NotificationEvent::LeaveStatusChanged { leave_request_id } => {
                let (leave, requester) = self.require_leave(leave_request_id).await?;
                let reviewer = self.find_user(leave.reviewed_by()).await?;

                let mut context =
                    NotificationContext::new(NotificationPayload::LeaveStatusChanged {
                        leave: LeaveSummary::from(&leave),
                        user_name: requester.name().as_str().to_string(),
                        reviewer_name: display_name(reviewer.as_ref()),
                    });
                context.requester = Some(requester);
                Ok(context)
            }
        }
    }

    async fn require_user(&self, id: &UserId) -> Result<User, LoadError> {
        self.user_repo
            .find_by_id(id)
            .await?
            .ok_or(LoadError::NotFound("User"))
    }

    async fn find_user(&self, id: Option<&UserId>) -> Result<Option<User>, LoadError> {
        match id {
            Some(id) => Ok(self.user_repo.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    async fn require_task(&self, id: &TaskId) -> Result<Task, LoadError> {
        self.task_repo
            .find_by_id(id)
            .await?
            .ok_or(LoadError::NotFound("Task"))
    }

    async fn require_project(&self, id: &ProjectId) -> Result<Project, LoadError> {
        self.project_repo
            .find_by_id(id)
            .await?
            .ok_or(LoadError::NotFound("Project"))
    }

    async fn find_project(&self, id: Option<&ProjectId>) -> Result<Option<Project>, LoadError> {
        match id {
            Some(id) => Ok(self.project_repo.find_by_id(id).await?),
            None => Ok(None),
        }
    }

    async fn project_members(&self, project: Option<&Project>) -> Result<Vec<User>, LoadError> {
        let Some(project) = project else {
            return Ok(Vec::new());
        };
        let member_ids = self.project_repo.find_member_ids(project.id()).await?;
        if member_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.user_repo.find_by_ids(&member_ids).await?)
    }

    /// 休暇申請とその申請者を読み込む（どちらも必須）
    async fn require_leave(
        &self,
        id: &LeaveRequestId,
    ) -> Result<(LeaveRequest, User), LoadError> {
        let leave = self
            .leave_repo
            .find_by_id(id)
            .await?
            .ok_or(LoadError::NotFound("Leave request"))?;
        let requester = self.require_user(leave.user_id()).await?;
        Ok((leave, requester))
    }
}

fn display_name(user: Option<&User>) -> Option<String> {
    user.map(|u| u.name().as_str().to_string())
}

fn project_name(project: &Project) -> String {
    project.name().as_str().to_string()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use teamboard_domain::user::UserRole;

    use super::*;
    use crate::test_utils::{
        MockRepos,
        make_comment,
        make_milestone,
        make_project,
        make_task,
        make_user,
    };

    fn loader(repos: &MockRepos) -> ContextLoader {
        ContextLoader::new(
            Arc::new(repos.users.clone()),
            Arc::new(repos.tasks.clone()),
            Arc::new(repos.projects.clone()),
            Arc::new(repos.milestones.clone()),
            Arc::new(repos.leaves.clone()),
            Arc::new(repos.comments.clone()),
        )
    }

    #[tokio::test]
    async fn test_担当者もプロジェクトもないタスクはプレースホルダーになる() {
        let repos = MockRepos::new();
        let task = make_task("Solo task", None, None, &UserId::new());
        repos.tasks.add_task(task.clone());

        let context = loader(&repos)
            .load(&NotificationEvent::TaskAssigned {
                task_id:     task.id().clone(),
                assigned_by: UserId::new(),
            })
            .await
            .unwrap();

        assert!(context.assignee.is_none());
        assert!(context.project_members.is_empty());
        assert_eq!(
            context.payload,
            NotificationPayload::TaskAssigned {
                task:             TaskSummary::from(&task),
                assignee_name:    None,
                assigned_by_name: None,
                project_name:     None,
            }
        );
    }

    #[tokio::test]
    async fn test_プロジェクトへのコメントはメンバーを読み込む() {
        let repos = MockRepos::new();
        let author = make_user("Taro", "taro@example.com", UserRole::Member);
        let member = make_user("Jiro", "jiro@example.com", UserRole::Member);
        let project = make_project("Website Renewal", author.id());
        let comment = make_comment(
            CommentTarget::Project(project.id().clone()),
            author.id(),
            "Kickoff on Monday",
        );
        repos.users.add_user(author.clone());
        repos.users.add_user(member.clone());
        repos.projects.add_project(project.clone());
        repos.projects.add_project_member(project.id(), member.id());
        repos.comments.add_comment(comment.clone());

        let context = loader(&repos)
            .load(&NotificationEvent::CommentAdded {
                comment_id: comment.id().clone(),
            })
            .await
            .unwrap();

        assert_eq!(context.project_members, vec![member]);
        assert!(context.assignee.is_none());
        assert_eq!(
            context.payload,
            NotificationPayload::CommentAdded {
                target_kind:  CommentTargetKind::Project,
                target_id:    project.id().to_string(),
                target_name:  "Website Renewal".to_string(),
                author_name:  Some("Taro".to_string()),
                body:         "Kickoff on Monday".to_string(),
                project_name: Some("Website Renewal".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_マイルストーンのプロジェクトがなければnot_found() {
        let repos = MockRepos::new();
        let milestone = make_milestone(&ProjectId::new(), "Beta launch");
        repos.milestones.add_milestone(milestone.clone());

        let result = loader(&repos)
            .load(&NotificationEvent::MilestoneCompleted {
                milestone_id: milestone.id().clone(),
            })
            .await;

        assert!(matches!(result, Err(LoadError::NotFound("Project"))));
    }

    #[tokio::test]
    async fn test_存在しない休暇申請のエラーメッセージ() {
        let repos = MockRepos::new();

        let result = loader(&repos)
            .load(&NotificationEvent::LeaveSubmitted {
                leave_request_id: LeaveRequestId::new(),
            })
            .await;

        assert_eq!(result.unwrap_err().to_string(), "Leave request not found");
    }
}
