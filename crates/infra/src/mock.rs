//! # テスト用モック
//!
//! ユースケーステストで使用するインメモリモックリポジトリと記録用の送信実装。
//! `test-utils` feature を有効にすることで、他クレートからも利用可能。
//!
//! ```toml
//! [dev-dependencies]
//! teamboard-infra = { workspace = true, features = ["test-utils"] }
//! ```

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use teamboard_domain::{
    comment::{Comment, CommentId},
    leave::{LeaveRequest, LeaveRequestId},
    notification::{EmailMessage, NotificationError, SendReceipt},
    project::{Milestone, MilestoneId, Project, ProjectId},
    task::{Task, TaskId},
    user::{Email, User, UserId, UserRole},
};

use crate::{
    error::InfraError,
    notification::NotificationSender,
    repository::{
        CommentRepository,
        LeaveRequestRepository,
        MilestoneRepository,
        ProjectRepository,
        TaskRepository,
        UserRepository,
    },
};

// ===== MockUserRepository =====

#[derive(Clone, Default)]
pub struct MockUserRepository {
    users: Arc<Mutex<Vec<User>>>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        let mut users = self.users.lock().unwrap();
        if users
            .iter()
            .any(|u| u.email().normalized() == user.email().normalized())
        {
            return Err(InfraError::conflict("User", user.email().normalized()));
        }
        users.push(user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id() == id)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, InfraError> {
        let users = self.users.lock().unwrap();
        Ok(ids
            .iter()
            .filter_map(|id| users.iter().find(|u| u.id() == id).cloned())
            .collect())
    }

    async fn find_active_by_role(&self, role: UserRole) -> Result<Vec<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.role() == role && u.is_active())
            .cloned()
            .collect())
    }

    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email().normalized() == email.normalized())
            .cloned())
    }
}

// ===== MockTaskRepository =====

#[derive(Clone, Default)]
pub struct MockTaskRepository {
    tasks: Arc<Mutex<Vec<Task>>>,
}

impl MockTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_task(&self, task: Task) {
        self.tasks.lock().unwrap().push(task);
    }
}

#[async_trait]
impl TaskRepository for MockTaskRepository {
    async fn insert(&self, task: &Task) -> Result<(), InfraError> {
        self.tasks.lock().unwrap().push(task.clone());
        Ok(())
    }

    async fn update(&self, task: &Task) -> Result<(), InfraError> {
        let mut tasks = self.tasks.lock().unwrap();
        let Some(pos) = tasks.iter().position(|t| t.id() == task.id()) else {
            return Err(InfraError::conflict("Task", task.id().to_string()));
        };
        tasks[pos] = task.clone();
        Ok(())
    }

    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, InfraError> {
        Ok(self
            .tasks
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id() == id)
            .cloned())
    }
}

// ===== MockProjectRepository =====

#[derive(Clone, Default)]
pub struct MockProjectRepository {
    projects: Arc<Mutex<Vec<Project>>>,
    members:  Arc<Mutex<Vec<(ProjectId, UserId)>>>,
}

impl MockProjectRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_project(&self, project: Project) {
        self.projects.lock().unwrap().push(project);
    }

    pub fn add_project_member(&self, project_id: &ProjectId, user_id: &UserId) {
        self.members
            .lock()
            .unwrap()
            .push((project_id.clone(), user_id.clone()));
    }
}

#[async_trait]
impl ProjectRepository for MockProjectRepository {
    async fn insert(&self, project: &Project) -> Result<(), InfraError> {
        self.projects.lock().unwrap().push(project.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, InfraError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id() == id)
            .cloned())
    }

    async fn add_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        _now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let mut members = self.members.lock().unwrap();
        if members
            .iter()
            .any(|(p, u)| p == project_id && u == user_id)
        {
            return Ok(false);
        }
        members.push((project_id.clone(), user_id.clone()));
        Ok(true)
    }

    async fn find_member_ids(&self, project_id: &ProjectId) -> Result<Vec<UserId>, InfraError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .iter()
            .filter(|(p, _)| p == project_id)
            .map(|(_, u)| u.clone())
            .collect())
    }
}

// ===== MockMilestoneRepository =====

#[derive(Clone, Default)]
pub struct MockMilestoneRepository {
    milestones: Arc<Mutex<Vec<Milestone>>>,
}

impl MockMilestoneRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_milestone(&self, milestone: Milestone) {
        self.milestones.lock().unwrap().push(milestone);
    }
}

#[async_trait]
impl MilestoneRepository for MockMilestoneRepository {
    async fn insert(&self, milestone: &Milestone) -> Result<(), InfraError> {
        self.milestones.lock().unwrap().push(milestone.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &MilestoneId) -> Result<Option<Milestone>, InfraError> {
        Ok(self
            .milestones
            .lock()
            .unwrap()
            .iter()
            .find(|m| m.id() == id)
            .cloned())
    }

    async fn mark_completed(&self, milestone: &Milestone) -> Result<(), InfraError> {
        let mut milestones = self.milestones.lock().unwrap();
        match milestones
            .iter()
            .position(|m| m.id() == milestone.id() && !m.is_completed())
        {
            Some(pos) => {
                milestones[pos] = milestone.clone();
                Ok(())
            }
            None => Err(InfraError::conflict(
                "Milestone",
                milestone.id().to_string(),
            )),
        }
    }
}

// ===== MockLeaveRequestRepository =====

#[derive(Clone, Default)]
pub struct MockLeaveRequestRepository {
    requests: Arc<Mutex<Vec<LeaveRequest>>>,
}

impl MockLeaveRequestRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_request(&self, request: LeaveRequest) {
        self.requests.lock().unwrap().push(request);
    }

    /// 保存済みの休暇申請をすべて返す
    pub fn requests(&self) -> Vec<LeaveRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LeaveRequestRepository for MockLeaveRequestRepository {
    async fn insert(&self, leave: &LeaveRequest) -> Result<(), InfraError> {
        self.requests.lock().unwrap().push(leave.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, InfraError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id() == id)
            .cloned())
    }

    async fn update_review(&self, leave: &LeaveRequest) -> Result<(), InfraError> {
        let mut requests = self.requests.lock().unwrap();
        match requests
            .iter()
            .position(|r| r.id() == leave.id() && r.is_pending())
        {
            Some(pos) => {
                requests[pos] = leave.clone();
                Ok(())
            }
            None => Err(InfraError::conflict("LeaveRequest", leave.id().to_string())),
        }
    }
}

// ===== MockCommentRepository =====

#[derive(Clone, Default)]
pub struct MockCommentRepository {
    comments: Arc<Mutex<Vec<Comment>>>,
}

impl MockCommentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_comment(&self, comment: Comment) {
        self.comments.lock().unwrap().push(comment);
    }
}

#[async_trait]
impl CommentRepository for MockCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), InfraError> {
        self.comments.lock().unwrap().push(comment.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError> {
        Ok(self
            .comments
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id() == id)
            .cloned())
    }
}

// ===== MockNotificationSender =====

/// 送信したメールを記録するモック
///
/// `failing()` で作成すると常に `NotificationError::SendFailed` を返す。
/// 失敗時も呼び出し回数は記録する。
#[derive(Clone, Default)]
pub struct MockNotificationSender {
    sent_emails: Arc<Mutex<Vec<EmailMessage>>>,
    call_count:  Arc<Mutex<usize>>,
    fail:        bool,
}

impl MockNotificationSender {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常に送信失敗するモックを作成する
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// 送信に成功したメールの一覧
    pub fn sent_emails(&self) -> Vec<EmailMessage> {
        self.sent_emails.lock().unwrap().clone()
    }

    /// `send_email` の呼び出し回数（失敗を含む）
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

#[async_trait]
impl NotificationSender for MockNotificationSender {
    async fn send_email(&self, email: &EmailMessage) -> Result<SendReceipt, NotificationError> {
        *self.call_count.lock().unwrap() += 1;

        if self.fail {
            return Err(NotificationError::SendFailed(
                "mock transport failure".to_string(),
            ));
        }

        let mut sent = self.sent_emails.lock().unwrap();
        sent.push(email.clone());
        Ok(SendReceipt {
            message_id: format!("mock-{}", sent.len()),
        })
    }
}
