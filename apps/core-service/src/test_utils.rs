//! # テストユーティリティ
//!
//! インメモリのモックリポジトリ一式と、標準的なテストデータの生成関数を提供する。
//! ユースケースと通知サービスをモックで組み立てる際の重複を減らす。
//!
//! ```ignore
//! use teamboard_core_service::test_utils::{MockRepos, make_user};
//!
//! let repos = MockRepos::new();
//! repos.users.add_user(make_user("Admin", "admin@example.com", UserRole::Admin));
//! let sut = repos.team_member_usecase(MockNotificationSender::new());
//! ```

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use teamboard_domain::{
    clock::{Clock, FixedClock},
    comment::{Comment, CommentId, CommentTarget},
    leave::{LeaveRequest, LeaveRequestId, LeaveType, NewLeaveRequest},
    project::{Milestone, MilestoneId, NewProject, Project, ProjectId},
    task::{NewTask, Task, TaskId, TaskPriority},
    user::{Email, NewUser, User, UserId, UserRecord, UserRole, UserStatus},
    value_objects::{CommentBody, MilestoneTitle, ProjectName, TaskTitle, UserName},
};
use teamboard_infra::mock::{
    MockCommentRepository,
    MockLeaveRequestRepository,
    MockMilestoneRepository,
    MockNotificationSender,
    MockProjectRepository,
    MockTaskRepository,
    MockUserRepository,
};

use crate::usecase::{
    CommentUseCaseImpl,
    LeaveUseCaseImpl,
    ProjectUseCaseImpl,
    TaskUseCaseImpl,
    TeamMemberUseCaseImpl,
    notification::{ContextLoader, NotificationService, RecipientResolver, TemplateRenderer},
};

/// テストで使うリンクのベース URL
pub const TEST_BASE_URL: &str = "http://localhost:5173";

/// テストの基準時刻（2023-11-14T22:13:20Z）
pub fn test_now() -> DateTime<Utc> {
    DateTime::from_timestamp(1_700_000_000, 0).expect("有効なタイムスタンプ")
}

/// 基準時刻に固定した時計
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(test_now()))
}

/// モックリポジトリ一式
///
/// 各モックは内部状態を `Arc` で共有するため、ユースケースに渡した後も
/// テスト側からデータの投入・検証ができる。
#[derive(Clone, Default)]
pub struct MockRepos {
    pub users:      MockUserRepository,
    pub tasks:      MockTaskRepository,
    pub projects:   MockProjectRepository,
    pub milestones: MockMilestoneRepository,
    pub leaves:     MockLeaveRequestRepository,
    pub comments:   MockCommentRepository,
}

impl MockRepos {
    pub fn new() -> Self {
        Self::default()
    }

    /// モックリポジトリと指定の送信モックで通知サービスを組み立てる
    pub fn notification_service(&self, sender: MockNotificationSender) -> NotificationService {
        let renderer =
            TemplateRenderer::new(fixed_clock(), TEST_BASE_URL).expect("テンプレートの登録に成功");
        let loader = ContextLoader::new(
            Arc::new(self.users.clone()),
            Arc::new(self.tasks.clone()),
            Arc::new(self.projects.clone()),
            Arc::new(self.milestones.clone()),
            Arc::new(self.leaves.clone()),
            Arc::new(self.comments.clone()),
        );
        let resolver = RecipientResolver::new(Arc::new(self.users.clone()));
        NotificationService::new(Arc::new(sender), renderer, loader, resolver)
    }

    pub fn team_member_usecase(&self, sender: MockNotificationSender) -> TeamMemberUseCaseImpl {
        TeamMemberUseCaseImpl::new(
            Arc::new(self.users.clone()),
            Arc::new(self.notification_service(sender)),
            fixed_clock(),
        )
    }

    pub fn task_usecase(&self, sender: MockNotificationSender) -> TaskUseCaseImpl {
        TaskUseCaseImpl::new(
            Arc::new(self.tasks.clone()),
            Arc::new(self.users.clone()),
            Arc::new(self.projects.clone()),
            Arc::new(self.notification_service(sender)),
            fixed_clock(),
        )
    }

    pub fn comment_usecase(&self, sender: MockNotificationSender) -> CommentUseCaseImpl {
        CommentUseCaseImpl::new(
            Arc::new(self.comments.clone()),
            Arc::new(self.tasks.clone()),
            Arc::new(self.projects.clone()),
            Arc::new(self.notification_service(sender)),
            fixed_clock(),
        )
    }

    pub fn project_usecase(&self, sender: MockNotificationSender) -> ProjectUseCaseImpl {
        ProjectUseCaseImpl::new(
            Arc::new(self.projects.clone()),
            Arc::new(self.milestones.clone()),
            Arc::new(self.users.clone()),
            Arc::new(self.notification_service(sender)),
            fixed_clock(),
        )
    }

    pub fn leave_usecase(&self, sender: MockNotificationSender) -> LeaveUseCaseImpl {
        LeaveUseCaseImpl::new(
            Arc::new(self.leaves.clone()),
            Arc::new(self.users.clone()),
            Arc::new(self.notification_service(sender)),
            fixed_clock(),
        )
    }
}

/// 有効なユーザーを作成する
pub fn make_user(name: &str, email: &str, role: UserRole) -> User {
    User::new(NewUser {
        id: UserId::new(),
        name: UserName::new(name).expect("有効なユーザー名"),
        email: Email::new(email).expect("有効なメールアドレス"),
        role,
        department: None,
        now: test_now(),
    })
}

/// 無効化済みのユーザーを作成する
pub fn make_inactive_user(name: &str, email: &str, role: UserRole) -> User {
    User::from_db(UserRecord {
        id: UserId::new(),
        name: UserName::new(name).expect("有効なユーザー名"),
        email: Email::new(email).expect("有効なメールアドレス"),
        role,
        department: None,
        status: UserStatus::Inactive,
        created_at: test_now(),
        updated_at: test_now(),
    })
}

/// `Todo` のタスクを作成する
pub fn make_task(
    title: &str,
    assignee_id: Option<&UserId>,
    project_id: Option<&ProjectId>,
    created_by: &UserId,
) -> Task {
    Task::new(NewTask {
        id: TaskId::new(),
        title: TaskTitle::new(title).expect("有効なタスク名"),
        description: None,
        priority: TaskPriority::Medium,
        due_date: None,
        project_id: project_id.cloned(),
        assignee_id: assignee_id.cloned(),
        created_by: created_by.clone(),
        now: test_now(),
    })
}

/// 期間未設定のプロジェクトを作成する
pub fn make_project(name: &str, created_by: &UserId) -> Project {
    Project::new(NewProject {
        id:          ProjectId::new(),
        name:        ProjectName::new(name).expect("有効なプロジェクト名"),
        description: None,
        start_date:  None,
        end_date:    None,
        created_by:  created_by.clone(),
        now:         test_now(),
    })
    .expect("有効なプロジェクト")
}

/// 未完了のマイルストーンを作成する
pub fn make_milestone(project_id: &ProjectId, title: &str) -> Milestone {
    Milestone::new(
        MilestoneId::new(),
        project_id.clone(),
        MilestoneTitle::new(title).expect("有効なマイルストーン名"),
        None,
        test_now(),
    )
}

/// `pending` の年次休暇申請（3 日間）を作成する
pub fn make_leave_request(user_id: &UserId) -> LeaveRequest {
    LeaveRequest::new(NewLeaveRequest {
        id:         LeaveRequestId::new(),
        user_id:    user_id.clone(),
        leave_type: LeaveType::Annual,
        start_date: NaiveDate::from_ymd_opt(2026, 8, 10).expect("有効な日付"),
        end_date:   NaiveDate::from_ymd_opt(2026, 8, 12).expect("有効な日付"),
        reason:     Some("Family trip".to_string()),
        now:        test_now(),
    })
    .expect("有効な休暇申請")
}

/// コメントを作成する
pub fn make_comment(target: CommentTarget, author_id: &UserId, body: &str) -> Comment {
    Comment::new(
        CommentId::new(),
        target,
        author_id.clone(),
        CommentBody::new(body).expect("有効なコメント"),
        test_now(),
    )
}
