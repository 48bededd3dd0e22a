//! # ユースケース層
//!
//! 業務操作（データ変更）と、その成功後の通知送信を組み合わせる。
//!
//! 通知の結果は [`WithNotification`] として業務操作の結果に添えて返す。
//! 通知が失敗しても業務操作はロールバックしない。

pub(crate) mod helpers;
pub mod comment;
pub mod leave;
pub mod notification;
pub mod project;
pub mod task;
pub mod team_member;

pub use comment::{CommentUseCaseImpl, PostCommentInput};
pub use leave::{LeaveUseCaseImpl, ReviewLeaveInput, SubmitLeaveInput};
pub use project::{
    AddProjectMemberInput,
    CompleteMilestoneInput,
    CreateMilestoneInput,
    CreateProjectInput,
    ProjectUseCaseImpl,
};
use teamboard_domain::notification::NotificationOutcome;
pub use task::{AssignTaskInput, ChangeTaskStatusInput, CreateTaskInput, TaskUseCaseImpl};
pub use team_member::{CreateTeamMemberInput, TeamMemberUseCaseImpl};

/// 業務操作の結果と通知結果の組
#[derive(Debug, Clone)]
pub struct WithNotification<T> {
    pub value:        T,
    /// 通知を送らない操作（変更なしなど）では `None`
    pub notification: Option<NotificationOutcome>,
}

impl<T> WithNotification<T> {
    pub fn notified(value: T, outcome: NotificationOutcome) -> Self {
        Self {
            value,
            notification: Some(outcome),
        }
    }

    pub fn silent(value: T) -> Self {
        Self {
            value,
            notification: None,
        }
    }
}
