//! # HTTP リクエストハンドラ
//!
//! axum のルートに対応するハンドラ関数を定義する。
//!
//! ## 設計方針
//!
//! - 各ハンドラはサブモジュールに配置
//! - 親モジュール（この `handler.rs`）で re-export し、フラットな API を提供
//! - ハンドラは薄く保ち、ビジネスロジックはユースケース層に委譲
//! - 通知を伴う操作のレスポンスは `{ "data": { ...エンティティ, "notification": ... } }`

pub mod comment;
pub mod health;
pub mod leave;
pub mod project;
pub mod task;
pub mod team_member;

pub use comment::{CommentState, post_comment};
pub use health::{ReadinessState, health_check, readiness_check};
pub use leave::{LeaveState, approve_leave, reject_leave, submit_leave};
pub use project::{
    ProjectState,
    add_project_member,
    complete_milestone,
    create_milestone,
    create_project,
};
use serde::Serialize;
pub use task::{TaskState, assign_task, change_task_status, create_task};
use teamboard_domain::notification::NotificationOutcome;
pub use team_member::{TeamMemberState, create_team_member};

use crate::usecase::WithNotification;

/// 通知結果を添えたエンティティ DTO
///
/// エンティティのフィールドをフラットに展開し、`notification` を追加する。
/// 通知を送らなかった操作では `notification` は `null`。
#[derive(Debug, Serialize)]
pub struct NotifiedDto<T> {
    #[serde(flatten)]
    pub entity:       T,
    pub notification: Option<NotificationOutcome>,
}

impl<T> NotifiedDto<T> {
    pub(crate) fn from_result<E>(result: WithNotification<E>) -> Self
    where
        T: for<'a> From<&'a E>,
    {
        Self {
            entity:       T::from(&result.value),
            notification: result.notification,
        }
    }
}
