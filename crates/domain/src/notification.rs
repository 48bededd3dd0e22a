//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 |
//! |---|------------|
//! | [`NotificationEvent`] | 通知のきっかけとなった業務イベント（ID とアクターのみ保持） |
//! | [`NotificationEventType`] | 通知イベント種別（9 種類） |
//! | [`NotificationPayload`] | テンプレートに渡す表示用データ |
//! | [`NotificationOutcome`] | 通知処理の結果 |
//!
//! ## 設計方針
//!
//! - **ベストエフォート**: 通知の失敗は業務操作に影響しない。結果は
//!   [`NotificationOutcome`] として呼び出し元に返す
//! - **テンプレート分離**: 通知イベントとメール生成は分離（TemplateRenderer は core-service）

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;
use thiserror::Error;

use crate::{
    comment::CommentId,
    leave::{LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType},
    project::{MilestoneId, Project, ProjectId, ProjectStatus},
    task::{Task, TaskId, TaskPriority, TaskStatus},
    user::UserId,
};

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),
}

/// 通知イベント種別
///
/// テンプレート名と宛先解決ルールのキーになる。snake_case でシリアライズされる。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NotificationEventType {
    /// チームメンバー追加 → 管理者に送信
    NewTeamMember,
    /// タスク割り当て → 担当者に送信
    TaskAssigned,
    /// タスクステータス変更 → 担当者・プロジェクトメンバー・管理者に送信
    TaskStatusChanged,
    /// コメント投稿 → プロジェクトメンバー・タスク担当者に送信
    CommentAdded,
    /// プロジェクト作成 → 管理者に送信
    ProjectCreated,
    /// プロジェクトメンバー追加 → 追加されたメンバーに送信
    ProjectMemberAdded,
    /// マイルストーン完了 → プロジェクトメンバーに送信
    MilestoneCompleted,
    /// 休暇申請 → 申請者・マネージャーに送信
    LeaveSubmitted,
    /// 休暇申請の承認/却下 → 申請者に送信
    LeaveStatusChanged,
}

/// 通知のきっかけとなった業務イベント
///
/// 対象エンティティの ID と操作したユーザーだけを持つ。
/// 表示用データの組み立てはオーケストレーターが行う。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    NewTeamMember {
        user_id: UserId,
    },
    TaskAssigned {
        task_id:     TaskId,
        assigned_by: UserId,
    },
    TaskStatusChanged {
        task_id:         TaskId,
        previous_status: TaskStatus,
        changed_by:      UserId,
    },
    CommentAdded {
        comment_id: CommentId,
    },
    ProjectCreated {
        project_id: ProjectId,
    },
    ProjectMemberAdded {
        project_id: ProjectId,
        member_id:  UserId,
        added_by:   UserId,
    },
    MilestoneCompleted {
        milestone_id: MilestoneId,
    },
    LeaveSubmitted {
        leave_request_id: LeaveRequestId,
    },
    LeaveStatusChanged {
        leave_request_id: LeaveRequestId,
    },
}

impl NotificationEvent {
    /// 通知イベント種別を返す
    pub fn event_type(&self) -> NotificationEventType {
        match self {
            Self::NewTeamMember { .. } => NotificationEventType::NewTeamMember,
            Self::TaskAssigned { .. } => NotificationEventType::TaskAssigned,
            Self::TaskStatusChanged { .. } => NotificationEventType::TaskStatusChanged,
            Self::CommentAdded { .. } => NotificationEventType::CommentAdded,
            Self::ProjectCreated { .. } => NotificationEventType::ProjectCreated,
            Self::ProjectMemberAdded { .. } => NotificationEventType::ProjectMemberAdded,
            Self::MilestoneCompleted { .. } => NotificationEventType::MilestoneCompleted,
            Self::LeaveSubmitted { .. } => NotificationEventType::LeaveSubmitted,
            Self::LeaveStatusChanged { .. } => NotificationEventType::LeaveStatusChanged,
        }
    }
}

/// テンプレート表示用のタスク情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub id:          TaskId,
    pub title:       String,
    pub description: Option<String>,
    pub status:      TaskStatus,
    pub priority:    TaskPriority,
    pub due_date:    Option<NaiveDate>,
}

impl From<&Task> for TaskSummary {
    fn from(task: &Task) -> Self {
        Self {
            id:          task.id().clone(),
            title:       task.title().as_str().to_string(),
            description: task.description().map(str::to_string),
            status:      task.status(),
            priority:    task.priority(),
            due_date:    task.due_date(),
        }
    }
}

/// テンプレート表示用のプロジェクト情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    pub id:          ProjectId,
    pub name:        String,
    pub description: Option<String>,
    pub status:      ProjectStatus,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id:          project.id().clone(),
            name:        project.name().as_str().to_string(),
            description: project.description().map(str::to_string),
            status:      project.status(),
            start_date:  project.start_date(),
            end_date:    project.end_date(),
        }
    }
}

/// テンプレート表示用の休暇申請情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveSummary {
    pub id:           LeaveRequestId,
    pub leave_type:   LeaveType,
    pub start_date:   NaiveDate,
    pub end_date:     NaiveDate,
    pub days:         i64,
    pub reason:       Option<String>,
    pub status:       LeaveStatus,
    pub review_notes: Option<String>,
}

impl From<&LeaveRequest> for LeaveSummary {
    fn from(leave: &LeaveRequest) -> Self {
        Self {
            id:           leave.id().clone(),
            leave_type:   leave.leave_type(),
            start_date:   leave.start_date(),
            end_date:     leave.end_date(),
            days:         leave.days(),
            reason:       leave.reason().map(str::to_string),
            status:       leave.status(),
            review_notes: leave.review_notes().map(str::to_string),
        }
    }
}

/// コメントの投稿先種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CommentTargetKind {
    Task,
    Project,
}

/// テンプレートに渡す表示用データ
///
/// 名前が `Option` のフィールドは関連エンティティが見つからなかった場合に `None` になる。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationPayload {
    NewTeamMember {
        member_id:   UserId,
        member_name: String,
        email:       String,
        role:        String,
        department:  Option<String>,
    },
    TaskAssigned {
        task:             TaskSummary,
        assignee_name:    Option<String>,
        assigned_by_name: Option<String>,
        project_name:     Option<String>,
    },
    TaskStatusChanged {
        task:            TaskSummary,
        previous_status: TaskStatus,
        changed_by_name: Option<String>,
        project_name:    Option<String>,
    },
    CommentAdded {
        target_kind:  CommentTargetKind,
        target_id:    String,
        target_name:  String,
        author_name:  Option<String>,
        body:         String,
        project_name: Option<String>,
    },
    ProjectCreated {
        project:         ProjectSummary,
        created_by_name: Option<String>,
    },
    ProjectMemberAdded {
        project:       ProjectSummary,
        member_name:   String,
        added_by_name: Option<String>,
    },
    MilestoneCompleted {
        project_id:        ProjectId,
        project_name:      String,
        milestone_title:   String,
        due_date:          Option<NaiveDate>,
        completed_by_name: Option<String>,
    },
    LeaveSubmitted {
        leave:     LeaveSummary,
        user_name: String,
    },
    LeaveStatusChanged {
        leave:         LeaveSummary,
        user_name:     String,
        reviewer_name: Option<String>,
    },
}

impl NotificationPayload {
    /// 通知イベント種別を返す
    pub fn event_type(&self) -> NotificationEventType {
        match self {
            Self::NewTeamMember { .. } => NotificationEventType::NewTeamMember,
            Self::TaskAssigned { .. } => NotificationEventType::TaskAssigned,
            Self::TaskStatusChanged { .. } => NotificationEventType::TaskStatusChanged,
            Self::CommentAdded { .. } => NotificationEventType::CommentAdded,
            Self::ProjectCreated { .. } => NotificationEventType::ProjectCreated,
            Self::ProjectMemberAdded { .. } => NotificationEventType::ProjectMemberAdded,
            Self::MilestoneCompleted { .. } => NotificationEventType::MilestoneCompleted,
            Self::LeaveSubmitted { .. } => NotificationEventType::LeaveSubmitted,
            Self::LeaveStatusChanged { .. } => NotificationEventType::LeaveStatusChanged,
        }
    }
}

/// 通知の宛先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub user_id: UserId,
    pub name:    String,
    pub email:   String,
}

/// 添付ファイル
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename:     String,
    pub content_type: String,
    pub content:      Vec<u8>,
}

/// メールメッセージ
///
/// テンプレートレンダリングの出力。NotificationSender に渡される。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:          Vec<String>,
    pub cc:          Vec<String>,
    pub bcc:         Vec<String>,
    /// 件名
    pub subject:     String,
    /// HTML 本文
    pub html_body:   String,
    /// プレーンテキスト本文
    pub text_body:   String,
    pub attachments: Vec<Attachment>,
}

impl EmailMessage {
    /// to / cc / bcc を合わせた宛先数
    pub fn recipient_count(&self) -> usize {
        self.to.len() + self.cc.len() + self.bcc.len()
    }
}

/// 送信成功時の受領情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: String,
}

/// 通知処理の結果
///
/// オーケストレーターは `Err` を返さず、常にこの値を返す。
/// 呼び出し元がログ出力・無視などの扱いを決める。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NotificationOutcome {
    /// 送信成功
    Sent {
        message_id: String,
        recipients: Vec<String>,
    },
    /// 宛先がいないため送信しなかった
    Skipped { info: String },
    /// 送信処理に失敗した（業務操作は成功扱い）
    Warning { warning: String },
    /// 対象エンティティが見つからない、または想定外のエラー
    Failed { error: String },
}

impl NotificationOutcome {
    pub const NO_RECIPIENTS: &'static str = "No recipients available";

    pub fn skipped_no_recipients() -> Self {
        Self::Skipped {
            info: Self::NO_RECIPIENTS.to_string(),
        }
    }

    /// `Failed` 以外は成功扱い
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(NotificationEventType::NewTeamMember, "new_team_member")]
    #[case(NotificationEventType::TaskAssigned, "task_assigned")]
    #[case(NotificationEventType::TaskStatusChanged, "task_status_changed")]
    #[case(NotificationEventType::CommentAdded, "comment_added")]
    #[case(NotificationEventType::ProjectCreated, "project_created")]
    #[case(NotificationEventType::ProjectMemberAdded, "project_member_added")]
    #[case(NotificationEventType::MilestoneCompleted, "milestone_completed")]
    #[case(NotificationEventType::LeaveSubmitted, "leave_submitted")]
    #[case(NotificationEventType::LeaveStatusChanged, "leave_status_changed")]
    fn test_通知イベント種別の文字列変換が正しい(
        #[case] event_type: NotificationEventType,
        #[case] expected: &str,
    ) {
        assert_eq!(event_type.to_string(), expected);
        assert_eq!(NotificationEventType::from_str(expected).unwrap(), event_type);
    }

    #[test]
    fn test_イベントから種別を取得できる() {
        let event = NotificationEvent::TaskAssigned {
            task_id:     TaskId::new(),
            assigned_by: UserId::new(),
        };

        assert_eq!(event.event_type(), NotificationEventType::TaskAssigned);
    }

    #[rstest]
    #[case(NotificationOutcome::Sent { message_id: "m".to_string(), recipients: vec![] }, true)]
    #[case(NotificationOutcome::skipped_no_recipients(), true)]
    #[case(NotificationOutcome::Warning { warning: "smtp down".to_string() }, true)]
    #[case(NotificationOutcome::Failed { error: "Task not found".to_string() }, false)]
    fn test_failed以外は成功扱い(#[case] outcome: NotificationOutcome, #[case] expected: bool) {
        assert_eq!(outcome.is_success(), expected);
    }

    #[test]
    fn test_結果はstatusタグ付きでシリアライズされる() {
        let outcome = NotificationOutcome::skipped_no_recipients();

        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "status": "skipped", "info": "No recipients available" })
        );
    }

    #[test]
    fn test_宛先数はtoccbccの合計() {
        let message = EmailMessage {
            to: vec!["a@example.com".to_string(), "b@example.com".to_string()],
            bcc: vec!["c@example.com".to_string()],
            ..Default::default()
        };

        assert_eq!(message.recipient_count(), 3);
    }
}
