//! # 通知ルート
//!
//! イベント種別ごとに「誰に送るか」と「どのテンプレートを使うか」を定義する。
//!
//! 送信先の解決ロジックや件名の組み立てはイベント種別で分岐させず、
//! このテーブルを参照して汎用的に処理する。

use teamboard_domain::notification::NotificationEventType;

/// 受信者の取得元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientSource {
    /// タスクの担当者
    Assignee,
    /// プロジェクトの全メンバー
    ProjectMembers,
    /// 有効な管理者全員
    Admins,
    /// 有効なマネージャー全員
    Managers,
    /// 休暇申請の申請者
    Requester,
    /// プロジェクトに追加されたメンバー
    AddedMember,
}

/// イベント種別ごとの通知ルート
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotificationRoute {
    pub event_type: NotificationEventType,
    /// 受信者の取得元（この順で結合し、メールアドレスで重複排除する）
    pub sources:    &'static [RecipientSource],
    /// テンプレート名（拡張子なし）
    pub template:   &'static str,
}

/// イベント種別に対応するルートを返す
pub fn route_for(event_type: NotificationEventType) -> NotificationRoute {
    use NotificationEventType as E;
    use RecipientSource as S;

    let (sources, template): (&'static [RecipientSource], &'static str) = match event_type {
        E::NewTeamMember => (&[S::Admins], "new_team_member"),
        E::TaskAssigned => (&[S::Assignee], "task_assigned"),
        E::TaskStatusChanged => (
            &[S::Assignee, S::ProjectMembers, S::Admins],
            "task_status_changed",
        ),
        E::CommentAdded => (&[S::ProjectMembers, S::Assignee], "comment_added"),
        E::ProjectCreated => (&[S::Admins], "project_created"),
        E::ProjectMemberAdded => (&[S::AddedMember], "project_member_added"),
        E::MilestoneCompleted => (&[S::ProjectMembers], "milestone_completed"),
        E::LeaveSubmitted => (&[S::Requester, S::Managers], "leave_submitted"),
        E::LeaveStatusChanged => (&[S::Requester], "leave_status_changed"),
    };

    NotificationRoute {
        event_type,
        sources,
        template,
    }
}
