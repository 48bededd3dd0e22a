//! # ビジネスイベントログの構造化ヘルパー
//!
//! `jq` で効率的に調査できるよう、ログフィールドの命名規約と
//! ヘルパーマクロを提供する。
//!
//! ## ビジネスイベント
//!
//! [`log_business_event!`] マクロで出力する。`event.kind = "business_event"` マーカーが
//! 自動付与され、`jq 'select(.["event.kind"] == "business_event")'` でフィルタできる。
//!
//! ## フィールド命名規約
//!
//! ドット記法（`event.category`、`error.kind`）を使用。tracing の
//! `$($field:ident).+` パターンでサポートされ、JSON 出力でフラットなキーになる。

/// ビジネスイベントを構造化ログとして出力する。
///
/// `event.kind = "business_event"` マーカーを自動付与し、
/// `tracing::info!` レベルで出力する。呼び出し側のクレートは `tracing` に依存していること。
///
/// ## 必須フィールド（慣例）
///
/// - `event.category`: イベントカテゴリ（[`event::category`] の定数を使用）
/// - `event.action`: アクション名（[`event::action`] の定数を使用）
/// - `event.result`: 結果（[`event::result`] の定数を使用）
///
/// ## 推奨フィールド
///
/// - `event.entity_type`: エンティティ種別（[`event::entity_type`] の定数を使用）
/// - `event.entity_id`: エンティティ ID
/// - `event.actor_id`: 操作者 ID
#[macro_export]
macro_rules! log_business_event {
    ($($args:tt)*) => {
        ::tracing::info!(
            event.kind = "business_event",
            $($args)*
        )
    };
}

/// イベントフィールドの定数
pub mod event {
    /// イベントカテゴリ
    pub mod category {
        pub const TEAM: &str = "team";
        pub const TASK: &str = "task";
        pub const PROJECT: &str = "project";
        pub const LEAVE: &str = "leave";
        pub const NOTIFICATION: &str = "notification";
    }

    /// イベントアクション
    pub mod action {
        // チーム
        pub const TEAM_MEMBER_CREATED: &str = "team_member.created";

        // タスク
        pub const TASK_CREATED: &str = "task.created";
        pub const TASK_ASSIGNED: &str = "task.assigned";
        pub const TASK_STATUS_CHANGED: &str = "task.status_changed";
        pub const COMMENT_POSTED: &str = "comment.posted";

        // プロジェクト
        pub const PROJECT_CREATED: &str = "project.created";
        pub const PROJECT_MEMBER_ADDED: &str = "project.member_added";
        pub const MILESTONE_COMPLETED: &str = "milestone.completed";

        // 休暇申請
        pub const LEAVE_SUBMITTED: &str = "leave.submitted";
        pub const LEAVE_APPROVED: &str = "leave.approved";
        pub const LEAVE_REJECTED: &str = "leave.rejected";

        // 通知
        pub const NOTIFICATION_SENT: &str = "notification.sent";
        pub const NOTIFICATION_FAILED: &str = "notification.failed";
        pub const NOTIFICATION_SKIPPED: &str = "notification.skipped";
    }

    /// エンティティ種別
    pub mod entity_type {
        pub const USER: &str = "user";
        pub const TASK: &str = "task";
        pub const PROJECT: &str = "project";
        pub const MILESTONE: &str = "milestone";
        pub const COMMENT: &str = "comment";
        pub const LEAVE_REQUEST: &str = "leave_request";
    }

    /// イベント結果
    pub mod result {
        pub const SUCCESS: &str = "success";
        pub const FAILURE: &str = "failure";
        pub const SKIPPED: &str = "skipped";
    }
}

/// エラーコンテキストフィールドの定数
pub mod error {
    /// エラーカテゴリ
    pub mod category {
        /// インフラストラクチャ（DB）
        pub const INFRASTRUCTURE: &str = "infrastructure";
        /// 外部サービス呼び出し（SMTP）
        pub const EXTERNAL_SERVICE: &str = "external_service";
    }

    /// エラー種別
    pub mod kind {
        pub const DATABASE: &str = "database";
        pub const TEMPLATE: &str = "template";
        pub const MAIL_TRANSPORT: &str = "mail_transport";
    }
}
