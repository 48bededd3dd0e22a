//! # タスク
//!
//! タスクボード上のタスクを表現する。
//!
//! ## 状態
//!
//! カンバンの列に対応する 4 状態を持つ。ボード上のドラッグ&ドロップで
//! 任意の列へ移動できるため、遷移の制約は設けない。
//!
//! ```text
//! Todo ⇄ InProgress ⇄ Review ⇄ Completed
//! ```
//!
//! 担当者の変更とステータス変更が通知のトリガーになる。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{project::ProjectId, user::UserId, value_objects::TaskTitle};

define_uuid_id! {
    /// タスク ID
    pub struct TaskId;
}

/// タスクステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Review,
    Completed,
}

impl TaskStatus {
    /// メール本文などに表示するラベル
    pub fn label(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Review => "Review",
            Self::Completed => "Completed",
        }
    }
}

/// タスク優先度
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Urgent => "Urgent",
        }
    }
}

/// タスクエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    id:          TaskId,
    title:       TaskTitle,
    description: Option<String>,
    status:      TaskStatus,
    priority:    TaskPriority,
    due_date:    Option<NaiveDate>,
    project_id:  Option<ProjectId>,
    assignee_id: Option<UserId>,
    created_by:  UserId,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

/// タスクの新規作成パラメータ
pub struct NewTask {
    pub id:          TaskId,
    pub title:       TaskTitle,
    pub description: Option<String>,
    pub priority:    TaskPriority,
    pub due_date:    Option<NaiveDate>,
    pub project_id:  Option<ProjectId>,
    pub assignee_id: Option<UserId>,
    pub created_by:  UserId,
    pub now:         DateTime<Utc>,
}

/// タスクの DB 復元パラメータ
pub struct TaskRecord {
    pub id:          TaskId,
    pub title:       TaskTitle,
    pub description: Option<String>,
    pub status:      TaskStatus,
    pub priority:    TaskPriority,
    pub due_date:    Option<NaiveDate>,
    pub project_id:  Option<ProjectId>,
    pub assignee_id: Option<UserId>,
    pub created_by:  UserId,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl Task {
    /// 新しいタスクを作成する（ステータスは `Todo`）
    pub fn new(params: NewTask) -> Self {
        Self {
            id:          params.id,
            title:       params.title,
            description: params.description.filter(|d| !d.trim().is_empty()),
            status:      TaskStatus::Todo,
            priority:    params.priority,
            due_date:    params.due_date,
            project_id:  params.project_id,
            assignee_id: params.assignee_id,
            created_by:  params.created_by,
            created_at:  params.now,
            updated_at:  params.now,
        }
    }

    pub fn from_db(record: TaskRecord) -> Self {
        Self {
            id:          record.id,
            title:       record.title,
            description: record.description,
            status:      record.status,
            priority:    record.priority,
            due_date:    record.due_date,
            project_id:  record.project_id,
            assignee_id: record.assignee_id,
            created_by:  record.created_by,
            created_at:  record.created_at,
            updated_at:  record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn title(&self) -> &TaskTitle {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn project_id(&self) -> Option<&ProjectId> {
        self.project_id.as_ref()
    }

    pub fn assignee_id(&self) -> Option<&UserId> {
        self.assignee_id.as_ref()
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 担当者を変更した新しいインスタンスを返す
    pub fn assigned_to(self, assignee_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            assignee_id: Some(assignee_id),
            updated_at: now,
            ..self
        }
    }

    /// ステータスを変更した新しいインスタンスを返す
    pub fn with_status(self, status: TaskStatus, now: DateTime<Utc>) -> Self {
        Self {
            status,
            updated_at: now,
            ..self
        }
    }
}
