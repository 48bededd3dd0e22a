//! # タスクハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /internal/tasks` - タスク作成（担当者がいれば通知）
//! - `POST /internal/tasks/{task_id}/assign` - 担当者の割り当て
//! - `POST /internal/tasks/{task_id}/status` - ステータス変更（変化がなければ通知なし）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use teamboard_domain::{
    project::ProjectId,
    task::{Task, TaskId, TaskPriority, TaskStatus},
    user::UserId,
};
use teamboard_shared::ApiResponse;
use uuid::Uuid;

use super::NotifiedDto;
use crate::{
    error::CoreError,
    usecase::{AssignTaskInput, ChangeTaskStatusInput, CreateTaskInput, TaskUseCaseImpl},
};

/// タスク API の共有状態
pub struct TaskState {
    pub usecase: TaskUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// タスク作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title:       String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority:    TaskPriority,
    #[serde(default)]
    pub due_date:    Option<NaiveDate>,
    #[serde(default)]
    pub project_id:  Option<Uuid>,
    #[serde(default)]
    pub assignee_id: Option<Uuid>,
    pub created_by:  Uuid,
}

fn default_priority() -> TaskPriority {
    TaskPriority::Medium
}

/// 担当者割り当てリクエスト
#[derive(Debug, Deserialize)]
pub struct AssignTaskRequest {
    pub assignee_id: Uuid,
    pub assigned_by: Uuid,
}

/// ステータス変更リクエスト
#[derive(Debug, Deserialize)]
pub struct ChangeTaskStatusRequest {
    pub status:     TaskStatus,
    pub changed_by: Uuid,
}

/// タスク DTO
#[derive(Debug, Serialize)]
pub struct TaskDto {
    pub id:          Uuid,
    pub title:       String,
    pub description: Option<String>,
    pub status:      TaskStatus,
    pub priority:    TaskPriority,
    pub due_date:    Option<NaiveDate>,
    pub project_id:  Option<Uuid>,
    pub assignee_id: Option<Uuid>,
    pub created_by:  Uuid,
    pub updated_at:  DateTime<Utc>,
}

impl From<&Task> for TaskDto {
    fn from(task: &Task) -> Self {
        Self {
            id:          *task.id().as_uuid(),
            title:       task.title().as_str().to_string(),
            description: task.description().map(str::to_string),
            status:      task.status(),
            priority:    task.priority(),
            due_date:    task.due_date(),
            project_id:  task.project_id().map(|id| *id.as_uuid()),
            assignee_id: task.assignee_id().map(|id| *id.as_uuid()),
            created_by:  *task.created_by().as_uuid(),
            updated_at:  task.updated_at(),
        }
    }
}

// --- ハンドラ ---

/// POST /internal/tasks
///
/// タスクを作成する。担当者を指定した場合は担当者に通知する。
pub async fn create_task(
    State(state): State<Arc<TaskState>>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = CreateTaskInput {
        title:       req.title,
        description: req.description,
        priority:    req.priority,
        due_date:    req.due_date,
        project_id:  req.project_id.map(ProjectId::from_uuid),
        assignee_id: req.assignee_id.map(UserId::from_uuid),
        created_by:  UserId::from_uuid(req.created_by),
    };

    let result = state.usecase.create_task(input).await?;
    let response = ApiResponse::new(NotifiedDto::<TaskDto>::from_result(result));

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /internal/tasks/{task_id}/assign
pub async fn assign_task(
    State(state): State<Arc<TaskState>>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<AssignTaskRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = AssignTaskInput {
        task_id:     TaskId::from_uuid(task_id),
        assignee_id: UserId::from_uuid(req.assignee_id),
        assigned_by: UserId::from_uuid(req.assigned_by),
    };

    let result = state.usecase.assign_task(input).await?;

    Ok(Json(ApiResponse::new(NotifiedDto::<TaskDto>::from_result(
        result,
    ))))
}

/// POST /internal/tasks/{task_id}/status
///
/// ## レスポンス
///
/// - `200 OK`: 変更後のタスク。ステータスが変わらなかった場合 `notification` は `null`
/// - `404 Not Found`: タスクが存在しない
pub async fn change_task_status(
    State(state): State<Arc<TaskState>>,
    Path(task_id): Path<Uuid>,
    Json(req): Json<ChangeTaskStatusRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = ChangeTaskStatusInput {
        task_id:    TaskId::from_uuid(task_id),
        status:     req.status,
        changed_by: UserId::from_uuid(req.changed_by),
    };

    let result = state.usecase.change_status(input).await?;

    Ok(Json(ApiResponse::new(NotifiedDto::<TaskDto>::from_result(
        result,
    ))))
}
