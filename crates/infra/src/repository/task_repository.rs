//! # TaskRepository
//!
//! タスクの永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    project::ProjectId,
    task::{Task, TaskId, TaskPriority, TaskRecord, TaskStatus},
    user::UserId,
    value_objects::TaskTitle,
};
use uuid::Uuid;

use crate::error::InfraError;

/// タスクリポジトリトレイト
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// タスクを挿入する
    async fn insert(&self, task: &Task) -> Result<(), InfraError>;

    /// 担当者・ステータス・更新日時を保存する
    ///
    /// 対象行が存在しない場合は `InfraErrorKind::Conflict`。
    async fn update(&self, task: &Task) -> Result<(), InfraError>;

    /// ID でタスクを検索
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, InfraError>;
}

/// DB の tasks テーブルの行
#[derive(sqlx::FromRow)]
struct TaskRow {
    id:          Uuid,
    title:       String,
    description: Option<String>,
    status:      String,
    priority:    String,
    due_date:    Option<NaiveDate>,
    project_id:  Option<Uuid>,
    assignee_id: Option<Uuid>,
    created_by:  Uuid,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<TaskRow> for Task {
    type Error = InfraError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task::from_db(TaskRecord {
            id:          TaskId::from_uuid(row.id),
            title:       TaskTitle::new(row.title)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            description: row.description,
            status:      row
                .status
                .parse::<TaskStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            priority:    row
                .priority
                .parse::<TaskPriority>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            due_date:    row.due_date,
            project_id:  row.project_id.map(ProjectId::from_uuid),
            assignee_id: row.assignee_id.map(UserId::from_uuid),
            created_by:  UserId::from_uuid(row.created_by),
            created_at:  row.created_at,
            updated_at:  row.updated_at,
        }))
    }
}

/// PostgreSQL 実装の TaskRepository
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: PgPool,
}

impl PostgresTaskRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(task_id = %task.id()))]
    async fn insert(&self, task: &Task) -> Result<(), InfraError> {
        let status: &'static str = task.status().into();
        let priority: &'static str = task.priority().into();

        sqlx::query(
            r#"
            INSERT INTO tasks (
                id, title, description, status, priority, due_date,
                project_id, assignee_id, created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(task.id().as_uuid())
        .bind(task.title().as_str())
        .bind(task.description())
        .bind(status)
        .bind(priority)
        .bind(task.due_date())
        .bind(task.project_id().map(|id| *id.as_uuid()))
        .bind(task.assignee_id().map(|id| *id.as_uuid()))
        .bind(task.created_by().as_uuid())
        .bind(task.created_at())
        .bind(task.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(task_id = %task.id()))]
    async fn update(&self, task: &Task) -> Result<(), InfraError> {
        let status: &'static str = task.status().into();

        let result = sqlx::query(
            r#"
            UPDATE tasks
            SET assignee_id = $2, status = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(task.id().as_uuid())
        .bind(task.assignee_id().map(|id| *id.as_uuid()))
        .bind(status)
        .bind(task.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Task", task.id().to_string()));
        }

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(task_id = %id))]
    async fn find_by_id(&self, id: &TaskId) -> Result<Option<Task>, InfraError> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT
                id, title, description, status, priority, due_date,
                project_id, assignee_id, created_by, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Task::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn TaskRepository>>();
    }
}
