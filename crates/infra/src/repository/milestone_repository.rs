//! # MilestoneRepository
//!
//! マイルストーンの永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    project::{Milestone, MilestoneId, MilestoneRecord, ProjectId},
    user::UserId,
    value_objects::MilestoneTitle,
};
use uuid::Uuid;

use crate::error::InfraError;

/// マイルストーンリポジトリトレイト
#[async_trait]
pub trait MilestoneRepository: Send + Sync {
    /// マイルストーンを挿入する
    async fn insert(&self, milestone: &Milestone) -> Result<(), InfraError>;

    /// ID でマイルストーンを検索
    async fn find_by_id(&self, id: &MilestoneId) -> Result<Option<Milestone>, InfraError>;

    /// 完了状態を保存する
    ///
    /// 未完了の行のみ更新する。既に完了済みの場合は `InfraErrorKind::Conflict`。
    async fn mark_completed(&self, milestone: &Milestone) -> Result<(), InfraError>;
}

/// DB の milestones テーブルの行
#[derive(sqlx::FromRow)]
struct MilestoneRow {
    id:           Uuid,
    project_id:   Uuid,
    title:        String,
    due_date:     Option<NaiveDate>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<Uuid>,
    created_at:   DateTime<Utc>,
}

impl TryFrom<MilestoneRow> for Milestone {
    type Error = InfraError;

    fn try_from(row: MilestoneRow) -> Result<Self, Self::Error> {
        Ok(Milestone::from_db(MilestoneRecord {
            id:           MilestoneId::from_uuid(row.id),
            project_id:   ProjectId::from_uuid(row.project_id),
            title:        MilestoneTitle::new(row.title)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            due_date:     row.due_date,
            completed_at: row.completed_at,
            completed_by: row.completed_by.map(UserId::from_uuid),
            created_at:   row.created_at,
        }))
    }
}

/// PostgreSQL 実装の MilestoneRepository
#[derive(Debug, Clone)]
pub struct PostgresMilestoneRepository {
    pool: PgPool,
}

impl PostgresMilestoneRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MilestoneRepository for PostgresMilestoneRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(milestone_id = %milestone.id()))]
    async fn insert(&self, milestone: &Milestone) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO milestones (id, project_id, title, due_date, completed_at, completed_by, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(milestone.id().as_uuid())
        .bind(milestone.project_id().as_uuid())
        .bind(milestone.title().as_str())
        .bind(milestone.due_date())
        .bind(milestone.completed_at())
        .bind(milestone.completed_by().map(|id| *id.as_uuid()))
        .bind(milestone.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(milestone_id = %id))]
    async fn find_by_id(&self, id: &MilestoneId) -> Result<Option<Milestone>, InfraError> {
        let row = sqlx::query_as::<_, MilestoneRow>(
            r#"
            SELECT id, project_id, title, due_date, completed_at, completed_by, created_at
            FROM milestones
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Milestone::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(milestone_id = %milestone.id()))]
    async fn mark_completed(&self, milestone: &Milestone) -> Result<(), InfraError> {
        let result = sqlx::query(
            r#"
            UPDATE milestones
            SET completed_at = $2, completed_by = $3
            WHERE id = $1 AND completed_at IS NULL
            "#,
        )
        .bind(milestone.id().as_uuid())
        .bind(milestone.completed_at())
        .bind(milestone.completed_by().map(|id| *id.as_uuid()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("Milestone", milestone.id().to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn MilestoneRepository>>();
    }
}
