//! # ProjectRepository
//!
//! プロジェクトとメンバー（project_members）の永続化を担当するリポジトリ。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    project::{Project, ProjectId, ProjectRecord, ProjectStatus},
    user::UserId,
    value_objects::ProjectName,
};
use uuid::Uuid;

use crate::error::InfraError;

/// プロジェクトリポジトリトレイト
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// プロジェクトを挿入する
    async fn insert(&self, project: &Project) -> Result<(), InfraError>;

    /// ID でプロジェクトを検索
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, InfraError>;

    /// メンバーを追加する
    ///
    /// # 戻り値
    ///
    /// - `Ok(true)`: 新たに追加した
    /// - `Ok(false)`: 既にメンバーだった
    async fn add_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError>;

    /// メンバーのユーザー ID 一覧を取得（追加順）
    async fn find_member_ids(&self, project_id: &ProjectId) -> Result<Vec<UserId>, InfraError>;
}

/// DB の projects テーブルの行
#[derive(sqlx::FromRow)]
struct ProjectRow {
    id:          Uuid,
    name:        String,
    description: Option<String>,
    status:      String,
    start_date:  Option<NaiveDate>,
    end_date:    Option<NaiveDate>,
    created_by:  Uuid,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

impl TryFrom<ProjectRow> for Project {
    type Error = InfraError;

    fn try_from(row: ProjectRow) -> Result<Self, Self::Error> {
        Ok(Project::from_db(ProjectRecord {
            id:          ProjectId::from_uuid(row.id),
            name:        ProjectName::new(row.name)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            description: row.description,
            status:      row
                .status
                .parse::<ProjectStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            start_date:  row.start_date,
            end_date:    row.end_date,
            created_by:  UserId::from_uuid(row.created_by),
            created_at:  row.created_at,
            updated_at:  row.updated_at,
        }))
    }
}

/// PostgreSQL 実装の ProjectRepository
#[derive(Debug, Clone)]
pub struct PostgresProjectRepository {
    pool: PgPool,
}

impl PostgresProjectRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectRepository for PostgresProjectRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(project_id = %project.id()))]
    async fn insert(&self, project: &Project) -> Result<(), InfraError> {
        let status: &'static str = project.status().into();

        sqlx::query(
            r#"
            INSERT INTO projects (
                id, name, description, status, start_date, end_date,
                created_by, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(project.id().as_uuid())
        .bind(project.name().as_str())
        .bind(project.description())
        .bind(status)
        .bind(project.start_date())
        .bind(project.end_date())
        .bind(project.created_by().as_uuid())
        .bind(project.created_at())
        .bind(project.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(project_id = %id))]
    async fn find_by_id(&self, id: &ProjectId) -> Result<Option<Project>, InfraError> {
        let row = sqlx::query_as::<_, ProjectRow>(
            r#"
            SELECT
                id, name, description, status, start_date, end_date,
                created_by, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Project::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(project_id = %project_id, user_id = %user_id))]
    async fn add_member(
        &self,
        project_id: &ProjectId,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<bool, InfraError> {
        let result = sqlx::query(
            r#"
            INSERT INTO project_members (project_id, user_id, added_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (project_id, user_id) DO NOTHING
            "#,
        )
        .bind(project_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip_all, level = "debug", fields(project_id = %project_id))]
    async fn find_member_ids(&self, project_id: &ProjectId) -> Result<Vec<UserId>, InfraError> {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT user_id
            FROM project_members
            WHERE project_id = $1
            ORDER BY added_at, user_id
            "#,
        )
        .bind(project_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().map(UserId::from_uuid).collect())
    }
}
