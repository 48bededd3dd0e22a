//! # CommentRepository
//!
//! コメントとリアクション集計の永続化を担当するリポジトリ。
//!
//! 投稿先は `target_type`（`task` / `project`）と `target_id` の組で保持する。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    comment::{Comment, CommentId, CommentRecord, CommentTarget, Reaction},
    project::ProjectId,
    task::TaskId,
    user::UserId,
    value_objects::CommentBody,
};
use uuid::Uuid;

use crate::error::InfraError;

/// コメントリポジトリトレイト
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// コメントを挿入する
    async fn insert(&self, comment: &Comment) -> Result<(), InfraError>;

    /// ID でコメントを検索（リアクション集計を含む）
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError>;
}

/// DB の comments テーブルの行
#[derive(sqlx::FromRow)]
struct CommentRow {
    id:          Uuid,
    target_type: String,
    target_id:   Uuid,
    author_id:   Uuid,
    body:        String,
    created_at:  DateTime<Utc>,
}

/// comment_reactions の絵文字ごとの集計行
#[derive(sqlx::FromRow)]
struct ReactionRow {
    emoji: String,
    count: i64,
}

fn parse_target(target_type: &str, target_id: Uuid) -> Result<CommentTarget, InfraError> {
    match target_type {
        "task" => Ok(CommentTarget::Task(TaskId::from_uuid(target_id))),
        "project" => Ok(CommentTarget::Project(ProjectId::from_uuid(target_id))),
        other => Err(InfraError::unexpected(format!(
            "不明なコメント投稿先: {other}"
        ))),
    }
}

fn into_comment(row: CommentRow, reactions: Vec<ReactionRow>) -> Result<Comment, InfraError> {
    Ok(Comment::from_db(CommentRecord {
        id:         CommentId::from_uuid(row.id),
        target:     parse_target(&row.target_type, row.target_id)?,
        author_id:  UserId::from_uuid(row.author_id),
        body:       CommentBody::new(row.body).map_err(|e| InfraError::unexpected(e.to_string()))?,
        reactions:  reactions
            .into_iter()
            .map(|r| Reaction {
                emoji: r.emoji,
                count: i32::try_from(r.count).unwrap_or(i32::MAX),
            })
            .collect(),
        created_at: row.created_at,
    }))
}

/// PostgreSQL 実装の CommentRepository
#[derive(Debug, Clone)]
pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(comment_id = %comment.id()))]
    async fn insert(&self, comment: &Comment) -> Result<(), InfraError> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, target_type, target_id, author_id, body, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id().as_uuid())
        .bind(comment.target().kind())
        .bind(comment.target().as_uuid())
        .bind(comment.author_id().as_uuid())
        .bind(comment.body().as_str())
        .bind(comment.created_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(comment_id = %id))]
    async fn find_by_id(&self, id: &CommentId) -> Result<Option<Comment>, InfraError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, target_type, target_id, author_id, body, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reactions = sqlx::query_as::<_, ReactionRow>(
            r#"
            SELECT emoji, COUNT(*) AS count
            FROM comment_reactions
            WHERE comment_id = $1
            GROUP BY emoji
            ORDER BY MIN(created_at), emoji
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        into_comment(row, reactions).map(Some)
    }
}
