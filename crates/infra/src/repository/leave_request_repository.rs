//! # LeaveRequestRepository
//!
//! 休暇申請の永続化を担当するリポジトリ。
//!
//! 審査結果の保存は `WHERE id = $1 AND status = 'pending'` で条件付き更新する。
//! 対象の申請以外の行は変更されず、審査済みの申請は上書きされない。

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    leave::{LeaveRequest, LeaveRequestId, LeaveRequestRecord, LeaveStatus, LeaveType},
    user::UserId,
};
use uuid::Uuid;

use crate::error::InfraError;

/// 休暇申請リポジトリトレイト
#[async_trait]
pub trait LeaveRequestRepository: Send + Sync {
    /// 休暇申請を挿入する
    async fn insert(&self, leave: &LeaveRequest) -> Result<(), InfraError>;

    /// ID で休暇申請を検索
    async fn find_by_id(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, InfraError>;

    /// 審査結果を保存する
    ///
    /// `pending` の行のみ更新する。該当行がない場合は `InfraErrorKind::Conflict`。
    async fn update_review(&self, leave: &LeaveRequest) -> Result<(), InfraError>;
}

/// DB の leave_requests テーブルの行
#[derive(sqlx::FromRow)]
struct LeaveRequestRow {
    id:           Uuid,
    user_id:      Uuid,
    leave_type:   String,
    start_date:   NaiveDate,
    end_date:     NaiveDate,
    reason:       Option<String>,
    status:       String,
    reviewed_by:  Option<Uuid>,
    review_notes: Option<String>,
    reviewed_at:  Option<DateTime<Utc>>,
    created_at:   DateTime<Utc>,
    updated_at:   DateTime<Utc>,
}

impl TryFrom<LeaveRequestRow> for LeaveRequest {
    type Error = InfraError;

    fn try_from(row: LeaveRequestRow) -> Result<Self, Self::Error> {
        Ok(LeaveRequest::from_db(LeaveRequestRecord {
            id:           LeaveRequestId::from_uuid(row.id),
            user_id:      UserId::from_uuid(row.user_id),
            leave_type:   row
                .leave_type
                .parse::<LeaveType>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            start_date:   row.start_date,
            end_date:     row.end_date,
            reason:       row.reason,
            status:       row
                .status
                .parse::<LeaveStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            reviewed_by:  row.reviewed_by.map(UserId::from_uuid),
            review_notes: row.review_notes,
            reviewed_at:  row.reviewed_at,
            created_at:   row.created_at,
            updated_at:   row.updated_at,
        }))
    }
}

/// PostgreSQL 実装の LeaveRequestRepository
#[derive(Debug, Clone)]
pub struct PostgresLeaveRequestRepository {
    pool: PgPool,
}

impl PostgresLeaveRequestRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LeaveRequestRepository for PostgresLeaveRequestRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(leave_request_id = %leave.id()))]
    async fn insert(&self, leave: &LeaveRequest) -> Result<(), InfraError> {
        let leave_type: &'static str = leave.leave_type().into();
        let status: &'static str = leave.status().into();

        sqlx::query(
            r#"
            INSERT INTO leave_requests (
                id, user_id, leave_type, start_date, end_date, reason, status,
                reviewed_by, review_notes, reviewed_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(leave.id().as_uuid())
        .bind(leave.user_id().as_uuid())
        .bind(leave_type)
        .bind(leave.start_date())
        .bind(leave.end_date())
        .bind(leave.reason())
        .bind(status)
        .bind(leave.reviewed_by().map(|id| *id.as_uuid()))
        .bind(leave.review_notes())
        .bind(leave.reviewed_at())
        .bind(leave.created_at())
        .bind(leave.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(leave_request_id = %id))]
    async fn find_by_id(&self, id: &LeaveRequestId) -> Result<Option<LeaveRequest>, InfraError> {
        let row = sqlx::query_as::<_, LeaveRequestRow>(
            r#"
            SELECT
                id, user_id, leave_type, start_date, end_date, reason, status,
                reviewed_by, review_notes, reviewed_at, created_at, updated_at
            FROM leave_requests
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(LeaveRequest::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(leave_request_id = %leave.id()))]
    async fn update_review(&self, leave: &LeaveRequest) -> Result<(), InfraError> {
        let status: &'static str = leave.status().into();

        let result = sqlx::query(
            r#"
            UPDATE leave_requests
            SET status = $2, reviewed_by = $3, review_notes = $4, reviewed_at = $5, updated_at = $6
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(leave.id().as_uuid())
        .bind(status)
        .bind(leave.reviewed_by().map(|id| *id.as_uuid()))
        .bind(leave.review_notes())
        .bind(leave.reviewed_at())
        .bind(leave.updated_at())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(InfraError::conflict("LeaveRequest", leave.id().to_string()));
        }

        Ok(())
    }
}
