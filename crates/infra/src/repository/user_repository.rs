//! # UserRepository
//!
//! チームメンバーの永続化を担当するリポジトリ。
//!
//! 通知の宛先解決で「ロール単位のアクティブユーザー」と「ID の一括検索」を使う。

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use teamboard_domain::{
    user::{Email, User, UserId, UserRecord, UserRole, UserStatus},
    value_objects::UserName,
};
use uuid::Uuid;

use crate::error::InfraError;

/// ユーザーリポジトリトレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// ユーザーを挿入する
    ///
    /// メールアドレスが重複する場合は `InfraErrorKind::Conflict`。
    async fn insert(&self, user: &User) -> Result<(), InfraError>;

    /// ID でユーザーを検索
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError>;

    /// 複数の ID でユーザーを一括検索
    ///
    /// 存在しない ID は無視し、見つかったユーザーのみ返す。
    /// 返却順は引数の ID の順序に従う。
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, InfraError>;

    /// 指定ロールのアクティブユーザー一覧を取得（作成日時順）
    async fn find_active_by_role(&self, role: UserRole) -> Result<Vec<User>, InfraError>;

    /// メールアドレスでユーザーを検索（大文字小文字を区別しない）
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError>;
}

/// DB の users テーブルの行
#[derive(sqlx::FromRow)]
struct UserRow {
    id:         Uuid,
    name:       String,
    email:      String,
    role:       String,
    department: Option<String>,
    status:     String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = InfraError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User::from_db(UserRecord {
            id:         UserId::from_uuid(row.id),
            name:       UserName::new(row.name)
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            email:      Email::new(row.email).map_err(|e| InfraError::unexpected(e.to_string()))?,
            role:       row
                .role
                .parse::<UserRole>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            department: row.department,
            status:     row
                .status
                .parse::<UserStatus>()
                .map_err(|e| InfraError::unexpected(e.to_string()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }))
    }
}

const SELECT_USERS: &str = r#"
    SELECT id, name, email, role, department, status, created_at, updated_at
    FROM users
"#;

/// PostgreSQL 実装の UserRepository
#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// 新しいリポジトリインスタンスを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[tracing::instrument(skip_all, level = "debug", fields(user_id = %user.id()))]
    async fn insert(&self, user: &User) -> Result<(), InfraError> {
        let role: &'static str = user.role().into();
        let status: &'static str = user.status().into();

        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, role, department, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.id().as_uuid())
        .bind(user.name().as_str())
        .bind(user.email().as_str())
        .bind(role)
        .bind(user.department())
        .bind(status)
        .bind(user.created_at())
        .bind(user.updated_at())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip_all, level = "debug", fields(id = %id))]
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USERS} WHERE id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(User::try_from).transpose()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, InfraError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let uuid_ids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        // ANY($1) は順序を保証しないため、配列内の位置で並べ替える
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USERS} WHERE id = ANY($1) ORDER BY array_position($1, id)"
        ))
        .bind(&uuid_ids)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug", fields(role = %role))]
    async fn find_active_by_role(&self, role: UserRole) -> Result<Vec<User>, InfraError> {
        let role: &'static str = role.into();

        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USERS} WHERE role = $1 AND status = 'active' ORDER BY created_at, id"
        ))
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    #[tracing::instrument(skip_all, level = "debug")]
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, InfraError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USERS} WHERE LOWER(email) = $1"
        ))
        .bind(email.normalized())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_トレイトはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Box<dyn UserRepository>>();
    }

    #[test]
    fn test_不正なロールの行は変換エラーになる() {
        let now = Utc::now();
        let row = UserRow {
            id:         Uuid::now_v7(),
            name:       "Alice".to_string(),
            email:      "alice@example.com".to_string(),
            role:       "owner".to_string(),
            department: None,
            status:     "active".to_string(),
            created_at: now,
            updated_at: now,
        };

        assert!(User::try_from(row).is_err());
    }
}
