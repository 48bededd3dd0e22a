//! # チームメンバーハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /internal/team-members` - メンバー登録（管理者へ通知）

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamboard_domain::user::{User, UserRole, UserStatus};
use teamboard_shared::ApiResponse;
use uuid::Uuid;

use super::NotifiedDto;
use crate::{
    error::CoreError,
    usecase::{CreateTeamMemberInput, TeamMemberUseCaseImpl},
};

/// チームメンバー API の共有状態
pub struct TeamMemberState {
    pub usecase: TeamMemberUseCaseImpl,
}

/// メンバー登録リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateTeamMemberRequest {
    pub name:       String,
    pub email:      String,
    pub role:       UserRole,
    #[serde(default)]
    pub department: Option<String>,
}

/// ユーザー DTO
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id:         Uuid,
    pub name:       String,
    pub email:      String,
    pub role:       UserRole,
    pub department: Option<String>,
    pub status:     UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserDto {
    fn from(user: &User) -> Self {
        Self {
            id:         *user.id().as_uuid(),
            name:       user.name().as_str().to_string(),
            email:      user.email().as_str().to_string(),
            role:       user.role(),
            department: user.department().map(str::to_string),
            status:     user.status(),
            created_at: user.created_at(),
        }
    }
}

/// POST /internal/team-members
///
/// メンバーを登録する。
///
/// ## レスポンス
///
/// - `201 Created`: 登録したメンバーと通知結果
/// - `400 Bad Request`: 名前・メールアドレスの形式が不正
/// - `409 Conflict`: メールアドレスが登録済み
pub async fn create_team_member(
    State(state): State<Arc<TeamMemberState>>,
    Json(req): Json<CreateTeamMemberRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = CreateTeamMemberInput {
        name:       req.name,
        email:      req.email,
        role:       req.role,
        department: req.department,
    };

    let result = state.usecase.create_team_member(input).await?;
    let response = ApiResponse::new(NotifiedDto::<UserDto>::from_result(result));

    Ok((StatusCode::CREATED, Json(response)))
}
