//! # コメントハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /internal/comments` - タスク・プロジェクトへのコメント投稿

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use teamboard_domain::{
    comment::{Comment, CommentTarget, Reaction},
    user::UserId,
};
use teamboard_shared::ApiResponse;
use uuid::Uuid;

use super::NotifiedDto;
use crate::{
    error::CoreError,
    usecase::{CommentUseCaseImpl, PostCommentInput},
};

/// コメント API の共有状態
pub struct CommentState {
    pub usecase: CommentUseCaseImpl,
}

/// コメント投稿リクエスト
///
/// `target` は `{ "type": "task" | "project", "id": "<uuid>" }`。
#[derive(Debug, Deserialize)]
pub struct PostCommentRequest {
    pub target:    CommentTarget,
    pub author_id: Uuid,
    pub body:      String,
}

/// コメント DTO
#[derive(Debug, Serialize)]
pub struct CommentDto {
    pub id:         Uuid,
    pub target:     CommentTarget,
    pub author_id:  Uuid,
    pub body:       String,
    pub reactions:  Vec<Reaction>,
    pub created_at: DateTime<Utc>,
}

impl From<&Comment> for CommentDto {
    fn from(comment: &Comment) -> Self {
        Self {
            id:         *comment.id().as_uuid(),
            target:     comment.target().clone(),
            author_id:  *comment.author_id().as_uuid(),
            body:       comment.body().as_str().to_string(),
            reactions:  comment.reactions().to_vec(),
            created_at: comment.created_at(),
        }
    }
}

/// POST /internal/comments
pub async fn post_comment(
    State(state): State<Arc<CommentState>>,
    Json(req): Json<PostCommentRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = PostCommentInput {
        target:    req.target,
        author_id: UserId::from_uuid(req.author_id),
        body:      req.body,
    };

    let result = state.usecase.post_comment(input).await?;
    let response = ApiResponse::new(NotifiedDto::<CommentDto>::from_result(result));

    Ok((StatusCode::CREATED, Json(response)))
}
