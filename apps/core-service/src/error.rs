//! # Core Service エラー定義
//!
//! Core Service 固有のエラーと、HTTP レスポンスへの変換を定義する。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use teamboard_domain::DomainError;
use teamboard_infra::{InfraError, InfraErrorKind};
use teamboard_shared::event_log::error as log_error;
use thiserror::Error;

/// エラーレスポンス（RFC 7807 Problem Details）
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub error_type: String,
    pub title:      String,
    pub status:     u16,
    pub detail:     String,
}

/// Core Service で発生するエラー
#[derive(Debug, Error)]
pub enum CoreError {
    /// リソースが見つからない
    #[error("リソースが見つかりません: {0}")]
    NotFound(String),

    /// 不正なリクエスト
    #[error("不正なリクエスト: {0}")]
    BadRequest(String),

    /// 権限不足
    #[error("権限がありません: {0}")]
    Forbidden(String),

    /// 競合（状態遷移済み・一意制約違反）
    #[error("競合が発生しました: {0}")]
    Conflict(String),

    /// データベースエラー
    #[error("データベースエラー: {0}")]
    Database(InfraError),

    /// 内部エラー
    #[error("内部エラー: {0}")]
    Internal(String),
}

impl From<DomainError> for CoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => CoreError::BadRequest(msg),
            DomainError::InvalidStateTransition(msg) => CoreError::Conflict(msg),
        }
    }
}

impl From<InfraError> for CoreError {
    /// 競合はクライアントに返し、それ以外は 500 とする
    fn from(err: InfraError) -> Self {
        match err.kind() {
            InfraErrorKind::Conflict { .. } => CoreError::Conflict(err.to_string()),
            _ => CoreError::Database(err),
        }
    }
}

impl IntoResponse for CoreError {
    fn into_response(self) -> Response {
        let (status, error_type, title, detail) = match &self {
            CoreError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                "https://teamboard.example.com/errors/not-found",
                "Not Found",
                msg.clone(),
            ),
            CoreError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                "https://teamboard.example.com/errors/bad-request",
                "Bad Request",
                msg.clone(),
            ),
            CoreError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                "https://teamboard.example.com/errors/forbidden",
                "Forbidden",
                msg.clone(),
            ),
            CoreError::Conflict(msg) => (
                StatusCode::CONFLICT,
                "https://teamboard.example.com/errors/conflict",
                "Conflict",
                msg.clone(),
            ),
            CoreError::Database(e) => {
                tracing::error!(
                    error.category = log_error::category::INFRASTRUCTURE,
                    error.kind = log_error::kind::DATABASE,
                    span_trace = %e.span_trace(),
                    "データベースエラー: {}",
                    e
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "https://teamboard.example.com/errors/internal-error",
                    "Internal Server Error",
                    "内部エラーが発生しました".to_string(),
                )
            }
            CoreError::Internal(msg) => {
                tracing::error!("内部エラー: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "https://teamboard.example.com/errors/internal-error",
                    "Internal Server Error",
                    "内部エラーが発生しました".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorResponse {
                error_type: error_type.to_string(),
                title: title.to_string(),
                status: status.as_u16(),
                detail,
            }),
        )
            .into_response()
    }
}
