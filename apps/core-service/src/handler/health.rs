//! # ヘルスチェックハンドラ
//!
//! Core Service の稼働状態を確認するためのエンドポイント。
//!
//! ```text
//! GET /health        → 常に 200（プロセスが生きているか）
//! GET /health/ready  → DB に接続できれば 200、できなければ 503
//! ```

use std::{collections::HashMap, sync::Arc};

use axum::{Json, extract::State, http::StatusCode};
use sqlx::PgPool;
use teamboard_infra::db;
use teamboard_shared::{CheckStatus, HealthResponse, ReadinessResponse, ReadinessStatus};

/// Readiness チェックの State
pub struct ReadinessState {
    pub pool: PgPool,
}

/// ヘルスチェックエンドポイント
///
/// サーバーが正常に稼働していることを確認するためのエンドポイント。
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status:  "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Readiness チェックエンドポイント
pub async fn readiness_check(
    State(state): State<Arc<ReadinessState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let database = match db::ping(&state.pool).await {
        Ok(()) => CheckStatus::Ok,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness チェック: データベースに接続できません");
            CheckStatus::Error
        }
    };

    let response =
        ReadinessResponse::from_checks(HashMap::from([("database".to_string(), database)]));
    let status = match &response.status {
        ReadinessStatus::Ready => StatusCode::OK,
        ReadinessStatus::NotReady => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status, Json(response))
}
