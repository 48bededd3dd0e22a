//! # 休暇申請ハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /internal/leave-requests` - 休暇申請（マネージャーへ通知）
//! - `POST /internal/leave-requests/{leave_request_id}/approve` - 承認（申請者へ通知）
//! - `POST /internal/leave-requests/{leave_request_id}/reject` - 却下（申請者へ通知）

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use teamboard_domain::{
    leave::{LeaveRequest, LeaveRequestId, LeaveStatus, LeaveType},
    user::UserId,
};
use teamboard_shared::ApiResponse;
use uuid::Uuid;

use super::NotifiedDto;
use crate::{
    error::CoreError,
    usecase::{LeaveUseCaseImpl, ReviewLeaveInput, SubmitLeaveInput},
};

/// 休暇申請 API の共有状態
pub struct LeaveState {
    pub usecase: LeaveUseCaseImpl,
}

/// 休暇申請リクエスト
#[derive(Debug, Deserialize)]
pub struct SubmitLeaveRequest {
    pub user_id:    Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    #[serde(default)]
    pub reason:     Option<String>,
}

/// 承認・却下リクエスト
#[derive(Debug, Deserialize)]
pub struct ReviewLeaveRequest {
    pub reviewer_id: Uuid,
    #[serde(default)]
    pub notes:       Option<String>,
}

/// 休暇申請 DTO
#[derive(Debug, Serialize)]
pub struct LeaveRequestDto {
    pub id:           Uuid,
    pub user_id:      Uuid,
    pub leave_type:   LeaveType,
    pub start_date:   NaiveDate,
    pub end_date:     NaiveDate,
    pub days:         i64,
    pub reason:       Option<String>,
    pub status:       LeaveStatus,
    pub reviewed_by:  Option<Uuid>,
    pub review_notes: Option<String>,
    pub reviewed_at:  Option<DateTime<Utc>>,
}

impl From<&LeaveRequest> for LeaveRequestDto {
    fn from(leave: &LeaveRequest) -> Self {
        Self {
            id:           *leave.id().as_uuid(),
            user_id:      *leave.user_id().as_uuid(),
            leave_type:   leave.leave_type(),
            start_date:   leave.start_date(),
            end_date:     leave.end_date(),
            days:         leave.days(),
            reason:       leave.reason().map(str::to_string),
            status:       leave.status(),
            reviewed_by:  leave.reviewed_by().map(|id| *id.as_uuid()),
            review_notes: leave.review_notes().map(str::to_string),
            reviewed_at:  leave.reviewed_at(),
        }
    }
}

fn review_input(leave_request_id: Uuid, req: ReviewLeaveRequest) -> ReviewLeaveInput {
    ReviewLeaveInput {
        leave_request_id: LeaveRequestId::from_uuid(leave_request_id),
        reviewer_id:      UserId::from_uuid(req.reviewer_id),
        notes:            req.notes,
    }
}

/// POST /internal/leave-requests
///
/// ## レスポンス
///
/// - `201 Created`: 申請内容と通知結果
/// - `400 Bad Request`: 終了日が開始日より前
/// - `404 Not Found`: 申請者が存在しない
pub async fn submit_leave(
    State(state): State<Arc<LeaveState>>,
    Json(req): Json<SubmitLeaveRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = SubmitLeaveInput {
        user_id:    UserId::from_uuid(req.user_id),
        leave_type: req.leave_type,
        start_date: req.start_date,
        end_date:   req.end_date,
        reason:     req.reason,
    };

    let result = state.usecase.submit_leave(input).await?;
    let response = ApiResponse::new(NotifiedDto::<LeaveRequestDto>::from_result(result));

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /internal/leave-requests/{leave_request_id}/approve
pub async fn approve_leave(
    State(state): State<Arc<LeaveState>>,
    Path(leave_request_id): Path<Uuid>,
    Json(req): Json<ReviewLeaveRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let result = state
        .usecase
        .approve_leave(review_input(leave_request_id, req))
        .await?;

    Ok(Json(ApiResponse::new(
        NotifiedDto::<LeaveRequestDto>::from_result(result),
    )))
}

/// POST /internal/leave-requests/{leave_request_id}/reject
pub async fn reject_leave(
    State(state): State<Arc<LeaveState>>,
    Path(leave_request_id): Path<Uuid>,
    Json(req): Json<ReviewLeaveRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let result = state
        .usecase
        .reject_leave(review_input(leave_request_id, req))
        .await?;

    Ok(Json(ApiResponse::new(
        NotifiedDto::<LeaveRequestDto>::from_result(result),
    )))
}
