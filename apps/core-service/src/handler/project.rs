//! # プロジェクトハンドラ
//!
//! ## エンドポイント
//!
//! - `POST /internal/projects` - プロジェクト作成（管理者へ通知）
//! - `POST /internal/projects/{project_id}/members` - メンバー追加
//! - `POST /internal/projects/{project_id}/milestones` - マイルストーン作成（通知なし）
//! - `POST /internal/projects/{project_id}/milestones/{milestone_id}/complete` - マイルストーン完了

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
    project::{Milestone, MilestoneId, Project, ProjectId, ProjectStatus},
    user::UserId,
};
use teamboard_shared::ApiResponse;
use uuid::Uuid;

use super::NotifiedDto;
use crate::{
    error::CoreError,
    usecase::{
        AddProjectMemberInput,
        CompleteMilestoneInput,
        CreateMilestoneInput,
        CreateProjectInput,
        ProjectUseCaseImpl,
    },
};

/// プロジェクト API の共有状態
pub struct ProjectState {
    pub usecase: ProjectUseCaseImpl,
}

// --- リクエスト/レスポンス型 ---

/// プロジェクト作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub name:        String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub start_date:  Option<NaiveDate>,
    #[serde(default)]
    pub end_date:    Option<NaiveDate>,
    pub created_by:  Uuid,
}

/// メンバー追加リクエスト
#[derive(Debug, Deserialize)]
pub struct AddProjectMemberRequest {
    pub user_id:  Uuid,
    pub added_by: Uuid,
}

/// マイルストーン作成リクエスト
#[derive(Debug, Deserialize)]
pub struct CreateMilestoneRequest {
    pub title:    String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

/// マイルストーン完了リクエスト
#[derive(Debug, Deserialize)]
pub struct CompleteMilestoneRequest {
    pub completed_by: Uuid,
}

/// マイルストーン完了のパスパラメータ
#[derive(Debug, Deserialize)]
pub struct MilestonePath {
    pub project_id:   Uuid,
    pub milestone_id: Uuid,
}

/// プロジェクト DTO
#[derive(Debug, Serialize)]
pub struct ProjectDto {
    pub id:          Uuid,
    pub name:        String,
    pub description: Option<String>,
    pub status:      ProjectStatus,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    pub created_by:  Uuid,
    pub created_at:  DateTime<Utc>,
}

impl From<&Project> for ProjectDto {
    fn from(project: &Project) -> Self {
        Self {
            id:          *project.id().as_uuid(),
            name:        project.name().as_str().to_string(),
            description: project.description().map(str::to_string),
            status:      project.status(),
            start_date:  project.start_date(),
            end_date:    project.end_date(),
            created_by:  *project.created_by().as_uuid(),
            created_at:  project.created_at(),
        }
    }
}

/// マイルストーン DTO
#[derive(Debug, Serialize)]
pub struct MilestoneDto {
    pub id:           Uuid,
    pub project_id:   Uuid,
    pub title:        String,
    pub due_date:     Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<Uuid>,
}

impl From<&Milestone> for MilestoneDto {
    fn from(milestone: &Milestone) -> Self {
        Self {
            id:           *milestone.id().as_uuid(),
            project_id:   *milestone.project_id().as_uuid(),
            title:        milestone.title().as_str().to_string(),
            due_date:     milestone.due_date(),
            completed_at: milestone.completed_at(),
            completed_by: milestone.completed_by().map(|id| *id.as_uuid()),
        }
    }
}

// --- ハンドラ ---

/// POST /internal/projects
pub async fn create_project(
    State(state): State<Arc<ProjectState>>,
    Json(req): Json<CreateProjectRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = CreateProjectInput {
        name:        req.name,
        description: req.description,
        start_date:  req.start_date,
        end_date:    req.end_date,
        created_by:  UserId::from_uuid(req.created_by),
    };

    let result = state.usecase.create_project(input).await?;
    let response = ApiResponse::new(NotifiedDto::<ProjectDto>::from_result(result));

    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /internal/projects/{project_id}/members
///
/// 既にメンバーの場合は `200 OK` で `notification` が `null`。
pub async fn add_project_member(
    State(state): State<Arc<ProjectState>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<AddProjectMemberRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = AddProjectMemberInput {
        project_id: ProjectId::from_uuid(project_id),
        user_id:    UserId::from_uuid(req.user_id),
        added_by:   UserId::from_uuid(req.added_by),
    };

    let result = state.usecase.add_member(input).await?;

    Ok(Json(ApiResponse::new(
        NotifiedDto::<ProjectDto>::from_result(result),
    )))
}

/// POST /internal/projects/{project_id}/milestones
pub async fn create_milestone(
    State(state): State<Arc<ProjectState>>,
    Path(project_id): Path<Uuid>,
    Json(req): Json<CreateMilestoneRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = CreateMilestoneInput {
        project_id: ProjectId::from_uuid(project_id),
        title:      req.title,
        due_date:   req.due_date,
    };

    let milestone = state.usecase.create_milestone(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(MilestoneDto::from(&milestone))),
    ))
}

/// POST /internal/projects/{project_id}/milestones/{milestone_id}/complete
///
/// ## レスポンス
///
/// - `200 OK`: 完了したマイルストーンと通知結果
/// - `404 Not Found`: マイルストーンが存在しない、または別プロジェクトのもの
/// - `409 Conflict`: 完了済み
pub async fn complete_milestone(
    State(state): State<Arc<ProjectState>>,
    Path(path): Path<MilestonePath>,
    Json(req): Json<CompleteMilestoneRequest>,
) -> Result<impl IntoResponse, CoreError> {
    let input = CompleteMilestoneInput {
        project_id:   ProjectId::from_uuid(path.project_id),
        milestone_id: MilestoneId::from_uuid(path.milestone_id),
        completed_by: UserId::from_uuid(req.completed_by),
    };

    let result = state.usecase.complete_milestone(input).await?;

    Ok(Json(ApiResponse::new(
        NotifiedDto::<MilestoneDto>::from_result(result),
    )))
}

#[cfg(test)]
mod tests {
    use axum::{
        Router,
        body::Body,
        http::{Method, Request},
        routing::post,
    };
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use teamboard_domain::user::UserRole;
    use teamboard_infra::mock::MockNotificationSender;
    use tower::ServiceExt;

    use super::*;
    use crate::test_utils::{MockRepos, make_milestone, make_project, make_user};

    fn create_test_app(repos: &MockRepos, sender: MockNotificationSender) -> Router {
        let state = Arc::new(ProjectState {
            usecase: repos.project_usecase(sender),
        });

        Router::new()
            .route("/internal/projects", post(create_project))
            .route(
                "/internal/projects/{project_id}/members",
                post(add_project_member),
            )
            .route(
                "/internal/projects/{project_id}/milestones",
                post(create_milestone),
            )
            .route(
                "/internal/projects/{project_id}/milestones/{milestone_id}/complete",
                post(complete_milestone),
            )
            .with_state(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn response_json(response: axum::http::Response<Body>) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_post_マイルストーン作成は通知なしで201が返る() {
        // Given
        let repos = MockRepos::new();
        let owner = make_user("Owner", "owner@example.com", UserRole::Manager);
        let project = make_project("Website Redesign", owner.id());
        let project_id = *project.id().as_uuid();
        repos.projects.add_project(project);
        let sender = MockNotificationSender::new();
        let sut = create_test_app(&repos, sender.clone());

        // When
        let response = sut
            .oneshot(post_json(
                &format!("/internal/projects/{project_id}/milestones"),
                json!({ "title": "Beta launch", "due_date": "2026-12-01" }),
            ))
            .await
            .unwrap();

        // Then
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response_json(response).await;
        assert_eq!(body["data"]["title"], "Beta launch");
        assert_eq!(body["data"]["due_date"], "2026-12-01");
        assert_eq!(body["data"]["completed_at"], Value::Null);
        assert_eq!(sender.call_count(), 0);
    }

    #[tokio::test]
    async fn test_post_完了済みのマイルストーンを再度完了すると409が返る() {
        // Given
        let repos = MockRepos::new();
        let owner = make_user("Owner", "owner@example.com", UserRole::Manager);
        let project = make_project("Website Redesign", owner.id());
        let milestone = make_milestone(project.id(), "Beta launch");
        let uri = format!(
            "/internal/projects/{}/milestones/{}/complete",
            project.id().as_uuid(),
            milestone.id().as_uuid()
        );
        repos.users.add_user(owner.clone());
        repos.projects.add_project(project.clone());
        repos.projects.add_project_member(project.id(), owner.id());
        repos.milestones.add_milestone(milestone);
        let sender = MockNotificationSender::new();
        let request_body = json!({ "completed_by": owner.id().as_uuid() });

        // When
        let first = create_test_app(&repos, sender.clone())
            .oneshot(post_json(&uri, request_body.clone()))
            .await
            .unwrap();
        let second = create_test_app(&repos, sender.clone())
            .oneshot(post_json(&uri, request_body))
            .await
            .unwrap();

        // Then
        assert_eq!(first.status(), StatusCode::OK);
        let body = response_json(first).await;
        assert_eq!(body["data"]["notification"]["status"], "sent");
        assert_eq!(second.status(), StatusCode::CONFLICT);
        assert_eq!(sender.sent_emails().len(), 1);
    }
}
