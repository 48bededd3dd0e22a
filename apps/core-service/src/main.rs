//! # Core Service サーバー
//!
//! チーム業務（メンバー・タスク・プロジェクト・休暇申請）の操作を受け付け、
//! 操作の成功後に関係者へメール通知を送る内部サービス。
//!
//! ## 通知の流れ
//!
//! ```text
//! ハンドラ → ユースケース（データ変更）
//!                 ↓ 成功後
//!          NotificationService
//!            ├─ ContextLoader      対象エンティティと関係者を取得
//!            ├─ RecipientResolver  宛先の決定と重複排除
//!            ├─ TemplateRenderer   件名・HTML・テキスト本文の生成
//!            └─ NotificationSender SMTP / Noop
//! ```
//!
//! ## 環境変数
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `CORE_HOST` | No | バインドアドレス（デフォルト: `0.0.0.0`） |
//! | `CORE_PORT` | **Yes** | ポート番号 |
//! | `DATABASE_URL` | **Yes** | PostgreSQL 接続 URL |
//! | `APP_ENV` | No | 実行環境（デフォルト: `development`） |
//! | `NOTIFICATION_BACKEND` | No | `smtp` / `noop`（本番は `smtp`、それ以外は `noop`） |
//! | `SMTP_HOST` / `SMTP_PORT` | No | SMTP サーバー（デフォルト: `localhost:1025`） |
//! | `NOTIFICATION_BASE_URL` | No | メール内リンクのベース URL |
//! | `LOG_FORMAT` | No | `json` / `pretty` |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit などローカル SMTP に送る場合）
//! NOTIFICATION_BACKEND=smtp cargo run -p teamboard-core-service
//!
//! # 本番環境
//! APP_ENV=production CORE_PORT=3001 DATABASE_URL=postgres://... cargo run -p teamboard-core-service --release
//! ```

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context as _;
use axum::{
    Router,
    routing::{get, post},
};
use teamboard_core_service::{
    config::CoreConfig,
    handler::{
        CommentState,
        LeaveState,
        ProjectState,
        ReadinessState,
        TaskState,
        TeamMemberState,
        add_project_member,
        approve_leave,
        assign_task,
        change_task_status,
        complete_milestone,
        create_milestone,
        create_project,
        create_task,
        create_team_member,
        health_check,
        post_comment,
        readiness_check,
        reject_leave,
        submit_leave,
    },
    usecase::{
        CommentUseCaseImpl,
        LeaveUseCaseImpl,
        ProjectUseCaseImpl,
        TaskUseCaseImpl,
        TeamMemberUseCaseImpl,
        notification::{
            ContextLoader,
            NotificationService,
            RecipientResolver,
            TemplateRenderer,
            build_notification_sender,
        },
    },
};
use teamboard_domain::clock::{Clock, SystemClock};
use teamboard_infra::{
    db,
    repository::{
        CommentRepository,
        LeaveRequestRepository,
        MilestoneRepository,
        PostgresCommentRepository,
        PostgresLeaveRequestRepository,
        PostgresMilestoneRepository,
        PostgresProjectRepository,
        PostgresTaskRepository,
        PostgresUserRepository,
        ProjectRepository,
        TaskRepository,
        UserRepository,
    },
};
use teamboard_shared::observability::{TracingConfig, init_tracing};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Core Service サーバーのエントリーポイント
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    init_tracing(TracingConfig::from_env("core-service"));

    let config = CoreConfig::from_env().context("設定の読み込みに失敗しました")?;

    tracing::info!(
        app_env = %config.app_env,
        notification.backend = %config.notification.backend,
        "Core Service サーバーを起動します: {}:{}",
        config.host,
        config.port
    );

    // データベース接続プールを作成
    let pool = db::create_pool(&config.database_url)
        .await
        .context("データベース接続に失敗しました")?;
    db::run_migrations(&pool)
        .await
        .context("マイグレーションの適用に失敗しました")?;
    tracing::info!("データベースに接続しました");

    // リポジトリ
    let user_repo: Arc<dyn UserRepository> = Arc::new(PostgresUserRepository::new(pool.clone()));
    let task_repo: Arc<dyn TaskRepository> = Arc::new(PostgresTaskRepository::new(pool.clone()));
    let project_repo: Arc<dyn ProjectRepository> =
        Arc::new(PostgresProjectRepository::new(pool.clone()));
    let milestone_repo: Arc<dyn MilestoneRepository> =
        Arc::new(PostgresMilestoneRepository::new(pool.clone()));
    let leave_repo: Arc<dyn LeaveRequestRepository> =
        Arc::new(PostgresLeaveRequestRepository::new(pool.clone()));
    let comment_repo: Arc<dyn CommentRepository> =
        Arc::new(PostgresCommentRepository::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 通知サービス（送信実装は起動時に一度だけ選択する）
    let sender = build_notification_sender(&config.notification)
        .context("通知送信の初期化に失敗しました")?;
    let renderer = TemplateRenderer::new(clock.clone(), config.notification.base_url.clone())
        .context("メールテンプレートの読み込みに失敗しました")?;
    let loader = ContextLoader::new(
        user_repo.clone(),
        task_repo.clone(),
        project_repo.clone(),
        milestone_repo.clone(),
        leave_repo.clone(),
        comment_repo.clone(),
    );
    let resolver = RecipientResolver::new(user_repo.clone());
    let notification = Arc::new(NotificationService::new(sender, renderer, loader, resolver));

    // ユースケースと State
    let team_member_state = Arc::new(TeamMemberState {
        usecase: TeamMemberUseCaseImpl::new(
            user_repo.clone(),
            notification.clone(),
            clock.clone(),
        ),
    });
    let task_state = Arc::new(TaskState {
        usecase: TaskUseCaseImpl::new(
            task_repo.clone(),
            user_repo.clone(),
            project_repo.clone(),
            notification.clone(),
            clock.clone(),
        ),
    });
    let comment_state = Arc::new(CommentState {
        usecase: CommentUseCaseImpl::new(
            comment_repo,
            task_repo,
            project_repo.clone(),
            notification.clone(),
            clock.clone(),
        ),
    });
    let project_state = Arc::new(ProjectState {
        usecase: ProjectUseCaseImpl::new(
            project_repo,
            milestone_repo,
            user_repo.clone(),
            notification.clone(),
            clock.clone(),
        ),
    });
    let leave_state = Arc::new(LeaveState {
        usecase: LeaveUseCaseImpl::new(leave_repo, user_repo, notification, clock),
    });
    let readiness_state = Arc::new(ReadinessState { pool });

    // ルーター構築
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/health/ready", get(readiness_check))
        .with_state(readiness_state)
        // チームメンバー API
        .route("/internal/team-members", post(create_team_member))
        .with_state(team_member_state)
        // タスク API
        .route("/internal/tasks", post(create_task))
        .route("/internal/tasks/{task_id}/assign", post(assign_task))
        .route("/internal/tasks/{task_id}/status", post(change_task_status))
        .with_state(task_state)
        // コメント API
        .route("/internal/comments", post(post_comment))
        .with_state(comment_state)
        // プロジェクト API
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
        .with_state(project_state)
        // 休暇申請 API
        .route("/internal/leave-requests", post(submit_leave))
        .route(
            "/internal/leave-requests/{leave_request_id}/approve",
            post(approve_leave),
        )
        .route(
            "/internal/leave-requests/{leave_request_id}/reject",
            post(reject_leave),
        )
        .with_state(leave_state)
        .layer(TraceLayer::new_for_http());

    // サーバー起動
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("アドレスのパースに失敗しました")?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Core Service サーバーが起動しました: {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
