//! # コメントユースケース
//!
//! タスク・プロジェクトへのコメント投稿と `comment_added` 通知。

use std::sync::Arc;

use teamboard_domain::{
    clock::Clock,
    comment::{Comment, CommentId, CommentTarget},
    user::UserId,
    value_objects::CommentBody,
};
use teamboard_infra::repository::{CommentRepository, ProjectRepository, TaskRepository};
use teamboard_shared::{event_log::event, log_business_event};

use super::{
    WithNotification,
    helpers::{FindResultExt, warn_if_failed},
    notification::NotificationService,
};
use crate::error::CoreError;

/// コメント投稿の入力
pub struct PostCommentInput {
    pub target:    CommentTarget,
    pub author_id: UserId,
    pub body:      String,
}

pub struct CommentUseCaseImpl {
    comment_repo: Arc<dyn CommentRepository>,
    task_repo:    Arc<dyn TaskRepository>,
    project_repo: Arc<dyn ProjectRepository>,
    notification: Arc<NotificationService>,
    clock:        Arc<dyn Clock>,
}

impl CommentUseCaseImpl {
    pub fn new(
        comment_repo: Arc<dyn CommentRepository>,
        task_repo: Arc<dyn TaskRepository>,
        project_repo: Arc<dyn ProjectRepository>,
        notification: Arc<NotificationService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            comment_repo,
            task_repo,
            project_repo,
            notification,
            clock,
        }
    }

    /// コメントを投稿する
    ///
    /// 投稿先のタスク・プロジェクトが存在しない場合は `CoreError::NotFound`。
    pub async fn post_comment(
        &self,
        input: PostCommentInput,
    ) -> Result<WithNotification<Comment>, CoreError> {
        let body = CommentBody::new(input.body)?;

        match &input.target {
            CommentTarget::Task(task_id) => {
                self.task_repo
                    .find_by_id(task_id)
                    .await
                    .or_not_found("タスク")?;
            }
            CommentTarget::Project(project_id) => {
                self.project_repo
                    .find_by_id(project_id)
                    .await
                    .or_not_found("プロジェクト")?;
            }
        }

        let comment = Comment::new(
            CommentId::new(),
            input.target,
            input.author_id,
            body,
            self.clock.now(),
        );
        self.comment_repo.insert(&comment).await?;

        log_business_event!(
            event.category = event::category::TASK,
            event.action = event::action::COMMENT_POSTED,
            event.entity_type = event::entity_type::COMMENT,
            event.entity_id = %comment.id(),
            event.actor_id = %comment.author_id(),
            event.result = event::result::SUCCESS,
            comment.target_type = comment.target().kind(),
            "コメントを投稿"
        );

        let outcome = self.notification.notify_comment_added(comment.id()).await;
        warn_if_failed(&outcome, event::action::COMMENT_POSTED);

        Ok(WithNotification::notified(comment, outcome))
    }
}
