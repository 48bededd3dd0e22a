//! # コメント
//!
//! タスクまたはプロジェクトに投稿されるコメントと絵文字リアクション。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{project::ProjectId, task::TaskId, user::UserId, value_objects::CommentBody};

define_uuid_id! {
    /// コメント ID
    pub struct CommentId;
}

/// コメントの投稿先
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum CommentTarget {
    Task(TaskId),
    Project(ProjectId),
}

impl CommentTarget {
    /// DB の `target_type` カラムに格納する値
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Task(_) => "task",
            Self::Project(_) => "project",
        }
    }

    pub fn as_uuid(&self) -> &uuid::Uuid {
        match self {
            Self::Task(id) => id.as_uuid(),
            Self::Project(id) => id.as_uuid(),
        }
    }
}

/// 絵文字リアクション（絵文字ごとの集計値）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    pub emoji: String,
    pub count: i32,
}

/// コメントエンティティ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    id:         CommentId,
    target:     CommentTarget,
    author_id:  UserId,
    body:       CommentBody,
    reactions:  Vec<Reaction>,
    created_at: DateTime<Utc>,
}

/// コメントの DB 復元パラメータ
pub struct CommentRecord {
    pub id:         CommentId,
    pub target:     CommentTarget,
    pub author_id:  UserId,
    pub body:       CommentBody,
    pub reactions:  Vec<Reaction>,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    pub fn new(
        id: CommentId,
        target: CommentTarget,
        author_id: UserId,
        body: CommentBody,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            target,
            author_id,
            body,
            reactions: Vec::new(),
            created_at: now,
        }
    }

    pub fn from_db(record: CommentRecord) -> Self {
        Self {
            id:         record.id,
            target:     record.target,
            author_id:  record.author_id,
            body:       record.body,
            reactions:  record.reactions,
            created_at: record.created_at,
        }
    }

    pub fn id(&self) -> &CommentId {
        &self.id
    }

    pub fn target(&self) -> &CommentTarget {
        &self.target
    }

    pub fn author_id(&self) -> &UserId {
        &self.author_id
    }

    pub fn body(&self) -> &CommentBody {
        &self.body
    }

    pub fn reactions(&self) -> &[Reaction] {
        &self.reactions
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
