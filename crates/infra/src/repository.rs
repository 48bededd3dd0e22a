//! # リポジトリ実装
//!
//! エンティティの永続化を担当するリポジトリトレイトと PostgreSQL 実装。
//!
//! ## 設計方針
//!
//! - **トレイト + 実装**: ユースケース層はトレイト経由で利用し、テストではモックに差し替える
//! - **実行時クエリ**: `sqlx::query_as::<_, Row>` と `FromRow` で行を中間構造体に受け、
//!   `TryFrom` でドメインエンティティへ変換する

pub mod comment_repository;
pub mod leave_request_repository;
pub mod milestone_repository;
pub mod project_repository;
pub mod task_repository;
pub mod user_repository;

pub use comment_repository::{CommentRepository, PostgresCommentRepository};
pub use leave_request_repository::{LeaveRequestRepository, PostgresLeaveRequestRepository};
pub use milestone_repository::{MilestoneRepository, PostgresMilestoneRepository};
pub use project_repository::{PostgresProjectRepository, ProjectRepository};
pub use task_repository::{PostgresTaskRepository, TaskRepository};
pub use user_repository::{PostgresUserRepository, UserRepository};
