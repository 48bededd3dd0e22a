//! # Teamboard ドメイン層
//!
//! タスクボード・プロジェクト・休暇申請・コメントと、それらに伴うメール通知の
//! ドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **エンティティ**: 一意の識別子を持つオブジェクト（例: Task, Project）
//! - **値オブジェクト**: 識別子を持たない不変オブジェクト（例: Email, TaskTitle）
//! - **ドメインエラー**: ビジネスルール違反を表現するエラー型
//!
//! ## 依存関係の方向
//!
//! ```text
//! core-service → infra → domain
//! ```
//!
//! ドメイン層はインフラ層（DB、SMTP）に一切依存しない。
//!
//! ## モジュール構成
//!
//! - [`user`] - チームメンバー（ユーザー）とロール
//! - [`task`] - タスクとステータス・優先度
//! - [`project`] - プロジェクトとマイルストーン
//! - [`leave`] - 休暇申請と承認フロー
//! - [`comment`] - タスク/プロジェクトへのコメント
//! - [`notification`] - 通知イベント・ペイロード・送信結果
//! - [`clock`] - 時刻プロバイダ
//!
//! ## 使用例
//!
//! ```rust
//! use teamboard_domain::{DomainError, value_objects::UserName};
//!
//! let result = UserName::new("   ");
//!
//! assert!(matches!(result, Err(DomainError::Validation(_))));
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod comment;
pub mod error;
pub mod leave;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;
pub mod value_objects;

pub use error::DomainError;
