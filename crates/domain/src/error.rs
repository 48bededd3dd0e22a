//! # ドメイン層エラー定義
//!
//! ビジネスルール違反やドメイン固有の例外状態を表現するエラー型。
//!
//! ## エラーの種類と HTTP ステータスの対応
//!
//! | エラー種別 | HTTP ステータス | 用途 |
//! |-----------|----------------|------|
//! | `Validation` | 400 Bad Request | 入力値の検証失敗 |
//! | `InvalidStateTransition` | 409 Conflict | 許可されていない状態遷移 |

use thiserror::Error;

/// ドメイン層で発生するエラー
#[derive(Debug, Error)]
pub enum DomainError {
    /// バリデーションエラー
    ///
    /// 必須フィールドの未入力、文字数制限の超過、不正なフォーマットなど。
    #[error("バリデーションエラー: {0}")]
    Validation(String),

    /// 不正な状態遷移
    ///
    /// 例: 審査済みの休暇申請を再度承認する、完了済みマイルストーンを再度完了する。
    #[error("不正な状態遷移: {0}")]
    InvalidStateTransition(String),
}
