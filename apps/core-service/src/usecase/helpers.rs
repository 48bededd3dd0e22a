//! ユースケース層の共通ヘルパー
//!
//! リポジトリ呼び出し結果の変換や通知結果のログ出力など、
//! 複数のユースケースで繰り返されるパターンを共通化する。

use teamboard_domain::notification::NotificationOutcome;
use teamboard_infra::InfraError;

use crate::error::CoreError;

/// リポジトリの `Result<Option<T>, InfraError>` を `Result<T, CoreError>` に変換する
///
/// `find_by_id` 等の `Option` を返すリポジトリメソッドの結果を、
/// `CoreError::NotFound` または `CoreError::Internal` に変換する。
///
/// ```ignore
/// let task = self.task_repo.find_by_id(&task_id).await
///     .or_not_found("タスク")?;
/// ```
pub(crate) trait FindResultExt<T> {
    /// `None` の場合は `CoreError::NotFound`、`InfraError` の場合は `CoreError::Internal` を返す
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError>;
}

impl<T> FindResultExt<T> for Result<Option<T>, InfraError> {
    fn or_not_found(self, entity_name: &str) -> Result<T, CoreError> {
        self.map_err(|e| CoreError::Internal(format!("{}の取得に失敗: {}", entity_name, e)))?
            .ok_or_else(|| CoreError::NotFound(format!("{}が見つかりません", entity_name)))
    }
}

/// 通知が失敗した場合に警告ログを出す
///
/// 業務操作自体は成功しているため、エラーにはしない。
pub(crate) fn warn_if_failed(outcome: &NotificationOutcome, action: &str) {
    if let NotificationOutcome::Failed { error } = outcome {
        tracing::warn!(action, error = %error, "通知に失敗しましたが操作は完了しています");
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_or_not_found_someの場合は値を返す() {
        let result: Result<Option<i32>, InfraError> = Ok(Some(42));

        assert_eq!(result.or_not_found("テスト").unwrap(), 42);
    }

    #[test]
    fn test_or_not_found_noneの場合はnot_foundを返す() {
        let result: Result<Option<i32>, InfraError> = Ok(None);

        let err = result.or_not_found("タスク").unwrap_err();
        assert!(matches!(err, CoreError::NotFound(msg) if msg == "タスクが見つかりません"));
    }

    #[test]
    fn test_or_not_found_エラーの場合はinternalを返す() {
        let result: Result<Option<i32>, InfraError> = Err(InfraError::unexpected("db down"));

        let err = result.or_not_found("タスク").unwrap_err();
        assert!(matches!(err, CoreError::Internal(msg) if msg.starts_with("タスクの取得に失敗")));
    }
}
