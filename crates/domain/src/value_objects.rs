//! # 値オブジェクト
//!
//! 複数のエンティティで共有されるバリデーション付き文字列型。

define_validated_string! {
    /// ユーザー表示名（PII）
    pub struct UserName {
        label: "ユーザー名",
        max_length: 100,
        pii: true,
    }
}

define_validated_string! {
    /// タスクタイトル
    pub struct TaskTitle {
        label: "タスクタイトル",
        max_length: 200,
    }
}

define_validated_string! {
    /// プロジェクト名
    pub struct ProjectName {
        label: "プロジェクト名",
        max_length: 200,
    }
}

define_validated_string! {
    /// マイルストーン名
    pub struct MilestoneTitle {
        label: "マイルストーン名",
        max_length: 200,
    }
}

define_validated_string! {
    /// コメント本文
    pub struct CommentBody {
        label: "コメント本文",
        max_length: 2000,
    }
}
