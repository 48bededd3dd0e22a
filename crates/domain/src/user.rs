//! # ユーザー（チームメンバー）
//!
//! チームメンバーのエンティティと関連する値オブジェクトを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 備考 |
//! |---|------------|------|
//! | [`User`] | チームメンバー | 管理者操作で作成される。通知処理からは参照のみ |
//! | [`UserRole`] | ロール | 通知の宛先解決（管理者全員、マネージャー全員）に使用 |
//! | [`UserStatus`] | ステータス | `Inactive` のユーザーはロール単位の宛先解決から除外 |
//!
//! ## 使用例
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use teamboard_domain::{
//!     user::{Email, NewUser, User, UserId, UserRole},
//!     value_objects::UserName,
//! };
//!
//! let user = User::new(NewUser {
//!     id:         UserId::new(),
//!     name:       UserName::new("Alice Johnson")?,
//!     email:      Email::new("alice@example.com")?,
//!     role:       UserRole::Manager,
//!     department: Some("Engineering".to_string()),
//!     now:        chrono::Utc::now(),
//! });
//!
//! assert!(user.is_active());
//! # Ok(())
//! # }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, value_objects::UserName};

define_uuid_id! {
    /// ユーザー ID（一意識別子）
    pub struct UserId;
}

/// メールアドレス（値オブジェクト）
///
/// 生成時にバリデーションを実行し、不正な値の作成を防ぐ。
/// 宛先の重複排除は [`Email::normalized`] で大文字小文字を無視して比較する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// メールアドレスを作成する
    ///
    /// # バリデーション
    ///
    /// - 空文字列ではない（前後の空白は除去）
    /// - `local@domain` の形式（空白を含まない）
    /// - ドメインのラベルが空でない（`example..com` や `.com` は不可）
    /// - 最大 255 文字
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into().trim().to_string();

        if value.is_empty() {
            return Err(DomainError::Validation(
                "メールアドレスは必須です".to_string(),
            ));
        }

        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        };

        if local.is_empty()
            || domain.is_empty()
            || domain.contains('@')
            || value.chars().any(char::is_whitespace)
            || domain.split('.').any(str::is_empty)
        {
            return Err(DomainError::Validation(
                "メールアドレスの形式が不正です".to_string(),
            ));
        }

        if value.len() > 255 {
            return Err(DomainError::Validation(
                "メールアドレスは255文字以内である必要があります".to_string(),
            ));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// 比較用に小文字化したアドレスを返す
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ユーザーロール
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserRole {
    /// 管理者（新規メンバー・新規プロジェクト・タスク状態変更の通知を受け取る）
    Admin,
    /// マネージャー（休暇申請の通知を受け取る）
    Manager,
    /// 一般メンバー
    Member,
}

/// ユーザーステータス
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum UserStatus {
    Active,
    Inactive,
}

/// ユーザーエンティティ
///
/// # 不変条件
///
/// - `email` はシステム内で一意（DB の UNIQUE 制約）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id:         UserId,
    name:       UserName,
    email:      Email,
    role:       UserRole,
    department: Option<String>,
    status:     UserStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// ユーザーの新規作成パラメータ
pub struct NewUser {
    pub id:         UserId,
    pub name:       UserName,
    pub email:      Email,
    pub role:       UserRole,
    pub department: Option<String>,
    pub now:        DateTime<Utc>,
}

/// ユーザーの DB 復元パラメータ
pub struct UserRecord {
    pub id:         UserId,
    pub name:       UserName,
    pub email:      Email,
    pub role:       UserRole,
    pub department: Option<String>,
    pub status:     UserStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// 新しいユーザーを作成する
    ///
    /// 作成時のステータスは `Active`。
    pub fn new(params: NewUser) -> Self {
        Self {
            id:         params.id,
            name:       params.name,
            email:      params.email,
            role:       params.role,
            department: params
                .department
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty()),
            status:     UserStatus::Active,
            created_at: params.now,
            updated_at: params.now,
        }
    }

    /// 既存のデータから復元する
    pub fn from_db(record: UserRecord) -> Self {
        Self {
            id:         record.id,
            name:       record.name,
            email:      record.email,
            role:       record.role,
            department: record.department,
            status:     record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn name(&self) -> &UserName {
        &self.name
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn role(&self) -> UserRole {
        self.role
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn status(&self) -> UserStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn test_メールアドレスは正常な形式を受け入れる() {
        assert!(Email::new("user@example.com").is_ok());
    }

    #[rstest]
    #[case("", "空文字列")]
    #[case("no-at-sign", "@記号なし")]
    #[case("@example.com", "ローカル部分が空")]
    #[case("user@", "ドメイン部分が空")]
    #[case("a@b@c", "@が複数")]
    #[case("bad admin@example.com", "空白を含む")]
    #[case("admin@exa mple.com", "ドメインに空白を含む")]
    #[case("admin@example..com", "ドメインのラベルが空")]
    #[case("admin@.example.com", "ドメインが.で始まる")]
    #[case(&format!("{}@example.com", "a".repeat(256)), "255文字超過")]
    fn test_メールアドレスは不正な形式を拒否する(
        #[case] input: &str,
        #[case] _reason: &str,
    ) {
        assert!(Email::new(input).is_err());
    }

    #[test]
    fn test_normalizedは小文字化したアドレスを返す() {
        let email = Email::new("Alice.Johnson@Example.COM").unwrap();
        assert_eq!(email.normalized(), "alice.johnson@example.com");
        assert_eq!(email.as_str(), "Alice.Johnson@Example.COM");
    }

    #[rstest]
    #[case(UserRole::Admin, "admin")]
    #[case(UserRole::Manager, "manager")]
    #[case(UserRole::Member, "member")]
    fn test_ロールの文字列変換が往復する(#[case] role: UserRole, #[case] s: &str) {
        assert_eq!(role.to_string(), s);
        assert_eq!(UserRole::from_str(s).unwrap(), role);
    }

    #[rstest]
    fn test_新規ユーザーはアクティブ状態で空の部署はnoneになる(now: DateTime<Utc>) {
        let user = User::new(NewUser {
            id: UserId::new(),
            name: UserName::new("Bob Smith").unwrap(),
            email: Email::new("bob@example.com").unwrap(),
            role: UserRole::Admin,
            department: Some("  ".to_string()),
            now,
        });

        assert!(user.is_active());
        assert!(user.is_admin());
        assert_eq!(user.department(), None);
        assert_eq!(user.created_at(), now);
    }
}
