//! # プロジェクト
//!
//! プロジェクトとマイルストーンを定義する。
//! メンバー一覧は `project_members` テーブルで管理し、エンティティには保持しない。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{
    DomainError,
    user::UserId,
    value_objects::{MilestoneTitle, ProjectName},
};

define_uuid_id! {
    /// プロジェクト ID
    pub struct ProjectId;
}

define_uuid_id! {
    /// マイルストーン ID
    pub struct MilestoneId;
}

/// プロジェクトステータス
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
pub enum ProjectStatus {
    Planning,
    Active,
    OnHold,
    Completed,
}

impl ProjectStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Planning => "Planning",
            Self::Active => "Active",
            Self::OnHold => "On Hold",
            Self::Completed => "Completed",
        }
    }
}

/// プロジェクトエンティティ
///
/// # 不変条件
///
/// - 開始日と終了日が両方ある場合、終了日 >= 開始日
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    id:          ProjectId,
    name:        ProjectName,
    description: Option<String>,
    status:      ProjectStatus,
    start_date:  Option<NaiveDate>,
    end_date:    Option<NaiveDate>,
    created_by:  UserId,
    created_at:  DateTime<Utc>,
    updated_at:  DateTime<Utc>,
}

/// プロジェクトの新規作成パラメータ
pub struct NewProject {
    pub id:          ProjectId,
    pub name:        ProjectName,
    pub description: Option<String>,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    pub created_by:  UserId,
    pub now:         DateTime<Utc>,
}

/// プロジェクトの DB 復元パラメータ
pub struct ProjectRecord {
    pub id:          ProjectId,
    pub name:        ProjectName,
    pub description: Option<String>,
    pub status:      ProjectStatus,
    pub start_date:  Option<NaiveDate>,
    pub end_date:    Option<NaiveDate>,
    pub created_by:  UserId,
    pub created_at:  DateTime<Utc>,
    pub updated_at:  DateTime<Utc>,
}

impl Project {
    /// 新しいプロジェクトを作成する（ステータスは `Planning`）
    ///
    /// # エラー
    ///
    /// 終了日が開始日より前の場合は `DomainError::Validation`。
    pub fn new(params: NewProject) -> Result<Self, DomainError> {
        if let (Some(start), Some(end)) = (params.start_date, params.end_date)
            && end < start
        {
            return Err(DomainError::Validation(
                "終了日は開始日以降である必要があります".to_string(),
            ));
        }

        Ok(Self {
            id:          params.id,
            name:        params.name,
            description: params.description.filter(|d| !d.trim().is_empty()),
            status:      ProjectStatus::Planning,
            start_date:  params.start_date,
            end_date:    params.end_date,
            created_by:  params.created_by,
            created_at:  params.now,
            updated_at:  params.now,
        })
    }

    pub fn from_db(record: ProjectRecord) -> Self {
        Self {
            id:          record.id,
            name:        record.name,
            description: record.description,
            status:      record.status,
            start_date:  record.start_date,
            end_date:    record.end_date,
            created_by:  record.created_by,
            created_at:  record.created_at,
            updated_at:  record.updated_at,
        }
    }

    pub fn id(&self) -> &ProjectId {
        &self.id
    }

    pub fn name(&self) -> &ProjectName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> ProjectStatus {
        self.status
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// マイルストーンエンティティ
///
/// 完了は一方向（完了済みを未完了に戻す操作はない）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Milestone {
    id:           MilestoneId,
    project_id:   ProjectId,
    title:        MilestoneTitle,
    due_date:     Option<NaiveDate>,
    completed_at: Option<DateTime<Utc>>,
    completed_by: Option<UserId>,
    created_at:   DateTime<Utc>,
}

/// マイルストーンの DB 復元パラメータ
pub struct MilestoneRecord {
    pub id:           MilestoneId,
    pub project_id:   ProjectId,
    pub title:        MilestoneTitle,
    pub due_date:     Option<NaiveDate>,
    pub completed_at: Option<DateTime<Utc>>,
    pub completed_by: Option<UserId>,
    pub created_at:   DateTime<Utc>,
}

impl Milestone {
    pub fn new(
        id: MilestoneId,
        project_id: ProjectId,
        title: MilestoneTitle,
        due_date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            project_id,
            title,
            due_date,
            completed_at: None,
            completed_by: None,
            created_at: now,
        }
    }

    pub fn from_db(record: MilestoneRecord) -> Self {
        Self {
            id:           record.id,
            project_id:   record.project_id,
            title:        record.title,
            due_date:     record.due_date,
            completed_at: record.completed_at,
            completed_by: record.completed_by,
            created_at:   record.created_at,
        }
    }

    pub fn id(&self) -> &MilestoneId {
        &self.id
    }

    pub fn project_id(&self) -> &ProjectId {
        &self.project_id
    }

    pub fn title(&self) -> &MilestoneTitle {
        &self.title
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    pub fn completed_by(&self) -> Option<&UserId> {
        self.completed_by.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// マイルストーンを完了した新しいインスタンスを返す
    ///
    /// # エラー
    ///
    /// 既に完了済みの場合は `DomainError::InvalidStateTransition`。
    pub fn completed(self, completed_by: UserId, now: DateTime<Utc>) -> Result<Self, DomainError> {
        if self.is_completed() {
            return Err(DomainError::InvalidStateTransition(format!(
                "マイルストーン {} は既に完了しています",
                self.title
            )));
        }

        Ok(Self {
            completed_at: Some(now),
            completed_by: Some(completed_by),
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn new_project(start: Option<NaiveDate>, end: Option<NaiveDate>, now: DateTime<Utc>) -> NewProject {
        NewProject {
            id: ProjectId::new(),
            name: ProjectName::new("Website Redesign").unwrap(),
            description: None,
            start_date: start,
            end_date: end,
            created_by: UserId::new(),
            now,
        }
    }

    #[rstest]
    fn test_新規プロジェクトはplanningで作成される(now: DateTime<Utc>) {
        let project = Project::new(new_project(None, None, now)).unwrap();
        assert_eq!(project.status(), ProjectStatus::Planning);
    }

    #[rstest]
    fn test_終了日が開始日より前なら拒否する(now: DateTime<Utc>) {
        let start = NaiveDate::from_ymd_opt(2026, 10, 10);
        let end = NaiveDate::from_ymd_opt(2026, 10, 9);

        let result = Project::new(new_project(start, end, now));

        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[rstest]
    fn test_開始日と終了日が同日なら受け入れる(now: DateTime<Utc>) {
        let day = NaiveDate::from_ymd_opt(2026, 10, 10);
        assert!(Project::new(new_project(day, day, now)).is_ok());
    }

    #[rstest]
    fn test_マイルストーンは一度だけ完了できる(now: DateTime<Utc>) {
        let milestone = Milestone::new(
            MilestoneId::new(),
            ProjectId::new(),
            MilestoneTitle::new("Beta launch").unwrap(),
            None,
            now,
        );
        let actor = UserId::new();

        let completed = milestone.completed(actor.clone(), now).unwrap();
        assert!(completed.is_completed());
        assert_eq!(completed.completed_by(), Some(&actor));

        let again = completed.completed(actor, now);
        assert!(matches!(again, Err(DomainError::InvalidStateTransition(_))));
    }
}
