//! # 休暇申請
//!
//! 勤怠管理の休暇申請を表現する。
//!
//! ## 状態遷移
//!
//! ```text
//! Pending ─┬─→ Approved
//!          └─→ Rejected
//! ```
//!
//! 審査は一度きり。審査済みの申請を再審査する遷移は存在しない。

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::{DomainError, user::UserId};

define_uuid_id! {
    /// 休暇申請 ID
    pub struct LeaveRequestId;
}

/// 休暇種別
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
pub enum LeaveType {
    Annual,
    Sick,
    Personal,
    Unpaid,
}

impl LeaveType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Annual => "Annual Leave",
            Self::Sick => "Sick Leave",
            Self::Personal => "Personal Leave",
            Self::Unpaid => "Unpaid Leave",
        }
    }
}

/// 休暇申請ステータス
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
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

impl LeaveStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

/// 休暇申請エンティティ
///
/// # 不変条件
///
/// - `end_date >= start_date`
/// - `status` が `Pending` 以外なら `reviewed_by` と `reviewed_at` が設定済み
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    id:           LeaveRequestId,
    user_id:      UserId,
    leave_type:   LeaveType,
    start_date:   NaiveDate,
    end_date:     NaiveDate,
    reason:       Option<String>,
    status:       LeaveStatus,
    reviewed_by:  Option<UserId>,
    review_notes: Option<String>,
    reviewed_at:  Option<DateTime<Utc>>,
    created_at:   DateTime<Utc>,
    updated_at:   DateTime<Utc>,
}

/// 休暇申請の新規作成パラメータ
pub struct NewLeaveRequest {
    pub id:         LeaveRequestId,
    pub user_id:    UserId,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date:   NaiveDate,
    pub reason:     Option<String>,
    pub now:        DateTime<Utc>,
}

/// 休暇申請の DB 復元パラメータ
pub struct LeaveRequestRecord {
    pub id:           LeaveRequestId,
    pub user_id:      UserId,
    pub leave_type:   LeaveType,
    pub start_date:   NaiveDate,
    pub end_date:     NaiveDate,
    pub reason:       Option<String>,
    pub status:       LeaveStatus,
    pub reviewed_by:  Option<UserId>,
    pub review_notes: Option<String>,
    pub reviewed_at:  Option<DateTime<Utc>>,
    pub created_at:   DateTime<Utc>,
    pub updated_at:   DateTime<Utc>,
}

impl LeaveRequest {
    /// 新しい休暇申請を作成する（ステータスは `Pending`）
    pub fn new(params: NewLeaveRequest) -> Result<Self, DomainError> {
        if params.end_date < params.start_date {
            return Err(DomainError::Validation(
                "終了日は開始日以降である必要があります".to_string(),
            ));
        }

        Ok(Self {
            id:           params.id,
            user_id:      params.user_id,
            leave_type:   params.leave_type,
            start_date:   params.start_date,
            end_date:     params.end_date,
            reason:       params.reason.filter(|r| !r.trim().is_empty()),
            status:       LeaveStatus::Pending,
            reviewed_by:  None,
            review_notes: None,
            reviewed_at:  None,
            created_at:   params.now,
            updated_at:   params.now,
        })
    }

    pub fn from_db(record: LeaveRequestRecord) -> Self {
        Self {
            id:           record.id,
            user_id:      record.user_id,
            leave_type:   record.leave_type,
            start_date:   record.start_date,
            end_date:     record.end_date,
            reason:       record.reason,
            status:       record.status,
            reviewed_by:  record.reviewed_by,
            review_notes: record.review_notes,
            reviewed_at:  record.reviewed_at,
            created_at:   record.created_at,
            updated_at:   record.updated_at,
        }
    }

    // Getter メソッド

    pub fn id(&self) -> &LeaveRequestId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn leave_type(&self) -> LeaveType {
        self.leave_type
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    pub fn status(&self) -> LeaveStatus {
        self.status
    }

    pub fn reviewed_by(&self) -> Option<&UserId> {
        self.reviewed_by.as_ref()
    }

    pub fn review_notes(&self) -> Option<&str> {
        self.review_notes.as_deref()
    }

    pub fn reviewed_at(&self) -> Option<DateTime<Utc>> {
        self.reviewed_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // ビジネスロジックメソッド

    /// 休暇日数（開始日・終了日を含む暦日数）
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    pub fn is_pending(&self) -> bool {
        self.status == LeaveStatus::Pending
    }

    /// 承認した新しいインスタンスを返す
    pub fn approved(
        self,
        reviewer: UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.reviewed(LeaveStatus::Approved, reviewer, notes, now)
    }

    /// 却下した新しいインスタンスを返す
    pub fn rejected(
        self,
        reviewer: UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        self.reviewed(LeaveStatus::Rejected, reviewer, notes, now)
    }

    fn reviewed(
        self,
        status: LeaveStatus,
        reviewer: UserId,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if !self.is_pending() {
            return Err(DomainError::InvalidStateTransition(format!(
                "審査済みの休暇申請は変更できません（現在のステータス: {}）",
                self.status
            )));
        }

        Ok(Self {
            status,
            reviewed_by: Some(reviewer),
            review_notes: notes.filter(|n| !n.trim().is_empty()),
            reviewed_at: Some(now),
            updated_at: now,
            ..self
        })
    }
}
