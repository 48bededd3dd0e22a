//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールを HTML/plaintext 両形式で生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: テンプレートはバイナリに埋め込まれ、
//!   壊れたテンプレートは起動時（[`TemplateRenderer::new`]）に検出される
//! - **共通レイアウト**: 各テンプレートは `base.html` / `base.txt` を継承し、
//!   ブランド名と著作権表記（年は [`Clock`] から算出）を共有する
//! - **件名パターン**: `{イベント名}: {対象名}`
//! - **未設定の値**: 任意項目が `None` の場合は `Not specified` と表示する
//! - **詳細リンク**: `{base_url}/tasks/{id}` などをテンプレートに渡す

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use teamboard_domain::{
    clock::Clock,
    leave::LeaveStatus,
    notification::{CommentTargetKind, NotificationError, NotificationPayload},
};
use tera::{Context, Tera};

use super::route::route_for;

/// ブランド名
const BRAND: &str = "Teamboard";

/// 任意項目が未設定の場合の表示
pub const NOT_SPECIFIED: &str = "Not specified";

/// レンダリング結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject:   String,
    pub html_body: String,
    pub text_body: String,
}

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、`NotificationPayload` から
/// 件名と本文を生成する。I/O を行わない。
pub struct TemplateRenderer {
    engine:   Tera,
    clock:    Arc<dyn Clock>,
    base_url: String,
}

impl TemplateRenderer {
    /// 新しいレンダラーインスタンスを作成
    ///
    /// `include_str!` で埋め込んだテンプレートを tera に登録する。
    ///
    /// # 引数
    ///
    /// - `clock`: 著作権表記の年を決める時刻プロバイダ
    /// - `base_url`: アプリケーションのベース URL（例: `http://localhost:5173`）
    pub fn new(clock: Arc<dyn Clock>, base_url: impl Into<String>) -> Result<Self, NotificationError> {
        let mut engine = Tera::default();

        engine
            .add_raw_templates(vec![
                (
                    "base.html",
                    include_str!("../../../templates/notifications/base.html"),
                ),
                (
                    "base.txt",
                    include_str!("../../../templates/notifications/base.txt"),
                ),
                (
                    "new_team_member.html",
                    include_str!("../../../templates/notifications/new_team_member.html"),
                ),
                (
                    "new_team_member.txt",
                    include_str!("../../../templates/notifications/new_team_member.txt"),
                ),
                (
                    "task_assigned.html",
                    include_str!("../../../templates/notifications/task_assigned.html"),
                ),
                (
                    "task_assigned.txt",
                    include_str!("../../../templates/notifications/task_assigned.txt"),
                ),
                (
                    "task_status_changed.html",
                    include_str!("../../../templates/notifications/task_status_changed.html"),
                ),
                (
                    "task_status_changed.txt",
                    include_str!("../../../templates/notifications/task_status_changed.txt"),
                ),
                (
                    "comment_added.html",
                    include_str!("../../../templates/notifications/comment_added.html"),
                ),
                (
                    "comment_added.txt",
                    include_str!("../../../templates/notifications/comment_added.txt"),
                ),
                (
                    "project_created.html",
                    include_str!("../../../templates/notifications/project_created.html"),
                ),
                (
                    "project_created.txt",
                    include_str!("../../../templates/notifications/project_created.txt"),
                ),
                (
                    "project_member_added.html",
                    include_str!("../../../templates/notifications/project_member_added.html"),
                ),
                (
                    "project_member_added.txt",
                    include_str!("../../../templates/notifications/project_member_added.txt"),
                ),
                (
                    "milestone_completed.html",
                    include_str!("../../../templates/notifications/milestone_completed.html"),
                ),
                (
                    "milestone_completed.txt",
                    include_str!("../../../templates/notifications/milestone_completed.txt"),
                ),
                (
                    "leave_submitted.html",
                    include_str!("../../../templates/notifications/leave_submitted.html"),
                ),
                (
                    "leave_submitted.txt",
                    include_str!("../../../templates/notifications/leave_submitted.txt"),
                ),
                (
                    "leave_status_changed.html",
                    include_str!("../../../templates/notifications/leave_status_changed.html"),
                ),
                (
                    "leave_status_changed.txt",
                    include_str!("../../../templates/notifications/leave_status_changed.txt"),
                ),
            ])
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(Self {
            engine,
            clock,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// ペイロードから件名と本文を生成する
    pub fn render(&self, payload: &NotificationPayload) -> Result<RenderedEmail, NotificationError> {
        let template_name = route_for(payload.event_type()).template;
        let (subject, context) = self.build_template_params(payload);

        let html_body = self
            .engine
            .render(&format!("{template_name}.html"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        let text_body = self
            .engine
            .render(&format!("{template_name}.txt"), &context)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        Ok(RenderedEmail {
            subject,
            html_body,
            text_body,
        })
    }

    /// 件名とコンテキストを構築する
    fn build_template_params(&self, payload: &NotificationPayload) -> (String, Context) {
        let mut context = Context::new();
        context.insert("brand", BRAND);
        context.insert("year", &self.clock.now().year());

        let (subject, action_url) = match payload {
            NotificationPayload::NewTeamMember {
                member_id,
                member_name,
                email,
                role,
                department,
            } => {
                context.insert("member_name", member_name);
                context.insert("email", email);
                context.insert("role", role);
                context.insert("department", or_not_specified(department.as_deref()));
                (
                    format!("New Team Member: {member_name}"),
                    self.link("team", member_id),
                )
            }
            NotificationPayload::TaskAssigned {
                task,
                assignee_name,
                assigned_by_name,
                project_name,
            } => {
                context.insert("task_title", &task.title);
                context.insert(
                    "task_description",
                    or_not_specified(task.description.as_deref()),
                );
                context.insert("task_priority", task.priority.label());
                context.insert("task_status", task.status.label());
                context.insert("due_date", &format_date(task.due_date));
                context.insert("assignee_name", or_not_specified(assignee_name.as_deref()));
                context.insert(
                    "assigned_by_name",
                    or_not_specified(assigned_by_name.as_deref()),
                );
                context.insert("project_name", or_not_specified(project_name.as_deref()));
                (
                    format!("Task Assigned: {}", task.title),
                    self.link("tasks", &task.id),
                )
            }
            NotificationPayload::TaskStatusChanged {
                task,
                previous_status,
                changed_by_name,
                project_name,
            } => {
                context.insert("task_title", &task.title);
                context.insert("task_priority", task.priority.label());
                context.insert("previous_status", previous_status.label());
                context.insert("new_status", task.status.label());
                context.insert("due_date", &format_date(task.due_date));
                context.insert(
                    "changed_by_name",
                    or_not_specified(changed_by_name.as_deref()),
                );
                context.insert("project_name", or_not_specified(project_name.as_deref()));
                (
                    format!("Task Status Changed: {}", task.title),
                    self.link("tasks", &task.id),
                )
            }
            NotificationPayload::CommentAdded {
                target_kind,
                target_id,
                target_name,
                author_name,
                body,
                project_name,
            } => {
                context.insert("target_kind", &target_kind.to_string());
                context.insert("target_name", target_name);
                context.insert("author_name", or_not_specified(author_name.as_deref()));
                context.insert("body", body);
                context.insert("project_name", or_not_specified(project_name.as_deref()));
                let segment = match target_kind {
                    CommentTargetKind::Task => "tasks",
                    CommentTargetKind::Project => "projects",
                };
                (
                    format!("New Comment: {target_name}"),
                    self.link(segment, target_id),
                )
            }
            NotificationPayload::ProjectCreated {
                project,
                created_by_name,
            } => {
                context.insert("project_name", &project.name);
                context.insert(
                    "project_description",
                    or_not_specified(project.description.as_deref()),
                );
                context.insert("project_status", project.status.label());
                context.insert("start_date", &format_date(project.start_date));
                context.insert("end_date", &format_date(project.end_date));
                context.insert(
                    "created_by_name",
                    or_not_specified(created_by_name.as_deref()),
                );
                (
                    format!("Project Created: {}", project.name),
                    self.link("projects", &project.id),
                )
            }
            NotificationPayload::ProjectMemberAdded {
                project,
                member_name,
                added_by_name,
            } => {
                context.insert("project_name", &project.name);
                context.insert(
                    "project_description",
                    or_not_specified(project.description.as_deref()),
                );
                context.insert("member_name", member_name);
                context.insert("added_by_name", or_not_specified(added_by_name.as_deref()));
                (
                    format!("Added to Project: {}", project.name),
                    self.link("projects", &project.id),
                )
            }
            NotificationPayload::MilestoneCompleted {
                project_id,
                project_name,
                milestone_title,
                due_date,
                completed_by_name,
            } => {
                context.insert("project_name", project_name);
                context.insert("milestone_title", milestone_title);
                context.insert("due_date", &format_date(*due_date));
                context.insert(
                    "completed_by_name",
                    or_not_specified(completed_by_name.as_deref()),
                );
                (
                    format!("Milestone Completed: {milestone_title}"),
                    self.link("projects", project_id),
                )
            }
            NotificationPayload::LeaveSubmitted { leave, user_name } => {
                context.insert("user_name", user_name);
                context.insert("leave_type", leave.leave_type.label());
                context.insert("start_date", &format_date(Some(leave.start_date)));
                context.insert("end_date", &format_date(Some(leave.end_date)));
                context.insert("days", &leave.days);
                context.insert("reason", or_not_specified(leave.reason.as_deref()));
                (
                    format!("Leave Request Submitted: {user_name}"),
                    self.link("leave-requests", &leave.id),
                )
            }
            NotificationPayload::LeaveStatusChanged {
                leave,
                user_name,
                reviewer_name,
            } => {
                context.insert("user_name", user_name);
                context.insert("leave_type", leave.leave_type.label());
                context.insert("start_date", &format_date(Some(leave.start_date)));
                context.insert("end_date", &format_date(Some(leave.end_date)));
                context.insert("days", &leave.days);
                context.insert("status", leave.status.label());
                context.insert("approved", &(leave.status == LeaveStatus::Approved));
                context.insert(
                    "review_notes",
                    or_not_specified(leave.review_notes.as_deref()),
                );
                context.insert("reviewer_name", or_not_specified(reviewer_name.as_deref()));
                (
                    format!("Leave Request {}: {user_name}", leave.status.label()),
                    self.link("leave-requests", &leave.id),
                )
            }
        };

        context.insert("subject", &subject);
        context.insert("action_url", &action_url);
        (subject, context)
    }

    fn link(&self, segment: &str, id: &impl std::fmt::Display) -> String {
        format!("{}/{segment}/{id}", self.base_url)
    }
}

fn or_not_specified(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => NOT_SPECIFIED,
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_SPECIFIED.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use teamboard_domain::{
        clock::FixedClock,
        leave::{LeaveRequestId, LeaveType},
        notification::{LeaveSummary, ProjectSummary, TaskSummary},
        project::{ProjectId, ProjectStatus},
        task::{TaskId, TaskPriority, TaskStatus},
        user::UserId,
    };

    use super::*;

    fn make_renderer() -> TemplateRenderer {
        let clock = FixedClock::new(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        TemplateRenderer::new(Arc::new(clock), "http://localhost:5173/").unwrap()
    }

    fn task_summary() -> TaskSummary {
        TaskSummary {
            id:          TaskId::new(),
            title:       "Design review".to_string(),
            description: None,
            status:      TaskStatus::InProgress,
            priority:    TaskPriority::High,
            due_date:    NaiveDate::from_ymd_opt(2026, 3, 31),
        }
    }

    fn project_summary() -> ProjectSummary {
        ProjectSummary {
            id:          ProjectId::new(),
            name:        "Website Renewal".to_string(),
            description: Some("Rebuild the corporate site".to_string()),
            status:      ProjectStatus::Planning,
            start_date:  None,
            end_date:    None,
        }
    }

    fn leave_summary(status: LeaveStatus) -> LeaveSummary {
        LeaveSummary {
            id: LeaveRequestId::new(),
            leave_type: LeaveType::Annual,
            start_date: NaiveDate::from_ymd_opt(2026, 8, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 8, 12).unwrap(),
            days: 3,
            reason: None,
            status,
            review_notes: None,
        }
    }

    fn task_assigned() -> NotificationPayload {
        NotificationPayload::TaskAssigned {
            task:             task_summary(),
            assignee_name:    Some("Hanako Suzuki".to_string()),
            assigned_by_name: Some("Taro Tanaka".to_string()),
            project_name:     None,
        }
    }

    #[test]
    fn test_task_assignedの件名はタスク名を含む() {
        let renderer = make_renderer();

        let rendered = renderer.render(&task_assigned()).unwrap();

        assert_eq!(rendered.subject, "Task Assigned: Design review");
        assert!(rendered.html_body.contains("Hanako Suzuki"));
        assert!(rendered.text_body.contains("Taro Tanaka"));
    }

    #[test]
    fn test_同じペイロードと固定時刻なら出力は同一() {
        let renderer = make_renderer();
        let payload = task_assigned();

        let first = renderer.render(&payload).unwrap();
        let second = renderer.render(&payload).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_未設定の任意項目はnot_specifiedと表示する() {
        let renderer = make_renderer();

        let rendered = renderer.render(&task_assigned()).unwrap();

        // description と project_name が None
        let line = |label: &str| {
            rendered
                .text_body
                .lines()
                .find(|l| l.starts_with(label))
                .map(|l| l[label.len()..].trim().to_string())
        };
        assert_eq!(line("Description:").as_deref(), Some(NOT_SPECIFIED));
        assert_eq!(line("Project:").as_deref(), Some(NOT_SPECIFIED));
    }

    #[test]
    fn test_共通レイアウトにブランド名と時計の年が入る() {
        let renderer = make_renderer();

        let rendered = renderer.render(&task_assigned()).unwrap();

        // 1_700_000_000 は 2023-11-14
        assert!(rendered.html_body.contains("&copy; 2023 Teamboard"));
        assert!(rendered.text_body.contains("© 2023 Teamboard"));
    }

    #[test]
    fn test_詳細リンクはbase_urlとidから組み立てる() {
        let renderer = make_renderer();
        let task = task_summary();
        let expected = format!("http://localhost:5173/tasks/{}", task.id);
        let payload = NotificationPayload::TaskAssigned {
            task,
            assignee_name: None,
            assigned_by_name: None,
            project_name: None,
        };

        let rendered = renderer.render(&payload).unwrap();

        assert!(rendered.html_body.contains(&expected));
        assert!(rendered.text_body.contains(&expected));
    }

    #[test]
    fn test_htmlは自動エスケープされる() {
        let renderer = make_renderer();
        let payload = NotificationPayload::CommentAdded {
            target_kind:  CommentTargetKind::Task,
            target_id:    TaskId::new().to_string(),
            target_name:  "Design review".to_string(),
            author_name:  Some("Taro".to_string()),
            body:         "<script>alert(1)</script>".to_string(),
            project_name: None,
        };

        let rendered = renderer.render(&payload).unwrap();

        assert!(!rendered.html_body.contains("<script>"));
        assert!(rendered.html_body.contains("&lt;script&gt;"));
        assert!(rendered.text_body.contains("<script>alert(1)</script>"));
    }

    #[rstest]
    #[case(
        NotificationPayload::NewTeamMember {
            member_id: UserId::new(),
            member_name: "Jiro Sato".to_string(),
            email: "jiro@example.com".to_string(),
            role: "member".to_string(),
            department: None,
        },
        "New Team Member: Jiro Sato"
    )]
    #[case(
        NotificationPayload::TaskStatusChanged {
            task: task_summary(),
            previous_status: TaskStatus::Todo,
            changed_by_name: None,
            project_name: Some("Website Renewal".to_string()),
        },
        "Task Status Changed: Design review"
    )]
    #[case(
        NotificationPayload::ProjectCreated { project: project_summary(), created_by_name: None },
        "Project Created: Website Renewal"
    )]
    #[case(
        NotificationPayload::ProjectMemberAdded {
            project: project_summary(),
            member_name: "Jiro Sato".to_string(),
            added_by_name: None,
        },
        "Added to Project: Website Renewal"
    )]
    #[case(
        NotificationPayload::MilestoneCompleted {
            project_id: ProjectId::new(),
            project_name: "Website Renewal".to_string(),
            milestone_title: "Beta launch".to_string(),
            due_date: None,
            completed_by_name: None,
        },
        "Milestone Completed: Beta launch"
    )]
    #[case(
        NotificationPayload::LeaveSubmitted {
            leave: leave_summary(LeaveStatus::Pending),
            user_name: "Hanako Suzuki".to_string(),
        },
        "Leave Request Submitted: Hanako Suzuki"
    )]
    #[case(
        NotificationPayload::LeaveStatusChanged {
            leave: leave_summary(LeaveStatus::Approved),
            user_name: "Hanako Suzuki".to_string(),
            reviewer_name: Some("Manager".to_string()),
        },
        "Leave Request Approved: Hanako Suzuki"
    )]
    #[case(
        NotificationPayload::LeaveStatusChanged {
            leave: leave_summary(LeaveStatus::Rejected),
            user_name: "Hanako Suzuki".to_string(),
            reviewer_name: None,
        },
        "Leave Request Rejected: Hanako Suzuki"
    )]
    fn test_イベントごとの件名(#[case] payload: NotificationPayload, #[case] expected: &str) {
        let renderer = make_renderer();

        let rendered = renderer.render(&payload).unwrap();

        assert_eq!(rendered.subject, expected);
        assert!(!rendered.html_body.is_empty());
        assert!(!rendered.text_body.is_empty());
    }

    #[test]
    fn test_休暇申請の日付はiso形式で表示する() {
        let renderer = make_renderer();
        let payload = NotificationPayload::LeaveSubmitted {
            leave:     leave_summary(LeaveStatus::Pending),
            user_name: "Hanako Suzuki".to_string(),
        };

        let rendered = renderer.render(&payload).unwrap();

        assert!(rendered.text_body.contains("2026-08-10"));
        assert!(rendered.text_body.contains("2026-08-12"));
        assert!(rendered.text_body.contains("Annual Leave"));
    }
}
