//! 業務操作から通知送信までの統合テスト
//!
//! ユースケースをモックリポジトリと記録用の送信モックで組み立て、
//! 操作の結果・送信されたメール・保存状態をまとめて検証する。

mod helpers;

use helpers::TeamFixture;
use pretty_assertions::assert_eq;
use teamboard_core_service::{
    test_utils::{make_leave_request, make_milestone, make_task},
    usecase::{
        AddProjectMemberInput,
        ChangeTaskStatusInput,
        CompleteMilestoneInput,
        CreateProjectInput,
        CreateTeamMemberInput,
        PostCommentInput,
        ReviewLeaveInput,
    },
};
use teamboard_domain::{
    comment::CommentTarget,
    leave::LeaveStatus,
    notification::NotificationOutcome,
    task::TaskStatus,
    user::UserRole,
};
use teamboard_infra::{
    mock::MockNotificationSender,
    repository::{LeaveRequestRepository, TaskRepository},
};

fn recipients_of(outcome: &Option<NotificationOutcome>) -> Vec<String> {
    match outcome {
        Some(NotificationOutcome::Sent { recipients, .. }) => recipients.clone(),
        other => panic!("Sent を期待したが {other:?}"),
    }
}

#[tokio::test]
async fn test_ステータス変更で管理者兼メンバーには1通だけ届く() {
    // Arrange
    let team = TeamFixture::new();
    let task = make_task(
        "Migrate CI pipeline",
        Some(team.alice.id()),
        Some(team.project.id()),
        team.manager.id(),
    );
    team.repos.tasks.add_task(task.clone());
    let sender = MockNotificationSender::new();
    let sut = team.repos.task_usecase(sender.clone());

    // Act
    let result = sut
        .change_status(ChangeTaskStatusInput {
            task_id:    task.id().clone(),
            status:     TaskStatus::InProgress,
            changed_by: team.alice.id().clone(),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(
        recipients_of(&result.notification),
        vec![
            "alice@example.com".to_string(),
            "grace@example.com".to_string(),
            "bob@example.com".to_string(),
        ]
    );
    let sent = sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Task Status Changed: Migrate CI pipeline");
    assert!(sent[0].text_body.contains("To Do"));
    assert!(sent[0].text_body.contains("In Progress"));
}

#[tokio::test]
async fn test_送信失敗でも業務操作は成功しwarningが返る() {
    // Arrange
    let team = TeamFixture::new();
    let task = make_task(
        "Update onboarding docs",
        Some(team.bob.id()),
        Some(team.project.id()),
        team.manager.id(),
    );
    team.repos.tasks.add_task(task.clone());
    let sender = MockNotificationSender::failing();
    let sut = team.repos.task_usecase(sender.clone());

    // Act
    let result = sut
        .change_status(ChangeTaskStatusInput {
            task_id:    task.id().clone(),
            status:     TaskStatus::Completed,
            changed_by: team.bob.id().clone(),
        })
        .await;

    // Assert
    let result = result.unwrap();
    assert!(matches!(
        result.notification,
        Some(NotificationOutcome::Warning { .. })
    ));
    assert_eq!(sender.call_count(), 1);
    let stored = team.repos.tasks.find_by_id(task.id()).await.unwrap().unwrap();
    assert_eq!(stored.status(), TaskStatus::Completed);
}

#[tokio::test]
async fn test_休暇承認は申請者にだけ通知し他の申請は変更しない() {
    // Arrange
    let team = TeamFixture::new();
    let alice_leave = make_leave_request(team.alice.id());
    let bob_leave = make_leave_request(team.bob.id());
    team.repos.leaves.add_request(alice_leave.clone());
    team.repos.leaves.add_request(bob_leave.clone());
    let sender = MockNotificationSender::new();
    let sut = team.repos.leave_usecase(sender.clone());

    // Act
    let result = sut
        .approve_leave(ReviewLeaveInput {
            leave_request_id: alice_leave.id().clone(),
            reviewer_id:      team.manager.id().clone(),
            notes:            Some("Enjoy!".to_string()),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(result.value.status(), LeaveStatus::Approved);
    assert_eq!(
        recipients_of(&result.notification),
        vec!["alice@example.com".to_string()]
    );
    let sent = sender.sent_emails();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Leave Request Approved: Alice Johnson");

    let untouched = team
        .repos
        .leaves
        .find_by_id(bob_leave.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(untouched, bob_leave);
}

#[tokio::test]
async fn test_承認済みの休暇申請は再審査できない() {
    // Arrange
    let team = TeamFixture::new();
    let leave = make_leave_request(team.alice.id());
    team.repos.leaves.add_request(leave.clone());
    let sender = MockNotificationSender::new();
    let sut = team.repos.leave_usecase(sender.clone());
    let input = || ReviewLeaveInput {
        leave_request_id: leave.id().clone(),
        reviewer_id:      team.admin.id().clone(),
        notes:            None,
    };
    sut.approve_leave(input()).await.unwrap();

    // Act
    let result = sut.reject_leave(input()).await;

    // Assert
    assert!(result.is_err());
    assert_eq!(sender.sent_emails().len(), 1);
    assert_eq!(
        team.repos.leaves.requests()[0].status(),
        LeaveStatus::Approved
    );
}

#[tokio::test]
async fn test_管理者がいない場合メンバー登録はskippedで送信しない() {
    // Arrange
    let repos = teamboard_core_service::test_utils::MockRepos::new();
    let sender = MockNotificationSender::new();
    let sut = repos.team_member_usecase(sender.clone());

    // Act
    let result = sut
        .create_team_member(CreateTeamMemberInput {
            name:       "Carol White".to_string(),
            email:      "carol@example.com".to_string(),
            role:       UserRole::Member,
            department: None,
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(
        result.notification,
        Some(NotificationOutcome::skipped_no_recipients())
    );
    assert_eq!(sender.call_count(), 0);
}

#[tokio::test]
async fn test_プロジェクト作成は管理者に通知される() {
    // Arrange
    let team = TeamFixture::new();
    let sender = MockNotificationSender::new();
    let sut = team.repos.project_usecase(sender.clone());

    // Act
    let result = sut
        .create_project(CreateProjectInput {
            name:        "Mobile App".to_string(),
            description: Some("iOS and Android client".to_string()),
            start_date:  None,
            end_date:    None,
            created_by:  team.manager.id().clone(),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(
        recipients_of(&result.notification),
        vec!["grace@example.com".to_string()]
    );
    assert_eq!(
        sender.sent_emails()[0].subject,
        "Project Created: Mobile App"
    );
}

#[tokio::test]
async fn test_メンバー追加は追加されたユーザーにだけ通知し再追加では通知しない() {
    // Arrange
    let team = TeamFixture::new();
    let sender = MockNotificationSender::new();
    let sut = team.repos.project_usecase(sender.clone());
    let input = || AddProjectMemberInput {
        project_id: team.project.id().clone(),
        user_id:    team.manager.id().clone(),
        added_by:   team.admin.id().clone(),
    };

    // Act
    let first = sut.add_member(input()).await.unwrap();
    let second = sut.add_member(input()).await.unwrap();

    // Assert
    assert_eq!(
        recipients_of(&first.notification),
        vec!["maria@example.com".to_string()]
    );
    assert_eq!(second.notification, None);
    assert_eq!(sender.sent_emails().len(), 1);
    assert_eq!(
        sender.sent_emails()[0].subject,
        "Added to Project: Website Redesign"
    );
}

#[tokio::test]
async fn test_マイルストーン完了はプロジェクトメンバー全員に通知される() {
    // Arrange
    let team = TeamFixture::new();
    let milestone = make_milestone(team.project.id(), "Public beta");
    team.repos.milestones.add_milestone(milestone.clone());
    let sender = MockNotificationSender::new();
    let sut = team.repos.project_usecase(sender.clone());

    // Act
    let result = sut
        .complete_milestone(CompleteMilestoneInput {
            project_id:   team.project.id().clone(),
            milestone_id: milestone.id().clone(),
            completed_by: team.alice.id().clone(),
        })
        .await
        .unwrap();

    // Assert
    assert!(result.value.is_completed());
    assert_eq!(
        recipients_of(&result.notification),
        vec![
            "grace@example.com".to_string(),
            "alice@example.com".to_string(),
            "bob@example.com".to_string(),
        ]
    );
    assert_eq!(
        sender.sent_emails()[0].subject,
        "Milestone Completed: Public beta"
    );
}

#[tokio::test]
async fn test_プロジェクトへのコメントはメンバーに通知される() {
    // Arrange
    let team = TeamFixture::new();
    let sender = MockNotificationSender::new();
    let sut = team.repos.comment_usecase(sender.clone());

    // Act
    let result = sut
        .post_comment(PostCommentInput {
            target:    CommentTarget::Project(team.project.id().clone()),
            author_id: team.bob.id().clone(),
            body:      "Kickoff moved to Monday".to_string(),
        })
        .await
        .unwrap();

    // Assert
    assert_eq!(result.value.body().as_str(), "Kickoff moved to Monday");
    assert_eq!(recipients_of(&result.notification).len(), 3);
    let sent = sender.sent_emails();
    assert_eq!(sent[0].subject, "New Comment: Website Redesign");
    assert!(sent[0].text_body.contains("Kickoff moved to Monday"));
}
