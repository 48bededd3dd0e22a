//! 統合テスト用のチーム構成
//!
//! 管理者・マネージャー・一般メンバー 2 名と、メンバーが所属するプロジェクトを
//! モックリポジトリに登録した状態を作る。

use teamboard_core_service::test_utils::{MockRepos, make_project, make_user};
use teamboard_domain::{project::Project, user::User, user::UserRole};

pub struct TeamFixture {
    pub repos:   MockRepos,
    pub admin:   User,
    pub manager: User,
    pub alice:   User,
    pub bob:     User,
    /// メンバー: admin, alice, bob
    pub project: Project,
}

impl TeamFixture {
    pub fn new() -> Self {
        let repos = MockRepos::new();
        let admin = make_user("Grace Admin", "grace@example.com", UserRole::Admin);
        let manager = make_user("Maria Manager", "maria@example.com", UserRole::Manager);
        let alice = make_user("Alice Johnson", "alice@example.com", UserRole::Member);
        let bob = make_user("Bob Smith", "bob@example.com", UserRole::Member);
        let project = make_project("Website Redesign", manager.id());

        for user in [&admin, &manager, &alice, &bob] {
            repos.users.add_user(user.clone());
        }
        repos.projects.add_project(project.clone());
        for user in [&admin, &alice, &bob] {
            repos.projects.add_project_member(project.id(), user.id());
        }

        Self {
            repos,
            admin,
            manager,
            alice,
            bob,
            project,
        }
    }
}
