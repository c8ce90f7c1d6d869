//! Tests for `cairn unlock`.

mod common;

use common::*;

use cairn::infrastructure::FileLockService;
use cairn::Platform;

#[test]
fn unlock_removes_foreign_lock() {
    let env = TestEnv::new();
    let service = FileLockService::new(env.state_path("locks"));
    let lock = service.lock_path(&FileLockService::resource_for(
        Platform::Cursor,
        env.project_root.path(),
    ));
    std::fs::create_dir_all(lock.parent().unwrap()).unwrap();
    std::fs::write(&lock, "{}").unwrap();
    let project = env.project_root.path().display().to_string();

    let result = env.run(&["unlock", "--platform", "cursor", "--project", &project, "--json"]);

    assert_exit_code!(result, 0);
    assert!(!lock.exists());
    let json = result.json();
    assert_eq!(json["removed"], true);
    assert_eq!(json["platform"], "cursor");
}

#[test]
fn unlock_without_lock_is_a_noop() {
    let env = TestEnv::new();
    let project = env.project_root.path().display().to_string();

    let result = env.run(&["unlock", "--platform", "kiro", "--project", &project]);

    assert_exit_code!(result, 0);
    assert_output_contains!(result, "No Kiro lock held");
}

#[test]
fn unlock_defaults_to_current_directory() {
    let env = TestEnv::new();
    let service = FileLockService::new(env.state_path("locks"));
    let lock = service.lock_path(&FileLockService::resource_for(
        Platform::Kiro,
        env.project_root.path(),
    ));
    std::fs::create_dir_all(lock.parent().unwrap()).unwrap();
    std::fs::write(&lock, "{}").unwrap();

    let result = env.run(&["unlock", "--platform", "kiro"]);

    assert_exit_code!(result, 0);
    assert!(!lock.exists());
}
