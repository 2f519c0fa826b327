//! End-to-end release scenarios against a real git repository, driven
//! entirely through the `arm` binary.

use crate::helpers::{git, json_stdout, run_arm, stderr, TestWorkspace};

#[test]
fn seed_feat_dry_run_leaves_no_trace() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "feat: init").unwrap();

  let output = run_arm(&ws.path, &["release", "--dry-run", "--allow-dirty", "--project-name", "x"]).unwrap();
  assert!(output.status.success(), "{}", stderr(&output));

  let json = json_stdout(&output);
  assert_eq!(json["dry_run"], true);
  assert!(!ws.file_exists("CHANGELOG.md"));
  assert!(!ws.file_exists(".arm"));
  assert!(!ws.file_exists("dist"));
  assert!(ws.is_clean().unwrap());
}

#[test]
fn apply_then_rollback_restores_pre_release_state() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "chore: baseline").unwrap();
  ws.tag("v0.1.0").unwrap();
  ws.commit("feature.txt", "feat: add feature file").unwrap();

  let release = run_arm(&ws.path, &["release", "--project-name", "x"]).unwrap();
  assert!(release.status.success(), "{}", stderr(&release));
  let json = json_stdout(&release);
  assert_eq!(json["next_version"], "0.2.0");
  assert_eq!(json["tag"], "v0.2.0");
  assert!(ws.file_exists("CHANGELOG.md"));
  assert!(ws.file_exists(".arm/last_release.json"));
  assert!(ws.file_exists("dist/x-0.2.0.zip"));

  let rollback = run_arm(&ws.path, &["rollback"]).unwrap();
  assert!(rollback.status.success(), "{}", stderr(&rollback));

  let tags = ws.tags().unwrap();
  assert!(!tags.contains(&"v0.2.0".to_string()));
  assert!(!ws.file_exists(".arm/last_release.json"));
  assert!(!ws.file_exists("dist/x-0.2.0.zip"));
  assert!(!ws.file_exists("CHANGELOG.md"));
}

#[test]
fn remote_safe_mode_refuses_push() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "feat: init").unwrap();

  let output = run_arm(&ws.path, &["release", "--push", "--allow-dirty", "--project-name", "x"]).unwrap();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Remote-safe mode is enabled"));
  assert!(!ws.file_exists(".arm"));
  assert!(!ws.file_exists("dist"));
}

#[test]
fn branch_policy_violation_blocks_release() {
  let ws = TestWorkspace::new().unwrap();
  ws.write_file("arm.toml", "[policy]\nallowed_branches = [\"release/*\"]\n").unwrap();
  git(&ws.path, &["add", "."]).unwrap();
  git(&ws.path, &["commit", "-m", "chore: add config"]).unwrap();

  let output = run_arm(&ws.path, &["--config", "arm.toml", "release", "--allow-dirty"]).unwrap();
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Branch policy violation"));
}

#[test]
fn max_bump_wins_across_mixed_commits() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "chore: baseline").unwrap();
  ws.tag("v1.2.3").unwrap();
  ws.commit("b.txt", "fix: patch something").unwrap();
  ws.commit("c.txt", "feat: add thing").unwrap();
  ws.commit_with_body("d.txt", "chore!: drop legacy", "BREAKING CHANGE: removed old path").unwrap();

  let output = run_arm(&ws.path, &["plan", "--json"]).unwrap();
  assert!(output.status.success(), "{}", stderr(&output));
  let json = json_stdout(&output);
  assert_eq!(json["next_version"], "2.0.0");
  assert_eq!(json["bump"], "major");
  assert_eq!(json["reason"], "breaking change");
}

#[test]
fn validate_reports_non_conventional_commits_on_stderr() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "feat: ok commit").unwrap();
  ws.commit("b.txt", "not conventional at all").unwrap();

  let output = run_arm(&ws.path, &["validate"]).unwrap();
  assert_eq!(output.status.code(), Some(2));
  assert!(stderr(&output).contains("Non-conventional subject"));
}

#[test]
fn status_never_fails_on_a_fresh_repo() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("a.txt", "chore: baseline").unwrap();

  let output = run_arm(&ws.path, &["status"]).unwrap();
  assert!(output.status.success());
  let json = json_stdout(&output);
  assert_eq!(json["dirty"], false);
  assert_eq!(json["last_tag"], serde_json::Value::Null);
  assert_eq!(json["branch"], "main");
}

#[test]
fn exclusion_globs_never_appear_in_the_archive() {
  let ws = TestWorkspace::new().unwrap();
  ws.commit("src/main.rs", "feat: init").unwrap();
  ws.write_file("__pycache__/mod.pyc", "junk").unwrap();

  let output = run_arm(&ws.path, &["release", "--allow-dirty", "--project-name", "x"]).unwrap();
  assert!(output.status.success(), "{}", stderr(&output));

  let zip_path = ws.path.join("dist/x-0.1.0.zip");
  let mut archive = zip::ZipArchive::new(std::fs::File::open(&zip_path).unwrap()).unwrap();
  let names: Vec<String> = (0..archive.len())
    .map(|i| archive.by_index(i).unwrap().name().to_string())
    .collect();
  assert!(!names.iter().any(|n| n.starts_with("__pycache__/")));
  assert!(!names.iter().any(|n| n.starts_with(".git/")));
}
