//! Config loader (C14): `./arm.toml`, one `[policy]` table, everything
//! optional.
//!
//! Grounded in the original Python's `config.py::load_config`, which reads
//! each `[policy]` key off a raw dict independently rather than
//! deserializing the table as one struct: a wrong-typed `fail_on_dirty`
//! does not prevent a correctly-typed `allowed_branches` in the same file
//! from taking effect. Walking `toml_edit`'s document model field-by-field
//! (rather than `toml_edit::de::from_str` into a serde struct, which fails
//! the whole table on one type mismatch) is how that per-field defaulting
//! is expressed in Rust; the teacher's own `core/config.rs` still supplies
//! the `toml_edit` dependency and the "missing file is all defaults" shape.

use crate::policy::{ReleasePolicy, UnknownTypeBehavior};
use std::path::Path;
use toml_edit::{DocumentMut, Item, TableLike};

fn table_string(table: &dyn TableLike, key: &str) -> Option<String> {
  table.get(key)?.as_str().map(str::to_string)
}

fn table_bool(table: &dyn TableLike, key: &str) -> Option<bool> {
  table.get(key)?.as_bool()
}

fn table_string_list(table: &dyn TableLike, key: &str) -> Option<Vec<String>> {
  let array = table.get(key)?.as_array()?;
  array.iter().map(|v| v.as_str().map(str::to_string)).collect()
}

/// Apply one `[policy]` key onto `policy` if present and well-typed;
/// otherwise leave the field at its default and log why. Each key is
/// independent, so one bad-typed field never disturbs its neighbors.
fn apply_field<T>(table: &dyn TableLike, key: &str, read: impl FnOnce(&dyn TableLike, &str) -> Option<T>, set: impl FnOnce(T)) {
  if table.get(key).is_none() {
    return;
  }
  match read(table, key) {
    Some(v) => set(v),
    None => tracing::warn!(key, "arm.toml: wrong type for [policy] key; using default"),
  }
}

/// Load `path` and fold its `[policy]` table, key by key, onto
/// [`ReleasePolicy::default`]. A missing file is silently all-defaults;
/// a file that isn't valid TOML at all is all-defaults with a warning. A
/// `[policy]` table that parses but has one wrong-typed key still applies
/// every other, correctly-typed key in that same file.
pub fn load_policy(path: &Path) -> ReleasePolicy {
  let mut policy = ReleasePolicy::default();

  let raw = match std::fs::read_to_string(path) {
    Ok(raw) => raw,
    Err(_) => return policy,
  };

  let doc: DocumentMut = match raw.parse() {
    Ok(doc) => doc,
    Err(e) => {
      tracing::warn!(path = %path.display(), error = %e, "arm.toml failed to parse; using default policy");
      return policy;
    }
  };

  let Some(table) = doc.get("policy").and_then(Item::as_table_like) else {
    return policy;
  };

  apply_field(table, "patch_types", table_string_list, |v| policy.patch_types = v.into_iter().collect());
  apply_field(table, "no_bump_types", table_string_list, |v| policy.no_bump_types = v.into_iter().collect());
  apply_field(table, "unknown_type_behavior", table_string, |v| {
    policy.unknown_type_behavior = UnknownTypeBehavior::normalize(&v)
  });
  apply_field(table, "initial_version", table_string, |v| policy.initial_version = v);
  apply_field(table, "fail_on_dirty", table_bool, |v| policy.fail_on_dirty = v);
  apply_field(table, "allowed_branches", table_string_list, |v| policy.allowed_branches = v);
  apply_field(table, "remote_safe_default", table_bool, |v| policy.remote_safe_default = v);
  apply_field(table, "default_remote", table_string, |v| policy.default_remote = v);

  policy
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("arm.toml");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    (tmp, path)
  }

  #[test]
  fn missing_file_is_all_defaults() {
    let tmp = tempfile::tempdir().unwrap();
    let policy = load_policy(&tmp.path().join("arm.toml"));
    assert_eq!(policy.initial_version, "0.1.0");
    assert!(policy.remote_safe_default);
  }

  #[test]
  fn overrides_only_specified_fields() {
    let (_tmp, path) = write_config(
      r#"
      [policy]
      initial_version = "1.0.0"
      allowed_branches = ["release/*"]
      "#,
    );
    let policy = load_policy(&path);
    assert_eq!(policy.initial_version, "1.0.0");
    assert_eq!(policy.allowed_branches, vec!["release/*".to_string()]);
    assert!(policy.fail_on_dirty);
    assert!(policy.patch_types.contains("fix"));
  }

  #[test]
  fn malformed_file_falls_back_to_defaults() {
    let (_tmp, path) = write_config("this is not [ valid toml");
    let policy = load_policy(&path);
    assert_eq!(policy.initial_version, "0.1.0");
  }

  #[test]
  fn unknown_type_behavior_is_normalized() {
    let (_tmp, path) = write_config(
      r#"
      [policy]
      unknown_type_behavior = "FAIL"
      "#,
    );
    let policy = load_policy(&path);
    assert_eq!(policy.unknown_type_behavior, UnknownTypeBehavior::Fail);
  }

  /// A single wrong-typed key must not discard the rest of the file: only
  /// `fail_on_dirty` (a string, not a bool) falls back to its own default,
  /// while `allowed_branches` and `initial_version` in the same document
  /// still apply.
  #[test]
  fn one_bad_typed_key_does_not_discard_the_rest_of_the_file() {
    let (_tmp, path) = write_config(
      r#"
      [policy]
      fail_on_dirty = "yes"
      allowed_branches = ["release/*"]
      initial_version = "2.0.0"
      "#,
    );
    let policy = load_policy(&path);
    assert!(policy.fail_on_dirty, "bad-typed key should fall back to its own default");
    assert_eq!(policy.allowed_branches, vec!["release/*".to_string()]);
    assert_eq!(policy.initial_version, "2.0.0");
  }

  #[test]
  fn bad_typed_list_key_falls_back_alongside_good_keys() {
    let (_tmp, path) = write_config(
      r#"
      [policy]
      patch_types = "fix"
      default_remote = "upstream"
      "#,
    );
    let policy = load_policy(&path);
    assert!(policy.patch_types.contains("fix"), "should fall back to the default patch_types set");
    assert!(policy.patch_types.contains("chore"));
    assert_eq!(policy.default_remote, "upstream");
  }
}
