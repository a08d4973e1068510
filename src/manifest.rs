//! Reads the declared dependency set from `package.json`.

use crate::model::PackageRef;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const MANIFEST_FILE: &str = "package.json";

#[derive(Deserialize, Default)]
struct PackageJson {
    #[serde(default)]
    dependencies: Option<BTreeMap<String, serde_json::Value>>,
    #[serde(default, rename = "devDependencies")]
    dev_dependencies: Option<BTreeMap<String, serde_json::Value>>,
}

/// Loads `dependencies` and `devDependencies` from the manifest in `dir`.
///
/// Declared range strings are kept as-is. On a name collision the
/// `devDependencies` entry wins. A missing or unparsable manifest yields an
/// empty list: a project without a manifest is a valid bare-install case.
pub fn read_manifest(dir: &Path) -> Vec<PackageRef> {
    let path = dir.join(MANIFEST_FILE);
    let content = match std::fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Manifest not readable");
            return Vec::new();
        }
    };
    parse_manifest(&content)
}

pub fn parse_manifest(content: &str) -> Vec<PackageRef> {
    let pkg: PackageJson = match serde_json::from_str(content) {
        Ok(p) => p,
        Err(e) => {
            debug!(error = %e, "Manifest is not valid JSON");
            return Vec::new();
        }
    };

    let mut merged: BTreeMap<String, String> = BTreeMap::new();
    // A `null` group counts as empty.
    let groups = pkg.dependencies.into_iter().chain(pkg.dev_dependencies).flatten();
    for (name, version) in groups {
        match version.as_str() {
            Some(v) if !name.is_empty() => {
                merged.insert(name, v.to_string());
            }
            _ => debug!(package = %name, "Skipping dependency without a version string"),
        }
    }

    merged
        .into_iter()
        .map(|(name, version)| PackageRef { name, version })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_merges_both_groups() {
        let deps = parse_manifest(
            r#"{
                "dependencies": { "left-pad": "^1.3.0", "express": "4.18.2" },
                "devDependencies": { "jest": "~29.0.0" }
            }"#,
        );
        assert_eq!(
            deps,
            vec![
                PackageRef::new("express", "4.18.2"),
                PackageRef::new("jest", "~29.0.0"),
                PackageRef::new("left-pad", "^1.3.0"),
            ]
        );
    }

    #[test]
    fn test_dev_dependencies_win_on_collision() {
        let deps = parse_manifest(
            r#"{
                "dependencies": { "lodash": "^4.17.0" },
                "devDependencies": { "lodash": "4.17.21" }
            }"#,
        );
        assert_eq!(deps, vec![PackageRef::new("lodash", "4.17.21")]);
    }

    #[test]
    fn test_invalid_json_yields_empty() {
        assert!(parse_manifest("{ not json").is_empty());
        assert!(parse_manifest(r#"{"name": "no-deps"}"#).is_empty());
    }

    #[test]
    fn test_non_string_versions_skipped() {
        let deps = parse_manifest(r#"{"dependencies": {"a": 1, "b": "2.0.0"}}"#);
        assert_eq!(deps, vec![PackageRef::new("b", "2.0.0")]);
    }

    #[test]
    fn test_null_group_does_not_hide_the_other() {
        let deps = parse_manifest(
            r#"{"dependencies": null, "devDependencies": {"jest": "^29.0.0"}}"#,
        );
        assert_eq!(deps, vec![PackageRef::new("jest", "^29.0.0")]);
    }

    #[test]
    fn test_read_manifest_from_dir() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            r#"{"dependencies": {"left-pad": "^1.3.0"}}"#,
        )
        .unwrap();
        assert_eq!(
            read_manifest(dir.path()),
            vec![PackageRef::new("left-pad", "^1.3.0")]
        );
    }

    #[test]
    fn test_missing_manifest_yields_empty() {
        let dir = TempDir::new().unwrap();
        assert!(read_manifest(dir.path()).is_empty());
    }
}
