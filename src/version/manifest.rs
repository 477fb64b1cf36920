//! Reading and writing the version in a Cargo manifest.

use crate::error::{Result, VersionError};
use semver::Version;
use std::path::Path;

/// Read the package version from a Cargo.toml.
///
/// Falls back to `[workspace.package].version` for manifests that inherit it.
pub fn read_manifest_version(cargo_toml_path: &Path) -> Result<Version> {
    let manifest_error = |reason: String| VersionError::ManifestVersion {
        path: cargo_toml_path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(cargo_toml_path)
        .map_err(|e| manifest_error(format!("Failed to read file: {e}")))?;
    let value: toml::Value = toml::from_str(&content)
        .map_err(|e| manifest_error(format!("Failed to parse TOML: {e}")))?;

    let raw = value
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(toml::Value::as_str)
        .or_else(|| {
            value
                .get("workspace")
                .and_then(|w| w.get("package"))
                .and_then(|p| p.get("version"))
                .and_then(toml::Value::as_str)
        })
        .ok_or_else(|| manifest_error("no package version found".to_string()))?;

    Version::parse(raw).map_err(|e| manifest_error(format!("'{raw}' is not semver: {e}")).into())
}

/// Set the version in a Cargo.toml, preserving formatting.
///
/// Returns the version that was replaced. When a `Cargo.lock` sits next to the
/// manifest, the lock entry for the package is updated too; the returned list
/// holds every file written.
pub fn update_manifest_version(
    cargo_toml_path: &Path,
    new_version: &Version,
) -> Result<(Version, Vec<std::path::PathBuf>)> {
    let update_error = |reason: String| VersionError::ManifestVersion {
        path: cargo_toml_path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(cargo_toml_path)
        .map_err(|e| update_error(format!("Failed to read file: {e}")))?;
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| update_error(format!("Failed to parse TOML: {e}")))?;

    let package_version = doc
        .get("package")
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    let workspace_version = doc
        .get("workspace")
        .and_then(|w| w.get("package"))
        .and_then(|p| p.get("version"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let previous = match (package_version, workspace_version) {
        (Some(previous), _) => {
            set_keeping_decor(&mut doc["package"]["version"], new_version);
            previous
        }
        (None, Some(previous)) => {
            set_keeping_decor(&mut doc["workspace"]["package"]["version"], new_version);
            previous
        }
        (None, None) => return Err(update_error("no package version found".to_string()).into()),
    };
    let previous = Version::parse(&previous)
        .map_err(|e| update_error(format!("'{previous}' is not semver: {e}")))?;

    let package_name = doc
        .get("package")
        .and_then(|p| p.get("name"))
        .and_then(|n| n.as_str())
        .map(str::to_string);

    std::fs::write(cargo_toml_path, doc.to_string())
        .map_err(|e| update_error(format!("Failed to write file: {e}")))?;

    let mut written = vec![cargo_toml_path.to_path_buf()];

    if let Some(name) = package_name {
        let lock_path = cargo_toml_path.with_file_name("Cargo.lock");
        if lock_path.exists() && update_lock_entry(&lock_path, &name, &previous, new_version)? {
            written.push(lock_path);
        }
    }

    Ok((previous, written))
}

/// Replace a version value without losing its surrounding whitespace and comments
fn set_keeping_decor(item: &mut toml_edit::Item, version: &Version) {
    let decor = item.as_value().map(|v| v.decor().clone());
    *item = toml_edit::value(version.to_string());
    if let (Some(decor), Some(value)) = (decor, item.as_value_mut()) {
        *value.decor_mut() = decor;
    }
}

/// Update the `[[package]]` entry for `name` at `previous` in a Cargo.lock
fn update_lock_entry(
    lock_path: &Path,
    name: &str,
    previous: &Version,
    new_version: &Version,
) -> Result<bool> {
    let lock_error = |reason: String| VersionError::ManifestVersion {
        path: lock_path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(lock_path)
        .map_err(|e| lock_error(format!("Failed to read file: {e}")))?;
    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| lock_error(format!("Failed to parse TOML: {e}")))?;

    let Some(packages) = doc
        .get_mut("package")
        .and_then(|p| p.as_array_of_tables_mut())
    else {
        return Ok(false);
    };

    let previous = previous.to_string();
    let mut changed = false;
    for table in packages.iter_mut() {
        let is_match = table.get("name").and_then(|n| n.as_str()) == Some(name)
            && table.get("version").and_then(|v| v.as_str()) == Some(previous.as_str());
        if is_match {
            set_keeping_decor(&mut table["version"], new_version);
            changed = true;
        }
    }

    if changed {
        std::fs::write(lock_path, doc.to_string())
            .map_err(|e| lock_error(format!("Failed to write file: {e}")))?;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"[package]
name = "demo"
version = "1.2.3" # keep me
edition = "2021"

[dependencies]
serde = "1"
"#;

    const LOCK: &str = r#"version = 4

[[package]]
name = "demo"
version = "1.2.3"

[[package]]
name = "serde"
version = "1.2.3"
"#;

    #[test]
    fn test_update_preserves_comments_and_returns_previous() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        std::fs::write(&path, MANIFEST).unwrap();

        let (previous, written) = update_manifest_version(&path, &Version::new(1, 3, 0)).unwrap();
        assert_eq!(previous, Version::new(1, 2, 3));
        assert_eq!(written, vec![path.clone()]);

        let updated = std::fs::read_to_string(&path).unwrap();
        assert!(updated.contains("version = \"1.3.0\""));
        assert!(updated.contains("# keep me"));
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(1, 3, 0));
    }

    #[test]
    fn test_update_touches_only_own_lock_entry() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        std::fs::write(&path, MANIFEST).unwrap();
        std::fs::write(dir.path().join("Cargo.lock"), LOCK).unwrap();

        let (_, written) = update_manifest_version(&path, &Version::new(2, 0, 0)).unwrap();
        assert_eq!(written.len(), 2);

        let lock = std::fs::read_to_string(dir.path().join("Cargo.lock")).unwrap();
        assert!(lock.contains("name = \"demo\"\nversion = \"2.0.0\""));
        assert!(lock.contains("name = \"serde\"\nversion = \"1.2.3\""));
    }

    #[test]
    fn test_workspace_package_version() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        std::fs::write(
            &path,
            "[workspace]\nmembers = []\n\n[workspace.package]\nversion = \"0.4.0\"\n",
        )
        .unwrap();
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(0, 4, 0));
        update_manifest_version(&path, &Version::new(0, 5, 0)).unwrap();
        assert_eq!(read_manifest_version(&path).unwrap(), Version::new(0, 5, 0));
    }

    #[test]
    fn test_missing_version_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cargo.toml");
        std::fs::write(&path, "[package]\nname = \"x\"\n").unwrap();
        assert!(read_manifest_version(&path).is_err());
        assert!(update_manifest_version(&path, &Version::new(1, 0, 0)).is_err());
    }
}
