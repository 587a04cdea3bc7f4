//! Per-run TensorBoard log directories
//!
//! Layout: `<base_dir>/<tenant>/<experiment>/<YYYYMMDD-HHMMSS>/`. Two runs of
//! the same experiment started within one second share a directory.

mod sink;

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use chrono::NaiveDateTime;

use crate::consts::LOG_STAMP_FORMAT;
use crate::core::{HubContext, TenantId};
use crate::error::{AppError, LogDirError};

pub(crate) use sink::TensorBoardSink;

#[derive(Debug)]
pub(crate) struct ExperimentLogDir {
    path: PathBuf,
}

#[derive(Debug)]
pub(crate) enum ClearOutcome {
    /// Nothing to clear
    Missing,
    Cleared {
        removed: Vec<PathBuf>,
        failed: Vec<(PathBuf, io::Error)>,
    },
}

impl ClearOutcome {
    pub(crate) fn to_json(&self, path: &Path) -> serde_json::Value {
        match self {
            ClearOutcome::Missing => serde_json::json!({
                "path": path,
                "exists": false,
                "removed": [],
                "failed": [],
            }),
            ClearOutcome::Cleared { removed, failed } => serde_json::json!({
                "path": path,
                "exists": true,
                "removed": removed,
                "failed": failed
                    .iter()
                    .map(|(file, e)| serde_json::json!({ "path": file, "error": e.to_string() }))
                    .collect::<Vec<_>>(),
            }),
        }
    }

    /// `PartialClear` when any file survived
    pub(crate) fn ensure_complete(&self, path: &Path) -> Result<(), LogDirError> {
        match self {
            ClearOutcome::Cleared { failed, .. } if !failed.is_empty() => {
                Err(LogDirError::PartialClear {
                    path: path.to_path_buf(),
                    failed: failed.len(),
                })
            }
            _ => Ok(()),
        }
    }
}

fn validate_experiment(name: &str) -> Result<(), AppError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !name.contains(['/', '\\']) => Ok(()),
        _ => Err(AppError::InvalidExperiment {
            input: name.to_string(),
        }),
    }
}

impl ExperimentLogDir {
    /// Compose the run directory for `stamp` and create it with all parents
    pub(crate) fn create(
        base_dir: &Path,
        tenant: &TenantId,
        experiment: &str,
        stamp: NaiveDateTime,
    ) -> Result<Self, AppError> {
        validate_experiment(experiment)?;

        let path = base_dir
            .join(tenant.as_str())
            .join(experiment)
            .join(stamp.format(LOG_STAMP_FORMAT).to_string());

        if path.is_dir() {
            tracing::warn!(path = %path.display(), "log directory already exists, sharing it");
        }
        fs::create_dir_all(&path).map_err(|source| LogDirError::Create {
            path: path.clone(),
            source,
        })?;

        Ok(Self { path })
    }

    /// New run directory stamped with the current time in the context's timezone
    pub(crate) fn for_context(ctx: &HubContext, experiment: &str) -> Result<Self, AppError> {
        Self::create(&ctx.logs.base_dir, &ctx.tenant, experiment, ctx.logs.timezone.now())
    }

    /// Refer to an existing run directory without touching the filesystem
    pub(crate) fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn sink(&self) -> TensorBoardSink {
        TensorBoardSink::per_epoch(self.path.clone())
    }

    pub(crate) fn describe(&self) -> String {
        format!("TensorBoard logs will be saved to: {}", self.path.display())
    }

    /// Remove regular files directly inside the directory. Subdirectories are
    /// left alone. Every file is attempted; failures are collected.
    pub(crate) fn clear(&self) -> Result<ClearOutcome, LogDirError> {
        self.clear_with(|file| fs::remove_file(file))
    }

    fn clear_with<F>(&self, remove: F) -> Result<ClearOutcome, LogDirError>
    where
        F: Fn(&Path) -> io::Result<()>,
    {
        if !self.path.is_dir() {
            return Ok(ClearOutcome::Missing);
        }

        let entries = fs::read_dir(&self.path).map_err(|source| LogDirError::Read {
            path: self.path.clone(),
            source,
        })?;

        let mut removed = Vec::new();
        let mut failed = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LogDirError::Read {
                path: self.path.clone(),
                source,
            })?;
            let file = entry.path();
            if !file.is_file() {
                continue;
            }
            match remove(&file) {
                Ok(()) => removed.push(file),
                Err(e) => {
                    tracing::warn!(file = %file.display(), "failed to remove log file: {e}");
                    failed.push((file, e));
                }
            }
        }

        removed.sort();
        Ok(ClearOutcome::Cleared { removed, failed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn fixed_stamp() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn alice() -> TenantId {
        TenantId::parse("alice").unwrap()
    }

    #[test]
    fn creates_tenant_experiment_stamp_path() {
        let tmp = tempfile::tempdir().unwrap();
        let base = tmp.path().join("logs");
        let dir = ExperimentLogDir::create(&base, &alice(), "exp1", fixed_stamp()).unwrap();

        assert_eq!(dir.path(), base.join("alice").join("exp1").join("20240101-100000"));
        assert!(dir.path().is_dir());
    }

    #[test]
    fn same_second_reuses_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let first = ExperimentLogDir::create(tmp.path(), &alice(), "exp1", fixed_stamp()).unwrap();
        fs::write(first.path().join("events.out"), "x").unwrap();
        let second = ExperimentLogDir::create(tmp.path(), &alice(), "exp1", fixed_stamp()).unwrap();

        assert_eq!(first.path(), second.path());
        assert!(second.path().join("events.out").exists());
    }

    #[test]
    fn rejects_path_like_experiment_names() {
        let tmp = tempfile::tempdir().unwrap();
        for bad in ["", ".", "..", "a/b", "../escape", "/abs"] {
            let err = ExperimentLogDir::create(tmp.path(), &alice(), bad, fixed_stamp()).unwrap_err();
            assert!(matches!(err, AppError::InvalidExperiment { .. }), "{bad}");
        }
    }

    #[test]
    fn create_under_a_file_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("blocker");
        fs::write(&blocker, "").unwrap();
        let err = ExperimentLogDir::create(&blocker, &alice(), "exp1", fixed_stamp()).unwrap_err();
        assert!(matches!(err, AppError::LogDir(LogDirError::Create { .. })));
    }

    #[test]
    fn describe_and_sink_use_path() {
        let dir = ExperimentLogDir::open("/tmp/logs/alice/exp1/20240101-100000");
        assert_eq!(
            dir.describe(),
            "TensorBoard logs will be saved to: /tmp/logs/alice/exp1/20240101-100000"
        );
        assert_eq!(dir.sink().log_dir, PathBuf::from("/tmp/logs/alice/exp1/20240101-100000"));
    }

    #[test]
    fn clear_removes_files_but_keeps_subdirectories() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExperimentLogDir::open(tmp.path());
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();
        fs::create_dir(tmp.path().join("sub")).unwrap();
        fs::write(tmp.path().join("sub").join("nested.txt"), "n").unwrap();

        let ClearOutcome::Cleared { removed, failed } = dir.clear().unwrap() else {
            panic!("directory exists");
        };

        assert_eq!(removed, vec![tmp.path().join("a.txt"), tmp.path().join("b.txt")]);
        assert!(failed.is_empty());
        assert!(!tmp.path().join("a.txt").exists());
        assert!(tmp.path().join("sub").join("nested.txt").exists());
    }

    #[test]
    fn clear_keeps_going_after_a_failed_removal() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExperimentLogDir::open(tmp.path());
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::write(tmp.path().join("b.txt"), "b").unwrap();

        let outcome = dir
            .clear_with(|file| {
                if file.ends_with("a.txt") {
                    Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
                } else {
                    fs::remove_file(file)
                }
            })
            .unwrap();

        let ClearOutcome::Cleared { removed, failed } = &outcome else {
            panic!("directory exists");
        };
        assert_eq!(removed, &vec![tmp.path().join("b.txt")]);
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, tmp.path().join("a.txt"));
        assert!(tmp.path().join("a.txt").exists());
        assert!(!tmp.path().join("b.txt").exists());

        let json = outcome.to_json(dir.path());
        assert_eq!(json["exists"], true);
        assert_eq!(json["removed"].as_array().unwrap().len(), 1);
        assert_eq!(json["failed"][0]["error"], "read-only");

        let err = outcome.ensure_complete(dir.path()).unwrap_err();
        assert!(matches!(err, LogDirError::PartialClear { failed: 1, .. }));
        assert_eq!(
            AppError::from(err).to_string(),
            format!("Could not remove 1 file(s) from {}", tmp.path().display())
        );
    }

    #[test]
    fn complete_clear_passes_check() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        let dir = ExperimentLogDir::open(tmp.path());
        let outcome = dir.clear().unwrap();
        assert!(outcome.ensure_complete(dir.path()).is_ok());

        let missing = ExperimentLogDir::open(tmp.path().join("gone")).clear().unwrap();
        assert!(missing.ensure_complete(tmp.path()).is_ok());
        assert_eq!(missing.to_json(tmp.path())["exists"], false);
    }

    #[test]
    fn clear_missing_directory_is_noop() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = ExperimentLogDir::open(tmp.path().join("never-created"));
        assert!(matches!(dir.clear().unwrap(), ClearOutcome::Missing));
    }
}
