use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolve a program name against a `PATH`-style list of directories.
/// Names containing a separator are checked as given.
pub(crate) fn find_executable(name: &str, path_var: Option<&OsStr>) -> Option<PathBuf> {
    let direct = Path::new(name);
    if direct.components().count() > 1 {
        return is_executable(direct).then(|| direct.to_path_buf());
    }

    let path_var = path_var?;
    std::env::split_paths(path_var)
        .filter(|dir| !dir.as_os_str().is_empty())
        .flat_map(|dir| candidates(&dir, name))
        .find(|candidate| is_executable(candidate))
}

#[cfg(windows)]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name), dir.join(format!("{name}.exe"))]
}

#[cfg(not(windows))]
fn candidates(dir: &Path, name: &str) -> Vec<PathBuf> {
    vec![dir.join(name)]
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;

    fn write_program(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    #[test]
    fn finds_program_in_second_dir() {
        let empty = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let expected = write_program(bin.path(), "mlflow", 0o755);
        let path_var = std::env::join_paths([empty.path(), bin.path()]).unwrap();

        assert_eq!(find_executable("mlflow", Some(&path_var)), Some(expected));
    }

    #[test]
    fn skips_non_executable_files() {
        let bin = tempfile::tempdir().unwrap();
        write_program(bin.path(), "mlflow", 0o644);
        let path_var = std::env::join_paths([bin.path()]).unwrap();

        assert_eq!(find_executable("mlflow", Some(&path_var)), None);
    }

    #[test]
    fn missing_path_finds_nothing() {
        assert_eq!(find_executable("mlflow", None), None);
    }

    #[test]
    fn explicit_path_is_checked_directly() {
        let bin = tempfile::tempdir().unwrap();
        let program = write_program(bin.path(), "mlflow", 0o755);
        let name = program.to_string_lossy().into_owned();

        assert_eq!(find_executable(&name, None), Some(program));
    }
}
