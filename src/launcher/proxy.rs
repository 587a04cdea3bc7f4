//! jupyter-server-proxy server entry
//!
//! The proxy runs `command` with `{port}` substituted, waits up to `timeout`
//! seconds for it to answer, and shows `launcher_entry` in the JupyterLab
//! launcher.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::consts::LAUNCHER_TITLE;
use crate::core::ServerSettings;

#[derive(Debug, Serialize)]
pub(crate) struct LauncherEntry {
    pub(crate) title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) icon_path: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ProxyConfig {
    pub(crate) command: Vec<String>,
    pub(crate) port: u16,
    pub(crate) timeout: u64,
    pub(crate) new_browser_tab: bool,
    pub(crate) launcher_entry: LauncherEntry,
}

impl ProxyConfig {
    /// Entry that re-invokes `self_exe` to provision and start the server
    pub(crate) fn for_executable(server: &ServerSettings, self_exe: &Path) -> Self {
        ProxyConfig {
            command: vec![
                self_exe.to_string_lossy().into_owned(),
                "mlflow".to_string(),
                "--port".to_string(),
                "{port}".to_string(),
            ],
            port: server.port,
            timeout: server.startup_timeout,
            new_browser_tab: true,
            launcher_entry: LauncherEntry {
                title: LAUNCHER_TITLE.to_string(),
                icon_path: icon_path(server, self_exe, dirs::data_dir().as_deref()),
            },
        }
    }
}

const BUNDLED_ICON: &str = include_str!("../../icons/mlflow.svg");

/// Configured icon, else `icons/mlflow.svg` beside the executable, else the
/// bundled icon installed under the user data directory
fn icon_path(server: &ServerSettings, self_exe: &Path, data_dir: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = &server.icon_path {
        return Some(path.clone());
    }
    let beside_exe = self_exe
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join("icons")
        .join("mlflow.svg");
    if beside_exe.is_file() {
        return Some(beside_exe);
    }

    let Some(data_dir) = data_dir else {
        tracing::warn!("no data directory, launcher entry has no icon");
        return None;
    };
    match install_bundled_icon(data_dir) {
        Ok(path) => Some(path),
        Err(e) => {
            tracing::warn!(dir = %data_dir.display(), "could not install launcher icon: {e}");
            None
        }
    }
}

fn install_bundled_icon(data_dir: &Path) -> io::Result<PathBuf> {
    let path = data_dir.join("hubtrack").join("icons").join("mlflow.svg");
    if !path.is_file() {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, BUNDLED_ICON)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(icon_path: Option<PathBuf>) -> ServerSettings {
        ServerSettings {
            executable: "mlflow".to_string(),
            port: 5000,
            startup_timeout: 20,
            icon_path,
        }
    }

    #[test]
    fn serializes_host_contract() {
        let config = ProxyConfig::for_executable(
            &server(Some(PathBuf::from("/srv/icons/mlflow.svg"))),
            Path::new("/opt/hubtrack/bin/hubtrack"),
        );
        let json = serde_json::to_value(&config).unwrap();

        assert_eq!(
            json["command"],
            serde_json::json!(["/opt/hubtrack/bin/hubtrack", "mlflow", "--port", "{port}"])
        );
        assert_eq!(json["port"], 5000);
        assert_eq!(json["timeout"], 20);
        assert_eq!(json["new_browser_tab"], true);
        assert_eq!(json["launcher_entry"]["title"], "MLflow");
        assert_eq!(json["launcher_entry"]["icon_path"], "/srv/icons/mlflow.svg");
    }

    #[test]
    fn configured_icon_wins() {
        let data = tempfile::tempdir().unwrap();
        let path = icon_path(
            &server(Some(PathBuf::from("/srv/icons/tracking.svg"))),
            Path::new("/usr/bin/hubtrack"),
            Some(data.path()),
        );
        assert_eq!(path, Some(PathBuf::from("/srv/icons/tracking.svg")));
        assert!(!data.path().join("hubtrack").exists());
    }

    #[test]
    fn icon_beside_executable_is_used_when_present() {
        let install = tempfile::tempdir().unwrap();
        let icons = install.path().join("icons");
        fs::create_dir(&icons).unwrap();
        fs::write(icons.join("mlflow.svg"), "<svg/>").unwrap();
        let data = tempfile::tempdir().unwrap();

        let path = icon_path(&server(None), &install.path().join("hubtrack"), Some(data.path()));
        assert_eq!(path, Some(icons.join("mlflow.svg")));
    }

    #[test]
    fn bundled_icon_is_installed_into_data_dir() {
        let install = tempfile::tempdir().unwrap();
        let data = tempfile::tempdir().unwrap();

        let path = icon_path(&server(None), &install.path().join("hubtrack"), Some(data.path()))
            .unwrap();
        assert_eq!(path, data.path().join("hubtrack").join("icons").join("mlflow.svg"));
        assert_eq!(fs::read_to_string(&path).unwrap(), BUNDLED_ICON);
    }

    #[test]
    fn icon_is_omitted_when_it_cannot_be_placed() {
        let install = tempfile::tempdir().unwrap();
        let blocker = install.path().join("not-a-dir");
        fs::write(&blocker, "").unwrap();

        let path = icon_path(&server(None), &install.path().join("hubtrack"), Some(&blocker));
        assert_eq!(path, None);
        assert_eq!(icon_path(&server(None), &install.path().join("hubtrack"), None), None);

        let entry = LauncherEntry {
            title: "MLflow".to_string(),
            icon_path: None,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("icon_path").is_none());
    }
}
