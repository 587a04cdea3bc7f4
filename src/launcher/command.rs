use std::process::Command;

use crate::consts::SERVER_BIND_HOST;

/// Argument list for one tracking server process, program first
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServerCommand {
    args: Vec<String>,
}

impl ServerCommand {
    pub(crate) fn tracking_server(
        executable: &str,
        port: u16,
        backend_store: &str,
        artifact_root: &str,
    ) -> Self {
        let port = port.to_string();
        let args = [
            executable,
            "server",
            "--host",
            SERVER_BIND_HOST,
            "--port",
            port.as_str(),
            "--backend-store-uri",
            backend_store,
            "--default-artifact-root",
            artifact_root,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        Self { args }
    }

    pub(crate) fn args(&self) -> &[String] {
        &self.args
    }

    pub(crate) fn program(&self) -> &str {
        &self.args[0]
    }

    pub(crate) fn to_process(&self) -> Command {
        let mut cmd = Command::new(self.program());
        cmd.args(&self.args[1..]);
        cmd
    }

    /// Render as a POSIX shell line, quoting where needed
    pub(crate) fn to_shell_line(&self) -> String {
        self.args
            .iter()
            .map(|arg| shell_quote(arg))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=@,+%".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
