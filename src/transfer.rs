use std::path::Path;
use std::process::Command;

use crate::error::TarmacError;

/// Captured output of one external transfer invocation, surfaced verbatim to
/// the operator. Nonzero exit is reported, never retried.
#[derive(Debug)]
pub struct TransferOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

/// Capability seam for copying reservation documents into and out of the
/// external store. The harness only builds paths and relays tool output.
pub trait Transfer {
    fn store(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError>;

    fn fetch(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError>;
}

/// Shells out to a configured command-line tool with `put`/`get` verbs.
pub struct CommandTransfer {
    program: String,
}

impl CommandTransfer {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, verb: &str, first: &str, second: &str) -> Result<TransferOutput, TarmacError> {
        let output = Command::new(&self.program)
            .arg(verb)
            .arg(first)
            .arg(second)
            .output()
            .map_err(|e| TarmacError::Transfer {
                message: format!("failed to run {}: {e}", self.program),
            })?;

        if !output.status.success() {
            tracing::warn!(program = %self.program, verb, status = ?output.status.code(), "transfer tool failed");
        }

        Ok(TransferOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code().unwrap_or(-1),
        })
    }
}

impl Transfer for CommandTransfer {
    fn store(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError> {
        self.run("put", &local.display().to_string(), remote)
    }

    fn fetch(&self, remote: &str, local: &Path) -> Result<TransferOutput, TarmacError> {
        self.run("get", remote, &local.display().to_string())
    }
}

/// Remote location of a reservation document:
/// `/<root>/<username>/<username>-<reservation>.<ext>`.
pub fn remote_path(root: &str, username: &str, reservation: i64, ext: &str) -> String {
    format!(
        "/{}/{username}/{username}-{reservation}.{ext}",
        root.trim_matches('/'),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_path_has_expected_shape() {
        assert_eq!(
            remote_path("tarmac", "alice", 9001, "pdf"),
            "/tarmac/alice/alice-9001.pdf"
        );
    }

    #[test]
    fn remote_path_normalizes_root_slashes() {
        assert_eq!(
            remote_path("/docs/", "bob", 7, "txt"),
            "/docs/bob/bob-7.txt"
        );
    }

    #[test]
    fn command_transfer_surfaces_stdout_and_status() {
        let transfer = CommandTransfer::new("echo");
        let out = transfer
            .store("/tarmac/alice/alice-1.pdf", Path::new("/tmp/doc.pdf"))
            .unwrap();
        assert_eq!(out.status, 0);
        assert_eq!(out.stdout.trim(), "put /tmp/doc.pdf /tarmac/alice/alice-1.pdf");
        assert!(out.stderr.is_empty());
    }

    #[test]
    fn missing_tool_is_a_transfer_error() {
        let transfer = CommandTransfer::new("tarmac-no-such-tool");
        let err = transfer
            .fetch("/tarmac/alice/alice-1.pdf", Path::new("/tmp/doc.pdf"))
            .unwrap_err();
        assert!(matches!(err, TarmacError::Transfer { .. }));
    }
}
