//! Time-limited invocation of external converter programs.
use std::{
    env,
    io::Read,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    sync::mpsc,
    thread,
    time::{Duration, Instant},
};

use tracing::debug;

use crate::error::{AssetError, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const STDERR_GRACE: Duration = Duration::from_millis(500);

/// Search `PATH` for an executable named `program`.
pub fn find_program(program: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        #[cfg(windows)]
        {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

/// Run `program args...` and wait at most `timeout` for it to exit successfully.
///
/// The child is killed when the timeout expires. Standard error is captured and
/// included in the failure reason.
pub fn run_with_timeout(program: &Path, args: &[String], timeout: Duration) -> Result<()> {
    let tool = program
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| program.display().to_string());
    let failure = |reason: String| AssetError::ExternalToolFailure {
        tool: tool.clone(),
        reason,
    };

    debug!(%tool, ?args, "spawning converter");
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| failure(format!("spawn failed: {e}")))?;

    // Drain stderr on a side thread so a chatty tool cannot block on a full
    // pipe. Grandchildren may inherit the pipe and keep it open after the tool
    // exits, so the reader is never joined; stderr is only awaited briefly.
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = child.stderr.take() {
        thread::spawn(move || {
            let mut buf = String::new();
            let _ = pipe.read_to_string(&mut buf);
            let _ = tx.send(buf);
        });
    }
    let collect_stderr = || {
        rx.recv_timeout(STDERR_GRACE)
            .map(|s| s.trim().to_string())
            .unwrap_or_default()
    };

    let started = Instant::now();
    loop {
        let status = match child.try_wait() {
            Ok(status) => status,
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(err.into());
            }
        };
        match status {
            Some(status) if status.success() => return Ok(()),
            Some(status) => {
                let message = collect_stderr();
                return Err(failure(if message.is_empty() {
                    format!("exited with {status}")
                } else {
                    format!("exited with {status}: {message}")
                }));
            }
            None if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(failure(format!("timed out after {timeout:?}")));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    }
}
