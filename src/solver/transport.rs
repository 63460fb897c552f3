// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::io::{self, BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use crate::errors::{SolverError, SolverResult};

/// A line-oriented, blocking channel to a solver.
pub trait SolverTransport: Send {
    /// Write `text` and flush it.
    fn send(&mut self, text: &str) -> io::Result<()>;

    /// Next output line without its terminator, or `None` at end of stream.
    fn read_line(&mut self) -> io::Result<Option<String>>;
}

/// A solver child process reached over its stdin/stdout.
pub struct ProcessTransport {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessTransport {
    pub fn spawn(command: &str, args: &[String]) -> SolverResult<Self> {
        let spawn_failed = |source: io::Error| SolverError::SpawnFailed {
            command: command.to_string(),
            source,
        };

        let mut child = Command::new(command)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(spawn_failed)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_failed(io::Error::new(io::ErrorKind::BrokenPipe, "stdin not piped")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_failed(io::Error::new(io::ErrorKind::BrokenPipe, "stdout not piped")))?;

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }
}

impl SolverTransport for ProcessTransport {
    fn send(&mut self, text: &str) -> io::Result<()> {
        self.stdin.write_all(text.as_bytes())?;
        self.stdin.flush()
    }

    /// Bytes that are not UTF-8 are replaced, so a garbled line never stops
    /// the read short of its terminator.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut bytes = Vec::new();
        if self.stdout.read_until(b'\n', &mut bytes)? == 0 {
            return Ok(None);
        }
        let line = String::from_utf8_lossy(&bytes);
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }
}

impl Drop for ProcessTransport {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_through_cat() {
        let mut transport = ProcessTransport::spawn("cat", &[]).unwrap();
        transport.send("(check-sat)\r\nsecond\n").unwrap();
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("(check-sat)"));
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_invalid_utf8_is_replaced_not_fatal() {
        let script = "printf '\\377\\nfirst\\n'".to_string();
        let mut transport = ProcessTransport::spawn("sh", &["-c".to_string(), script]).unwrap();
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("\u{FFFD}"));
        assert_eq!(transport.read_line().unwrap().as_deref(), Some("first"));
        assert!(transport.read_line().unwrap().is_none());
    }

    #[test]
    fn test_end_of_stream_is_none() {
        let mut transport = ProcessTransport::spawn("true", &[]).unwrap();
        assert!(transport.read_line().unwrap().is_none());
    }

    #[test]
    fn test_missing_binary_is_spawn_failure() {
        let err = ProcessTransport::spawn("/nonexistent/solver", &[]).err().unwrap();
        assert!(matches!(err, SolverError::SpawnFailed { .. }));
        assert!(err.to_string().contains("/nonexistent/solver"));
    }
}
