//! Machine-readable output on stdout
//!
//! Everything a caller may parse goes through [`Console`]: the deletion
//! summary, the failure report and one `{"error": "..."}` line per
//! recoverable diagnostic. Human-oriented logging goes to stderr through
//! `tracing` instead, so the two never interleave on the same stream.

use serde_json::Value;
use std::fmt;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::warn;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Line-oriented stdout writer shared by every pipeline stage
#[derive(Clone)]
pub struct Console {
    out: SharedWriter,
}

impl Console {
    pub fn stdout() -> Self {
        Self::from_writer(io::stdout())
    }

    pub fn from_writer(writer: impl Write + Send + 'static) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Console whose output is kept in memory
    pub fn capture() -> (Self, CapturedOutput) {
        let buffer = CapturedOutput::default();
        (Self::from_writer(buffer.clone()), buffer)
    }

    /// Emit a diagnostic line, mirrored to the log at warn level
    pub fn error(&self, message: impl fmt::Display) {
        let message = message.to_string();
        warn!(error = %message, "Recoverable error");
        self.line(&diagnostic_line(&message));
    }

    /// Write one line of output
    pub fn line(&self, text: &str) {
        let mut out = self.out.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // A closed stdout is not worth aborting a deletion run for
        let _ = writeln!(out, "{text}").and_then(|()| out.flush());
    }
}

impl fmt::Debug for Console {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

/// `{"error": "<message>"}` with the message JSON-escaped
pub fn diagnostic_line(message: &str) -> String {
    format!("{{\"error\": {}}}", Value::String(message.to_string()))
}

/// In-memory sink behind [`Console::capture`]
#[derive(Debug, Clone, Default)]
pub struct CapturedOutput(Arc<Mutex<Vec<u8>>>);

impl CapturedOutput {
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|p| p.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    /// Messages of every diagnostic line written so far
    pub fn diagnostics(&self) -> Vec<String> {
        self.lines()
            .iter()
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .filter_map(|v| v.get("error").and_then(Value::as_str).map(str::to_string))
            .collect()
    }
}

impl Write for CapturedOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_line_escapes() {
        assert_eq!(diagnostic_line("boom"), r#"{"error": "boom"}"#);
        assert_eq!(diagnostic_line("say \"hi\""), r#"{"error": "say \"hi\""}"#);
    }

    #[test]
    fn test_capture_collects_lines() {
        let (console, output) = Console::capture();
        console.line("first");
        console.error("something failed");
        assert_eq!(output.lines(), ["first", r#"{"error": "something failed"}"#]);
        assert_eq!(output.diagnostics(), ["something failed"]);
    }
}
