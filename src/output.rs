//! Console narration for the workflow.
//!
//! No process-wide logger statics: the sink is an explicit [`Reporter`]
//! instance handed to the workflow, so tests can swap in a capture buffer
//! and assert on what was narrated.

use std::io::Write;
use std::sync::Arc;

use colored::Colorize;
use parking_lot::Mutex;

/// A console reporter with a swappable output sink.
///
/// Clones share the same sink.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Reporter {
    /// Reporter writing to standard output.
    pub fn stdout() -> Self {
        Self::with_sink(std::io::stdout())
    }

    /// Reporter writing to the given sink.
    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Arc::new(Mutex::new(Box::new(sink))),
        }
    }

    /// Reporter writing into an in-memory buffer, returned alongside a
    /// handle for reading it back. Used by tests.
    pub fn capture() -> (Self, CaptureHandle) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let handle = CaptureHandle(Arc::clone(&buffer));
        (Self::with_sink(BufferSink(buffer)), handle)
    }

    /// Print a section banner.
    pub fn section(&self, title: &str) {
        let header = format!("==> {}", title);
        let rule = "=".repeat(72_usize.saturating_sub(header.len()));
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "\n{} {}", header.bright_white().bold(), rule.bright_black());
    }

    /// Print a narrative line.
    pub fn info(&self, msg: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "    {}", msg);
    }

    /// Print a warning line.
    pub fn warn(&self, msg: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "    {}: {}", "warning".yellow(), msg);
    }

    /// Print an error line.
    pub fn error(&self, msg: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(sink, "    {}: {}", "error".red().bold(), msg);
    }

    /// Narrate a created or fetched resource by name and id.
    pub fn resource(&self, verb: &str, name: &str, id: &str) {
        let mut sink = self.sink.lock();
        let _ = writeln!(
            sink,
            "    {} {} {}",
            verb.green(),
            name.bright_white().bold(),
            format!("({})", id).bright_black()
        );
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::stdout()
    }
}

/// Read side of a capturing [`Reporter`].
pub struct CaptureHandle(Arc<Mutex<Vec<u8>>>);

impl CaptureHandle {
    /// Everything written so far, lossily decoded.
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

struct BufferSink(Arc<Mutex<Vec<u8>>>);

impl Write for BufferSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_sees_all_levels() {
        let (reporter, handle) = Reporter::capture();
        reporter.section("PROVISION");
        reporter.info("creating resource group");
        reporter.warn("name collision possible");
        reporter.error("boom");
        reporter.resource("Created", "rg1", "/subscriptions/s/resourceGroups/rg1");

        let out = handle.contents();
        assert!(out.contains("PROVISION"));
        assert!(out.contains("creating resource group"));
        assert!(out.contains("name collision possible"));
        assert!(out.contains("boom"));
        assert!(out.contains("rg1"));
    }

    #[test]
    fn test_clones_share_sink() {
        let (reporter, handle) = Reporter::capture();
        let clone = reporter.clone();
        reporter.info("one");
        clone.info("two");
        let out = handle.contents();
        assert!(out.contains("one"));
        assert!(out.contains("two"));
    }
}
