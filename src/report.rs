//! User-facing progress reporting: ordered, append-only `[Log]`/`[Error]`
//! lines. Developer diagnostics go through the `log` crate instead.

use std::sync::Mutex;

pub trait Reporter: Send + Sync {
    fn log(&self, line: &str);
    fn error(&self, line: &str);
}

/// Prints progress to the terminal.
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn log(&self, line: &str) {
        println!("[Log] {}", line);
    }

    fn error(&self, line: &str) {
        eprintln!("[Error] {}", line);
    }
}

/// Collects lines in memory, preserving order. Used by tests to assert on
/// the exact progress stream a run produced.
#[derive(Default)]
pub struct MemoryReporter {
    lines: Mutex<Vec<String>>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("reporter lock").clone()
    }

    pub fn joined(&self) -> String {
        self.lines().join("\n")
    }
}

impl Reporter for MemoryReporter {
    fn log(&self, line: &str) {
        self.lines
            .lock()
            .expect("reporter lock")
            .push(format!("[Log] {}", line));
    }

    fn error(&self, line: &str) {
        self.lines
            .lock()
            .expect("reporter lock")
            .push(format!("[Error] {}", line));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_reporter_preserves_order_and_tags() {
        let r = MemoryReporter::new();
        r.log("one");
        r.error("two");
        r.log("three");
        assert_eq!(r.lines(), vec!["[Log] one", "[Error] two", "[Log] three"]);
    }
}
