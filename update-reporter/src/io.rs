use std::sync::{Arc, Mutex};

/// Where per-service status lines go. Injected so tests and embedders can
/// capture output without a terminal.
pub trait OutputSink: Send + Sync {
    fn write_line(&self, line: &str);
    fn write_error_line(&self, line: &str);
}

/// Swallows everything. The default sink.
pub struct NullSink;

impl OutputSink for NullSink {
    fn write_line(&self, _line: &str) {}
    fn write_error_line(&self, _line: &str) {}
}

/// Writes status lines to stdout and error lines to stderr.
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_line(&self, line: &str) {
        println!("{line}");
    }

    fn write_error_line(&self, line: &str) {
        eprintln!("{line}");
    }
}

/// Collects lines in memory for inspection.
#[derive(Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    error_lines: Mutex<Vec<String>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().expect("sink lock poisoned").clone()
    }

    pub fn error_lines(&self) -> Vec<String> {
        self.error_lines.lock().expect("sink lock poisoned").clone()
    }
}

impl OutputSink for MemorySink {
    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .expect("sink lock poisoned")
            .push(line.to_string());
    }

    fn write_error_line(&self, line: &str) {
        self.error_lines
            .lock()
            .expect("sink lock poisoned")
            .push(line.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Style {
    #[default]
    Normal,
    /// Machine-readable mode: status lines are suppressed so stdout stays
    /// parseable.
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    Quiet,
    #[default]
    Normal,
    Verbose,
}

/// Diagnostic-output capability handed to every service before delivery.
#[derive(Clone)]
pub struct OutputBehavior {
    pub style: Style,
    pub verbosity: Verbosity,
    sink: Arc<dyn OutputSink>,
}

impl OutputBehavior {
    pub fn new(style: Style, verbosity: Verbosity, sink: Arc<dyn OutputSink>) -> Self {
        Self {
            style,
            verbosity,
            sink,
        }
    }

    /// Status line for skip/send/success events. Suppressed in machine
    /// output and below normal verbosity.
    pub fn status(&self, line: &str) {
        if self.style == Style::Json || self.verbosity < Verbosity::Normal {
            return;
        }
        self.sink.write_line(line);
    }

    /// Error line for failed deliveries. Emitted even in machine output,
    /// suppressed only when quiet.
    pub fn error(&self, line: &str) {
        if self.verbosity < Verbosity::Normal {
            return;
        }
        self.sink.write_error_line(line);
    }
}

impl std::fmt::Debug for OutputBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputBehavior")
            .field("style", &self.style)
            .field("verbosity", &self.verbosity)
            .finish_non_exhaustive()
    }
}

impl Default for OutputBehavior {
    fn default() -> Self {
        Self::new(Style::Normal, Verbosity::Normal, Arc::new(NullSink))
    }
}

/// Cross-cutting run options injected into every service.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Render reports but skip the network call, treating delivery as
    /// successful.
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_reaches_sink_at_normal_verbosity() {
        let sink = Arc::new(MemorySink::new());
        let behavior = OutputBehavior::new(Style::Normal, Verbosity::Normal, sink.clone());
        behavior.status("sending");
        assert_eq!(sink.lines(), vec!["sending"]);
    }

    #[test]
    fn status_suppressed_in_json_style() {
        let sink = Arc::new(MemorySink::new());
        let behavior = OutputBehavior::new(Style::Json, Verbosity::Normal, sink.clone());
        behavior.status("sending");
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn status_suppressed_when_quiet() {
        let sink = Arc::new(MemorySink::new());
        let behavior = OutputBehavior::new(Style::Normal, Verbosity::Quiet, sink.clone());
        behavior.status("sending");
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn error_emitted_in_json_style() {
        let sink = Arc::new(MemorySink::new());
        let behavior = OutputBehavior::new(Style::Json, Verbosity::Normal, sink.clone());
        behavior.error("failed");
        assert_eq!(sink.error_lines(), vec!["failed"]);
    }

    #[test]
    fn default_behavior_swallows_output() {
        let behavior = OutputBehavior::default();
        behavior.status("into the void");
        behavior.error("also into the void");
    }
}
