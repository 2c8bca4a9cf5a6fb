//! Operator messages.
//!
//! Every line Procenv shows to the operator has the shape
//! `[Procenv Message] (<CODE>) <text>`, or `[Procenv Message] <text>` when no
//! code is attached. Codes are short and stable so scripts can grep for them.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Product name rendered in the message prefix.
pub const PRODUCT: &str = "Procenv";

/// A single operator message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Optional short code, e.g. `PE11`
    pub code: Option<String>,
    /// Human readable text
    pub text: String,
}

impl Message {
    /// Create a message with a code.
    pub fn new(code: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            text: text.into(),
        }
    }

    /// Create a message without a code.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            code: None,
            text: text.into(),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code.as_deref() {
            Some(code) if !code.is_empty() => {
                write!(f, "[{PRODUCT} Message] ({code}) {}", self.text)
            }
            _ => write!(f, "[{PRODUCT} Message] {}", self.text),
        }
    }
}

/// Destination for operator messages.
pub trait MessageSink: Send + Sync {
    /// Emit one message as one line.
    fn emit(&self, message: &Message);
}

/// Writes each message to stderr as a single newline-terminated line.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl MessageSink for StderrSink {
    fn emit(&self, message: &Message) {
        let mut stderr = std::io::stderr().lock();
        // A closed stderr leaves nowhere to report to.
        if writeln!(stderr, "{message}").and_then(|_| stderr.flush()).is_err() {
            tracing::debug!(code = ?message.code, "Failed to write operator message");
        }
    }
}

/// Records rendered lines in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered lines, in emission order
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of lines carrying `code`
    pub fn count_code(&self, code: &str) -> usize {
        let needle = format!("({code})");
        self.lines().iter().filter(|l| l.contains(&needle)).count()
    }
}

impl MessageSink for MemorySink {
    fn emit(&self, message: &Message) {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.to_string());
    }
}

/// Cloneable handle checks and runners use to talk to the operator.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn MessageSink>,
}

impl Reporter {
    /// Wrap a sink
    pub fn new(sink: Arc<dyn MessageSink>) -> Self {
        Self { sink }
    }

    /// Reporter writing to stderr
    pub fn stderr() -> Self {
        Self::new(Arc::new(StderrSink))
    }

    /// Emit a coded message.
    pub fn log(&self, code: &str, text: impl Into<String>) {
        self.sink.emit(&Message::new(code, text));
    }

    /// Emit a message without a code.
    pub fn note(&self, text: impl Into<String>) {
        self.sink.emit(&Message::plain(text));
    }
}

impl fmt::Debug for Reporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reporter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_with_code() {
        let message = Message::new("PE99", "Hey mark");
        assert_eq!(message.to_string(), "[Procenv Message] (PE99) Hey mark");
    }

    #[test]
    fn test_message_without_code() {
        assert_eq!(Message::plain("hey").to_string(), "[Procenv Message] hey");
        // An empty code renders like no code at all
        assert_eq!(Message::new("", "ho").to_string(), "[Procenv Message] ho");
    }

    #[test]
    fn test_reporter_records_in_order() {
        let sink = Arc::new(MemorySink::new());
        let reporter = Reporter::new(sink.clone());

        reporter.log("T0", "first");
        reporter.note("second");
        reporter.clone().log("T1", "third");

        assert_eq!(
            sink.lines(),
            vec![
                "[Procenv Message] (T0) first",
                "[Procenv Message] second",
                "[Procenv Message] (T1) third",
            ]
        );
        assert_eq!(sink.count_code("T1"), 1);
        assert_eq!(sink.count_code("T9"), 0);
    }
}
