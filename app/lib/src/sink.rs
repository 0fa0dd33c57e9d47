//! Output sinks receiving user-facing messages.
//!
//! The converter never prints; it appends every message to the sink it is
//! given, so a terminal, a log, or a GUI text area can all be plugged in.

use std::io::Write;
use std::sync::mpsc::Sender;

/// Something that accepts user-facing messages.
pub trait OutputSink {
    /// Append one message.
    fn append(&mut self, message: &str);
}

/// Collects messages in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    messages: Vec<String>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    /// Remove all messages.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl OutputSink for MemorySink {
    fn append(&mut self, message: &str) {
        self.messages.push(message.to_string());
    }
}

/// Writes each message as a line to an `io::Write`.
///
/// Write failures are logged and otherwise ignored.
#[derive(Debug)]
pub struct WriterSink<W: Write> {
    inner: W,
}

impl<W: Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Unwrap the writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> OutputSink for WriterSink<W> {
    fn append(&mut self, message: &str) {
        if let Err(e) = writeln!(self.inner, "{}", message).and_then(|_| self.inner.flush()) {
            log::warn!("failed to write output message: {}", e);
        }
    }
}

/// Forwards messages over a channel, for sinks living on another thread.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: Sender<String>,
}

impl ChannelSink {
    /// Create a sink sending into `sender`.
    pub fn new(sender: Sender<String>) -> Self {
        Self { sender }
    }
}

impl OutputSink for ChannelSink {
    fn append(&mut self, message: &str) {
        // The receiver may already be gone; the message is then dropped.
        let _ = self.sender.send(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_memory_sink() {
        let mut sink = MemorySink::new();
        sink.append("one");
        sink.append("two");
        assert_eq!(sink.messages(), ["one", "two"]);
        sink.clear();
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.append("hello");
        sink.append("world");
        assert_eq!(sink.into_inner(), b"hello\nworld\n");
    }

    #[test]
    fn test_channel_sink() {
        let (tx, rx) = mpsc::channel();
        let mut sink = ChannelSink::new(tx);
        sink.append("queued");
        drop(sink);
        assert_eq!(rx.iter().collect::<Vec<_>>(), vec!["queued".to_string()]);
    }

    #[test]
    fn test_channel_sink_without_receiver() {
        let (tx, rx) = mpsc::channel::<String>();
        drop(rx);
        ChannelSink::new(tx).append("dropped");
    }
}
