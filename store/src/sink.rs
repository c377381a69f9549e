use std::fmt;

use tokio::sync::mpsc;
use tracing::info;

use crate::error::{Error, Result};
use crate::snapshot::Snapshot;

/// Destination for snapshots taken by a [`Reporter`](crate::Reporter).
pub trait RecordSink: Send + Sync {
    fn emit(&self, snapshot: &Snapshot) -> Result<()>;
}

/// Writes every record as one structured `tracing` event.
#[derive(Debug, Clone)]
pub struct LogSink {
    separator: String,
}

impl LogSink {
    pub fn new(separator: impl Into<String>) -> Self {
        Self {
            separator: separator.into(),
        }
    }
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new("/")
    }
}

impl RecordSink for LogSink {
    fn emit(&self, snapshot: &Snapshot) -> Result<()> {
        for record in snapshot {
            let value = serde_json::to_string(&record.value)?;

            info!(
                metric = %record.name(&self.separator),
                kind = %record.kind,
                value = %value,
                "metric"
            );
        }

        Ok(())
    }
}

/// Forwards snapshots to an unbounded channel.
pub struct ChannelSink {
    sender: mpsc::UnboundedSender<Snapshot>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Snapshot>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl fmt::Debug for ChannelSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelSink")
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}

impl RecordSink for ChannelSink {
    fn emit(&self, snapshot: &Snapshot) -> Result<()> {
        self.sender
            .send(snapshot.clone())
            .map_err(|_| Error::SinkClosed)
    }
}
