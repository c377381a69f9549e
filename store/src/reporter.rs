use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::config::ReporterConfig;
use crate::error::Result;
use crate::sink::RecordSink;
use crate::snapshot::Snapshot;
use crate::store::MetricStore;

/// Periodically snapshots a [`MetricStore`] into a [`RecordSink`].
///
/// The background task is aborted when the reporter is dropped.
pub struct Reporter {
    store: Arc<MetricStore>,
    config: ReporterConfig,
    sink: Arc<dyn RecordSink>,
    task: Option<JoinHandle<()>>,
}

impl Reporter {
    /// Starts reporting on the current tokio runtime. The first snapshot is
    /// taken immediately.
    pub fn spawn(
        store: Arc<MetricStore>,
        config: ReporterConfig,
        sink: Arc<dyn RecordSink>,
    ) -> Self {
        let mut s = Self {
            store,
            config,
            sink,
            task: None,
        };

        s.task = Some(s.load());
        s
    }

    /// Takes one snapshot and emits it, returning the number of records.
    pub fn report_once(&self) -> Result<usize> {
        report(&self.store, &self.config.scope, self.sink.as_ref())
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    fn load(&self) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let sink = Arc::clone(&self.sink);
        let scope = self.config.scope.clone();
        let interval = self.config.interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                match report(&store, &scope, sink.as_ref()) {
                    Ok(records) => debug!(records, "Reported metrics snapshot"),
                    Err(e) => warn!(error = %e, "Failed to report metrics snapshot"),
                }
            }
        })
    }
}

impl Drop for Reporter {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

fn report(store: &MetricStore, scope: &[String], sink: &dyn RecordSink) -> Result<usize> {
    // A scope that does not exist yet reports an empty snapshot
    let snapshot = if scope.is_empty() {
        store.snapshot()
    } else {
        store
            .snapshot_at(scope)
            .unwrap_or_else(|| Snapshot::new(Vec::new()))
    };

    sink.emit(&snapshot)?;
    Ok(snapshot.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::ChannelSink;
    use sluice_metrics::Counter;
    use std::time::Duration;

    fn store() -> Arc<MetricStore> {
        let store = Arc::new(MetricStore::new());
        store
            .fetch_or_store_with(&["node", "pipelines", "main"], "events_in", Counter::new)
            .unwrap();
        store
            .fetch_or_store_with(&["node", "jvm"], "threads", Counter::new)
            .unwrap();
        store
    }

    fn config(scope: &[&str]) -> ReporterConfig {
        ReporterConfig {
            interval: Duration::from_secs(3600),
            scope: scope.iter().map(|s| s.to_string()).collect(),
            ..ReporterConfig::default()
        }
    }

    #[tokio::test]
    async fn test_report_once_whole_store() {
        let (sink, mut receiver) = ChannelSink::new();
        let reporter = Reporter::spawn(store(), config(&[]), Arc::new(sink));

        assert_eq!(reporter.report_once().unwrap(), 2);

        // First tick fires immediately, plus the explicit cycle
        let first = receiver.recv().await.unwrap();
        let second = receiver.recv().await.unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(second.len(), 2);
    }

    #[tokio::test]
    async fn test_report_once_scoped() {
        let (sink, _receiver) = ChannelSink::new();
        let reporter = Reporter::spawn(store(), config(&["node", "jvm"]), Arc::new(sink));

        assert_eq!(reporter.report_once().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_scope_reports_nothing() {
        let (sink, _receiver) = ChannelSink::new();
        let reporter = Reporter::spawn(store(), config(&["node", "missing"]), Arc::new(sink));

        assert_eq!(reporter.report_once().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_drop_stops_the_task() {
        let (sink, mut receiver) = ChannelSink::new();
        let reporter = Reporter::spawn(store(), config(&[]), Arc::new(sink));
        assert!(reporter.is_running());

        drop(reporter);

        // Sink is dropped with the aborted task, closing the channel
        while receiver.recv().await.is_some() {}
    }
}
