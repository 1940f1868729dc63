//! Change-gated attribute publishing.
//!
//! [`ChangePublisher`] is the only owner of the attribute cache. Each
//! `publish_if_changed` call records the value in the cache first and
//! only touches the sink when the value actually differs from the last
//! one handed to the sink. The cache update is optimistic: a failed
//! publish does not roll it back, so a burst of identical updates
//! during a broker hiccup enqueues at most once per change. Failures
//! are handed to the [`ErrorReporter`] and never reach the caller.

use async_trait::async_trait;
use tradfri2mqtt_core::{attribute_path, AttributeCache};

/// Error surfaced by a publish sink.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PublishError {
    /// Transport-level failure
    #[error("transport error: {0}")]
    Transport(String),
}

/// Asynchronous topic/value sink, typically an MQTT client.
///
/// Implementations may report a broker-assigned delivery identifier as
/// success; the bridge discards it.
#[async_trait]
pub trait PublishSink: Send + Sync {
    /// Publish one value under a topic path.
    async fn publish(&self, topic: &str, value: &str) -> Result<(), PublishError>;
}

/// Context attached to a reported publish failure.
#[derive(Debug)]
pub struct PublishContext<'a> {
    /// Reporting component name
    pub component: &'static str,
    /// Device the attribute belongs to
    pub device_id: u32,
    /// Attribute key
    pub key: &'a str,
    /// Rendered value that failed to publish
    pub value: &'a str,
}

/// Fire-and-forget failure reporting collaborator.
pub trait ErrorReporter: Send + Sync {
    /// Report one failed publish. Must not block or fail.
    fn report(&self, ctx: &PublishContext<'_>, cause: &PublishError);
}

/// Reporter that writes failures to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl ErrorReporter for LogReporter {
    fn report(&self, ctx: &PublishContext<'_>, cause: &PublishError) {
        tracing::error!(
            component = ctx.component,
            device_id = ctx.device_id,
            key = ctx.key,
            value = ctx.value,
            error = %cause,
            "Publish failed"
        );
    }
}

/// Publishes attribute values that differ from the last published one.
pub struct ChangePublisher<S, R> {
    cache: AttributeCache,
    sink: S,
    reporter: R,
}

impl<S: PublishSink, R: ErrorReporter> ChangePublisher<S, R> {
    /// Create a publisher with a fresh cache.
    pub fn new(sink: S, reporter: R) -> Self {
        Self {
            cache: AttributeCache::new(),
            sink,
            reporter,
        }
    }

    /// Publish one attribute if its value changed since the last publish.
    ///
    /// Never fails: unchanged values are skipped silently, sink failures
    /// are reported and swallowed so one bad attribute cannot block the
    /// rest of a device's projection or other devices.
    pub async fn publish_if_changed(
        &mut self,
        device_id: u32,
        key: &str,
        value: &str,
        base_path: &str,
    ) {
        if !self.cache.observe(device_id, key, value) {
            tracing::trace!(device_id, key, "Value unchanged, skipping publish");
            return;
        }

        let topic = attribute_path(base_path, key);
        tracing::debug!(topic = %topic, value, "Publishing changed attribute");

        if let Err(cause) = self.sink.publish(&topic, value).await {
            self.reporter.report(
                &PublishContext {
                    component: "ChangePublisher",
                    device_id,
                    key,
                    value,
                },
                &cause,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct RecordingSink {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl PublishSink for RecordingSink {
        async fn publish(&self, topic: &str, value: &str) -> Result<(), PublishError> {
            self.calls
                .lock()
                .unwrap()
                .push((topic.to_string(), value.to_string()));
            Ok(())
        }
    }

    /// Fails every publish to a topic containing the given fragment.
    #[derive(Clone)]
    struct FlakySink {
        failing_fragment: &'static str,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    #[async_trait]
    impl PublishSink for FlakySink {
        async fn publish(&self, topic: &str, value: &str) -> Result<(), PublishError> {
            if topic.contains(self.failing_fragment) {
                return Err(PublishError::Transport("connection reset".to_string()));
            }
            self.calls
                .lock()
                .unwrap()
                .push((topic.to_string(), value.to_string()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct RecordingReporter {
        reports: Arc<Mutex<Vec<(u32, String, String)>>>,
    }

    impl ErrorReporter for RecordingReporter {
        fn report(&self, ctx: &PublishContext<'_>, _cause: &PublishError) {
            self.reports.lock().unwrap().push((
                ctx.device_id,
                ctx.key.to_string(),
                ctx.value.to_string(),
            ));
        }
    }

    #[tokio::test]
    async fn identical_value_publishes_once() {
        let sink = RecordingSink::default();
        let calls = sink.calls.clone();
        let mut publisher = ChangePublisher::new(sink, LogReporter);

        publisher
            .publish_if_changed(7, "dimmer", "50", "tradfri/lightbulb/7")
            .await;
        publisher
            .publish_if_changed(7, "dimmer", "50", "tradfri/lightbulb/7")
            .await;

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("tradfri/lightbulb/7/dimmer".to_string(), "50".to_string())]
        );
    }

    #[tokio::test]
    async fn changed_value_publishes_again() {
        let sink = RecordingSink::default();
        let calls = sink.calls.clone();
        let mut publisher = ChangePublisher::new(sink, LogReporter);

        publisher
            .publish_if_changed(7, "dimmer", "50", "tradfri/lightbulb/7")
            .await;
        publisher
            .publish_if_changed(7, "dimmer", "80", "tradfri/lightbulb/7")
            .await;

        assert_eq!(calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn sink_failure_is_reported_not_raised() {
        let sink = FlakySink {
            failing_fragment: "onOff",
            calls: Arc::default(),
        };
        let reporter = RecordingReporter::default();
        let reports = reporter.reports.clone();
        let mut publisher = ChangePublisher::new(sink, reporter);

        publisher
            .publish_if_changed(5, "onOff", "true", "tradfri/plug/5")
            .await;

        let reports = reports.lock().unwrap();
        assert_eq!(
            *reports,
            vec![(5, "onOff".to_string(), "true".to_string())]
        );
    }

    #[tokio::test]
    async fn failure_does_not_block_other_attributes() {
        let sink = FlakySink {
            failing_fragment: "onOff",
            calls: Arc::default(),
        };
        let calls = sink.calls.clone();
        let mut publisher = ChangePublisher::new(sink, RecordingReporter::default());

        publisher
            .publish_if_changed(5, "onOff", "true", "tradfri/plug/5")
            .await;
        publisher
            .publish_if_changed(5, "dimmer", "50", "tradfri/plug/5")
            .await;

        let calls = calls.lock().unwrap();
        assert_eq!(
            *calls,
            vec![("tradfri/plug/5/dimmer".to_string(), "50".to_string())]
        );
    }

    #[tokio::test]
    async fn failed_publish_is_not_retried_on_identical_update() {
        // The cache is updated before the sink outcome is known, so an
        // identical value after a failure is still considered published.
        let sink = FlakySink {
            failing_fragment: "onOff",
            calls: Arc::default(),
        };
        let reporter = RecordingReporter::default();
        let reports = reporter.reports.clone();
        let mut publisher = ChangePublisher::new(sink, reporter);

        publisher
            .publish_if_changed(5, "onOff", "true", "tradfri/plug/5")
            .await;
        publisher
            .publish_if_changed(5, "onOff", "true", "tradfri/plug/5")
            .await;

        assert_eq!(reports.lock().unwrap().len(), 1);
    }
}
