//! Bridge orchestration.
//!
//! Consumes the device event stream sequentially: each update is fully
//! projected and published, attribute by attribute, before the next
//! event is handled. Publishes are awaited in projection order, which
//! keeps last-write-wins ordering per topic on the broker side.

use crate::publisher::{ChangePublisher, ErrorReporter, PublishSink};
use tokio::sync::mpsc;
use tradfri2mqtt_core::{project, DeviceEvent, DeviceSnapshot, TopicScheme};

/// The bridge between the device event stream and the publish sink.
pub struct Bridge<S, R> {
    topics: TopicScheme,
    publisher: ChangePublisher<S, R>,
}

impl<S: PublishSink, R: ErrorReporter> Bridge<S, R> {
    /// Create a bridge over the given topic scheme and publisher.
    pub fn new(topics: TopicScheme, publisher: ChangePublisher<S, R>) -> Self {
        Self { topics, publisher }
    }

    /// Consume device events until the stream ends.
    ///
    /// The caller stops the bridge by dropping the sender side (or by
    /// cancelling this future); no background work outlives it.
    pub async fn run(&mut self, mut events: mpsc::Receiver<DeviceEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event).await;
        }
        tracing::info!("Device event stream ended");
    }

    async fn handle(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::Updated(snapshot) => self.handle_update(&snapshot).await,
            DeviceEvent::Removed(device_id) => {
                // Cache entries are kept: a reappearing device must not
                // republish values the broker already has.
                tracing::info!(device_id, "Device removed");
            }
        }
    }

    async fn handle_update(&mut self, snapshot: &DeviceSnapshot) {
        let base = self
            .topics
            .device_base(snapshot.device_type.topic_segment(), snapshot.instance_id);

        for (key, value) in project(snapshot) {
            self.publisher
                .publish_if_changed(snapshot.instance_id, &key, &value, &base)
                .await;
        }
    }
}
