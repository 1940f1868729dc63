//! Polling-based device observation.
//!
//! The gateway proxy has no push channel, so the observer polls the
//! roster and emits a [`DeviceEvent`] stream over an mpsc channel.
//! Every present device yields an `Updated` event each round; the
//! bridge core suppresses unchanged attributes, so redundant updates
//! are cheap. Devices that vanish from the roster yield `Removed`.

use crate::client::GatewayClient;
use std::collections::HashSet;
use std::time::Duration;
use tokio::sync::mpsc;
use tradfri2mqtt_core::DeviceEvent;

/// Polling observer for the gateway device roster.
pub struct GatewayObserver {
    client: GatewayClient,
    poll_interval: Duration,
}

impl GatewayObserver {
    /// Create a new observer.
    #[must_use]
    pub fn new(client: GatewayClient, poll_interval: Duration) -> Self {
        Self {
            client,
            poll_interval,
        }
    }

    /// Start polling and return the device event stream.
    ///
    /// Events are delivered in arrival order to a single consumer.
    /// Dropping the receiver stops the poll loop; this is the
    /// observation half of shutdown.
    #[must_use]
    pub fn start(self) -> mpsc::Receiver<DeviceEvent> {
        let (tx, rx) = mpsc::channel(64);

        tokio::spawn(async move {
            let mut known = HashSet::new();
            loop {
                if !self.poll_round(&tx, &mut known).await {
                    tracing::debug!("Event receiver dropped, stopping observer");
                    return;
                }
                tokio::time::sleep(self.poll_interval).await;
            }
        });

        rx
    }

    /// Run one poll round. Returns `false` once the receiver is gone.
    async fn poll_round(&self, tx: &mpsc::Sender<DeviceEvent>, known: &mut HashSet<u32>) -> bool {
        let roster = match self.client.device_ids().await {
            Ok(roster) => roster,
            Err(e) => {
                // Keep the previous roster; retry next round.
                tracing::error!(error = %e, "Roster fetch failed");
                return true;
            }
        };

        for id in vanished(known, &roster) {
            tracing::info!(device_id = id, "Device removed from roster");
            if tx.send(DeviceEvent::Removed(id)).await.is_err() {
                return false;
            }
        }

        for &id in &roster {
            match self.client.device(id).await {
                Ok(snapshot) => {
                    if tx.send(DeviceEvent::Updated(snapshot)).await.is_err() {
                        return false;
                    }
                }
                Err(e) => {
                    // Malformed or unreachable accessory: skip it this
                    // round, keep processing the rest of the roster.
                    tracing::warn!(device_id = id, error = %e, "Skipping device this round");
                }
            }
        }

        *known = roster.into_iter().collect();
        true
    }
}

/// Ids present in the previous roster but absent from the current one,
/// in ascending order for deterministic removal events.
fn vanished(known: &HashSet<u32>, roster: &[u32]) -> Vec<u32> {
    let current: HashSet<u32> = roster.iter().copied().collect();
    let mut gone: Vec<u32> = known.difference(&current).copied().collect();
    gone.sort_unstable();
    gone
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vanished_reports_missing_ids_sorted() {
        let known: HashSet<u32> = [65537, 65538, 65539].into_iter().collect();
        assert_eq!(vanished(&known, &[65538]), vec![65537, 65539]);
    }

    #[test]
    fn vanished_is_empty_for_unchanged_roster() {
        let known: HashSet<u32> = [65537, 65538].into_iter().collect();
        assert!(vanished(&known, &[65538, 65537]).is_empty());
    }

    #[test]
    fn vanished_ignores_new_ids() {
        let known: HashSet<u32> = [65537].into_iter().collect();
        assert!(vanished(&known, &[65537, 65540]).is_empty());
    }

    #[test]
    fn first_roster_reports_nothing_removed() {
        let known = HashSet::new();
        assert!(vanished(&known, &[65537, 65538]).is_empty());
    }
}
