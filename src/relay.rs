//! Forwards the in-process change stream to NATS so other processes can follow
//! catalog changes. Each event is published as JSON on its own subject.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::bus::EventBus;
use crate::domain::events::CatalogEvent;

/// Serialized form of an event: subject and JSON payload.
pub fn encode(event: &CatalogEvent) -> Result<(String, Vec<u8>), serde_json::Error> {
    Ok((event.change.subject(), serde_json::to_vec(event)?))
}

pub fn spawn(bus: &EventBus, client: async_nats::Client) -> JoinHandle<()> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            let event = match rx.recv().await {
                Ok(event) => event,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "nats relay lagged, events dropped");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            let (subject, payload) = match encode(&event) {
                Ok(encoded) => encoded,
                Err(e) => {
                    tracing::warn!(error = %e, "could not encode catalog event");
                    continue;
                }
            };
            if let Err(e) = client.publish(subject.clone(), payload.into()).await {
                tracing::warn!(%subject, error = %e, "nats publish failed");
            }
        }
        tracing::info!("nats relay stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::events::CategoryChange;

    #[test]
    fn test_encode_uses_change_subject() {
        let event = CatalogEvent::now(CategoryChange::FeaturedChanged { category_id: "c1".into(), featured: true }.into());
        let (subject, payload) = encode(&event).unwrap();
        assert_eq!(subject, "catalog.category.featured_changed");
        let json: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        assert_eq!(json["change"]["type"], "category");
        assert_eq!(json["change"]["kind"], "featured_changed");
        assert_eq!(json["change"]["categoryId"], "c1");
    }
}
