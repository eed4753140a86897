use crate::common::{EventEnvelope, EventStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory event store implementation for testing and short runs
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    events: RwLock<HashMap<String, Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self {
            events: RwLock::new(HashMap::new()),
        }
    }

    pub async fn aggregate_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.events.read().await.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub async fn total_events(&self) -> usize {
        self.events.read().await.values().map(|v| v.len()).sum()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        let mut store = self.events.write().await;

        let aggregate_events = store
            .entry(aggregate_id.to_string())
            .or_insert_with(Vec::new);

        let current_version = aggregate_events.len() as u64;
        if current_version != expected_version {
            return Err(format!(
                "Version mismatch for {}: expected {}, got {}",
                aggregate_id, expected_version, current_version
            ));
        }

        aggregate_events.extend(events);
        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        from_version: u64,
    ) -> Result<Vec<EventEnvelope>, String> {
        let store = self.events.read().await;

        Ok(store
            .get(aggregate_id)
            .map(|events| events.iter().skip(from_version as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_tick: Option<u32>,
    ) -> Result<Vec<EventEnvelope>, String> {
        let store = self.events.read().await;

        let mut filtered_events: Vec<EventEnvelope> = store
            .values()
            .flatten()
            .filter(|e| e.event_type == event_type)
            .filter(|e| from_tick.map(|t| e.tick >= t).unwrap_or(true))
            .cloned()
            .collect();

        filtered_events.sort_by(|a, b| a.tick.cmp(&b.tick).then(a.occurred_at.cmp(&b.occurred_at)));

        Ok(filtered_events)
    }
}
