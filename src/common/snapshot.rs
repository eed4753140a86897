use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// Immutable point-in-time copy of an aggregate's observable state.
///
/// The payload sits behind an `Arc` so a snapshot can be handed to several
/// observers without copying, but it is never aliased with the live aggregate:
/// the payload is built by value when the snapshot is taken.
#[derive(Debug)]
pub struct Snapshot<T> {
    pub snapshot_id: Uuid,
    pub aggregate_id: String,
    pub aggregate_version: u64,
    pub taken_at_tick: u32,
    pub created_at: DateTime<Utc>,
    data: Arc<T>,
}

impl<T> Snapshot<T> {
    pub fn new(aggregate_id: &str, aggregate_version: u64, taken_at_tick: u32, data: T) -> Self {
        Self {
            snapshot_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            aggregate_version,
            taken_at_tick,
            created_at: Utc::now(),
            data: Arc::new(data),
        }
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    /// Ticks elapsed since the snapshot was taken.
    pub fn age(&self, now_tick: u32) -> u32 {
        now_tick.saturating_sub(self.taken_at_tick)
    }
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            snapshot_id: self.snapshot_id,
            aggregate_id: self.aggregate_id.clone(),
            aggregate_version: self.aggregate_version,
            taken_at_tick: self.taken_at_tick,
            created_at: self.created_at,
            data: Arc::clone(&self.data),
        }
    }
}
