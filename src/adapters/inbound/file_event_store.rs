use crate::common::{EventEnvelope, EventStore};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// File-based EventStore
///
/// Events are stored in JSON Lines format (one envelope per line), one file per
/// aggregate, so a finished run can be replayed or inspected with standard tools.
pub struct FileEventStore {
    base_path: PathBuf,
}

impl FileEventStore {
    pub fn new<P: Into<PathBuf>>(base_path: P) -> Self {
        let base_path = base_path.into();
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn get_file_path(&self, aggregate_id: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", aggregate_id))
    }

    async fn ensure_base_dir(&self) -> Result<(), String> {
        tokio::fs::create_dir_all(&self.base_path)
            .await
            .map_err(|e| format!("Failed to create event store directory: {}", e))
    }

    async fn read_file(path: &Path) -> Result<Vec<EventEnvelope>, String> {
        let file = File::open(path)
            .await
            .map_err(|e| format!("Failed to open event file {}: {}", path.display(), e))?;

        let mut lines = BufReader::new(file).lines();
        let mut events = Vec::new();
        let mut line_number = 0u64;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|e| format!("Failed to read line: {}", e))?
        {
            line_number += 1;
            if line.trim().is_empty() {
                continue;
            }
            let event: EventEnvelope = serde_json::from_str(&line).map_err(|e| {
                format!(
                    "Failed to deserialize event at {}:{}: {}",
                    path.display(),
                    line_number,
                    e
                )
            })?;
            events.push(event);
        }
        Ok(events)
    }
}

#[async_trait]
impl EventStore for FileEventStore {
    async fn append_events(
        &self,
        aggregate_id: &str,
        expected_version: u64,
        events: Vec<EventEnvelope>,
    ) -> Result<(), String> {
        self.ensure_base_dir().await?;

        let file_path = self.get_file_path(aggregate_id);

        let current_version = if tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
            Self::read_file(&file_path).await?.len() as u64
        } else {
            0
        };
        if current_version != expected_version {
            return Err(format!(
                "Version mismatch for {}: expected {}, got {}",
                aggregate_id, expected_version, current_version
            ));
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&file_path)
            .await
            .map_err(|e| format!("Failed to open event file {}: {}", file_path.display(), e))?;

        for event in events {
            let json_line = serde_json::to_string(&event)
                .map_err(|e| format!("Failed to serialize event: {}", e))?;

            file.write_all(json_line.as_bytes())
                .await
                .map_err(|e| format!("Failed to write event: {}", e))?;
            file.write_all(b"\n")
                .await
                .map_err(|e| format!("Failed to write newline: {}", e))?;
        }

        file.flush()
            .await
            .map_err(|e| format!("Failed to flush file: {}", e))?;

        Ok(())
    }

    async fn load_events(
        &self,
        aggregate_id: &str,
        from_version: u64,
    ) -> Result<Vec<EventEnvelope>, String> {
        let file_path = self.get_file_path(aggregate_id);

        if !tokio::fs::try_exists(&file_path).await.unwrap_or(false) {
            return Ok(vec![]);
        }

        Ok(Self::read_file(&file_path)
            .await?
            .into_iter()
            .skip(from_version as usize)
            .collect())
    }

    async fn load_events_by_type(
        &self,
        event_type: &str,
        from_tick: Option<u32>,
    ) -> Result<Vec<EventEnvelope>, String> {
        self.ensure_base_dir().await?;

        let mut all_events = Vec::new();

        let mut dir = tokio::fs::read_dir(&self.base_path)
            .await
            .map_err(|e| format!("Failed to read directory: {}", e))?;

        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| format!("Failed to read directory entry: {}", e))?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("jsonl") {
                continue;
            }
            all_events.extend(
                Self::read_file(&path)
                    .await?
                    .into_iter()
                    .filter(|e| e.event_type == event_type)
                    .filter(|e| from_tick.map(|t| e.tick >= t).unwrap_or(true)),
            );
        }

        all_events.sort_by(|a, b| a.tick.cmp(&b.tick).then(a.occurred_at.cmp(&b.occurred_at)));

        Ok(all_events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::EventMetadata;
    use chrono::Utc;
    use tempfile::TempDir;
    use uuid::Uuid;

    fn envelope(aggregate_id: &str, event_type: &str, tick: u32) -> EventEnvelope {
        EventEnvelope {
            event_id: Uuid::new_v4(),
            aggregate_id: aggregate_id.to_string(),
            aggregate_type: "ExplorationAgent".to_string(),
            event_type: event_type.to_string(),
            tick,
            event_data: serde_json::json!({"test": "data"}),
            metadata: EventMetadata::for_run(Uuid::new_v4(), "test"),
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_file_event_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = FileEventStore::new(temp_dir.path().join("events"));

        let aggregate_id = "agent-3";
        let event = envelope(aggregate_id, "FrontierChosen", 4);

        store
            .append_events(aggregate_id, 0, vec![event.clone()])
            .await
            .unwrap();

        let loaded_events = store.load_events(aggregate_id, 0).await.unwrap();
        assert_eq!(loaded_events.len(), 1);
        assert_eq!(loaded_events[0].event_id, event.event_id);

        let events_by_type = store.load_events_by_type("FrontierChosen", None).await.unwrap();
        assert_eq!(events_by_type.len(), 1);
        assert_eq!(events_by_type[0].event_id, event.event_id);

        // stale writer
        assert!(store
            .append_events(aggregate_id, 0, vec![envelope(aggregate_id, "FrontierChosen", 5)])
            .await
            .is_err());
    }
}
