use chrono::Utc;
use team_explore::adapters::inbound::{FileEventStore, InMemoryEventStore};
use team_explore::common::{EventEnvelope, EventMetadata, EventStore, GridPoint};
use team_explore::domains::agent::{CompletionReason, ExplorationEvent, RandomStepReason, Role};
use team_explore::domains::exploration::MissionProjection;
use tempfile::TempDir;
use uuid::Uuid;

fn envelope(event: ExplorationEvent, run_id: Uuid) -> EventEnvelope {
    EventEnvelope::new(&event, "ExplorationAgent", EventMetadata::for_run(run_id, "test")).unwrap()
}

fn explorer_history(run_id: Uuid) -> Vec<EventEnvelope> {
    vec![
        envelope(
            ExplorationEvent::AgentRegistered {
                agent_id: 3,
                role: Role::Explorer,
                location: GridPoint::new(1, 1),
                tick: 0,
                timestamp: Utc::now(),
            },
            run_id,
        ),
        envelope(
            ExplorationEvent::RandomStepTaken {
                agent_id: 3,
                reason: RandomStepReason::Startup,
                to: GridPoint::new(2, 2),
                tick: 1,
                timestamp: Utc::now(),
            },
            run_id,
        ),
        envelope(
            ExplorationEvent::RandomStepTaken {
                agent_id: 3,
                reason: RandomStepReason::NoPathFound,
                to: GridPoint::new(3, 2),
                tick: 7,
                timestamp: Utc::now(),
            },
            run_id,
        ),
        envelope(
            ExplorationEvent::MissionCompleted {
                agent_id: 3,
                reason: CompletionReason::NoFrontiers,
                tick: 9,
                timestamp: Utc::now(),
            },
            run_id,
        ),
    ]
}

async fn exercise_store(store: &dyn EventStore) {
    let run_id = Uuid::new_v4();
    let history = explorer_history(run_id);

    store.append_events("agent-3", 0, history[..2].to_vec()).await.unwrap();
    let stale = store.append_events("agent-3", 0, history[2..].to_vec()).await;
    assert!(stale.unwrap_err().contains("Version mismatch"));
    store.append_events("agent-3", 2, history[2..].to_vec()).await.unwrap();

    let all = store.load_events("agent-3", 0).await.unwrap();
    assert_eq!(all.len(), 4);
    assert_eq!(all[0].event_type, "AgentRegistered");
    assert_eq!(all[0].metadata.run_id, run_id);
    assert_eq!(store.load_events("agent-3", 3).await.unwrap().len(), 1);
    assert!(store.load_events("agent-9", 0).await.unwrap().is_empty());

    let steps = store.load_events_by_type("RandomStepTaken", None).await.unwrap();
    assert_eq!(steps.len(), 2);
    let late_steps = store.load_events_by_type("RandomStepTaken", Some(5)).await.unwrap();
    assert_eq!(late_steps.len(), 1);
    assert_eq!(late_steps[0].tick, 7);

    let projection = MissionProjection::from_envelopes(&all).unwrap();
    let progress = &projection.agents[&3];
    assert_eq!(progress.role, Some(Role::Explorer));
    assert_eq!(progress.random_steps, 2);
    assert_eq!(progress.startup_steps, 1);
    assert_eq!(progress.completed_at, Some(9));
    assert_eq!(progress.completion_reason, Some(CompletionReason::NoFrontiers));
    assert_eq!(projection.events_seen, 4);
    assert_eq!(projection.last_tick, 9);
    assert!(projection.explorers_complete());
}

#[tokio::test]
async fn test_in_memory_event_store() {
    let store = InMemoryEventStore::new();
    exercise_store(&store).await;
    assert_eq!(store.total_events().await, 4);
    assert_eq!(store.aggregate_ids().await, vec!["agent-3".to_string()]);
}

#[tokio::test]
async fn test_file_event_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let store = FileEventStore::new(dir.path().join("events"));
    exercise_store(&store).await;

    let reopened = FileEventStore::new(dir.path().join("events"));
    let events = reopened.load_events("agent-3", 0).await.unwrap();
    assert_eq!(events.len(), 4);
    assert!(reopened.base_path().join("agent-3.jsonl").exists());
}

#[tokio::test]
async fn test_projection_rejects_foreign_payload() {
    let mut bogus = explorer_history(Uuid::new_v4()).remove(0);
    bogus.event_data = serde_json::json!({ "NotAnEvent": {} });
    assert!(MissionProjection::from_envelopes(&[bogus]).is_err());
}

#[test]
fn test_projection_without_explorers_is_not_complete() {
    let mut projection = MissionProjection::new();
    projection.apply(&ExplorationEvent::AgentRegistered {
        agent_id: 2,
        role: Role::Relay,
        location: GridPoint::new(1, 1),
        tick: 0,
        timestamp: Utc::now(),
    });
    projection.apply(&ExplorationEvent::MissionCompleted {
        agent_id: 2,
        reason: CompletionReason::FollowingChild,
        tick: 0,
        timestamp: Utc::now(),
    });
    assert!(!projection.explorers_complete());
}
