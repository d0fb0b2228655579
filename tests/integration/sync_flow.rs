use crate::fixtures::{campaign_record, created, donated, major, service_with, withdrawn, MockLedger};
use fundsync::application::SyncState;
use fundsync::foundation::{CampaignId, Position};
use std::sync::Arc;

fn seeded_ledger() -> Arc<MockLedger> {
    let ledger = Arc::new(MockLedger::new(0));
    ledger.set_campaigns(vec![
        campaign_record(1, "0xowner1", "10", "7", false),
        campaign_record(2, "0xowner2", "5", "0", true),
    ]);
    ledger.push_event(created(1, 1, "0xowner1"));
    ledger.push_event(created(2, 2, "0xowner2"));
    ledger.push_event(donated(3, 0, 1, "0xa", "3"));
    ledger.push_event(donated(4, 0, 1, "0xb", "4"));
    ledger.push_event(withdrawn(5, 2, "0"));
    ledger
}

#[tokio::test]
async fn initial_load_materializes_full_history() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger, 180);

    service.tick().await.unwrap();

    assert_eq!(service.state().await, SyncState::Steady);
    assert_eq!(service.cursor().await, Position::new(5));

    let snapshot = store.current();
    assert_eq!(snapshot.position, Position::new(5));
    assert_eq!(snapshot.campaigns.len(), 2);

    let one = snapshot.campaign(CampaignId::new(1)).unwrap();
    assert_eq!(one.raised, major("7"));
    assert_eq!(one.title, "campaign 1");
    assert!(one.is_active());

    let two = snapshot.campaign(CampaignId::new(2)).unwrap();
    assert_eq!(two.raised, major("0"));
    assert!(two.withdrawn);

    assert_eq!(snapshot.donations.len(), 2);
    assert!(snapshot.donations.iter().all(|d| d.is_confirmed()));
    // Newest first.
    assert_eq!(snapshot.donations[0].donor.as_str(), "0xb");
}

#[tokio::test]
async fn steady_tick_applies_only_the_delta() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger.clone(), 180);
    service.tick().await.unwrap();

    ledger.push_event(donated(6, 0, 1, "0xc", "1"));
    service.tick().await.unwrap();

    assert_eq!(service.cursor().await, Position::new(6));
    let snapshot = store.current();
    assert_eq!(snapshot.campaign(CampaignId::new(1)).unwrap().raised, major("8"));
    assert_eq!(snapshot.donations.len(), 3);
    // The delta tick asked only for the unseen window.
    assert_eq!(ledger.queried_windows().last(), Some(&(6, 6)));
}

#[tokio::test]
async fn idle_tick_publishes_nothing() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger, 180);
    service.tick().await.unwrap();

    let mut changes = store.subscribe();
    service.tick().await.unwrap();

    assert!(!changes.has_changed().unwrap());
    assert_eq!(service.cursor().await, Position::new(5));
    assert_eq!(service.state().await, SyncState::Steady);
}

#[tokio::test]
async fn ledger_failure_keeps_snapshot_and_cursor() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger.clone(), 180);
    service.tick().await.unwrap();
    let before = store.current();

    ledger.fail_next_position();
    assert!(service.tick().await.is_err());
    assert_eq!(service.state().await, SyncState::Error);
    assert_eq!(*store.current(), *before);
    assert_eq!(service.cursor().await, Position::new(5));

    // Recovery resumes the delta path from the committed cursor instead of
    // re-running the full load.
    ledger.push_event(donated(6, 0, 1, "0xc", "1"));
    service.tick().await.unwrap();
    assert_eq!(service.state().await, SyncState::Steady);
    assert_eq!(store.current().campaign(CampaignId::new(1)).unwrap().raised, major("8"));
    assert_eq!(ledger.queried_windows().last(), Some(&(6, 6)));
}

#[tokio::test]
async fn creation_event_triggers_campaign_metadata_refresh() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger.clone(), 180);
    service.tick().await.unwrap();

    ledger.set_campaigns(vec![
        campaign_record(1, "0xowner1", "10", "7", false),
        campaign_record(2, "0xowner2", "5", "0", true),
        campaign_record(3, "0xowner3", "20", "2", false),
    ]);
    ledger.push_event(created(6, 3, "0xowner3"));
    ledger.push_event(donated(7, 0, 3, "0xd", "2"));
    service.tick().await.unwrap();

    let snapshot = store.current();
    let three = snapshot.campaign(CampaignId::new(3)).unwrap();
    assert_eq!(three.title, "campaign 3");
    assert_eq!(three.goal, major("20"));
    assert_eq!(three.raised, major("2"));
}

#[tokio::test]
async fn force_reload_rebuilds_from_scratch() {
    let ledger = seeded_ledger();
    let (service, store) = service_with(ledger.clone(), 180);
    service.tick().await.unwrap();

    ledger.push_event(donated(6, 0, 1, "0xc", "1"));
    service.force_reload().await.unwrap();

    assert_eq!(service.cursor().await, Position::new(6));
    assert_eq!(store.current().campaign(CampaignId::new(1)).unwrap().raised, major("8"));
    // The reload queried the whole history again.
    assert_eq!(ledger.queried_windows().last(), Some(&(0, 6)));
}
