use crate::engine::SqliteStore;
use crate::{AlertLedger, NewReading, ReadingStore};
use chrono::{Duration, Utc};
use plantmon_common::types::{AlertEvent, AlertType, Severity};
use tempfile::TempDir;

fn make_reading(device: &str, temperature: f64, gas_level: f64, secs_ago: i64) -> NewReading {
    NewReading {
        device_id: device.to_string(),
        temperature,
        gas_level,
        timestamp: Utc::now() - Duration::seconds(secs_ago),
    }
}

fn make_event(alert_type: AlertType, severity: Severity) -> AlertEvent {
    AlertEvent {
        alert_type,
        severity,
        message: format!("{alert_type} raised in test"),
    }
}

#[test]
fn append_assigns_monotonic_ids() {
    let store = SqliteStore::open_in_memory().unwrap();
    let first = store.append(&make_reading("dev-1", 25.0, 100.0, 0)).unwrap();
    let second = store.append(&make_reading("dev-1", 26.0, 110.0, 0)).unwrap();
    assert!(second.id > first.id);
}

#[test]
fn recent_returns_newest_first_and_respects_limit() {
    let store = SqliteStore::open_in_memory().unwrap();
    for i in 0..8 {
        // Oldest reading first: 7 seconds ago down to now
        store
            .append(&make_reading("dev-1", 20.0 + i as f64, 100.0, 7 - i))
            .unwrap();
    }
    store.append(&make_reading("dev-2", 99.0, 900.0, 0)).unwrap();

    let rows = store.recent("dev-1", 5).unwrap();
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[0].temperature, 27.0, "newest row first");
    assert_eq!(rows[4].temperature, 23.0);
    assert!(rows.iter().all(|r| r.device_id == "dev-1"));

    // Short history returns fewer rows than asked for
    let rows = store.recent("dev-2", 10).unwrap();
    assert_eq!(rows.len(), 1);
    assert!(store.recent("dev-3", 10).unwrap().is_empty());
}

#[test]
fn all_readings_spans_devices() {
    let store = SqliteStore::open_in_memory().unwrap();
    store.append(&make_reading("dev-1", 25.0, 100.0, 1)).unwrap();
    store.append(&make_reading("dev-2", 30.0, 200.0, 0)).unwrap();

    let rows = store.all_readings().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].device_id, "dev-2", "newest first");
}

#[test]
fn open_alert_dedups_active_rows() {
    let store = SqliteStore::open_in_memory().unwrap();
    let now = Utc::now();
    let event = make_event(AlertType::HighGas, Severity::High);

    let first = store.open_alert("dev-1", &event, now).unwrap();
    assert!(first.is_some(), "first trigger opens a row");

    let second = store.open_alert("dev-1", &event, now).unwrap();
    assert!(second.is_none(), "retrigger while active is a no-op");

    // Same type on another device is independent
    assert!(store.open_alert("dev-2", &event, now).unwrap().is_some());
    // Another type on the same device is independent
    let other = make_event(AlertType::GasAnomaly, Severity::High);
    assert!(store.open_alert("dev-1", &other, now).unwrap().is_some());

    let stats = store.alert_stats().unwrap();
    assert_eq!(stats.total_alerts, 3);
    assert_eq!(stats.active_alerts, 3);
}

#[test]
fn resolve_alerts_flips_matching_group_only() {
    let store = SqliteStore::open_in_memory().unwrap();
    let opened_at = Utc::now() - Duration::seconds(30);
    store
        .open_alert("dev-1", &make_event(AlertType::HighGas, Severity::High), opened_at)
        .unwrap();
    store
        .open_alert("dev-1", &make_event(AlertType::GasAnomaly, Severity::High), opened_at)
        .unwrap();
    store
        .open_alert("dev-1", &make_event(AlertType::HighTemp, Severity::Medium), opened_at)
        .unwrap();
    store
        .open_alert("dev-2", &make_event(AlertType::HighGas, Severity::High), opened_at)
        .unwrap();

    let resolved_at = Utc::now();
    let changed = store
        .resolve_alerts(
            "dev-1",
            &[AlertType::HighGas, AlertType::GasAnomaly, AlertType::GasRollingAnomaly],
            resolved_at,
        )
        .unwrap();
    assert_eq!(changed, 2);

    let active = store.active_alerts(Some("dev-1")).unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].alert_type, AlertType::HighTemp);

    // dev-2's gas alert is untouched
    assert_eq!(store.active_alerts(Some("dev-2")).unwrap().len(), 1);

    let history = store.alert_history(Some("dev-1")).unwrap();
    assert_eq!(history.len(), 2);
    for alert in &history {
        assert!(!alert.is_active);
        let resolved = alert.resolved_at.expect("resolved_at must be stamped");
        assert!(resolved > alert.created_at);
    }

    // Resolving again is idempotent
    let changed = store
        .resolve_alerts("dev-1", &[AlertType::HighGas, AlertType::GasAnomaly], resolved_at)
        .unwrap();
    assert_eq!(changed, 0);
}

#[test]
fn alert_can_reopen_after_resolution() {
    let store = SqliteStore::open_in_memory().unwrap();
    let event = make_event(AlertType::HighTemp, Severity::High);

    store.open_alert("dev-1", &event, Utc::now()).unwrap();
    store
        .resolve_alerts("dev-1", &[AlertType::HighTemp], Utc::now())
        .unwrap();

    // A fresh trigger after resolution opens a new row
    let reopened = store.open_alert("dev-1", &event, Utc::now()).unwrap();
    assert!(reopened.is_some());

    let stats = store.alert_stats().unwrap();
    assert_eq!(stats.total_alerts, 2);
    assert_eq!(stats.active_alerts, 1);
    assert_eq!(stats.resolved_alerts, 1);
}

#[test]
fn stats_on_empty_ledger_are_zero() {
    let store = SqliteStore::open_in_memory().unwrap();
    let stats = store.alert_stats().unwrap();
    assert_eq!(stats.total_alerts, 0);
    assert_eq!(stats.active_alerts, 0);
    assert_eq!(stats.resolved_alerts, 0);
}

#[test]
fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("plantmon.db");

    {
        let store = SqliteStore::open(&db_path).unwrap();
        store.append(&make_reading("dev-1", 25.0, 100.0, 0)).unwrap();
        store
            .open_alert("dev-1", &make_event(AlertType::HighGas, Severity::High), Utc::now())
            .unwrap();
    }

    let store = SqliteStore::open(&db_path).unwrap();
    assert_eq!(store.all_readings().unwrap().len(), 1);
    assert_eq!(store.active_alerts(None).unwrap().len(), 1);
}
