use crate::error::{Result, StorageError};
use crate::{AlertLedger, NewReading, ReadingStore};
use chrono::{DateTime, Utc};
use plantmon_common::types::{Alert, AlertEvent, AlertStats, AlertType, SensorReading, Severity};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const READINGS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS sensor_readings (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT NOT NULL,
    temperature REAL NOT NULL,
    gas_level REAL NOT NULL,
    timestamp INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_readings_device_time
    ON sensor_readings(device_id, timestamp DESC);
";

const ALERTS_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS alerts (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    device_id TEXT NOT NULL,
    alert_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    resolved_at INTEGER
);
CREATE INDEX IF NOT EXISTS idx_alerts_device_type_active
    ON alerts(device_id, alert_type, is_active);
CREATE INDEX IF NOT EXISTS idx_alerts_active ON alerts(is_active);
";

/// Single-file SQLite store implementing both persistence seams.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (creating if needed) the database at `path` with WAL mode.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        tracing::debug!(path = %path.display(), "Opened sensor database");
        Self::init(conn)
    }

    /// In-memory store for tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(READINGS_SCHEMA)?;
        conn.execute_batch(ALERTS_SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Lock the connection, recovering from a poisoned Mutex if necessary.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn timestamp_from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}

fn alert_from_parts(
    id: i64,
    device_id: String,
    type_str: String,
    severity_str: String,
    message: String,
    is_active: bool,
    created_ms: i64,
    resolved_ms: Option<i64>,
) -> Result<Alert> {
    let alert_type: AlertType =
        type_str
            .parse()
            .map_err(|detail: String| StorageError::InvalidColumn {
                column: "alert_type",
                detail,
            })?;
    let severity: Severity =
        severity_str
            .parse()
            .map_err(|detail: String| StorageError::InvalidColumn {
                column: "severity",
                detail,
            })?;
    Ok(Alert {
        id,
        device_id,
        alert_type,
        severity,
        message,
        is_active,
        created_at: timestamp_from_millis(created_ms),
        resolved_at: resolved_ms.map(timestamp_from_millis),
    })
}

impl ReadingStore for SqliteStore {
    fn append(&self, reading: &NewReading) -> Result<SensorReading> {
        let conn = self.lock_conn();
        conn.prepare_cached(
            "INSERT INTO sensor_readings (device_id, temperature, gas_level, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
        )?
        .execute(rusqlite::params![
            &reading.device_id,
            reading.temperature,
            reading.gas_level,
            reading.timestamp.timestamp_millis(),
        ])?;
        let id = conn.last_insert_rowid();
        Ok(SensorReading {
            id,
            device_id: reading.device_id.clone(),
            temperature: reading.temperature,
            gas_level: reading.gas_level,
            timestamp: reading.timestamp,
        })
    }

    fn recent(&self, device_id: &str, limit: usize) -> Result<Vec<SensorReading>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, device_id, temperature, gas_level, timestamp FROM sensor_readings
             WHERE device_id = ?1
             ORDER BY timestamp DESC, id DESC LIMIT ?2",
        )?;
        let rows = stmt.query_map(rusqlite::params![device_id, limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, device_id, temperature, gas_level, ts_ms) = row?;
            results.push(SensorReading {
                id,
                device_id,
                temperature,
                gas_level,
                timestamp: timestamp_from_millis(ts_ms),
            });
        }
        Ok(results)
    }

    fn all_readings(&self) -> Result<Vec<SensorReading>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, device_id, temperature, gas_level, timestamp FROM sensor_readings
             ORDER BY timestamp DESC, id DESC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, i64>(4)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, device_id, temperature, gas_level, ts_ms) = row?;
            results.push(SensorReading {
                id,
                device_id,
                temperature,
                gas_level,
                timestamp: timestamp_from_millis(ts_ms),
            });
        }
        Ok(results)
    }
}

impl AlertLedger for SqliteStore {
    fn open_alert(
        &self,
        device_id: &str,
        event: &AlertEvent,
        now: DateTime<Utc>,
    ) -> Result<Option<Alert>> {
        let conn = self.lock_conn();
        let tx = conn.unchecked_transaction()?;

        // Dedup check and insert run in one transaction under the
        // connection lock, so the active-alert invariant holds even with
        // concurrent ingestion.
        let already_active: bool = tx.query_row(
            "SELECT EXISTS(
                 SELECT 1 FROM alerts
                 WHERE device_id = ?1 AND alert_type = ?2 AND is_active = 1
             )",
            rusqlite::params![device_id, event.alert_type.to_string()],
            |row| row.get(0),
        )?;
        if already_active {
            return Ok(None);
        }

        tx.execute(
            "INSERT INTO alerts (device_id, alert_type, severity, message, is_active, created_at, resolved_at)
             VALUES (?1, ?2, ?3, ?4, 1, ?5, NULL)",
            rusqlite::params![
                device_id,
                event.alert_type.to_string(),
                event.severity.to_string(),
                &event.message,
                now.timestamp_millis(),
            ],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Some(Alert {
            id,
            device_id: device_id.to_string(),
            alert_type: event.alert_type,
            severity: event.severity,
            message: event.message.clone(),
            is_active: true,
            created_at: now,
            resolved_at: None,
        }))
    }

    fn resolve_alerts(
        &self,
        device_id: &str,
        targets: &[AlertType],
        now: DateTime<Utc>,
    ) -> Result<usize> {
        if targets.is_empty() {
            return Ok(0);
        }

        let placeholders: Vec<String> = (0..targets.len()).map(|i| format!("?{}", i + 3)).collect();
        let sql = format!(
            "UPDATE alerts SET is_active = 0, resolved_at = ?1
             WHERE device_id = ?2 AND is_active = 1 AND alert_type IN ({})",
            placeholders.join(", ")
        );

        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = vec![
            Box::new(now.timestamp_millis()),
            Box::new(device_id.to_string()),
        ];
        for target in targets {
            params.push(Box::new(target.to_string()));
        }
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();

        let conn = self.lock_conn();
        let changed = conn.execute(&sql, param_refs.as_slice())?;
        Ok(changed)
    }

    fn active_alerts(&self, device_id: Option<&str>) -> Result<Vec<Alert>> {
        self.query_alerts(device_id, true)
    }

    fn alert_history(&self, device_id: Option<&str>) -> Result<Vec<Alert>> {
        self.query_alerts(device_id, false)
    }

    fn alert_stats(&self) -> Result<AlertStats> {
        let conn = self.lock_conn();
        let (total, active): (i64, i64) = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN is_active = 1 THEN 1 ELSE 0 END), 0)
             FROM alerts",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok(AlertStats {
            total_alerts: total as u64,
            active_alerts: active as u64,
            resolved_alerts: (total - active) as u64,
        })
    }
}

impl SqliteStore {
    fn query_alerts(&self, device_id: Option<&str>, active: bool) -> Result<Vec<Alert>> {
        let mut sql = String::from(
            "SELECT id, device_id, alert_type, severity, message, is_active, created_at, resolved_at
             FROM alerts WHERE is_active = ?1",
        );
        let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(active as i64)];
        if let Some(device) = device_id {
            sql.push_str(" AND device_id = ?2");
            params.push(Box::new(device.to_string()));
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let conn = self.lock_conn();
        let mut stmt = conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::types::ToSql> =
            params.iter().map(|p| p.as_ref()).collect();
        let rows = stmt.query_map(param_refs.as_slice(), |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, bool>(5)?,
                row.get::<_, i64>(6)?,
                row.get::<_, Option<i64>>(7)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, device, type_str, sev_str, message, is_active, created_ms, resolved_ms) = row?;
            results.push(alert_from_parts(
                id, device, type_str, sev_str, message, is_active, created_ms, resolved_ms,
            )?);
        }
        Ok(results)
    }
}
