use std::collections::HashMap;

use anyhow::Result;
use sqlx::{PgPool, Row};

use crate::consumption::ConsumptionSnapshot;

/// Persists the consumption accumulator snapshots so restarts do not lose
/// the running totals or double-count the hour in progress.
#[derive(Debug, Clone)]
pub struct SnapshotRepository {
    pool: PgPool,
}

impl SnapshotRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"CREATE TABLE IF NOT EXISTS CONSUMPTION_SNAPSHOT (
                DEVICE_ID TEXT NOT NULL,
                SENSOR_KEY TEXT NOT NULL,
                VALUE DOUBLE PRECISION NOT NULL,
                UNIT TEXT NOT NULL,
                PERIOD_BEING_PROCESSED TEXT,
                PERIOD_BASE_VALUE DOUBLE PRECISION,
                UPDATED TIMESTAMPTZ NOT NULL,
                PRIMARY KEY (DEVICE_ID, SENSOR_KEY)
            )"#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn load_for_device(&self, device_id: &str) -> Result<HashMap<String, ConsumptionSnapshot>> {
        let rows = sqlx::query(
            r#"SELECT SENSOR_KEY, VALUE, UNIT, PERIOD_BEING_PROCESSED, PERIOD_BASE_VALUE
                FROM CONSUMPTION_SNAPSHOT
                WHERE DEVICE_ID = $1"#,
        )
        .bind(device_id)
        .fetch_all(&self.pool)
        .await?;

        let mut snapshots = HashMap::new();

        for row in rows {
            let sensor_key: String = row.try_get("sensor_key")?;
            let snapshot = ConsumptionSnapshot {
                value: row.try_get("value")?,
                unit: row.try_get("unit")?,
                period_being_processed: row.try_get("period_being_processed")?,
                period_base_value: row.try_get("period_base_value")?,
            };

            snapshots.insert(sensor_key, snapshot);
        }

        Ok(snapshots)
    }

    pub async fn save(&self, device_id: &str, sensor_key: &str, snapshot: &ConsumptionSnapshot) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO CONSUMPTION_SNAPSHOT
                (DEVICE_ID, SENSOR_KEY, VALUE, UNIT, PERIOD_BEING_PROCESSED, PERIOD_BASE_VALUE, UPDATED)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ON CONFLICT (DEVICE_ID, SENSOR_KEY) DO UPDATE
                SET VALUE = EXCLUDED.VALUE,
                    UNIT = EXCLUDED.UNIT,
                    PERIOD_BEING_PROCESSED = EXCLUDED.PERIOD_BEING_PROCESSED,
                    PERIOD_BASE_VALUE = EXCLUDED.PERIOD_BASE_VALUE,
                    UPDATED = EXCLUDED.UPDATED"#,
        )
        .bind(device_id)
        .bind(sensor_key)
        .bind(snapshot.value)
        .bind(&snapshot.unit)
        .bind(&snapshot.period_being_processed)
        .bind(snapshot.period_base_value)
        .bind(crate::t!(now).into_db())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
