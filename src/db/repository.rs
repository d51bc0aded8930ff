//! Snapshot store: the append-only snapshot collection.
//!
//! Snapshots are never updated or deleted, only appended and read back.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use crate::errors::AppError;
use crate::models::{DonationEntry, Snapshot};

/// Repository over the persisted snapshot history.
#[derive(Clone)]
pub struct SnapshotStore {
    pool: SqlitePool,
}

impl SnapshotStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a snapshot to its campaign's history.
    pub async fn append(&self, snapshot: &Snapshot) -> Result<(), AppError> {
        let id = uuid::Uuid::new_v4().to_string();
        let donation_data = serde_json::to_string(&snapshot.donation_data)?;

        sqlx::query("INSERT INTO snapshots (id, campaign, date, donation_data) VALUES (?, ?, ?, ?)")
            .bind(&id)
            .bind(&snapshot.campaign)
            .bind(snapshot.date.to_rfc3339())
            .bind(&donation_data)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Most recent snapshot for a campaign, by descending date.
    pub async fn find_latest(&self, campaign: &str) -> Result<Option<Snapshot>, AppError> {
        let row = sqlx::query(
            "SELECT campaign, date, donation_data FROM snapshots WHERE campaign = ? ORDER BY date DESC LIMIT 1"
        )
        .bind(campaign)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(snapshot_from_row).transpose()
    }

    /// Full history for a campaign, oldest first.
    pub async fn list_for_campaign(&self, campaign: &str) -> Result<Vec<Snapshot>, AppError> {
        let rows = sqlx::query(
            "SELECT campaign, date, donation_data FROM snapshots WHERE campaign = ? ORDER BY date ASC",
        )
        .bind(campaign)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(snapshot_from_row).collect()
    }
}

fn snapshot_from_row(row: &SqliteRow) -> Result<Snapshot, AppError> {
    let date_str: String = row.get("date");
    let date = DateTime::parse_from_rfc3339(&date_str)
        .map_err(|e| AppError::Database(format!("Invalid snapshot date {:?}: {}", date_str, e)))?
        .with_timezone(&Utc);

    let data_json: String = row.get("donation_data");
    let donation_data: Vec<DonationEntry> = serde_json::from_str(&data_json)?;

    Ok(Snapshot {
        date,
        campaign: row.get("campaign"),
        donation_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use crate::models::DonationFigure;
    use tempfile::TempDir;

    async fn test_store() -> (SnapshotStore, TempDir) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let pool = init_database(&temp_dir.path().join("test.sqlite"))
            .await
            .expect("Failed to init DB");
        (SnapshotStore::new(pool), temp_dir)
    }

    fn snapshot(campaign: &str, name: &str, amount: i64) -> Snapshot {
        Snapshot::new(
            campaign,
            vec![DonationEntry::new(
                name,
                DonationFigure {
                    amount: Some(amount),
                    target: Some(1000),
                },
            )],
        )
    }

    #[tokio::test]
    async fn test_find_latest_empty() {
        let (store, _dir) = test_store().await;
        assert!(store.find_latest("camp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_append_and_read_back() {
        let (store, _dir) = test_store().await;

        let first = snapshot("camp", "A", 50);
        store.append(&first).await.unwrap();

        let latest = store.find_latest("camp").await.unwrap().unwrap();
        assert_eq!(latest.campaign, "camp");
        assert_eq!(latest.donation_data, first.donation_data);
        assert_eq!(latest.date.to_rfc3339(), first.date.to_rfc3339());
    }

    #[tokio::test]
    async fn test_latest_is_newest_by_date() {
        let (store, _dir) = test_store().await;

        let mut old = snapshot("camp", "A", 50);
        old.date = old.date - chrono::Duration::hours(1);
        store.append(&old).await.unwrap();

        let new = snapshot("camp", "A", 75);
        store.append(&new).await.unwrap();

        let latest = store.find_latest("camp").await.unwrap().unwrap();
        assert_eq!(latest.donation_data[0].amount, Some(75));

        let history = store.list_for_campaign("camp").await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].donation_data[0].amount, Some(50));
    }

    #[tokio::test]
    async fn test_campaigns_are_isolated() {
        let (store, _dir) = test_store().await;

        store.append(&snapshot("camp-a", "A", 50)).await.unwrap();

        assert!(store.find_latest("camp-b").await.unwrap().is_none());
        assert!(store.list_for_campaign("camp-b").await.unwrap().is_empty());
    }
}
