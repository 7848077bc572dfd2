use crate::domain::payment::{BucketTotals, PaymentRecord, ProcessorKind, SummaryTotals};
use anyhow::{anyhow, Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::time::Duration;

/// Append-only payment ledger split across two equally-shaped SQLite files
/// on a shared volume. This replica writes only to `own`; `peer` is opened
/// read-mostly so either replica can answer summary queries over both shards.
#[derive(Clone)]
pub struct LedgerRepo {
    pub own: Option<SqlitePool>,
    pub peer: Option<SqlitePool>,
}

impl LedgerRepo {
    pub async fn open(own_path: &str, peer_path: &str) -> Result<Self> {
        let own = match open_shard(own_path).await {
            Ok(pool) => Some(pool),
            Err(err) => {
                tracing::error!("cannot open own shard {}: {:#}", own_path, err);
                None
            }
        };
        let peer = match open_shard(peer_path).await {
            Ok(pool) => Some(pool),
            Err(err) => {
                tracing::warn!("cannot open peer shard {}: {:#}", peer_path, err);
                None
            }
        };

        if own.is_none() && peer.is_none() {
            return Err(anyhow!("both ledger shards failed to open"));
        }
        Ok(Self { own, peer })
    }

    /// Primary-key conflicts are treated as success so that a commit retry
    /// after a partial failure stays idempotent.
    pub async fn insert(&self, record: &PaymentRecord) -> Result<()> {
        let pool = self.own.as_ref().context("own ledger shard unavailable")?;
        sqlx::query(
            "INSERT OR IGNORE INTO payments (correlation_id, amount_cents, requested_at_ms, processor) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.correlation_id)
        .bind(record.amount_cents)
        .bind(record.requested_at_ms)
        .bind(record.processor.as_i64())
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Aggregates both shards over the inclusive `[from_ms, to_ms]` range.
    /// A shard that is missing or fails to read counts as empty; the summary
    /// endpoint never errors.
    pub async fn summary(&self, from_ms: i64, to_ms: i64) -> SummaryTotals {
        let (own, peer) = tokio::join!(
            read_shard(self.own.as_ref(), from_ms, to_ms),
            read_shard(self.peer.as_ref(), from_ms, to_ms),
        );
        own.merge(peer)
    }

    pub async fn purge(&self) -> Result<()> {
        let pool = self.own.as_ref().context("own ledger shard unavailable")?;
        sqlx::query("DELETE FROM payments").execute(pool).await?;
        Ok(())
    }
}

async fn read_shard(pool: Option<&SqlitePool>, from_ms: i64, to_ms: i64) -> SummaryTotals {
    let Some(pool) = pool else {
        return SummaryTotals::default();
    };
    match shard_totals(pool, from_ms, to_ms).await {
        Ok(totals) => totals,
        Err(err) => {
            tracing::warn!("shard read failed: {:#}", err);
            SummaryTotals::default()
        }
    }
}

async fn shard_totals(pool: &SqlitePool, from_ms: i64, to_ms: i64) -> Result<SummaryTotals> {
    let rows = sqlx::query(
        "SELECT processor, COUNT(*) AS requests, COALESCE(SUM(amount_cents), 0) AS amount_cents \
         FROM payments WHERE requested_at_ms >= ? AND requested_at_ms <= ? GROUP BY processor",
    )
    .bind(from_ms)
    .bind(to_ms)
    .fetch_all(pool)
    .await?;

    let mut totals = SummaryTotals::default();
    for row in rows {
        let bucket = BucketTotals {
            requests: row.get("requests"),
            amount_cents: row.get("amount_cents"),
        };
        match ProcessorKind::from_i64(row.get("processor")) {
            ProcessorKind::Default => totals.default.add(bucket),
            ProcessorKind::Fallback => totals.fallback.add(bucket),
        }
    }
    Ok(totals)
}

async fn open_shard(path: &str) -> Result<SqlitePool> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;
    init_schema(&pool).await?;
    Ok(pool)
}

/// Both replicas run this against both files; the statements are idempotent.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS payments (\
             correlation_id TEXT PRIMARY KEY, \
             amount_cents INTEGER NOT NULL, \
             requested_at_ms INTEGER NOT NULL, \
             processor INTEGER NOT NULL\
         )",
    )
    .execute(pool)
    .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_payments_requested_at ON payments (requested_at_ms)")
        .execute(pool)
        .await?;
    Ok(())
}
