use crate::domain::draw::{Double, DrawProvenance, DrawRecord};
use crate::domain::repositories::{AppendOutcome, DrawRepository};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteDrawRepository {
    pool: SqlitePool,
}

impl SqliteDrawRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DrawRepository for SqliteDrawRepository {
    async fn append(&self, draw: &DrawRecord) -> Result<AppendOutcome> {
        let date = draw.date.format(DATE_FORMAT).to_string();

        let exists = sqlx::query("SELECT 1 FROM draws WHERE draw_date = ?")
            .bind(&date)
            .fetch_optional(&self.pool)
            .await?
            .is_some();
        if exists {
            debug!("Draw for {} already stored", date);
            return Ok(AppendOutcome::Duplicate);
        }

        if let Some(latest) = self.latest().await?
            && draw.date < latest.date
        {
            bail!(
                "Refusing to append draw for {}: history already extends to {}",
                draw.date,
                latest.date
            );
        }

        let result = sqlx::query(
            r#"
            INSERT INTO draws (draw_date, open3, close3, double_value, raw_source, source_url, fetched_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(draw_date) DO NOTHING
            "#,
        )
        .bind(&date)
        .bind(draw.open3.to_string())
        .bind(draw.close3.to_string())
        .bind(i64::from(draw.double.value()))
        .bind(&draw.provenance.raw_source)
        .bind(&draw.provenance.source_url)
        .bind(draw.provenance.fetched_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .context("Failed to save draw")?;

        if result.rows_affected() == 0 {
            return Ok(AppendOutcome::Duplicate);
        }
        info!("Persisted draw {}", draw.draw_id());
        Ok(AppendOutcome::Inserted)
    }

    async fn find_all(&self) -> Result<Vec<DrawRecord>> {
        let rows = sqlx::query("SELECT * FROM draws ORDER BY draw_date ASC")
            .fetch_all(&self.pool)
            .await?;
        self.map_rows_to_draws(rows)
    }

    async fn find_before(&self, date: NaiveDate) -> Result<Vec<DrawRecord>> {
        let rows = sqlx::query("SELECT * FROM draws WHERE draw_date < ? ORDER BY draw_date ASC")
            .bind(date.format(DATE_FORMAT).to_string())
            .fetch_all(&self.pool)
            .await?;
        self.map_rows_to_draws(rows)
    }

    async fn latest(&self) -> Result<Option<DrawRecord>> {
        let rows = sqlx::query("SELECT * FROM draws ORDER BY draw_date DESC LIMIT 1")
            .fetch_all(&self.pool)
            .await?;
        Ok(self.map_rows_to_draws(rows)?.pop())
    }

    async fn count(&self) -> Result<usize> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM draws")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        Ok(count as usize)
    }
}

impl SqliteDrawRepository {
    fn map_rows_to_draws(&self, rows: Vec<sqlx::sqlite::SqliteRow>) -> Result<Vec<DrawRecord>> {
        let mut draws = Vec::with_capacity(rows.len());
        for row in rows {
            let date_str: String = row.try_get("draw_date")?;
            let open3: String = row.try_get("open3")?;
            let close3: String = row.try_get("close3")?;
            let double: i64 = row.try_get("double_value")?;
            let fetched_at: String = row.try_get("fetched_at")?;

            let double = u8::try_from(double)
                .with_context(|| format!("Stored double {} out of range", double))?;
            draws.push(DrawRecord::new(
                NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                    .with_context(|| format!("Invalid stored date {}", date_str))?,
                open3.parse()?,
                close3.parse()?,
                Double::new(double)?,
                DrawProvenance {
                    raw_source: row.try_get("raw_source")?,
                    source_url: row.try_get("source_url")?,
                    fetched_at: DateTime::parse_from_rfc3339(&fetched_at)
                        .with_context(|| format!("Invalid stored timestamp {}", fetched_at))?
                        .with_timezone(&Utc),
                },
            ));
        }
        Ok(draws)
    }
}
