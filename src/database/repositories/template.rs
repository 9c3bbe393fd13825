use anyhow::Result;
use chrono::{NaiveDateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{ScheduleTemplate, ShiftKind, TemplateInput};

#[derive(sqlx::FromRow)]
struct TemplateRow {
    id: Uuid,
    name: String,
    sequence: String,
    created_at: NaiveDateTime,
}

impl TemplateRow {
    /// Sequences live in a JSONB column; a row whose payload no longer
    /// parses is dropped with a warning instead of failing the listing.
    fn decode(self) -> Option<ScheduleTemplate> {
        match serde_json::from_str::<Vec<Option<ShiftKind>>>(&self.sequence) {
            Ok(sequence) => Some(ScheduleTemplate {
                id: self.id,
                name: self.name,
                sequence,
                created_at: self.created_at,
            }),
            Err(err) => {
                log::warn!("Skipping template {} with bad sequence: {}", self.id, err);
                None
            }
        }
    }
}

pub struct TemplateRepository {
    pool: PgPool,
}

impl TemplateRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_templates(&self) -> Result<Vec<ScheduleTemplate>> {
        let rows = sqlx::query_as::<_, TemplateRow>(
            "SELECT id, name, sequence::text AS sequence, created_at FROM schedule_templates ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().filter_map(TemplateRow::decode).collect())
    }

    pub async fn create_template(&self, input: TemplateInput) -> Result<ScheduleTemplate> {
        let now = Utc::now().naive_utc();
        let sequence = serde_json::to_string(&input.sequence)?;
        let row = sqlx::query_as::<_, TemplateRow>(
            r#"
            INSERT INTO schedule_templates (name, sequence, created_at)
            VALUES ($1, $2::jsonb, $3)
            RETURNING id, name, sequence::text AS sequence, created_at
            "#,
        )
        .bind(&input.name)
        .bind(sequence)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(ScheduleTemplate {
            id: row.id,
            name: row.name,
            sequence: input.sequence,
            created_at: row.created_at,
        })
    }
}
