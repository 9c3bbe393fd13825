use anyhow::Result;
use chrono::Utc;
use sqlx::PgPool;

use crate::database::models::CalcSettings;

pub struct SettingsRepository {
    pool: PgPool,
}

impl SettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Current multipliers; a database without the settings row behaves
    /// exactly like one configured with the defaults.
    pub async fn get_settings(&self) -> Result<CalcSettings> {
        let row = sqlx::query_as::<_, CalcSettings>(
            r#"
            SELECT partial_shift_multiplier, vacation_multiplier, sick_multiplier
            FROM calc_settings WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.unwrap_or_default())
    }

    pub async fn update_settings(&self, settings: &CalcSettings) -> Result<CalcSettings> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, CalcSettings>(
            r#"
            INSERT INTO calc_settings (id, partial_shift_multiplier, vacation_multiplier, sick_multiplier, updated_at)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE
            SET partial_shift_multiplier = EXCLUDED.partial_shift_multiplier,
                vacation_multiplier = EXCLUDED.vacation_multiplier,
                sick_multiplier = EXCLUDED.sick_multiplier,
                updated_at = EXCLUDED.updated_at
            RETURNING partial_shift_multiplier, vacation_multiplier, sick_multiplier
            "#,
        )
        .bind(&settings.partial_shift_multiplier)
        .bind(&settings.vacation_multiplier)
        .bind(&settings.sick_multiplier)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }
}
