use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use chrono::{Datelike, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::ShiftKind;
use crate::services::calendar;

#[derive(sqlx::FromRow)]
struct ShiftCellRow {
    employee_id: Uuid,
    work_date: NaiveDate,
    kind: String,
}

pub struct ScheduleRepository {
    pool: PgPool,
}

impl ScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All shift assignments of a month as employee -> (day -> kind).
    ///
    /// Kinds are stored as text; a row that does not parse is skipped with
    /// a warning so one bad value can never take down counting or display.
    pub async fn get_month_shifts(
        &self,
        month_start: NaiveDate,
    ) -> Result<HashMap<Uuid, BTreeMap<u32, ShiftKind>>> {
        let rows = sqlx::query_as::<_, ShiftCellRow>(
            r#"
            SELECT employee_id, work_date, kind
            FROM work_shifts
            WHERE work_date >= $1 AND work_date <= $2
            "#,
        )
        .bind(month_start)
        .bind(calendar::month_end(month_start))
        .fetch_all(&self.pool)
        .await?;

        let mut by_employee: HashMap<Uuid, BTreeMap<u32, ShiftKind>> = HashMap::new();
        for row in rows {
            match row.kind.parse::<ShiftKind>() {
                Ok(kind) => {
                    by_employee
                        .entry(row.employee_id)
                        .or_default()
                        .insert(row.work_date.day(), kind);
                }
                Err(_) => log::warn!(
                    "Skipping unrecognized shift kind {:?} for employee {} on {}",
                    row.kind,
                    row.employee_id,
                    row.work_date
                ),
            }
        }
        Ok(by_employee)
    }

    /// Kind on the last day of the previous month per employee, used for
    /// timesheet grid carry-over.
    pub async fn get_previous_month_tails(
        &self,
        month_start: NaiveDate,
    ) -> Result<HashMap<Uuid, ShiftKind>> {
        let rows = sqlx::query_as::<_, ShiftCellRow>(
            "SELECT employee_id, work_date, kind FROM work_shifts WHERE work_date = $1",
        )
        .bind(calendar::previous_month_last_day(month_start))
        .fetch_all(&self.pool)
        .await?;

        let mut tails = HashMap::new();
        for row in rows {
            match row.kind.parse::<ShiftKind>() {
                Ok(kind) => {
                    tails.insert(row.employee_id, kind);
                }
                Err(_) => log::warn!(
                    "Skipping unrecognized shift kind {:?} for employee {} on {}",
                    row.kind,
                    row.employee_id,
                    row.work_date
                ),
            }
        }
        Ok(tails)
    }

    /// One cell per (employee, date); writing again replaces the kind.
    pub async fn upsert_shift(
        &self,
        employee_id: Uuid,
        date: NaiveDate,
        kind: ShiftKind,
    ) -> Result<()> {
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO work_shifts (employee_id, work_date, kind, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (employee_id, work_date)
            DO UPDATE SET kind = EXCLUDED.kind, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(employee_id)
        .bind(date)
        .bind(kind.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn clear_shift(&self, employee_id: Uuid, date: NaiveDate) -> Result<()> {
        sqlx::query("DELETE FROM work_shifts WHERE employee_id = $1 AND work_date = $2")
            .bind(employee_id)
            .bind(date)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
