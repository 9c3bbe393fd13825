use anyhow::Result;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::database::models::{DepartmentServiceBreakdown, DepartmentShiftBreakdown};
use crate::services::calendar;

#[derive(sqlx::FromRow)]
struct ShiftPivotRow {
    department_name: String,
    kind: String,
    count: i64,
}

#[derive(sqlx::FromRow)]
struct ServicePivotRow {
    department_name: String,
    service_name: String,
    quantity: i64,
}

pub struct AnalyticsRepository {
    pool: PgPool,
}

impl AnalyticsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assignment counts per (department, kind) for one month. Raw stored
    /// kinds are reported as-is; this is an inventory of the ledger, not a
    /// pay computation.
    pub async fn department_shift_breakdown(
        &self,
        month_start: NaiveDate,
    ) -> Result<Vec<DepartmentShiftBreakdown>> {
        let rows = sqlx::query_as::<_, ShiftPivotRow>(
            r#"
            SELECT d.name AS department_name, ws.kind AS kind, COUNT(*) AS count
            FROM work_shifts ws
            JOIN employees e ON e.id = ws.employee_id
            JOIN departments d ON d.id = e.department_id
            WHERE ws.work_date >= $1 AND ws.work_date <= $2
            GROUP BY d.name, ws.kind
            ORDER BY d.name, ws.kind
            "#,
        )
        .bind(month_start)
        .bind(calendar::month_end(month_start))
        .fetch_all(&self.pool)
        .await?;

        let mut breakdowns: Vec<DepartmentShiftBreakdown> = Vec::new();
        for row in rows {
            match breakdowns.last_mut() {
                Some(current) if current.department_name == row.department_name => {
                    current.kinds.insert(row.kind, row.count);
                }
                _ => breakdowns.push(DepartmentShiftBreakdown {
                    department_name: row.department_name,
                    kinds: [(row.kind, row.count)].into_iter().collect(),
                }),
            }
        }
        Ok(breakdowns)
    }

    /// Summed service quantities per (department, service) for one month.
    pub async fn department_service_breakdown(
        &self,
        month_start: NaiveDate,
    ) -> Result<Vec<DepartmentServiceBreakdown>> {
        let rows = sqlx::query_as::<_, ServicePivotRow>(
            r#"
            SELECT d.name AS department_name, s.name AS service_name,
                   SUM(sr.quantity)::BIGINT AS quantity
            FROM service_records sr
            JOIN employees e ON e.id = sr.employee_id
            JOIN departments d ON d.id = e.department_id
            JOIN services s ON s.id = sr.service_id
            WHERE sr.month = $1
            GROUP BY d.name, s.name
            ORDER BY d.name, s.name
            "#,
        )
        .bind(month_start)
        .fetch_all(&self.pool)
        .await?;

        let mut breakdowns: Vec<DepartmentServiceBreakdown> = Vec::new();
        for row in rows {
            match breakdowns.last_mut() {
                Some(current) if current.department_name == row.department_name => {
                    current.services.insert(row.service_name, row.quantity);
                }
                _ => breakdowns.push(DepartmentServiceBreakdown {
                    department_name: row.department_name,
                    services: [(row.service_name, row.quantity)].into_iter().collect(),
                }),
            }
        }
        Ok(breakdowns)
    }
}
