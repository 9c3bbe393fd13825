use std::collections::HashMap;

use anyhow::{anyhow, Result};
use chrono::{NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Service, ServiceInput, ServiceRecord};

pub struct ServiceRepository {
    pool: PgPool,
}

impl ServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Service catalog, optionally narrowed to one compensation-mode
    /// partition (`for_salary_based`).
    pub async fn get_services(&self, for_salary_based: Option<bool>) -> Result<Vec<Service>> {
        let rows = if let Some(flag) = for_salary_based {
            sqlx::query_as::<_, Service>(
                r#"
                SELECT id, name, price, for_salary_based, created_at
                FROM services WHERE for_salary_based = $1 ORDER BY name
                "#,
            )
            .bind(flag)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Service>(
                "SELECT id, name, price, for_salary_based, created_at FROM services ORDER BY name",
            )
            .fetch_all(&self.pool)
            .await?
        };
        Ok(rows)
    }

    pub async fn create_service(&self, input: ServiceInput) -> Result<Service> {
        let now = Utc::now().naive_utc();
        let row = sqlx::query_as::<_, Service>(
            r#"
            INSERT INTO services (name, price, for_salary_based, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, price, for_salary_based, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.price)
        .bind(input.for_salary_based)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn update_service(&self, id: Uuid, input: ServiceInput) -> Result<Option<Service>> {
        let row = sqlx::query_as::<_, Service>(
            r#"
            UPDATE services
            SET name = $1, price = $2, for_salary_based = $3
            WHERE id = $4
            RETURNING id, name, price, for_salary_based, created_at
            "#,
        )
        .bind(&input.name)
        .bind(&input.price)
        .bind(input.for_salary_based)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn existing_service_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Uuid>> {
        let rows: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM services WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// A month's billed quantities as employee -> (service -> quantity).
    pub async fn get_month_quantities(
        &self,
        month_start: NaiveDate,
    ) -> Result<HashMap<Uuid, HashMap<Uuid, i32>>> {
        let rows = sqlx::query_as::<_, ServiceRecord>(
            "SELECT employee_id, service_id, quantity FROM service_records WHERE month = $1",
        )
        .bind(month_start)
        .fetch_all(&self.pool)
        .await?;

        let mut by_employee: HashMap<Uuid, HashMap<Uuid, i32>> = HashMap::new();
        for record in rows {
            by_employee
                .entry(record.employee_id)
                .or_default()
                .insert(record.service_id, record.quantity);
        }
        Ok(by_employee)
    }

    pub async fn upsert_record(
        &self,
        employee_id: Uuid,
        service_id: Uuid,
        month_start: NaiveDate,
        quantity: i32,
    ) -> Result<()> {
        if quantity < 0 {
            return Err(anyhow!("Service quantity must not be negative"));
        }
        let now = Utc::now().naive_utc();
        sqlx::query(
            r#"
            INSERT INTO service_records (employee_id, service_id, month, quantity, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ON CONFLICT (employee_id, service_id, month)
            DO UPDATE SET quantity = EXCLUDED.quantity, updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(employee_id)
        .bind(service_id)
        .bind(month_start)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn delete_record(
        &self,
        employee_id: Uuid,
        service_id: Uuid,
        month_start: NaiveDate,
    ) -> Result<()> {
        sqlx::query(
            "DELETE FROM service_records WHERE employee_id = $1 AND service_id = $2 AND month = $3",
        )
        .bind(employee_id)
        .bind(service_id)
        .bind(month_start)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
