use anyhow::{anyhow, Result};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::models::{Department, Employee, EmployeeInput, Position};

const EMPLOYEE_COLUMNS: &str = r#"
    e.id, e.full_name, e.department_id, d.name AS department_name,
    e.position_id, p.name AS position_name,
    e.day_shift_rate, e.night_shift_rate, e.is_fixed_salary,
    e.fixed_salary, e.bonus, e.created_at, e.updated_at
"#;

pub struct EmployeeRepository {
    pool: PgPool,
}

impl EmployeeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Roster joined with department/position names, ordered the way
    /// reports list employees.
    pub async fn get_employees(&self, department_id: Option<Uuid>) -> Result<Vec<Employee>> {
        let base = format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees e
            JOIN departments d ON d.id = e.department_id
            JOIN positions p ON p.id = e.position_id
            "#
        );
        let rows = if let Some(department_id) = department_id {
            sqlx::query_as::<_, Employee>(&format!(
                "{base} WHERE e.department_id = $1 ORDER BY d.name, e.full_name"
            ))
            .bind(department_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, Employee>(&format!("{base} ORDER BY d.name, e.full_name"))
                .fetch_all(&self.pool)
                .await?
        };
        Ok(rows)
    }

    pub async fn get_employee_by_id(&self, id: Uuid) -> Result<Option<Employee>> {
        let row = sqlx::query_as::<_, Employee>(&format!(
            r#"
            SELECT {EMPLOYEE_COLUMNS}
            FROM employees e
            JOIN departments d ON d.id = e.department_id
            JOIN positions p ON p.id = e.position_id
            WHERE e.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    pub async fn create_employee(&self, input: EmployeeInput) -> Result<Employee> {
        let now = Utc::now().naive_utc();
        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO employees (full_name, department_id, position_id, day_shift_rate,
                                   night_shift_rate, is_fixed_salary, fixed_salary, bonus,
                                   created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING id
            "#,
        )
        .bind(&input.full_name)
        .bind(input.department_id)
        .bind(input.position_id)
        .bind(&input.day_shift_rate)
        .bind(&input.night_shift_rate)
        .bind(input.is_fixed_salary)
        .bind(&input.fixed_salary)
        .bind(&input.bonus)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        self.get_employee_by_id(id)
            .await?
            .ok_or_else(|| anyhow!("Employee {} missing right after insert", id))
    }

    pub async fn update_employee(
        &self,
        id: Uuid,
        input: EmployeeInput,
    ) -> Result<Option<Employee>> {
        let now = Utc::now().naive_utc();
        let updated: Option<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE employees
            SET full_name = $1, department_id = $2, position_id = $3, day_shift_rate = $4,
                night_shift_rate = $5, is_fixed_salary = $6, fixed_salary = $7, bonus = $8,
                updated_at = $9
            WHERE id = $10
            RETURNING id
            "#,
        )
        .bind(&input.full_name)
        .bind(input.department_id)
        .bind(input.position_id)
        .bind(&input.day_shift_rate)
        .bind(&input.night_shift_rate)
        .bind(input.is_fixed_salary)
        .bind(&input.fixed_salary)
        .bind(&input.bonus)
        .bind(now)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(id) => self.get_employee_by_id(id).await,
            None => Ok(None),
        }
    }

    pub async fn delete_employee(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Subset of `ids` that actually exist; batch validation checks the
    /// result against its input before any upsert runs.
    pub async fn existing_employee_ids(&self, ids: Vec<Uuid>) -> Result<Vec<Uuid>> {
        let rows: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn employee_ids_in_department(&self, department_id: Uuid) -> Result<Vec<Uuid>> {
        let rows: Vec<Uuid> =
            sqlx::query_scalar("SELECT id FROM employees WHERE department_id = $1")
                .bind(department_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows)
    }

    pub async fn get_departments(&self) -> Result<Vec<Department>> {
        let rows = sqlx::query_as::<_, Department>(
            "SELECT id, name, created_at FROM departments ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    pub async fn department_exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn position_exists(&self, id: Uuid) -> Result<bool> {
        let found: Option<Uuid> = sqlx::query_scalar("SELECT id FROM positions WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn get_positions(&self) -> Result<Vec<Position>> {
        let rows = sqlx::query_as::<_, Position>(
            "SELECT id, name, created_at FROM positions ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
