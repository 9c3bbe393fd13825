use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A unit-priced piece of billable work. `for_salary_based` partitions the
/// catalog: a service only ever applies to employees whose compensation
/// mode matches the flag.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal, // NUMERIC(10,2)
    pub for_salary_based: bool,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    #[serde(default)]
    pub price: BigDecimal,
    #[serde(default)]
    pub for_salary_based: bool,
}

impl ServiceInput {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Service name must not be empty".to_string());
        }
        if self.price < BigDecimal::zero() {
            return Err("price must not be negative".to_string());
        }
        Ok(())
    }
}

/// Billed quantity of one service by one employee in one month
/// (month is the first calendar day of that month).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    pub employee_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
}

/// One cell of a batch quantity update. Quantity 0 deletes the record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuantityEntry {
    pub employee_id: Uuid,
    pub service_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecordBatchInput {
    pub month: Option<String>,
    pub entries: Vec<ServiceQuantityEntry>,
}

/// Employees x services grid for one month; `services` is the catalog,
/// optionally narrowed to one side of the salary-based partition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesGrid {
    pub month: String,
    pub services: Vec<Service>,
    pub rows: Vec<ServicesGridRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicesGridRow {
    pub employee_id: Uuid,
    pub full_name: String,
    pub department_name: String,
    pub quantities: HashMap<Uuid, i32>,
}
