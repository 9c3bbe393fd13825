use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Per-department monthly pivots: how many assignments of each kind were
/// scheduled and how many units of each service were billed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub month: String,
    pub shifts: Vec<DepartmentShiftBreakdown>,
    pub services: Vec<DepartmentServiceBreakdown>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentShiftBreakdown {
    pub department_name: String,
    /// shift kind -> assignment count
    pub kinds: BTreeMap<String, i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentServiceBreakdown {
    pub department_name: String,
    /// service name -> summed quantity
    pub services: BTreeMap<String, i64>,
}
