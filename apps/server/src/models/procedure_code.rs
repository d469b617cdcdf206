//! TUSS procedure code records

use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct ProcedureCode {
    pub id: i64,
    /// Business key, unique across the table
    pub code: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProcedureCode {
    pub code: String,
    pub description: String,
}
