//! Insurance product records

use chrono::{DateTime, Utc};

/// A stored insurance product (one plan of one product line).
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Surrogate id, assigned on insert and never exposed externally
    pub id: i64,
    pub product_code: String,
    pub plan_name: String,
    pub ans_plan_code: String,
    pub ans_registered_name: String,
    pub segment: String,
    pub classification: String,
    pub operator_code: String,
    pub operator_name: String,
    pub status: String,
    pub api_product_code: String,
    pub api_plan_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Product fields as written by the seed and refresh paths.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewProduct {
    pub product_code: String,
    pub plan_name: String,
    pub ans_plan_code: String,
    pub ans_registered_name: String,
    pub segment: String,
    pub classification: String,
    pub operator_code: String,
    pub operator_name: String,
    pub status: String,
    pub api_product_code: String,
    pub api_plan_code: String,
}

/// Business identity of a product: (product code, plan name, API plan code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductKey {
    pub product_code: String,
    pub plan_name: String,
    pub api_plan_code: String,
}

impl NewProduct {
    pub fn key(&self) -> ProductKey {
        ProductKey {
            product_code: self.product_code.clone(),
            plan_name: self.plan_name.clone(),
            api_plan_code: self.api_plan_code.clone(),
        }
    }

    /// Fields matched by free-text product search, in match order.
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            &self.product_code,
            &self.plan_name,
            &self.ans_registered_name,
            &self.ans_plan_code,
        ]
    }
}

impl Product {
    pub fn searchable_fields(&self) -> [&str; 4] {
        [
            &self.product_code,
            &self.plan_name,
            &self.ans_registered_name,
            &self.ans_plan_code,
        ]
    }

    /// Overwrite every non-key field, keeping id and `created_at`.
    pub fn apply(&mut self, update: &NewProduct, now: DateTime<Utc>) {
        self.ans_plan_code = update.ans_plan_code.clone();
        self.ans_registered_name = update.ans_registered_name.clone();
        self.segment = update.segment.clone();
        self.classification = update.classification.clone();
        self.operator_code = update.operator_code.clone();
        self.operator_name = update.operator_name.clone();
        self.status = update.status.clone();
        self.api_product_code = update.api_product_code.clone();
        self.updated_at = now;
    }
}
