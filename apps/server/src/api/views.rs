//! External response shapes.
//!
//! Records never leave the crate as-is: each view is an explicit mapping that
//! drops the surrogate id and timestamps. Product fields are camelCase, while
//! the pagination envelope and statistics use snake_case.

use crate::{
    db::Page,
    models::{CatalogStats, ProcedureCode, Product},
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub product_code: String,
    pub plan_name: String,
    pub ans_code: String,
    pub ans_registered_name: String,
    pub segment: String,
    pub classification: String,
    pub operator_code: String,
    pub operator_name: String,
    pub status: String,
    pub api_product_code: String,
    pub api_plan_code: String,
}

impl From<Product> for ProductView {
    fn from(p: Product) -> Self {
        Self {
            product_code: p.product_code,
            plan_name: p.plan_name,
            ans_code: p.ans_plan_code,
            ans_registered_name: p.ans_registered_name,
            segment: p.segment,
            classification: p.classification,
            operator_code: p.operator_code,
            operator_name: p.operator_name,
            status: p.status,
            api_product_code: p.api_product_code,
            api_plan_code: p.api_plan_code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcedureCodeView {
    pub code: String,
    pub description: String,
}

impl From<ProcedureCode> for ProcedureCodeView {
    fn from(p: ProcedureCode) -> Self {
        Self {
            code: p.code,
            description: p.description,
        }
    }
}

/// Pagination envelope around a list of views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl<R, T: From<R>> From<Page<R>> for Paginated<T> {
    fn from(page: Page<R>) -> Self {
        let page = page.map(T::from);
        Self {
            items: page.items,
            total: page.total,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsView {
    pub total_products: i64,
    pub total_tuss_codes: i64,
    pub distinct_plans: i64,
    pub distinct_segments: i64,
}

impl From<CatalogStats> for StatsView {
    fn from(s: CatalogStats) -> Self {
        Self {
            total_products: s.total_products,
            total_tuss_codes: s.total_procedure_codes,
            distinct_plans: s.distinct_plans,
            distinct_segments: s.distinct_segments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthView {
    pub status: &'static str,
    pub service: String,
}
