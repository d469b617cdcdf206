//! In-memory catalog store.
//!
//! Used by the HTTP integration tests and for running the server without a
//! database. Evaluates the backend-neutral `matches` predicates directly, so it
//! doubles as the reference behaviour for the SQL compiled in [`super::query::sql`].

use crate::{
    db::query::{Facet, PageRequest, ProcedureQuery, ProductQuery},
    db::traits::{CatalogStore, UpsertMode, UpsertOutcome},
    models::{CatalogStats, NewProcedureCode, NewProduct, ProcedureCode, Product, ProductKey},
    Result,
};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    products: BTreeMap<i64, Product>,
    product_ids: HashMap<ProductKey, i64>,
    next_product_id: i64,
    procedures: BTreeMap<i64, ProcedureCode>,
    procedure_ids: HashMap<String, i64>,
    next_procedure_id: i64,
}

/// Catalog store holding both tables behind one lock.
#[derive(Debug, Default)]
pub struct InMemoryCatalogStore {
    tables: RwLock<Tables>,
}

impl InMemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: Clone>(matching: impl Iterator<Item = T>, page: PageRequest) -> Vec<T> {
    matching
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect()
}

#[async_trait]
impl CatalogStore for InMemoryCatalogStore {
    async fn count_products(&self, query: &ProductQuery) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.products.values().filter(|p| query.matches(p)).count() as i64)
    }

    async fn fetch_products(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Vec<Product>> {
        let tables = self.tables.read().await;
        let matching = tables.products.values().filter(|p| query.matches(p)).cloned();
        Ok(page_of(matching, page))
    }

    async fn count_procedure_codes(&self, query: &ProcedureQuery) -> Result<i64> {
        let tables = self.tables.read().await;
        Ok(tables.procedures.values().filter(|p| query.matches(p)).count() as i64)
    }

    async fn fetch_procedure_codes(
        &self,
        query: &ProcedureQuery,
        page: PageRequest,
    ) -> Result<Vec<ProcedureCode>> {
        let tables = self.tables.read().await;
        let matching = tables
            .procedures
            .values()
            .filter(|p| query.matches(p))
            .cloned();
        Ok(page_of(matching, page))
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let tables = self.tables.read().await;
        Ok(tables.products.get(&id).cloned())
    }

    async fn get_procedure_code(&self, code: &str) -> Result<Option<ProcedureCode>> {
        let tables = self.tables.read().await;
        Ok(tables
            .procedure_ids
            .get(code)
            .and_then(|id| tables.procedures.get(id))
            .cloned())
    }

    async fn distinct_values(&self, facet: Facet) -> Result<Vec<String>> {
        let tables = self.tables.read().await;
        // BTreeSet over String orders by code point, same as COLLATE "C".
        let values: BTreeSet<&str> = tables
            .products
            .values()
            .map(|p| facet.value_of(p))
            .collect();
        Ok(values.into_iter().map(str::to_string).collect())
    }

    async fn stats(&self) -> Result<CatalogStats> {
        let tables = self.tables.read().await;
        let plans: HashSet<&str> = tables.products.values().map(|p| p.plan_name.as_str()).collect();
        let segments: HashSet<&str> = tables.products.values().map(|p| p.segment.as_str()).collect();
        Ok(CatalogStats {
            total_products: tables.products.len() as i64,
            total_procedure_codes: tables.procedures.len() as i64,
            distinct_plans: plans.len() as i64,
            distinct_segments: segments.len() as i64,
        })
    }

    async fn upsert_products(
        &self,
        rows: &[NewProduct],
        mode: UpsertMode,
    ) -> Result<UpsertOutcome> {
        let mut tables = self.tables.write().await;
        let mut outcome = UpsertOutcome::default();
        let now = Utc::now();

        for row in rows {
            let key = row.key();
            match tables.product_ids.get(&key).copied() {
                Some(id) => {
                    let Some(existing) = tables.products.get_mut(&id) else {
                        continue;
                    };
                    if mode == UpsertMode::SkipExisting {
                        outcome.skipped += 1;
                        continue;
                    }
                    let mut candidate = existing.clone();
                    candidate.apply(row, existing.updated_at);
                    if candidate == *existing {
                        outcome.skipped += 1;
                    } else {
                        existing.apply(row, now);
                        outcome.updated += 1;
                    }
                }
                None => {
                    tables.next_product_id += 1;
                    let id = tables.next_product_id;
                    let product = Product {
                        id,
                        product_code: row.product_code.clone(),
                        plan_name: row.plan_name.clone(),
                        ans_plan_code: row.ans_plan_code.clone(),
                        ans_registered_name: row.ans_registered_name.clone(),
                        segment: row.segment.clone(),
                        classification: row.classification.clone(),
                        operator_code: row.operator_code.clone(),
                        operator_name: row.operator_name.clone(),
                        status: row.status.clone(),
                        api_product_code: row.api_product_code.clone(),
                        api_plan_code: row.api_plan_code.clone(),
                        created_at: now,
                        updated_at: now,
                    };
                    tables.products.insert(id, product);
                    tables.product_ids.insert(key, id);
                    outcome.inserted += 1;
                }
            }
        }

        Ok(outcome)
    }

    async fn upsert_procedure_codes(
        &self,
        rows: &[NewProcedureCode],
        mode: UpsertMode,
    ) -> Result<UpsertOutcome> {
        let mut tables = self.tables.write().await;
        let mut outcome = UpsertOutcome::default();
        let now = Utc::now();

        for row in rows {
            match tables.procedure_ids.get(&row.code).copied() {
                Some(id) => {
                    let Some(existing) = tables.procedures.get_mut(&id) else {
                        continue;
                    };
                    if mode == UpsertMode::SkipExisting || existing.description == row.description {
                        outcome.skipped += 1;
                    } else {
                        existing.description = row.description.clone();
                        existing.updated_at = now;
                        outcome.updated += 1;
                    }
                }
                None => {
                    tables.next_procedure_id += 1;
                    let id = tables.next_procedure_id;
                    tables.procedures.insert(
                        id,
                        ProcedureCode {
                            id,
                            code: row.code.clone(),
                            description: row.description.clone(),
                            created_at: now,
                            updated_at: now,
                        },
                    );
                    tables.procedure_ids.insert(row.code.clone(), id);
                    outcome.inserted += 1;
                }
            }
        }

        Ok(outcome)
    }
}
