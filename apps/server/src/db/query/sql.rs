//! SQL generation for catalog queries.
//!
//! Statements use positional `$n` placeholders; values travel separately as
//! [`BindValue`]s so user input never reaches the SQL text. Count and page
//! statements share one WHERE clause, and pages are always ordered by `id`.

use super::text::{escape_like_pattern, spans_fields};
use super::{Facet, PageRequest, ProcedureQuery, ProcedureSearch, ProductQuery};

/// Bind values for `sqlx` queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindValue {
    Text(String),
    BigInt(i64),
}

pub(crate) const PRODUCT_COLUMNS: &str = "id, product_code, plan_name, ans_plan_code, \
     ans_registered_name, segment, classification, operator_code, operator_name, status, \
     api_product_code, api_plan_code, created_at, updated_at";

pub(crate) const PROCEDURE_COLUMNS: &str = "id, code, description, created_at, updated_at";

fn push_bind(bind_params: &mut Vec<BindValue>, value: BindValue) -> usize {
    bind_params.push(value);
    bind_params.len()
}

/// A compiled WHERE clause with its bind values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WhereClause {
    conditions: Vec<String>,
    binds: Vec<BindValue>,
}

impl WhereClause {
    fn push_condition(&mut self, template: impl FnOnce(usize) -> String, value: BindValue) {
        let idx = push_bind(&mut self.binds, value);
        self.conditions.push(template(idx));
    }

    fn render(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    fn contains_pattern(folded: &str) -> BindValue {
        BindValue::Text(format!("%{}%", escape_like_pattern(folded)))
    }

    pub fn for_products(query: &ProductQuery) -> Self {
        let mut clause = Self::default();
        for (facet, value) in query.filters.constraints() {
            let column = facet.column();
            clause.push_condition(
                |idx| format!("{column} = ${idx}"),
                BindValue::Text(value.to_string()),
            );
        }
        if let Some(term) = &query.search {
            if term.is_unmatchable() {
                clause.conditions.push("FALSE".to_string());
                return clause;
            }
            clause.push_condition(
                |idx| format!("search_folded LIKE ${idx} ESCAPE E'\\\\'"),
                Self::contains_pattern(term.folded()),
            );
        }
        clause
    }

    pub fn for_procedures(query: &ProcedureQuery) -> Self {
        let mut clause = Self::default();
        match &query.search {
            None => {}
            Some(ProcedureSearch::CodePrefix(prefix)) => clause.push_condition(
                |idx| format!("code LIKE ${idx} ESCAPE E'\\\\'"),
                BindValue::Text(format!("{}%", escape_like_pattern(prefix))),
            ),
            Some(ProcedureSearch::Contains(folded)) if spans_fields(folded) => {
                clause.conditions.push("FALSE".to_string())
            }
            Some(ProcedureSearch::Contains(folded)) => clause.push_condition(
                |idx| format!("search_folded LIKE ${idx} ESCAPE E'\\\\'"),
                Self::contains_pattern(folded),
            ),
        }
        clause
    }

    fn count_sql(self, table: &str) -> (String, Vec<BindValue>) {
        let sql = format!("SELECT COUNT(*) FROM {table}{}", self.render());
        (sql, self.binds)
    }

    fn page_sql(mut self, table: &str, columns: &str, page: PageRequest) -> (String, Vec<BindValue>) {
        let where_sql = self.render();
        let limit_idx = push_bind(&mut self.binds, BindValue::BigInt(page.limit()));
        let offset_idx = push_bind(&mut self.binds, BindValue::BigInt(page.offset()));
        let sql = format!(
            "SELECT {columns} FROM {table}{where_sql} ORDER BY id ASC LIMIT ${limit_idx} OFFSET ${offset_idx}"
        );
        (sql, self.binds)
    }
}

pub fn product_count_sql(query: &ProductQuery) -> (String, Vec<BindValue>) {
    WhereClause::for_products(query).count_sql("products")
}

pub fn product_page_sql(query: &ProductQuery, page: PageRequest) -> (String, Vec<BindValue>) {
    WhereClause::for_products(query).page_sql("products", PRODUCT_COLUMNS, page)
}

pub fn procedure_count_sql(query: &ProcedureQuery) -> (String, Vec<BindValue>) {
    WhereClause::for_procedures(query).count_sql("procedure_codes")
}

pub fn procedure_page_sql(query: &ProcedureQuery, page: PageRequest) -> (String, Vec<BindValue>) {
    WhereClause::for_procedures(query).page_sql("procedure_codes", PROCEDURE_COLUMNS, page)
}

/// Distinct values of one facet column, in code-point order.
pub fn facet_sql(facet: Facet) -> String {
    format!(
        r#"SELECT DISTINCT {col} COLLATE "C" AS value FROM products ORDER BY value"#,
        col = facet.column()
    )
}

/// All four counters in one statement, so they share one snapshot.
pub const STATS_SQL: &str = r#"
    SELECT
        (SELECT COUNT(*) FROM products) AS total_products,
        (SELECT COUNT(*) FROM procedure_codes) AS total_procedure_codes,
        (SELECT COUNT(DISTINCT plan_name) FROM products) AS distinct_plans,
        (SELECT COUNT(DISTINCT segment) FROM products) AS distinct_segments
"#;
