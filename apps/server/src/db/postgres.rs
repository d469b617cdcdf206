//! PostgreSQL catalog store.

use crate::{
    db::query::{
        sql::{self, BindValue},
        text::fold_fields,
        Facet, PageRequest, ProcedureQuery, ProductQuery,
    },
    db::traits::{CatalogStore, UpsertMode, UpsertOutcome},
    metrics::STORE_QUERY_DURATION_SECONDS,
    models::{CatalogStats, NewProcedureCode, NewProduct, ProcedureCode, Product},
    Result,
};
use async_trait::async_trait;
use sqlx::{
    postgres::{PgArguments, PgRow},
    query::{Query, QueryScalar},
    PgPool, Postgres, Row,
};
use std::time::Instant;

const INSERT_PRODUCT_OR_SKIP: &str = r#"
    INSERT INTO products (
        product_code, plan_name, ans_plan_code, ans_registered_name, segment,
        classification, operator_code, operator_name, status, api_product_code,
        api_plan_code, search_folded
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (product_code, plan_name, api_plan_code) DO NOTHING
    RETURNING TRUE AS inserted
"#;

const INSERT_PRODUCT_OR_UPDATE: &str = r#"
    INSERT INTO products (
        product_code, plan_name, ans_plan_code, ans_registered_name, segment,
        classification, operator_code, operator_name, status, api_product_code,
        api_plan_code, search_folded
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
    ON CONFLICT (product_code, plan_name, api_plan_code) DO UPDATE SET
        ans_plan_code = EXCLUDED.ans_plan_code,
        ans_registered_name = EXCLUDED.ans_registered_name,
        segment = EXCLUDED.segment,
        classification = EXCLUDED.classification,
        operator_code = EXCLUDED.operator_code,
        operator_name = EXCLUDED.operator_name,
        status = EXCLUDED.status,
        api_product_code = EXCLUDED.api_product_code,
        search_folded = EXCLUDED.search_folded,
        updated_at = NOW()
    WHERE (
        products.ans_plan_code, products.ans_registered_name, products.segment,
        products.classification, products.operator_code, products.operator_name,
        products.status, products.api_product_code
    ) IS DISTINCT FROM (
        EXCLUDED.ans_plan_code, EXCLUDED.ans_registered_name, EXCLUDED.segment,
        EXCLUDED.classification, EXCLUDED.operator_code, EXCLUDED.operator_name,
        EXCLUDED.status, EXCLUDED.api_product_code
    )
    RETURNING (xmax = 0) AS inserted
"#;

const INSERT_PROCEDURE_OR_SKIP: &str = r#"
    INSERT INTO procedure_codes (code, description, search_folded)
    VALUES ($1, $2, $3)
    ON CONFLICT (code) DO NOTHING
    RETURNING TRUE AS inserted
"#;

const INSERT_PROCEDURE_OR_UPDATE: &str = r#"
    INSERT INTO procedure_codes (code, description, search_folded)
    VALUES ($1, $2, $3)
    ON CONFLICT (code) DO UPDATE SET
        description = EXCLUDED.description,
        search_folded = EXCLUDED.search_folded,
        updated_at = NOW()
    WHERE procedure_codes.description IS DISTINCT FROM EXCLUDED.description
    RETURNING (xmax = 0) AS inserted
"#;

/// Catalog store backed by the `products` and `procedure_codes` tables.
#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn fetch_rows(&self, query_type: &str, sql: &str, binds: Vec<BindValue>) -> Result<Vec<PgRow>> {
        let start = Instant::now();
        tracing::debug!(query_type, sql, "Executing catalog query");

        let rows = bind_query(sqlx::query(sql), binds)
            .fetch_all(&self.pool)
            .await?;

        observe(query_type, start);
        Ok(rows)
    }

    async fn fetch_count(&self, query_type: &str, sql: &str, binds: Vec<BindValue>) -> Result<i64> {
        let start = Instant::now();
        tracing::debug!(query_type, sql, "Executing catalog count");

        let total = bind_scalar(sqlx::query_scalar::<_, i64>(sql), binds)
            .fetch_one(&self.pool)
            .await?;

        observe(query_type, start);
        Ok(total)
    }
}

fn observe(query_type: &str, start: Instant) {
    STORE_QUERY_DURATION_SECONDS
        .with_label_values(&[query_type])
        .observe(start.elapsed().as_secs_f64());
}

fn bind_query<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    binds: Vec<BindValue>,
) -> Query<'q, Postgres, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
        };
    }
    query
}

fn bind_scalar<'q>(
    mut query: QueryScalar<'q, Postgres, i64, PgArguments>,
    binds: Vec<BindValue>,
) -> QueryScalar<'q, Postgres, i64, PgArguments> {
    for value in binds {
        query = match value {
            BindValue::Text(v) => query.bind(v),
            BindValue::BigInt(v) => query.bind(v),
        };
    }
    query
}

fn product_from_row(row: &PgRow) -> std::result::Result<Product, sqlx::Error> {
    Ok(Product {
        id: row.try_get("id")?,
        product_code: row.try_get("product_code")?,
        plan_name: row.try_get("plan_name")?,
        ans_plan_code: row.try_get("ans_plan_code")?,
        ans_registered_name: row.try_get("ans_registered_name")?,
        segment: row.try_get("segment")?,
        classification: row.try_get("classification")?,
        operator_code: row.try_get("operator_code")?,
        operator_name: row.try_get("operator_name")?,
        status: row.try_get("status")?,
        api_product_code: row.try_get("api_product_code")?,
        api_plan_code: row.try_get("api_plan_code")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn procedure_from_row(row: &PgRow) -> std::result::Result<ProcedureCode, sqlx::Error> {
    Ok(ProcedureCode {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        description: row.try_get("description")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn record_upsert(outcome: &mut UpsertOutcome, returned: Option<PgRow>) -> Result<()> {
    match returned {
        None => outcome.skipped += 1,
        Some(row) => {
            if row.try_get::<bool, _>("inserted")? {
                outcome.inserted += 1;
            } else {
                outcome.updated += 1;
            }
        }
    }
    Ok(())
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn count_products(&self, query: &ProductQuery) -> Result<i64> {
        let (sql, binds) = sql::product_count_sql(query);
        self.fetch_count("count_products", &sql, binds).await
    }

    async fn fetch_products(
        &self,
        query: &ProductQuery,
        page: PageRequest,
    ) -> Result<Vec<Product>> {
        let (sql, binds) = sql::product_page_sql(query, page);
        let rows = self.fetch_rows("fetch_products", &sql, binds).await?;
        rows.iter()
            .map(|row| product_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn count_procedure_codes(&self, query: &ProcedureQuery) -> Result<i64> {
        let (sql, binds) = sql::procedure_count_sql(query);
        self.fetch_count("count_procedure_codes", &sql, binds).await
    }

    async fn fetch_procedure_codes(
        &self,
        query: &ProcedureQuery,
        page: PageRequest,
    ) -> Result<Vec<ProcedureCode>> {
        let (sql, binds) = sql::procedure_page_sql(query, page);
        let rows = self.fetch_rows("fetch_procedure_codes", &sql, binds).await?;
        rows.iter()
            .map(|row| procedure_from_row(row).map_err(Into::into))
            .collect()
    }

    async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let start = Instant::now();
        let sql = format!("SELECT {} FROM products WHERE id = $1", sql::PRODUCT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        observe("get_product", start);
        row.as_ref()
            .map(product_from_row)
            .transpose()
            .map_err(Into::into)
    }

    async fn get_procedure_code(&self, code: &str) -> Result<Option<ProcedureCode>> {
        let start = Instant::now();
        let sql = format!(
            "SELECT {} FROM procedure_codes WHERE code = $1",
            sql::PROCEDURE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await?;
        observe("get_procedure_code", start);
        row.as_ref()
            .map(procedure_from_row)
            .transpose()
            .map_err(Into::into)
    }

    async fn distinct_values(&self, facet: Facet) -> Result<Vec<String>> {
        let start = Instant::now();
        let values = sqlx::query_scalar::<_, String>(&sql::facet_sql(facet))
            .fetch_all(&self.pool)
            .await?;
        observe("distinct_values", start);
        Ok(values)
    }

    async fn stats(&self) -> Result<CatalogStats> {
        let start = Instant::now();
        let row = sqlx::query(sql::STATS_SQL).fetch_one(&self.pool).await?;
        observe("stats", start);
        Ok(CatalogStats {
            total_products: row.try_get("total_products")?,
            total_procedure_codes: row.try_get("total_procedure_codes")?,
            distinct_plans: row.try_get("distinct_plans")?,
            distinct_segments: row.try_get("distinct_segments")?,
        })
    }

    async fn upsert_products(
        &self,
        rows: &[NewProduct],
        mode: UpsertMode,
    ) -> Result<UpsertOutcome> {
        let statement = match mode {
            UpsertMode::SkipExisting => INSERT_PRODUCT_OR_SKIP,
            UpsertMode::Overwrite => INSERT_PRODUCT_OR_UPDATE,
        };

        let start = Instant::now();
        let mut outcome = UpsertOutcome::default();
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let returned = sqlx::query(statement)
                .bind(&row.product_code)
                .bind(&row.plan_name)
                .bind(&row.ans_plan_code)
                .bind(&row.ans_registered_name)
                .bind(&row.segment)
                .bind(&row.classification)
                .bind(&row.operator_code)
                .bind(&row.operator_name)
                .bind(&row.status)
                .bind(&row.api_product_code)
                .bind(&row.api_plan_code)
                .bind(fold_fields(row.searchable_fields()))
                .fetch_optional(&mut *tx)
                .await?;
            record_upsert(&mut outcome, returned)?;
        }
        tx.commit().await?;
        observe("upsert_products", start);

        Ok(outcome)
    }

    async fn upsert_procedure_codes(
        &self,
        rows: &[NewProcedureCode],
        mode: UpsertMode,
    ) -> Result<UpsertOutcome> {
        let statement = match mode {
            UpsertMode::SkipExisting => INSERT_PROCEDURE_OR_SKIP,
            UpsertMode::Overwrite => INSERT_PROCEDURE_OR_UPDATE,
        };

        let start = Instant::now();
        let mut outcome = UpsertOutcome::default();
        let mut tx = self.pool.begin().await?;
        for row in rows {
            let returned = sqlx::query(statement)
                .bind(&row.code)
                .bind(&row.description)
                .bind(fold_fields([row.code.as_str(), row.description.as_str()]))
                .fetch_optional(&mut *tx)
                .await?;
            record_upsert(&mut outcome, returned)?;
        }
        tx.commit().await?;
        observe("upsert_procedure_codes", start);

        Ok(outcome)
    }
}
