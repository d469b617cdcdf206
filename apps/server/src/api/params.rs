//! Query-string parameters and validating extractors.
//!
//! Range checks run here, before the catalog service sees a request. Malformed
//! numbers and out-of-range values both become 400 responses carrying the
//! standard error body.

use crate::{
    db::query::{ProcedureQuery, ProductFilters, ProductQuery, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE},
    db::PageRequest,
    Error,
};
use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::request::Parts,
};
use serde::{de::DeserializeOwned, Deserialize};
use validator::Validate;

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

/// `GET /api/products` parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProductListParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = MAX_PAGE_SIZE, message = "page_size must be between 1 and 500"))]
    pub page_size: u32,
    pub product_code: Option<String>,
    pub plan_name: Option<String>,
    pub segment: Option<String>,
    pub classification: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
}

impl ProductListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn to_query(&self) -> ProductQuery {
        let filters = ProductFilters {
            product_code: self.product_code.clone(),
            plan_name: self.plan_name.clone(),
            segment: self.segment.clone(),
            classification: self.classification.clone(),
            status: self.status.clone(),
        };
        ProductQuery::new(filters, self.search.as_deref())
    }
}

/// `GET /api/tuss` parameters.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ProcedureListParams {
    #[serde(default = "default_page")]
    #[validate(range(min = 1, message = "page must be at least 1"))]
    pub page: u32,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = MAX_PAGE_SIZE, message = "page_size must be between 1 and 500"))]
    pub page_size: u32,
    pub search: Option<String>,
}

impl ProcedureListParams {
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    pub fn to_query(&self) -> ProcedureQuery {
        ProcedureQuery::new(self.search.as_deref())
    }
}

/// Query-string extractor that also runs `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Path extractor whose rejection uses the standard error body.
#[derive(Debug, Clone, Default, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Error))]
pub struct Path<T>(pub T);
