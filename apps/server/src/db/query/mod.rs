//! Catalog query model - filters, search terms, facets and pagination.
//!
//! These types are backend-neutral. The PostgreSQL store compiles them to SQL
//! via [`sql`]; the in-memory store evaluates the `matches` predicates directly.
//! Both backends must agree on:
//! - filters ANDed together, search ANDed with filters
//! - case-insensitive matching through [`text::fold_for_search`]
//! - surrogate id ascending as the only result order

pub mod sql;
pub mod text;

use crate::models::{ProcedureCode, Product};
use text::{fold_for_search, is_code_prefix, spans_fields};

/// Largest page size accepted at the HTTP boundary.
pub const MAX_PAGE_SIZE: u32 = 500;
/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// A free-text search term and its folded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTerm {
    raw: String,
    folded: String,
}

impl SearchTerm {
    /// Product search term, used exactly as sent.
    ///
    /// Only absent or empty input yields `None`. Surrounding whitespace is part
    /// of the term, so `" basico"` does not match `"BASICO"` at the start of a field.
    pub fn parse(input: Option<&str>) -> Option<Self> {
        input.filter(|raw| !raw.is_empty()).map(Self::from_raw)
    }

    /// Procedure-code search term: trimmed, and blank input yields `None`.
    pub fn parse_trimmed(input: Option<&str>) -> Option<Self> {
        input
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(Self::from_raw)
    }

    fn from_raw(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            folded: fold_for_search(raw),
        }
    }

    /// Term as it will be matched, before folding.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Folded term used for case-insensitive comparison.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    /// A term holding the field separator can never match a single field.
    pub fn is_unmatchable(&self) -> bool {
        spans_fields(&self.folded)
    }

    fn found_in(&self, field: &str) -> bool {
        !self.is_unmatchable() && fold_for_search(field).contains(&self.folded)
    }
}

/// Exact-match filters over the filterable product fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    pub product_code: Option<String>,
    pub plan_name: Option<String>,
    pub segment: Option<String>,
    pub classification: Option<String>,
    pub status: Option<String>,
}

impl ProductFilters {
    /// Drop empty values so that `?segment=` imposes no constraint.
    pub fn normalized(self) -> Self {
        fn keep(value: Option<String>) -> Option<String> {
            value.filter(|v| !v.is_empty())
        }
        Self {
            product_code: keep(self.product_code),
            plan_name: keep(self.plan_name),
            segment: keep(self.segment),
            classification: keep(self.classification),
            status: keep(self.status),
        }
    }

    /// Active constraints as (facet, value) pairs in a fixed order.
    pub fn constraints(&self) -> Vec<(Facet, &str)> {
        [
            (Facet::ProductCodes, &self.product_code),
            (Facet::PlanNames, &self.plan_name),
            (Facet::Segments, &self.segment),
            (Facet::Classifications, &self.classification),
            (Facet::Statuses, &self.status),
        ]
        .into_iter()
        .filter_map(|(facet, value)| value.as_deref().map(|v| (facet, v)))
        .collect()
    }
}

/// Product listing criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductQuery {
    pub filters: ProductFilters,
    pub search: Option<SearchTerm>,
}

impl ProductQuery {
    pub fn new(filters: ProductFilters, search: Option<&str>) -> Self {
        Self {
            filters: filters.normalized(),
            search: SearchTerm::parse(search),
        }
    }

    pub fn matches(&self, product: &Product) -> bool {
        let filters_match = self
            .filters
            .constraints()
            .into_iter()
            .all(|(facet, value)| facet.value_of(product) == value);
        if !filters_match {
            return false;
        }
        match &self.search {
            Some(term) => product
                .searchable_fields()
                .iter()
                .any(|field| term.found_in(field)),
            None => true,
        }
    }
}

/// How a procedure-code search term is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureSearch {
    /// Digits-only term: prefix match on the code
    CodePrefix(String),
    /// Anything else: case-insensitive substring on code or description
    Contains(String),
}

/// Procedure-code listing criteria.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcedureQuery {
    pub search: Option<ProcedureSearch>,
}

impl ProcedureQuery {
    pub fn new(search: Option<&str>) -> Self {
        let search = SearchTerm::parse_trimmed(search).map(|term| {
            if is_code_prefix(term.raw()) {
                ProcedureSearch::CodePrefix(term.raw().to_string())
            } else {
                ProcedureSearch::Contains(term.folded().to_string())
            }
        });
        Self { search }
    }

    pub fn matches(&self, procedure: &ProcedureCode) -> bool {
        match &self.search {
            None => true,
            Some(ProcedureSearch::CodePrefix(prefix)) => procedure.code.starts_with(prefix.as_str()),
            Some(ProcedureSearch::Contains(folded)) => {
                !spans_fields(folded)
                    && (fold_for_search(&procedure.code).contains(folded.as_str())
                        || fold_for_search(&procedure.description).contains(folded.as_str()))
            }
        }
    }
}

/// Filterable product fields with distinct-value enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Facet {
    ProductCodes,
    PlanNames,
    Segments,
    Classifications,
    Statuses,
}

impl Facet {
    pub const ALL: [Facet; 5] = [
        Facet::ProductCodes,
        Facet::PlanNames,
        Facet::Segments,
        Facet::Classifications,
        Facet::Statuses,
    ];

    /// Parse the URL slug used by `/api/filters/{slug}`.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "product-codes" => Some(Self::ProductCodes),
            "plan-names" => Some(Self::PlanNames),
            "segments" => Some(Self::Segments),
            "classifications" => Some(Self::Classifications),
            "statuses" => Some(Self::Statuses),
            _ => None,
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Self::ProductCodes => "product-codes",
            Self::PlanNames => "plan-names",
            Self::Segments => "segments",
            Self::Classifications => "classifications",
            Self::Statuses => "statuses",
        }
    }

    /// Backing column in the `products` table.
    pub fn column(&self) -> &'static str {
        match self {
            Self::ProductCodes => "product_code",
            Self::PlanNames => "plan_name",
            Self::Segments => "segment",
            Self::Classifications => "classification",
            Self::Statuses => "status",
        }
    }

    pub fn value_of<'a>(&self, product: &'a Product) -> &'a str {
        match self {
            Self::ProductCodes => &product.product_code,
            Self::PlanNames => &product.plan_name,
            Self::Segments => &product.segment,
            Self::Classifications => &product.classification,
            Self::Statuses => &product.status,
        }
    }
}

/// Pagination coordinates. Range checks happen at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self { page, page_size }
    }

    /// Rows to skip. Page 0 is treated as page 1.
    pub fn offset(&self) -> i64 {
        (i64::from(self.page.max(1)) - 1) * i64::from(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    /// Number of pages for `total` matches; never less than one.
    pub fn total_pages(&self, total: i64) -> i64 {
        let size = i64::from(self.page_size.max(1));
        let pages = (total.max(0) + size - 1) / size;
        pages.max(1)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the size of the full match set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page,
            page_size: request.page_size,
            total_pages: request.total_pages(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn product(code: &str, plan: &str, ans_name: &str) -> Product {
        let now = Utc::now();
        Product {
            id: 1,
            product_code: code.to_string(),
            plan_name: plan.to_string(),
            ans_plan_code: "471234567".to_string(),
            ans_registered_name: ans_name.to_string(),
            segment: "AMBULATORIAL + HOSPITALAR".to_string(),
            classification: "COLETIVO EMPRESARIAL".to_string(),
            operator_code: "006246".to_string(),
            operator_name: "SUL AMERICA".to_string(),
            status: "ATIVO".to_string(),
            api_product_code: "P1".to_string(),
            api_plan_code: "PL1".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn procedure(code: &str, description: &str) -> ProcedureCode {
        let now = Utc::now();
        ProcedureCode {
            id: 1,
            code: code.to_string(),
            description: description.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn total_pages_has_floor_of_one() {
        let req = PageRequest::new(1, 10);
        assert_eq!(req.total_pages(0), 1);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
        assert_eq!(PageRequest::new(1, 2).total_pages(5), 3);
    }

    #[test]
    fn total_pages_matches_ceiling_for_many_sizes() {
        for size in 1..=20u32 {
            for total in 0..=100i64 {
                let expected = std::cmp::max(1, (total as f64 / size as f64).ceil() as i64);
                assert_eq!(PageRequest::new(1, size).total_pages(total), expected);
            }
        }
    }

    #[test]
    fn page_zero_has_same_offset_as_page_one() {
        assert_eq!(PageRequest::new(0, 25).offset(), 0);
        assert_eq!(PageRequest::new(1, 25).offset(), 0);
        assert_eq!(PageRequest::new(3, 25).offset(), 50);
    }

    #[test]
    fn empty_search_imposes_no_constraint() {
        assert!(SearchTerm::parse(None).is_none());
        assert!(ProductQuery::new(ProductFilters::default(), Some("")).search.is_none());
        assert!(ProcedureQuery::new(Some("   ")).search.is_none());
    }

    #[test]
    fn product_search_keeps_surrounding_whitespace() {
        let basico = product("1", "BASICO", "X");
        let plano_basico = product("2", "PLANO BASICO", "X");

        let leading = ProductQuery::new(ProductFilters::default(), Some(" BASICO"));
        assert_eq!(leading.search.as_ref().map(SearchTerm::folded), Some(" basico"));
        assert!(!leading.matches(&basico));
        assert!(leading.matches(&plano_basico));

        // Whitespace-only terms are real constraints.
        let blank = ProductQuery::new(ProductFilters::default(), Some("  "));
        assert!(blank.search.is_some());
        assert!(!blank.matches(&plano_basico));
        assert!(blank.matches(&product("3", "PLANO  DUPLO", "X")));
    }

    #[test]
    fn control_characters_reach_the_match() {
        let p = product("1", "BASICO", "X");
        assert!(!ProductQuery::new(ProductFilters::default(), Some("bas\tico")).matches(&p));
        assert!(ProductQuery::new(ProductFilters::default(), Some("\t"))
            .matches(&product("2", "A\tB", "X")));

        let spanning = ProductQuery::new(ProductFilters::default(), Some("basico\u{1f}x"));
        assert!(spanning.search.as_ref().is_some_and(SearchTerm::is_unmatchable));
        assert!(!spanning.matches(&p));
    }

    #[test]
    fn empty_filter_values_are_dropped() {
        let filters = ProductFilters {
            segment: Some(String::new()),
            status: Some("ATIVO".to_string()),
            ..Default::default()
        }
        .normalized();
        assert_eq!(filters.segment, None);
        assert_eq!(filters.constraints(), vec![(Facet::Statuses, "ATIVO")]);
    }

    #[test]
    fn product_search_is_case_insensitive_substring() {
        let p = product("123", "MODERNO", "PLANO MODERNO NACIONAL");
        for term in ["moderno", "Moderno", "MODE", "dern"] {
            let query = ProductQuery::new(ProductFilters::default(), Some(term));
            assert!(query.matches(&p), "term {term} should match");
        }
        let query = ProductQuery::new(ProductFilters::default(), Some("classico"));
        assert!(!query.matches(&p));
    }

    #[test]
    fn product_search_handles_accented_text() {
        let p = product("123", "ODONTOLÓGICO", "X");
        let query = ProductQuery::new(ProductFilters::default(), Some("odontológico"));
        assert!(query.matches(&p));
    }

    #[test]
    fn product_search_does_not_look_at_operator_fields() {
        let p = product("123", "BASICO", "X");
        let query = ProductQuery::new(ProductFilters::default(), Some("sul america"));
        assert!(!query.matches(&p));
    }

    #[test]
    fn filters_and_search_are_anded() {
        let p = product("123", "BASICO", "X");
        let filters = ProductFilters {
            plan_name: Some("BASICO".to_string()),
            ..Default::default()
        };
        assert!(ProductQuery::new(filters.clone(), Some("123")).matches(&p));
        assert!(!ProductQuery::new(filters, Some("999")).matches(&p));

        let mismatched = ProductFilters {
            plan_name: Some("BASICO".to_string()),
            status: Some("INATIVO".to_string()),
            ..Default::default()
        };
        assert!(!ProductQuery::new(mismatched, None).matches(&p));
    }

    #[test]
    fn filters_are_exact_and_case_sensitive() {
        let p = product("123", "BASICO", "X");
        let filters = ProductFilters {
            plan_name: Some("basico".to_string()),
            ..Default::default()
        };
        assert!(!ProductQuery::new(filters, None).matches(&p));
    }

    #[test]
    fn digit_terms_are_code_prefix_searches() {
        let query = ProcedureQuery::new(Some(" 456 "));
        assert_eq!(
            query.search,
            Some(ProcedureSearch::CodePrefix("456".to_string()))
        );
        assert!(query.matches(&procedure("45678", "CONSULTA")));
        assert!(!query.matches(&procedure("04567", "CONSULTA")));
        assert!(!query.matches(&procedure("99999", "EXAME 456")));
    }

    #[test]
    fn text_terms_match_code_or_description() {
        let query = ProcedureQuery::new(Some("Consulta"));
        assert!(query.matches(&procedure("10101012", "CONSULTA EM CONSULTÓRIO")));
        assert!(!query.matches(&procedure("10101012", "EXAME")));

        let mixed = ProcedureQuery::new(Some("1010-a"));
        assert!(mixed.matches(&procedure("X1010-A", "EXAME")));
    }

    #[test]
    fn facet_slugs_round_trip() {
        for facet in Facet::ALL {
            assert_eq!(Facet::from_slug(facet.slug()), Some(facet));
        }
        assert_eq!(Facet::from_slug("operators"), None);
    }

    #[test]
    fn page_map_keeps_envelope() {
        let page = Page::new(vec![1, 2], 5, PageRequest::new(1, 2)).map(|v| v * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total, 5);
        assert_eq!(page.total_pages, 3);
    }
}
