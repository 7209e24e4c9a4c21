//! Translation of storefront product filters into WooCommerce query parameters.

use rust_decimal::Decimal;

use hearth_core::{StockStatus, TagId};

use crate::woocommerce::types::Category;

/// Default page size for product listings.
pub const DEFAULT_PER_PAGE: u32 = 12;

/// Upper bound WooCommerce accepts for `per_page`.
pub const MAX_PER_PAGE: u32 = 100;

/// Product listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductSort {
    Newest,
    PriceAsc,
    PriceDesc,
    Popular,
    Rating,
    Name,
}

impl ProductSort {
    /// Parse a storefront sort value. Unknown values yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "newest" | "date" => Some(Self::Newest),
            "price-asc" | "price" => Some(Self::PriceAsc),
            "price-desc" => Some(Self::PriceDesc),
            "popular" | "popularity" => Some(Self::Popular),
            "rating" => Some(Self::Rating),
            "name" | "title" => Some(Self::Name),
            _ => None,
        }
    }

    /// Upstream `(orderby, order)` pair.
    #[must_use]
    pub const fn upstream(&self) -> (&'static str, &'static str) {
        match self {
            Self::Newest => ("date", "desc"),
            Self::PriceAsc => ("price", "asc"),
            Self::PriceDesc => ("price", "desc"),
            Self::Popular => ("popularity", "desc"),
            Self::Rating => ("rating", "desc"),
            Self::Name => ("title", "asc"),
        }
    }
}

/// Product listing filter as requested by a shopper.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilter {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub search: Option<String>,
    /// Human-readable category slugs.
    pub categories: Vec<String>,
    /// Tag IDs; values that are not numeric are dropped.
    pub tags: Vec<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<ProductSort>,
    pub on_sale: bool,
    pub featured: bool,
    pub in_stock: bool,
}

impl ProductFilter {
    /// Effective page number (1-based).
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, clamped to what the upstream accepts.
    #[must_use]
    pub fn per_page(&self) -> u32 {
        self.per_page
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE)
    }

    /// Whether translation needs the category listing to resolve slugs.
    #[must_use]
    pub fn needs_categories(&self) -> bool {
        self.categories.iter().any(|s| !s.trim().is_empty())
    }
}

/// Outcome of translating a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamQuery {
    /// Parameters to send to `GET /products`.
    Params(Vec<(&'static str, String)>),
    /// Every requested category slug was unknown; the listing is empty by
    /// definition and no upstream call is needed.
    NoMatch,
}

/// Resolve category slugs to their numeric IDs. Unknown slugs are dropped.
#[must_use]
pub fn resolve_category_slugs(slugs: &[String], categories: &[Category]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for slug in slugs {
        let slug = slug.trim();
        if slug.is_empty() {
            continue;
        }
        match categories.iter().find(|c| c.slug.eq_ignore_ascii_case(slug)) {
            Some(category) => {
                let id = category.id.to_string();
                if !ids.contains(&id) {
                    ids.push(id);
                }
            }
            None => tracing::debug!(slug, "dropping unknown category slug"),
        }
    }
    ids
}

/// Build the upstream query for a product listing.
///
/// `categories` is the upstream category listing and is only consulted when
/// the filter names category slugs.
#[must_use]
pub fn build_product_query(filter: &ProductFilter, categories: &[Category]) -> UpstreamQuery {
    let mut params: Vec<(&'static str, String)> = vec![
        ("page", filter.page().to_string()),
        ("per_page", filter.per_page().to_string()),
        ("status", "publish".to_string()),
    ];

    if filter.needs_categories() {
        let ids = resolve_category_slugs(&filter.categories, categories);
        if ids.is_empty() {
            return UpstreamQuery::NoMatch;
        }
        params.push(("category", ids.join(",")));
    }

    let tags: Vec<String> = filter
        .tags
        .iter()
        .filter_map(|t| t.parse::<TagId>().ok())
        .map(|t| t.to_string())
        .collect();
    if !tags.is_empty() {
        params.push(("tag", tags.join(",")));
    }

    if let Some(search) = filter.search.as_deref().map(str::trim)
        && !search.is_empty()
    {
        params.push(("search", search.to_string()));
    }

    if let Some(min) = filter.min_price {
        params.push(("min_price", min.normalize().to_string()));
    }
    if let Some(max) = filter.max_price {
        params.push(("max_price", max.normalize().to_string()));
    }

    if let Some(sort) = filter.sort {
        let (orderby, order) = sort.upstream();
        params.push(("orderby", orderby.to_string()));
        params.push(("order", order.to_string()));
    }

    if filter.on_sale {
        params.push(("on_sale", "true".to_string()));
    }
    if filter.featured {
        params.push(("featured", "true".to_string()));
    }
    if filter.in_stock {
        params.push(("stock_status", StockStatus::InStock.as_str().to_string()));
    }

    UpstreamQuery::Params(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::CategoryId;

    fn category(id: u64, slug: &str) -> Category {
        Category {
            id: CategoryId::new(id),
            name: slug.to_string(),
            slug: slug.to_string(),
            parent: 0,
            description: String::new(),
            count: 0,
            image: None,
        }
    }

    fn param<'a>(query: &'a UpstreamQuery, key: &str) -> Option<&'a str> {
        match query {
            UpstreamQuery::Params(params) => params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str()),
            UpstreamQuery::NoMatch => None,
        }
    }

    #[test]
    fn test_category_slug_resolved_to_id() {
        let categories = vec![category(5, "hoodies")];
        let filter = ProductFilter {
            categories: vec!["hoodies".to_string()],
            ..ProductFilter::default()
        };

        let query = build_product_query(&filter, &categories);
        assert_eq!(param(&query, "category"), Some("5"));
    }

    #[test]
    fn test_unmatched_slug_dropped() {
        let categories = vec![category(5, "hoodies"), category(9, "mugs")];
        let filter = ProductFilter {
            categories: vec!["hoodies".to_string(), "spaceships".to_string()],
            ..ProductFilter::default()
        };

        let query = build_product_query(&filter, &categories);
        assert_eq!(param(&query, "category"), Some("5"));

        let UpstreamQuery::Params(params) = query else {
            panic!("expected params");
        };
        assert!(params.iter().all(|(_, v)| !v.contains("spaceships")));
    }

    #[test]
    fn test_all_slugs_unmatched_is_no_match() {
        let categories = vec![category(5, "hoodies")];
        let filter = ProductFilter {
            categories: vec!["spaceships".to_string()],
            ..ProductFilter::default()
        };

        assert_eq!(
            build_product_query(&filter, &categories),
            UpstreamQuery::NoMatch
        );
    }

    #[test]
    fn test_multiple_categories_joined() {
        let categories = vec![category(5, "hoodies"), category(9, "mugs")];
        let filter = ProductFilter {
            categories: vec!["mugs".to_string(), "Hoodies".to_string(), "mugs".to_string()],
            ..ProductFilter::default()
        };

        let query = build_product_query(&filter, &categories);
        assert_eq!(param(&query, "category"), Some("9,5"));
    }

    #[test]
    fn test_no_category_filter_leaves_category_out() {
        let filter = ProductFilter::default();
        let query = build_product_query(&filter, &[]);
        assert_eq!(param(&query, "category"), None);
        assert_eq!(param(&query, "page"), Some("1"));
        assert_eq!(param(&query, "per_page"), Some("12"));
    }

    #[test]
    fn test_full_filter_translation() {
        let filter = ProductFilter {
            page: Some(3),
            per_page: Some(500),
            search: Some("  fleece ".to_string()),
            tags: vec!["17".to_string(), "cozy".to_string()],
            min_price: Some(Decimal::new(1000, 2)),
            max_price: Some(Decimal::new(50, 0)),
            sort: Some(ProductSort::PriceDesc),
            on_sale: true,
            in_stock: true,
            ..ProductFilter::default()
        };

        let query = build_product_query(&filter, &[]);
        assert_eq!(param(&query, "page"), Some("3"));
        assert_eq!(param(&query, "per_page"), Some("100"));
        assert_eq!(param(&query, "search"), Some("fleece"));
        assert_eq!(param(&query, "tag"), Some("17"));
        assert_eq!(param(&query, "min_price"), Some("10"));
        assert_eq!(param(&query, "max_price"), Some("50"));
        assert_eq!(param(&query, "orderby"), Some("price"));
        assert_eq!(param(&query, "order"), Some("desc"));
        assert_eq!(param(&query, "on_sale"), Some("true"));
        assert_eq!(param(&query, "stock_status"), Some("instock"));
        assert_eq!(param(&query, "featured"), None);
    }

    #[test]
    fn test_sort_parse() {
        assert_eq!(ProductSort::parse("price-asc"), Some(ProductSort::PriceAsc));
        assert_eq!(ProductSort::parse("NEWEST"), Some(ProductSort::Newest));
        assert_eq!(ProductSort::parse("random"), None);
    }
}
