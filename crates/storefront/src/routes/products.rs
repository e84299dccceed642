//! Product route handlers.
//!
//! The listing applies search, filter, and sort in memory over the cached
//! catalog - the demo API has no query surface beyond a result cap.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use superstore_core::ProductId;

use crate::error::Result;
use crate::fakestore::StoreApiError;
use crate::fakestore::types::Product;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::session::CurrentUser;
use crate::routes::current_user;
use crate::routes::wishlist::wishlist_ids;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Product display data for card grids.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub rating: String,
    pub rating_count: i64,
    pub in_wishlist: bool,
}

impl ProductCardView {
    /// Build a card view, marking whether the product is wishlisted.
    #[must_use]
    pub fn from_product(product: &Product, wishlist: &[ProductId]) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: product.price.to_string(),
            rating: format!("{:.1}", product.rating.rate),
            rating_count: product.rating.count,
            in_wishlist: wishlist.contains(&product.id),
        }
    }
}

/// Product display data for the quick-look fragment.
#[derive(Clone)]
pub struct ProductDetailView {
    pub id: ProductId,
    pub title: String,
    pub category: String,
    pub image: String,
    pub price: String,
    pub rating: String,
    pub rating_count: i64,
    pub description: String,
    pub in_wishlist: bool,
}

impl ProductDetailView {
    fn from_product(product: &Product, wishlist: &[ProductId]) -> Self {
        Self {
            id: product.id,
            title: product.title.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            price: product.price.to_string(),
            rating: format!("{:.1}", product.rating.rate),
            rating_count: product.rating.count,
            description: product.description.clone(),
            in_wishlist: wishlist.contains(&product.id),
        }
    }
}

// =============================================================================
// Query Parameters
// =============================================================================

/// Listing query parameters.
///
/// Numeric bounds arrive as raw strings: browsers submit empty fields as
/// empty values, and an unparseable bound should relax the filter rather
/// than reject the whole request.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    /// Search text, matched against title, description, and category.
    pub q: Option<String>,
    /// Exact category filter; empty or "all" means no filter.
    pub category: Option<String>,
    /// Inclusive lower price bound.
    pub min_price: Option<String>,
    /// Inclusive upper price bound.
    pub max_price: Option<String>,
    /// Minimum average rating.
    pub min_rating: Option<String>,
    /// Sort option; see [`SortOption`].
    pub sort: Option<String>,
}

impl ProductsQuery {
    fn min_price(&self) -> Option<Decimal> {
        parse_bound(self.min_price.as_deref())
    }

    fn max_price(&self) -> Option<Decimal> {
        parse_bound(self.max_price.as_deref())
    }

    fn min_rating(&self) -> Option<f64> {
        self.min_rating
            .as_deref()
            .and_then(|value| value.trim().parse().ok())
    }
}

fn parse_bound(value: Option<&str>) -> Option<Decimal> {
    value.and_then(|value| value.trim().parse().ok())
}

/// Listing sort options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Catalog order, unchanged.
    #[default]
    Featured,
    /// Cheapest first.
    PriceLow,
    /// Most expensive first.
    PriceHigh,
    /// Best rated first.
    Rating,
}

impl SortOption {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("price-low") => Self::PriceLow,
            Some("price-high") => Self::PriceHigh,
            Some("rating") => Self::Rating,
            _ => Self::Featured,
        }
    }

    const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceLow => "price-low",
            Self::PriceHigh => "price-high",
            Self::Rating => "rating",
        }
    }
}

/// Query state echoed back into the filter form.
pub struct QueryView {
    pub q: String,
    pub category: String,
    pub min_price: String,
    pub max_price: String,
    pub min_rating: String,
    pub sort: &'static str,
}

impl QueryView {
    fn new(query: &ProductsQuery, sort: SortOption) -> Self {
        Self {
            q: query.q.clone().unwrap_or_default(),
            category: query.category.clone().unwrap_or_default(),
            min_price: query.min_price.clone().unwrap_or_default(),
            max_price: query.max_price.clone().unwrap_or_default(),
            min_rating: query.min_rating.clone().unwrap_or_default(),
            sort: sort.as_str(),
        }
    }
}

// =============================================================================
// Filtering and Sorting
// =============================================================================

/// Apply search and filter criteria, preserving catalog order.
#[must_use]
pub fn apply_filters(products: &[Product], query: &ProductsQuery) -> Vec<Product> {
    let search = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase);
    let category = query
        .category
        .as_deref()
        .filter(|c| !c.is_empty() && *c != "all");

    products
        .iter()
        .filter(|product| {
            if let Some(search) = &search {
                let matches = product.title.to_lowercase().contains(search)
                    || product.description.to_lowercase().contains(search)
                    || product.category.to_lowercase().contains(search);
                if !matches {
                    return false;
                }
            }
            if let Some(category) = category {
                if product.category != category {
                    return false;
                }
            }
            if let Some(min) = query.min_price() {
                if product.price.amount() < min {
                    return false;
                }
            }
            if let Some(max) = query.max_price() {
                if product.price.amount() > max {
                    return false;
                }
            }
            if let Some(min_rating) = query.min_rating() {
                if product.rating.rate < min_rating {
                    return false;
                }
            }
            true
        })
        .cloned()
        .collect()
}

/// Sort the listing in place. Featured keeps catalog order.
pub fn apply_sort(products: &mut [Product], sort: SortOption) {
    match sort {
        SortOption::Featured => {}
        SortOption::PriceLow => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortOption::PriceHigh => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortOption::Rating => products.sort_by(|a, b| {
            b.rating
                .rate
                .partial_cmp(&a.rating.rate)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

/// Distinct categories in catalog order.
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for product in products {
        if !seen.contains(&product.category) {
            seen.push(product.category.clone());
        }
    }
    seen
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub user: Option<CurrentUser>,
    pub nonce: String,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<String>,
    pub query: QueryView,
    pub result_count: usize,
}

/// Quick look fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/quick_look.html")]
pub struct QuickLookTemplate {
    pub product: ProductDetailView,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the product listing page.
#[instrument(skip(state, session, nonce))]
pub async fn index(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
    Query(query): Query<ProductsQuery>,
) -> impl IntoResponse {
    let catalog = match state.store().get_products().await {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!("Failed to load catalog: {e}");
            Vec::new()
        }
    };

    let sort = SortOption::parse(query.sort.as_deref());
    let mut filtered = apply_filters(&catalog, &query);
    apply_sort(&mut filtered, sort);

    let wishlist = wishlist_ids(&session).await;
    let products: Vec<ProductCardView> = filtered
        .iter()
        .map(|product| ProductCardView::from_product(product, &wishlist))
        .collect();

    ProductsIndexTemplate {
        user: current_user(&session).await,
        nonce,
        result_count: products.len(),
        products,
        categories: categories(&catalog),
        query: QueryView::new(&query, sort),
    }
}

/// Display the quick-look fragment (HTMX).
#[instrument(skip(state, session))]
pub async fn quick_look(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Response> {
    match state.store().get_product(ProductId::new(id)).await {
        Ok(product) => {
            let wishlist = wishlist_ids(&session).await;
            Ok(QuickLookTemplate {
                product: ProductDetailView::from_product(&product, &wishlist),
            }
            .into_response())
        }
        Err(StoreApiError::NotFound(_)) => Ok((
            StatusCode::NOT_FOUND,
            Html("<p class=\"modal-error\">This product is no longer available.</p>"),
        )
            .into_response()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use superstore_core::Price;

    use super::*;
    use crate::fakestore::types::Rating;

    fn product(id: i32, title: &str, category: &str, cents: i64, rate: f64) -> Product {
        Product {
            id: ProductId::new(id),
            title: title.to_string(),
            price: Price::from_cents(cents),
            description: format!("{title} description"),
            category: category.to_string(),
            image: String::new(),
            rating: Rating { rate, count: 5 },
        }
    }

    fn sample_catalog() -> Vec<Product> {
        vec![
            product(1, "Backpack", "men's clothing", 10995, 3.9),
            product(2, "Gold Ring", "jewelery", 16800, 4.6),
            product(3, "Hard Drive", "electronics", 6400, 4.1),
        ]
    }

    #[test]
    fn test_search_matches_title_description_and_category() {
        let catalog = sample_catalog();

        let by_title = apply_filters(
            &catalog,
            &ProductsQuery {
                q: Some("backpack".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_title.len(), 1);

        let by_category = apply_filters(
            &catalog,
            &ProductsQuery {
                q: Some("JEWEL".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(by_category.len(), 1);
        assert_eq!(by_category.first().unwrap().id, ProductId::new(2));
    }

    #[test]
    fn test_category_filter_ignores_all() {
        let catalog = sample_catalog();

        let all = apply_filters(
            &catalog,
            &ProductsQuery {
                category: Some("all".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(all.len(), 3);

        let electronics = apply_filters(
            &catalog,
            &ProductsQuery {
                category: Some("electronics".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(electronics.len(), 1);
    }

    #[test]
    fn test_price_range_is_inclusive() {
        let catalog = sample_catalog();
        let filtered = apply_filters(
            &catalog,
            &ProductsQuery {
                min_price: Some("64".to_string()),
                max_price: Some("109.95".to_string()),
                ..Default::default()
            },
        );
        let ids: Vec<i32> = filtered.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_min_rating_filter() {
        let catalog = sample_catalog();
        let filtered = apply_filters(
            &catalog,
            &ProductsQuery {
                min_rating: Some("4.0".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_unparseable_bounds_relax_the_filter() {
        let catalog = sample_catalog();
        let filtered = apply_filters(
            &catalog,
            &ProductsQuery {
                min_price: Some(String::new()),
                max_price: Some("not a number".to_string()),
                min_rating: Some(String::new()),
                ..Default::default()
            },
        );
        assert_eq!(filtered.len(), 3);
    }

    #[test]
    fn test_sort_by_price() {
        let mut products = sample_catalog();
        apply_sort(&mut products, SortOption::PriceLow);
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![3, 1, 2]);

        apply_sort(&mut products, SortOption::PriceHigh);
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_sort_by_rating_descending() {
        let mut products = sample_catalog();
        apply_sort(&mut products, SortOption::Rating);
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_featured_keeps_catalog_order() {
        let mut products = sample_catalog();
        apply_sort(&mut products, SortOption::Featured);
        let ids: Vec<i32> = products.iter().map(|p| p.id.as_i32()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_categories_deduplicate_in_order() {
        let mut catalog = sample_catalog();
        catalog.push(product(4, "Another Drive", "electronics", 9900, 4.8));
        assert_eq!(
            categories(&catalog),
            vec!["men's clothing", "jewelery", "electronics"]
        );
    }

    #[test]
    fn test_sort_option_parse_roundtrip() {
        assert_eq!(SortOption::parse(Some("price-low")), SortOption::PriceLow);
        assert_eq!(SortOption::parse(Some("rating")), SortOption::Rating);
        assert_eq!(SortOption::parse(Some("bogus")), SortOption::Featured);
        assert_eq!(SortOption::parse(None), SortOption::Featured);
    }
}
