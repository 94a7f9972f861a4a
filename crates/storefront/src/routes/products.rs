//! Product route handlers.

use axum::{Json, extract::State};
use serde::Serialize;
use tracing::instrument;

use threadline_core::{
    CatalogFilter, CatalogPredicate, CatalogQuery, PageRequest, ProductId, ProductOrder,
};

use crate::config::CatalogConfig;
use crate::db::{CatalogRepository, ProductRepository};
use crate::error::{AppError, Result, messages};
use crate::extract::{PathParams, QueryParams};
use crate::models::{ProductDetail, ProductPage, SubCategoryGroup};
use crate::state::AppState;

/// Products shown per sub-category on a menu page.
const PRODUCTS_PER_SUB_CATEGORY: i64 = 4;

/// Raw listing query string.
///
/// Multi-valued filters may be repeated and may use either the bare name
/// or the bracketed form (`colors=Red&colors[]=Blue`). Unknown keys are
/// ignored.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ListingParams {
    page: Option<String>,
    page_count: Option<String>,
    menu: Option<String>,
    sub_category: Option<String>,
    colors: Vec<String>,
    sizes: Vec<String>,
    hashtags: Vec<String>,
    order: Option<String>,
    word: Option<String>,
}

impl FromIterator<(String, String)> for ListingParams {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            match key.strip_suffix("[]").unwrap_or(&key) {
                "page" => params.page = Some(value),
                "page_count" => params.page_count = Some(value),
                "menu" => params.menu = Some(value),
                "sub_category" => params.sub_category = Some(value),
                "order" => params.order = Some(value),
                "word" => params.word = Some(value),
                "colors" => params.colors.push(value),
                "sizes" => params.sizes.push(value),
                "hashtags" => params.hashtags.push(value),
                _ => {}
            }
        }
        params
    }
}

impl ListingParams {
    /// Validate into a typed listing request.
    ///
    /// # Errors
    ///
    /// Returns `INVALID_PAGE` for a bad `page`/`page_count` and
    /// `INVALID_ORDER` for an unknown sort key.
    pub fn into_query(self, limits: CatalogConfig) -> Result<CatalogQuery> {
        let page = PageRequest::parse(
            self.page.as_deref(),
            self.page_count.as_deref(),
            limits.default_page_size,
            limits.max_page_size,
        )?;

        let order = match self.order.as_deref().map(str::trim) {
            None | Some("") => ProductOrder::default(),
            Some(raw) => raw.parse()?,
        };

        let filter = CatalogFilter::default()
            .and_some(self.word, CatalogPredicate::NameContains)
            .and_some(self.menu, CatalogPredicate::MenuEquals)
            .and_some(self.sub_category, CatalogPredicate::SubCategoryEquals)
            .and(CatalogPredicate::ColorIn(self.colors))
            .and(CatalogPredicate::SizeIn(self.sizes))
            .and(CatalogPredicate::HashtagIn(self.hashtags));

        Ok(CatalogQuery {
            filter,
            order,
            page,
        })
    }
}

/// Menu page response.
#[derive(Debug, Serialize)]
pub struct MenuListing {
    #[serde(rename = "SUB_CATEGORY_LIST")]
    pub sub_categories: Vec<SubCategoryGroup>,
}

/// Product detail response.
#[derive(Debug, Serialize)]
pub struct ProductInfo {
    #[serde(rename = "PRODUCT_INFO")]
    pub product: ProductDetail,
}

/// Filtered, sorted, paginated product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    QueryParams(pairs): QueryParams<Vec<(String, String)>>,
) -> Result<Json<ProductPage>> {
    let query = pairs
        .into_iter()
        .collect::<ListingParams>()
        .into_query(state.catalog())?;

    let page = CatalogRepository::new(state.pool()).list(&query).await?;
    Ok(Json(page))
}

/// Sub-categories of a menu, each with its first few products.
#[instrument(skip(state))]
pub async fn by_menu(
    State(state): State<AppState>,
    PathParams(menu): PathParams<String>,
) -> Result<Json<MenuListing>> {
    let sub_categories = CatalogRepository::new(state.pool())
        .grouped_by_sub_category(&menu, PRODUCTS_PER_SUB_CATEGORY)
        .await?;

    Ok(Json(MenuListing { sub_categories }))
}

/// Product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    PathParams(product_id): PathParams<ProductId>,
) -> Result<Json<ProductInfo>> {
    let product = ProductRepository::new(state.pool())
        .detail(product_id)
        .await
        .map_err(AppError::or_not_found(messages::PRODUCT_NOT_FOUND))?;

    Ok(Json(ProductInfo { product }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::SortKey;

    use super::*;

    fn params(pairs: &[(&str, &str)]) -> ListingParams {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_bracketed_and_bare_keys_accumulate() {
        let p = params(&[("colors", "Red"), ("colors[]", "Blue"), ("sizes[]", "M")]);
        assert_eq!(p.colors, vec!["Red", "Blue"]);
        assert_eq!(p.sizes, vec!["M"]);
        assert!(p.hashtags.is_empty());
    }

    #[test]
    fn test_defaults() {
        let q = params(&[]).into_query(CatalogConfig::default()).unwrap();
        assert!(q.filter.is_empty());
        assert_eq!(q.order, ProductOrder::default());
        assert_eq!(q.page.page(), 1);
        assert_eq!(q.page.size(), 16);
    }

    #[test]
    fn test_full_query() {
        let q = params(&[
            ("sub_category", "Shirts"),
            ("colors[]", "Red"),
            ("colors[]", "Blue"),
            ("page", "1"),
            ("page_count", "2"),
            ("order", "-price"),
            ("utm_source", "mail"),
        ])
        .into_query(CatalogConfig::default())
        .unwrap();

        assert_eq!(
            q.filter.predicates(),
            &[
                CatalogPredicate::SubCategoryEquals("Shirts".into()),
                CatalogPredicate::ColorIn(vec!["Red".into(), "Blue".into()]),
            ]
        );
        assert_eq!(q.order, ProductOrder::descending(SortKey::Price));
        assert_eq!(q.page.size(), 2);
    }

    #[test]
    fn test_invalid_page_and_order() {
        let err = params(&[("page", "abc")])
            .into_query(CatalogConfig::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "INVALID_PAGE"));

        let err = params(&[("page_count", "101")])
            .into_query(CatalogConfig::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "INVALID_PAGE"));

        let err = params(&[("order", "rating")])
            .into_query(CatalogConfig::default())
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "INVALID_ORDER"));
    }
}
