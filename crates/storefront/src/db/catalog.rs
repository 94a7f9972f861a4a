//! Product listing queries.
//!
//! A [`CatalogQuery`] is rendered into two statements sharing one `WHERE`
//! clause: a `COUNT(*)` over the whole match set and a windowed `SELECT`
//! for the requested page. Every user-supplied value is bound; only fixed
//! fragments chosen by matching on typed enums are spliced into the SQL.
//!
//! Multi-valued filters use `EXISTS` sub-queries and aggregates use
//! `LATERAL` sub-queries, so the outer query has exactly one row per
//! product and needs no `GROUP BY` or `DISTINCT`.

use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::instrument;

use threadline_core::{CatalogFilter, CatalogPredicate, CatalogQuery, ProductOrder, SortKey};

use super::RepositoryError;
use crate::models::{ProductPage, ProductSummary, SubCategoryGroup};

/// Listing columns, in [`ProductSummary`] field order.
pub(crate) const SUMMARY_COLUMNS: &str = "\
    p.id, p.name, p.price, p.discount_rate, \
    COALESCE(stats.score_avg, 0)::FLOAT8 AS review_score_avg, \
    thumb.image_url AS thumbnail, \
    COALESCE(stats.color_count, 0)::INT8 AS color_count";

/// Catalog hierarchy joins. Each product has exactly one row here.
const HIERARCHY_JOINS: &str = "\
    FROM storefront.product p \
    JOIN storefront.sub_category sc ON sc.id = p.sub_category_id \
    JOIN storefront.main_category mc ON mc.id = sc.main_category_id \
    JOIN storefront.menu m ON m.id = mc.menu_id";

/// Per-product aggregates and thumbnail.
pub(crate) const SUMMARY_JOINS: &str = " \
    LEFT JOIN LATERAL ( \
        SELECT \
            (SELECT AVG(r.score) FROM storefront.review r WHERE r.product_id = p.id) AS score_avg, \
            (SELECT COUNT(DISTINCT pci.color_id) FROM storefront.product_color_image pci \
             WHERE pci.product_id = p.id) AS color_count \
    ) stats ON TRUE \
    LEFT JOIN LATERAL ( \
        SELECT i.image_url \
        FROM storefront.product_color_image pci \
        JOIN storefront.image i ON i.id = pci.image_id \
        WHERE pci.product_id = p.id \
        ORDER BY pci.id \
        LIMIT 1 \
    ) thumb ON TRUE";

/// Renders a [`CatalogQuery`] into SQL.
#[derive(Debug, Clone, Copy)]
pub struct ListingSql<'q> {
    query: &'q CatalogQuery,
}

impl<'q> ListingSql<'q> {
    /// Wrap a listing request.
    #[must_use]
    pub const fn new(query: &'q CatalogQuery) -> Self {
        Self { query }
    }

    /// `SELECT COUNT(*)` over every matching product.
    #[must_use]
    pub fn count(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) ");
        qb.push(HIERARCHY_JOINS);
        push_where(&mut qb, &self.query.filter);
        qb
    }

    /// Ordered, windowed page of matching products.
    #[must_use]
    pub fn page(&self) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new("SELECT ");
        qb.push(SUMMARY_COLUMNS);
        qb.push(" ");
        qb.push(HIERARCHY_JOINS);
        qb.push(SUMMARY_JOINS);
        push_where(&mut qb, &self.query.filter);
        push_order(&mut qb, self.query.order);

        let page = self.query.page;
        qb.push(" LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());
        qb
    }
}

/// Append `WHERE TRUE AND <clause>...` for every predicate in `filter`.
fn push_where(qb: &mut QueryBuilder<'static, Postgres>, filter: &CatalogFilter) {
    qb.push(" WHERE TRUE");
    for predicate in filter.predicates() {
        qb.push(" AND ");
        push_predicate(qb, predicate);
    }
}

fn push_predicate(qb: &mut QueryBuilder<'static, Postgres>, predicate: &CatalogPredicate) {
    match predicate {
        CatalogPredicate::NameContains(word) => {
            qb.push("p.name ILIKE ");
            qb.push_bind(format!("%{}%", escape_like(word)));
            qb.push(r" ESCAPE '\'");
        }
        CatalogPredicate::MenuEquals(name) => {
            qb.push("m.name = ");
            qb.push_bind(name.clone());
        }
        CatalogPredicate::SubCategoryEquals(name) => {
            qb.push("sc.name = ");
            qb.push_bind(name.clone());
        }
        CatalogPredicate::ColorIn(names) => {
            qb.push(
                "EXISTS (SELECT 1 FROM storefront.product_color_image f \
                 JOIN storefront.color c ON c.id = f.color_id \
                 WHERE f.product_id = p.id AND c.name = ANY(",
            );
            qb.push_bind(names.clone());
            qb.push("))");
        }
        CatalogPredicate::SizeIn(names) => {
            qb.push(
                "EXISTS (SELECT 1 FROM storefront.product_size f \
                 JOIN storefront.size s ON s.id = f.size_id \
                 WHERE f.product_id = p.id AND s.name = ANY(",
            );
            qb.push_bind(names.clone());
            qb.push("))");
        }
        CatalogPredicate::HashtagIn(names) => {
            qb.push(
                "EXISTS (SELECT 1 FROM storefront.product_hashtag f \
                 JOIN storefront.hashtag h ON h.id = f.hashtag_id \
                 WHERE f.product_id = p.id AND h.name = ANY(",
            );
            qb.push_bind(names.clone());
            qb.push("))");
        }
    }
}

/// Append `ORDER BY`, always ending on `p.id` so pages are stable.
fn push_order(qb: &mut QueryBuilder<'static, Postgres>, order: ProductOrder) {
    let direction = if order.is_descending() { "DESC" } else { "ASC" };
    qb.push(" ORDER BY ");
    match order.key() {
        SortKey::Id => {
            qb.push("p.id ");
            qb.push(direction);
            return;
        }
        SortKey::Price => qb.push("p.price "),
        SortKey::ScoreAvg => qb.push("review_score_avg "),
        SortKey::Name => qb.push("p.name "),
    };
    qb.push(direction);
    qb.push(", p.id ASC");
}

/// Escape `LIKE` metacharacters so the word matches literally.
fn escape_like(word: &str) -> String {
    let mut out = String::with_capacity(word.len());
    for c in word.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Repository for product listings.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

const LISTING_SNAPSHOT: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Run a listing request.
    ///
    /// `total` counts the whole match set, so it is the same for every page
    /// of one filter. A page past the end yields no items. Both queries read
    /// one `REPEATABLE READ` snapshot so the count agrees with the page.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if either query fails.
    #[instrument(skip(self), fields(order = %query.order, page = query.page.page()))]
    pub async fn list(&self, query: &CatalogQuery) -> Result<ProductPage, RepositoryError> {
        let sql = ListingSql::new(query);

        let mut count = sql.count();
        let mut page = sql.page();

        let mut tx = self.pool.begin().await?;
        sqlx::query(LISTING_SNAPSHOT).execute(&mut *tx).await?;

        let total = count
            .build_query_scalar::<i64>()
            .fetch_one(&mut *tx)
            .await?;
        let items = page
            .build_query_as::<ProductSummary>()
            .fetch_all(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(total, returned = items.len(), "catalog listing");
        Ok(ProductPage { total, items })
    }

    /// Every sub-category under `menu`, each with its first `per_group`
    /// products in id order.
    ///
    /// An unknown menu yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    #[instrument(skip(self))]
    pub async fn grouped_by_sub_category(
        &self,
        menu: &str,
        per_group: i64,
    ) -> Result<Vec<SubCategoryGroup>, RepositoryError> {
        let sub_categories = sqlx::query_as::<_, (threadline_core::SubCategoryId, String)>(
            r"
            SELECT sc.id, sc.name
            FROM storefront.sub_category sc
            JOIN storefront.main_category mc ON mc.id = sc.main_category_id
            JOIN storefront.menu m ON m.id = mc.menu_id
            WHERE m.name = $1
            ORDER BY sc.id
            ",
        )
        .bind(menu)
        .fetch_all(self.pool)
        .await?;

        if sub_categories.is_empty() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new("SELECT ranked.sub_category_id, ");
        qb.push(
            "ranked.id, ranked.name, ranked.price, ranked.discount_rate, \
             ranked.review_score_avg, ranked.thumbnail, ranked.color_count \
             FROM (SELECT p.sub_category_id, ROW_NUMBER() OVER \
             (PARTITION BY p.sub_category_id ORDER BY p.id) AS rn, ",
        );
        qb.push(SUMMARY_COLUMNS);
        qb.push(" ");
        qb.push(HIERARCHY_JOINS);
        qb.push(SUMMARY_JOINS);
        qb.push(" WHERE m.name = ");
        qb.push_bind(menu.to_owned());
        qb.push(") ranked WHERE ranked.rn <= ");
        qb.push_bind(per_group);
        qb.push(" ORDER BY ranked.sub_category_id, ranked.id");

        let rows = qb
            .build_query_as::<GroupedSummaryRow>()
            .fetch_all(self.pool)
            .await?;

        let mut groups: Vec<SubCategoryGroup> = sub_categories
            .into_iter()
            .map(|(id, name)| SubCategoryGroup {
                id,
                name,
                products: Vec::new(),
            })
            .collect();

        for row in rows {
            if let Some(group) = groups.iter_mut().find(|g| g.id == row.sub_category_id) {
                group.products.push(row.summary);
            }
        }

        Ok(groups)
    }
}

#[derive(sqlx::FromRow)]
struct GroupedSummaryRow {
    sub_category_id: threadline_core::SubCategoryId,
    #[sqlx(flatten)]
    summary: ProductSummary,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use threadline_core::{CatalogFilter, PageRequest};

    use super::*;

    fn query(filter: CatalogFilter, order: ProductOrder) -> CatalogQuery {
        CatalogQuery {
            filter,
            order,
            page: PageRequest::new(2, 20, 100).unwrap(),
        }
    }

    fn normalize(sql: &str) -> String {
        sql.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_unfiltered_listing_has_no_predicates() {
        let q = query(CatalogFilter::default(), ProductOrder::default());
        let sql = normalize(ListingSql::new(&q).page().sql());

        assert!(sql.contains("WHERE TRUE ORDER BY p.id ASC LIMIT $1 OFFSET $2"), "{sql}");
    }

    #[test]
    fn test_count_shares_where_clause_without_window() {
        let filter = CatalogFilter::default()
            .and(CatalogPredicate::SubCategoryEquals("Shirts".into()))
            .and(CatalogPredicate::ColorIn(vec!["Red".into(), "Blue".into()]));
        let q = query(filter, ProductOrder::default());
        let sql = ListingSql::new(&q);

        let count = normalize(sql.count().sql());
        let page = normalize(sql.page().sql());

        let where_clause = "WHERE TRUE AND sc.name = $1 AND EXISTS (SELECT 1 FROM storefront.product_color_image f";
        assert!(count.starts_with("SELECT COUNT(*) FROM storefront.product p"), "{count}");
        assert!(count.contains(where_clause), "{count}");
        assert!(page.contains(where_clause), "{page}");
        assert!(!count.contains("LIMIT"));
        assert!(!count.contains("ORDER BY"));
    }

    #[test]
    fn test_every_predicate_kind_is_bound() {
        let filter = CatalogFilter::default()
            .and(CatalogPredicate::NameContains("linen".into()))
            .and(CatalogPredicate::MenuEquals("Women".into()))
            .and(CatalogPredicate::SubCategoryEquals("Shirts".into()))
            .and(CatalogPredicate::ColorIn(vec!["Red".into()]))
            .and(CatalogPredicate::SizeIn(vec!["M".into()]))
            .and(CatalogPredicate::HashtagIn(vec!["summer".into()]));
        let q = query(filter, ProductOrder::default());
        let sql = normalize(ListingSql::new(&q).page().sql());

        assert!(sql.contains(r"p.name ILIKE $1 ESCAPE '\'"), "{sql}");
        assert!(sql.contains("m.name = $2"), "{sql}");
        assert!(sql.contains("sc.name = $3"), "{sql}");
        assert!(sql.contains("c.name = ANY($4)"), "{sql}");
        assert!(sql.contains("s.name = ANY($5)"), "{sql}");
        assert!(sql.contains("h.name = ANY($6)"), "{sql}");
        assert!(sql.contains("LIMIT $7 OFFSET $8"), "{sql}");
        assert!(!sql.contains("linen"));
        assert!(!sql.contains("Women"));
    }

    #[test]
    fn test_sort_keys_map_to_fixed_columns_with_tiebreak() {
        for (raw, expected) in [
            ("id", "ORDER BY p.id ASC LIMIT"),
            ("-id", "ORDER BY p.id DESC LIMIT"),
            ("price", "ORDER BY p.price ASC, p.id ASC"),
            ("-price", "ORDER BY p.price DESC, p.id ASC"),
            ("score_avg", "ORDER BY review_score_avg ASC, p.id ASC"),
            ("-score_avg", "ORDER BY review_score_avg DESC, p.id ASC"),
            ("name", "ORDER BY p.name ASC, p.id ASC"),
        ] {
            let q = query(CatalogFilter::default(), raw.parse().unwrap());
            let sql = normalize(ListingSql::new(&q).page().sql());
            assert!(sql.contains(expected), "{raw}: {sql}");
        }
    }

    #[test]
    fn test_missing_reviews_average_to_zero() {
        let q = query(CatalogFilter::default(), ProductOrder::default());
        let sql = normalize(ListingSql::new(&q).page().sql());
        assert!(
            sql.contains("COALESCE(stats.score_avg, 0)::FLOAT8 AS review_score_avg"),
            "{sql}"
        );
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off"), r"50\%\_off");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("plain"), "plain");
    }
}
