//! Seed the storefront database with a small demo catalog.
//!
//! Inserts two menus of clothing with sizes, colours, images and hashtags,
//! plus one demo user holding a membership and a coupon. Runs in a single
//! transaction and does nothing if the catalog already has a menu.

use std::collections::HashMap;

use sqlx::{Postgres, Transaction};
use tracing::info;

use threadline_storefront::db;

use super::{CliError, database_url};

struct DemoProduct {
    name: &'static str,
    code: &'static str,
    price: &'static str,
    discount_rate: i32,
    sub_category: &'static str,
    sizes: &'static [&'static str],
    colors: &'static [&'static str],
    hashtags: &'static [&'static str],
}

/// (menu, main category, sub category)
const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Men", "Tops", "Shirts"),
    ("Men", "Tops", "Knitwear"),
    ("Men", "Bottoms", "Trousers"),
    ("Women", "Tops", "Blouses"),
    ("Women", "Dresses", "Midi"),
];

const SIZES: &[&str] = &["S", "M", "L", "XL"];
const COLORS: &[&str] = &["Red", "Blue", "Black", "White"];
const HASHTAGS: &[&str] = &["summer", "linen", "basics", "office"];

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Linen Camp Shirt",
        code: "SH-001",
        price: "59.00",
        discount_rate: 0,
        sub_category: "Shirts",
        sizes: &["S", "M", "L"],
        colors: &["Blue", "White"],
        hashtags: &["summer", "linen"],
    },
    DemoProduct {
        name: "Oxford Button-Down",
        code: "SH-002",
        price: "69.00",
        discount_rate: 10,
        sub_category: "Shirts",
        sizes: &["M", "L", "XL"],
        colors: &["Blue", "White", "Red"],
        hashtags: &["office", "basics"],
    },
    DemoProduct {
        name: "Flannel Overshirt",
        code: "SH-003",
        price: "89.00",
        discount_rate: 20,
        sub_category: "Shirts",
        sizes: &["M", "L"],
        colors: &["Red", "Black"],
        hashtags: &[],
    },
    DemoProduct {
        name: "Merino Crew Neck",
        code: "KN-001",
        price: "120.00",
        discount_rate: 0,
        sub_category: "Knitwear",
        sizes: &["S", "M", "L", "XL"],
        colors: &["Black", "Blue"],
        hashtags: &["basics"],
    },
    DemoProduct {
        name: "Pleated Chino",
        code: "TR-001",
        price: "79.00",
        discount_rate: 0,
        sub_category: "Trousers",
        sizes: &["M", "L"],
        colors: &["Black"],
        hashtags: &["office"],
    },
    DemoProduct {
        name: "Silk Wrap Blouse",
        code: "BL-001",
        price: "110.00",
        discount_rate: 15,
        sub_category: "Blouses",
        sizes: &["S", "M"],
        colors: &["White", "Red"],
        hashtags: &["office"],
    },
    DemoProduct {
        name: "Linen Midi Dress",
        code: "DR-001",
        price: "135.00",
        discount_rate: 0,
        sub_category: "Midi",
        sizes: &["S", "M", "L"],
        colors: &["Blue"],
        hashtags: &["summer", "linen"],
    },
];

/// Insert the demo data.
///
/// # Errors
///
/// Returns an error if the database URL is missing or any insert fails.
pub async fn demo_catalog() -> Result<(), CliError> {
    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;

    let seeded = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM storefront.menu)")
        .fetch_one(&pool)
        .await?;
    if seeded {
        info!("Catalog already has data, skipping seed");
        return Ok(());
    }

    let mut tx = pool.begin().await?;

    let sub_categories = insert_categories(&mut tx).await?;
    let sizes = insert_named(&mut tx, "size", SIZES).await?;
    let colors = insert_named(&mut tx, "color", COLORS).await?;
    let hashtags = insert_named(&mut tx, "hashtag", HASHTAGS).await?;

    for product in PRODUCTS {
        let sub_category_id = lookup(&sub_categories, product.sub_category)?;

        let product_id = sqlx::query_scalar::<_, i32>(
            r"
            INSERT INTO storefront.product
                (name, code, price, discount_rate, description, sub_category_id)
            VALUES ($1, $2, $3::NUMERIC, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(product.name)
        .bind(product.code)
        .bind(product.price)
        .bind(product.discount_rate)
        .bind(format!("{} from the demo catalog.", product.name))
        .bind(sub_category_id)
        .fetch_one(&mut *tx)
        .await?;

        for size in product.sizes {
            sqlx::query("INSERT INTO storefront.product_size (product_id, size_id) VALUES ($1, $2)")
                .bind(product_id)
                .bind(lookup(&sizes, size)?)
                .execute(&mut *tx)
                .await?;
        }

        for hashtag in product.hashtags {
            sqlx::query(
                "INSERT INTO storefront.product_hashtag (product_id, hashtag_id) VALUES ($1, $2)",
            )
            .bind(product_id)
            .bind(lookup(&hashtags, hashtag)?)
            .execute(&mut *tx)
            .await?;
        }

        for color in product.colors {
            let image_id = sqlx::query_scalar::<_, i32>(
                "INSERT INTO storefront.image (image_url) VALUES ($1) RETURNING id",
            )
            .bind(format!(
                "https://images.threadline.test/{}/{}.jpg",
                product.code.to_lowercase(),
                color.to_lowercase()
            ))
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r"
                INSERT INTO storefront.product_color_image (product_id, color_id, image_id)
                VALUES ($1, $2, $3)
                ",
            )
            .bind(product_id)
            .bind(lookup(&colors, color)?)
            .bind(image_id)
            .execute(&mut *tx)
            .await?;
        }
    }

    let user_id = insert_demo_account(&mut tx).await?;

    tx.commit().await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", PRODUCTS.len());
    info!("  Demo user id: {user_id} (threadline-cli token --user-id {user_id})");
    Ok(())
}

async fn insert_categories(
    tx: &mut Transaction<'_, Postgres>,
) -> Result<HashMap<&'static str, i32>, CliError> {
    let mut menus = HashMap::new();
    let mut main_categories = HashMap::new();
    let mut sub_categories = HashMap::new();

    for &(menu, main, sub) in CATEGORIES {
        let menu_id = match menus.get(menu) {
            Some(&id) => id,
            None => {
                let id = sqlx::query_scalar::<_, i32>(
                    "INSERT INTO storefront.menu (name) VALUES ($1) RETURNING id",
                )
                .bind(menu)
                .fetch_one(&mut **tx)
                .await?;
                menus.insert(menu, id);
                id
            }
        };

        let main_id = match main_categories.get(&(menu, main)) {
            Some(&id) => id,
            None => {
                let id = sqlx::query_scalar::<_, i32>(
                    "INSERT INTO storefront.main_category (name, menu_id) VALUES ($1, $2) RETURNING id",
                )
                .bind(main)
                .bind(menu_id)
                .fetch_one(&mut **tx)
                .await?;
                main_categories.insert((menu, main), id);
                id
            }
        };

        let sub_id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO storefront.sub_category (name, main_category_id) VALUES ($1, $2) RETURNING id",
        )
        .bind(sub)
        .bind(main_id)
        .fetch_one(&mut **tx)
        .await?;
        sub_categories.insert(sub, sub_id);
    }

    Ok(sub_categories)
}

async fn insert_named(
    tx: &mut Transaction<'_, Postgres>,
    table: &'static str,
    names: &[&'static str],
) -> Result<HashMap<&'static str, i32>, CliError> {
    let sql = format!("INSERT INTO storefront.{table} (name) VALUES ($1) RETURNING id");
    let mut ids = HashMap::with_capacity(names.len());
    for &name in names {
        let id = sqlx::query_scalar::<_, i32>(&sql)
            .bind(name)
            .fetch_one(&mut **tx)
            .await?;
        ids.insert(name, id);
    }
    Ok(ids)
}

async fn insert_demo_account(tx: &mut Transaction<'_, Postgres>) -> Result<i32, CliError> {
    let membership_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO storefront.membership (grade, discount_rate) VALUES ('Silver', 5) RETURNING id",
    )
    .fetch_one(&mut **tx)
    .await?;

    let user_id = sqlx::query_scalar::<_, i32>(
        r"
        INSERT INTO storefront.user (name, email, membership_id)
        VALUES ('Demo Shopper', 'demo@threadline.test', $1)
        ON CONFLICT (email) DO UPDATE SET membership_id = EXCLUDED.membership_id
        RETURNING id
        ",
    )
    .bind(membership_id)
    .fetch_one(&mut **tx)
    .await?;

    let coupon_id = sqlx::query_scalar::<_, i32>(
        "INSERT INTO storefront.coupon (name, discount_rate) VALUES ('WELCOME10', 10) RETURNING id",
    )
    .fetch_one(&mut **tx)
    .await?;

    sqlx::query("INSERT INTO storefront.user_coupon (user_id, coupon_id) VALUES ($1, $2)")
        .bind(user_id)
        .bind(coupon_id)
        .execute(&mut **tx)
        .await?;

    Ok(user_id)
}

fn lookup(ids: &HashMap<&'static str, i32>, name: &str) -> Result<i32, CliError> {
    ids.get(name)
        .copied()
        .ok_or_else(|| CliError::InvalidArgument(format!("demo data references unknown {name:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_products_reference_known_names() {
        let subs: Vec<&str> = CATEGORIES.iter().map(|&(_, _, sub)| sub).collect();
        for product in PRODUCTS {
            assert!(subs.contains(&product.sub_category), "{}", product.name);
            assert!(product.sizes.iter().all(|s| SIZES.contains(s)), "{}", product.name);
            assert!(product.colors.iter().all(|c| COLORS.contains(c)), "{}", product.name);
            assert!(
                product.hashtags.iter().all(|h| HASHTAGS.contains(h)),
                "{}",
                product.name
            );
        }
    }

    #[test]
    fn test_product_codes_are_unique() {
        let mut codes: Vec<&str> = PRODUCTS.iter().map(|p| p.code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), PRODUCTS.len());
    }
}
