//! End-to-end tests for the Threadline storefront.
//!
//! Each test gets a [`TestContext`]: a freshly migrated and re-seeded
//! database, and the storefront router served on an ephemeral port.
//!
//! # Running Tests
//!
//! ```bash
//! export STOREFRONT_TEST_DATABASE_URL=postgres://localhost/threadline_test
//! cargo test -p threadline-integration-tests -- --ignored
//! ```
//!
//! The database is truncated by every test, so never point this at a
//! database you care about. Tests are serialized on a process-wide lock.

#![allow(clippy::expect_used, clippy::missing_panics_doc)]

use std::net::SocketAddr;

use secrecy::SecretString;
use serde_json::Value;
use sqlx::{PgPool, Postgres, Transaction, postgres::PgPoolOptions};
use tokio::sync::{Mutex, MutexGuard};

use threadline_core::{ColorId, ImageId, ProductId, SizeId, UserId};
use threadline_storefront::config::{CatalogConfig, StorefrontConfig};
use threadline_storefront::services::IdentityResolver;
use threadline_storefront::state::AppState;

const JWT_SECRET: &str = "Qz8#pV3$wN6@hK1&tR5*mY9!cJ2^bL4%";

static DATABASE_LOCK: Mutex<()> = Mutex::const_new(());

/// A product variant that can be put in a cart.
#[derive(Debug, Clone, Copy)]
pub struct Variant {
    pub product_id: ProductId,
    pub size_id: SizeId,
    pub color_id: ColorId,
    pub image_id: ImageId,
}

/// Ids of the seeded rows tests refer to.
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// Shopper with a membership, a coupon and an address.
    pub shopper: UserId,
    /// Second account, for ownership checks.
    pub other_shopper: UserId,
    /// Products in the `Shirts` sub-category, in insertion order.
    pub shirts: Vec<ProductId>,
    /// A product with no reviews.
    pub unreviewed: ProductId,
    /// The only product under the `Women` menu; its name contains `%`.
    pub blouse: ProductId,
    /// Red, size M variant of the first shirt.
    pub red_shirt: Variant,
}

/// A running storefront backed by a seeded database.
pub struct TestContext {
    pub client: reqwest::Client,
    pub base_url: String,
    pub pool: PgPool,
    pub fixtures: Fixtures,
    identity: IdentityResolver,
    _lock: MutexGuard<'static, ()>,
}

impl TestContext {
    /// Migrate, reset and seed the test database, then start the server.
    pub async fn new() -> Self {
        let lock = DATABASE_LOCK.lock().await;

        let database_url = std::env::var("STOREFRONT_TEST_DATABASE_URL")
            .expect("STOREFRONT_TEST_DATABASE_URL must be set");

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&database_url)
            .await
            .expect("Failed to connect to test database");

        sqlx::migrate!("../storefront/migrations")
            .run(&pool)
            .await
            .expect("Failed to run migrations");

        let fixtures = seed(&pool).await;

        let jwt_secret = SecretString::from(JWT_SECRET.to_owned());
        let identity = IdentityResolver::new(&jwt_secret);
        let config = StorefrontConfig {
            database_url: SecretString::from(database_url),
            host: "127.0.0.1".parse().expect("valid address"),
            port: 0,
            jwt_secret,
            catalog: CatalogConfig::default(),
            cors_origins: Vec::new(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("listener address");
        let app = threadline_storefront::app(AppState::new(config, pool.clone()));
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("test server failed");
        });

        Self {
            client: reqwest::Client::new(),
            base_url: format!("http://{addr}"),
            pool,
            fixtures,
            identity,
            _lock: lock,
        }
    }

    /// Absolute URL for a path on the test server.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A valid bearer header value for `user_id`.
    #[must_use]
    pub fn bearer(&self, user_id: UserId) -> String {
        let token = self
            .identity
            .issue(user_id, chrono::Duration::minutes(5))
            .expect("Failed to issue token");
        format!("Bearer {token}")
    }

    /// GET a path and decode the JSON body.
    pub async fn get_json(&self, path: &str) -> (reqwest::StatusCode, Value) {
        let response = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed");
        let status = response.status();
        (status, response.json().await.expect("JSON body"))
    }
}

/// Wipe every storefront table and insert the fixture catalog.
async fn seed(pool: &PgPool) -> Fixtures {
    sqlx::query(
        r"
        TRUNCATE storefront.menu, storefront.size, storefront.color, storefront.image,
                 storefront.hashtag, storefront.membership, storefront.coupon,
                 storefront.user
        RESTART IDENTITY CASCADE
        ",
    )
    .execute(pool)
    .await
    .expect("Failed to reset database");

    let mut tx = pool.begin().await.expect("begin");

    let menu = insert_id(&mut tx, "INSERT INTO storefront.menu (name) VALUES ('Men') RETURNING id").await;
    let tops = insert_id_with(
        &mut tx,
        "INSERT INTO storefront.main_category (name, menu_id) VALUES ('Tops', $1) RETURNING id",
        menu,
    )
    .await;
    let shirts = insert_id_with(
        &mut tx,
        "INSERT INTO storefront.sub_category (name, main_category_id) VALUES ('Shirts', $1) RETURNING id",
        tops,
    )
    .await;
    let knitwear = insert_id_with(
        &mut tx,
        "INSERT INTO storefront.sub_category (name, main_category_id) VALUES ('Knitwear', $1) RETURNING id",
        tops,
    )
    .await;

    let women = insert_id(&mut tx, "INSERT INTO storefront.menu (name) VALUES ('Women') RETURNING id").await;
    let women_tops = insert_id_with(
        &mut tx,
        "INSERT INTO storefront.main_category (name, menu_id) VALUES ('Tops', $1) RETURNING id",
        women,
    )
    .await;
    let blouses = insert_id_with(
        &mut tx,
        "INSERT INTO storefront.sub_category (name, main_category_id) VALUES ('Blouses', $1) RETURNING id",
        women_tops,
    )
    .await;

    let size_s = insert_id(&mut tx, "INSERT INTO storefront.size (name) VALUES ('S') RETURNING id").await;
    let size_m = insert_id(&mut tx, "INSERT INTO storefront.size (name) VALUES ('M') RETURNING id").await;
    let size_l = insert_id(&mut tx, "INSERT INTO storefront.size (name) VALUES ('L') RETURNING id").await;
    let red = insert_id(&mut tx, "INSERT INTO storefront.color (name) VALUES ('Red') RETURNING id").await;
    let blue = insert_id(&mut tx, "INSERT INTO storefront.color (name) VALUES ('Blue') RETURNING id").await;
    let black = insert_id(&mut tx, "INSERT INTO storefront.color (name) VALUES ('Black') RETURNING id").await;
    let linen = insert_id(&mut tx, "INSERT INTO storefront.hashtag (name) VALUES ('linen') RETURNING id").await;
    let summer = insert_id(&mut tx, "INSERT INTO storefront.hashtag (name) VALUES ('summer') RETURNING id").await;

    // Five of the six shirts come in red or blue.
    let shirt_specs: [ProductSpec<'_>; 6] = [
        ("Red Oxford", "50.00", &[red], &[size_s, size_m], &[linen]),
        ("Blue Oxford", "60.00", &[blue], &[size_s, size_m], &[]),
        ("Striped Shirt", "70.00", &[red, blue], &[size_s, size_m], &[linen, summer]),
        ("Denim Shirt", "80.00", &[blue], &[size_s, size_m], &[]),
        ("Flannel Shirt", "90.00", &[red, black], &[size_m, size_l], &[]),
        ("Black Tee", "40.00", &[black], &[size_m, size_l], &[summer]),
    ];

    let mut shirt_ids = Vec::with_capacity(shirt_specs.len());
    let mut red_shirt_image = None;
    for spec in shirt_specs {
        let (product, images) = insert_spec(&mut tx, spec, shirts).await;
        if red_shirt_image.is_none() {
            red_shirt_image = images.iter().find(|&&(color, _)| color == red).map(|&(_, image)| image);
        }
        shirt_ids.push(product);
    }

    let (sweater, _) = insert_spec(
        &mut tx,
        ("Wool Sweater", "100.00", &[red], &[], &[]),
        knitwear,
    )
    .await;
    let (blouse, _) = insert_spec(
        &mut tx,
        ("100% Linen Blouse", "85.00", &[blue], &[size_s], &[linen, summer]),
        blouses,
    )
    .await;

    let membership = insert_id(
        &mut tx,
        "INSERT INTO storefront.membership (grade, discount_rate) VALUES ('Gold', 10) RETURNING id",
    )
    .await;
    let shopper = insert_id_with(
        &mut tx,
        r"
        INSERT INTO storefront.user (name, email, address, membership_id)
        VALUES ('Ada', 'ada@threadline.test', '1 Loom Street', $1)
        RETURNING id
        ",
        membership,
    )
    .await;
    let other_shopper = insert_id(
        &mut tx,
        "INSERT INTO storefront.user (name, email) VALUES ('Grace', 'grace@threadline.test') RETURNING id",
    )
    .await;
    let coupon = insert_id(
        &mut tx,
        "INSERT INTO storefront.coupon (name, discount_rate) VALUES ('WELCOME10', 10) RETURNING id",
    )
    .await;
    sqlx::query("INSERT INTO storefront.user_coupon (user_id, coupon_id) VALUES ($1, $2)")
        .bind(shopper)
        .bind(coupon)
        .execute(&mut *tx)
        .await
        .expect("insert user_coupon");

    tx.commit().await.expect("commit");

    let first_shirt = *shirt_ids.first().expect("shirts seeded");
    Fixtures {
        shopper: UserId::new(shopper),
        other_shopper: UserId::new(other_shopper),
        shirts: shirt_ids.into_iter().map(ProductId::new).collect(),
        unreviewed: ProductId::new(sweater),
        blouse: ProductId::new(blouse),
        red_shirt: Variant {
            product_id: ProductId::new(first_shirt),
            size_id: SizeId::new(size_m),
            color_id: ColorId::new(red),
            image_id: ImageId::new(red_shirt_image.expect("red shirt image")),
        },
    }
}

/// (name, price, colours, sizes, hashtags)
type ProductSpec<'a> = (&'a str, &'a str, &'a [i32], &'a [i32], &'a [i32]);

/// Insert a product with its facets. Returns the product id and the
/// (colour, image) pairs created for it.
async fn insert_spec(
    tx: &mut Transaction<'_, Postgres>,
    (name, price, colors, sizes, hashtags): ProductSpec<'_>,
    sub_category: i32,
) -> (i32, Vec<(i32, i32)>) {
    let product = insert_product(tx, name, price, sub_category).await;
    for &size in sizes {
        link(tx, "product_size", "size_id", product, size).await;
    }
    for &hashtag in hashtags {
        link(tx, "product_hashtag", "hashtag_id", product, hashtag).await;
    }

    let mut images = Vec::with_capacity(colors.len());
    for &color in colors {
        let image = insert_image(tx, name, color).await;
        sqlx::query(
            "INSERT INTO storefront.product_color_image (product_id, color_id, image_id) VALUES ($1, $2, $3)",
        )
        .bind(product)
        .bind(color)
        .bind(image)
        .execute(&mut **tx)
        .await
        .expect("insert product_color_image");
        images.push((color, image));
    }
    (product, images)
}

async fn insert_id(tx: &mut Transaction<'_, Postgres>, sql: &str) -> i32 {
    sqlx::query_scalar(sql)
        .fetch_one(&mut **tx)
        .await
        .expect("fixture insert")
}

async fn insert_id_with(tx: &mut Transaction<'_, Postgres>, sql: &str, arg: i32) -> i32 {
    sqlx::query_scalar(sql)
        .bind(arg)
        .fetch_one(&mut **tx)
        .await
        .expect("fixture insert")
}

async fn insert_product(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    price: &str,
    sub_category: i32,
) -> i32 {
    sqlx::query_scalar(
        r"
        INSERT INTO storefront.product (name, code, price, description, sub_category_id)
        VALUES ($1, upper(left($1, 3)), $2::NUMERIC, $1, $3)
        RETURNING id
        ",
    )
    .bind(name)
    .bind(price)
    .bind(sub_category)
    .fetch_one(&mut **tx)
    .await
    .expect("insert product")
}

async fn insert_image(tx: &mut Transaction<'_, Postgres>, product: &str, color: i32) -> i32 {
    sqlx::query_scalar("INSERT INTO storefront.image (image_url) VALUES ($1) RETURNING id")
        .bind(format!("https://img.threadline.test/{product}/{color}.jpg"))
        .fetch_one(&mut **tx)
        .await
        .expect("insert image")
}

async fn link(
    tx: &mut Transaction<'_, Postgres>,
    table: &str,
    column: &str,
    product: i32,
    other: i32,
) {
    sqlx::query(&format!(
        "INSERT INTO storefront.{table} (product_id, {column}) VALUES ($1, $2)"
    ))
    .bind(product)
    .bind(other)
    .execute(&mut **tx)
    .await
    .expect("insert link");
}
