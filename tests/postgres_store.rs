//! Runs the store checks against a real PostgreSQL database.
//!
//! `DATABASE_URL=postgres://... cargo test --test postgres_store -- --ignored`

mod common;

use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use order_aggregate_service::{infra::db, store::PgOrderStore};
use tokio::sync::OnceCell;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

static MIGRATED: OnceCell<()> = OnceCell::const_new();

async fn store() -> PgOrderStore {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    MIGRATED
        .get_or_init(|| async {
            db::run_migrations_blocking(MIGRATIONS, &database_url)
                .await
                .unwrap();
        })
        .await;
    let pool = db::create_pool(&database_url, 2).await.unwrap();
    PgOrderStore::new(pool)
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn delivery_requires_its_order() {
    common::delivery_requires_its_order(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn second_delivery_is_a_duplicate() {
    common::second_delivery_is_a_duplicate(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn second_order_is_a_duplicate() {
    common::second_order_is_a_duplicate(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn any_number_of_items_is_accepted() {
    common::any_number_of_items_is_accepted(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn item_requires_its_order() {
    common::item_requires_its_order(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn orphan_payment_is_refused() {
    common::orphan_payment_is_refused(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn second_payment_is_a_duplicate() {
    common::second_payment_is_a_duplicate(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn deleting_an_order_cascades() {
    common::deleting_an_order_cascades(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn deleting_one_order_leaves_others() {
    common::deleting_one_order_leaves_others(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn aggregate_reads_back_whole() {
    common::aggregate_reads_back_whole(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn aggregate_without_children() {
    common::aggregate_without_children(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn failed_aggregate_writes_nothing() {
    common::failed_aggregate_writes_nothing(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn payment_follows_the_order_it_references() {
    common::payment_follows_the_order_it_references(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn missing_aggregate_is_none() {
    common::missing_aggregate_is_none(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn failed_aggregate_leaves_existing_rows_alone() {
    common::failed_aggregate_leaves_existing_rows_alone(&store().await).await;
}

#[tokio::test]
#[ignore = "needs DATABASE_URL"]
async fn reads_see_whole_aggregate_or_nothing() {
    common::reads_see_whole_aggregate_or_nothing(&store().await).await;
}
