use anyhow::Context;
use async_trait::async_trait;
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::{
    infra::db::DbPool,
    models::{AggregateRows, DeliveryEntity, ItemEntity, OrderEntity, PaymentEntity},
    schema::{deliveries, items, orders, payments},
    store::{OrderStore, StoreError},
};

/// PostgreSQL engine. Keys, foreign keys and cascades are the database's own;
/// this type only maps its errors.
#[derive(Clone)]
pub struct PgOrderStore {
    db_pool: DbPool,
}

impl PgOrderStore {
    pub fn new(db_pool: DbPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn insert_order(&self, row: OrderEntity) -> Result<(), StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(orders::table)
            .values(&row)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn insert_delivery(&self, row: DeliveryEntity) -> Result<(), StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(deliveries::table)
            .values(&row)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn insert_item(&self, row: ItemEntity) -> Result<(), StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(items::table)
            .values(&row)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn insert_payment(&self, row: PaymentEntity) -> Result<(), StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        diesel::insert_into(payments::table)
            .values(&row)
            .execute(conn)
            .await?;
        Ok(())
    }

    async fn create_aggregate(&self, rows: AggregateRows) -> Result<(), StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let AggregateRows {
            order,
            delivery,
            items,
            payment,
        } = rows;
        let order_uid = order.order_uid.clone();
        let item_count = items.len();

        conn.transaction(move |conn| {
            Box::pin(async move {
                diesel::insert_into(orders::table)
                    .values(&order)
                    .execute(conn)
                    .await?;

                if let Some(delivery) = delivery {
                    diesel::insert_into(deliveries::table)
                        .values(&delivery)
                        .execute(conn)
                        .await?;
                }

                if !items.is_empty() {
                    diesel::insert_into(items::table)
                        .values(items)
                        .execute(conn)
                        .await?;
                }

                if let Some(payment) = payment {
                    diesel::insert_into(payments::table)
                        .values(&payment)
                        .execute(conn)
                        .await?;
                }

                Ok::<(), StoreError>(())
            })
        })
        .await?;

        debug!("Order {} stored with {} items", order_uid, item_count);
        Ok(())
    }

    async fn find_order(&self, order_uid: &str) -> Result<Option<OrderEntity>, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let order = orders::table
            .find(order_uid)
            .select(OrderEntity::as_select())
            .get_result(conn)
            .await
            .optional()?;
        Ok(order)
    }

    async fn find_delivery(&self, order_uid: &str) -> Result<Option<DeliveryEntity>, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let delivery = deliveries::table
            .find(order_uid)
            .select(DeliveryEntity::as_select())
            .get_result(conn)
            .await
            .optional()?;
        Ok(delivery)
    }

    async fn find_items(&self, order_uid: &str) -> Result<Vec<ItemEntity>, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let items = items::table
            .filter(items::order_uid.eq(order_uid))
            .select(ItemEntity::as_select())
            .get_results(conn)
            .await?;
        Ok(items)
    }

    async fn find_payment(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentEntity>, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let payment = payments::table
            .find(transaction_id)
            .select(PaymentEntity::as_select())
            .get_result(conn)
            .await
            .optional()?;
        Ok(payment)
    }

    async fn find_aggregate(&self, order_uid: &str) -> Result<Option<AggregateRows>, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let order_uid = order_uid.to_owned();

        // One snapshot for all four reads, so a concurrent delete is seen
        // either entirely or not at all.
        let rows = conn
            .build_transaction()
            .read_only()
            .repeatable_read()
            .run(move |conn| {
                Box::pin(async move {
                    let order: Option<OrderEntity> = orders::table
                        .find(&order_uid)
                        .select(OrderEntity::as_select())
                        .get_result(conn)
                        .await
                        .optional()?;

                    let Some(order) = order else {
                        return Ok::<Option<AggregateRows>, StoreError>(None);
                    };

                    let delivery: Option<DeliveryEntity> = deliveries::table
                        .find(&order_uid)
                        .select(DeliveryEntity::as_select())
                        .get_result(conn)
                        .await
                        .optional()?;

                    let items: Vec<ItemEntity> = items::table
                        .filter(items::order_uid.eq(&order_uid))
                        .select(ItemEntity::as_select())
                        .get_results(conn)
                        .await?;

                    let payment: Option<PaymentEntity> = payments::table
                        .find(&order_uid)
                        .select(PaymentEntity::as_select())
                        .get_result(conn)
                        .await
                        .optional()?;

                    Ok(Some(AggregateRows {
                        order,
                        delivery,
                        items,
                        payment,
                    }))
                })
            })
            .await?;

        Ok(rows)
    }

    async fn delete_order(&self, order_uid: &str) -> Result<bool, StoreError> {
        let conn = &mut self
            .db_pool
            .get()
            .await
            .context("Failed to obtain a DB connection pool")?;

        let deleted = diesel::delete(orders::table.find(order_uid))
            .execute(conn)
            .await?;

        debug!("Deleted {} order rows for {}", deleted, order_uid);
        Ok(deleted > 0)
    }
}
