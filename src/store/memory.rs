use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::models::{AggregateRows, DeliveryEntity, ItemEntity, OrderEntity, PaymentEntity};
use crate::store::{OrderStore, StoreError};

/// In-process engine holding the four relations behind one lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[derive(Debug, Default)]
struct Tables {
    orders: BTreeMap<String, OrderEntity>,
    deliveries: BTreeMap<String, DeliveryEntity>,
    items: Vec<ItemEntity>,
    payments: BTreeMap<String, PaymentEntity>,
}

fn duplicate(relation: &str, column: &str, key: &str) -> StoreError {
    StoreError::UniqueViolation {
        relation: relation.to_owned(),
        detail: format!("Key ({column})=({key}) already exists."),
    }
}

fn dangling(relation: &str, column: &str, key: &str) -> StoreError {
    StoreError::ReferentialIntegrity {
        relation: relation.to_owned(),
        detail: format!("Key ({column})=({key}) is not present in table \"orders\"."),
    }
}

impl Tables {
    fn insert_order(&mut self, row: OrderEntity) -> Result<(), StoreError> {
        if self.orders.contains_key(&row.order_uid) {
            return Err(duplicate("orders", "order_uid", &row.order_uid));
        }
        self.orders.insert(row.order_uid.clone(), row);
        Ok(())
    }

    fn insert_delivery(&mut self, row: DeliveryEntity) -> Result<(), StoreError> {
        if !self.orders.contains_key(&row.order_uid) {
            return Err(dangling("deliveries", "order_uid", &row.order_uid));
        }
        if self.deliveries.contains_key(&row.order_uid) {
            return Err(duplicate("deliveries", "order_uid", &row.order_uid));
        }
        self.deliveries.insert(row.order_uid.clone(), row);
        Ok(())
    }

    fn insert_item(&mut self, row: ItemEntity) -> Result<(), StoreError> {
        if !self.orders.contains_key(&row.order_uid) {
            return Err(dangling("items", "order_uid", &row.order_uid));
        }
        self.items.push(row);
        Ok(())
    }

    fn insert_payment(&mut self, row: PaymentEntity) -> Result<(), StoreError> {
        if !self.orders.contains_key(&row.transaction_id) {
            return Err(dangling("payments", "transaction_id", &row.transaction_id));
        }
        if self.payments.contains_key(&row.transaction_id) {
            return Err(duplicate("payments", "transaction_id", &row.transaction_id));
        }
        self.payments.insert(row.transaction_id.clone(), row);
        Ok(())
    }

    /// Checks every row of an aggregate against the live tables, in the
    /// order the rows are inserted. The aggregate's own order counts as
    /// present for its children.
    fn check_aggregate(&self, rows: &AggregateRows) -> Result<(), StoreError> {
        let order_uid = rows.order.order_uid.as_str();
        if self.orders.contains_key(order_uid) {
            return Err(duplicate("orders", "order_uid", order_uid));
        }
        let known = |key: &str| key == order_uid || self.orders.contains_key(key);

        if let Some(delivery) = &rows.delivery {
            if !known(&delivery.order_uid) {
                return Err(dangling("deliveries", "order_uid", &delivery.order_uid));
            }
            if self.deliveries.contains_key(&delivery.order_uid) {
                return Err(duplicate("deliveries", "order_uid", &delivery.order_uid));
            }
        }
        if let Some(item) = rows.items.iter().find(|item| !known(&item.order_uid)) {
            return Err(dangling("items", "order_uid", &item.order_uid));
        }
        if let Some(payment) = &rows.payment {
            if !known(&payment.transaction_id) {
                return Err(dangling("payments", "transaction_id", &payment.transaction_id));
            }
            if self.payments.contains_key(&payment.transaction_id) {
                return Err(duplicate("payments", "transaction_id", &payment.transaction_id));
            }
        }
        Ok(())
    }

    fn items_of(&self, order_uid: &str) -> Vec<ItemEntity> {
        self.items
            .iter()
            .filter(|item| item.order_uid == order_uid)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn insert_order(&self, row: OrderEntity) -> Result<(), StoreError> {
        self.tables.write().await.insert_order(row)
    }

    async fn insert_delivery(&self, row: DeliveryEntity) -> Result<(), StoreError> {
        self.tables.write().await.insert_delivery(row)
    }

    async fn insert_item(&self, row: ItemEntity) -> Result<(), StoreError> {
        self.tables.write().await.insert_item(row)
    }

    async fn insert_payment(&self, row: PaymentEntity) -> Result<(), StoreError> {
        self.tables.write().await.insert_payment(row)
    }

    async fn create_aggregate(&self, rows: AggregateRows) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        // Nothing is written unless every row passes.
        tables.check_aggregate(&rows)?;

        tables.insert_order(rows.order)?;
        if let Some(delivery) = rows.delivery {
            tables.insert_delivery(delivery)?;
        }
        for item in rows.items {
            tables.insert_item(item)?;
        }
        if let Some(payment) = rows.payment {
            tables.insert_payment(payment)?;
        }
        Ok(())
    }

    async fn find_order(&self, order_uid: &str) -> Result<Option<OrderEntity>, StoreError> {
        Ok(self.tables.read().await.orders.get(order_uid).cloned())
    }

    async fn find_delivery(&self, order_uid: &str) -> Result<Option<DeliveryEntity>, StoreError> {
        Ok(self.tables.read().await.deliveries.get(order_uid).cloned())
    }

    async fn find_items(&self, order_uid: &str) -> Result<Vec<ItemEntity>, StoreError> {
        Ok(self.tables.read().await.items_of(order_uid))
    }

    async fn find_payment(
        &self,
        transaction_id: &str,
    ) -> Result<Option<PaymentEntity>, StoreError> {
        Ok(self.tables.read().await.payments.get(transaction_id).cloned())
    }

    async fn find_aggregate(&self, order_uid: &str) -> Result<Option<AggregateRows>, StoreError> {
        let tables = self.tables.read().await;

        let Some(order) = tables.orders.get(order_uid).cloned() else {
            return Ok(None);
        };

        Ok(Some(AggregateRows {
            order,
            delivery: tables.deliveries.get(order_uid).cloned(),
            items: tables.items_of(order_uid),
            payment: tables.payments.get(order_uid).cloned(),
        }))
    }

    async fn delete_order(&self, order_uid: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;

        if tables.orders.remove(order_uid).is_none() {
            return Ok(false);
        }

        tables.deliveries.remove(order_uid);
        tables.items.retain(|item| item.order_uid != order_uid);
        tables
            .payments
            .retain(|_, payment| payment.order_uid() != order_uid);

        debug!("Order {} deleted with its dependent rows", order_uid);
        Ok(true)
    }
}
