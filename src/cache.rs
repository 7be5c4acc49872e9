use std::{collections::VecDeque, sync::Arc};

use anyhow::{Result, bail};
use tokio::sync::Mutex;
use tracing::{debug, error, info};

use crate::{
    order::Order,
    store::{OrderStore, StoreError},
};

/// Outcome of writing the buffered orders to the store.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FlushReport {
    pub persisted: usize,
    /// Orders dropped because the store refused them on a key constraint.
    pub rejected: Vec<String>,
}

/// Write-behind buffer for incoming orders.
///
/// Orders queue up in memory and are written to the store, oldest first,
/// once `capacity` of them are pending or when [`OrderCache::flush`] is
/// called explicitly.
pub struct OrderCache {
    pending: Mutex<VecDeque<Order>>,
    capacity: usize,
    store: Arc<dyn OrderStore>,
}

impl OrderCache {
    pub fn new(store: Arc<dyn OrderStore>, capacity: usize) -> Result<Self> {
        if capacity == 0 {
            bail!("Cache size can't be zero");
        }

        Ok(Self {
            pending: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            store,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub async fn len(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.pending.lock().await.is_empty()
    }

    /// Queues an order, flushing first when the buffer is full. An order uid
    /// already pending or already stored is refused.
    pub async fn submit(&self, order: Order) -> Result<(), StoreError> {
        let mut pending = self.pending.lock().await;

        if pending.iter().any(|o| o.order_uid == order.order_uid) {
            return Err(StoreError::UniqueViolation {
                relation: "orders".into(),
                detail: format!("Key (order_uid)=({}) is already pending.", order.order_uid),
            });
        }

        if self.store.find_order(&order.order_uid).await?.is_some() {
            return Err(StoreError::UniqueViolation {
                relation: "orders".into(),
                detail: format!("Key (order_uid)=({}) already exists.", order.order_uid),
            });
        }

        debug!("There are {} orders in queue", pending.len());

        if pending.len() >= self.capacity {
            debug!(
                "Queue is full ({} orders). Flushing to the store.",
                self.capacity
            );
            let report = self.flush_locked(&mut pending).await?;
            info!(
                "Flushed {} orders, rejected {}",
                report.persisted,
                report.rejected.len()
            );
        }

        pending.push_back(order);
        Ok(())
    }

    pub async fn flush(&self) -> Result<FlushReport, StoreError> {
        let mut pending = self.pending.lock().await;
        self.flush_locked(&mut pending).await
    }

    async fn flush_locked(&self, pending: &mut VecDeque<Order>) -> Result<FlushReport, StoreError> {
        let mut report = FlushReport::default();

        while let Some(order) = pending.pop_front() {
            let order_uid = order.order_uid.clone();
            match self.store.create_aggregate(order.clone().into_rows()).await {
                Ok(()) => report.persisted += 1,
                Err(err) if err.is_constraint_violation() => {
                    error!("Dropping order {}: {}", order_uid, err);
                    report.rejected.push(order_uid);
                }
                Err(err) => {
                    pending.push_front(order);
                    return Err(err);
                }
            }
        }

        Ok(report)
    }

    /// The most recently submitted order still waiting in the buffer.
    pub async fn last(&self) -> Option<Order> {
        self.pending.lock().await.back().cloned()
    }

    pub async fn get(&self, order_uid: &str) -> Option<Order> {
        self.pending
            .lock()
            .await
            .iter()
            .find(|o| o.order_uid == order_uid)
            .cloned()
    }

    /// Drops a pending order. Returns whether it was queued.
    pub async fn remove(&self, order_uid: &str) -> bool {
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|o| o.order_uid != order_uid);
        pending.len() != before
    }
}
