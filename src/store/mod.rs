use async_trait::async_trait;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::models::{AggregateRows, DeliveryEntity, ItemEntity, OrderEntity, PaymentEntity};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgOrderStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Uniqueness violation on {relation}: {detail}")]
    UniqueViolation { relation: String, detail: String },

    #[error("Referential integrity violation on {relation}: {detail}")]
    ReferentialIntegrity { relation: String, detail: String },

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl StoreError {
    /// Whether the error is one of the constraint violations the schema
    /// declares, as opposed to an engine failure.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            StoreError::UniqueViolation { .. } | StoreError::ReferentialIntegrity { .. }
        )
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                StoreError::UniqueViolation {
                    relation: info.table_name().unwrap_or("unknown").to_owned(),
                    detail: info.details().unwrap_or(info.message()).to_owned(),
                }
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                StoreError::ReferentialIntegrity {
                    relation: info.table_name().unwrap_or("unknown").to_owned(),
                    detail: info.details().unwrap_or(info.message()).to_owned(),
                }
            }
            other => StoreError::Backend(other.into()),
        }
    }
}

/// Persistence of the order aggregate across `orders`, `deliveries`, `items`
/// and `payments`.
///
/// Implementations enforce the schema's keys: a child row must reference an
/// existing order, `orders.order_uid`, `deliveries.order_uid` and
/// `payments.transaction_id` are unique, and deleting an order removes every
/// row referencing it.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, row: OrderEntity) -> Result<(), StoreError>;

    async fn insert_delivery(&self, row: DeliveryEntity) -> Result<(), StoreError>;

    async fn insert_item(&self, row: ItemEntity) -> Result<(), StoreError>;

    async fn insert_payment(&self, row: PaymentEntity) -> Result<(), StoreError>;

    /// Inserts the order and its children in one transaction, parent first.
    /// Nothing is written if any insert fails.
    async fn create_aggregate(&self, rows: AggregateRows) -> Result<(), StoreError>;

    async fn find_order(&self, order_uid: &str) -> Result<Option<OrderEntity>, StoreError>;

    async fn find_delivery(&self, order_uid: &str) -> Result<Option<DeliveryEntity>, StoreError>;

    /// Items come back in no particular order.
    async fn find_items(&self, order_uid: &str) -> Result<Vec<ItemEntity>, StoreError>;

    async fn find_payment(&self, transaction_id: &str)
    -> Result<Option<PaymentEntity>, StoreError>;

    /// The order row and everything keyed by its uid. The payment is the one
    /// whose `transaction_id` equals `order_uid`.
    async fn find_aggregate(&self, order_uid: &str) -> Result<Option<AggregateRows>, StoreError>;

    /// Deletes the order, cascading to its children. Returns `false` when no
    /// such order existed.
    async fn delete_order(&self, order_uid: &str) -> Result<bool, StoreError>;
}
