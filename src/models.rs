use diesel::{
    Selectable,
    prelude::{Identifiable, Insertable, Queryable},
};
use serde::{Deserialize, Serialize};

// Orders

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, Default, PartialEq,
)]
#[diesel(table_name = crate::schema::orders)]
#[diesel(primary_key(order_uid))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderEntity {
    pub order_uid: String,
    pub track_number: Option<String>,
    pub entry: Option<String>,
    pub locale: Option<String>,
    pub internal_signature: Option<String>,
    pub customer_id: Option<String>,
    pub delivery_service: Option<String>,
    pub shardkey: Option<String>,
    pub sm_id: Option<i32>,
    pub date_created: Option<String>,
    pub oof_shard: Option<String>,
}

impl OrderEntity {
    /// Header row with every nullable column left empty.
    pub fn keyed(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
            ..Default::default()
        }
    }
}

// Deliveries

#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, Default, PartialEq,
)]
#[diesel(table_name = crate::schema::deliveries)]
#[diesel(primary_key(order_uid))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct DeliveryEntity {
    pub order_uid: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub email: Option<String>,
}

impl DeliveryEntity {
    pub fn keyed(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
            ..Default::default()
        }
    }
}

// Items

/// One line of an order. The table carries no identity of its own, so two
/// equal rows for the same order are both kept.
#[derive(Queryable, Selectable, Insertable, Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[diesel(table_name = crate::schema::items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ItemEntity {
    pub order_uid: String,
    pub chrt_id: Option<i64>,
    pub track_number: Option<String>,
    pub price: Option<i64>,
    pub rid: Option<String>,
    pub name: Option<String>,
    pub sale: Option<i64>,
    pub i_size: Option<String>,
    pub total_price: Option<i64>,
    pub nm_id: Option<i64>,
    pub brand: Option<String>,
    pub status: Option<i64>,
}

impl ItemEntity {
    pub fn keyed(order_uid: impl Into<String>) -> Self {
        Self {
            order_uid: order_uid.into(),
            ..Default::default()
        }
    }
}

// Payments

/// Payment row. `transaction_id` is both the row's identity and its
/// reference to `orders.order_uid`.
#[derive(
    Queryable, Selectable, Identifiable, Insertable, Serialize, Deserialize, Debug, Clone, Default, PartialEq,
)]
#[diesel(table_name = crate::schema::payments)]
#[diesel(primary_key(transaction_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PaymentEntity {
    pub transaction_id: String,
    pub request_id: Option<String>,
    pub currency: Option<String>,
    pub provider: Option<String>,
    pub amount: Option<i32>,
    pub payment_dt: Option<i64>,
    pub bank: Option<String>,
    pub delivery_cost: Option<i32>,
    pub goods_total: Option<i32>,
    pub custom_fee: Option<i64>,
}

impl PaymentEntity {
    pub fn keyed(transaction_id: impl Into<String>) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            ..Default::default()
        }
    }

    /// The order this payment belongs to.
    pub fn order_uid(&self) -> &str {
        &self.transaction_id
    }
}

/// Every row making up one order aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateRows {
    pub order: OrderEntity,
    pub delivery: Option<DeliveryEntity>,
    pub items: Vec<ItemEntity>,
    pub payment: Option<PaymentEntity>,
}
