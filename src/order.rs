//! JSON form of an order aggregate as it travels over the wire.
//!
//! The nested document mirrors what upstream producers send: one header with
//! its delivery, payment and items inlined. Storage sees the same data split
//! into rows ([`AggregateRows`]); this module converts between the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{AggregateRows, DeliveryEntity, ItemEntity, OrderEntity, PaymentEntity};

/// Recipient and address of an order.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Delivery {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub zip: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub region: Option<String>,
    pub email: Option<String>,
}

/// Payment attached to an order.
///
/// `transaction` is stored as the payment's key, which the database also
/// treats as a reference to `orders.order_uid`. A payment whose transaction
/// differs from the order's uid must therefore point at some other existing
/// order, and is not returned when reading this order back.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Payment {
    pub transaction: String,
    pub request_id: Option<String>,
    pub currency: Option<String>,
    pub provider: Option<String>,
    pub amount: Option<i32>,
    /// Unix timestamp.
    pub payment_dt: Option<i64>,
    pub bank: Option<String>,
    pub delivery_cost: Option<i32>,
    pub goods_total: Option<i32>,
    pub custom_fee: Option<i64>,
}

/// A single order line.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Item {
    pub chrt_id: Option<i64>,
    pub track_number: Option<String>,
    pub price: Option<i64>,
    pub rid: Option<String>,
    pub name: Option<String>,
    pub sale: Option<i64>,
    /// Persisted as `i_size`.
    pub size: Option<String>,
    pub total_price: Option<i64>,
    pub nm_id: Option<i64>,
    pub brand: Option<String>,
    pub status: Option<i64>,
}

/// An order with everything that belongs to it.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, ToSchema)]
pub struct Order {
    pub order_uid: String,
    pub track_number: Option<String>,
    pub entry: Option<String>,
    pub delivery: Option<Delivery>,
    pub payment: Option<Payment>,
    #[serde(default)]
    pub items: Vec<Item>,
    pub locale: Option<String>,
    pub internal_signature: Option<String>,
    pub customer_id: Option<String>,
    pub delivery_service: Option<String>,
    pub shardkey: Option<String>,
    pub sm_id: Option<i32>,
    /// Kept verbatim; see [`Order::created_at`] for a parsed view.
    pub date_created: Option<String>,
    pub oof_shard: Option<String>,
}

impl Order {
    /// `date_created` parsed as an RFC 3339 timestamp, if it is one.
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.date_created.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|ts| ts.with_timezone(&Utc))
    }

    /// Splits the document into the rows of the four tables.
    pub fn into_rows(self) -> AggregateRows {
        let order_uid = self.order_uid;

        let delivery = self.delivery.map(|d| DeliveryEntity {
            order_uid: order_uid.clone(),
            name: d.name,
            phone: d.phone,
            zip: d.zip,
            city: d.city,
            address: d.address,
            region: d.region,
            email: d.email,
        });

        let items = self
            .items
            .into_iter()
            .map(|item| ItemEntity {
                order_uid: order_uid.clone(),
                chrt_id: item.chrt_id,
                track_number: item.track_number,
                price: item.price,
                rid: item.rid,
                name: item.name,
                sale: item.sale,
                i_size: item.size,
                total_price: item.total_price,
                nm_id: item.nm_id,
                brand: item.brand,
                status: item.status,
            })
            .collect();

        let payment = self.payment.map(|p| PaymentEntity {
            transaction_id: p.transaction,
            request_id: p.request_id,
            currency: p.currency,
            provider: p.provider,
            amount: p.amount,
            payment_dt: p.payment_dt,
            bank: p.bank,
            delivery_cost: p.delivery_cost,
            goods_total: p.goods_total,
            custom_fee: p.custom_fee,
        });

        AggregateRows {
            order: OrderEntity {
                order_uid,
                track_number: self.track_number,
                entry: self.entry,
                locale: self.locale,
                internal_signature: self.internal_signature,
                customer_id: self.customer_id,
                delivery_service: self.delivery_service,
                shardkey: self.shardkey,
                sm_id: self.sm_id,
                date_created: self.date_created,
                oof_shard: self.oof_shard,
            },
            delivery,
            items,
            payment,
        }
    }

    pub fn from_rows(rows: AggregateRows) -> Self {
        let AggregateRows {
            order,
            delivery,
            items,
            payment,
        } = rows;

        Self {
            order_uid: order.order_uid,
            track_number: order.track_number,
            entry: order.entry,
            delivery: delivery.map(|d| Delivery {
                name: d.name,
                phone: d.phone,
                zip: d.zip,
                city: d.city,
                address: d.address,
                region: d.region,
                email: d.email,
            }),
            payment: payment.map(|p| Payment {
                transaction: p.transaction_id,
                request_id: p.request_id,
                currency: p.currency,
                provider: p.provider,
                amount: p.amount,
                payment_dt: p.payment_dt,
                bank: p.bank,
                delivery_cost: p.delivery_cost,
                goods_total: p.goods_total,
                custom_fee: p.custom_fee,
            }),
            items: items
                .into_iter()
                .map(|item| Item {
                    chrt_id: item.chrt_id,
                    track_number: item.track_number,
                    price: item.price,
                    rid: item.rid,
                    name: item.name,
                    sale: item.sale,
                    size: item.i_size,
                    total_price: item.total_price,
                    nm_id: item.nm_id,
                    brand: item.brand,
                    status: item.status,
                })
                .collect(),
            locale: order.locale,
            internal_signature: order.internal_signature,
            customer_id: order.customer_id,
            delivery_service: order.delivery_service,
            shardkey: order.shardkey,
            sm_id: order.sm_id,
            date_created: order.date_created,
            oof_shard: order.oof_shard,
        }
    }
}
