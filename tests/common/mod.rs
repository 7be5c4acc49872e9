//! Store behaviour shared by every engine. Each check uses fresh keys so the
//! same database can run them repeatedly.
#![allow(dead_code)]

use order_aggregate_service::{
    models::{AggregateRows, DeliveryEntity, ItemEntity, OrderEntity, PaymentEntity},
    store::{OrderStore, StoreError},
};

pub fn uid() -> String {
    uuid::Uuid::new_v4().to_string()
}

pub fn item(order_uid: &str, chrt_id: i64) -> ItemEntity {
    ItemEntity {
        chrt_id: Some(chrt_id),
        name: Some("Mascaras".into()),
        price: Some(453),
        ..ItemEntity::keyed(order_uid)
    }
}

pub fn full_aggregate(order_uid: &str) -> AggregateRows {
    AggregateRows {
        order: OrderEntity {
            track_number: Some("WBILMTESTTRACK".into()),
            entry: Some("WBIL".into()),
            sm_id: Some(99),
            date_created: Some("2021-11-26T06:22:19Z".into()),
            ..OrderEntity::keyed(order_uid)
        },
        delivery: Some(DeliveryEntity {
            name: Some("Test Testov".into()),
            city: Some("Kiryat Mozkin".into()),
            ..DeliveryEntity::keyed(order_uid)
        }),
        items: vec![item(order_uid, 100), item(order_uid, 200)],
        payment: Some(PaymentEntity {
            currency: Some("USD".into()),
            amount: Some(1817),
            payment_dt: Some(1637907727),
            ..PaymentEntity::keyed(order_uid)
        }),
    }
}

fn sorted(mut items: Vec<ItemEntity>) -> Vec<ItemEntity> {
    items.sort_by_key(|item| item.chrt_id);
    items
}

pub async fn delivery_requires_its_order(store: &dyn OrderStore) {
    let order_uid = uid();

    let err = store
        .insert_delivery(DeliveryEntity::keyed(&order_uid))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::ReferentialIntegrity { .. }),
        "unexpected error: {err:?}"
    );

    store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();
    store
        .insert_delivery(DeliveryEntity::keyed(&order_uid))
        .await
        .unwrap();
    assert!(store.find_delivery(&order_uid).await.unwrap().is_some());
}

pub async fn second_delivery_is_a_duplicate(store: &dyn OrderStore) {
    let order_uid = uid();
    store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();
    store
        .insert_delivery(DeliveryEntity::keyed(&order_uid))
        .await
        .unwrap();

    let err = store
        .insert_delivery(DeliveryEntity::keyed(&order_uid))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::UniqueViolation { .. }),
        "unexpected error: {err:?}"
    );
}

pub async fn second_order_is_a_duplicate(store: &dyn OrderStore) {
    let order_uid = uid();
    store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();

    let err = store
        .insert_order(OrderEntity::keyed(&order_uid))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::UniqueViolation { .. }),
        "unexpected error: {err:?}"
    );
}

pub async fn any_number_of_items_is_accepted(store: &dyn OrderStore) {
    for count in [0usize, 1, 5] {
        let order_uid = uid();
        store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();

        // Identical rows on purpose: items carry no uniqueness constraint.
        for _ in 0..count {
            store.insert_item(item(&order_uid, 100)).await.unwrap();
        }

        let items = store.find_items(&order_uid).await.unwrap();
        assert_eq!(items.len(), count);
        assert!(items.iter().all(|i| i.order_uid == order_uid));
    }
}

pub async fn item_requires_its_order(store: &dyn OrderStore) {
    let err = store.insert_item(item(&uid(), 1)).await.unwrap_err();
    assert!(
        matches!(err, StoreError::ReferentialIntegrity { .. }),
        "unexpected error: {err:?}"
    );
}

pub async fn orphan_payment_is_refused(store: &dyn OrderStore) {
    let err = store
        .insert_payment(PaymentEntity::keyed(uid()))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::ReferentialIntegrity { .. }),
        "unexpected error: {err:?}"
    );
}

pub async fn second_payment_is_a_duplicate(store: &dyn OrderStore) {
    let order_uid = uid();
    store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();
    store
        .insert_payment(PaymentEntity::keyed(&order_uid))
        .await
        .unwrap();

    let err = store
        .insert_payment(PaymentEntity::keyed(&order_uid))
        .await
        .unwrap_err();
    assert!(
        matches!(err, StoreError::UniqueViolation { .. }),
        "unexpected error: {err:?}"
    );
}

pub async fn deleting_an_order_cascades(store: &dyn OrderStore) {
    let order_uid = uid();

    store.insert_order(OrderEntity::keyed(&order_uid)).await.unwrap();
    store
        .insert_delivery(DeliveryEntity::keyed(&order_uid))
        .await
        .unwrap();
    store.insert_item(item(&order_uid, 100)).await.unwrap();
    store
        .insert_payment(PaymentEntity::keyed(&order_uid))
        .await
        .unwrap();

    assert!(store.delete_order(&order_uid).await.unwrap());

    assert!(store.find_order(&order_uid).await.unwrap().is_none());
    assert!(store.find_delivery(&order_uid).await.unwrap().is_none());
    assert!(store.find_items(&order_uid).await.unwrap().is_empty());
    assert!(store.find_payment(&order_uid).await.unwrap().is_none());
    assert!(store.find_aggregate(&order_uid).await.unwrap().is_none());

    assert!(!store.delete_order(&order_uid).await.unwrap());
}

pub async fn deleting_one_order_leaves_others(store: &dyn OrderStore) {
    let doomed = uid();
    let kept = uid();
    store.create_aggregate(full_aggregate(&doomed)).await.unwrap();
    store.create_aggregate(full_aggregate(&kept)).await.unwrap();

    store.delete_order(&doomed).await.unwrap();

    let rows = store.find_aggregate(&kept).await.unwrap().unwrap();
    assert!(rows.delivery.is_some());
    assert_eq!(rows.items.len(), 2);
    assert!(rows.payment.is_some());
}

pub async fn aggregate_reads_back_whole(store: &dyn OrderStore) {
    let order_uid = uid();
    let rows = full_aggregate(&order_uid);
    store.create_aggregate(rows.clone()).await.unwrap();

    let found = store.find_aggregate(&order_uid).await.unwrap().unwrap();
    assert_eq!(found.order, rows.order);
    assert_eq!(found.delivery, rows.delivery);
    assert_eq!(found.payment, rows.payment);
    assert_eq!(sorted(found.items), sorted(rows.items));
}

pub async fn aggregate_without_children(store: &dyn OrderStore) {
    let order_uid = uid();
    store
        .create_aggregate(AggregateRows {
            order: OrderEntity::keyed(&order_uid),
            ..Default::default()
        })
        .await
        .unwrap();

    let found = store.find_aggregate(&order_uid).await.unwrap().unwrap();
    assert!(found.delivery.is_none());
    assert!(found.items.is_empty());
    assert!(found.payment.is_none());
}

pub async fn failed_aggregate_writes_nothing(store: &dyn OrderStore) {
    let order_uid = uid();
    let mut rows = full_aggregate(&order_uid);
    rows.payment = Some(PaymentEntity::keyed(uid()));

    let err = store.create_aggregate(rows).await.unwrap_err();
    assert!(
        matches!(err, StoreError::ReferentialIntegrity { .. }),
        "unexpected error: {err:?}"
    );

    assert!(store.find_order(&order_uid).await.unwrap().is_none());
    assert!(store.find_delivery(&order_uid).await.unwrap().is_none());
    assert!(store.find_items(&order_uid).await.unwrap().is_empty());
}

/// A payment keyed by another order's uid is legal; it belongs to that order.
pub async fn payment_follows_the_order_it_references(store: &dyn OrderStore) {
    let owner = uid();
    let order_uid = uid();
    store.insert_order(OrderEntity::keyed(&owner)).await.unwrap();

    let mut rows = full_aggregate(&order_uid);
    rows.payment = Some(PaymentEntity::keyed(&owner));
    store.create_aggregate(rows).await.unwrap();

    let found = store.find_aggregate(&order_uid).await.unwrap().unwrap();
    assert!(found.payment.is_none());
    let payment = store.find_payment(&owner).await.unwrap().unwrap();
    assert_eq!(payment.order_uid(), owner);

    store.delete_order(&owner).await.unwrap();
    assert!(store.find_payment(&owner).await.unwrap().is_none());
    assert!(store.find_order(&order_uid).await.unwrap().is_some());
}

pub async fn missing_aggregate_is_none(store: &dyn OrderStore) {
    assert!(store.find_aggregate(&uid()).await.unwrap().is_none());
}

/// A rejected aggregate must not disturb the rows it collided with.
pub async fn failed_aggregate_leaves_existing_rows_alone(store: &dyn OrderStore) {
    let existing = uid();
    let order_uid = uid();
    store.create_aggregate(full_aggregate(&existing)).await.unwrap();

    let mut rows = full_aggregate(&order_uid);
    rows.delivery = Some(DeliveryEntity {
        name: Some("Someone Else".into()),
        ..DeliveryEntity::keyed(&existing)
    });

    let err = store.create_aggregate(rows).await.unwrap_err();
    assert!(
        matches!(err, StoreError::UniqueViolation { .. }),
        "unexpected error: {err:?}"
    );

    assert!(store.find_aggregate(&order_uid).await.unwrap().is_none());
    assert!(store.find_items(&order_uid).await.unwrap().is_empty());
    assert!(store.find_payment(&order_uid).await.unwrap().is_none());

    let kept = store.find_aggregate(&existing).await.unwrap().unwrap();
    assert_eq!(kept.delivery, full_aggregate(&existing).delivery);
    assert_eq!(kept.items.len(), 2);
    assert!(kept.payment.is_some());
}

/// A read racing a delete sees either the whole aggregate or none of it.
pub async fn reads_see_whole_aggregate_or_nothing(store: &dyn OrderStore) {
    for _ in 0..10 {
        let order_uid = uid();
        store.create_aggregate(full_aggregate(&order_uid)).await.unwrap();

        let (found, deleted) = tokio::join!(
            store.find_aggregate(&order_uid),
            store.delete_order(&order_uid)
        );
        assert!(deleted.unwrap());

        if let Some(rows) = found.unwrap() {
            assert!(rows.delivery.is_some());
            assert_eq!(rows.items.len(), 2);
            assert!(rows.payment.is_some());
        }
    }
}
