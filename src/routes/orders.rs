use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::info;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    infra::{
        app_error::{AppError, StdResponse},
        app_state::AppState,
    },
    order::Order,
    store::StoreError,
};

/// Defines routes with OpenAPI specs.
pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_last_order, submit_order))
        .routes(utoipa_axum::routes!(create_order))
        .routes(utoipa_axum::routes!(get_order, delete_order))
}

/// Queue an order in the write-behind cache.
#[utoipa::path(
    post,
    path = "/order",
    tags = ["Orders"],
    request_body = Order,
    responses(
        (status = 200, description = "Order queued", body = StdResponse<String, String>),
        (status = 409, description = "Order with the same uid is already pending")
    )
)]
async fn submit_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse, AppError> {
    let order_uid = order.order_uid.clone();
    state.cache.submit(order).await?;

    info!("Order {} received", order_uid);

    Ok(StdResponse {
        data: Some(order_uid),
        message: Some("Order received!"),
    })
}

/// Fetch the most recently received order still waiting in the cache.
#[utoipa::path(
    get,
    path = "/order",
    tags = ["Orders"],
    responses(
        (status = 200, description = "Last pending order, if any", body = StdResponse<Order, String>)
    )
)]
async fn get_last_order(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let response = match state.cache.last().await {
        Some(order) => StdResponse {
            data: Some(order),
            message: Some("Get last order successfully"),
        },
        None => StdResponse {
            data: None,
            message: Some("No orders yet"),
        },
    };

    Ok(response)
}

/// Persist a whole order aggregate in one transaction.
#[utoipa::path(
    post,
    path = "/orders",
    tags = ["Orders"],
    request_body = Order,
    responses(
        (status = 200, description = "Created order successfully", body = StdResponse<Order, String>),
        (status = 409, description = "Duplicate order uid or payment transaction"),
        (status = 422, description = "A child row references a missing order")
    )
)]
async fn create_order(
    State(state): State<AppState>,
    Json(order): Json<Order>,
) -> Result<impl IntoResponse, AppError> {
    if state.cache.get(&order.order_uid).await.is_some() {
        return Err(StoreError::UniqueViolation {
            relation: "orders".into(),
            detail: format!("Key (order_uid)=({}) is already pending.", order.order_uid),
        }
        .into());
    }

    state.store.create_aggregate(order.clone().into_rows()).await?;

    info!("Order {} created", order.order_uid);

    Ok(StdResponse {
        data: Some(order),
        message: Some("Create order successfully"),
    })
}

/// Fetch an order aggregate, looking at pending orders before the store.
#[utoipa::path(
    get,
    path = "/orders/{order_uid}",
    tags = ["Orders"],
    params(
        ("order_uid" = String, Path, description = "Order uid to fetch")
    ),
    responses(
        (status = 200, description = "Get order successfully", body = StdResponse<Order, String>),
        (status = 404, description = "No such order")
    )
)]
async fn get_order(
    Path(order_uid): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let order = match state.cache.get(&order_uid).await {
        Some(order) => order,
        None => state
            .store
            .find_aggregate(&order_uid)
            .await?
            .map(Order::from_rows)
            .ok_or(AppError::NotFound)?,
    };

    Ok(StdResponse {
        data: Some(order),
        message: Some("Get order successfully"),
    })
}

/// Delete an order together with its delivery, items and payment.
#[utoipa::path(
    delete,
    path = "/orders/{order_uid}",
    tags = ["Orders"],
    params(
        ("order_uid" = String, Path, description = "Order uid to delete")
    ),
    responses(
        (status = 200, description = "Deleted order successfully", body = StdResponse<String, String>),
        (status = 404, description = "No such order")
    )
)]
async fn delete_order(
    Path(order_uid): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let was_pending = state.cache.remove(&order_uid).await;
    let was_stored = state.store.delete_order(&order_uid).await?;

    if !was_pending && !was_stored {
        return Err(AppError::NotFound);
    }

    info!("Order {} deleted", order_uid);

    Ok(StdResponse {
        data: Some(order_uid),
        message: Some("Deleted order successfully"),
    })
}
