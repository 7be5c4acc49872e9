use axum::Router;
use tower_http::trace::TraceLayer;

use crate::infra::{app_state::AppState, swagger};

pub mod orders;

/// The full HTTP application: order routes, Swagger UI and request tracing.
pub fn app(state: AppState) -> Router {
    let (routes, mut openapi) = orders::routes_with_openapi().split_for_parts();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("Order Aggregate Service API")
        .version(env!("CARGO_PKG_VERSION"))
        .build();

    routes
        .merge(swagger::create_swagger_ui(openapi))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
