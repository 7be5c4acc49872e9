pub mod cache;
pub mod infra;
pub mod models;
pub mod order;
pub mod routes;
pub mod schema;
pub mod store;
