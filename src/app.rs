use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, put},
    Router,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route(
            "/api/produtos",
            get(handlers::list_products).post(handlers::create_product),
        )
        .route(
            "/api/produtos/:id",
            put(handlers::update_product).delete(handlers::delete_product),
        )
        .route(
            "/api/vendas",
            get(handlers::list_sales).post(handlers::record_sale),
        )
        .route("/api/buscar", get(handlers::search))
        .with_state(state)
}
