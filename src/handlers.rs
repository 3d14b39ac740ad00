use crate::errors::AppError;
use crate::inventory;
use crate::models::{ApiResponse, InventoryData, ProductFields, ProductId, SaleFields, SearchQuery};
use crate::state::AppState;
use crate::storage::persist_data;
use crate::ui::render_index;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use tracing::{info, warn};

type ApiResult = Result<Json<ApiResponse>, AppError>;

/// Applies `change` to a copy of the inventory and publishes the copy only
/// once it has been written to disk.
async fn commit<T>(
    state: &AppState,
    change: impl FnOnce(&mut InventoryData) -> Result<T, AppError>,
) -> Result<T, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let value = change(&mut next)?;
    persist_data(&state.data_path, &next).await?;
    *data = next;
    Ok(value)
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.lock().await;
    Html(render_index(
        &inventory::list_products(&data),
        &inventory::list_sales(&data),
        inventory::summary(&data),
    ))
}

pub async fn list_products(State(state): State<AppState>) -> ApiResult {
    let data = state.data.lock().await;
    Ok(Json(
        ApiResponse::ok()
            .with_products(inventory::list_products(&data))
            .with_summary(inventory::summary(&data)),
    ))
}

pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<ProductFields>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse>), AppError> {
    let Json(fields) = payload?;
    let product = commit(&state, |data| inventory::add_product(data, &fields))
        .await
        .inspect_err(|err| {
            warn!(name = %fields.nome, status = %err.status, "product rejected");
        })?;

    info!(id = product.id, name = %product.name, forced = fields.forcar, "product created");
    Ok((StatusCode::CREATED, Json(ApiResponse::ok())))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    payload: Result<Json<ProductFields>, JsonRejection>,
) -> ApiResult {
    let Json(fields) = payload?;
    let product = commit(&state, |data| inventory::update_product(data, id, &fields)).await?;

    info!(id = product.id, "product updated");
    Ok(Json(ApiResponse::ok()))
}

pub async fn delete_product(State(state): State<AppState>, Path(id): Path<ProductId>) -> ApiResult {
    let product = commit(&state, |data| inventory::remove_product(data, id)).await?;

    info!(id = product.id, name = %product.name, "product deleted");
    Ok(Json(ApiResponse::ok()))
}

pub async fn list_sales(State(state): State<AppState>) -> ApiResult {
    let data = state.data.lock().await;
    Ok(Json(ApiResponse::ok().with_sales(inventory::list_sales(&data))))
}

pub async fn record_sale(
    State(state): State<AppState>,
    payload: Result<Json<SaleFields>, JsonRejection>,
) -> ApiResult {
    let Json(fields) = payload?;
    let sale = commit(&state, |data| inventory::record_sale(data, &fields))
        .await
        .inspect_err(|err| {
            warn!(reason = err.body.reason(), "sale rejected");
        })?;

    info!(id = sale.id, product = sale.product_id, quantity = sale.quantity, "sale recorded");
    Ok(Json(ApiResponse::ok().with_message("Sale recorded")))
}

pub async fn search(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult {
    let data = state.data.lock().await;
    Ok(Json(
        ApiResponse::ok().with_products(inventory::search(&data, &query.termo)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;

    /// A data path that is a directory, so every write fails.
    async fn unwritable_state() -> AppState {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let path = std::env::temp_dir()
            .join(format!("inventory_unwritable_{}_{nanos}", std::process::id()))
            .join("inventory.json");
        tokio::fs::create_dir_all(&path).await.unwrap();
        AppState::new(path, InventoryData::default())
    }

    fn pen() -> ProductFields {
        ProductFields {
            nome: "Pen".into(),
            descricao: String::new(),
            quantidade: "3".into(),
            preco: "1.5".into(),
            forcar: false,
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_inventory_untouched() {
        let state = unwritable_state().await;

        let err = create_product(State(state.clone()), Ok(Json(pen())))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(state.data.lock().await.products.is_empty());

        // The retry is not mistaken for a duplicate.
        let err = create_product(State(state.clone()), Ok(Json(pen())))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.body.duplicate);
    }

    #[tokio::test]
    async fn failed_write_keeps_stock_and_sales() {
        let state = unwritable_state().await;
        inventory::add_product(&mut *state.data.lock().await, &pen()).unwrap();

        let sale = SaleFields {
            produto_id: FieldValue::Integer(1),
            quantidade: FieldValue::Integer(2),
        };
        let err = record_sale(State(state.clone()), Ok(Json(sale)))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);

        let data = state.data.lock().await;
        assert_eq!(data.products[0].quantity, 3);
        assert!(data.sales.is_empty());
        drop(data);

        let err = delete_product(State(state.clone()), Path(1)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(state.data.lock().await.products.len(), 1);
    }
}
