use crate::errors::AppError;
use crate::models::InventoryData;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, info};

pub const DATA_PATH_VAR: &str = "INVENTORY_DATA_PATH";

pub fn resolve_data_path() -> PathBuf {
    match env::var(DATA_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
        _ => PathBuf::from("data/inventory.json"),
    }
}

pub async fn load_data(path: &Path) -> InventoryData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<InventoryData>(&bytes) {
            Ok(data) => {
                info!(
                    products = data.products.len(),
                    sales = data.sales.len(),
                    "loaded inventory from {}",
                    path.display()
                );
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                InventoryData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => InventoryData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            InventoryData::default()
        }
    }
}

pub async fn persist_data(path: &Path, data: &InventoryData) -> Result<(), AppError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(|err| {
        error!("failed to write data file: {err}");
        AppError::internal(err)
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Product;

    fn scratch_path(tag: &str) -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        env::temp_dir()
            .join(format!("inventory_storage_{tag}_{}_{nanos}", std::process::id()))
            .join("inventory.json")
    }

    #[tokio::test]
    async fn missing_file_loads_empty_inventory() {
        let data = load_data(&scratch_path("missing")).await;
        assert!(data.products.is_empty());
        assert_eq!(data.next_product_id, 1);
    }

    #[tokio::test]
    async fn persisted_inventory_loads_back() {
        let path = scratch_path("persist");
        let mut data = InventoryData::default();
        data.products.push(Product {
            id: 1,
            name: "Notebook".into(),
            description: "A5".into(),
            quantity: 4,
            price: 12.5,
        });
        data.next_product_id = 2;
        persist_data(&path, &data).await.unwrap();

        let loaded = load_data(&path).await;
        assert_eq!(loaded.products, data.products);
        assert_eq!(loaded.next_product_id, 2);
    }

    #[tokio::test]
    async fn corrupt_file_loads_empty_inventory() {
        let path = scratch_path("corrupt");
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, b"{ not json").await.unwrap();
        assert!(load_data(&path).await.products.is_empty());
    }
}
