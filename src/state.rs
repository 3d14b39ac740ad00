use crate::models::InventoryData;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub data_path: PathBuf,
    pub data: Arc<Mutex<InventoryData>>,
}

impl AppState {
    pub fn new(data_path: PathBuf, data: InventoryData) -> Self {
        Self {
            data_path,
            data: Arc::new(Mutex::new(data)),
        }
    }
}
