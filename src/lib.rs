pub mod app;
pub mod client;
pub mod controller;
pub mod errors;
pub mod handlers;
pub mod host;
pub mod inventory;
pub mod models;
pub mod render;
pub mod state;
pub mod storage;
pub mod ui;

pub use app::router;
pub use client::{ClientError, HttpApi, InventoryApi};
pub use controller::{NavEvent, Outcome, ProductForm, SaleForm, SearchTrigger, ViewController};
pub use state::AppState;
pub use storage::{load_data, resolve_data_path};
