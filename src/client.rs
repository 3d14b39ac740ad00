//! REST client for the inventory API.
//!
//! [`InventoryApi`] is the seam the view controller talks through;
//! [`HttpApi`] implements it over [`reqwest`].

use crate::models::{ApiResponse, ProductFields, ProductId, SaleFields};
use reqwest::{Client, RequestBuilder};

/// Errors from the transport layer. A well-formed envelope reporting
/// `success: false` is not an error here; callers inspect it.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (connection refused, reset, TLS, ...).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-2xx status whose body was not a response envelope.
    #[error("server answered {status} without a response envelope")]
    Status { status: u16 },

    /// 2xx status with a body that is not a response envelope.
    #[error("malformed response body: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[allow(async_fn_in_trait)]
pub trait InventoryApi {
    /// `GET /api/produtos`
    async fn list_products(&self) -> Result<ApiResponse, ClientError>;
    /// `POST /api/produtos`
    async fn create_product(&self, fields: &ProductFields) -> Result<ApiResponse, ClientError>;
    /// `PUT /api/produtos/{id}`
    async fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<ApiResponse, ClientError>;
    /// `DELETE /api/produtos/{id}`
    async fn delete_product(&self, id: ProductId) -> Result<ApiResponse, ClientError>;
    /// `GET /api/vendas`
    async fn list_sales(&self) -> Result<ApiResponse, ClientError>;
    /// `POST /api/vendas`
    async fn record_sale(&self, fields: &SaleFields) -> Result<ApiResponse, ClientError>;
    /// `GET /api/buscar?termo=`
    async fn search(&self, term: &str) -> Result<ApiResponse, ClientError>;
}

pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    /// * `base_url` - scheme and authority, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send(request: RequestBuilder) -> Result<ApiResponse, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        match serde_json::from_slice::<ApiResponse>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ClientError::Status {
                status: status.as_u16(),
            }),
            Err(err) => Err(ClientError::Malformed(err)),
        }
    }
}

impl InventoryApi for HttpApi {
    async fn list_products(&self) -> Result<ApiResponse, ClientError> {
        Self::send(self.client.get(self.url("/api/produtos"))).await
    }

    async fn create_product(&self, fields: &ProductFields) -> Result<ApiResponse, ClientError> {
        Self::send(self.client.post(self.url("/api/produtos")).json(fields)).await
    }

    async fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
    ) -> Result<ApiResponse, ClientError> {
        let url = self.url(&format!("/api/produtos/{id}"));
        Self::send(self.client.put(url).json(fields)).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<ApiResponse, ClientError> {
        let url = self.url(&format!("/api/produtos/{id}"));
        Self::send(self.client.delete(url)).await
    }

    async fn list_sales(&self) -> Result<ApiResponse, ClientError> {
        Self::send(self.client.get(self.url("/api/vendas"))).await
    }

    async fn record_sale(&self, fields: &SaleFields) -> Result<ApiResponse, ClientError> {
        Self::send(self.client.post(self.url("/api/vendas")).json(fields)).await
    }

    async fn search(&self, term: &str) -> Result<ApiResponse, ClientError> {
        let request = self
            .client
            .get(self.url("/api/buscar"))
            .query(&[("termo", term)]);
        Self::send(request).await
    }
}
