use serde::{Deserialize, Serialize};

pub type ProductId = u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "descricao")]
    pub description: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "preco")]
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: u64,
    #[serde(rename = "produto_id")]
    pub product_id: ProductId,
    #[serde(rename = "produto_nome")]
    pub product_name: String,
    #[serde(rename = "quantidade")]
    pub quantity: u32,
    #[serde(rename = "preco_unitario")]
    pub unit_price: f64,
    pub total: f64,
    #[serde(rename = "data")]
    pub sold_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    #[serde(rename = "total_estoque")]
    pub total_stock: u64,
    #[serde(rename = "total_vendido")]
    pub total_sold: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryData {
    #[serde(default = "first_id")]
    pub next_product_id: ProductId,
    #[serde(default = "first_id")]
    pub next_sale_id: u64,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

impl Default for InventoryData {
    fn default() -> Self {
        Self {
            next_product_id: first_id(),
            next_sale_id: first_id(),
            products: Vec::new(),
            sales: Vec::new(),
        }
    }
}

fn first_id() -> u64 {
    1
}

/// A numeric field as it crosses the wire: forms send text, typed callers
/// send numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl FieldValue {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Integer(value) => u64::try_from(*value).ok(),
            Self::Decimal(value) if value.fract() == 0.0 && *value >= 0.0 => Some(*value as u64),
            Self::Decimal(_) => None,
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    pub fn as_quantity(&self) -> Option<u32> {
        self.as_u64().and_then(|value| u32::try_from(value).ok())
    }

    pub fn as_price(&self) -> Option<f64> {
        let value = match self {
            Self::Integer(value) => *value as f64,
            Self::Decimal(value) => *value,
            Self::Text(text) => text.trim().parse().ok()?,
        };
        (value.is_finite() && value >= 0.0).then_some(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// Body of `POST /api/produtos` and `PUT /api/produtos/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductFields {
    pub nome: String,
    #[serde(default)]
    pub descricao: String,
    pub quantidade: FieldValue,
    pub preco: FieldValue,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub forcar: bool,
}

impl From<&Product> for ProductFields {
    fn from(product: &Product) -> Self {
        Self {
            nome: product.name.clone(),
            descricao: product.description.clone(),
            quantidade: FieldValue::Integer(i64::from(product.quantity)),
            preco: FieldValue::Decimal(product.price),
            forcar: false,
        }
    }
}

/// Body of `POST /api/vendas`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleFields {
    pub produto_id: FieldValue,
    pub quantidade: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub termo: String,
}

/// Response envelope shared by every API endpoint.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub produtos: Option<Vec<Product>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendas: Option<Vec<Sale>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resumo: Option<Summary>,
}

impl ApiResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::default()
        }
    }

    pub fn duplicate() -> Self {
        Self {
            duplicate: true,
            ..Self::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.produtos = Some(products);
        self
    }

    pub fn with_sales(mut self, sales: Vec<Sale>) -> Self {
        self.vendas = Some(sales);
        self
    }

    pub fn with_summary(mut self, summary: Summary) -> Self {
        self.resumo = Some(summary);
        self
    }

    /// The server-supplied reason for a failed call, `error` taking
    /// precedence over `message`.
    pub fn reason(&self) -> &str {
        self.error
            .as_deref()
            .or(self.message.as_deref())
            .unwrap_or("unknown error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_accepts_text_and_numbers() {
        let text: FieldValue = serde_json::from_str("\" 12 \"").unwrap();
        assert_eq!(text.as_quantity(), Some(12));
        let integer: FieldValue = serde_json::from_str("7").unwrap();
        assert_eq!(integer, FieldValue::Integer(7));
        let decimal: FieldValue = serde_json::from_str("19.9").unwrap();
        assert_eq!(decimal.as_price(), Some(19.9));
        assert_eq!(decimal.as_quantity(), None);
        assert_eq!(FieldValue::from("-3").as_quantity(), None);
        assert_eq!(FieldValue::from("abc").as_price(), None);
    }

    #[test]
    fn product_fields_omit_force_flag_unless_set() {
        let mut fields = ProductFields {
            nome: "Pen".into(),
            descricao: String::new(),
            quantidade: "1".into(),
            preco: "2.50".into(),
            forcar: false,
        };
        let body = serde_json::to_value(&fields).unwrap();
        assert!(body.get("forcar").is_none());

        fields.forcar = true;
        let body = serde_json::to_value(&fields).unwrap();
        assert_eq!(body["forcar"], serde_json::json!(true));
    }

    #[test]
    fn envelope_reason_prefers_error() {
        let reply = ApiResponse::failure("boom").with_message("ignored");
        assert_eq!(reply.reason(), "boom");
        let reply = ApiResponse::default().with_message("Insufficient stock");
        assert_eq!(reply.reason(), "Insufficient stock");
    }
}
