use crate::errors::AppError;
use crate::models::{InventoryData, Product, ProductFields, ProductId, Sale, SaleFields, Summary};
use chrono::{Local, NaiveDateTime};

const SOLD_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const MAX_PRICE: f64 = 1_000_000_000.0;

struct ValidProduct {
    name: String,
    description: String,
    quantity: u32,
    price: f64,
}

fn validate(fields: &ProductFields) -> Result<ValidProduct, AppError> {
    let name = fields.nome.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("name is required"));
    }
    let quantity = fields
        .quantidade
        .as_quantity()
        .ok_or_else(|| AppError::bad_request("quantity must be a non-negative integer"))?;
    let price = fields
        .preco
        .as_price()
        .ok_or_else(|| AppError::bad_request("price must be a non-negative number"))?;
    if price > MAX_PRICE {
        return Err(AppError::bad_request("price is too large"));
    }

    Ok(ValidProduct {
        name: name.to_string(),
        description: fields.descricao.trim().to_string(),
        quantity,
        price,
    })
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

pub fn add_product(data: &mut InventoryData, fields: &ProductFields) -> Result<Product, AppError> {
    let valid = validate(fields)?;
    if !fields.forcar && data.products.iter().any(|p| same_name(&p.name, &valid.name)) {
        return Err(AppError::duplicate());
    }

    let product = Product {
        id: data.next_product_id,
        name: valid.name,
        description: valid.description,
        quantity: valid.quantity,
        price: valid.price,
    };
    data.next_product_id += 1;
    data.products.push(product.clone());
    Ok(product)
}

pub fn update_product(
    data: &mut InventoryData,
    id: ProductId,
    fields: &ProductFields,
) -> Result<Product, AppError> {
    let valid = validate(fields)?;
    let product = data
        .products
        .iter_mut()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::not_found(format!("product {id} not found")))?;

    product.name = valid.name;
    product.description = valid.description;
    product.quantity = valid.quantity;
    product.price = valid.price;
    Ok(product.clone())
}

pub fn remove_product(data: &mut InventoryData, id: ProductId) -> Result<Product, AppError> {
    let index = data
        .products
        .iter()
        .position(|p| p.id == id)
        .ok_or_else(|| AppError::not_found(format!("product {id} not found")))?;
    Ok(data.products.remove(index))
}

pub fn record_sale(data: &mut InventoryData, fields: &SaleFields) -> Result<Sale, AppError> {
    record_sale_at(data, fields, Local::now().naive_local())
}

pub fn record_sale_at(
    data: &mut InventoryData,
    fields: &SaleFields,
    now: NaiveDateTime,
) -> Result<Sale, AppError> {
    let product_id = fields
        .produto_id
        .as_u64()
        .ok_or_else(|| AppError::bad_request("invalid product id"))?;
    let quantity = fields
        .quantidade
        .as_quantity()
        .filter(|q| *q > 0)
        .ok_or_else(|| AppError::bad_request("quantity must be a positive integer"))?;

    let Some(product) = data.products.iter_mut().find(|p| p.id == product_id) else {
        return Err(AppError::conflict("Product not found"));
    };
    if product.quantity < quantity {
        return Err(AppError::conflict("Insufficient stock"));
    }
    // A non-finite total serializes as null and makes the data file unreadable.
    let total = product.price * f64::from(quantity);
    if !total.is_finite() {
        return Err(AppError::bad_request("sale total is out of range"));
    }
    product.quantity -= quantity;

    let sale = Sale {
        id: data.next_sale_id,
        product_id,
        product_name: product.name.clone(),
        quantity,
        unit_price: product.price,
        total,
        sold_at: now.format(SOLD_AT_FORMAT).to_string(),
    };
    data.next_sale_id += 1;
    data.sales.push(sale.clone());
    Ok(sale)
}

pub fn list_products(data: &InventoryData) -> Vec<Product> {
    let mut products = data.products.clone();
    products.sort_by_cached_key(|p| (p.name.to_lowercase(), p.id));
    products
}

pub fn list_sales(data: &InventoryData) -> Vec<Sale> {
    let mut sales = data.sales.clone();
    sales.sort_by(|a, b| b.sold_at.cmp(&a.sold_at).then(b.id.cmp(&a.id)));
    sales
}

/// Case-insensitive substring match on the product name; a blank term
/// matches nothing.
pub fn search(data: &InventoryData, term: &str) -> Vec<Product> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    list_products(data)
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

pub fn summary(data: &InventoryData) -> Summary {
    Summary {
        total_stock: data.products.iter().map(|p| u64::from(p.quantity)).sum(),
        total_sold: data.sales.iter().map(|s| u64::from(s.quantity)).sum(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldValue;
    use crate::storage::{load_data, persist_data};
    use axum::http::StatusCode;
    use chrono::NaiveDate;

    fn fields(name: &str, quantity: &str, price: &str) -> ProductFields {
        ProductFields {
            nome: name.into(),
            descricao: "desc".into(),
            quantidade: quantity.into(),
            preco: price.into(),
            forcar: false,
        }
    }

    fn sale(product_id: u64, quantity: i64) -> SaleFields {
        SaleFields {
            produto_id: FieldValue::Integer(product_id as i64),
            quantidade: FieldValue::Integer(quantity),
        }
    }

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 7, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn add_product_assigns_sequential_ids() {
        let mut data = InventoryData::default();
        let first = add_product(&mut data, &fields("Pen", "10", "1.50")).unwrap();
        let second = add_product(&mut data, &fields("Ink", "3", "4")).unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.quantity, 10);
        assert_eq!(first.price, 1.5);
    }

    #[test]
    fn duplicate_name_needs_force() {
        let mut data = InventoryData::default();
        add_product(&mut data, &fields("Pen", "1", "1")).unwrap();

        let err = add_product(&mut data, &fields("  pEN ", "1", "1")).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert!(err.body.duplicate);

        let mut forced = fields("pen", "1", "1");
        forced.forcar = true;
        add_product(&mut data, &forced).unwrap();
        assert_eq!(data.products.len(), 2);
    }

    #[test]
    fn invalid_fields_are_rejected() {
        let mut data = InventoryData::default();
        for bad in [fields("", "1", "1"), fields("Pen", "-1", "1"), fields("Pen", "1", "x")] {
            let err = add_product(&mut data, &bad).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
        assert!(data.products.is_empty());
    }

    #[test]
    fn oversized_price_is_rejected() {
        let mut data = InventoryData::default();
        let err = add_product(&mut data, &fields("Gold", "1", "1e308")).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(data.products.is_empty());
    }

    #[test]
    fn blank_numbers_are_rejected_on_update() {
        let mut data = InventoryData::default();
        add_product(&mut data, &fields("Pen", "1", "2")).unwrap();

        for bad in [fields("Pen", "1", ""), fields("Pen", "", "2")] {
            let err = update_product(&mut data, 1, &bad).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
        }
        assert_eq!(data.products[0].price, 2.0);
    }

    #[tokio::test]
    async fn non_finite_sale_total_is_refused_and_data_reloads() {
        let mut data = InventoryData::default();
        data.products.push(Product {
            id: 1,
            name: "Gold".into(),
            description: String::new(),
            quantity: 5,
            price: 1e308,
        });
        data.next_product_id = 2;

        let err = record_sale_at(&mut data, &sale(1, 2), noon()).unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(data.products[0].quantity, 5);
        assert!(data.sales.is_empty());

        let path = std::env::temp_dir().join(format!(
            "inventory_total_{}_{}.json",
            std::process::id(),
            chrono::Local::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        persist_data(&path, &data).await.unwrap();
        let reloaded = load_data(&path).await;
        assert_eq!(reloaded.products, data.products);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn update_and_remove_missing_product_is_not_found() {
        let mut data = InventoryData::default();
        let err = update_product(&mut data, 9, &fields("Pen", "1", "1")).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
        let err = remove_product(&mut data, 9).unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn sale_decrements_stock_and_records_total() {
        let mut data = InventoryData::default();
        add_product(&mut data, &fields("Pen", "5", "2.50")).unwrap();

        let recorded = record_sale_at(&mut data, &sale(1, 2), noon()).unwrap();
        assert_eq!(recorded.total, 5.0);
        assert_eq!(recorded.product_name, "Pen");
        assert_eq!(recorded.sold_at, "2025-07-10 12:00:00");
        assert_eq!(data.products[0].quantity, 3);
        assert_eq!(summary(&data), Summary { total_stock: 3, total_sold: 2 });
    }

    #[test]
    fn sale_beyond_stock_changes_nothing() {
        let mut data = InventoryData::default();
        add_product(&mut data, &fields("Pen", "1", "2")).unwrap();

        let err = record_sale_at(&mut data, &sale(1, 2), noon()).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.body.reason(), "Insufficient stock");
        assert_eq!(data.products[0].quantity, 1);
        assert!(data.sales.is_empty());

        let err = record_sale_at(&mut data, &sale(42, 1), noon()).unwrap_err();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn search_matches_name_substring_ignoring_case() {
        let mut data = InventoryData::default();
        for name in ["Blue pen", "Notebook", "Red PEN"] {
            add_product(&mut data, &fields(name, "1", "1")).unwrap();
        }
        let names: Vec<_> = search(&data, "pen").into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["Blue pen", "Red PEN"]);
        assert!(search(&data, "   ").is_empty());
    }

    #[test]
    fn sales_are_listed_newest_first() {
        let mut data = InventoryData::default();
        add_product(&mut data, &fields("Pen", "5", "1")).unwrap();
        record_sale_at(&mut data, &sale(1, 1), noon()).unwrap();
        let later = noon() + chrono::Duration::hours(1);
        record_sale_at(&mut data, &sale(1, 1), later).unwrap();

        let ids: Vec<_> = list_sales(&data).into_iter().map(|s| s.id).collect();
        assert_eq!(ids, [2, 1]);
    }
}
