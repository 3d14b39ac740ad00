//! HTML fragments for the page's table bodies.
//!
//! The server uses these for the first paint and the view controller uses
//! them to re-render a single table after a call succeeds, so both always
//! produce the same markup.

use crate::models::{Product, Sale};

pub const NO_RESULTS: &str = "No products found";

pub fn format_price(value: f64) -> String {
    format!("R$ {value:.2}")
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn cells(product: &Product) -> String {
    format!(
        "<td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
        escape(&product.name),
        escape(&product.description),
        product.quantity,
        format_price(product.price)
    )
}

/// Inventory table rows, each keyed by `data-id` and carrying the edit and
/// delete controls.
pub fn product_rows(products: &[Product]) -> String {
    if products.is_empty() {
        return r#"<tr><td colspan="5" class="empty">No products registered</td></tr>"#.to_string();
    }
    products
        .iter()
        .map(|product| {
            format!(
                r#"<tr data-id="{id}">{cells}<td><button type="button" class="btn-edit">Edit</button> <button type="button" class="btn-delete">Delete</button></td></tr>"#,
                id = product.id,
                cells = cells(product)
            )
        })
        .collect()
}

pub fn sale_rows(sales: &[Sale]) -> String {
    if sales.is_empty() {
        return r#"<tr><td colspan="5" class="empty">No sales yet</td></tr>"#.to_string();
    }
    sales
        .iter()
        .map(|sale| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&sale.sold_at),
                escape(&sale.product_name),
                sale.quantity,
                format_price(sale.unit_price),
                format_price(sale.total)
            )
        })
        .collect()
}

pub fn search_rows(products: &[Product]) -> String {
    if products.is_empty() {
        return format!(r#"<tr><td colspan="4" class="text-center">{NO_RESULTS}</td></tr>"#);
    }
    products
        .iter()
        .map(|product| format!("<tr>{}</tr>", cells(product)))
        .collect()
}

/// `<option>` list for the sale form's product selector.
pub fn product_options(products: &[Product]) -> String {
    products
        .iter()
        .map(|product| {
            format!(
                r#"<option value="{}">{} ({} in stock)</option>"#,
                product.id,
                escape(&product.name),
                product.quantity
            )
        })
        .collect()
}
