use crate::models::{Product, Sale, Summary};
use crate::render;

pub fn render_index(products: &[Product], sales: &[Sale], summary: Summary) -> String {
    let products_json = script_json(products);
    fill(INDEX_HTML, |key| {
        let value = match key {
            "PRODUCT_ROWS" => render::product_rows(products),
            "PRODUCT_OPTIONS" => render::product_options(products),
            "SALE_ROWS" => render::sale_rows(sales),
            "TOTAL_STOCK" => summary.total_stock.to_string(),
            "TOTAL_SOLD" => summary.total_sold.to_string(),
            "NO_RESULTS" => render::NO_RESULTS.to_string(),
            "PRODUCTS_JSON" => products_json.clone(),
            _ => return None,
        };
        Some(value)
    })
}

/// JSON safe to embed in a `<script>` element: markup characters only occur
/// inside strings there, so they are written as unicode escapes.
fn script_json(products: &[Product]) -> String {
    serde_json::to_string(products)
        .unwrap_or_else(|_| "[]".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Substitutes `{{KEY}}` placeholders in a single pass over `template`.
/// Inserted values are never scanned again, and unknown keys are kept as is.
fn fill(template: &str, value: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let resolved = after
            .find("}}")
            .and_then(|end| value(&after[..end]).map(|text| (end, text)));
        match resolved {
            Some((end, text)) => {
                out.push_str(&text);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Inventory</title>
  <style>
    :root {
      --bg: #f5f1ea;
      --ink: #2b2a28;
      --accent: #2f4858;
      --danger: #c63b2b;
      --card: #ffffff;
      --shadow: 0 18px 40px rgba(47, 72, 88, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      padding: 24px 16px 48px;
    }

    .app {
      width: min(960px, 100%);
      margin: 0 auto;
      display: grid;
      gap: 20px;
    }

    nav {
      display: flex;
      gap: 6px;
    }

    nav a {
      padding: 8px 14px;
      border-radius: 999px;
      color: var(--accent);
      text-decoration: none;
      font-weight: 600;
    }

    nav a.active {
      background: var(--accent);
      color: white;
    }

    section {
      display: none;
      background: var(--card);
      border-radius: 18px;
      box-shadow: var(--shadow);
      padding: 24px;
    }

    form {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
      margin-bottom: 16px;
    }

    input, select, button {
      font: inherit;
      padding: 6px 10px;
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    th, td {
      text-align: left;
      padding: 6px 8px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.12);
    }

    .btn-delete {
      color: var(--danger);
    }

    .totals {
      display: flex;
      gap: 24px;
      font-weight: 600;
    }

    dialog form {
      flex-direction: column;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Inventory</h1>
      <div class="totals">
        <span>In stock: <span id="total-stock">{{TOTAL_STOCK}}</span></span>
        <span>Sold: <span id="total-sold">{{TOTAL_SOLD}}</span></span>
      </div>
    </header>

    <nav>
      <a href="#" data-section="products">Products</a>
      <a href="#" data-section="sales">Sales</a>
      <a href="#" data-section="search">Search</a>
    </nav>

    <section id="section-products">
      <h2>Products</h2>
      <form id="product-form">
        <input id="name" placeholder="Name" required />
        <input id="description" placeholder="Description" />
        <input id="quantity" type="number" min="0" step="1" placeholder="Quantity" required />
        <input id="price" type="number" min="0" step="0.01" placeholder="Price" required />
        <button type="submit">Add</button>
      </form>
      <table>
        <thead><tr><th>Name</th><th>Description</th><th>Quantity</th><th>Price</th><th></th></tr></thead>
        <tbody id="product-rows">{{PRODUCT_ROWS}}</tbody>
      </table>
    </section>

    <section id="section-sales">
      <h2>Sales</h2>
      <form id="sale-form">
        <select id="sale-product" required>{{PRODUCT_OPTIONS}}</select>
        <input id="sale-quantity" type="number" min="1" step="1" placeholder="Quantity" required />
        <button type="submit">Record sale</button>
      </form>
      <table>
        <thead><tr><th>Date</th><th>Product</th><th>Quantity</th><th>Unit price</th><th>Total</th></tr></thead>
        <tbody id="sale-rows">{{SALE_ROWS}}</tbody>
      </table>
    </section>

    <section id="section-search">
      <h2>Search</h2>
      <form id="search-form">
        <input id="search-term" placeholder="Product name" />
        <button type="button" id="search-button">Search</button>
      </form>
      <table>
        <thead><tr><th>Name</th><th>Description</th><th>Quantity</th><th>Price</th></tr></thead>
        <tbody id="search-rows"></tbody>
      </table>
    </section>
  </main>

  <dialog id="edit-dialog">
    <form method="dialog">
      <input id="edit-name" placeholder="Name" required />
      <input id="edit-description" placeholder="Description" />
      <input id="edit-quantity" type="number" min="0" step="1" required />
      <input id="edit-price" type="number" min="0" step="0.01" required />
      <div>
        <button type="button" id="edit-save">Save</button>
        <button type="button" id="edit-cancel">Cancel</button>
      </div>
    </form>
  </dialog>

  <script type="application/json" id="product-data">{{PRODUCTS_JSON}}</script>
  <script>
    const SECTIONS = ['products', 'sales', 'search'];
    const DEFAULT_SECTION = 'products';
    const STORAGE_KEY = 'activeSection';
    const $ = (id) => document.getElementById(id);

    let products = JSON.parse($('product-data').textContent);
    let editing = null;

    const escape = (text) => String(text)
      .replace(/&/g, '&amp;').replace(/</g, '&lt;').replace(/>/g, '&gt;')
      .replace(/"/g, '&quot;').replace(/'/g, '&#39;');
    const price = (value) => `R$ ${Number(value).toFixed(2)}`;
    const cells = (p) =>
      `<td>${escape(p.nome)}</td><td>${escape(p.descricao)}</td><td>${p.quantidade}</td><td>${price(p.preco)}</td>`;

    const request = async (method, url, body) => {
      const options = { method, headers: {} };
      if (body !== undefined) {
        options.headers['content-type'] = 'application/json';
        options.body = JSON.stringify(body);
      }
      const res = await fetch(url, options);
      let envelope;
      try {
        envelope = await res.json();
      } catch (err) {
        throw new Error(`Unexpected response (${res.status})`);
      }
      if (typeof envelope.success !== 'boolean') {
        throw new Error(`Unexpected response (${res.status})`);
      }
      return envelope;
    };

    const reason = (envelope) => envelope.error || envelope.message || 'unknown error';
    const fail = (message) => (err) => {
      console.error(message, err);
      alert(message);
    };

    const showSection = (section, event) => {
      if (!SECTIONS.includes(section)) {
        return;
      }
      document.querySelectorAll('section').forEach((s) => {
        s.style.display = s.id === `section-${section}` ? 'block' : 'none';
      });
      document.querySelectorAll('nav a').forEach((link) => link.classList.remove('active'));
      event.target.classList.add('active');
      localStorage.setItem(STORAGE_KEY, section);
    };

    const linkFor = (section) => document.querySelector(`nav a[data-section="${section}"]`);

    const refreshProducts = async () => {
      const envelope = await request('GET', '/api/produtos');
      if (!envelope.success) {
        alert(`Error: ${reason(envelope)}`);
        return;
      }
      products = envelope.produtos || [];
      $('product-rows').innerHTML = products.length === 0
        ? '<tr><td colspan="5" class="empty">No products registered</td></tr>'
        : products.map((p) => `<tr data-id="${p.id}">${cells(p)}<td><button type="button" class="btn-edit">Edit</button> <button type="button" class="btn-delete">Delete</button></td></tr>`).join('');
      $('sale-product').innerHTML = products
        .map((p) => `<option value="${p.id}">${escape(p.nome)} (${p.quantidade} in stock)</option>`)
        .join('');
      if (envelope.resumo) {
        $('total-stock').textContent = envelope.resumo.total_estoque;
        $('total-sold').textContent = envelope.resumo.total_vendido;
      }
    };

    const refreshSales = async () => {
      const envelope = await request('GET', '/api/vendas');
      if (!envelope.success) {
        alert(`Error: ${reason(envelope)}`);
        return;
      }
      const sales = envelope.vendas || [];
      $('sale-rows').innerHTML = sales.length === 0
        ? '<tr><td colspan="5" class="empty">No sales yet</td></tr>'
        : sales.map((s) => `<tr><td>${escape(s.data)}</td><td>${escape(s.produto_nome)}</td><td>${s.quantidade}</td><td>${price(s.preco_unitario)}</td><td>${price(s.total)}</td></tr>`).join('');
    };

    document.querySelectorAll('nav a').forEach((link) => {
      link.addEventListener('click', (event) => {
        event.preventDefault();
        showSection(link.dataset.section, event);
      });
    });

    $('product-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const product = {
        nome: $('name').value,
        descricao: $('description').value,
        quantidade: $('quantity').value,
        preco: $('price').value
      };

      const send = async (force) => {
        const body = force ? { ...product, forcar: true } : product;
        const envelope = await request('POST', '/api/produtos', body);
        if (envelope.success) {
          alert('Product added');
          event.target.reset();
          await refreshProducts();
        } else if (envelope.duplicate && !force) {
          if (confirm('A product with this name already exists. Add it anyway?')) {
            await send(true);
          }
        } else {
          alert(`Error: ${reason(envelope)}`);
        }
      };

      send(false).catch(fail('Could not add the product'));
    });

    document.addEventListener('click', (event) => {
      const row = event.target.closest('tr[data-id]');
      if (!row) {
        return;
      }
      const id = Number(row.dataset.id);

      if (event.target.closest('.btn-edit')) {
        const original = products.find((p) => p.id === id);
        if (!original) {
          alert('Product not found');
          return;
        }
        editing = { ...original };
        $('edit-name').value = editing.nome;
        $('edit-description').value = editing.descricao;
        $('edit-quantity').value = editing.quantidade;
        $('edit-price').value = editing.preco;
        $('edit-dialog').showModal();
      } else if (event.target.closest('.btn-delete')) {
        if (!confirm('Delete this product?')) {
          return;
        }
        request('DELETE', `/api/produtos/${id}`)
          .then(async (envelope) => {
            if (envelope.success) {
              alert('Product deleted');
              await refreshProducts();
            } else {
              alert(`Error: ${reason(envelope)}`);
            }
          })
          .catch(fail('Could not delete the product'));
      }
    });

    $('edit-cancel').addEventListener('click', () => {
      editing = null;
      $('edit-dialog').close();
    });

    $('edit-save').addEventListener('click', () => {
      if (!editing || !$('edit-dialog').querySelector('form').reportValidity()) {
        return;
      }
      const body = {
        nome: $('edit-name').value,
        descricao: $('edit-description').value,
        quantidade: $('edit-quantity').value,
        preco: $('edit-price').value
      };
      request('PUT', `/api/produtos/${editing.id}`, body)
        .then(async (envelope) => {
          if (envelope.success) {
            editing = null;
            $('edit-dialog').close();
            alert('Product updated');
            await refreshProducts();
          } else {
            alert(`Error: ${reason(envelope)}`);
          }
        })
        .catch(fail('Could not update the product'));
    });

    $('sale-form').addEventListener('submit', (event) => {
      event.preventDefault();
      const sale = {
        produto_id: $('sale-product').value,
        quantidade: $('sale-quantity').value
      };
      request('POST', '/api/vendas', sale)
        .then(async (envelope) => {
          if (envelope.success) {
            alert(envelope.message || 'Sale recorded');
            showSection('sales', { target: linkFor('sales') });
            await Promise.all([refreshProducts(), refreshSales()]);
          } else {
            alert(`Error: ${reason(envelope)}`);
          }
        })
        .catch(fail('Could not record the sale'));
    });

    const search = () => {
      const term = $('search-term').value;
      request('GET', `/api/buscar?termo=${encodeURIComponent(term)}`)
        .then((envelope) => {
          if (!envelope.success) {
            alert(`Error: ${reason(envelope)}`);
            return;
          }
          const results = envelope.produtos || [];
          $('search-rows').innerHTML = results.length === 0
            ? '<tr><td colspan="4" class="text-center">{{NO_RESULTS}}</td></tr>'
            : results.map((p) => `<tr>${cells(p)}</tr>`).join('');
        })
        .catch(fail('Could not search products'));
    };

    $('search-button').addEventListener('click', search);
    $('search-term').addEventListener('keydown', (event) => {
      if (event.key === 'Enter') {
        event.preventDefault();
        search();
      }
    });

    const stored = localStorage.getItem(STORAGE_KEY);
    const initial = SECTIONS.includes(stored) ? stored : DEFAULT_SECTION;
    showSection(initial, { target: linkFor(initial) });
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: u64, name: &str) -> Product {
        Product {
            id,
            name: name.into(),
            description: "Blue".into(),
            quantity: 4,
            price: 1.25,
        }
    }

    fn tbody<'a>(html: &'a str, id: &str) -> &'a str {
        let open = format!(r#"<tbody id="{id}">"#);
        let start = html.find(&open).expect("tbody present") + open.len();
        let end = start + html[start..].find("</tbody>").expect("tbody closed");
        &html[start..end]
    }

    #[test]
    fn index_fills_every_placeholder() {
        let summary = Summary {
            total_stock: 4,
            total_sold: 9,
        };
        let html = render_index(&[product(3, "Pen</script>")], &[], summary);

        assert!(!html.contains("{{"));
        assert!(html.contains(r#"<tr data-id="3">"#));
        assert!(html.contains(r#"<span id="total-sold">9</span>"#));
        assert!(html.contains("Pen\\u003c/script\\u003e"));
        assert!(html.contains("No sales yet"));
    }

    #[test]
    fn placeholder_text_in_product_names_stays_literal() {
        let products = [
            product(1, "{{PRODUCTS_JSON}}"),
            product(2, "<img src=x onerror=alert(1)>"),
        ];
        let html = render_index(&products, &[], Summary::default());

        let rows = tbody(&html, "product-rows");
        assert!(rows.contains("<td>{{PRODUCTS_JSON}}</td>"));
        assert!(rows.contains("<td>&lt;img src=x onerror=alert(1)&gt;</td>"));
        assert!(!html.contains("<img"));
        assert_eq!(rows.matches("<tr data-id=").count(), 2);
    }

    #[test]
    fn embedded_product_data_still_parses() {
        let products = [product(1, "<b>&</b>")];
        let html = render_index(&products, &[], Summary::default());

        let marker = r#"<script type="application/json" id="product-data">"#;
        let start = html.find(marker).unwrap() + marker.len();
        let end = start + html[start..].find("</script>").unwrap();
        let parsed: Vec<Product> = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(parsed, products);
    }

    #[test]
    fn unknown_placeholders_are_left_alone() {
        let filled = fill("a {{X}} {{Y}} {{", |key| (key == "X").then(|| "{{Y}}".to_string()));
        assert_eq!(filled, "a {{Y}} {{Y}} {{");
    }
}
