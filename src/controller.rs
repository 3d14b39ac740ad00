//! Headless view controller for the inventory page.
//!
//! Each public method corresponds to one user gesture. A handler builds a
//! payload from the form, issues its request(s) through [`InventoryApi`],
//! and then either re-renders the affected table in [`PageState`] or
//! reports the problem through [`Prompt::alert`]. Nothing is retried.

use crate::client::{ClientError, InventoryApi};
use crate::host::{Prompt, SectionStore};
use crate::models::{ApiResponse, Product, ProductFields, ProductId, SaleFields, Summary};
use crate::render;
use tracing::{error, info, warn};

pub const SECTIONS: [&str; 3] = ["products", "sales", "search"];
pub const DEFAULT_SECTION: &str = "products";
pub const SALES_SECTION: &str = "sales";

const DUPLICATE_QUESTION: &str = "A product with this name already exists. Add it anyway?";
const DELETE_QUESTION: &str = "Delete this product?";

/// The navigation gesture that triggered a section switch. The link to
/// highlight is read from here, never from ambient state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEvent {
    pub target: String,
}

impl NavEvent {
    /// The event a click on the navigation link for `section` produces.
    pub fn link(section: &str) -> Self {
        Self {
            target: section.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTrigger<'a> {
    Button,
    Key(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The request succeeded and the page was updated.
    Applied,
    /// The user declined, or the gesture did not call for a request.
    Cancelled,
    /// The server answered with `success: false`.
    Rejected(String),
    /// Transport failure or unreadable response.
    Failed,
}

/// Product form fields exactly as typed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub quantity: String,
    pub price: String,
}

impl ProductForm {
    fn to_fields(&self) -> ProductFields {
        ProductFields {
            nome: self.name.clone(),
            descricao: self.description.clone(),
            quantidade: self.quantity.as_str().into(),
            preco: self.price.as_str().into(),
            forcar: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleForm {
    pub product_id: String,
    pub quantity: String,
}

/// An open edit surface: the record as fetched and the copy being edited.
#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    pub original: Product,
    pub draft: Product,
}

#[derive(Debug, Default)]
pub struct PageState {
    pub visible_section: Option<String>,
    pub active_link: Option<String>,
    pub products: Vec<Product>,
    pub summary: Summary,
    pub products_body: String,
    pub product_options: String,
    pub sales_body: String,
    pub search_body: String,
    pub editing: Option<EditSession>,
}

impl PageState {
    pub fn is_visible(&self, section: &str) -> bool {
        self.visible_section.as_deref() == Some(section)
    }
}

pub struct ViewController<A, P, S> {
    api: A,
    prompt: P,
    store: S,
    page: PageState,
}

impl<A, P, S> ViewController<A, P, S>
where
    A: InventoryApi,
    P: Prompt,
    S: SectionStore,
{
    pub fn new(api: A, prompt: P, store: S) -> Self {
        Self {
            api,
            prompt,
            store,
            page: PageState::default(),
        }
    }

    pub fn page(&self) -> &PageState {
        &self.page
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Page load: restore the last section, then fetch both tables.
    pub async fn on_load(&mut self) -> Outcome {
        self.restore_section();
        let products = self.refresh_products().await;
        let sales = self.refresh_sales().await;
        if products && sales {
            Outcome::Applied
        } else {
            Outcome::Failed
        }
    }

    pub fn show_section(&mut self, section: &str, event: &NavEvent) -> Outcome {
        if !SECTIONS.contains(&section) {
            warn!(section, "ignoring unknown section");
            return Outcome::Rejected(format!("unknown section: {section}"));
        }
        self.page.visible_section = Some(section.to_string());
        self.page.active_link = Some(event.target.clone());
        self.store.save(section);
        Outcome::Applied
    }

    pub fn restore_section(&mut self) -> Outcome {
        let section = self
            .store
            .load()
            .filter(|stored| SECTIONS.contains(&stored.as_str()))
            .unwrap_or_else(|| DEFAULT_SECTION.to_string());
        self.show_section(&section, &NavEvent::link(&section))
    }

    pub async fn create_product(&mut self, form: &ProductForm) -> Outcome {
        let mut fields = form.to_fields();
        loop {
            let reply = match self.api.create_product(&fields).await {
                Ok(reply) => reply,
                Err(err) => return self.report_failure("Could not add the product", &err),
            };

            if reply.success {
                info!(name = %fields.nome, forced = fields.forcar, "product added");
                self.prompt.alert("Product added");
                self.refresh_products().await;
                return Outcome::Applied;
            }
            if reply.duplicate && !fields.forcar {
                if !self.prompt.confirm(DUPLICATE_QUESTION) {
                    return Outcome::Cancelled;
                }
                fields.forcar = true;
                continue;
            }
            return self.report_rejection(&reply);
        }
    }

    /// Opens the edit surface on a copy of the record behind row `id`.
    pub fn begin_edit(&mut self, id: ProductId) -> Outcome {
        let Some(product) = self.page.products.iter().find(|p| p.id == id) else {
            warn!(id, "edit requested for unknown row");
            self.prompt.alert("Product not found");
            return Outcome::Rejected(format!("product {id} not found"));
        };
        self.page.editing = Some(EditSession {
            original: product.clone(),
            draft: product.clone(),
        });
        Outcome::Applied
    }

    pub fn edit_draft_mut(&mut self) -> Option<&mut Product> {
        self.page.editing.as_mut().map(|session| &mut session.draft)
    }

    pub fn cancel_edit(&mut self) {
        self.page.editing = None;
    }

    pub async fn save_edit(&mut self) -> Outcome {
        let Some(session) = self.page.editing.as_ref() else {
            return Outcome::Cancelled;
        };
        let id = session.original.id;
        let fields = ProductFields::from(&session.draft);

        match self.api.update_product(id, &fields).await {
            Ok(reply) if reply.success => {
                info!(id, "product updated");
                self.page.editing = None;
                self.prompt.alert("Product updated");
                self.refresh_products().await;
                Outcome::Applied
            }
            Ok(reply) => self.report_rejection(&reply),
            Err(err) => self.report_failure("Could not update the product", &err),
        }
    }

    pub async fn delete_product(&mut self, id: ProductId) -> Outcome {
        if !self.prompt.confirm(DELETE_QUESTION) {
            return Outcome::Cancelled;
        }

        match self.api.delete_product(id).await {
            Ok(reply) if reply.success => {
                info!(id, "product deleted");
                if self.page.editing.as_ref().is_some_and(|s| s.original.id == id) {
                    self.page.editing = None;
                }
                self.prompt.alert("Product deleted");
                self.refresh_products().await;
                Outcome::Applied
            }
            Ok(reply) => self.report_rejection(&reply),
            Err(err) => self.report_failure("Could not delete the product", &err),
        }
    }

    pub async fn record_sale(&mut self, form: &SaleForm) -> Outcome {
        let fields = SaleFields {
            produto_id: form.product_id.as_str().into(),
            quantidade: form.quantity.as_str().into(),
        };

        match self.api.record_sale(&fields).await {
            Ok(reply) if reply.success => {
                info!(product = %form.product_id, quantity = %form.quantity, "sale recorded");
                self.prompt
                    .alert(reply.message.as_deref().unwrap_or("Sale recorded"));
                self.show_section(SALES_SECTION, &NavEvent::link(SALES_SECTION));
                self.refresh_products().await;
                self.refresh_sales().await;
                Outcome::Applied
            }
            Ok(reply) => self.report_rejection(&reply),
            Err(err) => self.report_failure("Could not record the sale", &err),
        }
    }

    pub async fn search(&mut self, term: &str, trigger: SearchTrigger<'_>) -> Outcome {
        if let SearchTrigger::Key(key) = trigger {
            if key != "Enter" {
                return Outcome::Cancelled;
            }
        }

        match self.api.search(term).await {
            Ok(reply) if reply.success => {
                let results = reply.produtos.unwrap_or_default();
                self.page.search_body = render::search_rows(&results);
                Outcome::Applied
            }
            Ok(reply) => self.report_rejection(&reply),
            Err(err) => self.report_failure("Could not search products", &err),
        }
    }

    async fn refresh_products(&mut self) -> bool {
        match self.api.list_products().await {
            Ok(reply) if reply.success => {
                self.page.products = reply.produtos.unwrap_or_default();
                self.page.summary = reply.resumo.unwrap_or_default();
                self.page.products_body = render::product_rows(&self.page.products);
                self.page.product_options = render::product_options(&self.page.products);
                true
            }
            Ok(reply) => {
                self.report_rejection(&reply);
                false
            }
            Err(err) => {
                self.report_failure("Could not load the product list", &err);
                false
            }
        }
    }

    async fn refresh_sales(&mut self) -> bool {
        match self.api.list_sales().await {
            Ok(reply) if reply.success => {
                self.page.sales_body = render::sale_rows(&reply.vendas.unwrap_or_default());
                true
            }
            Ok(reply) => {
                self.report_rejection(&reply);
                false
            }
            Err(err) => {
                self.report_failure("Could not load the sales list", &err);
                false
            }
        }
    }

    fn report_rejection(&mut self, reply: &ApiResponse) -> Outcome {
        let reason = reply.reason().to_string();
        warn!(%reason, "request rejected by server");
        self.prompt.alert(&format!("Error: {reason}"));
        Outcome::Rejected(reason)
    }

    fn report_failure(&mut self, message: &str, err: &ClientError) -> Outcome {
        error!("{message}: {err}");
        self.prompt.alert(message);
        Outcome::Failed
    }
}
