use crate::browser::{expect, expect_page, LoadState, Locator, Page, UrlPattern};
use crate::error::Result;

#[derive(Clone)]
pub struct CartPage {
    page: Page,
    pub checkout_button: Locator,
    pub continue_shopping_button: Locator,
    pub cart_items: Locator,
    pub remove_buttons: Locator,
}

impl CartPage {
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            checkout_button: page.locator("[data-test=\"checkout\"]"),
            continue_shopping_button: page.locator("[data-test=\"continue-shopping\"]"),
            cart_items: page.locator(".cart_item"),
            remove_buttons: page.locator("button[data-test^=\"remove-\"]"),
        }
    }

    pub async fn verify_on_cart_page(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("cart.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await
    }

    pub async fn cart_item_count(&self) -> Result<usize> {
        self.cart_items.count().await
    }

    pub async fn cart_item_names(&self) -> Result<Vec<String>> {
        self.cart_items
            .locator(".inventory_item_name")
            .all_text_contents()
            .await
    }

    pub async fn remove_item_by_name(&self, product_name: &str) -> Result<()> {
        self.cart_items
            .filter_has_text(product_name)
            .locator("button")
            .click()
            .await
    }

    pub async fn continue_shopping(&self) -> Result<()> {
        self.continue_shopping_button.click().await
    }

    pub async fn proceed_to_checkout(&self) -> Result<()> {
        self.checkout_button.click().await
    }

    pub async fn verify_product_in_cart(&self, product_name: &str) -> Result<()> {
        expect(&self.cart_items.filter_has_text(product_name))
            .to_be_visible()
            .await
    }

    pub async fn verify_cart_is_empty(&self) -> Result<()> {
        expect(&self.cart_items).to_have_count(0).await
    }
}
