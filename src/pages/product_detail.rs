use crate::browser::{expect, expect_page, LoadState, Locator, Page, UrlPattern};
use crate::error::Result;
use crate::pages::parse_amount;

/// Single product view at `/inventory-item.html?id=N`.
#[derive(Clone)]
pub struct ProductDetailPage {
    page: Page,
    pub product_name: Locator,
    pub product_description: Locator,
    pub product_price: Locator,
    pub product_image: Locator,
    pub add_to_cart_button: Locator,
    pub remove_button: Locator,
    pub back_to_products_link: Locator,
}

impl ProductDetailPage {
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            product_name: page.locator(".inventory_details_name"),
            product_description: page.locator(".inventory_details_desc"),
            product_price: page.locator(".inventory_details_price"),
            product_image: page.locator(".inventory_details_img"),
            add_to_cart_button: page.locator("[data-test^=\"add-to-cart\"]"),
            remove_button: page.locator("[data-test^=\"remove\"]"),
            back_to_products_link: page.locator("[data-test=\"back-to-products\"]"),
        }
    }

    pub async fn verify_on_product_detail_page(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("inventory-item.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await?;
        expect(&self.product_name).to_be_visible().await?;
        expect(&self.product_image).to_be_visible().await
    }

    pub async fn product_name(&self) -> Result<String> {
        self.product_name.text_content().await
    }

    pub async fn product_price(&self) -> Result<f64> {
        let text = self.product_price.text_content().await?;
        parse_amount(&text, "$")
    }

    pub async fn add_to_cart(&self) -> Result<()> {
        self.add_to_cart_button.click().await
    }

    pub async fn remove_from_cart(&self) -> Result<()> {
        self.remove_button.click().await
    }

    pub async fn go_back_to_products(&self) -> Result<()> {
        self.back_to_products_link.click().await
    }

    pub async fn verify_product_details(&self, name: &str, price: f64) -> Result<()> {
        expect(&self.product_name).to_have_text(name).await?;
        expect(&self.product_price)
            .to_contain_text(&format!("${}", price))
            .await
    }

    pub async fn verify_add_to_cart_button_visible(&self) -> Result<()> {
        expect(&self.add_to_cart_button).to_be_visible().await
    }

    pub async fn verify_back_link_visible(&self) -> Result<()> {
        expect(&self.back_to_products_link).to_be_visible().await
    }
}
