use crate::browser::{expect, expect_page, LoadState, Locator, Page, UrlPattern};
use crate::error::Result;
use crate::fixtures::SortOption;
use crate::pages::parse_amount;

/// Product listing at `/inventory.html`, including the header cart and the
/// burger menu.
#[derive(Clone)]
pub struct InventoryPage {
    page: Page,
    pub hamburger_menu: Locator,
    pub logout_link: Locator,
    pub about_link: Locator,
    pub sort_dropdown: Locator,
    pub cart_badge: Locator,
    pub cart_icon: Locator,
    pub inventory_items: Locator,
    pub item_names: Locator,
    pub item_prices: Locator,
}

impl InventoryPage {
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            hamburger_menu: page.locator("#react-burger-menu-btn"),
            logout_link: page.locator("#logout_sidebar_link"),
            about_link: page.locator("#about_sidebar_link"),
            sort_dropdown: page.locator("[data-test=\"product-sort-container\"]"),
            cart_badge: page.locator(".shopping_cart_badge"),
            cart_icon: page.locator(".shopping_cart_link"),
            inventory_items: page.locator(".inventory_item"),
            item_names: page.locator(".inventory_item_name"),
            item_prices: page.locator(".inventory_item_price"),
        }
    }

    fn item(&self, product_name: &str) -> Locator {
        self.inventory_items.filter_has_text(product_name)
    }

    pub async fn verify_on_inventory_page(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("inventory.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await?;
        expect(&self.inventory_items.first()).to_be_visible().await
    }

    pub async fn logout(&self) -> Result<()> {
        self.hamburger_menu.click().await?;
        self.logout_link.click().await
    }

    pub async fn click_about(&self) -> Result<()> {
        self.hamburger_menu.click().await?;
        self.about_link.click().await
    }

    pub async fn sort_by(&self, option: SortOption) -> Result<()> {
        tracing::debug!("Sorting products by {}", option.label());
        self.sort_dropdown.select_option(option.as_str()).await?;
        Ok(())
    }

    pub async fn add_to_cart_by_name(&self, product_name: &str) -> Result<()> {
        self.item(product_name).locator("button").click().await
    }

    pub async fn remove_from_cart_by_name(&self, product_name: &str) -> Result<()> {
        let button = self.item(product_name).locator("button");
        expect(&button).to_have_text("Remove").await?;
        button.click().await
    }

    pub async fn click_product_by_name(&self, product_name: &str) -> Result<()> {
        self.item_names.filter_has_text(product_name).click().await
    }

    /// Number on the cart badge; 0 when the badge is not shown.
    pub async fn cart_badge_count(&self) -> Result<u32> {
        if !self.cart_badge.is_visible().await? {
            return Ok(0);
        }
        let text = self.cart_badge.text_content().await?;
        Ok(text.trim().parse().unwrap_or(0))
    }

    pub async fn go_to_cart(&self) -> Result<()> {
        self.cart_icon.click().await
    }

    pub async fn product_names(&self) -> Result<Vec<String>> {
        self.item_names.all_text_contents().await
    }

    pub async fn product_prices(&self) -> Result<Vec<f64>> {
        let texts = self.item_prices.all_text_contents().await?;
        texts.iter().map(|t| parse_amount(t, "$")).collect()
    }

    pub async fn verify_product_has_remove_button(&self, product_name: &str) -> Result<()> {
        expect(&self.item(product_name).locator("button"))
            .to_have_text("Remove")
            .await
    }
}
