use crate::browser::{expect, expect_page, LoadState, Locator, Page, UrlPattern};
use crate::error::Result;
use crate::pages::parse_amount;

/// The three checkout screens: customer information, overview, and completion.
#[derive(Clone)]
pub struct CheckoutPage {
    page: Page,
    // Step one
    pub first_name_input: Locator,
    pub last_name_input: Locator,
    pub postal_code_input: Locator,
    pub continue_button: Locator,
    pub cancel_button: Locator,
    pub error_message: Locator,
    // Step two
    pub item_total_label: Locator,
    pub tax_label: Locator,
    pub grand_total_label: Locator,
    pub finish_button: Locator,
    pub summary_items: Locator,
    // Complete
    pub complete_header: Locator,
    pub back_home_button: Locator,
}

impl CheckoutPage {
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            first_name_input: page.locator("[data-test=\"firstName\"]"),
            last_name_input: page.locator("[data-test=\"lastName\"]"),
            postal_code_input: page.locator("[data-test=\"postalCode\"]"),
            continue_button: page.locator("[data-test=\"continue\"]"),
            cancel_button: page.locator("[data-test=\"cancel\"]"),
            error_message: page.locator("[data-test=\"error\"]"),
            item_total_label: page.locator(".summary_subtotal_label"),
            tax_label: page.locator(".summary_tax_label"),
            grand_total_label: page.locator(".summary_total_label"),
            finish_button: page.locator("[data-test=\"finish\"]"),
            summary_items: page.locator(".cart_item"),
            complete_header: page.locator(".complete-header"),
            back_home_button: page.locator("[data-test=\"back-to-products\"]"),
        }
    }

    pub async fn fill_customer_info(
        &self,
        first_name: &str,
        last_name: &str,
        postal_code: &str,
    ) -> Result<()> {
        self.first_name_input.fill(first_name).await?;
        self.last_name_input.fill(last_name).await?;
        self.postal_code_input.fill(postal_code).await
    }

    pub async fn click_continue(&self) -> Result<()> {
        self.continue_button.click().await
    }

    pub async fn click_finish(&self) -> Result<()> {
        self.finish_button.click().await
    }

    pub async fn click_cancel(&self) -> Result<()> {
        self.cancel_button.click().await
    }

    pub async fn verify_on_step_one(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("checkout-step-one.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await
    }

    pub async fn verify_on_step_two(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("checkout-step-two.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await
    }

    pub async fn verify_on_complete(&self) -> Result<()> {
        expect_page(&self.page)
            .to_have_url(UrlPattern::contains("checkout-complete.html"))
            .await?;
        self.page.wait_for_load_state(LoadState::Load, None).await?;
        expect(&self.complete_header)
            .to_have_text("Thank you for your order!")
            .await
    }

    pub async fn verify_error_message(&self, expected_error: &str) -> Result<()> {
        expect(&self.error_message)
            .to_contain_text(expected_error)
            .await
    }

    pub async fn item_total(&self) -> Result<f64> {
        let text = self.item_total_label.text_content().await?;
        parse_amount(&text, "Item total: $")
    }

    pub async fn tax(&self) -> Result<f64> {
        let text = self.tax_label.text_content().await?;
        parse_amount(&text, "Tax: $")
    }

    pub async fn grand_total(&self) -> Result<f64> {
        let text = self.grand_total_label.text_content().await?;
        parse_amount(&text, "Total: $")
    }

    pub async fn summary_item_count(&self) -> Result<usize> {
        self.summary_items.count().await
    }
}
