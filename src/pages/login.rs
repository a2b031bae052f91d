use crate::browser::{expect, expect_page, LoadState, Locator, Page};
use crate::error::Result;
use crate::fixtures::users;

/// The sign-in form at `/`.
#[derive(Clone)]
pub struct LoginPage {
    page: Page,
    pub username_input: Locator,
    pub password_input: Locator,
    pub login_button: Locator,
    pub error_message: Locator,
}

impl LoginPage {
    pub fn new(page: &Page) -> Self {
        Self {
            page: page.clone(),
            username_input: page.locator("[data-test=\"username\"]"),
            password_input: page.locator("[data-test=\"password\"]"),
            login_button: page.locator("[data-test=\"login-button\"]"),
            error_message: page.locator("[data-test=\"error\"]"),
        }
    }

    pub async fn navigate(&self) -> Result<()> {
        self.page.goto("/").await
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        tracing::debug!("Logging in as {}", username);
        self.username_input.fill(username).await?;
        self.password_input.fill(password).await?;
        self.login_button.click().await
    }

    pub async fn login_as_standard_user(&self) -> Result<()> {
        self.login(users::STANDARD.username, users::STANDARD.password)
            .await
    }

    pub async fn verify_on_login_page(&self) -> Result<()> {
        expect_page(&self.page).to_have_url("/").await?;
        self.page.wait_for_load_state(LoadState::Load, None).await?;
        expect(&self.username_input).to_be_visible().await?;
        expect(&self.password_input).to_be_visible().await
    }

    pub async fn verify_fields_are_empty(&self) -> Result<()> {
        expect(&self.username_input).to_have_value("").await?;
        expect(&self.password_input).to_have_value("").await
    }

    /// Text of the error banner, waiting for it to appear.
    pub async fn error_text(&self) -> Result<String> {
        expect(&self.error_message).to_be_visible().await?;
        Ok(self.error_message.text_content().await?.trim().to_string())
    }
}
