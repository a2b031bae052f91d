#![allow(dead_code)]

use storefront_e2e::browser::Page;
use storefront_e2e::pages::{InventoryPage, LoginPage};
use storefront_e2e::{Harness, Result};

/// Harness for browser scenarios, or `None` (with a note) when Chrome is
/// not installed.
pub fn harness() -> Option<Harness> {
    let harness = Harness::from_env();
    if harness.is_none() {
        eprintln!("SKIP: no Chrome or Chromium found (set CHROME_PATH)");
    }
    harness
}

/// Sign in as `standard_user` and wait for the product listing.
pub async fn login_as_standard_user(page: &Page) -> Result<InventoryPage> {
    let login = LoginPage::new(page);
    login.navigate().await?;
    login.login_as_standard_user().await?;
    let inventory = InventoryPage::new(page);
    inventory.verify_on_inventory_page().await?;
    Ok(inventory)
}
