//! Page objects: one wrapper per storefront screen exposing its locators and
//! the user actions tests drive through it.

pub mod cart;
pub mod checkout;
pub mod inventory;
pub mod login;
pub mod product_detail;

pub use cart::CartPage;
pub use checkout::CheckoutPage;
pub use inventory::InventoryPage;
pub use login::LoginPage;
pub use product_detail::ProductDetailPage;

use crate::error::{Result, SuiteError};

/// Parse a rendered amount such as `Tax: $2.40` after stripping `prefix`.
/// Reads the leading number; text without one is an error.
pub fn parse_amount(text: &str, prefix: &str) -> Result<f64> {
    let text = text.trim();
    let rest = text.strip_prefix(prefix).unwrap_or(text).trim_start();
    let end = rest
        .char_indices()
        .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end]
        .parse()
        .map_err(|_| SuiteError::AmountParse(text.to_string()))
}
