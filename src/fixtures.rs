//! Test data for the Sauce Demo storefront: credentials, catalog, customer
//! records, expected messages, and URL paths.
//!
//! The replica storefront renders from these same values, so a hermetic run
//! cannot drift from its own assertions.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: &'static str,
    pub password: &'static str,
}

pub mod users {
    use super::Credentials;

    pub const PASSWORD: &str = "secret_sauce";

    pub const STANDARD: Credentials = Credentials {
        username: "standard_user",
        password: PASSWORD,
    };
    pub const LOCKED_OUT: Credentials = Credentials {
        username: "locked_out_user",
        password: PASSWORD,
    };
    pub const PROBLEM: Credentials = Credentials {
        username: "problem_user",
        password: PASSWORD,
    };
    pub const PERFORMANCE_GLITCH: Credentials = Credentials {
        username: "performance_glitch_user",
        password: PASSWORD,
    };
    pub const ERROR: Credentials = Credentials {
        username: "error_user",
        password: PASSWORD,
    };
    pub const VISUAL: Credentials = Credentials {
        username: "visual_user",
        password: PASSWORD,
    };

    pub const ALL: [Credentials; 6] = [
        STANDARD,
        LOCKED_OUT,
        PROBLEM,
        PERFORMANCE_GLITCH,
        ERROR,
        VISUAL,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Product {
    pub id: u32,
    pub name: &'static str,
    pub price: f64,
    pub description: &'static str,
}

impl Product {
    /// Identifier used in `data-test` attributes, e.g. `sauce-labs-backpack`.
    pub fn slug(&self) -> String {
        self.name.to_lowercase().replace(' ', "-")
    }

    /// Price as rendered by the storefront, e.g. `$29.99`.
    pub fn display_price(&self) -> String {
        format!("${:.2}", self.price)
    }
}

pub mod products {
    use super::Product;

    pub const BACKPACK: Product = Product {
        id: 4,
        name: "Sauce Labs Backpack",
        price: 29.99,
        description: "carry.allTheThings() with the sleek, streamlined Sly Pack that melds uncompromising style with unequaled laptop and tablet protection.",
    };
    pub const BIKE_LIGHT: Product = Product {
        id: 0,
        name: "Sauce Labs Bike Light",
        price: 9.99,
        description: "A red light isn't the desired state in testing but it sure helps when riding your bike at night. Water-resistant with 3 lighting modes, 1 AAA battery included.",
    };
    pub const BOLT_TSHIRT: Product = Product {
        id: 1,
        name: "Sauce Labs Bolt T-Shirt",
        price: 15.99,
        description: "Get your testing superhero on with the Sauce Labs bolt T-shirt. From American Apparel, 100% ringspun combed cotton, heather gray with red bolt.",
    };
    pub const FLEECE_JACKET: Product = Product {
        id: 5,
        name: "Sauce Labs Fleece Jacket",
        price: 49.99,
        description: "It's not every day that you come across a midweight quarter-zip fleece jacket capable of handling everything from a relaxing day outdoors to a busy day at the office.",
    };
    pub const ONESIE: Product = Product {
        id: 2,
        name: "Sauce Labs Onesie",
        price: 7.99,
        description: "Rib snap infant onesie for the junior automation engineer in development. Reinforced 3-snap bottom closure, two-needle hemmed sleeved and bottom won't unravel.",
    };
    pub const RED_TSHIRT: Product = Product {
        id: 3,
        name: "Test.allTheThings() T-Shirt (Red)",
        price: 15.99,
        description: "This classic Sauce Labs t-shirt is perfect to wear when cozying up to your keyboard to automate a few tests. Super-soft and comfy ringspun combed cotton.",
    };

    /// Catalog in the storefront's default listing order (name ascending).
    pub const CATALOG: [Product; 6] = [
        BACKPACK,
        BIKE_LIGHT,
        BOLT_TSHIRT,
        FLEECE_JACKET,
        ONESIE,
        RED_TSHIRT,
    ];

    pub fn by_id(id: u32) -> Option<&'static Product> {
        let catalog: &'static [Product] = &CATALOG;
        catalog.iter().find(|p| p.id == id)
    }

    pub fn by_name(name: &str) -> Option<&'static Product> {
        let catalog: &'static [Product] = &CATALOG;
        catalog.iter().find(|p| p.name == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Customer {
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub postal_code: &'static str,
}

pub mod customers {
    use super::Customer;

    pub const VALID: Customer = Customer {
        first_name: "John",
        last_name: "Doe",
        postal_code: "12345",
    };
    pub const MISSING_FIRST_NAME: Customer = Customer {
        first_name: "",
        last_name: "Doe",
        postal_code: "12345",
    };
    pub const MISSING_LAST_NAME: Customer = Customer {
        first_name: "John",
        last_name: "",
        postal_code: "12345",
    };
    pub const MISSING_POSTAL: Customer = Customer {
        first_name: "John",
        last_name: "Doe",
        postal_code: "",
    };
}

pub mod errors {
    pub const FIRST_NAME_REQUIRED: &str = "Error: First Name is required";
    pub const LAST_NAME_REQUIRED: &str = "Error: Last Name is required";
    pub const POSTAL_CODE_REQUIRED: &str = "Error: Postal Code is required";
    pub const INVALID_LOGIN: &str =
        "Epic sadface: Username and password do not match any user in this service";
    pub const LOCKED_OUT: &str = "Epic sadface: Sorry, this user has been locked out.";
    pub const USERNAME_REQUIRED: &str = "Epic sadface: Username is required";
    pub const PASSWORD_REQUIRED: &str = "Epic sadface: Password is required";

    /// Shown on the login page after a logged-out visit to a protected path.
    pub fn login_required(path: &str) -> String {
        format!(
            "Epic sadface: You can only access '{}' when you are logged in.",
            path
        )
    }
}

pub mod paths {
    pub const BASE: &str = "https://www.saucedemo.com";
    pub const INVENTORY: &str = "/inventory.html";
    pub const CART: &str = "/cart.html";
    pub const CHECKOUT_STEP_ONE: &str = "/checkout-step-one.html";
    pub const CHECKOUT_STEP_TWO: &str = "/checkout-step-two.html";
    pub const CHECKOUT_COMPLETE: &str = "/checkout-complete.html";
    pub const ITEM_DETAIL: &str = "/inventory-item.html";
}

/// Listing order codes understood by the sort dropdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOption {
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::NameAsc,
        SortOption::NameDesc,
        SortOption::PriceAsc,
        SortOption::PriceDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "az",
            SortOption::NameDesc => "za",
            SortOption::PriceAsc => "lohi",
            SortOption::PriceDesc => "hilo",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOption::NameAsc => "Name (A to Z)",
            SortOption::NameDesc => "Name (Z to A)",
            SortOption::PriceAsc => "Price (low to high)",
            SortOption::PriceDesc => "Price (high to low)",
        }
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortOption::ALL
            .into_iter()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| format!("Unknown sort option: {}", s))
    }
}

pub const TAX_RATE: f64 = 0.08;

/// Expected checkout overview amounts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutTotals {
    pub item_total: f64,
    pub tax: f64,
    pub total: f64,
}

impl CheckoutTotals {
    /// Sum `prices`, apply [`TAX_RATE`] rounded to cents, and add both.
    pub fn for_prices(prices: &[f64]) -> Self {
        let item_total = round_cents(prices.iter().sum());
        let tax = round_cents(item_total * TAX_RATE);
        Self {
            item_total,
            tax,
            total: round_cents(item_total + tax),
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_matches_storefront_ids() {
        assert_eq!(products::BACKPACK.slug(), "sauce-labs-backpack");
        assert_eq!(
            products::RED_TSHIRT.slug(),
            "test.allthethings()-t-shirt-(red)"
        );
    }

    #[test]
    fn test_catalog_lookup() {
        assert_eq!(products::by_id(5).unwrap().name, "Sauce Labs Fleece Jacket");
        assert_eq!(products::by_name("Sauce Labs Onesie").unwrap().price, 7.99);
        assert!(products::by_id(42).is_none());
    }

    #[test]
    fn test_catalog_price_extremes() {
        let min = products::CATALOG.iter().map(|p| p.price).fold(f64::MAX, f64::min);
        let max = products::CATALOG.iter().map(|p| p.price).fold(f64::MIN, f64::max);
        assert_eq!(min, 7.99);
        assert_eq!(max, 49.99);
    }

    #[test]
    fn test_paths_are_site_relative() {
        for path in [
            paths::INVENTORY,
            paths::CART,
            paths::CHECKOUT_STEP_ONE,
            paths::CHECKOUT_STEP_TWO,
            paths::CHECKOUT_COMPLETE,
            paths::ITEM_DETAIL,
        ] {
            assert!(path.starts_with('/') && path.ends_with(".html"), "{}", path);
        }
        assert!(paths::BASE.starts_with("https://"));
    }

    #[test]
    fn test_sort_option_codes() {
        assert_eq!(SortOption::PriceAsc.as_str(), "lohi");
        assert_eq!("za".parse::<SortOption>().unwrap(), SortOption::NameDesc);
        assert!("zz".parse::<SortOption>().is_err());
    }

    #[test]
    fn test_checkout_totals_for_backpack_and_bike_light() {
        let totals =
            CheckoutTotals::for_prices(&[products::BACKPACK.price, products::BIKE_LIGHT.price]);
        assert!((totals.item_total - 39.98).abs() < 1e-9);
        assert!((totals.tax - 3.20).abs() < 1e-9);
        assert!((totals.total - 43.18).abs() < 1e-9);
    }

    #[test]
    fn test_display_price() {
        assert_eq!(products::ONESIE.display_price(), "$7.99");
        assert_eq!(products::FLEECE_JACKET.display_price(), "$49.99");
    }
}
