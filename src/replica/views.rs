//! Server-rendered markup. Class names and `data-test` attributes mirror the
//! live storefront so the same page objects drive both.

use crate::fixtures::{products, users, Product, SortOption};
use std::fmt::Write as _;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(page: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Swag Labs</title>
<link rel="stylesheet" href="/static/style.css">
</head>
<body data-page="{page}">
{body}
<script src="/static/app.js"></script>
</body>
</html>
"#,
        page = page,
        body = body
    )
}

fn header(title: &str, secondary: &str) -> String {
    format!(
        r##"<div id="page_wrapper" class="page_wrapper">
<div class="primary_header" data-test="primary-header">
  <div id="menu_button_container">
    <button id="react-burger-menu-btn" type="button">Open Menu</button>
    <div class="bm-menu-wrap" aria-hidden="true">
      <nav class="bm-item-list">
        <a id="inventory_sidebar_link" class="bm-item menu-item" data-test="inventory-sidebar-link" href="/inventory.html">All Items</a>
        <a id="about_sidebar_link" class="bm-item menu-item" data-test="about-sidebar-link" href="https://saucelabs.com/">About</a>
        <a id="logout_sidebar_link" class="bm-item menu-item" data-test="logout-sidebar-link" href="#">Logout</a>
        <a id="reset_sidebar_link" class="bm-item menu-item" data-test="reset-sidebar-link" href="#">Reset App State</a>
      </nav>
      <button id="react-burger-cross-btn" type="button">Close Menu</button>
    </div>
  </div>
  <div class="header_label"><div class="app_logo">Swag Labs</div></div>
  <div id="shopping_cart_container" class="shopping_cart_container">
    <a class="shopping_cart_link" data-test="shopping-cart-link" href="/cart.html" aria-label="Cart"></a>
  </div>
</div>
<div class="header_secondary_container" data-test="secondary-header">
  <span class="title" data-test="title">{title}</span>
  {secondary}
</div>"##,
        title = escape_html(title),
        secondary = secondary
    )
}

const FOOTER: &str = r#"<footer class="footer" data-test="footer"><div class="footer_copy" data-test="footer-copy">Swag Labs replica storefront. Test data only.</div></footer>
</div>"#;

pub fn login() -> String {
    let usernames = users::ALL
        .iter()
        .map(|c| escape_html(c.username))
        .collect::<Vec<_>>()
        .join("<br>");
    let body = format!(
        r#"<div class="login_container">
<div class="login_logo">Swag Labs</div>
<div class="login_wrapper">
  <div class="login-box">
    <form id="login_form" novalidate>
      <input class="input_error form_input" placeholder="Username" type="text" data-test="username" id="user-name" name="user-name" autocorrect="off" autocapitalize="none" value="">
      <input class="input_error form_input" placeholder="Password" type="password" data-test="password" id="password" name="password" autocorrect="off" autocapitalize="none" value="">
      <div class="error-message-container"></div>
      <input type="submit" class="submit-button btn_action" data-test="login-button" id="login-button" name="login-button" value="Login">
    </form>
  </div>
  <div class="login_credentials_wrap" data-test="login-credentials-container">
    <div class="login_credentials" data-test="login-credentials"><h4>Accepted usernames are:</h4>{usernames}</div>
    <div class="login_password" data-test="login-password"><h4>Password for all users:</h4>{password}</div>
  </div>
</div>
</div>"#,
        usernames = usernames,
        password = escape_html(users::PASSWORD)
    );
    document("login", &body)
}

fn inventory_item(index: usize, product: &Product) -> String {
    let slug = escape_html(&product.slug());
    let name = escape_html(product.name);
    format!(
        r#"<div class="inventory_item" data-test="inventory-item" data-index="{index}" data-name="{name}" data-price="{price}">
  <div class="inventory_item_img"><a href="/inventory-item.html?id={id}" id="item_{id}_img_link" data-test="item-{id}-img-link"><img alt="{name}" class="inventory_item_img" src="/static/img/{id}" width="160" height="160" data-test="inventory-item-{slug}-img"></a></div>
  <div class="inventory_item_description" data-test="inventory-item-description">
    <div class="inventory_item_label">
      <a href="/inventory-item.html?id={id}" id="item_{id}_title_link" data-test="item-{id}-title-link"><div class="inventory_item_name" data-test="inventory-item-name">{name}</div></a>
      <div class="inventory_item_desc" data-test="inventory-item-desc">{desc}</div>
    </div>
    <div class="pricebar">
      <div class="inventory_item_price" data-test="inventory-item-price">{display_price}</div>
      <button class="btn btn_primary btn_small btn_inventory" data-product-id="{id}" data-test="add-to-cart-{slug}" id="add-to-cart-{slug}" name="add-to-cart-{slug}">Add to cart</button>
    </div>
  </div>
</div>"#,
        index = index,
        id = product.id,
        name = name,
        slug = slug,
        price = product.price,
        desc = escape_html(product.description),
        display_price = product.display_price()
    )
}

pub fn inventory() -> String {
    let mut options = String::new();
    for option in SortOption::ALL {
        let _ = write!(
            options,
            r#"<option value="{}">{}</option>"#,
            option.as_str(),
            escape_html(option.label())
        );
    }
    let sort = format!(
        r#"<div class="right_component"><span class="select_container"><span class="active_option" data-test="active-option">{active}</span><select class="product_sort_container" data-test="product-sort-container">{options}</select></span></div>"#,
        active = escape_html(SortOption::NameAsc.label()),
        options = options
    );

    let items: String = products::CATALOG
        .iter()
        .enumerate()
        .map(|(i, p)| inventory_item(i, p))
        .collect();

    let body = format!(
        r#"{header}
<div id="inventory_container" class="inventory_container" data-test="inventory-container">
<div class="inventory_list" data-test="inventory-list">
{items}
</div>
</div>
{footer}"#,
        header = header("Products", &sort),
        items = items,
        footer = FOOTER
    );
    document("inventory", &body)
}

pub fn product_detail(id: Option<u32>) -> String {
    let back = r#"<button class="btn btn_secondary back btn_large inventory_details_back_button" data-test="back-to-products" id="back-to-products" data-nav="/inventory.html" type="button">Back to products</button>"#;
    let details = match id.and_then(products::by_id) {
        Some(product) => format!(
            r#"<div class="inventory_details_container" data-test="inventory-container">
  <div class="inventory_details_img_container"><img alt="{name}" class="inventory_details_img" src="/static/img/{id}" width="240" height="240" data-test="item-{slug}-img"></div>
  <div class="inventory_details_desc_container">
    <div class="inventory_details_name large_size" data-test="inventory-item-name">{name}</div>
    <div class="inventory_details_desc large_size" data-test="inventory-item-desc">{desc}</div>
    <div class="inventory_details_price" data-test="inventory-item-price">{price}</div>
    <button class="btn btn_primary btn_small btn_inventory" data-product-id="{id}" data-variant="detail" data-test="add-to-cart" id="add-to-cart" name="add-to-cart">Add to cart</button>
  </div>
</div>"#,
            id = product.id,
            name = escape_html(product.name),
            slug = escape_html(&product.slug()),
            desc = escape_html(product.description),
            price = product.display_price()
        ),
        None => r#"<div class="inventory_details_container" data-test="inventory-container">
  <div class="inventory_details_desc_container">
    <div class="inventory_details_name large_size" data-test="inventory-item-name">ITEM NOT FOUND</div>
    <div class="inventory_details_desc large_size" data-test="inventory-item-desc">We're sorry, but your call could not be completed as dialled.</div>
  </div>
</div>"#
            .to_string(),
    };

    let body = format!(
        r#"{header}
<div id="inventory_item_container" class="inventory_item_container">
<div class="inventory_details" data-test="inventory-details">
{back}
{details}
</div>
</div>
{footer}"#,
        header = header("", ""),
        back = back,
        details = details,
        footer = FOOTER
    );
    document("inventory-item", &body)
}

pub fn cart() -> String {
    let body = format!(
        r#"{header}
<div id="cart_contents_container" class="cart_contents_container">
  <div class="cart_list" data-test="cart-list">
    <div class="cart_quantity_label" data-test="cart-quantity-label">QTY</div>
    <div class="cart_desc_label" data-test="cart-desc-label">Description</div>
  </div>
  <div class="cart_footer">
    <button class="btn btn_secondary back btn_medium" data-test="continue-shopping" id="continue-shopping" data-nav="/inventory.html" type="button">Continue Shopping</button>
    <button class="btn btn_action btn_medium checkout_button" data-test="checkout" id="checkout" data-nav="/checkout-step-one.html" type="button">Checkout</button>
  </div>
</div>
{footer}"#,
        header = header("Your Cart", ""),
        footer = FOOTER
    );
    document("cart", &body)
}

pub fn checkout_step_one() -> String {
    let body = format!(
        r#"{header}
<div id="checkout_info_container" class="checkout_info_container">
  <form id="checkout_info_form" novalidate>
    <div class="checkout_info">
      <input class="input_error form_input" placeholder="First Name" type="text" data-test="firstName" id="first-name" name="firstName" value="">
      <input class="input_error form_input" placeholder="Last Name" type="text" data-test="lastName" id="last-name" name="lastName" value="">
      <input class="input_error form_input" placeholder="Zip/Postal Code" type="text" data-test="postalCode" id="postal-code" name="postalCode" value="">
      <div class="error-message-container"></div>
    </div>
    <div class="checkout_buttons">
      <button class="btn btn_secondary back btn_medium cart_cancel_link" data-test="cancel" id="cancel" data-nav="/cart.html" type="button">Cancel</button>
      <input type="submit" class="submit-button btn btn_primary cart_button btn_action" data-test="continue" id="continue" name="continue" value="Continue">
    </div>
  </form>
</div>
{footer}"#,
        header = header("Checkout: Your Information", ""),
        footer = FOOTER
    );
    document("checkout-info", &body)
}

pub fn checkout_step_two() -> String {
    let body = format!(
        r#"{header}
<div id="checkout_summary_container" class="checkout_summary_container">
  <div class="cart_list" data-test="cart-list">
    <div class="cart_quantity_label" data-test="cart-quantity-label">QTY</div>
    <div class="cart_desc_label" data-test="cart-desc-label">Description</div>
  </div>
  <div class="summary_info" data-test="summary-info">
    <div class="summary_info_label" data-test="payment-info-label">Payment Information:</div>
    <div class="summary_value_label" data-test="payment-info-value">SauceCard #31337</div>
    <div class="summary_info_label" data-test="shipping-info-label">Shipping Information:</div>
    <div class="summary_value_label" data-test="shipping-info-value">Free Pony Express Delivery!</div>
    <div class="summary_info_label" data-test="total-info-label">Price Total</div>
    <div class="summary_subtotal_label" data-test="subtotal-label">Item total: $0.00</div>
    <div class="summary_tax_label" data-test="tax-label">Tax: $0.00</div>
    <div class="summary_total_label" data-test="total-label">Total: $0.00</div>
    <div class="cart_footer">
      <button class="btn btn_secondary back btn_medium cart_cancel_link" data-test="cancel" id="cancel" data-nav="/inventory.html" type="button">Cancel</button>
      <button class="btn btn_action btn_medium cart_button" data-test="finish" id="finish" type="button">Finish</button>
    </div>
  </div>
</div>
{footer}"#,
        header = header("Checkout: Overview", ""),
        footer = FOOTER
    );
    document("checkout-overview", &body)
}

pub fn checkout_complete() -> String {
    let body = format!(
        r#"{header}
<div id="checkout_complete_container" class="checkout_complete_container" data-test="checkout-complete-container">
  <h2 class="complete-header" data-test="complete-header">Thank you for your order!</h2>
  <div class="complete-text" data-test="complete-text">Your order has been dispatched, and will arrive just as fast as the pony can get there!</div>
  <button class="btn btn_primary btn_small" data-test="back-to-products" id="back-to-products" data-nav="/inventory.html" type="button">Back Home</button>
</div>
{footer}"#,
        header = header("Checkout: Complete!", ""),
        footer = FOOTER
    );
    document("checkout-complete", &body)
}

pub fn not_found(path: &str) -> String {
    let body = format!(
        r#"<div class="login_logo">Swag Labs</div><h3 class="not_found" data-test="not-found">No page at {}</h3>"#,
        escape_html(path)
    );
    document("not-found", &body)
}
