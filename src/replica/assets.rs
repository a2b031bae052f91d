//! Static stylesheet, client script, and product artwork for the replica.

use crate::fixtures::{errors, products, users, Product, TAX_RATE};
use serde::Serialize;

/// Replaced with the serialized [`ClientData`] when the script is served.
const DATA_PLACEHOLDER: &str = "/*__STOREFRONT_DATA__*/null";

pub const STYLE_CSS: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: "DM Sans", Arial, sans-serif; font-size: 14px; color: #132322; background: #fff; }
button, input, select { font: inherit; }
.login_logo, .app_logo { font-size: 24px; font-weight: bold; text-align: center; padding: 16px 0; }
.login_wrapper { background: #f3f3f3; padding: 32px 0; }
.login-box, .login_wrapper form { width: 340px; margin: 0 auto; }
.form_input, .checkout_info input { display: block; width: 100%; height: 40px; margin: 0 0 12px; padding: 0 10px; border: 1px solid #ededed; border-radius: 4px; }
.form_input.error, .checkout_info input.error { border-color: #e2231a; }
.error-message-container { min-height: 8px; margin-bottom: 12px; }
h3[data-test="error"] { position: relative; margin: 0; padding: 10px 40px 10px 10px; font-size: 14px; color: #fff; background: #e2231a; border-radius: 4px; }
.error-button { position: absolute; right: 8px; top: 8px; width: 20px; height: 20px; border: 0; border-radius: 50%; background: #fff; }
.btn, .submit-button { display: inline-block; min-width: 120px; height: 36px; padding: 0 12px; border: 1px solid #3ddc91; border-radius: 4px; background: #3ddc91; color: #132322; cursor: pointer; }
.btn_secondary { background: #fff; border-color: #e2231a; color: #e2231a; }
.submit-button { width: 100%; }
.login_credentials_wrap { width: 340px; margin: 24px auto; color: #484c55; }
.primary_header { position: relative; height: 60px; border-bottom: 1px solid #ededed; }
#menu_button_container { position: absolute; left: 12px; top: 12px; }
#react-burger-menu-btn, #react-burger-cross-btn { width: 90px; height: 36px; }
.bm-menu-wrap { display: none; position: absolute; top: 40px; left: 0; width: 220px; padding: 12px; background: #fff; border: 1px solid #ededed; z-index: 10; }
.bm-menu-wrap.open { display: block; }
.bm-item { display: block; padding: 8px 0; color: #132322; }
.shopping_cart_container { position: absolute; right: 16px; top: 12px; }
.shopping_cart_link { position: relative; display: inline-block; width: 36px; height: 36px; border: 2px solid #132322; border-radius: 4px; }
.shopping_cart_badge { position: absolute; right: -10px; top: -10px; min-width: 20px; height: 20px; padding: 0 4px; border-radius: 10px; background: #e2231a; color: #fff; font-size: 12px; line-height: 20px; text-align: center; }
.header_secondary_container { display: flex; justify-content: space-between; align-items: center; padding: 12px 16px; border-bottom: 1px solid #ededed; }
.title { font-size: 18px; font-weight: bold; }
.inventory_list { display: flex; flex-wrap: wrap; gap: 16px; padding: 16px; }
.inventory_item { display: flex; gap: 12px; width: 460px; padding: 12px; border: 1px solid #ededed; border-radius: 8px; }
.inventory_item_img img, .inventory_details_img { display: block; }
.inventory_item_description { display: flex; flex-direction: column; justify-content: space-between; flex: 1; }
.inventory_item_name, .inventory_details_name { font-weight: bold; color: #18583a; }
.inventory_details_name { font-size: 20px; }
.pricebar, .item_pricebar { display: flex; justify-content: space-between; align-items: center; margin-top: 12px; }
.inventory_item_price, .inventory_details_price { font-size: 18px; font-weight: bold; }
.inventory_details { padding: 16px; }
.inventory_details_container { display: flex; gap: 24px; margin-top: 16px; }
.cart_contents_container, .checkout_info_container, .checkout_summary_container, .checkout_complete_container { padding: 16px; }
.cart_list { margin-bottom: 16px; }
.cart_item { display: flex; gap: 16px; padding: 12px 0; border-bottom: 1px solid #ededed; }
.cart_quantity { width: 40px; text-align: center; }
.cart_item_label { flex: 1; }
.cart_footer, .checkout_buttons { display: flex; justify-content: space-between; gap: 12px; }
.checkout_info { width: 340px; }
.summary_info_label, .summary_subtotal_label, .summary_tax_label, .summary_total_label { padding: 4px 0; }
.summary_total_label { font-weight: bold; }
.complete-header { font-size: 24px; text-align: center; }
.complete-text { text-align: center; }
.checkout_complete_container { text-align: center; }
.footer { padding: 16px; color: #484c55; background: #f3f3f3; text-align: center; }
"#;

const APP_JS_TEMPLATE: &str = r#"(function () {
  'use strict';
  const DATA = /*__STOREFRONT_DATA__*/null;
  const SESSION_KEY = 'session-username';
  const CART_KEY = 'cart-contents';
  const FLASH_KEY = 'login-error';

  const byId = (id) => DATA.catalog.find((p) => p.id === id);
  const slug = (name) => name.toLowerCase().replace(/ /g, '-');
  const money = (n) => '$' + n.toFixed(2);
  const esc = (s) => String(s).replace(/[&<>"']/g, (c) => ({ '&': '&amp;', '<': '&lt;', '>': '&gt;', '"': '&quot;', "'": '&#39;' }[c]));
  const page = document.body.dataset.page;

  function cart() {
    try {
      const ids = JSON.parse(localStorage.getItem(CART_KEY) || '[]');
      return Array.isArray(ids) ? ids : [];
    } catch (e) {
      return [];
    }
  }

  function saveCart(ids) {
    if (ids.length) localStorage.setItem(CART_KEY, JSON.stringify(ids));
    else localStorage.removeItem(CART_KEY);
    updateBadge();
  }

  function updateBadge() {
    const link = document.querySelector('.shopping_cart_link');
    if (!link) return;
    const count = cart().length;
    let badge = link.querySelector('.shopping_cart_badge');
    if (count === 0) {
      if (badge) badge.remove();
      return;
    }
    if (!badge) {
      badge = document.createElement('span');
      badge.className = 'shopping_cart_badge';
      badge.setAttribute('data-test', 'shopping-cart-badge');
      link.appendChild(badge);
    }
    badge.textContent = String(count);
  }

  function setButton(btn, inCart) {
    const product = byId(Number(btn.dataset.productId));
    if (!product) return;
    const base = inCart ? 'remove' : 'add-to-cart';
    const test = btn.dataset.variant === 'detail' ? base : base + '-' + slug(product.name);
    btn.setAttribute('data-test', test);
    btn.id = test;
    btn.textContent = inCart ? 'Remove' : 'Add to cart';
    btn.classList.toggle('btn_secondary', inCart);
    btn.classList.toggle('btn_primary', !inCart);
  }

  function syncButtons() {
    const ids = cart();
    document.querySelectorAll('button[data-product-id]').forEach((btn) => {
      if (btn.dataset.variant !== 'cart') setButton(btn, ids.includes(Number(btn.dataset.productId)));
    });
  }

  function showError(container, message, inputs) {
    container.innerHTML = '';
    const h3 = document.createElement('h3');
    h3.setAttribute('data-test', 'error');
    h3.textContent = message;
    const close = document.createElement('button');
    close.className = 'error-button';
    close.setAttribute('data-test', 'error-button');
    close.setAttribute('aria-label', 'Close error');
    close.type = 'button';
    close.addEventListener('click', () => {
      container.innerHTML = '';
      inputs.forEach((input) => input.classList.remove('error'));
    });
    h3.appendChild(close);
    container.appendChild(h3);
    inputs.forEach((input) => input.classList.add('error'));
  }

  function cartRow(product, removable) {
    const row = document.createElement('div');
    row.className = 'cart_item';
    row.setAttribute('data-test', 'inventory-item');
    const s = slug(product.name);
    row.innerHTML =
      '<div class="cart_quantity" data-test="item-quantity">1</div>' +
      '<div class="cart_item_label">' +
      '<a href="/inventory-item.html?id=' + product.id + '" id="item_' + product.id + '_title_link">' +
      '<div class="inventory_item_name" data-test="inventory-item-name">' + esc(product.name) + '</div></a>' +
      '<div class="inventory_item_desc" data-test="inventory-item-desc">' + esc(product.description) + '</div>' +
      '<div class="item_pricebar"><div class="inventory_item_price" data-test="inventory-item-price">' + money(product.price) + '</div>' +
      (removable
        ? '<button class="btn btn_secondary btn_small cart_button" data-product-id="' + product.id +
          '" data-variant="cart" data-test="remove-' + esc(s) + '" id="remove-' + esc(s) + '">Remove</button>'
        : '') +
      '</div></div>';
    return row;
  }

  function renderCart(removable) {
    const list = document.querySelector('.cart_list');
    if (!list) return [];
    const items = cart().map(byId).filter(Boolean);
    items.forEach((product) => list.appendChild(cartRow(product, removable)));
    return items;
  }

  function sortInventory(select) {
    const list = document.querySelector('.inventory_list');
    if (!list) return;
    const order = {
      az: (a, b) => a.dataset.name.localeCompare(b.dataset.name),
      za: (a, b) => b.dataset.name.localeCompare(a.dataset.name),
      lohi: (a, b) => Number(a.dataset.price) - Number(b.dataset.price),
      hilo: (a, b) => Number(b.dataset.price) - Number(a.dataset.price),
    }[select.value];
    if (!order) return;
    Array.from(list.querySelectorAll('.inventory_item'))
      .sort((a, b) => Number(a.dataset.index) - Number(b.dataset.index))
      .sort(order)
      .forEach((el) => list.appendChild(el));
    const label = document.querySelector('.active_option');
    if (label) label.textContent = select.options[select.selectedIndex].text;
  }

  function initLogin() {
    const form = document.getElementById('login_form');
    const user = document.querySelector('[data-test="username"]');
    const pass = document.querySelector('[data-test="password"]');
    const errors = document.querySelector('.error-message-container');
    const flash = sessionStorage.getItem(FLASH_KEY);
    if (flash) {
      sessionStorage.removeItem(FLASH_KEY);
      showError(errors, flash, [user, pass]);
    }
    form.addEventListener('submit', (ev) => {
      ev.preventDefault();
      const username = user.value;
      const password = pass.value;
      const m = DATA.messages;
      if (!username) return showError(errors, m.usernameRequired, [user, pass]);
      if (!password) return showError(errors, m.passwordRequired, [user, pass]);
      if (username === DATA.lockedOutUser && password === DATA.password) {
        return showError(errors, m.lockedOut, [user, pass]);
      }
      if (!DATA.usernames.includes(username) || password !== DATA.password) {
        return showError(errors, m.invalidLogin, [user, pass]);
      }
      localStorage.setItem(SESSION_KEY, username);
      location.href = '/inventory.html';
    });
  }

  function initCheckoutInfo() {
    const form = document.getElementById('checkout_info_form');
    const first = document.querySelector('[data-test="firstName"]');
    const last = document.querySelector('[data-test="lastName"]');
    const postal = document.querySelector('[data-test="postalCode"]');
    const errors = document.querySelector('.error-message-container');
    const inputs = [first, last, postal];
    form.addEventListener('submit', (ev) => {
      ev.preventDefault();
      const m = DATA.messages;
      if (!first.value) return showError(errors, m.firstNameRequired, inputs);
      if (!last.value) return showError(errors, m.lastNameRequired, inputs);
      if (!postal.value) return showError(errors, m.postalCodeRequired, inputs);
      location.href = '/checkout-step-two.html';
    });
  }

  function initOverview() {
    const items = renderCart(false);
    const subtotal = items.reduce((sum, p) => sum + p.price, 0);
    const tax = Math.round(subtotal * DATA.taxRate * 100) / 100;
    document.querySelector('.summary_subtotal_label').textContent = 'Item total: ' + money(subtotal);
    document.querySelector('.summary_tax_label').textContent = 'Tax: ' + money(tax);
    document.querySelector('.summary_total_label').textContent = 'Total: ' + money(subtotal + tax);
  }

  if (page !== 'login' && page !== 'not-found' && !localStorage.getItem(SESSION_KEY)) {
    sessionStorage.setItem(FLASH_KEY, DATA.messages.loginRequired.replace('__PATH__', location.pathname));
    location.replace('/');
    return;
  }

  document.addEventListener('click', (ev) => {
    const target = ev.target;
    const product = target.closest('button[data-product-id]');
    if (product) {
      const id = Number(product.dataset.productId);
      const inCart = cart().includes(id);
      saveCart(inCart ? cart().filter((x) => x !== id) : cart().concat([id]));
      if (product.dataset.variant === 'cart') {
        const row = product.closest('.cart_item');
        if (row) row.remove();
      } else {
        setButton(product, !inCart);
      }
      return;
    }
    const wrap = document.querySelector('.bm-menu-wrap');
    if (target.closest('#react-burger-menu-btn')) {
      wrap.classList.add('open');
      wrap.setAttribute('aria-hidden', 'false');
      return;
    }
    if (target.closest('#react-burger-cross-btn')) {
      wrap.classList.remove('open');
      wrap.setAttribute('aria-hidden', 'true');
      return;
    }
    if (target.closest('#logout_sidebar_link')) {
      ev.preventDefault();
      localStorage.removeItem(SESSION_KEY);
      location.href = '/';
      return;
    }
    if (target.closest('#reset_sidebar_link')) {
      ev.preventDefault();
      saveCart([]);
      syncButtons();
      return;
    }
    if (target.closest('[data-test="finish"]')) {
      saveCart([]);
      location.href = '/checkout-complete.html';
      return;
    }
    const nav = target.closest('[data-nav]');
    if (nav) {
      ev.preventDefault();
      location.href = nav.dataset.nav;
    }
  });

  const sort = document.querySelector('[data-test="product-sort-container"]');
  if (sort) sort.addEventListener('change', () => sortInventory(sort));

  if (page === 'login') initLogin();
  if (page === 'cart') renderCart(true);
  if (page === 'checkout-info') initCheckoutInfo();
  if (page === 'checkout-overview') initOverview();
  syncButtons();
  updateBadge();
})();
"#;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Messages {
    username_required: &'static str,
    password_required: &'static str,
    invalid_login: &'static str,
    locked_out: &'static str,
    login_required: String,
    first_name_required: &'static str,
    last_name_required: &'static str,
    postal_code_required: &'static str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientData {
    catalog: &'static [Product],
    tax_rate: f64,
    usernames: Vec<&'static str>,
    password: &'static str,
    locked_out_user: &'static str,
    messages: Messages,
}

fn client_data() -> ClientData {
    let catalog: &'static [Product] = &products::CATALOG;
    ClientData {
        catalog,
        tax_rate: TAX_RATE,
        usernames: users::ALL.iter().map(|c| c.username).collect(),
        password: users::PASSWORD,
        locked_out_user: users::LOCKED_OUT.username,
        messages: Messages {
            username_required: errors::USERNAME_REQUIRED,
            password_required: errors::PASSWORD_REQUIRED,
            invalid_login: errors::INVALID_LOGIN,
            locked_out: errors::LOCKED_OUT,
            login_required: errors::login_required("__PATH__"),
            first_name_required: errors::FIRST_NAME_REQUIRED,
            last_name_required: errors::LAST_NAME_REQUIRED,
            postal_code_required: errors::POSTAL_CODE_REQUIRED,
        },
    }
}

/// Client script with the catalog, tax rate, accounts, and messages inlined.
pub fn app_js() -> serde_json::Result<String> {
    let data = serde_json::to_string(&client_data())?;
    Ok(APP_JS_TEMPLATE.replacen(DATA_PLACEHOLDER, &data, 1))
}

/// Flat product artwork; the colour is derived from the product id.
pub fn product_svg(id: u32) -> String {
    let hue = (id * 53) % 360;
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="240" height="240" viewBox="0 0 240 240"><rect width="240" height="240" fill="#f3f3f3"/><rect x="40" y="40" width="160" height="160" rx="24" fill="hsl({hue},55%,50%)"/><circle cx="120" cy="120" r="{r}" fill="#ffffff" fill-opacity="0.6"/></svg>"##,
        hue = hue,
        r = 20 + id * 6
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_js_inlines_data() {
        let js = app_js().unwrap();
        assert!(!js.contains(DATA_PLACEHOLDER));
        assert!(js.contains("\"taxRate\":0.08"));
        assert!(js.contains("Sauce Labs Fleece Jacket"));
        assert!(js.contains("\"lockedOutUser\":\"locked_out_user\""));
        assert!(js.contains("You can only access '__PATH__' when you are logged in."));
    }

    #[test]
    fn test_product_svg_differs_per_product() {
        assert_ne!(product_svg(0), product_svg(4));
        assert!(product_svg(4).starts_with("<svg"));
    }
}
