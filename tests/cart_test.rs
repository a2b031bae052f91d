//! Cart badge, cart page contents, and removal.

mod common;

use storefront_e2e::browser::expect;
use storefront_e2e::fixtures::{paths, products};
use storefront_e2e::pages::CartPage;

#[tokio::test]
async fn test_add_and_remove_from_inventory_updates_badge() {
    let Some(harness) = common::harness() else { return };

    harness
        .run("cart badge", |page| async move {
            let inventory = common::login_as_standard_user(&page).await?;
            assert_eq!(inventory.cart_badge_count().await?, 0);

            inventory.add_to_cart_by_name(products::BACKPACK.name).await?;
            inventory.verify_product_has_remove_button(products::BACKPACK.name).await?;
            expect(&inventory.cart_badge).to_have_text("1").await?;

            inventory.add_to_cart_by_name(products::ONESIE.name).await?;
            expect(&inventory.cart_badge).to_have_text("2").await?;
            assert_eq!(inventory.cart_badge_count().await?, 2);

            inventory.remove_from_cart_by_name(products::BACKPACK.name).await?;
            expect(&inventory.cart_badge).to_have_text("1").await?;
            Ok(())
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cart_page_lists_and_removes_items() {
    let Some(harness) = common::harness() else { return };

    harness
        .run("cart page contents", |page| async move {
            let inventory = common::login_as_standard_user(&page).await?;
            inventory.add_to_cart_by_name(products::BACKPACK.name).await?;
            inventory.add_to_cart_by_name(products::BIKE_LIGHT.name).await?;
            inventory.go_to_cart().await?;

            let cart = CartPage::new(&page);
            cart.verify_on_cart_page().await?;
            assert_eq!(cart.cart_item_count().await?, 2);
            cart.verify_product_in_cart(products::BACKPACK.name).await?;
            assert_eq!(
                cart.cart_item_names().await?,
                vec![products::BACKPACK.name, products::BIKE_LIGHT.name]
            );

            cart.remove_item_by_name(products::BACKPACK.name).await?;
            expect(&cart.cart_items).to_have_count(1).await?;
            cart.remove_item_by_name(products::BIKE_LIGHT.name).await?;
            cart.verify_cart_is_empty().await?;
            expect(&inventory.cart_badge).to_be_hidden().await
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn test_cart_survives_navigation_and_continue_shopping() {
    let Some(harness) = common::harness() else { return };

    harness
        .run("cart persists", |page| async move {
            let inventory = common::login_as_standard_user(&page).await?;
            inventory.add_to_cart_by_name(products::FLEECE_JACKET.name).await?;

            page.goto(paths::CART).await?;
            let cart = CartPage::new(&page);
            cart.verify_product_in_cart(products::FLEECE_JACKET.name).await?;

            cart.continue_shopping().await?;
            inventory.verify_on_inventory_page().await?;
            inventory
                .verify_product_has_remove_button(products::FLEECE_JACKET.name)
                .await?;
            assert_eq!(inventory.cart_badge_count().await?, 1);
            Ok(())
        })
        .await
        .unwrap();
}
