use commerce_core::application::checkout::CheckoutEngine;
use commerce_core::application::ledger::LedgerEngine;
use commerce_core::domain::cart::CartItem;
use commerce_core::domain::ports::CommerceStore;
use commerce_core::domain::product::Product;
use commerce_core::infrastructure::in_memory::InMemoryStore;
use commerce_core::infrastructure::locks::LockRegistry;
use std::sync::Arc;
use uuid::Uuid;

pub struct TestContext {
    pub store: Arc<InMemoryStore>,
    pub ledger: LedgerEngine,
    pub checkout: CheckoutEngine,
}

pub fn context() -> TestContext {
    let store = Arc::new(InMemoryStore::new());
    let locks = Arc::new(LockRegistry::new());
    TestContext {
        store: store.clone(),
        ledger: LedgerEngine::new(store.clone(), Arc::clone(&locks)),
        checkout: CheckoutEngine::new(store, locks),
    }
}

pub async fn seed_product(store: &InMemoryStore, name: &str, price: i64, stock: u32) -> Product {
    let product = Product::new(name, format!("SKU-{name}"), price, stock);
    store.insert_product(product.clone()).await.unwrap();
    product
}

/// Puts `quantity` of `product_id` into the user's cart, creating the
/// cart on first use. Returns the cart id and the new item.
pub async fn seed_cart_item(
    store: &InMemoryStore,
    user_id: Uuid,
    product_id: Uuid,
    quantity: u32,
) -> (Uuid, CartItem) {
    let cart = store.get_or_create_cart(user_id).await.unwrap();
    let item = CartItem::new(cart.id, product_id, quantity);
    store.add_cart_item(item.clone()).await.unwrap();
    (cart.id, item)
}
