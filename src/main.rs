use clap::Parser;
use commerce_core::application::checkout::CheckoutEngine;
use commerce_core::application::ledger::LedgerEngine;
use commerce_core::domain::cart::CartItem;
use commerce_core::domain::order::OrderStatus;
use commerce_core::domain::ports::{CommerceStore, StoreRef};
use commerce_core::domain::product::Product;
use commerce_core::infrastructure::in_memory::InMemoryStore;
use commerce_core::infrastructure::locks::LockRegistry;
use miette::{IntoDiagnostic, Result};
use serde_json::json;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Seeds a small catalog, hammers one account with concurrent deposits,
/// runs a checkout, and prints the final state as JSON.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Number of concurrent unit deposits to run against the demo account
    #[arg(long, default_value_t = 32)]
    deposits: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let store = Arc::new(InMemoryStore::new());
    let locks = Arc::new(LockRegistry::new());
    let store_ref: StoreRef = store.clone();
    let ledger = LedgerEngine::new(store_ref.clone(), Arc::clone(&locks));
    let checkout = CheckoutEngine::new(store_ref, Arc::clone(&locks));

    let user_id = Uuid::new_v4();
    let account = ledger.create_account(user_id).await.into_diagnostic()?;

    // Concurrent unit deposits; the account lock serializes them.
    let mut handles = Vec::new();
    for _ in 0..cli.deposits {
        let ledger = ledger.clone();
        let account_id = account.id;
        handles.push(tokio::spawn(async move {
            ledger.deposit(account_id, 1, "demo deposit").await
        }));
    }
    for handle in handles {
        handle.await.into_diagnostic()?.into_diagnostic()?;
    }

    let kettle = Product::new("stovetop kettle", "KTL-01", 2500, 10);
    let grinder = Product::new("burr grinder", "GRD-44", 8900, 3);
    store.insert_product(kettle.clone()).await.into_diagnostic()?;
    store.insert_product(grinder.clone()).await.into_diagnostic()?;

    let cart = store.get_or_create_cart(user_id).await.into_diagnostic()?;
    let kettle_item = CartItem::new(cart.id, kettle.id, 2);
    let grinder_item = CartItem::new(cart.id, grinder.id, 1);
    store
        .add_cart_item(kettle_item.clone())
        .await
        .into_diagnostic()?;
    store
        .add_cart_item(grinder_item.clone())
        .await
        .into_diagnostic()?;

    let order = checkout
        .create_order(user_id, cart.id, &[kettle_item.id, grinder_item.id])
        .await
        .into_diagnostic()?;
    let order = checkout
        .update_order_status(user_id, order.id, OrderStatus::Paid)
        .await
        .into_diagnostic()?;

    let account = ledger.get_account(account.id).await.into_diagnostic()?;
    let transactions = store
        .get_money_transactions(account.id)
        .await
        .into_diagnostic()?;
    let kettle = store
        .get_product(kettle.id)
        .await
        .into_diagnostic()?
        .ok_or_else(|| miette::miette!("seeded product disappeared"))?;

    let summary = json!({
        "account": account,
        "deposits_applied": transactions.len(),
        "order": order,
        "kettle_stock_after_checkout": kettle.stock,
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).into_diagnostic()?
    );

    Ok(())
}
