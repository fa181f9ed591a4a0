mod common;

use commerce_core::domain::order::OrderStatus;
use commerce_core::error::CommerceError;
use uuid::Uuid;

async fn placed_order(ctx: &common::TestContext, user_id: Uuid) -> commerce_core::domain::order::Order {
    let product = common::seed_product(&ctx.store, "kettle", 2500, 100).await;
    let (cart_id, item) = common::seed_cart_item(&ctx.store, user_id, product.id, 1).await;
    ctx.checkout
        .create_order(user_id, cart_id, &[item.id])
        .await
        .unwrap()
}

#[tokio::test]
async fn test_paid_transition_stamps_paid_at() {
    let ctx = common::context();
    let user_id = Uuid::new_v4();
    let order = placed_order(&ctx, user_id).await;
    assert!(order.paid_at.is_none());

    let paid = ctx
        .checkout
        .update_order_status(user_id, order.id, OrderStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);
    assert!(paid.paid_at.is_some());
    assert!(paid.updated_at >= order.updated_at);

    let reread = ctx.checkout.get_order(user_id, order.id).await.unwrap();
    assert_eq!(reread.status, OrderStatus::Paid);
    assert_eq!(reread.paid_at, paid.paid_at);
}

#[tokio::test]
async fn test_out_of_graph_transition_rejected() {
    let ctx = common::context();
    let user_id = Uuid::new_v4();
    let order = placed_order(&ctx, user_id).await;

    let err = ctx
        .checkout
        .update_order_status(user_id, order.id, OrderStatus::Complete)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CommerceError::InvalidStatusTransition {
            from: OrderStatus::Pending,
            to: OrderStatus::Complete,
        }
    ));

    let reread = ctx.checkout.get_order(user_id, order.id).await.unwrap();
    assert_eq!(reread.status, OrderStatus::Pending);
}

#[tokio::test]
async fn test_foreign_user_cannot_touch_order() {
    let ctx = common::context();
    let owner = Uuid::new_v4();
    let order = placed_order(&ctx, owner).await;

    let intruder = Uuid::new_v4();
    let err = ctx
        .checkout
        .update_order_status(intruder, order.id, OrderStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Unauthorized));

    let reread = ctx.checkout.get_order(owner, order.id).await.unwrap();
    assert_eq!(reread.status, OrderStatus::Pending);
    assert!(reread.paid_at.is_none());

    assert!(matches!(
        ctx.checkout.get_order(intruder, order.id).await.unwrap_err(),
        CommerceError::Unauthorized
    ));
}

#[tokio::test]
async fn test_unknown_order_rejected() {
    let ctx = common::context();
    let err = ctx
        .checkout
        .update_order_status(Uuid::new_v4(), Uuid::new_v4(), OrderStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::OrderNotFound));
}

#[tokio::test]
async fn test_user_orders_paginate_newest_first() {
    let ctx = common::context();
    let user_id = Uuid::new_v4();
    let product = common::seed_product(&ctx.store, "kettle", 100, 1000).await;

    let mut order_ids = Vec::new();
    for _ in 0..7 {
        let (cart_id, item) = common::seed_cart_item(&ctx.store, user_id, product.id, 1).await;
        let order = ctx
            .checkout
            .create_order(user_id, cart_id, &[item.id])
            .await
            .unwrap();
        order_ids.push(order.id);
    }

    let first = ctx.checkout.get_user_orders(user_id, 1, 3).await.unwrap();
    assert_eq!(first.total_count, 7);
    assert_eq!(first.items.len(), 3);
    assert_eq!(first.page, 1);
    assert_eq!(first.per_page, 3);
    assert!(first.items[0].created_at >= first.items[2].created_at);

    let last = ctx.checkout.get_user_orders(user_id, 3, 3).await.unwrap();
    assert_eq!(last.items.len(), 1);

    // All pages together cover every order exactly once.
    let mut seen: Vec<Uuid> = Vec::new();
    for page in 1..=3 {
        let result = ctx.checkout.get_user_orders(user_id, page, 3).await.unwrap();
        seen.extend(result.items.iter().map(|order| order.id));
    }
    seen.sort();
    order_ids.sort();
    assert_eq!(seen, order_ids);
}

#[tokio::test]
async fn test_pagination_inputs_clamped() {
    let ctx = common::context();
    let user_id = Uuid::new_v4();
    let product = common::seed_product(&ctx.store, "kettle", 100, 100).await;
    let (cart_id, item) = common::seed_cart_item(&ctx.store, user_id, product.id, 1).await;
    ctx.checkout
        .create_order(user_id, cart_id, &[item.id])
        .await
        .unwrap();

    let page = ctx.checkout.get_user_orders(user_id, 0, 0).await.unwrap();
    assert_eq!(page.page, 1);
    assert_eq!(page.per_page, 10);
    assert_eq!(page.items.len(), 1);

    let capped = ctx.checkout.get_user_orders(user_id, 1, 500).await.unwrap();
    assert_eq!(capped.per_page, 100);
}

#[tokio::test]
async fn test_orders_are_scoped_to_their_user() {
    let ctx = common::context();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    placed_order(&ctx, alice).await;

    let bobs = ctx.checkout.get_user_orders(bob, 1, 10).await.unwrap();
    assert_eq!(bobs.total_count, 0);
    assert!(bobs.items.is_empty());
}
